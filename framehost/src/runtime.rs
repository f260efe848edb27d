//! The runtime: owner of the framework registry, the instance registry and
//! the service catalog, and the place where every lifecycle call is routed.

use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::bundle;
use crate::config::RuntimeConfig;
use crate::dispatch::{InitMethod, InstanceCall, InstanceMethod};
use crate::error::{HostError, HostResult};
use crate::framework::FrameworkRegistry;
use crate::host_interface::{ElementRegistry, PlatformEnv};
use crate::instance::{InstanceContext, InstanceRegistry};
use crate::service::{HookContext, InstanceEnv, ServiceCatalog, ServiceDescriptor};

#[derive(Debug)]
pub struct Runtime {
    config: RuntimeConfig,
    frameworks: FrameworkRegistry,
    instances: InstanceRegistry,
    services: ServiceCatalog,
    elements: Arc<dyn ElementRegistry>,
    platform_env: Option<Arc<dyn PlatformEnv>>,
}

impl Runtime {
    pub(crate) fn new(
        config: RuntimeConfig,
        frameworks: FrameworkRegistry,
        services: ServiceCatalog,
        elements: Arc<dyn ElementRegistry>,
        platform_env: Option<Arc<dyn PlatformEnv>>,
    ) -> Self {
        Self {
            config,
            frameworks,
            instances: InstanceRegistry::new(),
            services,
            elements,
            platform_env,
        }
    }

    /// Creates an instance for `code` and hands it to the framework that
    /// produced the bundle.
    ///
    /// The context is registered before the framework is invoked, so lookups
    /// made while the framework builds the instance already see it. If no
    /// framework is registered for the bundle's tag, `UnknownFramework` is
    /// returned and the registered context stays in place.
    pub fn create_instance(
        &mut self,
        id: &str,
        code: &str,
        config: &Value,
        data: &Value,
    ) -> HostResult<Value> {
        if self.instances.contains(id) {
            return Err(HostError::DuplicateInstance(id.to_string()));
        }

        let kind = bundle::classify(code);
        if kind.is_default() {
            debug!(instance = %id, "bundle has no framework header");
        }
        let framework = kind.framework().to_string();

        let mut instance_config = match config {
            Value::Object(fields) => fields.clone(),
            _ => Map::new(),
        };
        instance_config.insert("env".to_string(), self.platform_snapshot());
        let instance_config = Value::Object(instance_config);

        let created = Utc::now();
        let env = InstanceEnv {
            config: &instance_config,
            created,
            framework: &framework,
        };
        let services = self.services.compose(id, &env, &self.config);

        let context = self.instances.insert(InstanceContext::new(
            id,
            instance_config,
            created,
            framework.as_str(),
            services,
        ))?;
        info!(instance = %id, framework = %framework, "instance registered");

        let Some(plugin) = self.frameworks.get(&framework) else {
            warn!(instance = %id, framework = %framework, "no framework registered for bundle type");
            return Err(HostError::UnknownFramework(framework));
        };

        plugin
            .create_instance(id, code, context.config(), data, &context)
            .map_err(|source| HostError::Framework {
                framework,
                method: "createInstance",
                source,
            })
    }

    /// Routes an instance-level call to the framework the instance is bound to.
    ///
    /// Refresh and destroy additionally run the matching service hooks once
    /// the framework has returned; destroy then drops the instance.
    pub fn call(&mut self, id: &str, call: InstanceCall) -> HostResult<Value> {
        let framework = self
            .instances
            .framework_of(id)
            .ok_or_else(|| HostError::UnknownInstance(id.to_string()))?
            .to_string();
        let plugin = self
            .frameworks
            .get(&framework)
            .ok_or_else(|| HostError::UnknownFramework(framework.clone()))?;

        let method = call.method();
        let result = call
            .invoke(&**plugin, id)
            .map_err(|source| HostError::Framework {
                framework: framework.clone(),
                method: method.name(),
                source,
            });

        match method {
            InstanceMethod::RefreshInstance => {
                self.services
                    .refresh_all(id, &HookContext::new(&framework, &self.config));
            }
            InstanceMethod::DestroyInstance => {
                self.services
                    .destroy_all(id, &HookContext::new(&framework, &self.config));
                self.instances.remove(id);
                info!(instance = %id, framework = %framework, "instance destroyed");
            }
            InstanceMethod::ReceiveTasks | InstanceMethod::GetRoot => {}
        }

        result
    }

    pub fn destroy_instance(&mut self, id: &str) -> HostResult<Value> {
        self.call(id, InstanceCall::DestroyInstance)
    }

    pub fn refresh_instance(&mut self, id: &str, data: &Value) -> HostResult<Value> {
        self.call(id, InstanceCall::RefreshInstance(data.clone()))
    }

    pub fn receive_tasks(&mut self, id: &str, tasks: &Value) -> HostResult<Value> {
        self.call(id, InstanceCall::ReceiveTasks(tasks.clone()))
    }

    pub fn get_root(&mut self, id: &str) -> HostResult<Value> {
        self.call(id, InstanceCall::GetRoot)
    }

    /// Forwards each well-formed `{type, methods}` entry to the element
    /// registry, then offers the component list to every framework.
    pub fn register_components(&self, components: &Value) -> HostResult<()> {
        self.register_elements(components);
        self.fan_out(InitMethod::RegisterComponents, components)
    }

    pub fn register_modules(&self, modules: &Value) -> HostResult<()> {
        self.fan_out(InitMethod::RegisterModules, modules)
    }

    pub fn register_methods(&self, methods: &Value) -> HostResult<()> {
        self.fan_out(InitMethod::RegisterMethods, methods)
    }

    pub fn register_service(&mut self, descriptor: ServiceDescriptor) -> bool {
        self.services.register(descriptor)
    }

    pub fn unregister_service(&mut self, name: &str) -> bool {
        self.services.unregister(name)
    }

    pub fn instance(&self, id: &str) -> Option<&InstanceContext> {
        self.instances.get(id).map(|ctx| &**ctx)
    }

    pub fn instance_ids(&self) -> Vec<&str> {
        self.instances.ids()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn framework_tags(&self) -> Vec<&str> {
        self.frameworks.tags()
    }

    pub fn services(&self) -> &ServiceCatalog {
        &self.services
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Calls `method` on every framework. A failing framework does not stop
    /// the others; failures are reported together afterwards.
    fn fan_out(&self, method: InitMethod, payload: &Value) -> HostResult<()> {
        let mut failures = Vec::new();
        for (tag, plugin) in self.frameworks.iter() {
            let outcome = match method {
                InitMethod::RegisterComponents => plugin.register_components(payload),
                InitMethod::RegisterModules => plugin.register_modules(payload),
                InitMethod::RegisterMethods => plugin.register_methods(payload),
            };
            if let Err(e) = outcome {
                warn!(framework = %tag, method = method.name(), error = %e, "registration failed");
                failures.push(format!("{tag}: {e}"));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(HostError::Registration {
                method: method.name(),
                failures,
            })
        }
    }

    fn register_elements(&self, components: &Value) {
        let Value::Array(entries) = components else {
            return;
        };
        for entry in entries {
            let Some(element_type) = entry.get("type").and_then(Value::as_str) else {
                continue;
            };
            let Some(methods) = entry.get("methods").and_then(Value::as_array) else {
                continue;
            };
            if element_type.is_empty() {
                continue;
            }
            let methods: Vec<String> = methods
                .iter()
                .filter_map(|m| m.as_str().map(str::to_string))
                .collect();
            debug!(element = %element_type, methods = methods.len(), "registering element");
            self.elements.register_element(element_type, &methods);
        }
    }

    fn platform_snapshot(&self) -> Value {
        match &self.platform_env {
            Some(env) => env.snapshot(),
            None => self.config.snapshot(),
        }
    }
}

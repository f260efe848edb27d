//! Cross-cutting services injected into every instance.
//!
//! A service is described by a name and up to three hooks:
//!
//! - `create(id, env, config)` returns a JSON object. Its `instance` field is
//!   the service's private per-instance state; every other field is a public
//!   export.
//! - `refresh(id, ctx)` and `destroy(id, ctx)` follow the instance lifecycle.
//!
//! At instance creation the catalog is folded into a `ServiceBundle`: exports
//! are merged at the top level (later services overwrite earlier ones) and each
//! service's `instance` lands under `service[<name>]`. The bundle is immutable
//! once built.
//!
//! Hook failures are isolated: the failing service is logged and skipped, the
//! others still run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::RuntimeConfig;

/// Key of a service's private per-instance state in a `create` result.
pub const INSTANCE_KEY: &str = "instance";

pub type CreateHook = Arc<
    dyn Fn(&str, &InstanceEnv<'_>, &RuntimeConfig) -> anyhow::Result<Map<String, Value>>
        + Send
        + Sync,
>;

pub type LifecycleHook = Arc<dyn Fn(&str, &HookContext<'_>) -> anyhow::Result<()> + Send + Sync>;

/// What a `create` hook sees of the instance being built.
#[derive(Debug, Clone, Copy)]
pub struct InstanceEnv<'a> {
    pub config: &'a Value,
    pub created: DateTime<Utc>,
    pub framework: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceInfo<'a> {
    pub framework: &'a str,
}

/// Argument of `refresh` and `destroy` hooks.
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    pub info: InstanceInfo<'a>,
    pub runtime: &'a RuntimeConfig,
}

impl<'a> HookContext<'a> {
    pub fn new(framework: &'a str, runtime: &'a RuntimeConfig) -> Self {
        Self {
            info: InstanceInfo { framework },
            runtime,
        }
    }
}

#[derive(Clone)]
pub struct ServiceDescriptor {
    name: String,
    create: Option<CreateHook>,
    refresh: Option<LifecycleHook>,
    destroy: Option<LifecycleHook>,
}

impl ServiceDescriptor {
    /// A service with no hooks; attach them with the `on_*` builders.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            create: None,
            refresh: None,
            destroy: None,
        }
    }

    pub fn on_create<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &InstanceEnv<'_>, &RuntimeConfig) -> anyhow::Result<Map<String, Value>>
            + Send
            + Sync
            + 'static,
    {
        self.create = Some(Arc::new(hook));
        self
    }

    pub fn on_refresh<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &HookContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.refresh = Some(Arc::new(hook));
        self
    }

    pub fn on_destroy<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &HookContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.destroy = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("name", &self.name)
            .field("create", &self.create.is_some())
            .field("refresh", &self.refresh.is_some())
            .field("destroy", &self.destroy.is_some())
            .finish()
    }
}

/// Ordered collection of registered services.
///
/// Order is registration order and is the order hooks run in.
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    services: Vec<ServiceDescriptor>,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service. The first registration of a name wins: a later
    /// descriptor with the same name is ignored and `false` is returned.
    pub fn register(&mut self, descriptor: ServiceDescriptor) -> bool {
        if self.contains(descriptor.name()) {
            warn!(service = %descriptor.name(), "service has already been registered");
            return false;
        }
        debug!(service = %descriptor.name(), "service registered");
        self.services.push(descriptor);
        true
    }

    /// Removes a service by name. Returns true if one was removed.
    pub fn unregister(&mut self, name: &str) -> bool {
        let before = self.services.len();
        self.services.retain(|s| s.name() != name);
        self.services.len() < before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.iter().any(|s| s.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.iter()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Builds the service bundle for a new instance.
    pub fn compose(&self, id: &str, env: &InstanceEnv<'_>, config: &RuntimeConfig) -> ServiceBundle {
        let mut builder = ServiceBundleBuilder::new();
        for descriptor in &self.services {
            let Some(create) = &descriptor.create else {
                continue;
            };
            match create(id, env, config) {
                Ok(mut result) => {
                    if let Some(instance) = result.remove(INSTANCE_KEY) {
                        builder.insert_instance(descriptor.name(), instance);
                    }
                    builder.merge_exports(result);
                }
                Err(e) => {
                    warn!(
                        service = %descriptor.name(),
                        instance = %id,
                        error = %e,
                        "service create hook failed, skipping its contribution"
                    );
                }
            }
        }
        builder.build()
    }

    /// Runs every `refresh` hook in catalog order.
    pub fn refresh_all(&self, id: &str, ctx: &HookContext<'_>) {
        self.run_hooks(id, ctx, "refresh", |s| s.refresh.as_ref());
    }

    /// Runs every `destroy` hook in catalog order.
    pub fn destroy_all(&self, id: &str, ctx: &HookContext<'_>) {
        self.run_hooks(id, ctx, "destroy", |s| s.destroy.as_ref());
    }

    fn run_hooks<F>(&self, id: &str, ctx: &HookContext<'_>, phase: &str, select: F)
    where
        F: Fn(&ServiceDescriptor) -> Option<&LifecycleHook>,
    {
        for descriptor in &self.services {
            if let Some(hook) = select(descriptor) {
                if let Err(e) = hook(id, ctx) {
                    warn!(
                        service = %descriptor.name(),
                        instance = %id,
                        phase,
                        error = %e,
                        "service hook failed"
                    );
                }
            }
        }
    }
}

/// Per-instance services, frozen at construction.
///
/// There is no way to obtain a mutable reference to a built bundle; callers
/// that need a variation work on a clone.
///
/// ```compile_fail
/// let bundle = framehost::ServiceBundle::default();
/// bundle.service().insert("intruder".to_string(), serde_json::json!(true));
/// ```
///
/// ```compile_fail
/// let bundle = framehost::ServiceBundle::default();
/// bundle.exports().remove("consoleApi");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceBundle {
    #[serde(flatten)]
    exports: Map<String, Value>,
    service: Map<String, Value>,
}

impl ServiceBundle {
    /// A public export contributed by some service.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.exports.get(name)
    }

    pub fn exports(&self) -> &Map<String, Value> {
        &self.exports
    }

    /// Private per-service instances keyed by service name.
    pub fn service(&self) -> &Map<String, Value> {
        &self.service
    }

    pub fn service_instance(&self, name: &str) -> Option<&Value> {
        self.service.get(name)
    }

    /// The merged view: exports at the top level plus the `service` field.
    pub fn to_value(&self) -> Value {
        let mut merged = self.exports.clone();
        merged.insert("service".to_string(), Value::Object(self.service.clone()));
        Value::Object(merged)
    }
}

#[derive(Debug, Default)]
pub struct ServiceBundleBuilder {
    exports: Map<String, Value>,
    service: Map<String, Value>,
}

impl ServiceBundleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_exports(&mut self, exports: Map<String, Value>) -> &mut Self {
        for (key, value) in exports {
            self.exports.insert(key, value);
        }
        self
    }

    pub fn insert_instance(&mut self, service: &str, instance: Value) -> &mut Self {
        self.service.insert(service.to_string(), instance);
        self
    }

    pub fn build(mut self) -> ServiceBundle {
        self.service.remove(INSTANCE_KEY);
        ServiceBundle {
            exports: self.exports,
            service: self.service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn env(config: &Value) -> InstanceEnv<'_> {
        InstanceEnv {
            config,
            created: Utc::now(),
            framework: "Vue",
        }
    }

    #[test]
    fn test_compose_splits_instance_from_exports() {
        let mut catalog = ServiceCatalog::new();
        catalog.register(ServiceDescriptor::new("A"));
        catalog.register(
            ServiceDescriptor::new("B")
                .on_create(|_, _, _| Ok(object(json!({ "instance": { "x": 1 }, "y": 2 })))),
        );

        let config = json!({});
        let bundle = catalog.compose("1", &env(&config), &RuntimeConfig::default());

        assert_eq!(bundle.get("y"), Some(&json!(2)));
        assert_eq!(bundle.service_instance("B"), Some(&json!({ "x": 1 })));
        assert!(bundle.service().get("instance").is_none());
        assert!(bundle.get("instance").is_none());
        assert_eq!(bundle.to_value(), json!({ "y": 2, "service": { "B": { "x": 1 } } }));
    }

    #[test]
    fn test_later_services_overwrite_exports() {
        let mut catalog = ServiceCatalog::new();
        catalog.register(
            ServiceDescriptor::new("first").on_create(|_, _, _| Ok(object(json!({ "shared": "a" })))),
        );
        catalog.register(
            ServiceDescriptor::new("second").on_create(|_, _, _| Ok(object(json!({ "shared": "b" })))),
        );

        let config = json!({});
        let bundle = catalog.compose("1", &env(&config), &RuntimeConfig::default());
        assert_eq!(bundle.get("shared"), Some(&json!("b")));
    }

    #[test]
    fn test_service_named_instance_is_stripped() {
        let mut catalog = ServiceCatalog::new();
        catalog.register(
            ServiceDescriptor::new("instance")
                .on_create(|_, _, _| Ok(object(json!({ "instance": { "leak": true } })))),
        );

        let config = json!({});
        let bundle = catalog.compose("1", &env(&config), &RuntimeConfig::default());
        assert!(bundle.service().is_empty());
    }

    #[test]
    fn test_failing_create_hook_is_isolated() {
        let mut catalog = ServiceCatalog::new();
        catalog.register(
            ServiceDescriptor::new("broken").on_create(|_, _, _| Err(anyhow::anyhow!("boom"))),
        );
        catalog.register(
            ServiceDescriptor::new("timer")
                .on_create(|_, _, _| Ok(object(json!({ "instance": { "ticks": 0 }, "setTimeout": "fn" })))),
        );

        let config = json!({});
        let bundle = catalog.compose("1", &env(&config), &RuntimeConfig::default());
        assert_eq!(bundle.get("setTimeout"), Some(&json!("fn")));
        assert!(bundle.service_instance("broken").is_none());
        assert_eq!(bundle.service_instance("timer"), Some(&json!({ "ticks": 0 })));
    }

    #[test]
    fn test_create_hook_receives_instance_env() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let mut catalog = ServiceCatalog::new();
        catalog.register(ServiceDescriptor::new("probe").on_create(move |id, env, config| {
            *sink.lock().unwrap() = Some((
                id.to_string(),
                env.framework.to_string(),
                env.config.clone(),
                config.option("mode").cloned(),
            ));
            Ok(Map::new())
        }));

        let config = json!({ "bundleUrl": "x.js" });
        let runtime = RuntimeConfig::default().with_option("mode", json!("debug"));
        catalog.compose("42", &env(&config), &runtime);

        assert_eq!(
            seen.lock().unwrap().clone(),
            Some((
                "42".to_string(),
                "Vue".to_string(),
                json!({ "bundleUrl": "x.js" }),
                Some(json!("debug")),
            ))
        );
    }

    #[test]
    fn test_register_first_call_wins() {
        let mut catalog = ServiceCatalog::new();
        assert!(catalog.register(
            ServiceDescriptor::new("modal").on_create(|_, _, _| Ok(object(json!({ "v": 1 }))))
        ));
        assert!(!catalog.register(
            ServiceDescriptor::new("modal").on_create(|_, _, _| Ok(object(json!({ "v": 2 }))))
        ));
        assert_eq!(catalog.len(), 1);

        let config = json!({});
        let bundle = catalog.compose("1", &env(&config), &RuntimeConfig::default());
        assert_eq!(bundle.get("v"), Some(&json!(1)));
    }

    #[test]
    fn test_unregister() {
        let mut catalog = ServiceCatalog::new();
        catalog.register(ServiceDescriptor::new("a"));
        catalog.register(ServiceDescriptor::new("b"));

        assert!(catalog.unregister("a"));
        assert!(!catalog.unregister("a"));
        assert_eq!(catalog.names(), vec!["b"]);
    }

    #[test]
    fn test_hooks_run_in_order_and_failures_are_isolated() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut catalog = ServiceCatalog::new();
        for name in ["one", "two", "three"] {
            let log = Arc::clone(&calls);
            let fail = name == "two";
            catalog.register(ServiceDescriptor::new(name).on_refresh(move |id, ctx| {
                log.lock()
                    .unwrap()
                    .push(format!("{name}:{id}:{}", ctx.info.framework));
                if fail {
                    anyhow::bail!("refresh failed");
                }
                Ok(())
            }));
        }

        let runtime = RuntimeConfig::default();
        catalog.refresh_all("7", &HookContext::new("Rax", &runtime));
        catalog.destroy_all("7", &HookContext::new("Rax", &runtime));

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["one:7:Rax", "two:7:Rax", "three:7:Rax"]
        );
    }
}

//! The public method table.
//!
//! Hosts usually forward calls by name (`"createInstance"`, `"receiveTasks"`,
//! ...). The table maps each exposed name to a typed entry and decodes the
//! positional JSON arguments before calling into the `Runtime`.
//!
//! Two families are generated over fixed method sets:
//!
//! - init-level methods fan out to every framework;
//! - instance-level methods resolve the instance's framework and dispatch to
//!   it alone.
//!
//! Names are defined first-call-wins, so legacy aliases registered after the
//! current names can never shadow them.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::{HostError, HostResult};
use crate::framework::{FrameworkPlugin, FrameworkResult};
use crate::legacy;
use crate::runtime::Runtime;
use crate::service::ServiceDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitMethod {
    RegisterComponents,
    RegisterModules,
    RegisterMethods,
}

impl InitMethod {
    pub const ALL: [InitMethod; 3] = [
        InitMethod::RegisterComponents,
        InitMethod::RegisterModules,
        InitMethod::RegisterMethods,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InitMethod::RegisterComponents => "registerComponents",
            InitMethod::RegisterModules => "registerModules",
            InitMethod::RegisterMethods => "registerMethods",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceMethod {
    DestroyInstance,
    RefreshInstance,
    ReceiveTasks,
    GetRoot,
}

impl InstanceMethod {
    pub const ALL: [InstanceMethod; 4] = [
        InstanceMethod::DestroyInstance,
        InstanceMethod::RefreshInstance,
        InstanceMethod::ReceiveTasks,
        InstanceMethod::GetRoot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InstanceMethod::DestroyInstance => "destroyInstance",
            InstanceMethod::RefreshInstance => "refreshInstance",
            InstanceMethod::ReceiveTasks => "receiveTasks",
            InstanceMethod::GetRoot => "getRoot",
        }
    }
}

/// An instance-level call together with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceCall {
    DestroyInstance,
    RefreshInstance(Value),
    ReceiveTasks(Value),
    GetRoot,
}

impl InstanceCall {
    pub fn new(method: InstanceMethod, payload: Value) -> Self {
        match method {
            InstanceMethod::DestroyInstance => InstanceCall::DestroyInstance,
            InstanceMethod::RefreshInstance => InstanceCall::RefreshInstance(payload),
            InstanceMethod::ReceiveTasks => InstanceCall::ReceiveTasks(payload),
            InstanceMethod::GetRoot => InstanceCall::GetRoot,
        }
    }

    pub fn method(&self) -> InstanceMethod {
        match self {
            InstanceCall::DestroyInstance => InstanceMethod::DestroyInstance,
            InstanceCall::RefreshInstance(_) => InstanceMethod::RefreshInstance,
            InstanceCall::ReceiveTasks(_) => InstanceMethod::ReceiveTasks,
            InstanceCall::GetRoot => InstanceMethod::GetRoot,
        }
    }

    pub(crate) fn invoke(&self, plugin: &dyn FrameworkPlugin, id: &str) -> FrameworkResult<Value> {
        match self {
            InstanceCall::DestroyInstance => plugin.destroy_instance(id),
            InstanceCall::RefreshInstance(data) => plugin.refresh_instance(id, data),
            InstanceCall::ReceiveTasks(tasks) => plugin.receive_tasks(id, tasks),
            InstanceCall::GetRoot => plugin.get_root(id),
        }
    }
}

/// What an exposed name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    CreateInstance,
    RegisterService,
    UnregisterService,
    Init(InitMethod),
    Instance(InstanceMethod),
}

impl Entry {
    /// Canonical name of the entry, which differs from the exposed name for
    /// aliases.
    pub fn name(self) -> &'static str {
        match self {
            Entry::CreateInstance => "createInstance",
            Entry::RegisterService => "registerService",
            Entry::UnregisterService => "unregisterService",
            Entry::Init(method) => method.name(),
            Entry::Instance(method) => method.name(),
        }
    }
}

#[derive(Debug)]
pub struct MethodTable {
    runtime: Runtime,
    entries: BTreeMap<String, Entry>,
}

impl MethodTable {
    /// Builds the full surface over `runtime`: the current names first, then
    /// the legacy aliases.
    pub(crate) fn generate(runtime: Runtime) -> Self {
        let mut table = Self {
            runtime,
            entries: BTreeMap::new(),
        };

        table.define("createInstance", Entry::CreateInstance);
        table.define("registerService", Entry::RegisterService);
        table.define("unregisterService", Entry::UnregisterService);
        for method in InitMethod::ALL {
            table.define(method.name(), Entry::Init(method));
        }
        for method in InstanceMethod::ALL {
            table.define(method.name(), Entry::Instance(method));
        }
        legacy::register_aliases(&mut table);

        table
    }

    /// Exposes `name`. An existing definition is kept and `false` returned.
    pub(crate) fn define(&mut self, name: &str, entry: Entry) -> bool {
        if let Some(existing) = self.entries.get(name) {
            warn!(
                method = %name,
                existing = existing.name(),
                "method already defined, keeping the first definition"
            );
            return false;
        }
        self.entries.insert(name.to_string(), entry);
        true
    }

    pub fn method_names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn entry(&self, name: &str) -> Option<Entry> {
        self.entries.get(name).copied()
    }

    /// Canonical method an exposed name maps to (`"callJS"` → `"receiveTasks"`).
    pub fn resolve(&self, name: &str) -> Option<&'static str> {
        self.entry(name).map(Entry::name)
    }

    /// Typed counterpart of the `registerService` entry. First call wins.
    pub fn register_service(&mut self, descriptor: ServiceDescriptor) -> bool {
        self.runtime.register_service(descriptor)
    }

    pub fn unregister_service(&mut self, name: &str) -> bool {
        self.runtime.unregister_service(name)
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut Runtime {
        &mut self.runtime
    }

    pub fn into_runtime(self) -> Runtime {
        self.runtime
    }

    /// Calls an exposed method by name with positional JSON arguments.
    ///
    /// - `createInstance(id, code, config?, data?)`
    /// - `unregisterService(name)` → whether a service was removed
    /// - `registerComponents|registerModules|registerMethods(payload)` → null
    /// - `destroyInstance|getRoot(id)`, `refreshInstance|receiveTasks(id, payload)`
    ///
    /// `registerService` carries hooks and cannot be reached by name; use
    /// `MethodTable::register_service`.
    pub fn invoke(&mut self, name: &str, args: &[Value]) -> HostResult<Value> {
        let entry = self
            .entry(name)
            .ok_or_else(|| HostError::UnknownMethod(name.to_string()))?;
        if entry.name() != name {
            debug!(alias = %name, target = entry.name(), "dispatching through legacy alias");
        }

        match entry {
            Entry::CreateInstance => {
                let id = string_arg(name, args, 0)?;
                let code = string_arg(name, args, 1)?;
                self.runtime
                    .create_instance(id, code, &value_arg(args, 2), &value_arg(args, 3))
            }
            Entry::RegisterService => Err(HostError::invalid_arguments(
                name,
                "service hooks cannot be passed by name, use MethodTable::register_service",
            )),
            Entry::UnregisterService => {
                let service = string_arg(name, args, 0)?;
                Ok(Value::Bool(self.runtime.unregister_service(service)))
            }
            Entry::Init(method) => {
                let payload = value_arg(args, 0);
                let outcome = match method {
                    InitMethod::RegisterComponents => self.runtime.register_components(&payload),
                    InitMethod::RegisterModules => self.runtime.register_modules(&payload),
                    InitMethod::RegisterMethods => self.runtime.register_methods(&payload),
                };
                outcome.map(|()| Value::Null)
            }
            Entry::Instance(method) => {
                let id = string_arg(name, args, 0)?;
                self.runtime
                    .call(id, InstanceCall::new(method, value_arg(args, 1)))
            }
        }
    }
}

fn string_arg<'a>(method: &str, args: &'a [Value], index: usize) -> HostResult<&'a str> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(HostError::invalid_arguments(
            method,
            format!("argument {index} must be a string, got {other}"),
        )),
        None => Err(HostError::invalid_arguments(
            method,
            format!("missing argument {index}"),
        )),
    }
}

fn value_arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Null)
}

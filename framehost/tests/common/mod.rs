#![allow(dead_code)]

use framehost::{
    ElementRegistry, FrameworkError, FrameworkPlugin, FrameworkResult, InstanceContext,
    RuntimeConfig, ServiceDescriptor, TaskBridge,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Framework double that records every call as `<name>:<method>[:<id>]`.
#[derive(Debug)]
pub struct RecordingFramework {
    name: String,
    log: CallLog,
    fail_registration: bool,
    fail_refresh: bool,
    fail_init: bool,
    seen_contexts: Arc<Mutex<Vec<InstanceContext>>>,
}

impl RecordingFramework {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            log: Arc::clone(log),
            fail_registration: false,
            fail_refresh: false,
            fail_init: false,
            seen_contexts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_registration(mut self) -> Self {
        self.fail_registration = true;
        self
    }

    pub fn failing_refresh(mut self) -> Self {
        self.fail_refresh = true;
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn seen_contexts(&self) -> Arc<Mutex<Vec<InstanceContext>>> {
        Arc::clone(&self.seen_contexts)
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

impl FrameworkPlugin for RecordingFramework {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&self, config: &RuntimeConfig) -> FrameworkResult<()> {
        self.record(format!(
            "{}:init:{}",
            self.name,
            config.option("label").and_then(Value::as_str).unwrap_or("-")
        ));
        if self.fail_init {
            return Err(FrameworkError::failed("init refused"));
        }
        Ok(())
    }

    fn create_instance(
        &self,
        id: &str,
        _code: &str,
        config: &Value,
        data: &Value,
        context: &InstanceContext,
    ) -> FrameworkResult<Value> {
        self.record(format!("{}:createInstance:{}", self.name, id));
        self.seen_contexts.lock().unwrap().push(context.clone());
        Ok(json!({
            "framework": self.name,
            "id": id,
            "env": config["env"],
            "data": data,
        }))
    }

    fn destroy_instance(&self, id: &str) -> FrameworkResult<Value> {
        self.record(format!("{}:destroyInstance:{}", self.name, id));
        Ok(Value::Null)
    }

    fn refresh_instance(&self, id: &str, data: &Value) -> FrameworkResult<Value> {
        self.record(format!("{}:refreshInstance:{}", self.name, id));
        if self.fail_refresh {
            return Err(FrameworkError::failed("refresh rejected"));
        }
        Ok(json!({ "refreshed": data }))
    }

    fn receive_tasks(&self, id: &str, tasks: &Value) -> FrameworkResult<Value> {
        self.record(format!("{}:receiveTasks:{}", self.name, id));
        Ok(json!({ "received": tasks }))
    }

    fn get_root(&self, id: &str) -> FrameworkResult<Value> {
        self.record(format!("{}:getRoot:{}", self.name, id));
        Ok(json!({ "ref": "_root", "instance": id }))
    }

    fn register_components(&self, _components: &Value) -> FrameworkResult<()> {
        self.record(format!("{}:registerComponents", self.name));
        if self.fail_registration {
            return Err(FrameworkError::failed("components rejected"));
        }
        Ok(())
    }

    fn register_modules(&self, _modules: &Value) -> FrameworkResult<()> {
        self.record(format!("{}:registerModules", self.name));
        Ok(())
    }

    fn register_methods(&self, _methods: &Value) -> FrameworkResult<()> {
        self.record(format!("{}:registerMethods", self.name));
        Ok(())
    }
}

/// Framework that only knows how to create instances.
#[derive(Debug)]
pub struct BareFramework;

impl FrameworkPlugin for BareFramework {
    fn name(&self) -> &str {
        "bare"
    }

    fn create_instance(
        &self,
        id: &str,
        _code: &str,
        _config: &Value,
        _data: &Value,
        _context: &InstanceContext,
    ) -> FrameworkResult<Value> {
        Ok(json!({ "id": id }))
    }
}

#[derive(Debug, Default)]
pub struct RecordingElements {
    pub registered: Mutex<Vec<(String, Vec<String>)>>,
    log: Option<CallLog>,
}

impl RecordingElements {
    /// Also records `element:<type>` into `log`, interleaved with framework calls.
    pub fn logging_to(log: &CallLog) -> Self {
        Self {
            registered: Mutex::new(Vec::new()),
            log: Some(Arc::clone(log)),
        }
    }
}

impl ElementRegistry for RecordingElements {
    fn register_element(&self, element_type: &str, methods: &[String]) {
        if let Some(log) = &self.log {
            log.lock().unwrap().push(format!("element:{element_type}"));
        }
        self.registered
            .lock()
            .unwrap()
            .push((element_type.to_string(), methods.to_vec()));
    }
}

#[derive(Debug, Default)]
pub struct CountingBridge {
    pub inits: Mutex<usize>,
}

impl TaskBridge for CountingBridge {
    fn init(&self) {
        *self.inits.lock().unwrap() += 1;
    }
}

/// Service whose hooks record `<name>:<phase>:<id>` into `log`.
pub fn recording_service(name: &'static str, log: &CallLog) -> ServiceDescriptor {
    let on_create = Arc::clone(log);
    let on_refresh = Arc::clone(log);
    let on_destroy = Arc::clone(log);
    ServiceDescriptor::new(name)
        .on_create(move |id, _env, _config| {
            on_create.lock().unwrap().push(format!("{name}:create:{id}"));
            let mut result = serde_json::Map::new();
            result.insert("instance".to_string(), json!({ "owner": id }));
            result.insert(format!("{name}Api"), json!(name));
            Ok(result)
        })
        .on_refresh(move |id, ctx| {
            on_refresh
                .lock()
                .unwrap()
                .push(format!("{name}:refresh:{id}:{}", ctx.info.framework));
            Ok(())
        })
        .on_destroy(move |id, ctx| {
            on_destroy
                .lock()
                .unwrap()
                .push(format!("{name}:destroy:{id}:{}", ctx.info.framework));
            Ok(())
        })
}

pub const VUE_BUNDLE: &str = "// { \"framework\": \"Vue\" }\nnew Vue({ el: '#app' })";
pub const RAX_BUNDLE: &str = "// {\"framework\":\"Rax\"}\nrender(<App />)";
pub const WEEX_BUNDLE: &str = "define('@weex-component/app', function () {})\nbootstrap('@weex-component/app')";

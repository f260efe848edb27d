//! A framework that renders nothing and logs every call it receives.

use framehost::{FrameworkPlugin, FrameworkResult, InstanceContext, RuntimeConfig};
use serde_json::{json, Value};
use tracing::info;

#[derive(Debug)]
pub struct TraceFramework {
    name: String,
}

impl TraceFramework {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl FrameworkPlugin for TraceFramework {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&self, config: &RuntimeConfig) -> FrameworkResult<()> {
        info!(framework = %self.name, options = config.options.len(), "framework init");
        Ok(())
    }

    fn create_instance(
        &self,
        id: &str,
        code: &str,
        config: &Value,
        data: &Value,
        context: &InstanceContext,
    ) -> FrameworkResult<Value> {
        info!(framework = %self.name, instance = %id, bytes = code.len(), "create instance");
        Ok(json!({
            "framework": self.name,
            "instance": id,
            "created": context.created().to_rfc3339(),
            "env": config["env"],
            "data": data,
            "services": context.services().to_value(),
        }))
    }

    fn destroy_instance(&self, id: &str) -> FrameworkResult<Value> {
        info!(framework = %self.name, instance = %id, "destroy instance");
        Ok(Value::Null)
    }

    fn refresh_instance(&self, id: &str, data: &Value) -> FrameworkResult<Value> {
        info!(framework = %self.name, instance = %id, data = %data, "refresh instance");
        Ok(Value::Null)
    }

    fn receive_tasks(&self, id: &str, tasks: &Value) -> FrameworkResult<Value> {
        let count = tasks.as_array().map(Vec::len).unwrap_or(0);
        info!(framework = %self.name, instance = %id, tasks = count, "receive tasks");
        Ok(json!({ "handled": count }))
    }

    fn get_root(&self, id: &str) -> FrameworkResult<Value> {
        Ok(json!({ "ref": "_root", "type": "div", "instance": id }))
    }
}

//! Framework plugins and the registry that maps bundle tags to them.

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::warn;

use crate::config::RuntimeConfig;
use crate::error::FrameworkError;
use crate::instance::InstanceContext;

pub type FrameworkResult<T> = Result<T, FrameworkError>;

/// A rendering/execution framework able to run bundles of one dialect.
///
/// Only `name` and `create_instance` are mandatory. Registration methods
/// default to no-ops, which is how a framework opts out of an init-level
/// fan-out. Instance methods default to `FrameworkError::Unsupported`.
pub trait FrameworkPlugin: Debug {
    /// Human-readable name used in diagnostics.
    fn name(&self) -> &str;

    fn init(&self, _config: &RuntimeConfig) -> FrameworkResult<()> {
        Ok(())
    }

    fn create_instance(
        &self,
        id: &str,
        code: &str,
        config: &Value,
        data: &Value,
        context: &InstanceContext,
    ) -> FrameworkResult<Value>;

    fn destroy_instance(&self, _id: &str) -> FrameworkResult<Value> {
        Err(self.unsupported("destroyInstance"))
    }

    fn refresh_instance(&self, _id: &str, _data: &Value) -> FrameworkResult<Value> {
        Err(self.unsupported("refreshInstance"))
    }

    fn receive_tasks(&self, _id: &str, _tasks: &Value) -> FrameworkResult<Value> {
        Err(self.unsupported("receiveTasks"))
    }

    fn get_root(&self, _id: &str) -> FrameworkResult<Value> {
        Err(self.unsupported("getRoot"))
    }

    fn register_components(&self, _components: &Value) -> FrameworkResult<()> {
        Ok(())
    }

    fn register_modules(&self, _modules: &Value) -> FrameworkResult<()> {
        Ok(())
    }

    fn register_methods(&self, _methods: &Value) -> FrameworkResult<()> {
        Ok(())
    }

    fn unsupported(&self, method: &str) -> FrameworkError {
        FrameworkError::Unsupported {
            framework: self.name().to_string(),
            method: method.to_string(),
        }
    }
}

pub type ArcFrameworkPlugin = Arc<dyn FrameworkPlugin>;

/// Tag → plugin map in registration order. Built once, then read-only.
#[derive(Debug, Clone, Default)]
pub struct FrameworkRegistry {
    frameworks: IndexMap<String, ArcFrameworkPlugin>,
}

impl FrameworkRegistry {
    pub fn builder() -> FrameworkRegistryBuilder {
        FrameworkRegistryBuilder::default()
    }

    pub fn get(&self, tag: &str) -> Option<&ArcFrameworkPlugin> {
        self.frameworks.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.frameworks.contains_key(tag)
    }

    pub fn tags(&self) -> Vec<&str> {
        self.frameworks.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArcFrameworkPlugin)> {
        self.frameworks.iter().map(|(tag, plugin)| (tag.as_str(), plugin))
    }

    pub fn len(&self) -> usize {
        self.frameworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frameworks.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct FrameworkRegistryBuilder {
    frameworks: IndexMap<String, ArcFrameworkPlugin>,
}

impl FrameworkRegistryBuilder {
    /// Adds a plugin under `tag`. The first plugin registered for a tag wins.
    pub fn register(mut self, tag: impl Into<String>, plugin: ArcFrameworkPlugin) -> Self {
        let tag = tag.into();
        if self.frameworks.contains_key(&tag) {
            warn!(framework = %tag, "framework already registered, ignoring duplicate");
            return self;
        }
        self.frameworks.insert(tag, plugin);
        self
    }

    pub fn build(self) -> FrameworkRegistry {
        FrameworkRegistry {
            frameworks: self.frameworks,
        }
    }
}

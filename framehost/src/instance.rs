//! Instance contexts and the registry that owns them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{HostError, HostResult};
use crate::service::ServiceBundle;

/// A live instance. Immutable once registered; in particular the framework
/// it was created for never changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceContext {
    id: String,
    config: Value,
    created: DateTime<Utc>,
    framework: String,
    services: ServiceBundle,
}

impl InstanceContext {
    pub fn new(
        id: impl Into<String>,
        config: Value,
        created: DateTime<Utc>,
        framework: impl Into<String>,
        services: ServiceBundle,
    ) -> Self {
        Self {
            id: id.into(),
            config,
            created,
            framework: framework.into(),
            services,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &Value {
        &self.config
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn framework(&self) -> &str {
        &self.framework
    }

    pub fn services(&self) -> &ServiceBundle {
        &self.services
    }
}

/// id → context. Entries are added by instance creation and removed by
/// instance destruction only.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    instances: HashMap<String, Arc<InstanceContext>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a context under its id, refusing to replace an existing one.
    pub fn insert(&mut self, context: InstanceContext) -> HostResult<Arc<InstanceContext>> {
        if self.instances.contains_key(context.id()) {
            return Err(HostError::DuplicateInstance(context.id().to_string()));
        }
        let context = Arc::new(context);
        self.instances
            .insert(context.id().to_string(), Arc::clone(&context));
        Ok(context)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<InstanceContext>> {
        self.instances.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.instances.contains_key(id)
    }

    pub fn framework_of(&self, id: &str) -> Option<&str> {
        self.instances.get(id).map(|ctx| ctx.framework())
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Arc<InstanceContext>> {
        self.instances.remove(id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.instances.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

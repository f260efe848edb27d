//! Process initialization.
//!
//! `init` consumes a `HostInit`, so a runtime can only ever be initialized
//! once. Embedders that need isolated hosts (tests, multiple JS contexts)
//! build one `HostInit` per host.

use std::sync::Arc;
use tracing::info;

use crate::config::RuntimeConfig;
use crate::dispatch::MethodTable;
use crate::error::{HostError, HostResult};
use crate::framework::FrameworkRegistry;
use crate::host_interface::{
    ElementRegistry, NoopBridge, NoopElementRegistry, PlatformEnv, TaskBridge,
};
use crate::runtime::Runtime;
use crate::service::ServiceCatalog;

#[derive(Debug)]
pub struct HostInit {
    pub config: RuntimeConfig,
    pub frameworks: FrameworkRegistry,
    pub services: ServiceCatalog,
    pub bridge: Arc<dyn TaskBridge>,
    pub elements: Arc<dyn ElementRegistry>,
    /// Falls back to `config.environment` when unset.
    pub platform_env: Option<Arc<dyn PlatformEnv>>,
}

impl HostInit {
    pub fn new(frameworks: FrameworkRegistry) -> Self {
        Self {
            config: RuntimeConfig::default(),
            frameworks,
            services: ServiceCatalog::new(),
            bridge: Arc::new(NoopBridge),
            elements: Arc::new(NoopElementRegistry),
            platform_env: None,
        }
    }

    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_services(mut self, services: ServiceCatalog) -> Self {
        self.services = services;
        self
    }

    pub fn with_bridge(mut self, bridge: Arc<dyn TaskBridge>) -> Self {
        self.bridge = bridge;
        self
    }

    pub fn with_elements(mut self, elements: Arc<dyn ElementRegistry>) -> Self {
        self.elements = elements;
        self
    }

    pub fn with_platform_env(mut self, env: Arc<dyn PlatformEnv>) -> Self {
        self.platform_env = Some(env);
        self
    }
}

/// Sets up the task bridge, initializes every framework with the runtime
/// config and returns the method table.
pub fn init(setup: HostInit) -> HostResult<MethodTable> {
    let HostInit {
        config,
        frameworks,
        services,
        bridge,
        elements,
        platform_env,
    } = setup;

    bridge.init();

    for (tag, plugin) in frameworks.iter() {
        plugin
            .init(&config)
            .map_err(|source| HostError::FrameworkInit {
                framework: tag.to_string(),
                source,
            })?;
    }
    info!(frameworks = ?frameworks.tags(), services = services.len(), "host initialized");

    let runtime = Runtime::new(config, frameworks, services, elements, platform_env);
    Ok(MethodTable::generate(runtime))
}

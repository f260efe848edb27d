//! Host Interface
//!
//! Contracts for the collaborators that live outside the core: the task
//! bridge frameworks use to talk to the native host, the element registry
//! that learns about custom components, and the ambient platform environment.

use serde_json::Value;
use std::fmt::Debug;

/// Transport used by framework plugins to send tasks to the host.
///
/// The core only performs the one-time setup; everything else flows through
/// the plugins themselves.
pub trait TaskBridge: Debug {
    fn init(&self);
}

/// Registry of virtual-DOM element types and the methods they expose.
pub trait ElementRegistry: Debug {
    fn register_element(&self, element_type: &str, methods: &[String]);
}

/// Read-only source of the platform environment (device, OS, app info).
///
/// Consulted once per instance creation; the returned value is copied into
/// the instance's `config.env`.
pub trait PlatformEnv: Debug {
    fn snapshot(&self) -> Value;
}

impl PlatformEnv for Value {
    fn snapshot(&self) -> Value {
        self.clone()
    }
}

/// Bridge that needs no setup.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBridge;

impl TaskBridge for NoopBridge {
    fn init(&self) {}
}

/// Element registry that drops every registration.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopElementRegistry;

impl ElementRegistry for NoopElementRegistry {
    fn register_element(&self, _element_type: &str, _methods: &[String]) {}
}

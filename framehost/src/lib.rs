//! framehost - multi-framework instance host
//!
//! Classifies application bundles by the framework that produced them,
//! keeps a registry of live instances bound to their framework, injects
//! per-instance services, and routes every lifecycle call to the right
//! framework plugin.
//!
//! ```ignore
//! let frameworks = FrameworkRegistry::builder()
//!     .register("Vue", Arc::new(VueFramework::new()))
//!     .build();
//! let mut host = init(HostInit::new(frameworks))?;
//! host.invoke("createInstance", &[json!("1"), json!(bundle), json!({}), json!({})])?;
//! host.invoke("receiveTasks", &[json!("1"), json!([{ "method": "fireEvent" }])])?;
//! host.invoke("destroyInstance", &[json!("1")])?;
//! ```

pub mod bundle;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod framework;
pub mod host;
pub mod host_interface;
pub mod instance;
pub mod legacy;
pub mod runtime;
pub mod service;

pub use bundle::{classify, BundleKind, DEFAULT_FRAMEWORK};
pub use config::RuntimeConfig;
pub use dispatch::{Entry, InitMethod, InstanceCall, InstanceMethod, MethodTable};
pub use error::{FrameworkError, HostError, HostResult};
pub use framework::{ArcFrameworkPlugin, FrameworkPlugin, FrameworkRegistry, FrameworkResult};
pub use host::{init, HostInit};
pub use host_interface::{ElementRegistry, PlatformEnv, TaskBridge};
pub use instance::{InstanceContext, InstanceRegistry};
pub use runtime::Runtime;
pub use service::{HookContext, InstanceEnv, ServiceBundle, ServiceCatalog, ServiceDescriptor};

//! Error types returned by the host.
//!
//! Every failure the core can report is an ordinary value: callers match on
//! `HostError` per call instead of unwinding. Malformed bundle headers are not
//! errors at all (see `bundle::classify`), and service hook failures never
//! surface here because they are isolated and logged per service.

use thiserror::Error;

pub type HostResult<T> = Result<T, HostError>;

/// Failure reported by a framework plugin.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrameworkError {
    /// The plugin does not implement the requested lifecycle method.
    #[error("framework '{framework}' does not support '{method}'")]
    Unsupported { framework: String, method: String },
    /// The plugin rejected the call.
    #[error("{0}")]
    Failed(String),
}

impl FrameworkError {
    pub fn failed(message: impl Into<String>) -> Self {
        FrameworkError::Failed(message.into())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("the instance id \"{0}\" has already been used")]
    DuplicateInstance(String),

    #[error("invalid bundle type \"{0}\": no framework registered")]
    UnknownFramework(String),

    #[error("no instance registered under id \"{0}\"")]
    UnknownInstance(String),

    #[error("framework '{framework}' failed in {method}: {source}")]
    Framework {
        framework: String,
        method: &'static str,
        #[source]
        source: FrameworkError,
    },

    #[error("framework '{framework}' failed to initialize: {source}")]
    FrameworkInit {
        framework: String,
        #[source]
        source: FrameworkError,
    },

    /// One or more plugins failed an init-level registration call. Every
    /// plugin was still called.
    #[error("{method} failed for {}", .failures.join(", "))]
    Registration {
        method: &'static str,
        failures: Vec<String>,
    },

    #[error("unknown method \"{0}\"")]
    UnknownMethod(String),

    #[error("invalid arguments for {method}: {reason}")]
    InvalidArguments { method: String, reason: String },
}

impl HostError {
    pub(crate) fn invalid_arguments(method: &str, reason: impl Into<String>) -> Self {
        HostError::InvalidArguments {
            method: method.to_string(),
            reason: reason.into(),
        }
    }
}

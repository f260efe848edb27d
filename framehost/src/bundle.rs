//! Bundle classification.
//!
//! A bundle announces the framework that produced it through a JSON object in
//! a line comment on its very first line:
//!
//! ```text
//! // { "framework": "Vue" }
//! ...bundle code...
//! ```
//!
//! Bundles without that header belong to the baseline framework.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Tag of the baseline framework, used when a bundle carries no usable header.
pub const DEFAULT_FRAMEWORK: &str = "Weex";

static BUNDLE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*// *(\{[^}\r\n]*\}) *\r?\n").unwrap());

/// Result of classifying a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleKind {
    /// The header named a framework.
    Detected(String),
    /// No header, unparsable header, or no `framework` field.
    Default,
}

impl BundleKind {
    /// The framework tag this bundle is bound to.
    pub fn framework(&self) -> &str {
        match self {
            BundleKind::Detected(tag) => tag,
            BundleKind::Default => DEFAULT_FRAMEWORK,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, BundleKind::Default)
    }
}

/// Inspect the first line of `code` and decide which framework it targets.
///
/// Total: malformed or missing headers degrade to `BundleKind::Default`.
pub fn classify(code: &str) -> BundleKind {
    let Some(header) = BUNDLE_HEADER.captures(code).and_then(|c| c.get(1)) else {
        return BundleKind::Default;
    };

    match serde_json::from_str::<Value>(header.as_str()) {
        Ok(Value::Object(fields)) => match fields.get("framework") {
            Some(Value::String(tag)) => BundleKind::Detected(tag.clone()),
            _ => BundleKind::Default,
        },
        Ok(_) => BundleKind::Default,
        Err(e) => {
            debug!(error = %e, "bundle header is not valid JSON, using default framework");
            BundleKind::Default
        }
    }
}

//! Runtime-wide configuration.
//!
//! The same `RuntimeConfig` is handed to every framework's `init`, to every
//! service `create` hook and, through `HookContext`, to refresh and destroy
//! hooks. It is usually loaded from a TOML file:
//!
//! ```toml
//! [options]
//! bundle_url = "file:///app/index.js"
//!
//! [environment]
//! platform = "iOS"
//! osVersion = "17.4"
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::host_interface::PlatformEnv;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Free-form settings passed through to plugins and services.
    #[serde(default)]
    pub options: Map<String, Value>,

    /// Platform-environment snapshot copied into each new instance's
    /// `config.env` when no other `PlatformEnv` source is supplied.
    #[serde(default)]
    pub environment: Map<String, Value>,
}

impl RuntimeConfig {
    pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config {}: {}", path.display(), e))?;
        Self::from_toml_str(&source)
    }

    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }
}

impl PlatformEnv for RuntimeConfig {
    fn snapshot(&self) -> Value {
        Value::Object(self.environment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_toml() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [options]
            debug = true
            bundle_url = "file:///app/index.js"

            [environment]
            platform = "android"
            deviceWidth = 750
            "#,
        )
        .unwrap();

        assert_eq!(config.option("debug"), Some(&json!(true)));
        assert_eq!(config.environment.get("deviceWidth"), Some(&json!(750)));
        assert_eq!(config.snapshot()["platform"], json!("android"));
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = RuntimeConfig::from_toml_str("").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.snapshot(), json!({}));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host.toml");
        std::fs::write(&path, "[options]\nname = \"demo\"\n").unwrap();

        let config = RuntimeConfig::load(&path).unwrap();
        assert_eq!(config.option("name"), Some(&json!("demo")));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RuntimeConfig::load(dir.path().join("absent.toml")).is_err());
    }
}

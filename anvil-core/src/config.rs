//! Engine configuration.
//!
//! A [`Config`] wraps the effective configuration document of one engine
//! instance: the factory-level configuration with the instance configuration
//! deep-merged on top. Keys are addressed with dotted paths
//! (`"paging.pageSize"`).

use serde::de::DeserializeOwned;
use serde_json::Value;

static NULL: Value = Value::Null;

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// The requested key was not found in the configuration.
    NotFound(String),
    /// The value could not be converted to the requested type.
    TypeMismatch { key: String, expected: String },
    /// The YAML document could not be parsed.
    Load(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "Config key not found: {key}"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "Config type mismatch for '{key}': {expected}")
            }
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Immutable configuration document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    value: Value,
}

impl Config {
    pub const fn empty() -> Self {
        Config { value: Value::Null }
    }

    pub fn new(value: Value) -> Self {
        Config { value }
    }

    /// Parse a YAML document.
    ///
    /// ```
    /// use anvil_core::Config;
    ///
    /// let config = Config::from_yaml_str("paging:\n  pageSize: 20\n").unwrap();
    /// assert_eq!(config.get::<u64>("paging.pageSize").unwrap(), 20);
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(Config::new(yaml_to_json(yaml)?))
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// The value at a dotted path, or `null`.
    pub fn section(&self, key: &str) -> &Value {
        lookup(&self.value, key).unwrap_or(&NULL)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        lookup(&self.value, key).is_some_and(|v| !v.is_null())
    }

    /// Deserialize the value at a dotted path.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        let value = lookup(&self.value, key).ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        serde_json::from_value(value.clone()).map_err(|err| ConfigError::TypeMismatch {
            key: key.to_string(),
            expected: err.to_string(),
        })
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// The configured component name.
    pub fn name(&self) -> Option<&str> {
        self.value.get("name").and_then(Value::as_str)
    }
}

fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(root, |current, segment| current.get(segment))
}

pub(crate) fn yaml_to_json(yaml: &str) -> Result<Value, ConfigError> {
    let parsed: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|err| ConfigError::Load(err.to_string()))?;
    serde_json::to_value(parsed).map_err(|err| ConfigError::Load(err.to_string()))
}

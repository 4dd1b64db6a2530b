//! Feed and rule configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One feed to fetch, filter and write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Display name used in logs and the run report
    pub name: String,

    /// Source URL of the RSS document
    pub feed_url: String,

    /// Output path for the filtered document
    pub file_name: PathBuf,

    /// Rule chain, evaluated in order
    #[serde(default)]
    pub filters: Vec<RuleSpec>,
}

/// A configured rule: its kind plus kind-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Registered rule kind, e.g. `shorter_than`
    #[serde(rename = "filter")]
    pub kind: String,

    #[serde(default)]
    pub config: RuleConfig,
}

impl RuleSpec {
    pub fn new(kind: impl Into<String>, config: RuleConfig) -> Self {
        Self {
            kind: kind.into(),
            config,
        }
    }
}

/// Kind-specific rule settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleConfig(BTreeMap<String, ConfigValue>);

impl RuleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy when constructing configs in code.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RuleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        write!(f, "}}")
    }
}

/// A scalar configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ConfigValue {
    /// Non-negative whole number, accepting integers written as strings.
    ///
    /// Finite non-negative floats are truncated toward zero, so `7.5` reads
    /// as `7`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ConfigValue::Integer(n) => u64::try_from(*n).ok(),
            ConfigValue::Float(x) if x.is_finite() && *x >= 0.0 && *x < u64::MAX as f64 => {
                Some(x.trunc() as u64)
            }
            ConfigValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            ConfigValue::Integer(n) => Some(*n != 0),
            ConfigValue::Text(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            },
            ConfigValue::Float(_) => None,
        }
    }

    /// String view of the value; numbers and booleans are formatted.
    pub fn as_text(&self) -> String {
        match self {
            ConfigValue::Text(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Integer(n) => write!(f, "{n}"),
            ConfigValue::Float(x) => write!(f, "{x}"),
            ConfigValue::Text(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Text(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Text(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        ConfigValue::Integer(i64::from(value))
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_u64() {
        assert_eq!(ConfigValue::Integer(600).as_u64(), Some(600));
        assert_eq!(ConfigValue::from("600").as_u64(), Some(600));
        assert_eq!(ConfigValue::Integer(-1).as_u64(), None);
        assert_eq!(ConfigValue::from("ten").as_u64(), None);
        assert_eq!(ConfigValue::Float(7.5).as_u64(), Some(7));
        assert_eq!(ConfigValue::Float(-0.5).as_u64(), None);
        assert_eq!(ConfigValue::Float(f64::NAN).as_u64(), None);
        assert_eq!(ConfigValue::Float(f64::INFINITY).as_u64(), None);
    }

    #[test]
    fn test_as_bool() {
        assert_eq!(ConfigValue::Bool(true).as_bool(), Some(true));
        assert_eq!(ConfigValue::from("Yes").as_bool(), Some(true));
        assert_eq!(ConfigValue::from("false").as_bool(), Some(false));
        assert_eq!(ConfigValue::from("maybe").as_bool(), None);
    }

    #[test]
    fn test_rule_spec_yaml_shape() {
        let spec: RuleSpec =
            serde_yaml::from_str("filter: regex_exclude\nconfig:\n  field: title\n  pattern: '^Trailer'\n")
                .unwrap();
        assert_eq!(spec.kind, "regex_exclude");
        assert_eq!(
            spec.config.get("pattern"),
            Some(&ConfigValue::from("^Trailer"))
        );

        let bare: RuleSpec = serde_yaml::from_str("filter: shorter_than").unwrap();
        assert!(bare.config.is_empty());
    }

    #[test]
    fn test_rule_config_display() {
        let config = RuleConfig::new().with("minutes", 10).with("field", "title");
        assert_eq!(config.to_string(), "{field: 'title', minutes: 10}");
    }
}

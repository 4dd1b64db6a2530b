//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::FeedConfig;

/// Root application configuration, loaded from `feeds.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Feeds to fetch and filter, processed in this order
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,

    /// HTTP retrieval settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.feeds.is_empty() {
            return Err(AppError::validation("No feeds defined"));
        }
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.fetch.max_concurrent == 0 {
            return Err(AppError::validation("fetch.max_concurrent must be > 0"));
        }
        if self.logging.level.parse::<log::LevelFilter>().is_err() {
            return Err(AppError::validation(format!(
                "logging.level '{}' is not a log level",
                self.logging.level
            )));
        }

        let mut outputs = HashSet::new();
        for feed in &self.feeds {
            if feed.name.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "feed with url '{}' has an empty name",
                    feed.feed_url
                )));
            }
            let url = Url::parse(&feed.feed_url).map_err(|e| {
                AppError::validation(format!(
                    "feed '{}' has an invalid feed_url '{}': {}",
                    feed.name, feed.feed_url, e
                ))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(AppError::validation(format!(
                    "feed '{}' uses unsupported scheme '{}'",
                    feed.name,
                    url.scheme()
                )));
            }
            if feed.file_name.as_os_str().is_empty() {
                return Err(AppError::validation(format!(
                    "feed '{}' has an empty file_name",
                    feed.name
                )));
            }
            if !outputs.insert(output_key(&feed.file_name)) {
                return Err(AppError::validation(format!(
                    "feed '{}' writes to {}, which another feed already uses",
                    feed.name,
                    feed.file_name.display()
                )));
            }
        }
        Ok(())
    }
}

/// Output path with `.` components removed, so `out.xml` and `./out.xml`
/// compare equal.
fn output_key(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// HTTP retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Additional attempts after a failed fetch
    #[serde(default)]
    pub retries: u32,

    /// Delay between attempts in milliseconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,

    /// Number of feeds processed at the same time
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            retries: 0,
            retry_delay_ms: defaults::retry_delay(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when neither the CLI nor `LOGLEVEL` sets one
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        concat!("podfilter/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn retry_delay() -> u64 {
        1000
    }
    pub fn max_concurrent() -> usize {
        1
    }
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
feeds:
  - name: More or Less
    feed_url: https://podcasts.example.com/moreorless.rss
    file_name: more-or-less.xml
    filters:
      - filter: shorter_than
        config:
          minutes: 15
      - filter: regex_exclude
        config:
          field: title
          pattern: Book Club
          case_insensitive: true
  - name: Unfiltered
    feed_url: http://example.org/feed
    file_name: unfiltered.xml
"#;

    #[test]
    fn test_parse_sample_config() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.feeds.len(), 2);

        let first = &config.feeds[0];
        assert_eq!(first.name, "More or Less");
        assert_eq!(first.filters.len(), 2);
        assert_eq!(first.filters[0].kind, "shorter_than");
        assert_eq!(
            first.filters[0].config.get("minutes").and_then(|v| v.as_u64()),
            Some(15)
        );
        assert_eq!(
            first.filters[1].config.get("case_insensitive").and_then(|v| v.as_bool()),
            Some(true)
        );

        assert!(config.feeds[1].filters.is_empty());
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.fetch.max_concurrent, 1);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_feed_list() {
        let config = Config::from_yaml("feeds: []").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let yaml = "feeds:\n  - name: a\n    feed_url: not a url\n    file_name: a.xml\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert!(config.validate().is_err());

        let yaml = "feeds:\n  - name: a\n    feed_url: ftp://example.com/a\n    file_name: a.xml\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_shared_output() {
        let yaml = r#"
feeds:
  - name: a
    feed_url: https://example.com/a
    file_name: out.xml
  - name: b
    feed_url: https://example.com/b
    file_name: out.xml
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn test_validate_rejects_same_output_spelled_differently() {
        let yaml = r#"
feeds:
  - name: a
    feed_url: https://example.com/a
    file_name: out.xml
  - name: b
    feed_url: https://example.com/b
    file_name: ./out.xml
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'b'"));

        assert_eq!(output_key(Path::new("./feeds/./out.xml")), PathBuf::from("feeds/out.xml"));
        assert_ne!(output_key(Path::new("feeds/out.xml")), output_key(Path::new("out.xml")));
    }

    #[test]
    fn test_validate_rejects_unknown_log_level() {
        let mut config = Config::from_yaml(SAMPLE).unwrap();
        config.logging.level = "verbose".into();
        assert!(config.validate().is_err());
        config.logging.level = "DEBUG".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = Config::from_yaml(SAMPLE).unwrap();
        config.fetch.max_concurrent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_feed_key_is_yaml_error() {
        let yaml = "feeds:\n  - name: a\n    file_name: a.xml\n";
        assert!(matches!(Config::from_yaml(yaml), Err(AppError::Yaml(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feeds.yaml");
        fs::write(&path, SAMPLE).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.feeds.len(), 2);

        assert!(Config::load(dir.path().join("missing.yaml")).is_err());
    }
}

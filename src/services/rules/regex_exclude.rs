// src/services/rules/regex_exclude.rs

//! `regex_exclude`: drop episodes whose field matches a pattern.

use regex::{Regex, RegexBuilder};

use crate::error::{AppError, Result};
use crate::models::{EpisodeRecord, RuleConfig};

use super::{Rule, Verdict};

pub struct RegexExclude {
    field: String,
    regex: Regex,
}

impl RegexExclude {
    pub const KIND: &'static str = "regex_exclude";

    /// Compile a rule matching `pattern` anywhere in `field`.
    pub fn new(field: impl Into<String>, pattern: &str, case_insensitive: bool) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| AppError::config(format!("invalid pattern '{pattern}': {e}")))?;

        Ok(Self {
            field: field.into(),
            regex,
        })
    }

    pub fn build(config: &RuleConfig) -> Result<Box<dyn Rule>> {
        let field = required(config, "field")?;
        let pattern = required(config, "pattern")?;
        let case_insensitive = match config.get("case_insensitive") {
            None => false,
            Some(value) => value.as_bool().ok_or_else(|| {
                AppError::config(format!("'case_insensitive' must be a boolean, got {value}"))
            })?,
        };

        Ok(Box::new(Self::new(field, &pattern, case_insensitive)?))
    }
}

fn required(config: &RuleConfig, key: &str) -> Result<String> {
    config
        .get(key)
        .map(|v| v.as_text())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::config(format!("missing required key '{key}'")))
}

impl Rule for RegexExclude {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn evaluate(&self, record: &EpisodeRecord) -> Verdict {
        let Some(value) = record.get(&self.field) else {
            log::warn!(
                "Retaining '{}'; it has no '{}' field for {}",
                record.label(),
                self.field,
                Self::KIND
            );
            return Verdict::Keep;
        };

        if self.regex.is_match(value) {
            log::info!(
                "Filtering out '{}'; field '{}' matches pattern '{}'",
                record.label(),
                self.field,
                self.regex.as_str()
            );
            log::debug!("Field '{}': '{}'", self.field, value);
            Verdict::Discard
        } else {
            log::debug!(
                "Retaining '{}'; field '{}' does not match pattern '{}'",
                record.label(),
                self.field,
                self.regex.as_str()
            );
            Verdict::Keep
        }
    }
}

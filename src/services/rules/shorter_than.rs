// src/services/rules/shorter_than.rs

//! `shorter_than`: drop episodes whose duration is below a threshold.
//!
//! Built for feeds that publish both a full programme and a short excerpt of
//! it. Fails open: with no usable threshold, or an episode without a usable
//! duration, the episode is kept.

use crate::error::{AppError, Result};
use crate::models::{EpisodeRecord, RuleConfig};

use super::{Rule, Verdict};

/// Unit keys in precedence order, with their length in seconds.
const UNITS: [(&str, u64); 3] = [("seconds", 1), ("minutes", 60), ("hours", 60 * 60)];

pub struct ShorterThan {
    /// `None` when the configuration named no unit
    threshold_secs: Option<u64>,
}

impl ShorterThan {
    pub const KIND: &'static str = "shorter_than";

    pub fn new(threshold_secs: u64) -> Self {
        Self {
            threshold_secs: Some(threshold_secs),
        }
    }

    pub fn build(config: &RuleConfig) -> Result<Box<dyn Rule>> {
        let present: Vec<(&str, u64)> = UNITS
            .iter()
            .copied()
            .filter(|(unit, _)| config.contains_key(unit))
            .collect();

        let Some(&(unit, factor)) = present.first() else {
            log::warn!(
                "{} has no seconds, minutes or hours key in {}; episodes will be kept",
                Self::KIND,
                config
            );
            return Ok(Box::new(Self {
                threshold_secs: None,
            }));
        };
        if present.len() > 1 {
            log::warn!(
                "{} has more than one unit in {}; using '{}'",
                Self::KIND,
                config,
                unit
            );
        }

        let value = config.get(unit).and_then(|v| v.as_u64()).ok_or_else(|| {
            AppError::config(format!(
                "'{}' must be a non-negative number, got {}",
                unit,
                config.get(unit).map(|v| v.to_string()).unwrap_or_default()
            ))
        })?;
        let threshold = value
            .checked_mul(factor)
            .ok_or_else(|| AppError::config(format!("'{unit}' value {value} is too large")))?;

        Ok(Box::new(Self::new(threshold)))
    }
}

impl Rule for ShorterThan {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn evaluate(&self, record: &EpisodeRecord) -> Verdict {
        let Some(threshold) = self.threshold_secs else {
            log::debug!(
                "Retaining '{}'; {} has no threshold",
                record.label(),
                Self::KIND
            );
            return Verdict::Keep;
        };

        let Some(raw) = record.get("duration") else {
            log::info!("Retaining '{}'; it has no duration field", record.label());
            return Verdict::Keep;
        };

        let duration = match parse_duration(raw) {
            Ok(secs) => secs,
            Err(e) => {
                log::warn!("Retaining '{}'; {}", record.label(), e);
                return Verdict::Keep;
            }
        };

        if duration < threshold {
            log::info!(
                "Filtering out '{}'; duration of {}s shorter than {}s",
                record.label(),
                duration,
                threshold
            );
            Verdict::Discard
        } else {
            log::debug!(
                "Retaining '{}'; duration of {}s at least {}s",
                record.label(),
                duration,
                threshold
            );
            Verdict::Keep
        }
    }
}

/// Parse a duration as whole seconds, `MM:SS` or `HH:MM:SS`.
pub fn parse_duration(raw: &str) -> Result<u64> {
    let invalid = || AppError::field("duration", format!("cannot parse '{raw}' as a duration"));
    let value = raw.trim();
    if value.is_empty() {
        return Err(invalid());
    }

    let parts = value
        .split(':')
        .map(|part| part.trim().parse::<u64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;

    match parts.as_slice() {
        [secs] => Ok(*secs),
        [mins, secs] => Ok(mins.saturating_mul(60).saturating_add(*secs)),
        [hours, mins, secs] => Ok(hours
            .saturating_mul(3600)
            .saturating_add(mins.saturating_mul(60))
            .saturating_add(*secs)),
        _ => Err(invalid()),
    }
}

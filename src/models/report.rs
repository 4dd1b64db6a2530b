//! Run report structures.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Item counts for one filtered feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    pub items_total: usize,
    pub items_kept: usize,
    pub items_dropped: usize,

    /// Rule kind that dropped each item, counted per kind
    #[serde(default)]
    pub dropped_by: BTreeMap<String, usize>,
}

impl FilterStats {
    pub fn record_kept(&mut self) {
        self.items_total += 1;
        self.items_kept += 1;
    }

    pub fn record_dropped(&mut self, kind: &str) {
        self.items_total += 1;
        self.items_dropped += 1;
        *self.dropped_by.entry(kind.to_string()).or_default() += 1;
    }
}

/// Final state of one feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedStatus {
    /// Fetched, filtered and (unless dry-run) written
    Filtered {
        stats: FilterStats,
        output: Option<String>,
    },
    /// Aborted; sibling feeds were still attempted
    Failed { error: String },
}

/// Outcome of one feed within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedOutcome {
    pub name: String,
    pub feed_url: String,
    #[serde(flatten)]
    pub status: FeedStatus,
}

impl FeedOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, FeedStatus::Filtered { .. })
    }
}

/// Per-feed record of a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub feeds: Vec<FeedOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.feeds.iter().filter(|f| f.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.feeds.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Total items dropped across all successful feeds.
    pub fn items_dropped(&self) -> usize {
        self.feeds
            .iter()
            .filter_map(|f| match &f.status {
                FeedStatus::Filtered { stats, .. } => Some(stats.items_dropped),
                FeedStatus::Failed { .. } => None,
            })
            .sum()
    }
}

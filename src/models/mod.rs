// src/models/mod.rs

//! Domain models for the feed filter.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod episode;
mod feed;
mod report;

// Re-export all public types
pub use config::{Config, FetchConfig, LoggingConfig};
pub use episode::EpisodeRecord;
pub use feed::{ConfigValue, FeedConfig, RuleConfig, RuleSpec};
pub use report::{FeedOutcome, FeedStatus, FilterStats, RunReport};

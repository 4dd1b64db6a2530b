//! Service layer for the feed filter.
//!
//! This module contains the business logic for:
//! - Feed documents (`FeedDocument`)
//! - Record extraction (`extract_record`)
//! - Rule resolution and evaluation (`RuleRegistry`, `RuleChain`)

mod document;
mod extractor;
pub mod rules;

pub use document::{FeedDocument, ItemNode};
pub use extractor::extract_record;
pub use rules::{Rule, RuleChain, RuleRegistry, Verdict};

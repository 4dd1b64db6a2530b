// src/pipeline/filter.rs

//! Item filtering: one document, one rule chain.

use crate::models::FilterStats;
use crate::services::{FeedDocument, RuleChain, extract_record};

/// Drop every item that a rule in `chain` discards.
///
/// Items are evaluated in document order against a snapshot of the channel;
/// survivors keep their order and everything outside the items is untouched.
pub fn filter_document(document: &mut FeedDocument, chain: &RuleChain) -> FilterStats {
    let mut stats = FilterStats::default();

    document.retain_items(|item| {
        let record = extract_record(item);
        match chain.first_discard(&record) {
            Some(kind) => {
                log::info!(
                    "[{}] Removing '{}' ({})",
                    chain.feed(),
                    record.get("guid").unwrap_or(record.label()),
                    kind
                );
                stats.record_dropped(kind);
                false
            }
            None => {
                stats.record_kept();
                true
            }
        }
    });

    stats
}

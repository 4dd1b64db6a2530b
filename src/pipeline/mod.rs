//! Pipeline entry points for feed filtering.
//!
//! - `run_validate`: Check configuration and compile rule chains
//! - `process_feed`: Fetch, parse and filter a single feed
//! - `run_feeds`: Process every feed and write the results

pub mod filter;
pub mod run;
pub mod validate;

pub use filter::filter_document;
pub use run::{FeedJob, compile_feeds, process_feed, run_feed, run_feeds};
pub use validate::run_validate;

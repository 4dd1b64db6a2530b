//! Storage abstractions for filtered feed output.

pub mod local;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for feed output backends.
#[async_trait]
pub trait FeedWriter: Send + Sync {
    /// Write a serialized feed, replacing any previous content.
    ///
    /// Returns a display string for the written location.
    async fn write_feed(&self, file_name: &Path, bytes: &[u8]) -> Result<String>;
}

// src/pipeline/run.rs

//! Feed processing: fetch, parse, filter and write every configured feed.

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::{Config, FeedConfig, FeedOutcome, FeedStatus, FilterStats, RunReport};
use crate::services::{FeedDocument, RuleChain, RuleRegistry};
use crate::storage::FeedWriter;
use crate::utils::http::FeedSource;

use super::filter::filter_document;

/// A feed together with its compiled rule chain.
pub struct FeedJob {
    pub feed: FeedConfig,
    pub chain: RuleChain,
}

/// Compile the rule chain of every feed.
///
/// Any unknown rule kind or malformed rule configuration aborts here, before
/// a single feed is fetched.
pub fn compile_feeds(config: &Config, registry: &RuleRegistry) -> Result<Vec<FeedJob>> {
    config
        .feeds
        .iter()
        .map(|feed| -> Result<FeedJob> {
            Ok(FeedJob {
                feed: feed.clone(),
                chain: registry.build_chain(feed)?,
            })
        })
        .collect()
}

/// Fetch, parse and filter one feed, returning the filtered document.
pub async fn process_feed(
    source: &dyn FeedSource,
    job: &FeedJob,
) -> Result<(FeedDocument, FilterStats)> {
    let feed = &job.feed;
    log::info!("Processing feed '{}' from '{}'", feed.name, feed.feed_url);

    let bytes = source.fetch(&feed.feed_url).await?;
    let mut document = FeedDocument::parse(&bytes).map_err(|e| match e {
        AppError::Parse { context, message } => {
            AppError::parse(format!("feed '{}' ({})", feed.name, context), message)
        }
        other => other,
    })?;

    let stats = filter_document(&mut document, &job.chain);
    log::info!(
        "[{}] Kept {} of {} items",
        feed.name,
        stats.items_kept,
        stats.items_total
    );
    Ok((document, stats))
}

/// Process one feed end to end. Failures are captured in the outcome.
pub async fn run_feed(
    source: &dyn FeedSource,
    writer: Option<&dyn FeedWriter>,
    job: &FeedJob,
) -> FeedOutcome {
    let status = match write_feed(source, writer, job).await {
        Ok((stats, output)) => FeedStatus::Filtered { stats, output },
        Err(e) => {
            log::error!("Feed '{}' failed: {}", job.feed.name, e);
            FeedStatus::Failed {
                error: e.to_string(),
            }
        }
    };

    FeedOutcome {
        name: job.feed.name.clone(),
        feed_url: job.feed.feed_url.clone(),
        status,
    }
}

async fn write_feed(
    source: &dyn FeedSource,
    writer: Option<&dyn FeedWriter>,
    job: &FeedJob,
) -> Result<(FilterStats, Option<String>)> {
    let (document, stats) = process_feed(source, job).await?;

    let output = match writer {
        Some(writer) => {
            let bytes = document.to_xml()?;
            let location = writer.write_feed(&job.feed.file_name, &bytes).await?;
            log::info!("[{}] Saved to {}", job.feed.name, location);
            Some(location)
        }
        None => None,
    };
    Ok((stats, output))
}

/// Run every feed and collect a report, in configuration order.
///
/// A failing feed never stops its siblings. With `concurrency` above one,
/// feeds are processed as independent concurrent units.
pub async fn run_feeds(
    jobs: &[FeedJob],
    source: &dyn FeedSource,
    writer: Option<&dyn FeedWriter>,
    concurrency: usize,
) -> RunReport {
    let started_at = Utc::now();

    let feeds: Vec<FeedOutcome> = stream::iter(jobs)
        .map(|job| run_feed(source, writer, job))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    RunReport {
        started_at,
        finished_at: Utc::now(),
        feeds,
    }
}

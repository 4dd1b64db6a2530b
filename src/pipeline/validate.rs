// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::Config;
use crate::services::RuleRegistry;

use super::run::{FeedJob, compile_feeds};

/// Validate the configuration and compile every rule chain, without
/// touching the network.
pub fn run_validate(config: &Config, registry: &RuleRegistry) -> Result<Vec<FeedJob>> {
    let jobs = config.validate().and_then(|_| compile_feeds(config, registry));

    match jobs {
        Ok(jobs) => {
            log::info!("Configuration OK: {} feed(s)", jobs.len());
            for job in &jobs {
                let kinds: Vec<&str> = job.chain.kinds().collect();
                log::info!(
                    "    {} -> {} [{}]",
                    job.feed.name,
                    job.feed.file_name.display(),
                    if kinds.is_empty() {
                        "no filters".to_string()
                    } else {
                        kinds.join(", ")
                    }
                );
            }
            Ok(jobs)
        }
        Err(e) => {
            log::error!("Validation failed: {}", e);
            Err(e)
        }
    }
}

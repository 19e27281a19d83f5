// src/batch.rs
//! One invocation = one bounded batch off the front of the pending queue.

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::EnrichConfig;
use crate::enricher::{Enricher, Outcome};
use crate::search::ProfileSearch;
use crate::store::{ErrorLog, OutputStore, PendingStore};
use crate::types::BatchSummary;

/// Counts shown by `status`, computed without touching the search API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub pending_initialized: bool,
    pub remaining: usize,
    pub processed: usize,
    pub batch_size: usize,
}

pub struct BatchDriver {
    config: EnrichConfig,
    enricher: Enricher,
    pending: PendingStore,
    output: OutputStore,
    errors: ErrorLog,
}

impl BatchDriver {
    pub fn new(config: EnrichConfig, search: Arc<dyn ProfileSearch>) -> Result<Self> {
        config.validate()?;
        let enricher = Enricher::new(search, &config)?;
        Ok(Self {
            pending: PendingStore::new(&config.pending_path),
            output: OutputStore::new(&config.output_path, &config.org_column_prefix),
            errors: ErrorLog::new(&config.error_log_path),
            enricher,
            config,
        })
    }

    /// Process up to `batch_size` people, append one output row for each, and
    /// only then drop them from the pending file.
    pub async fn run_batch(&self) -> Result<BatchSummary> {
        let mut queue = self
            .pending
            .load_or_init(&self.config.input_path)
            .await?;

        if queue.is_empty() {
            info!("All done! No one left in {}", self.pending.path().display());
            return Ok(BatchSummary::default());
        }

        self.output.ensure_header().await?;

        let batch = queue.people(self.config.batch_size);
        info!(
            "Processing batch of {} (out of {} remaining)",
            batch.len(),
            queue.len()
        );

        let mut summary = BatchSummary::default();
        let delay = self.config.request_delay();

        for (i, person) in batch.iter().enumerate() {
            let result = self.enricher.enrich(person).await;
            let label = if result.search_name != person.fullname {
                format!(
                    "{} ({}) [searched as {}]",
                    person.fullname, person.email, result.search_name
                )
            } else {
                format!("{} ({})", person.fullname, person.email)
            };

            match &result.outcome {
                Outcome::Found => {
                    summary.found += 1;
                    info!(
                        "[{}/{}] {} - Found: {}",
                        i + 1,
                        batch.len(),
                        label,
                        result.record.linkedin_url
                    );
                }
                Outcome::NotFound => {
                    summary.not_found += 1;
                    info!("[{}/{}] {} - Not found", i + 1, batch.len(), label);
                }
                Outcome::Failed(message) => {
                    summary.errors += 1;
                    error!("[{}/{}] {} - Error: {}", i + 1, batch.len(), label, message);
                    if let Err(e) = self.errors.record(person, message).await {
                        warn!("Could not write error log entry: {:#}", e);
                    }
                }
            }

            self.output.append(&result.record).await?;
            summary.processed += 1;

            if let Some(pause) = pause_after(i, batch.len(), delay) {
                tokio::time::sleep(pause).await;
            }
        }

        queue.drain_front(batch.len());
        self.pending.save(&queue).await?;
        summary.remaining = queue.len();

        info!(
            "Batch complete! Found: {}, Not found/errors: {}",
            summary.found,
            summary.not_found + summary.errors
        );
        info!("Remaining: {} people", summary.remaining);
        info!("Results appended to: {}", self.output.path().display());
        if summary.remaining > 0 {
            info!(
                "Run again to process the next {}.",
                summary.remaining.min(self.config.batch_size)
            );
        }

        Ok(summary)
    }
}

/// Rate-limit pause after the person at `index`; never after the last one.
fn pause_after(index: usize, batch_len: usize, delay: Duration) -> Option<Duration> {
    (index + 1 < batch_len && !delay.is_zero()).then_some(delay)
}

/// Pending and processed counts; needs no API access.
pub async fn status(config: &EnrichConfig) -> Result<StatusReport> {
    let pending = PendingStore::new(&config.pending_path);
    let output = OutputStore::new(&config.output_path, &config.org_column_prefix);

    let pending_initialized = pending.exists();
    let remaining = if pending_initialized {
        pending.load().await?.len()
    } else {
        0
    };
    Ok(StatusReport {
        pending_initialized,
        remaining,
        processed: output.count_rows().await?,
        batch_size: config.batch_size,
    })
}

/// Create the pending file from the roster. Refuses to overwrite unless `force`.
pub async fn init_pending(config: &EnrichConfig, force: bool) -> Result<usize> {
    let pending = PendingStore::new(&config.pending_path);
    if pending.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to rebuild it from {}",
            pending.path().display(),
            config.input_path.display()
        );
    }
    let queue = pending.init_from_roster(&config.input_path).await?;
    Ok(queue.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_between_people_only() {
        let delay = Duration::from_millis(1000);
        let pauses: Vec<Option<Duration>> = (0..4).map(|i| pause_after(i, 4, delay)).collect();
        assert_eq!(pauses.iter().flatten().count(), 3);
        assert_eq!(pauses[3], None);
        assert!(pauses[..3].iter().all(|p| *p == Some(delay)));
    }

    #[test]
    fn test_single_person_batch_never_pauses() {
        assert_eq!(pause_after(0, 1, Duration::from_millis(1000)), None);
    }

    #[test]
    fn test_zero_delay_never_pauses() {
        assert!((0..5).all(|i| pause_after(i, 5, Duration::ZERO).is_none()));
    }
}

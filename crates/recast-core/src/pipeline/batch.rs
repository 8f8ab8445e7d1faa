//! Batch orchestration: fan out one conversion task per item, fan results in.
//!
//! Every item is spawned as its own tokio task straight away; a semaphore
//! bounds how many are inside the codec at once. Tasks report over a bounded
//! channel to a single aggregation loop, which owns the progress counter and
//! the outcome slots, so nothing mutable is shared between tasks.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};

use crate::config::BatchConfig;
use crate::error::{BatchError, ConversionError};
use crate::types::{
    BatchProgress, ConversionFailure, ConversionOutcome, ConversionRequest, ItemId, PendingItem,
};

use super::converter::Converter;

/// Runs a [`Converter`] over a whole batch.
pub struct BatchRunner {
    converter: Converter,
    config: BatchConfig,
}

impl BatchRunner {
    pub fn new(converter: Converter, config: BatchConfig) -> Self {
        Self { converter, config }
    }

    /// Convert every item with the shared `request`.
    ///
    /// `on_progress` is called once per item, in completion order, with the
    /// updated progress and the outcome that was just produced. The returned
    /// outcomes are in input order and there is exactly one per item.
    ///
    /// Fails only on precondition violations, before any work starts.
    pub async fn run<F>(
        &self,
        items: Vec<PendingItem>,
        request: ConversionRequest,
        mut on_progress: F,
    ) -> Result<Vec<ConversionOutcome>, BatchError>
    where
        F: FnMut(&BatchProgress, &ConversionOutcome),
    {
        if items.is_empty() {
            return Err(BatchError::EmptyBatch);
        }
        request
            .validate_within(self.converter.max_dimension())
            .map_err(BatchError::InvalidRequest)?;

        let total = items.len();
        let start = Instant::now();
        tracing::info!("Converting {} image(s) to {}", total, request.target_format);

        let request = Arc::new(request);
        let semaphore = Arc::new(Semaphore::new(self.config.parallel_workers.max(1)));
        let (tx, mut rx) =
            mpsc::channel::<(usize, ConversionOutcome)>(self.config.buffer_size.max(1));

        let labels: Vec<(ItemId, String)> = items
            .iter()
            .map(|item| (item.id, item.source_filename.clone()))
            .collect();
        let mut handles = Vec::with_capacity(total);

        for (index, item) in items.into_iter().enumerate() {
            let converter = self.converter.clone();
            let request = request.clone();
            let semaphore = semaphore.clone();
            let tx = tx.clone();

            handles.push(tokio::spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => converter.convert(&item, &request).await,
                    Err(_) => aborted(item.id, &item.source_filename, "worker pool closed"),
                };
                if tx.send((index, outcome)).await.is_err() {
                    tracing::warn!("Batch collector dropped before {} reported", item.id);
                }
            }));
        }
        drop(tx);

        let mut outcomes: Vec<Option<ConversionOutcome>> = (0..total).map(|_| None).collect();
        let mut progress = BatchProgress::new(total);

        while let Some((index, outcome)) = rx.recv().await {
            progress.record(outcome.kind());
            on_progress(&progress, &outcome);
            outcomes[index] = Some(outcome);
        }

        // A task that panicked never reported; give its item a terminal outcome.
        for (index, handle) in handles.into_iter().enumerate() {
            let joined = handle.await;
            if outcomes[index].is_some() {
                continue;
            }
            let (id, filename) = &labels[index];
            let reason = match joined {
                Err(e) => {
                    tracing::error!("Conversion task for {} panicked: {e}", filename);
                    e.to_string()
                }
                Ok(()) => "task finished without reporting".to_string(),
            };
            let outcome = aborted(*id, filename, &reason);
            progress.record(outcome.kind());
            on_progress(&progress, &outcome);
            outcomes[index] = Some(outcome);
        }

        tracing::info!(
            "Batch finished in {:?}: {} succeeded, {} failed",
            start.elapsed(),
            progress.succeeded,
            progress.failed
        );

        Ok(outcomes.into_iter().flatten().collect())
    }
}

fn aborted(item_id: ItemId, filename: &str, reason: &str) -> ConversionOutcome {
    ConversionOutcome::Failure(ConversionFailure {
        item_id,
        source_filename: filename.to_string(),
        error: ConversionError::Aborted {
            reason: reason.to_string(),
        },
    })
}

//! A conversion session: the working list of pending images plus the
//! outcomes of its most recent run.

use std::sync::Arc;

use crate::config::Config;
use crate::error::BatchError;
use crate::pipeline::{BatchRunner, Codec, Converter, Ingestor, NativeCodec};
use crate::types::{
    BatchProgress, ConversionOutcome, ConversionRequest, ItemId, PendingItem, RawInput,
};

/// Owns pending items across add / remove / convert / clear cycles.
///
/// `convert` borrows the session mutably, so the item list cannot change
/// while a run is in flight.
pub struct ConversionSession {
    ingestor: Ingestor,
    runner: BatchRunner,
    items: Vec<PendingItem>,
    outcomes: Vec<ConversionOutcome>,
}

impl ConversionSession {
    /// Session backed by the native codec.
    pub fn new(config: &Config) -> Self {
        Self::with_codec(Arc::new(NativeCodec::new(config.limits.clone())), config)
    }

    pub fn with_codec(codec: Arc<dyn Codec>, config: &Config) -> Self {
        let converter =
            Converter::new(codec.clone()).with_max_dimension(config.limits.max_image_dimension);
        Self {
            ingestor: Ingestor::new(codec, config.limits.clone()),
            runner: BatchRunner::new(converter, config.batch.clone()),
            items: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    /// Ingest raw inputs and append the accepted ones. Returns how many were
    /// accepted.
    pub async fn add(&mut self, inputs: Vec<RawInput>) -> usize {
        let added = self.ingestor.ingest(inputs).await;
        let count = added.len();
        self.items.extend(added);
        count
    }

    /// Drop one pending item. Returns false if no item has that id.
    pub fn remove(&mut self, id: ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn items(&self) -> &[PendingItem] {
        &self.items
    }

    /// Outcomes of the last run, in the order the items were listed.
    pub fn outcomes(&self) -> &[ConversionOutcome] {
        &self.outcomes
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Forget every item and outcome and start ids from zero again.
    pub fn clear(&mut self) {
        tracing::debug!(
            "Clearing session: {} item(s), {} outcome(s)",
            self.items.len(),
            self.outcomes.len()
        );
        self.items.clear();
        self.outcomes.clear();
        self.ingestor.reset_ids();
    }

    /// Convert every current item. Outcomes from a previous run are replaced.
    pub async fn convert<F>(
        &mut self,
        request: ConversionRequest,
        on_progress: F,
    ) -> Result<&[ConversionOutcome], BatchError>
    where
        F: FnMut(&BatchProgress, &ConversionOutcome),
    {
        self.outcomes.clear();
        let outcomes = self
            .runner
            .run(self.items.clone(), request, on_progress)
            .await?;
        self.outcomes = outcomes;
        Ok(&self.outcomes)
    }
}

//! Ingestion: raw uploaded buffers become measured [`PendingItem`]s.

use futures_util::future::join_all;
use std::sync::Arc;

use crate::config::LimitsConfig;
use crate::types::{ItemId, PendingItem, RawInput};

use super::codec::Codec;

/// Filters and measures raw inputs, handing out sequential item ids.
///
/// Inputs that cannot become a pending item are dropped with a warning; they
/// never reach the batch and never produce an outcome.
pub struct Ingestor {
    codec: Arc<dyn Codec>,
    limits: LimitsConfig,
    next_id: u64,
}

impl Ingestor {
    pub fn new(codec: Arc<dyn Codec>, limits: LimitsConfig) -> Self {
        Self {
            codec,
            limits,
            next_id: 0,
        }
    }

    /// Turn raw inputs into pending items, preserving input order.
    pub async fn ingest(&mut self, inputs: Vec<RawInput>) -> Vec<PendingItem> {
        let max_bytes = self.limits.max_file_size_bytes();

        let accepted: Vec<RawInput> = inputs
            .into_iter()
            .filter(|input| {
                if !input.mime_type.starts_with("image/") {
                    tracing::warn!(
                        "Skipping {}: not an image ({})",
                        input.filename,
                        input.mime_type
                    );
                    return false;
                }
                if input.bytes.len() as u64 > max_bytes {
                    tracing::warn!(
                        "Skipping {}: {} bytes exceeds the {} MB limit",
                        input.filename,
                        input.bytes.len(),
                        self.limits.max_file_size_mb
                    );
                    return false;
                }
                true
            })
            .collect();

        let measured = join_all(accepted.into_iter().map(|input| {
            let codec = self.codec.clone();
            async move {
                let bytes: Arc<[u8]> = Arc::from(input.bytes);
                let size = codec.probe(bytes.clone(), &input.mime_type).await;
                (bytes, input.filename, input.mime_type, size)
            }
        }))
        .await;

        let mut items = Vec::with_capacity(measured.len());
        for (bytes, filename, mime_type, size) in measured {
            let (width, height) = match size {
                Ok((w, h)) if w > 0 && h > 0 => (w, h),
                Ok((w, h)) => {
                    tracing::warn!("Skipping {}: degenerate size {}x{}", filename, w, h);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: cannot measure dimensions: {}", filename, e);
                    continue;
                }
            };

            let max_dim = self.limits.max_image_dimension;
            if width > max_dim || height > max_dim {
                tracing::warn!(
                    "Skipping {}: {}x{} exceeds the {}px limit",
                    filename,
                    width,
                    height,
                    max_dim
                );
                continue;
            }

            let id = ItemId(self.next_id);
            self.next_id += 1;
            tracing::debug!("Ingested {} as {} ({}x{})", filename, id, width, height);

            items.push(PendingItem {
                id,
                source_bytes: bytes,
                source_filename: filename,
                mime_type,
                original_width: width,
                original_height: height,
            });
        }

        items
    }

    /// Restart id allocation from zero.
    pub fn reset_ids(&mut self) {
        self.next_id = 0;
    }
}

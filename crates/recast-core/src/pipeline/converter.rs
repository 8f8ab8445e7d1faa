//! Single-item conversion: capability check, decode, resize, encode, name.

use std::sync::Arc;
use std::time::Instant;

use crate::config::LimitsConfig;
use crate::error::{CodecError, ConversionError};
use crate::types::{
    ConversionFailure, ConversionOutcome, ConversionRequest, ConvertedImage, PendingItem,
};

use super::capability::{capability, FormatCapability, SVG_MIME};
use super::codec::Codec;
use super::dimensions::resolve;
use super::naming::output_filename;

/// Converts one pending item into exactly one outcome.
///
/// Every failure is captured here and returned as a `Failure` outcome.
#[derive(Clone)]
pub struct Converter {
    codec: Arc<dyn Codec>,
    max_dimension: u32,
}

impl Converter {
    pub fn new(codec: Arc<dyn Codec>) -> Self {
        Self {
            codec,
            max_dimension: LimitsConfig::default().max_image_dimension,
        }
    }

    /// Largest output width or height this converter will produce.
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Convert `item` according to `request`.
    pub async fn convert(
        &self,
        item: &PendingItem,
        request: &ConversionRequest,
    ) -> ConversionOutcome {
        let start = Instant::now();
        tracing::debug!(
            "Converting {:?} ({}) to {}",
            item.source_filename,
            item.id,
            request.target_format
        );

        match self.try_convert(item, request).await {
            Ok(converted) => {
                tracing::debug!(
                    "Converted {:?} -> {:?} in {:?} ({} -> {} bytes)",
                    converted.source_filename,
                    converted.output_filename,
                    start.elapsed(),
                    converted.source_size,
                    converted.output_size
                );
                ConversionOutcome::Success(converted)
            }
            Err(error) => {
                tracing::debug!("Failed {:?}: {}", item.source_filename, error);
                ConversionOutcome::Failure(ConversionFailure {
                    item_id: item.id,
                    source_filename: item.source_filename.clone(),
                    error,
                })
            }
        }
    }

    async fn try_convert(
        &self,
        item: &PendingItem,
        request: &ConversionRequest,
    ) -> Result<ConvertedImage, ConversionError> {
        let format = &request.target_format;
        let cap = capability(format);

        if !cap.encodable {
            return Err(ConversionError::UnsupportedFormat {
                format: format.clone(),
            });
        }

        if cap.is_vector() {
            return if source_matches(item, &cap) {
                Ok(passthrough(item, request))
            } else {
                Err(ConversionError::UnsupportedConversionKind {
                    format: format.clone(),
                })
            };
        }

        let (width, height) = resolve(
            item.original_width,
            item.original_height,
            request.target_width,
            request.target_height,
            request.keep_aspect_ratio,
        );
        if width > self.max_dimension || height > self.max_dimension {
            return Err(ConversionError::EncodeFailure {
                format: format.clone(),
                reason: format!(
                    "output {width}x{height} exceeds the {}px limit",
                    self.max_dimension
                ),
            });
        }

        // Decode. Vector sources render straight at the output size.
        let decode_start = Instant::now();
        let render_size = is_vector_source(item).then_some((width, height));
        let decoded = self
            .codec
            .decode(item.source_bytes.clone(), &item.mime_type, render_size)
            .await
            .map_err(|e| match e {
                CodecError::Timeout { stage, timeout_ms } => timeout_error(stage, timeout_ms),
                other => ConversionError::DecodeFailure {
                    filename: item.source_filename.clone(),
                    reason: other.to_string(),
                },
            })?;
        tracing::trace!("  Decode: {:?}", decode_start.elapsed());

        // Resize
        let surface = if (decoded.width(), decoded.height()) == (width, height) {
            decoded
        } else {
            let resize_start = Instant::now();
            let resized = self
                .codec
                .resize(decoded, width, height)
                .await
                .map_err(|e| encode_error(request, e))?;
            tracing::trace!("  Resize to {}x{}: {:?}", width, height, resize_start.elapsed());
            resized
        };

        // Encode
        let encode_start = Instant::now();
        let quality = if cap.uses_quality { request.quality } else { None };
        let output_bytes = self
            .codec
            .encode(surface, format, quality)
            .await
            .map_err(|e| encode_error(request, e))?;
        tracing::trace!("  Encode: {:?}", encode_start.elapsed());

        if output_bytes.is_empty() {
            return Err(ConversionError::EncodeFailure {
                format: format.clone(),
                reason: "encoder produced no output".to_string(),
            });
        }

        Ok(ConvertedImage {
            item_id: item.id,
            source_filename: item.source_filename.clone(),
            output_filename: output_filename(&item.source_filename, format),
            source_size: item.source_size(),
            output_size: output_bytes.len() as u64,
            output_bytes,
        })
    }
}

fn is_vector_source(item: &PendingItem) -> bool {
    item.mime_type.eq_ignore_ascii_case(SVG_MIME)
}

fn source_matches(item: &PendingItem, cap: &FormatCapability) -> bool {
    cap.mime_type
        .is_some_and(|mime| item.mime_type.eq_ignore_ascii_case(mime))
}

/// Copy the source bytes through unchanged.
fn passthrough(item: &PendingItem, request: &ConversionRequest) -> ConvertedImage {
    tracing::debug!(
        "{:?} is already {}, passing through",
        item.source_filename,
        request.target_format
    );
    ConvertedImage {
        item_id: item.id,
        source_filename: item.source_filename.clone(),
        output_filename: output_filename(&item.source_filename, &request.target_format),
        output_bytes: item.source_bytes.to_vec(),
        source_size: item.source_size(),
        output_size: item.source_size(),
    }
}

fn encode_error(request: &ConversionRequest, error: CodecError) -> ConversionError {
    match error {
        CodecError::Timeout { stage, timeout_ms } => timeout_error(stage, timeout_ms),
        other => ConversionError::EncodeFailure {
            format: request.target_format.clone(),
            reason: other.to_string(),
        },
    }
}

fn timeout_error(stage: &str, timeout_ms: u64) -> ConversionError {
    ConversionError::Timeout {
        stage: stage.to_string(),
        timeout_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{jpeg_bytes, pending_item, MockCodec, SAMPLE_SVG};
    use crate::types::{ItemId, TargetFormat};
    use std::sync::atomic::Ordering;

    fn converter(codec: &Arc<MockCodec>) -> Converter {
        Converter::new(codec.clone())
    }

    fn expect_success(outcome: ConversionOutcome) -> ConvertedImage {
        match outcome {
            ConversionOutcome::Success(s) => s,
            ConversionOutcome::Failure(f) => panic!("expected success, got {}", f.message()),
        }
    }

    fn expect_failure(outcome: ConversionOutcome) -> ConversionFailure {
        match outcome {
            ConversionOutcome::Failure(f) => f,
            ConversionOutcome::Success(s) => panic!("expected failure, got {}", s.output_filename),
        }
    }

    #[tokio::test]
    async fn test_jpeg_to_png_without_resize() {
        let codec = Arc::new(MockCodec::default());
        let item = pending_item(1, "holiday.jpg", "image/jpeg", jpeg_bytes(800, 600));
        let request = ConversionRequest::new(TargetFormat::Png);

        let converted = expect_success(converter(&codec).convert(&item, &request).await);

        assert_eq!(converted.output_filename, "holiday_converted.png");
        assert!(!converted.output_bytes.is_empty());
        assert_eq!(converted.output_size, converted.output_bytes.len() as u64);
        assert_eq!(converted.source_size, item.source_size());
        let output = image::load_from_memory(&converted.output_bytes).unwrap();
        assert_eq!((output.width(), output.height()), (800, 600));
        assert_eq!(codec.resize_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_explicit_size_without_lock_is_exact() {
        let codec = Arc::new(MockCodec::default());
        let item = pending_item(1, "wide.jpg", "image/jpeg", jpeg_bytes(800, 600));
        let request = ConversionRequest::new(TargetFormat::Png)
            .with_size(Some(400), Some(300))
            .with_keep_aspect_ratio(false);

        let converted = expect_success(converter(&codec).convert(&item, &request).await);
        let output = image::load_from_memory(&converted.output_bytes).unwrap();
        assert_eq!((output.width(), output.height()), (400, 300));
    }

    #[tokio::test]
    async fn test_stretch_ignores_ratio() {
        let codec = Arc::new(MockCodec::default());
        let item = pending_item(1, "wide.jpg", "image/jpeg", jpeg_bytes(800, 600));
        let request = ConversionRequest::new(TargetFormat::Bmp)
            .with_size(Some(100), Some(500))
            .with_keep_aspect_ratio(false);

        let converted = expect_success(converter(&codec).convert(&item, &request).await);
        let output = image::load_from_memory(&converted.output_bytes).unwrap();
        assert_eq!((output.width(), output.height()), (100, 500));
    }

    #[tokio::test]
    async fn test_unsupported_format_skips_decode() {
        let codec = Arc::new(MockCodec::default());
        let item = pending_item(1, "a.jpg", "image/jpeg", jpeg_bytes(16, 16));

        for format in [TargetFormat::parse("heic"), TargetFormat::Tiff, TargetFormat::Avif] {
            let request = ConversionRequest::new(format.clone());
            let failure = expect_failure(converter(&codec).convert(&item, &request).await);
            assert_eq!(
                failure.error,
                ConversionError::UnsupportedFormat {
                    format: format.clone()
                }
            );
            assert!(failure.message().contains(&format.to_string()));
        }
        assert_eq!(codec.decode_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_svg_to_svg_passes_bytes_through() {
        let codec = Arc::new(MockCodec::default());
        let bytes = SAMPLE_SVG.as_bytes().to_vec();
        let item = pending_item(2, "logo.svg", "image/svg+xml", bytes.clone());
        let request = ConversionRequest::new(TargetFormat::Svg);

        let converted = expect_success(converter(&codec).convert(&item, &request).await);
        assert_eq!(converted.output_bytes, bytes);
        assert_eq!(converted.output_filename, "logo_converted.svg");
        assert_eq!(converted.output_size, converted.source_size);
        assert_eq!(codec.decode_calls.load(Ordering::SeqCst), 0);
        assert_eq!(codec.resize_calls.load(Ordering::SeqCst), 0);
        assert_eq!(codec.encode_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_raster_to_svg_is_rejected() {
        let codec = Arc::new(MockCodec::default());
        let item = pending_item(3, "photo.jpg", "image/jpeg", jpeg_bytes(16, 16));
        let request = ConversionRequest::new(TargetFormat::Svg);

        let failure = expect_failure(converter(&codec).convert(&item, &request).await);
        assert!(matches!(
            failure.error,
            ConversionError::UnsupportedConversionKind { .. }
        ));
        assert!(failure.message().contains("vectorization"));
        assert_eq!(codec.decode_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_svg_source_rasterizes_to_png() {
        let codec = Arc::new(MockCodec::default());
        let bytes = SAMPLE_SVG.as_bytes().to_vec();
        let item = pending_item(4, "logo.svg", "image/svg+xml", bytes);
        let request = ConversionRequest::new(TargetFormat::Png).with_size(Some(80), None);

        let converted = expect_success(converter(&codec).convert(&item, &request).await);
        let output = image::load_from_memory(&converted.output_bytes).unwrap();
        assert_eq!((output.width(), output.height()), (80, 40));
        // Rendered at the output size rather than resampled afterwards.
        assert_eq!(codec.resize_calls.load(Ordering::SeqCst), 0);
        assert_eq!(output.to_rgba8().get_pixel(0, 0).0, [0x33, 0x66, 0xff, 0xff]);
    }

    #[tokio::test]
    async fn test_output_over_dimension_limit_fails_before_decode() {
        let codec = Arc::new(MockCodec::default());
        let converter = Converter::new(codec.clone()).with_max_dimension(100);
        let item = pending_item(1, "tall.jpg", "image/jpeg", jpeg_bytes(4, 40));

        let request = ConversionRequest::new(TargetFormat::Png).with_size(Some(11), None);
        let failure = expect_failure(converter.convert(&item, &request).await);
        assert_eq!(
            failure.error,
            ConversionError::EncodeFailure {
                format: TargetFormat::Png,
                reason: "output 11x110 exceeds the 100px limit".to_string(),
            }
        );
        assert_eq!(failure.message(), "Could not encode output for PNG.");
        assert_eq!(codec.decode_calls.load(Ordering::SeqCst), 0);

        // Exactly at the limit is fine.
        let request = ConversionRequest::new(TargetFormat::Png).with_size(Some(10), None);
        let converted = expect_success(converter.convert(&item, &request).await);
        let output = image::load_from_memory(&converted.output_bytes).unwrap();
        assert_eq!((output.width(), output.height()), (10, 100));
    }

    #[tokio::test]
    async fn test_corrupt_bytes_yield_decode_failure() {
        let codec = Arc::new(MockCodec::default());
        let item = PendingItem {
            id: ItemId(9),
            source_bytes: Arc::from(&b"\xFF\xD8\xFFnot really a jpeg"[..]),
            source_filename: "broken.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            original_width: 10,
            original_height: 10,
        };
        let request = ConversionRequest::new(TargetFormat::Png);

        let failure = expect_failure(converter(&codec).convert(&item, &request).await);
        assert!(matches!(failure.error, ConversionError::DecodeFailure { .. }));
        assert_eq!(failure.message(), "Failed to load image broken.jpg");
        assert_eq!(failure.item_id, ItemId(9));
    }

    #[tokio::test]
    async fn test_empty_encoder_output_is_encode_failure() {
        let codec = Arc::new(MockCodec {
            empty_encode: true,
            ..MockCodec::default()
        });
        let item = pending_item(1, "a.jpg", "image/jpeg", jpeg_bytes(16, 16));
        let request = ConversionRequest::new(TargetFormat::Webp).with_quality(0.8);

        let failure = expect_failure(converter(&codec).convert(&item, &request).await);
        assert_eq!(failure.message(), "Could not encode output for WEBP.");
    }

    #[tokio::test]
    async fn test_codec_timeout_maps_to_timeout() {
        let codec = Arc::new(MockCodec {
            decode_error: Some(CodecError::Timeout {
                stage: "decode",
                timeout_ms: 5,
            }),
            ..MockCodec::default()
        });
        let item = pending_item(1, "a.jpg", "image/jpeg", jpeg_bytes(16, 16));
        let request = ConversionRequest::new(TargetFormat::Png);

        let failure = expect_failure(converter(&codec).convert(&item, &request).await);
        assert_eq!(
            failure.error,
            ConversionError::Timeout {
                stage: "decode".to_string(),
                timeout_ms: 5
            }
        );
    }

    #[tokio::test]
    async fn test_quality_only_forwarded_when_format_uses_it() {
        let codec = Arc::new(MockCodec::default());
        let item = pending_item(1, "a.jpg", "image/jpeg", jpeg_bytes(16, 16));

        let request = ConversionRequest::new(TargetFormat::Png).with_quality(0.3);
        expect_success(converter(&codec).convert(&item, &request).await);
        assert_eq!(*codec.last_quality.lock().unwrap(), None);

        let request = ConversionRequest::new(TargetFormat::Jpg).with_quality(0.3);
        expect_success(converter(&codec).convert(&item, &request).await);
        assert_eq!(*codec.last_quality.lock().unwrap(), Some(0.3));
    }
}

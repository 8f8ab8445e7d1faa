//! Codec boundary: measuring, decoding, resizing and encoding pixels.
//!
//! The pipeline never touches codec internals directly. It goes through the
//! [`Codec`] trait so tests can substitute a counting double and so every
//! blocking call sits behind a timeout.

use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::CodecError;
use crate::pipeline::capability::SVG_MIME;
use crate::types::TargetFormat;

/// JPEG quality used when a caller encodes without one.
const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Host-side image capability used by ingestion and the converter.
///
/// Uses `async_trait` so the pipeline can hold an `Arc<dyn Codec>`.
#[async_trait]
pub trait Codec: Send + Sync {
    /// Natural `(width, height)` of an encoded image.
    async fn probe(&self, bytes: Arc<[u8]>, mime_type: &str) -> Result<(u32, u32), CodecError>;

    /// Decode into a pixel surface.
    ///
    /// Vector sources are rendered straight at `size` when one is given, so
    /// enlarging them stays sharp. Raster sources ignore it.
    async fn decode(
        &self,
        bytes: Arc<[u8]>,
        mime_type: &str,
        size: Option<(u32, u32)>,
    ) -> Result<DynamicImage, CodecError>;

    /// Render `image` onto a new surface of exactly `width` x `height`.
    async fn resize(
        &self,
        image: DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, CodecError>;

    /// Encode to `format`. `quality` is in `[0, 1]` and only passed for
    /// formats whose capability uses it.
    async fn encode(
        &self,
        image: DynamicImage,
        format: &TargetFormat,
        quality: Option<f32>,
    ) -> Result<Vec<u8>, CodecError>;
}

/// Production codec backed by the `image` crate, with `resvg` for SVG sources.
///
/// Work runs on the blocking pool and is bounded by the configured timeouts.
pub struct NativeCodec {
    limits: LimitsConfig,
}

impl NativeCodec {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    async fn run_blocking<T, F>(
        &self,
        stage: &'static str,
        timeout_ms: u64,
        f: F,
    ) -> Result<T, CodecError>
    where
        F: FnOnce() -> Result<T, CodecError> + Send + 'static,
        T: Send + 'static,
    {
        let result = timeout(
            Duration::from_millis(timeout_ms),
            tokio::task::spawn_blocking(f),
        )
        .await;

        match result {
            Ok(Ok(inner)) => inner,
            Ok(Err(e)) => Err(CodecError::Join(e.to_string())),
            Err(_) => Err(CodecError::Timeout { stage, timeout_ms }),
        }
    }
}

#[async_trait]
impl Codec for NativeCodec {
    async fn probe(&self, bytes: Arc<[u8]>, mime_type: &str) -> Result<(u32, u32), CodecError> {
        let svg = is_svg(mime_type);
        self.run_blocking("probe", self.limits.decode_timeout_ms, move || {
            if svg {
                let tree = parse_svg(&bytes)?;
                svg_pixel_size(&tree)
            } else {
                probe_raster(&bytes)
            }
        })
        .await
    }

    async fn decode(
        &self,
        bytes: Arc<[u8]>,
        mime_type: &str,
        size: Option<(u32, u32)>,
    ) -> Result<DynamicImage, CodecError> {
        let svg = is_svg(mime_type);
        self.run_blocking("decode", self.limits.decode_timeout_ms, move || {
            if svg {
                rasterize_svg(&bytes, size)
            } else {
                decode_raster(&bytes)
            }
        })
        .await
    }

    async fn resize(
        &self,
        image: DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, CodecError> {
        self.run_blocking("resize", self.limits.encode_timeout_ms, move || {
            Ok(image.resize_exact(width, height, FilterType::Triangle))
        })
        .await
    }

    async fn encode(
        &self,
        image: DynamicImage,
        format: &TargetFormat,
        quality: Option<f32>,
    ) -> Result<Vec<u8>, CodecError> {
        let format = format.clone();
        self.run_blocking("encode", self.limits.encode_timeout_ms, move || {
            encode_sync(&image, &format, quality)
        })
        .await
    }
}

fn is_svg(mime_type: &str) -> bool {
    mime_type.eq_ignore_ascii_case(SVG_MIME)
}

fn probe_raster(bytes: &[u8]) -> Result<(u32, u32), CodecError> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CodecError::Decode(format!("Cannot detect image format: {e}")))?
        .into_dimensions()
        .map_err(|e| CodecError::Decode(e.to_string()))
}

fn decode_raster(bytes: &[u8]) -> Result<DynamicImage, CodecError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CodecError::Decode(format!("Cannot detect image format: {e}")))?;
    if reader.format().is_none() {
        return Err(CodecError::Decode("Unrecognized image format".to_string()));
    }
    reader.decode().map_err(|e| CodecError::Decode(e.to_string()))
}

fn parse_svg(bytes: &[u8]) -> Result<usvg::Tree, CodecError> {
    let opts = usvg::Options::default();
    usvg::Tree::from_data(bytes, &opts).map_err(|e| CodecError::Decode(format!("parse svg: {e}")))
}

fn svg_pixel_size(tree: &usvg::Tree) -> Result<(u32, u32), CodecError> {
    let size = tree.size();
    let (w, h) = (size.width(), size.height());
    if !w.is_finite() || !h.is_finite() || w <= 0.0 || h <= 0.0 {
        return Err(CodecError::Decode("svg has invalid width/height".to_string()));
    }
    Ok(((w.ceil() as u32).max(1), (h.ceil() as u32).max(1)))
}

/// Rasterize an SVG into straight-alpha RGBA8, at `size` or else its
/// natural size.
fn rasterize_svg(bytes: &[u8], size: Option<(u32, u32)>) -> Result<DynamicImage, CodecError> {
    let tree = parse_svg(bytes)?;
    let (width, height) = match size {
        Some((w, h)) => (w.max(1), h.max(1)),
        None => svg_pixel_size(&tree)?,
    };
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| CodecError::Decode("failed to allocate svg pixmap".to_string()))?;

    let sx = width as f32 / tree.size().width();
    let sy = height as f32 / tree.size().height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    // tiny-skia stores premultiplied alpha; `image` expects straight alpha.
    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(width, height, rgba)
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| CodecError::Decode("svg pixel buffer size mismatch".to_string()))
}

/// Map a `[0, 1]` quality onto the JPEG encoder's `1..=100` scale.
fn jpeg_quality(quality: Option<f32>) -> u8 {
    quality
        .map(|q| (q * 100.0).round().clamp(1.0, 100.0) as u8)
        .unwrap_or(DEFAULT_JPEG_QUALITY)
}

fn encode_sync(
    image: &DynamicImage,
    format: &TargetFormat,
    quality: Option<f32>,
) -> Result<Vec<u8>, CodecError> {
    let image_format = match format {
        TargetFormat::Jpg => {
            let mut buf = Vec::new();
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality));
            // JPEG has no alpha channel
            DynamicImage::ImageRgb8(image.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(|e| CodecError::Encode(e.to_string()))?;
            return Ok(buf);
        }
        TargetFormat::Png => ImageFormat::Png,
        // image's WebP encoder is lossless; quality has no effect here.
        TargetFormat::Webp => ImageFormat::WebP,
        TargetFormat::Gif => ImageFormat::Gif,
        TargetFormat::Bmp => ImageFormat::Bmp,
        other => {
            return Err(CodecError::Encode(format!("no raster encoder for {other}")));
        }
    };

    let surface = match image_format {
        ImageFormat::Png if !is_float(image) => image.clone(),
        _ => DynamicImage::ImageRgba8(image.to_rgba8()),
    };

    let mut buffer = Cursor::new(Vec::new());
    surface
        .write_to(&mut buffer, image_format)
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}

fn is_float(image: &DynamicImage) -> bool {
    matches!(
        image,
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_)
    )
}

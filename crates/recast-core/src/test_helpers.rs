//! Shared fixtures for unit tests: generated images and a counting codec.

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::LimitsConfig;
use crate::error::CodecError;
use crate::pipeline::codec::{Codec, NativeCodec};
use crate::types::{ItemId, PendingItem, TargetFormat};

pub const SAMPLE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20">
  <rect width="40" height="20" fill="#3366ff"/>
</svg>"##;

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encoded(width, height, ImageFormat::Jpeg)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encoded(width, height, ImageFormat::Png)
}

fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut buffer, format)
        .unwrap();
    buffer.into_inner()
}

/// Build a pending item, measuring its natural size the way ingestion would.
pub fn pending_item(id: u64, filename: &str, mime_type: &str, bytes: Vec<u8>) -> PendingItem {
    let (width, height) = if mime_type == "image/svg+xml" {
        let tree = usvg::Tree::from_data(&bytes, &usvg::Options::default()).unwrap();
        let size = tree.size();
        (size.width().ceil() as u32, size.height().ceil() as u32)
    } else {
        image::ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .unwrap()
            .into_dimensions()
            .unwrap()
    };
    PendingItem {
        id: ItemId(id),
        source_bytes: Arc::from(bytes),
        source_filename: filename.to_string(),
        mime_type: mime_type.to_string(),
        original_width: width,
        original_height: height,
    }
}

/// Codec double that delegates to [`NativeCodec`] while counting calls.
///
/// Knobs let tests inject failures, empty output, per-image delays (keyed by
/// decoded width) and a panic for one width.
pub struct MockCodec {
    pub(crate) inner: NativeCodec,
    pub probe_calls: AtomicUsize,
    pub decode_calls: AtomicUsize,
    pub resize_calls: AtomicUsize,
    pub encode_calls: AtomicUsize,
    pub last_quality: Mutex<Option<f32>>,
    pub decode_error: Option<CodecError>,
    pub empty_encode: bool,
    pub delays: HashMap<u32, Duration>,
    pub panic_on_width: Option<u32>,
}

impl Default for MockCodec {
    fn default() -> Self {
        Self {
            inner: NativeCodec::new(LimitsConfig::default()),
            probe_calls: AtomicUsize::new(0),
            decode_calls: AtomicUsize::new(0),
            resize_calls: AtomicUsize::new(0),
            encode_calls: AtomicUsize::new(0),
            last_quality: Mutex::new(None),
            decode_error: None,
            empty_encode: false,
            delays: HashMap::new(),
            panic_on_width: None,
        }
    }
}

#[async_trait]
impl Codec for MockCodec {
    async fn probe(&self, bytes: Arc<[u8]>, mime_type: &str) -> Result<(u32, u32), CodecError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.probe(bytes, mime_type).await
    }

    async fn decode(
        &self,
        bytes: Arc<[u8]>,
        mime_type: &str,
        size: Option<(u32, u32)>,
    ) -> Result<DynamicImage, CodecError> {
        self.decode_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.decode_error {
            return Err(err.clone());
        }
        let image = self.inner.decode(bytes, mime_type, size).await?;
        if self.panic_on_width == Some(image.width()) {
            panic!("mock codec asked to panic on width {}", image.width());
        }
        if let Some(delay) = self.delays.get(&image.width()) {
            tokio::time::sleep(*delay).await;
        }
        Ok(image)
    }

    async fn resize(
        &self,
        image: DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, CodecError> {
        self.resize_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resize(image, width, height).await
    }

    async fn encode(
        &self,
        image: DynamicImage,
        format: &TargetFormat,
        quality: Option<f32>,
    ) -> Result<Vec<u8>, CodecError> {
        self.encode_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_quality.lock().unwrap() = quality;
        if self.empty_encode {
            return Ok(Vec::new());
        }
        self.inner.encode(image, format, quality).await
    }
}

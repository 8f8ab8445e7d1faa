//! Benchmarks for the Recast conversion pipeline.
//!
//! Run with: cargo bench -p recast-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageFormat};
use recast_core::config::{BatchConfig, LimitsConfig};
use recast_core::pipeline::dimensions::resolve;
use recast_core::pipeline::{BatchRunner, Converter, NativeCodec};
use recast_core::{ConversionRequest, ItemId, PendingItem, TargetFormat};
use std::io::Cursor;
use std::sync::Arc;

fn png_item(id: u64, width: u32, height: u32) -> PendingItem {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    PendingItem {
        id: ItemId(id),
        source_bytes: Arc::from(buffer.into_inner()),
        source_filename: format!("bench-{id}.png"),
        mime_type: "image/png".to_string(),
        original_width: width,
        original_height: height,
    }
}

fn benchmark_resolve(c: &mut Criterion) {
    c.bench_function("resolve_dimensions", |b| {
        b.iter(|| {
            resolve(
                black_box(4032),
                black_box(3024),
                black_box(Some(1280)),
                black_box(None),
                black_box(true),
            )
        })
    });
}

fn benchmark_png_to_jpeg(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let limits = LimitsConfig::default();
    let converter = Converter::new(Arc::new(NativeCodec::new(limits.clone())))
        .with_max_dimension(limits.max_image_dimension);
    let item = png_item(0, 1920, 1080);
    let request = ConversionRequest::new(TargetFormat::Jpg)
        .with_quality(0.85)
        .with_size(Some(800), None);

    c.bench_function("convert_png_to_jpeg_800px", |b| {
        b.iter(|| rt.block_on(converter.convert(black_box(&item), black_box(&request))))
    });
}

fn benchmark_batch(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let codec = Arc::new(NativeCodec::new(LimitsConfig::default()));
    let runner = BatchRunner::new(Converter::new(codec), BatchConfig::default());
    let items: Vec<PendingItem> = (0..16).map(|i| png_item(i, 256, 256)).collect();

    c.bench_function("batch_16_png_to_webp", |b| {
        b.iter(|| {
            let request = ConversionRequest::new(TargetFormat::Webp).with_quality(0.8);
            rt.block_on(runner.run(items.clone(), request, |_, _| {}))
        })
    });
}

criterion_group!(
    benches,
    benchmark_resolve,
    benchmark_png_to_jpeg,
    benchmark_batch,
);
criterion_main!(benches);

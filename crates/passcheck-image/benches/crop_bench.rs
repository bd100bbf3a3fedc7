// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the crop/export pipeline in the passcheck-image
// crate, on a small synthetic portrait.

use std::io::Cursor;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{ImageFormat, Rgb, RgbImage};

use passcheck_core::CropGeometry;
use passcheck_image::export_crop;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Encode a 300x400 gradient "portrait" as PNG, the shape most passport
/// photos arrive in.
fn portrait_png() -> Vec<u8> {
    let img = RgbImage::from_fn(300, 400, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("encode synthetic portrait");
    buffer
}

/// Quarter turns take the lossless fast path; 12.5 degrees exercises the
/// bilinear rotation over the whole safe area.
fn bench_export_crop(c: &mut Criterion) {
    let source = portrait_png();
    let straight = CropGeometry {
        x: 20.0,
        y: 40.0,
        width: 260.0,
        height: 320.0,
        zoom: 1.0,
        rotation: 0.0,
    };

    c.bench_function("export_crop (300x400, 0deg)", |b| {
        b.iter(|| black_box(export_crop(black_box(&source), &straight, 92)))
    });

    let quarter = straight.with_rotation(90.0);
    c.bench_function("export_crop (300x400, 90deg)", |b| {
        b.iter(|| black_box(export_crop(black_box(&source), &quarter, 92)))
    });

    let tilted = straight.with_rotation(12.5);
    c.bench_function("export_crop (300x400, 12.5deg)", |b| {
        b.iter(|| black_box(export_crop(black_box(&source), &tilted, 92)))
    });
}

criterion_group!(benches, bench_export_crop);
criterion_main!(benches);

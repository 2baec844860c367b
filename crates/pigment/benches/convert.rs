// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bench_gen::{Alpha, Params};
use criterion::Criterion;
use pigment::color_space::RenderingIntent;
use pigment::{ColorDepth, ColorModel, ColorSpaceRegistry};

const PIXELS: usize = 4096;

pub fn convert(c: &mut Criterion) {
    let registry = ColorSpaceRegistry::new();
    let mut g = c.benchmark_group("convert");

    let canonical = bench_gen::rgba16_run(Params {
        cols: PIXELS,
        rows: 1,
        alpha: Alpha::Random,
    });
    let rgb8 = registry.rgb8();
    let mut src = vec![0; PIXELS * rgb8.pixel_size()];
    rgb8.from_rgb_a16(&canonical, &mut src, PIXELS);

    for (model, depth) in [
        (ColorModel::Rgba, ColorDepth::U16),
        (ColorModel::Rgba, ColorDepth::F32),
        (ColorModel::GrayA, ColorDepth::U8),
        (ColorModel::CmykA, ColorDepth::U8),
        (ColorModel::LabA, ColorDepth::U16),
    ] {
        let Some(dst_space) = registry.get(model, depth) else {
            continue;
        };
        let mut dst = vec![0; PIXELS * dst_space.pixel_size()];
        let mut converter = rgb8.create_color_converter(&*dst_space, RenderingIntent::default());

        g.bench_function(format!("RGBAU8 -> {}", dst_space.id()), |b| {
            b.iter(|| converter.transform(&src, &mut dst, PIXELS).unwrap())
        });
    }
}

// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(dead_code)]

use bench_gen::{Alpha, Params};
use once_cell::sync::Lazy;
use pigment::{ColorDepth, ColorModel, ColorSpace, ColorSpaceRegistry, CompositeParams};
use std::sync::Arc;

pub static REGISTRY: Lazy<ColorSpaceRegistry> = Lazy::new(ColorSpaceRegistry::new);

pub fn space(model: ColorModel, depth: ColorDepth) -> Arc<dyn ColorSpace> {
    REGISTRY.get(model, depth).unwrap()
}

pub fn rgba8() -> Arc<dyn ColorSpace> {
    REGISTRY.rgb8()
}

pub fn all_spaces() -> Vec<Arc<dyn ColorSpace>> {
    REGISTRY
        .ids()
        .map(|id| REGISTRY.by_id(id).unwrap())
        .collect()
}

/// `cols` random pixels of `space`.
pub fn random_pixels(space: &dyn ColorSpace, cols: usize, alpha: Alpha) -> Vec<u8> {
    let canonical = bench_gen::rgba16_run(Params {
        cols,
        rows: 1,
        alpha,
    });
    let mut pixels = vec![0; cols * space.pixel_size()];
    space.from_rgb_a16(&canonical, &mut pixels, cols);
    pixels
}

/// Composite a single row with `op` at `opacity`.
pub fn composite_row(
    space: &dyn ColorSpace,
    op: &str,
    dst: &mut [u8],
    src: &[u8],
    opacity: f32,
) {
    let cols = dst.len() / space.pixel_size();
    let mut params = CompositeParams::row(dst, src, cols).with_opacity(opacity);
    space.composite_op(op).composite(&mut params);
}

/// Single pixel `[r, g, b, a]` of the 8-bit RGBA space after compositing `src` onto `dst`.
pub fn composite_rgba8(op: &str, src: [u8; 4], dst: [u8; 4], opacity: f32) -> [u8; 4] {
    let mut out = dst;
    composite_row(&*rgba8(), op, &mut out, &src, opacity);
    out
}

pub fn assert_close(a: &[u8], b: &[u8], tolerance: u8) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert!(x.abs_diff(*y) <= tolerance, "{a:?} vs {b:?}");
    }
}

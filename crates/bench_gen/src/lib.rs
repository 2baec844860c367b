// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Seeded inputs for benchmarks and tests: pixel runs, masks, weights and gradients.
//!
//! Pixels are produced in the canonical 16-bit RGBA layout so that any color space can
//! import them.

use peniko::color::{AlphaColor, Srgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Write as _;

const SEED: [u8; 32] = [0; 32];

/// How the alpha of generated pixels is chosen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Alpha {
    Opaque,
    Fixed(u8),
    Random,
}

#[derive(Copy, Clone, Debug)]
pub struct Params {
    pub cols: usize,
    pub rows: usize,
    pub alpha: Alpha,
}

impl Params {
    pub fn pixel_count(&self) -> usize {
        self.cols * self.rows
    }
}

/// `params.pixel_count()` random pixels as RGBA16, four values per pixel.
pub fn rgba16_run(params: Params) -> Vec<u16> {
    let mut rng = StdRng::from_seed(SEED);
    let mut out = Vec::with_capacity(params.pixel_count() * 4);

    for _ in 0..params.pixel_count() {
        let alpha = match params.alpha {
            Alpha::Opaque => u16::MAX,
            Alpha::Fixed(alpha) => alpha as u16 * 257,
            Alpha::Random => rng.gen(),
        };
        out.extend_from_slice(&[rng.gen(), rng.gen(), rng.gen(), alpha]);
    }

    out
}

/// A coverage mask with values spread over the whole `u8` range.
pub fn mask(len: usize) -> Vec<u8> {
    let mut rng = StdRng::from_seed(SEED);
    (0..len).map(|_| rng.gen()).collect()
}

/// `count` positive weights and their sum.
pub fn weights(count: usize) -> (Vec<i16>, i32) {
    let mut rng = StdRng::from_seed(SEED);
    let weights: Vec<i16> = (0..count).map(|_| rng.gen_range(1..=255)).collect();
    let sum = weights.iter().map(|w| *w as i32).sum();
    (weights, sum)
}

/// A GIMP gradient with `segments` evenly spaced segments of random colors and
/// interpolation.
pub fn ggr(name: &str, segments: usize) -> String {
    let mut rng = StdRng::from_seed(SEED);
    let segments = segments.max(1);
    let mut out = format!("GIMP Gradient\nName: {name}\n{segments}\n");

    let step = 1.0 / segments as f64;
    let mut end_color = gen_color(&mut rng, 255);
    for i in 0..segments {
        let start = i as f64 * step;
        let end = if i + 1 == segments { 1.0 } else { start + step };
        let middle = start + (end - start) * rng.gen_range(0.2..0.8);

        let start_color = end_color;
        let alpha = rng.gen_range(128..=255);
        end_color = gen_color(&mut rng, alpha);

        let _ = write!(out, "{start:.6} {middle:.6} {end:.6}");
        for c in start_color.components.iter().chain(&end_color.components) {
            let _ = write!(out, " {c:.6}");
        }
        let _ = writeln!(out, " {} {} 0 0", rng.gen_range(0..5), rng.gen_range(0..3));
    }

    out
}

fn gen_color(rng: &mut StdRng, alpha: u8) -> AlphaColor<Srgb> {
    let r = rng.gen_range(0..=255);
    let g = rng.gen_range(0..=255);
    let b = rng.gen_range(0..=255);

    AlphaColor::from_rgba8(r, g, b, alpha)
}

// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gradients.
//!
//! A gradient maps a position `t` in `0.0..=1.0` to a color. [`SegmentGradient`] is the
//! GIMP style gradient made of segments with their own interpolation, [`StopGradient`]
//! the SVG style list of color stops.

mod segment;
mod stop;

pub use segment::{EndpointType, GradientSegment, SegmentGradient};
pub use stop::{GradientStop, StopGradient, StopType};

use crate::channel::ColorDepth;
use crate::color::Color;
use crate::color_space::{rgb16, ColorModel, ColorSpace};
use peniko::color::{AlphaColor, Srgb};
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt::Debug;
use std::sync::Arc;

/// Positions closer than this are treated as equal.
pub(crate) const EPSILON: f64 = f64::EPSILON;

pub trait AbstractGradient: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// The space colors are produced in before being converted to the target.
    fn color_space(&self) -> &Arc<dyn ColorSpace>;

    /// Write the color at `t` into `dst`, converting into the space of `dst`. `t` is
    /// clamped to `0.0..=1.0`.
    fn color_at(&self, dst: &mut Color, t: f64);

    /// Whether some colors follow the foreground or background color.
    fn has_variable_colors(&self) -> bool;

    fn set_variable_colors(&mut self, foreground: &Color, background: &Color);
}

/// How the position inside a segment maps to the blend factor between its end colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpatialInterpolation {
    #[default]
    Linear,
    Curved,
    Sine,
    SphereIncreasing,
    SphereDecreasing,
}

impl SpatialInterpolation {
    pub const ALL: [SpatialInterpolation; 5] = [
        SpatialInterpolation::Linear,
        SpatialInterpolation::Curved,
        SpatialInterpolation::Sine,
        SpatialInterpolation::SphereIncreasing,
        SpatialInterpolation::SphereDecreasing,
    ];

    /// Blend factor at the local position `t`, with the middle point at `middle`. Both
    /// are relative to the segment.
    pub fn value_at(self, t: f64, middle: f64) -> f64 {
        match self {
            SpatialInterpolation::Linear => linear(t, middle),
            SpatialInterpolation::Curved => {
                let middle = middle.max(EPSILON);
                t.powf(0.5_f64.ln() / middle.ln())
            }
            SpatialInterpolation::Sine => {
                let lt = linear(t, middle);
                ((-FRAC_PI_2 + PI * lt).sin() + 1.0) / 2.0
            }
            SpatialInterpolation::SphereIncreasing => {
                let lt = linear(t, middle) - 1.0;
                (1.0 - lt * lt).sqrt()
            }
            SpatialInterpolation::SphereDecreasing => {
                let lt = linear(t, middle);
                1.0 - (1.0 - lt * lt).sqrt()
            }
        }
    }

    /// Index in the GIMP gradient format.
    pub fn ggr_index(self) -> u8 {
        match self {
            SpatialInterpolation::Linear => 0,
            SpatialInterpolation::Curved => 1,
            SpatialInterpolation::Sine => 2,
            SpatialInterpolation::SphereIncreasing => 3,
            SpatialInterpolation::SphereDecreasing => 4,
        }
    }

    pub fn from_ggr_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

fn linear(t: f64, middle: f64) -> f64 {
    if t <= middle {
        if middle < EPSILON {
            0.0
        } else {
            t / middle * 0.5
        }
    } else if middle > 1.0 - EPSILON {
        1.0
    } else {
        (t - middle) / (1.0 - middle) * 0.5 + 0.5
    }
}

/// How two end colors are blended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorInterpolation {
    #[default]
    Rgb,
    /// Hue runs counter-clockwise, from the start hue upwards.
    HsvCcw,
    /// Hue runs clockwise, from the start hue downwards.
    HsvCw,
}

impl ColorInterpolation {
    pub fn ggr_index(self) -> u8 {
        match self {
            ColorInterpolation::Rgb => 0,
            ColorInterpolation::HsvCcw => 1,
            ColorInterpolation::HsvCw => 2,
        }
    }

    pub fn from_ggr_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(ColorInterpolation::Rgb),
            1 => Some(ColorInterpolation::HsvCcw),
            2 => Some(ColorInterpolation::HsvCw),
            _ => None,
        }
    }

    /// The color at blend factor `t` between `start` and `end`, in `space`.
    pub fn color_at(
        self,
        t: f64,
        start: &Color,
        end: &Color,
        space: &Arc<dyn ColorSpace>,
    ) -> Color {
        match self {
            ColorInterpolation::Rgb => mix_colors(start, end, t, i16::MAX, space),
            ColorInterpolation::HsvCcw | ColorInterpolation::HsvCw => {
                let (sc, ec) = (start.to_rgba(), end.to_rgba());
                let (sh, ss, sv) = rgb_to_hsv(sc);
                let (eh, es, ev) = rgb_to_hsv(ec);
                let t = t as f32;

                let h = if self == ColorInterpolation::HsvCcw {
                    if sh < eh {
                        sh + t * (eh - sh)
                    } else {
                        sh + t * (360.0 - sh + eh)
                    }
                } else if eh < sh {
                    eh + (1.0 - t) * (sh - eh)
                } else {
                    eh + (1.0 - t) * (360.0 - eh + sh)
                };
                let h = h.rem_euclid(360.0);

                let s = ss + t * (es - ss);
                let v = sv + t * (ev - sv);
                let a = sc.components[3] + t * (ec.components[3] - sc.components[3]);

                let [r, g, b] = hsv_to_rgb(h, s, v);
                Color::from_rgba(AlphaColor::new([r, g, b, a]), space.clone())
            }
        }
    }
}

/// Mix `a` and `b` with `t` as the share of `b`, on a weight scale of `scale`, and
/// return the result in `space`.
///
/// The mix runs in `space` itself, except for 8-bit RGB targets which are mixed in the
/// canonical 16-bit RGB space. The end colors are converted at most once.
pub(crate) fn mix_colors(
    a: &Color,
    b: &Color,
    t: f64,
    scale: i16,
    space: &Arc<dyn ColorSpace>,
) -> Color {
    let mix_space = if space.depth() == ColorDepth::U8 && space.model() == ColorModel::Rgba {
        rgb16()
    } else {
        space.clone()
    };

    let a = a.converted_to(mix_space.clone());
    let b = b.converted_to(mix_space.clone());

    let weight_b = (t.clamp(0.0, 1.0) * scale as f64 + 0.5) as i16;
    let weights = [scale - weight_b, weight_b];

    let mut mixed = Color::new(mix_space.clone());
    mix_space.mix_colors_op().mix_colors(
        &[a.data(), b.data()],
        &weights,
        scale as i32,
        mixed.data_mut(),
    );
    mixed.converted_to(space.clone())
}

/// Hue in degrees, saturation and value.
fn rgb_to_hsv(color: AlphaColor<Srgb>) -> (f32, f32, f32) {
    let [r, g, b, _] = color.components;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let chroma = max - min;

    let h = if chroma <= 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / chroma).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / chroma + 2.0)
    } else {
        60.0 * ((r - g) / chroma + 4.0)
    };
    let s = if max > 0.0 { chroma / max } else { 0.0 };

    (h, s, max)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let c = v * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
    let [r, g, b] = match hp as u32 {
        0 => [c, x, 0.0],
        1 => [x, c, 0.0],
        2 => [0.0, c, x],
        3 => [0.0, x, c],
        4 => [x, 0.0, c],
        _ => [c, 0.0, x],
    };
    let m = v - c;
    [r + m, g + m, b + m]
}

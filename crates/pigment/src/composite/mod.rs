// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composite operators.
//!
//! A composite op combines a run of source pixels with a run of destination pixels in
//! place. All ops of a color space share one pixel loop and only differ in the per-pixel
//! compositor. Separable blend functions run channel by channel, non-separable ones work
//! on a whole RGB triple, and a handful of ops such as over or alpha darken bring their
//! own alpha discipline.

mod base;
mod functions;
mod hsx;
pub mod ids;
mod registry;
mod special;

pub use ids::*;
pub(crate) use registry::standard_ops;

use crate::channel::ChannelFlags;
use crate::color_space::PixelLayout;
use std::fmt::Debug;

/// Ids of the composite op categories.
pub mod categories {
    pub const ARITHMETIC: &str = "arithmetic";
    pub const BINARY: &str = "binary";
    pub const DARK: &str = "dark";
    pub const LIGHT: &str = "light";
    pub const MODULO: &str = "modulo";
    pub const NEGATIVE: &str = "negative";
    pub const MIX: &str = "mix";
    pub const MISC: &str = "misc";
    pub const HSY: &str = "hsy";
    pub const HSI: &str = "hsi";
    pub const HSL: &str = "hsl";
    pub const HSV: &str = "hsv";
    pub const QUADRATIC: &str = "quadratic";
}

/// Arguments of a single composite call.
///
/// Pixel `(x, y)` of the destination lives at `y * dst_row_stride + x * pixel_size`, the
/// same holds for the source. A `src_row_stride` of `0` composites the first source
/// pixel onto every destination pixel. The mask holds one byte per pixel.
#[derive(Debug)]
pub struct CompositeParams<'a> {
    pub dst: &'a mut [u8],
    pub dst_row_stride: usize,
    pub src: &'a [u8],
    pub src_row_stride: usize,
    pub mask: Option<&'a [u8]>,
    pub mask_row_stride: usize,
    pub rows: usize,
    pub cols: usize,
    /// Overall opacity in `0.0..=1.0`.
    pub opacity: f32,
    /// Per-dab flow in `0.0..=1.0`.
    pub flow: f32,
    /// Opacity accumulated over the current stroke so far, used by alpha darken. `None`
    /// means the stroke opacity equals `opacity`.
    pub average_opacity: Option<f32>,
    pub channel_flags: ChannelFlags,
}

impl<'a> CompositeParams<'a> {
    pub fn new(
        dst: &'a mut [u8],
        dst_row_stride: usize,
        src: &'a [u8],
        src_row_stride: usize,
        rows: usize,
        cols: usize,
    ) -> Self {
        Self {
            dst,
            dst_row_stride,
            src,
            src_row_stride,
            mask: None,
            mask_row_stride: 0,
            rows,
            cols,
            opacity: 1.0,
            flow: 1.0,
            average_opacity: None,
            channel_flags: ChannelFlags::ALL,
        }
    }

    /// A single row of `cols` pixels.
    pub fn row(dst: &'a mut [u8], src: &'a [u8], cols: usize) -> Self {
        let (dst_row_stride, src_row_stride) = (dst.len(), src.len().max(1));
        Self::new(dst, dst_row_stride, src, src_row_stride, 1, cols)
    }

    #[must_use]
    pub fn with_mask(mut self, mask: &'a [u8], mask_row_stride: usize) -> Self {
        self.mask = Some(mask);
        self.mask_row_stride = mask_row_stride;
        self
    }

    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    #[must_use]
    pub fn with_flow(mut self, flow: f32) -> Self {
        self.flow = flow;
        self
    }

    #[must_use]
    pub fn with_average_opacity(mut self, average_opacity: f32) -> Self {
        self.average_opacity = Some(average_opacity);
        self
    }

    #[must_use]
    pub fn with_channel_flags(mut self, channel_flags: ChannelFlags) -> Self {
        self.channel_flags = channel_flags;
        self
    }
}

/// A named pixel operator bound to the layout of one color space.
///
/// Ops are stateless and can be used from many threads at once.
pub trait CompositeOp: Send + Sync + Debug {
    fn id(&self) -> &str;
    fn category(&self) -> &str;
    fn description(&self) -> &str;
    fn layout(&self) -> PixelLayout;

    /// Composite the source onto the destination. Never fails; buffers must cover
    /// `rows` × `cols` pixels at the given strides.
    fn composite(&self, params: &mut CompositeParams<'_>);
}

// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color spaces: the authority on pixel layout, conversion and available operators.

mod convert;
mod generic;
mod model;
mod registry;

pub use convert::{ColorConverter, ConversionCache};
pub use model::ColorModel;
pub use registry::{lab16, rgb16, ColorSpaceRegistry};

pub(crate) use convert::convert_canonical;
pub(crate) use generic::ModelColorSpace;
pub(crate) use model::{decode_lab16, luma};

use crate::channel::{ChannelFlags, ColorDepth};
use crate::composite::{CompositeOp, CompositeParams};
use crate::error::ConversionError;
use crate::mix::MixColorsOp;
use peniko::color::{AlphaColor, Srgb};
use peniko::{BlendMode, Compose, Mix};
use std::fmt::Debug;
use std::sync::Arc;

/// What a channel holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelRole {
    Color,
    Alpha,
    Substance,
    Substrate,
}

/// Description of a single channel of a pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub name: &'static str,
    /// Index among the channels of a pixel.
    pub index: usize,
    /// Byte offset inside a pixel.
    pub position: usize,
    pub value_type: ColorDepth,
    pub role: ChannelRole,
}

impl ChannelInfo {
    pub fn size(&self) -> usize {
        self.value_type.channel_size()
    }
}

/// Rendering intent forwarded to conversions. Profiles are opaque here, so all intents
/// currently take the same path through the canonical formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderingIntent {
    #[default]
    Perceptual,
    RelativeColorimetric,
    Saturation,
    AbsoluteColorimetric,
}

/// Memory layout of a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelLayout {
    pub channel_count: usize,
    pub channel_size: usize,
    pub alpha_pos: Option<usize>,
    /// Red, green and blue channel indices for additive RGB layouts.
    pub rgb: Option<[usize; 3]>,
    /// Color channels hold ink amounts, so zero is white.
    pub subtractive: bool,
}

impl PixelLayout {
    pub fn pixel_size(&self) -> usize {
        self.channel_count * self.channel_size
    }

    pub fn is_color_channel(&self, channel: usize) -> bool {
        self.alpha_pos != Some(channel)
    }
}

/// A color space.
///
/// Implementations are immutable and shared between threads. Every space converts to and
/// from the canonical 16-bit RGBA and Lab (D50) formats, which are laid out as four `u16`
/// per pixel with straight alpha last.
pub trait ColorSpace: Send + Sync + Debug {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn model(&self) -> ColorModel;
    fn depth(&self) -> ColorDepth;
    /// Opaque profile name.
    fn profile(&self) -> &str;

    fn channels(&self) -> &[ChannelInfo];
    fn layout(&self) -> PixelLayout;

    fn pixel_size(&self) -> usize {
        self.layout().pixel_size()
    }

    fn channel_count(&self) -> usize {
        self.layout().channel_count
    }

    fn color_channel_count(&self) -> usize {
        let layout = self.layout();
        layout.channel_count - usize::from(layout.alpha_pos.is_some())
    }

    fn alpha_pos(&self) -> Option<usize> {
        self.layout().alpha_pos
    }

    fn to_lab_a16(&self, src: &[u8], dst: &mut [u16], n: usize);
    fn from_lab_a16(&self, src: &[u16], dst: &mut [u8], n: usize);
    fn to_rgb_a16(&self, src: &[u8], dst: &mut [u16], n: usize);
    fn from_rgb_a16(&self, src: &[u16], dst: &mut [u8], n: usize);

    fn opacity_u8(&self, pixel: &[u8]) -> u8;
    fn opacity_f(&self, pixel: &[u8]) -> f32;
    fn set_opacity_u8(&self, pixels: &mut [u8], alpha: u8, n: usize);
    fn set_opacity_f(&self, pixels: &mut [u8], alpha: f32, n: usize);
    /// Multiply the alpha of `n` pixels by `alpha`.
    fn multiply_alpha(&self, pixels: &mut [u8], alpha: u8, n: usize);
    fn apply_alpha_u8_mask(&self, pixels: &mut [u8], mask: &[u8], n: usize);
    fn apply_inverse_alpha_u8_mask(&self, pixels: &mut [u8], mask: &[u8], n: usize);

    /// Channel values normalized so that the unit value is `1.0`.
    fn normalised_channel_values(&self, pixel: &[u8], values: &mut [f32]);
    fn from_normalised_channel_values(&self, pixel: &mut [u8], values: &[f32]);

    /// Look up a composite op, falling back to `normal` for unknown ids.
    fn composite_op(&self, id: &str) -> Arc<dyn CompositeOp>;
    fn has_composite_op(&self, id: &str) -> bool;
    /// All registered composite ops in registration order.
    fn composite_ops(&self) -> Vec<Arc<dyn CompositeOp>>;

    fn mix_colors_op(&self) -> &dyn MixColorsOp;

    fn transparent_pixel(&self) -> Vec<u8> {
        vec![0; self.pixel_size()]
    }

    fn fill_pixels(&self, pixel: &[u8], dst: &mut [u8], n: usize) {
        let pixel_size = self.pixel_size();
        for chunk in dst.chunks_exact_mut(pixel_size).take(n) {
            chunk.copy_from_slice(&pixel[..pixel_size]);
        }
    }

    /// Channel flags selecting the color channels and/or the alpha channel.
    fn channel_flags(&self, color: bool, alpha: bool) -> ChannelFlags {
        let layout = self.layout();
        (0..layout.channel_count).fold(ChannelFlags::NONE, |flags, c| {
            let enabled = if layout.is_color_channel(c) {
                color
            } else {
                alpha
            };
            flags.with(c, enabled)
        })
    }
}

impl dyn ColorSpace + '_ {
    /// Two spaces are the same when they share id and profile.
    pub fn is_same(&self, other: &dyn ColorSpace) -> bool {
        self.id() == other.id() && self.profile() == other.profile()
    }

    /// Write `color` as a single pixel of this space.
    pub fn from_rgba_color(&self, color: AlphaColor<Srgb>, dst: &mut [u8]) {
        let rgba = color.components.map(|c| (c.clamp(0.0, 1.0) * 65535.0 + 0.5) as u16);
        self.from_rgb_a16(&rgba, dst, 1);
    }

    pub fn to_rgba_color(&self, src: &[u8]) -> AlphaColor<Srgb> {
        let mut rgba = [0_u16; 4];
        self.to_rgb_a16(src, &mut rgba, 1);
        AlphaColor::new(rgba.map(|c| c as f32 / 65535.0))
    }

    /// 8-bit luma of a pixel, alpha ignored.
    pub fn intensity8(&self, pixel: &[u8]) -> u8 {
        let mut rgba = [0_u16; 4];
        self.to_rgb_a16(pixel, &mut rgba, 1);
        let y = luma([
            rgba[0] as f32 / 65535.0,
            rgba[1] as f32 / 65535.0,
            rgba[2] as f32 / 65535.0,
        ]);
        (y.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
    }

    /// Convert `n` pixels into `dst_space`.
    ///
    /// The destination contents are unspecified when an error is returned.
    pub fn convert_pixels_to(
        &self,
        src: &[u8],
        dst: &mut [u8],
        dst_space: &dyn ColorSpace,
        n: usize,
        intent: RenderingIntent,
    ) -> Result<(), ConversionError> {
        self.create_color_converter(dst_space, intent)
            .transform(src, dst, n)
    }

    pub fn create_color_converter<'a>(
        &'a self,
        dst_space: &'a dyn ColorSpace,
        intent: RenderingIntent,
    ) -> ColorConverter<'a> {
        ColorConverter::new(self, dst_space, intent)
    }

    /// Composite `params.src`, which is laid out in `src_space`, onto `params.dst` with `op`.
    ///
    /// Sources in a different space are converted into `cache` first. `op` must belong
    /// to this color space.
    pub fn bit_blt(
        &self,
        src_space: &dyn ColorSpace,
        params: &mut CompositeParams<'_>,
        op: &dyn CompositeOp,
        _intent: RenderingIntent,
        cache: &mut ConversionCache,
    ) {
        debug_assert_eq!(op.layout(), self.layout());

        if params.rows == 0 || params.cols == 0 {
            return;
        }

        if self.is_same(src_space) {
            op.composite(params);
            return;
        }

        let fixed_color = params.src_row_stride == 0;
        let (rows, cols) = if fixed_color {
            (1, 1)
        } else {
            (params.rows, params.cols)
        };
        let src_row_bytes = cols * src_space.pixel_size();
        let dst_row_bytes = cols * self.pixel_size();

        let (converted, scratch) = cache.buffers(rows * dst_row_bytes);
        for row in 0..rows {
            let src_row = &params.src[row * params.src_row_stride..][..src_row_bytes];
            let dst_row = &mut converted[row * dst_row_bytes..][..dst_row_bytes];
            convert_canonical(src_space, self, src_row, dst_row, cols, scratch);
        }

        let mut converted_params = CompositeParams {
            dst: &mut *params.dst,
            dst_row_stride: params.dst_row_stride,
            src: &*converted,
            src_row_stride: if fixed_color { 0 } else { dst_row_bytes },
            mask: params.mask,
            mask_row_stride: params.mask_row_stride,
            rows: params.rows,
            cols: params.cols,
            opacity: params.opacity,
            flow: params.flow,
            average_opacity: params.average_opacity,
            channel_flags: params.channel_flags,
        };
        op.composite(&mut converted_params);
    }

    /// Perceptual distance of two pixels (CIE76 ΔE, saturated to `255`).
    ///
    /// Two fully transparent pixels are identical and a fully transparent pixel is
    /// maximally different from any other one. Alpha is ignored otherwise.
    pub fn difference(&self, a: &[u8], b: &[u8]) -> u8 {
        let (lab_a, lab_b) = (self.lab16_of(a), self.lab16_of(b));

        match (lab_a[3], lab_b[3]) {
            (0, 0) => 0,
            (0, _) | (_, 0) => u8::MAX,
            _ => {
                let la = decode_lab16([lab_a[0], lab_a[1], lab_a[2]]);
                let lb = decode_lab16([lab_b[0], lab_b[1], lab_b[2]]);
                let delta = la
                    .iter()
                    .zip(lb.iter())
                    .map(|(x, y)| (x - y) * (x - y))
                    .sum::<f32>()
                    .sqrt();
                (delta + 0.5).min(255.0) as u8
            }
        }
    }

    /// Like [`difference`](Self::difference) but also accounts for alpha.
    pub fn difference_a(&self, a: &[u8], b: &[u8]) -> u8 {
        let alpha_delta = self.opacity_u8(a).abs_diff(self.opacity_u8(b));
        self.difference(a, b).max(alpha_delta)
    }

    /// The composite op closest to a peniko blend mode.
    pub fn composite_op_for_blend_mode(&self, blend_mode: BlendMode) -> Arc<dyn CompositeOp> {
        use crate::composite::ids::*;

        let id = match blend_mode.mix {
            Mix::Multiply => COMPOSITE_MULT,
            Mix::Screen => COMPOSITE_SCREEN,
            Mix::Overlay => COMPOSITE_OVERLAY,
            Mix::Darken => COMPOSITE_DARKEN,
            Mix::Lighten => COMPOSITE_LIGHTEN,
            Mix::ColorDodge => COMPOSITE_DODGE,
            Mix::ColorBurn => COMPOSITE_BURN,
            Mix::HardLight => COMPOSITE_HARD_LIGHT,
            Mix::SoftLight => COMPOSITE_SOFT_LIGHT_SVG,
            Mix::Difference => COMPOSITE_DIFF,
            Mix::Exclusion => COMPOSITE_EXCLUSION,
            Mix::Hue => COMPOSITE_HUE,
            Mix::Saturation => COMPOSITE_SATURATION,
            Mix::Color => COMPOSITE_COLOR,
            Mix::Luminosity => COMPOSITE_LUMINIZE,
            _ => match blend_mode.compose {
                Compose::Clear => COMPOSITE_CLEAR,
                Compose::Copy => COMPOSITE_COPY,
                Compose::Dest => COMPOSITE_NO,
                Compose::DestOver => COMPOSITE_BEHIND,
                Compose::SrcIn => COMPOSITE_IN,
                Compose::DestIn => COMPOSITE_DESTINATION_IN,
                Compose::SrcOut => COMPOSITE_OUT,
                Compose::DestOut => COMPOSITE_ERASE,
                Compose::SrcAtop => COMPOSITE_ATOP,
                Compose::DestAtop => COMPOSITE_DESTINATION_ATOP,
                Compose::Plus | Compose::PlusLighter => COMPOSITE_ADD,
                _ => COMPOSITE_OVER,
            },
        };

        self.composite_op(id)
    }

    fn lab16_of(&self, pixel: &[u8]) -> [u16; 4] {
        let mut lab = [0_u16; 4];
        self.to_lab_a16(pixel, &mut lab, 1);
        lab
    }
}

impl PartialEq for dyn ColorSpace + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

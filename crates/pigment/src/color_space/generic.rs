// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::model::{decode_lab16, encode_lab16, ModelTraits};
use super::{ChannelInfo, ChannelRole, ColorModel, ColorSpace, PixelLayout};
use crate::channel::{load_pixel, store_pixel, ChannelValue, ColorDepth, MAX_CHANNELS};
use crate::composite::{standard_ops, CompositeOp, COMPOSITE_OVER};
use crate::mix::{MixColorsOp, MixColorsOpImpl};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

struct OpTable {
    ordered: Vec<Arc<dyn CompositeOp>>,
    by_id: HashMap<String, Arc<dyn CompositeOp>>,
}

/// A color space built from a color model and a channel type.
pub(crate) struct ModelColorSpace<M: ModelTraits, T: ChannelValue> {
    id: String,
    name: String,
    channels: Vec<ChannelInfo>,
    layout: PixelLayout,
    ops: OnceCell<OpTable>,
    mix: MixColorsOpImpl<T>,
    _model: PhantomData<fn() -> M>,
}

impl<M: ModelTraits, T: ChannelValue> ModelColorSpace<M, T> {
    pub(crate) fn new() -> Self {
        let size = std::mem::size_of::<T>();
        let color = M::COLOR_CHANNELS.len();

        let mut channels: Vec<_> = M::COLOR_CHANNELS
            .iter()
            .enumerate()
            .map(|(index, &name)| ChannelInfo {
                name,
                index,
                position: index * size,
                value_type: T::DEPTH,
                role: ChannelRole::Color,
            })
            .collect();
        channels.push(ChannelInfo {
            name: "Alpha",
            index: color,
            position: color * size,
            value_type: T::DEPTH,
            role: ChannelRole::Alpha,
        });

        let layout = PixelLayout {
            channel_count: color + 1,
            channel_size: size,
            alpha_pos: Some(color),
            rgb: M::RGB,
            subtractive: M::SUBTRACTIVE,
        };

        Self {
            id: format!("{}{}", M::MODEL.id(), T::DEPTH.id()),
            name: format!("{} ({})", M::DISPLAY_NAME, depth_name(T::DEPTH)),
            channels,
            layout,
            ops: OnceCell::new(),
            mix: MixColorsOpImpl::new(layout),
            _model: PhantomData,
        }
    }

    fn ops(&self) -> &OpTable {
        self.ops.get_or_init(|| {
            let ordered = standard_ops::<T>(self.layout);
            debug!(
                color_space = self.id.as_str(),
                count = ordered.len(),
                "registered composite ops"
            );
            let by_id = ordered
                .iter()
                .map(|op| (op.id().to_string(), op.clone()))
                .collect();
            OpTable { ordered, by_id }
        })
    }

    fn color_channels(&self) -> usize {
        M::COLOR_CHANNELS.len()
    }

    /// Run `f` on every pixel as a normalized channel array.
    fn for_each_normalized(&self, src: &[u8], n: usize, mut f: impl FnMut(usize, &[f32], T)) {
        let channels = self.layout.channel_count;
        let mut px = [T::ZERO; MAX_CHANNELS];
        let mut norm = [0.0_f32; MAX_CHANNELS];

        for (i, pixel) in src.chunks_exact(self.layout.pixel_size()).take(n).enumerate() {
            load_pixel(pixel, &mut px[..channels]);
            for c in 0..self.color_channels() {
                norm[c] = px[c].to_f32();
            }
            f(i, &norm[..self.color_channels()], px[channels - 1]);
        }
    }

    fn write_normalized(&self, pixel: &mut [u8], norm: &[f32], alpha: T) {
        let mut px = [T::ZERO; MAX_CHANNELS];
        for (c, v) in norm.iter().enumerate() {
            px[c] = T::from_f32(*v);
        }
        px[self.color_channels()] = alpha;
        store_pixel(&px[..self.layout.channel_count], pixel);
    }

    fn alpha_offset(&self) -> usize {
        self.color_channels() * self.layout.channel_size
    }

    fn read_alpha(&self, pixel: &[u8]) -> T {
        let offset = self.alpha_offset();
        bytemuck::pod_read_unaligned(&pixel[offset..offset + self.layout.channel_size])
    }

    fn write_alpha(&self, pixel: &mut [u8], alpha: T) {
        let offset = self.alpha_offset();
        pixel[offset..offset + self.layout.channel_size].copy_from_slice(bytemuck::bytes_of(&alpha));
    }

    fn map_alpha(&self, pixels: &mut [u8], n: usize, mut f: impl FnMut(usize, T) -> T) {
        for (i, pixel) in pixels
            .chunks_exact_mut(self.layout.pixel_size())
            .take(n)
            .enumerate()
        {
            let alpha = self.read_alpha(pixel);
            self.write_alpha(pixel, f(i, alpha));
        }
    }

    /// Whether the model's channels already are the canonical encoding of `model`, so
    /// that values can be rescaled directly instead of going through floats.
    fn is_direct(model: ColorModel) -> bool {
        M::MODEL == model
    }
}

fn depth_name(depth: ColorDepth) -> &'static str {
    match depth {
        ColorDepth::U8 => "8-bit integer/channel",
        ColorDepth::U16 => "16-bit integer/channel",
        ColorDepth::U32 => "32-bit integer/channel",
        ColorDepth::F16 => "16-bit float/channel",
        ColorDepth::F32 => "32-bit float/channel",
    }
}

impl<M: ModelTraits, T: ChannelValue> fmt::Debug for ModelColorSpace<M, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelColorSpace")
            .field("id", &self.id)
            .field("layout", &self.layout)
            .finish()
    }
}

impl<M: ModelTraits, T: ChannelValue> ColorSpace for ModelColorSpace<M, T> {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> ColorModel {
        M::MODEL
    }

    fn depth(&self) -> ColorDepth {
        T::DEPTH
    }

    fn profile(&self) -> &str {
        M::PROFILE
    }

    fn channels(&self) -> &[ChannelInfo] {
        &self.channels
    }

    fn layout(&self) -> PixelLayout {
        self.layout
    }

    fn to_lab_a16(&self, src: &[u8], dst: &mut [u16], n: usize) {
        if Self::is_direct(ColorModel::LabA) {
            return direct_to_u16::<T>(src, dst, n, self.layout.channel_count);
        }

        self.for_each_normalized(src, n, |i, norm, alpha| {
            let lab = encode_lab16(M::to_lab(norm));
            dst[i * 4..i * 4 + 3].copy_from_slice(&lab);
            dst[i * 4 + 3] = alpha.to_u16();
        });
    }

    fn from_lab_a16(&self, src: &[u16], dst: &mut [u8], n: usize) {
        if Self::is_direct(ColorModel::LabA) {
            return direct_from_u16::<T>(src, dst, n, self.layout.channel_count);
        }

        let mut norm = [0.0_f32; MAX_CHANNELS];
        for (lab, pixel) in src
            .chunks_exact(4)
            .zip(dst.chunks_exact_mut(self.layout.pixel_size()))
            .take(n)
        {
            M::from_lab(decode_lab16([lab[0], lab[1], lab[2]]), &mut norm);
            self.write_normalized(pixel, &norm[..self.color_channels()], T::from_u16(lab[3]));
        }
    }

    fn to_rgb_a16(&self, src: &[u8], dst: &mut [u16], n: usize) {
        if Self::is_direct(ColorModel::Rgba) {
            return direct_to_u16::<T>(src, dst, n, self.layout.channel_count);
        }

        self.for_each_normalized(src, n, |i, norm, alpha| {
            let rgb = M::to_srgb(norm);
            for c in 0..3 {
                dst[i * 4 + c] = (rgb[c].clamp(0.0, 1.0) * 65535.0 + 0.5) as u16;
            }
            dst[i * 4 + 3] = alpha.to_u16();
        });
    }

    fn from_rgb_a16(&self, src: &[u16], dst: &mut [u8], n: usize) {
        if Self::is_direct(ColorModel::Rgba) {
            return direct_from_u16::<T>(src, dst, n, self.layout.channel_count);
        }

        let mut norm = [0.0_f32; MAX_CHANNELS];
        for (rgba, pixel) in src
            .chunks_exact(4)
            .zip(dst.chunks_exact_mut(self.layout.pixel_size()))
            .take(n)
        {
            let rgb = [
                rgba[0] as f32 / 65535.0,
                rgba[1] as f32 / 65535.0,
                rgba[2] as f32 / 65535.0,
            ];
            M::from_srgb(rgb, &mut norm);
            self.write_normalized(pixel, &norm[..self.color_channels()], T::from_u16(rgba[3]));
        }
    }

    fn opacity_u8(&self, pixel: &[u8]) -> u8 {
        self.read_alpha(pixel).to_u8()
    }

    fn opacity_f(&self, pixel: &[u8]) -> f32 {
        self.read_alpha(pixel).to_f32()
    }

    fn set_opacity_u8(&self, pixels: &mut [u8], alpha: u8, n: usize) {
        let alpha = T::from_u8(alpha);
        self.map_alpha(pixels, n, |_, _| alpha);
    }

    fn set_opacity_f(&self, pixels: &mut [u8], alpha: f32, n: usize) {
        let alpha = T::from_f32(alpha);
        self.map_alpha(pixels, n, |_, _| alpha);
    }

    fn multiply_alpha(&self, pixels: &mut [u8], alpha: u8, n: usize) {
        let factor = T::from_u8(alpha);
        self.map_alpha(pixels, n, |_, a| a.mul(factor));
    }

    fn apply_alpha_u8_mask(&self, pixels: &mut [u8], mask: &[u8], n: usize) {
        self.map_alpha(pixels, n, |i, a| a.mul(T::from_u8(mask[i])));
    }

    fn apply_inverse_alpha_u8_mask(&self, pixels: &mut [u8], mask: &[u8], n: usize) {
        self.map_alpha(pixels, n, |i, a| a.mul(T::from_u8(mask[i]).inv()));
    }

    fn normalised_channel_values(&self, pixel: &[u8], values: &mut [f32]) {
        let mut px = [T::ZERO; MAX_CHANNELS];
        let channels = self.layout.channel_count;
        load_pixel(pixel, &mut px[..channels]);
        for (value, channel) in values.iter_mut().zip(&px[..channels]) {
            *value = channel.to_f32();
        }
    }

    fn from_normalised_channel_values(&self, pixel: &mut [u8], values: &[f32]) {
        let mut px = [T::ZERO; MAX_CHANNELS];
        let channels = self.layout.channel_count;
        for (channel, value) in px[..channels].iter_mut().zip(values) {
            *channel = T::from_f32(*value);
        }
        store_pixel(&px[..channels], pixel);
    }

    fn composite_op(&self, id: &str) -> Arc<dyn CompositeOp> {
        let ops = self.ops();

        if let Some(op) = ops.by_id.get(id) {
            return op.clone();
        }

        debug!(
            color_space = self.id.as_str(),
            id,
            "unknown composite op, falling back to over"
        );
        // Over is always registered.
        ops.by_id[COMPOSITE_OVER].clone()
    }

    fn has_composite_op(&self, id: &str) -> bool {
        self.ops().by_id.contains_key(id)
    }

    fn composite_ops(&self) -> Vec<Arc<dyn CompositeOp>> {
        self.ops().ordered.clone()
    }

    fn mix_colors_op(&self) -> &dyn MixColorsOp {
        &self.mix
    }
}

fn direct_to_u16<T: ChannelValue>(src: &[u8], dst: &mut [u16], n: usize, channels: usize) {
    let mut px = [T::ZERO; MAX_CHANNELS];
    let pixel_size = channels * std::mem::size_of::<T>();

    for (pixel, out) in src.chunks_exact(pixel_size).zip(dst.chunks_exact_mut(4)).take(n) {
        load_pixel(pixel, &mut px[..channels]);
        for (o, v) in out.iter_mut().zip(&px[..channels]) {
            *o = v.to_u16();
        }
    }
}

fn direct_from_u16<T: ChannelValue>(src: &[u16], dst: &mut [u8], n: usize, channels: usize) {
    let mut px = [T::ZERO; MAX_CHANNELS];
    let pixel_size = channels * std::mem::size_of::<T>();

    for (canonical, pixel) in src.chunks_exact(4).zip(dst.chunks_exact_mut(pixel_size)).take(n) {
        for (p, v) in px[..channels].iter_mut().zip(canonical) {
            *p = T::from_u16(*v);
        }
        store_pixel(&px[..channels], pixel);
    }
}

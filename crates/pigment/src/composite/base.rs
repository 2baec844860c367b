// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The pixel loop shared by all composite ops.

use super::functions::BlendFn;
use super::{CompositeOp, CompositeParams};
use crate::channel::{load_pixel, store_pixel, ChannelFlags, ChannelValue, MAX_CHANNELS};
use crate::color_space::PixelLayout;
use std::fmt;
use std::marker::PhantomData;

/// Per-call state handed to a [`Compositor`] along with every pixel.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ComposeContext<T> {
    pub(crate) layout: PixelLayout,
    pub(crate) flags: ChannelFlags,
    pub(crate) all_channels: bool,
    pub(crate) alpha_locked: bool,
    /// `opacity * flow`.
    pub(crate) opacity: T,
    /// Opacity without flow applied.
    pub(crate) stroke_opacity: T,
    pub(crate) flow: T,
    pub(crate) average_opacity: T,
    pub(crate) row: usize,
    pub(crate) col: usize,
}

impl<T: ChannelValue> ComposeContext<T> {
    /// Whether color channel `channel` may be written.
    #[inline]
    pub(crate) fn writes(&self, channel: usize) -> bool {
        self.layout.is_color_channel(channel) && (self.all_channels || self.flags.has(channel))
    }

    /// Indices of the writable color channels.
    #[inline]
    pub(crate) fn color_channels(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.layout.channel_count).filter(move |&c| self.writes(c))
    }

    /// Applies `func` to a channel pair, evaluated on additive values for subtractive
    /// layouts.
    #[inline]
    pub(crate) fn apply(&self, func: BlendFn<T>, src: T, dst: T) -> T {
        if self.layout.subtractive {
            func(src.inv(), dst.inv()).inv()
        } else {
            func(src, dst)
        }
    }

    pub(crate) fn copy_color(&self, src: &[T], dst: &mut [T]) {
        for c in self.color_channels() {
            dst[c] = src[c];
        }
    }

    pub(crate) fn zero_color(&self, dst: &mut [T]) {
        for c in 0..self.layout.channel_count {
            if self.layout.is_color_channel(c) {
                dst[c] = T::ZERO;
            }
        }
    }
}

/// Composes one pixel.
pub(crate) trait Compositor<T: ChannelValue>: Send + Sync + 'static {
    /// Update the color channels of `dst` and return the new destination alpha.
    ///
    /// The driver only stores the returned alpha when alpha is not locked.
    fn compose(
        &self,
        src: &[T],
        src_alpha: T,
        dst: &mut [T],
        dst_alpha: T,
        mask_alpha: T,
        ctx: &ComposeContext<T>,
    ) -> T;
}

/// A [`CompositeOp`] running a [`Compositor`] over every pixel.
pub(crate) struct CompositeOpImpl<T, C> {
    id: &'static str,
    category: &'static str,
    description: &'static str,
    layout: PixelLayout,
    compositor: C,
    _channel: PhantomData<fn() -> T>,
}

impl<T: ChannelValue, C: Compositor<T>> CompositeOpImpl<T, C> {
    pub(crate) fn new(
        id: &'static str,
        category: &'static str,
        description: &'static str,
        layout: PixelLayout,
        compositor: C,
    ) -> Self {
        Self {
            id,
            category,
            description,
            layout,
            compositor,
            _channel: PhantomData,
        }
    }
}

impl<T, C> fmt::Debug for CompositeOpImpl<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeOp")
            .field("id", &self.id)
            .field("category", &self.category)
            .finish()
    }
}

impl<T: ChannelValue, C: Compositor<T>> CompositeOp for CompositeOpImpl<T, C> {
    fn id(&self) -> &str {
        self.id
    }

    fn category(&self) -> &str {
        self.category
    }

    fn description(&self) -> &str {
        self.description
    }

    fn layout(&self) -> PixelLayout {
        self.layout
    }

    fn composite(&self, params: &mut CompositeParams<'_>) {
        let layout = self.layout;
        let channels = layout.channel_count;
        let pixel_size = layout.pixel_size();
        let alpha_pos = layout.alpha_pos;

        let flags = params.channel_flags;
        let all_channels = flags.is_all(channels);
        let opacity = params.opacity.clamp(0.0, 1.0);
        let flow = params.flow.clamp(0.0, 1.0);
        let average_opacity = params.average_opacity.unwrap_or(opacity).clamp(0.0, 1.0);

        let mut ctx = ComposeContext {
            layout,
            flags,
            all_channels,
            alpha_locked: alpha_pos.is_some_and(|a| !flags.has(a)),
            opacity: T::from_f32(opacity * flow),
            stroke_opacity: T::from_f32(opacity),
            flow: T::from_f32(flow),
            average_opacity: T::from_f32(average_opacity),
            row: 0,
            col: 0,
        };

        let mut src = [T::ZERO; MAX_CHANNELS];
        let mut dst = [T::ZERO; MAX_CHANNELS];
        let src_step = if params.src_row_stride == 0 {
            0
        } else {
            pixel_size
        };

        for row in 0..params.rows {
            let src_row = &params.src[row * params.src_row_stride..];
            let dst_row = &mut params.dst[row * params.dst_row_stride..];
            let mask_row = params.mask.map(|m| &m[row * params.mask_row_stride..]);

            for col in 0..params.cols {
                let src_bytes = &src_row[col * src_step..][..pixel_size];
                let dst_bytes = &mut dst_row[col * pixel_size..][..pixel_size];
                load_pixel(src_bytes, &mut src[..channels]);
                load_pixel(dst_bytes, &mut dst[..channels]);

                let src_alpha = alpha_pos.map_or(T::UNIT, |a| src[a]);
                let mut dst_alpha = alpha_pos.map_or(T::UNIT, |a| dst[a]);
                let mask_alpha = mask_row.map_or(T::UNIT, |m| T::from_u8(m[col]));

                // Disabled channels of a transparent pixel hold no meaningful color.
                if !all_channels && dst_alpha == T::ZERO {
                    dst[..channels].fill(T::ZERO);
                    dst_alpha = T::ZERO;
                }

                let mut before = [T::ZERO; MAX_CHANNELS];
                before[..channels].copy_from_slice(&dst[..channels]);

                ctx.row = row;
                ctx.col = col;
                let new_alpha = self.compositor.compose(
                    &src[..channels],
                    src_alpha,
                    &mut dst[..channels],
                    dst_alpha,
                    mask_alpha,
                    &ctx,
                );

                if let Some(a) = alpha_pos {
                    if !ctx.alpha_locked {
                        // A pixel the op touched and left fully transparent has no color.
                        if new_alpha == T::ZERO
                            && (dst_alpha != T::ZERO || dst[..channels] != before[..channels])
                        {
                            ctx.zero_color(&mut dst[..channels]);
                        }
                        dst[a] = new_alpha;
                    }
                }
                store_pixel(&dst[..channels], dst_bytes);
            }
        }
    }
}

/// Applies a separable blend function channel by channel.
pub(crate) struct Separable<T> {
    func: BlendFn<T>,
}

impl<T> Separable<T> {
    pub(crate) fn new(func: BlendFn<T>) -> Self {
        Self { func }
    }
}

impl<T: ChannelValue> Compositor<T> for Separable<T> {
    fn compose(
        &self,
        src: &[T],
        src_alpha: T,
        dst: &mut [T],
        dst_alpha: T,
        mask_alpha: T,
        ctx: &ComposeContext<T>,
    ) -> T {
        let src_alpha = src_alpha.mul3(mask_alpha, ctx.opacity);

        if ctx.alpha_locked {
            if dst_alpha != T::ZERO {
                for c in ctx.color_channels() {
                    dst[c] = dst[c].lerp(ctx.apply(self.func, src[c], dst[c]), src_alpha);
                }
            }
            return dst_alpha;
        }

        let new_alpha = src_alpha.union(dst_alpha);
        if new_alpha == T::ZERO {
            ctx.zero_color(dst);
            return new_alpha;
        }

        for c in ctx.color_channels() {
            let result = ctx.apply(self.func, src[c], dst[c]);
            dst[c] = T::blend(src[c], src_alpha, dst[c], dst_alpha, result).div(new_alpha);
        }
        new_alpha
    }
}

/// Adds the source scaled by its alpha onto the destination.
pub(crate) struct AdditionSai;

#[inline]
fn add_scaled<T: ChannelValue>(src: T, dst: T, src_alpha: T, ctx: &ComposeContext<T>) -> T {
    if ctx.layout.subtractive {
        dst.inv().add_clamped(src.inv().mul(src_alpha)).inv()
    } else {
        dst.add_clamped(src.mul(src_alpha))
    }
}

impl<T: ChannelValue> Compositor<T> for AdditionSai {
    fn compose(
        &self,
        src: &[T],
        src_alpha: T,
        dst: &mut [T],
        dst_alpha: T,
        mask_alpha: T,
        ctx: &ComposeContext<T>,
    ) -> T {
        let src_alpha = src_alpha.mul3(mask_alpha, ctx.opacity);

        if ctx.alpha_locked {
            if dst_alpha != T::ZERO {
                for c in ctx.color_channels() {
                    dst[c] = add_scaled(src[c], dst[c], src_alpha, ctx);
                }
            }
            return dst_alpha;
        }

        let new_alpha = src_alpha.union(dst_alpha);
        if new_alpha == T::ZERO {
            ctx.zero_color(dst);
            return new_alpha;
        }

        for c in ctx.color_channels() {
            dst[c] = add_scaled(src[c], dst[c], src_alpha, ctx);
        }
        new_alpha
    }
}

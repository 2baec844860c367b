// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ops with their own alpha discipline.

use super::base::{ComposeContext, Compositor};
use crate::channel::ChannelValue;

/// Source alpha after mask and opacity.
#[inline]
fn applied<T: ChannelValue>(src_alpha: T, mask_alpha: T, ctx: &ComposeContext<T>) -> T {
    src_alpha.mul3(mask_alpha, ctx.opacity)
}

/// Porter-Duff source over, with straight alpha.
pub(crate) struct Over;

impl<T: ChannelValue> Compositor<T> for Over {
    fn compose(
        &self,
        src: &[T],
        src_alpha: T,
        dst: &mut [T],
        dst_alpha: T,
        mask_alpha: T,
        ctx: &ComposeContext<T>,
    ) -> T {
        let applied = applied(src_alpha, mask_alpha, ctx);
        if applied == T::ZERO {
            return dst_alpha;
        }

        let (new_alpha, blend) = if ctx.alpha_locked || dst_alpha == T::UNIT {
            (dst_alpha, applied)
        } else if dst_alpha == T::ZERO {
            (applied, T::UNIT)
        } else {
            let new_alpha = dst_alpha.union(applied);
            (new_alpha, applied.div(new_alpha))
        };

        if blend == T::UNIT {
            ctx.copy_color(src, dst);
        } else {
            for c in ctx.color_channels() {
                dst[c] = dst[c].lerp(src[c], blend);
            }
        }
        new_alpha
    }
}

/// Paints under the existing content.
pub(crate) struct Behind;

impl<T: ChannelValue> Compositor<T> for Behind {
    fn compose(
        &self,
        src: &[T],
        src_alpha: T,
        dst: &mut [T],
        dst_alpha: T,
        mask_alpha: T,
        ctx: &ComposeContext<T>,
    ) -> T {
        let applied = applied(src_alpha, mask_alpha, ctx);
        if dst_alpha == T::UNIT || applied == T::ZERO {
            return dst_alpha;
        }

        let new_alpha = dst_alpha.union(applied);
        if dst_alpha == T::ZERO {
            ctx.copy_color(src, dst);
        } else {
            for c in ctx.color_channels() {
                dst[c] = src[c].mul(applied).lerp(dst[c], dst_alpha).div(new_alpha);
            }
        }
        new_alpha
    }
}

/// Paints so that inside one stroke alpha never grows beyond the stroke opacity.
///
/// `opacity` caps the alpha of the whole stroke and `average_opacity` carries the
/// opacity reached so far. With a flow below one the result leans towards a plain
/// union of coverages, so repeated dabs build up gradually.
pub(crate) struct AlphaDarken;

impl<T: ChannelValue> Compositor<T> for AlphaDarken {
    fn compose(
        &self,
        src: &[T],
        src_alpha: T,
        dst: &mut [T],
        dst_alpha: T,
        mask_alpha: T,
        ctx: &ComposeContext<T>,
    ) -> T {
        let src_alpha = src_alpha.mul(mask_alpha);
        let opacity = ctx.opacity;
        let average_opacity = ctx.average_opacity.mul(ctx.flow);
        let applied = src_alpha.mul(opacity);

        if dst_alpha == T::ZERO {
            ctx.copy_color(src, dst);
        } else {
            for c in ctx.color_channels() {
                dst[c] = dst[c].lerp(src[c], applied);
            }
        }

        let full_flow_alpha = if average_opacity > opacity {
            if average_opacity > dst_alpha {
                let reverse_blend = dst_alpha.div(average_opacity);
                applied.lerp(average_opacity, reverse_blend)
            } else {
                dst_alpha
            }
        } else if opacity > dst_alpha {
            dst_alpha.lerp(opacity, src_alpha)
        } else {
            dst_alpha
        };

        if ctx.flow == T::UNIT {
            full_flow_alpha
        } else {
            let zero_flow_alpha = applied.union(dst_alpha);
            zero_flow_alpha.lerp(full_flow_alpha, ctx.flow)
        }
    }
}

/// Replaces the destination with the source, weighted by opacity and mask.
pub(crate) struct CopyPixels;

impl<T: ChannelValue> Compositor<T> for CopyPixels {
    fn compose(
        &self,
        src: &[T],
        src_alpha: T,
        dst: &mut [T],
        dst_alpha: T,
        mask_alpha: T,
        ctx: &ComposeContext<T>,
    ) -> T {
        let opacity = ctx.opacity.mul(mask_alpha);

        if opacity == T::UNIT {
            ctx.copy_color(src, dst);
            return src_alpha;
        }
        if opacity == T::ZERO {
            return dst_alpha;
        }

        let new_alpha = dst_alpha.lerp(src_alpha, opacity);
        if new_alpha == T::ZERO {
            ctx.zero_color(dst);
            return new_alpha;
        }

        for c in ctx.color_channels() {
            let dst_mult = dst[c].mul(dst_alpha);
            let src_mult = src[c].mul(src_alpha);
            dst[c] = dst_mult.lerp(src_mult, opacity).div(new_alpha);
        }
        new_alpha
    }
}

/// Removes destination coverage where the source is opaque.
pub(crate) struct Erase;

impl<T: ChannelValue> Compositor<T> for Erase {
    fn compose(
        &self,
        _src: &[T],
        src_alpha: T,
        _dst: &mut [T],
        dst_alpha: T,
        mask_alpha: T,
        ctx: &ComposeContext<T>,
    ) -> T {
        dst_alpha.mul(applied(src_alpha, mask_alpha, ctx).inv())
    }
}

/// Keeps destination coverage only where the source is opaque.
pub(crate) struct DestinationIn;

impl<T: ChannelValue> Compositor<T> for DestinationIn {
    fn compose(
        &self,
        _src: &[T],
        src_alpha: T,
        _dst: &mut [T],
        dst_alpha: T,
        mask_alpha: T,
        ctx: &ComposeContext<T>,
    ) -> T {
        dst_alpha.mul(applied(src_alpha, mask_alpha, ctx))
    }
}

/// Destination over source, limited to the source coverage.
pub(crate) struct DestinationAtop;

impl<T: ChannelValue> Compositor<T> for DestinationAtop {
    fn compose(
        &self,
        src: &[T],
        src_alpha: T,
        dst: &mut [T],
        dst_alpha: T,
        mask_alpha: T,
        ctx: &ComposeContext<T>,
    ) -> T {
        let applied = applied(src_alpha, mask_alpha, ctx);

        if src_alpha != T::ZERO {
            if dst_alpha == T::ZERO {
                ctx.copy_color(src, dst);
            } else {
                for c in ctx.color_channels() {
                    dst[c] = src[c].lerp(dst[c], dst_alpha);
                }
            }
        }
        applied
    }
}

/// Raises alpha towards the source alpha where the source is more opaque.
///
/// A steep sigmoid picks between the two alphas, so the result never falls below the
/// destination alpha.
pub(crate) struct Greater;

impl<T: ChannelValue> Compositor<T> for Greater {
    fn compose(
        &self,
        src: &[T],
        src_alpha: T,
        dst: &mut [T],
        dst_alpha: T,
        mask_alpha: T,
        ctx: &ComposeContext<T>,
    ) -> T {
        if dst_alpha == T::UNIT {
            return dst_alpha;
        }
        let applied = applied(src_alpha, mask_alpha, ctx);
        if applied == T::ZERO {
            return dst_alpha;
        }

        let da = dst_alpha.to_f32();
        let sa = applied.to_f32();
        let w = 1.0 / (1.0 + (-40.0 * (da - sa)).exp());
        let a = (da * w + sa * (1.0 - w)).clamp(0.0, 1.0).max(da);
        let new_alpha = T::from_f32(a);

        if dst_alpha == T::ZERO {
            ctx.copy_color(src, dst);
            return new_alpha;
        }
        if new_alpha == T::ZERO {
            return dst_alpha;
        }

        let blend = T::from_f32(1.0 - (1.0 - a) / (1.0 - da + 1e-16));
        for c in ctx.color_channels() {
            let dst_mult = dst[c].mul(dst_alpha);
            dst[c] = dst_mult.lerp(src[c], blend).div(new_alpha);
        }
        new_alpha
    }
}

/// Copies whole source pixels where a per-pixel threshold is below the source alpha.
///
/// The threshold is a hash of the pixel position, so the pattern is stable for a
/// given call and safe to compute from many threads.
pub(crate) struct Dissolve;

fn dither(row: usize, col: usize) -> u8 {
    let mut h = (row as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (col as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    h ^= h >> 29;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 32;
    h as u8
}

impl<T: ChannelValue> Compositor<T> for Dissolve {
    fn compose(
        &self,
        src: &[T],
        src_alpha: T,
        dst: &mut [T],
        dst_alpha: T,
        mask_alpha: T,
        ctx: &ComposeContext<T>,
    ) -> T {
        let applied = applied(src_alpha, mask_alpha, ctx);
        if applied == T::ZERO || dither(ctx.row, ctx.col) > applied.to_u8() {
            return dst_alpha;
        }

        ctx.copy_color(src, dst);
        T::UNIT
    }
}

/// Blends a single channel of the source into the destination.
pub(crate) struct CopyChannel {
    pub(crate) channel: usize,
}

impl<T: ChannelValue> Compositor<T> for CopyChannel {
    fn compose(
        &self,
        src: &[T],
        src_alpha: T,
        dst: &mut [T],
        dst_alpha: T,
        mask_alpha: T,
        ctx: &ComposeContext<T>,
    ) -> T {
        let applied = applied(src_alpha, mask_alpha, ctx);
        if ctx.writes(self.channel) {
            dst[self.channel] = dst[self.channel].lerp(src[self.channel], applied);
        }
        dst_alpha
    }
}

/// Fades the destination out, ignoring the source.
pub(crate) struct Clear;

impl<T: ChannelValue> Compositor<T> for Clear {
    fn compose(
        &self,
        _src: &[T],
        _src_alpha: T,
        dst: &mut [T],
        dst_alpha: T,
        mask_alpha: T,
        ctx: &ComposeContext<T>,
    ) -> T {
        let new_alpha = dst_alpha.lerp(T::ZERO, mask_alpha.mul(ctx.opacity));
        if new_alpha == T::ZERO {
            ctx.zero_color(dst);
        }
        new_alpha
    }
}

/// Source color, limited to the destination coverage.
pub(crate) struct In;

impl<T: ChannelValue> Compositor<T> for In {
    fn compose(
        &self,
        src: &[T],
        src_alpha: T,
        dst: &mut [T],
        dst_alpha: T,
        mask_alpha: T,
        ctx: &ComposeContext<T>,
    ) -> T {
        let new_alpha = applied(src_alpha, mask_alpha, ctx).mul(dst_alpha);
        if new_alpha == T::ZERO {
            ctx.zero_color(dst);
        } else {
            ctx.copy_color(src, dst);
        }
        new_alpha
    }
}

/// Source color, limited to where the destination is transparent.
pub(crate) struct Out;

impl<T: ChannelValue> Compositor<T> for Out {
    fn compose(
        &self,
        src: &[T],
        src_alpha: T,
        dst: &mut [T],
        dst_alpha: T,
        mask_alpha: T,
        ctx: &ComposeContext<T>,
    ) -> T {
        let new_alpha = applied(src_alpha, mask_alpha, ctx).mul(dst_alpha.inv());
        if new_alpha == T::ZERO {
            ctx.zero_color(dst);
        } else {
            ctx.copy_color(src, dst);
        }
        new_alpha
    }
}

/// Source over destination, keeping the destination coverage.
pub(crate) struct Atop;

impl<T: ChannelValue> Compositor<T> for Atop {
    fn compose(
        &self,
        src: &[T],
        src_alpha: T,
        dst: &mut [T],
        dst_alpha: T,
        mask_alpha: T,
        ctx: &ComposeContext<T>,
    ) -> T {
        let applied = applied(src_alpha, mask_alpha, ctx);
        if dst_alpha != T::ZERO {
            for c in ctx.color_channels() {
                dst[c] = dst[c].lerp(src[c], applied);
            }
        }
        dst_alpha
    }
}

/// Leaves the destination untouched.
pub(crate) struct NoComposition;

impl<T: ChannelValue> Compositor<T> for NoComposition {
    fn compose(
        &self,
        _src: &[T],
        _src_alpha: T,
        _dst: &mut [T],
        dst_alpha: T,
        _mask_alpha: T,
        _ctx: &ComposeContext<T>,
    ) -> T {
        dst_alpha
    }
}

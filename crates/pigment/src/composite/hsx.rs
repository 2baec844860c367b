// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Non-separable blend functions working in the HSY, HSI, HSL and HSV models.
//!
//! The saturation and lightness helpers follow the W3C compositing definitions of
//! `SetSat`, `SetLum` and `ClipColor`, generalized over the lightness measure of each
//! model. Colors are `[r, g, b]` in `0.0..=1.0`.

use super::base::{ComposeContext, Compositor};
use crate::channel::ChannelValue;

pub(crate) type Rgb = [f32; 3];

/// Signature of a non-separable blend function, `(src, dst) -> result`.
pub(crate) type HsxFn = fn(Rgb, Rgb) -> Rgb;

/// A polar color model.
pub(crate) trait HsxModel: 'static {
    fn lightness(rgb: Rgb) -> f32;
    fn saturation(rgb: Rgb) -> f32;
}

/// Luma weighted lightness.
pub(crate) struct Hsy;
/// Mean of the channels.
pub(crate) struct Hsi;
pub(crate) struct Hsl;
pub(crate) struct Hsv;

fn max3(rgb: Rgb) -> f32 {
    rgb[0].max(rgb[1]).max(rgb[2])
}

fn min3(rgb: Rgb) -> f32 {
    rgb[0].min(rgb[1]).min(rgb[2])
}

impl HsxModel for Hsy {
    fn lightness(rgb: Rgb) -> f32 {
        0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2]
    }

    fn saturation(rgb: Rgb) -> f32 {
        max3(rgb) - min3(rgb)
    }
}

impl HsxModel for Hsi {
    fn lightness(rgb: Rgb) -> f32 {
        (rgb[0] + rgb[1] + rgb[2]) / 3.0
    }

    fn saturation(rgb: Rgb) -> f32 {
        let (max, min) = (max3(rgb), min3(rgb));
        if max - min > f32::EPSILON {
            1.0 - min / Self::lightness(rgb)
        } else {
            0.0
        }
    }
}

impl HsxModel for Hsl {
    fn lightness(rgb: Rgb) -> f32 {
        (max3(rgb) + min3(rgb)) * 0.5
    }

    fn saturation(rgb: Rgb) -> f32 {
        let divisor = 1.0 - (2.0 * Self::lightness(rgb) - 1.0).abs();
        if divisor > f32::EPSILON {
            (max3(rgb) - min3(rgb)) / divisor
        } else {
            0.0
        }
    }
}

impl HsxModel for Hsv {
    fn lightness(rgb: Rgb) -> f32 {
        max3(rgb)
    }

    fn saturation(rgb: Rgb) -> f32 {
        let max = max3(rgb);
        if max > f32::EPSILON {
            (max - min3(rgb)) / max
        } else {
            0.0
        }
    }
}

/// Stretch the color so that its chroma becomes `sat`, keeping the hue.
fn set_saturation(rgb: Rgb, sat: f32) -> Rgb {
    let mut order = [0, 1, 2];
    order.sort_by(|&a, &b| rgb[a].total_cmp(&rgb[b]));
    let [min, mid, max] = order;

    let chroma = rgb[max] - rgb[min];
    if chroma <= 0.0 {
        return [0.0; 3];
    }

    let mut out = [0.0; 3];
    out[mid] = (rgb[mid] - rgb[min]) * sat / chroma;
    out[max] = sat;
    out[min] = 0.0;
    out
}

/// Shift all channels by `delta` and pull the result back into gamut.
fn add_lightness<M: HsxModel>(rgb: Rgb, delta: f32) -> Rgb {
    let rgb = rgb.map(|c| c + delta);
    let l = M::lightness(rgb);
    let (n, x) = (min3(rgb), max3(rgb));

    let rgb = if n < 0.0 {
        let scale = l / (l - n);
        rgb.map(|c| l + (c - l) * scale)
    } else {
        rgb
    };

    if x > 1.0 && x - l > f32::EPSILON {
        let scale = (1.0 - l) / (x - l);
        rgb.map(|c| l + (c - l) * scale)
    } else {
        rgb
    }
}

fn set_lightness<M: HsxModel>(rgb: Rgb, lightness: f32) -> Rgb {
    add_lightness::<M>(rgb, lightness - M::lightness(rgb))
}

fn with_sat_and_lightness<M: HsxModel>(rgb: Rgb, sat: f32, lightness: f32) -> Rgb {
    set_lightness::<M>(set_saturation(rgb, sat), lightness)
}

/// Hue of the source, saturation and lightness of the destination.
pub(crate) fn hue<M: HsxModel>(src: Rgb, dst: Rgb) -> Rgb {
    with_sat_and_lightness::<M>(src, M::saturation(dst), M::lightness(dst))
}

/// Hue and saturation of the source, lightness of the destination.
pub(crate) fn color<M: HsxModel>(src: Rgb, dst: Rgb) -> Rgb {
    set_lightness::<M>(src, M::lightness(dst))
}

pub(crate) fn saturation<M: HsxModel>(src: Rgb, dst: Rgb) -> Rgb {
    with_sat_and_lightness::<M>(dst, M::saturation(src), M::lightness(dst))
}

pub(crate) fn increase_saturation<M: HsxModel>(src: Rgb, dst: Rgb) -> Rgb {
    let sat_dst = M::saturation(dst);
    let sat = sat_dst + (1.0 - sat_dst) * M::saturation(src);
    with_sat_and_lightness::<M>(dst, sat, M::lightness(dst))
}

pub(crate) fn decrease_saturation<M: HsxModel>(src: Rgb, dst: Rgb) -> Rgb {
    let sat = M::saturation(dst) * M::saturation(src);
    with_sat_and_lightness::<M>(dst, sat, M::lightness(dst))
}

/// Lightness of the source, hue and saturation of the destination.
pub(crate) fn lightness<M: HsxModel>(src: Rgb, dst: Rgb) -> Rgb {
    set_lightness::<M>(dst, M::lightness(src))
}

pub(crate) fn increase_lightness<M: HsxModel>(src: Rgb, dst: Rgb) -> Rgb {
    add_lightness::<M>(dst, M::lightness(src))
}

pub(crate) fn decrease_lightness<M: HsxModel>(src: Rgb, dst: Rgb) -> Rgb {
    add_lightness::<M>(dst, M::lightness(src) - 1.0)
}

/// Whichever of the two colors has the lower luma.
pub(crate) fn darker_color<M: HsxModel>(src: Rgb, dst: Rgb) -> Rgb {
    if M::lightness(dst) <= M::lightness(src) {
        dst
    } else {
        src
    }
}

pub(crate) fn lighter_color<M: HsxModel>(src: Rgb, dst: Rgb) -> Rgb {
    if M::lightness(dst) >= M::lightness(src) {
        dst
    } else {
        src
    }
}

/// Runs an [`HsxFn`] on the red, green and blue channels of an RGB layout.
pub(crate) struct NonSeparable {
    func: HsxFn,
    rgb: [usize; 3],
}

impl NonSeparable {
    pub(crate) fn new(func: HsxFn, rgb: [usize; 3]) -> Self {
        Self { func, rgb }
    }

    fn apply<T: ChannelValue>(&self, src: &[T], dst: &[T]) -> [T; 3] {
        let s = self.rgb.map(|c| src[c].to_f32());
        let d = self.rgb.map(|c| dst[c].to_f32());
        (self.func)(s, d).map(T::from_f32)
    }
}

impl<T: ChannelValue> Compositor<T> for NonSeparable {
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
                let result = self.apply(src, dst);
                for (&c, r) in self.rgb.iter().zip(result) {
                    if ctx.writes(c) {
                        dst[c] = dst[c].lerp(r, src_alpha);
                    }
                }
            }
            return dst_alpha;
        }

        let new_alpha = src_alpha.union(dst_alpha);
        if new_alpha == T::ZERO {
            ctx.zero_color(dst);
            return new_alpha;
        }

        let result = self.apply(src, dst);
        for (&c, r) in self.rgb.iter().zip(result) {
            if ctx.writes(c) {
                dst[c] = T::blend(src[c], src_alpha, dst[c], dst_alpha, r).div(new_alpha);
            }
        }
        new_alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Rgb, b: Rgb) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn lightness_measures() {
        let rgb = [0.2, 0.4, 0.9];
        assert!((Hsv::lightness(rgb) - 0.9).abs() < 1e-6);
        assert!((Hsl::lightness(rgb) - 0.55).abs() < 1e-6);
        assert!((Hsi::lightness(rgb) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn color_keeps_destination_lightness() {
        let out = color::<Hsy>([1.0, 0.0, 0.0], [0.5, 0.5, 0.5]);
        assert!((Hsy::lightness(out) - 0.5).abs() < 1e-4);
        assert!(out[0] > out[1] && out[1] == out[2]);
    }

    #[test]
    fn hue_of_gray_source_is_gray() {
        let out = hue::<Hsl>([0.3, 0.3, 0.3], [0.9, 0.1, 0.1]);
        assert!((out[0] - out[1]).abs() < 1e-4 && (out[1] - out[2]).abs() < 1e-4);
    }

    #[test]
    fn lightness_of_white_source_saturates() {
        assert!(close(lightness::<Hsv>([1.0; 3], [0.2, 0.4, 0.6]), [0.6, 0.8, 1.0]));
    }

    #[test]
    fn darker_and_lighter_color_pick_whole_pixels() {
        let (a, b) = ([0.9, 0.9, 0.1], [0.1, 0.2, 0.9]);
        assert_eq!(darker_color::<Hsy>(a, b), b);
        assert_eq!(lighter_color::<Hsy>(a, b), a);
    }
}

// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Weighted mixing of pixels.
//!
//! Colors are weighted by their alpha before averaging, so a fully transparent pixel
//! contributes nothing to the color of the result, only to its alpha.

use crate::channel::{load_pixel, store_pixel, ChannelValue, CompositeValue, MAX_CHANNELS};
use crate::color_space::PixelLayout;
use std::fmt;
use std::marker::PhantomData;

/// Mixes pixels of one color space.
pub trait MixColorsOp: Send + Sync + fmt::Debug {
    /// Mix `colors` with `weights` into the single pixel `dst`.
    ///
    /// The resulting alpha is the weighted alpha average, so `weight_sum` usually is the
    /// sum of `weights`. A non-positive `weight_sum` or a zero total alpha yields an all
    /// zero pixel.
    fn mix_colors(&self, colors: &[&[u8]], weights: &[i16], weight_sum: i32, dst: &mut [u8]);

    /// Like [`mix_colors`](Self::mix_colors) for `weights.len()` consecutive pixels.
    fn mix_colors_packed(&self, colors: &[u8], weights: &[i16], weight_sum: i32, dst: &mut [u8]);

    /// Unweighted average of `colors`.
    fn mix_colors_average(&self, colors: &[&[u8]], dst: &mut [u8]);

    /// Mix `n` pixel pairs, `weight` is the share of `b` in `0.0..=1.0`.
    fn mix_two_color_arrays(&self, a: &[u8], b: &[u8], n: usize, weight: f32, dst: &mut [u8]);

    /// Mix `n` pixels of `a` with the single pixel `color`.
    fn mix_array_with_color(&self, a: &[u8], color: &[u8], n: usize, weight: f32, dst: &mut [u8]);

    fn create_mixer(&self) -> Box<dyn Mixer>;
}

/// Accumulates weighted pixels over several calls.
pub trait Mixer: Send {
    /// Add `weights.len()` consecutive pixels of `colors`.
    fn accumulate(&mut self, colors: &[u8], weights: &[i16], weight_sum: i32);
    /// Add `n` consecutive pixels with unit weight.
    fn accumulate_average(&mut self, colors: &[u8], n: usize);
    fn compute_mixed_color(&self, dst: &mut [u8]);
}

/// Map a `0.0..=1.0` weight to the 255 scale used by the two-color mixers.
fn weight_255(weight: f32) -> i16 {
    (weight.clamp(0.0, 1.0) * 255.0).round() as i16
}

struct Accumulator<T: ChannelValue> {
    layout: PixelLayout,
    totals: [T::Composite; MAX_CHANNELS],
    total_alpha: T::Composite,
}

impl<T: ChannelValue> Accumulator<T> {
    fn new(layout: PixelLayout) -> Self {
        Self {
            layout,
            totals: [T::Composite::ZERO; MAX_CHANNELS],
            total_alpha: T::Composite::ZERO,
        }
    }

    #[inline]
    fn add(&mut self, pixel: &[u8], weight: i64) {
        let channels = self.layout.channel_count;
        let mut px = [T::ZERO; MAX_CHANNELS];
        load_pixel(pixel, &mut px[..channels]);

        let alpha = self.layout.alpha_pos.map_or(T::UNIT, |a| px[a]);
        let alpha_times_weight = alpha.widen() * T::Composite::from_i64(weight);

        for c in 0..channels {
            if self.layout.is_color_channel(c) {
                self.totals[c] = self.totals[c] + px[c].widen() * alpha_times_weight;
            }
        }
        self.total_alpha = self.total_alpha + alpha_times_weight;
    }

    fn finish(&self, weight_sum: i64, dst: &mut [u8]) {
        let pixel_size = self.layout.pixel_size();
        let weight_sum = T::Composite::from_i64(weight_sum);

        let max_alpha = T::UNIT.widen() * weight_sum;
        let total_alpha = if self.total_alpha > max_alpha {
            max_alpha
        } else {
            self.total_alpha
        };

        if !(weight_sum > T::Composite::ZERO && total_alpha > T::Composite::ZERO) {
            dst[..pixel_size].fill(0);
            return;
        }

        let channels = self.layout.channel_count;
        let mut px = [T::ZERO; MAX_CHANNELS];
        for c in 0..channels {
            px[c] = if self.layout.is_color_channel(c) {
                T::narrow(self.totals[c].div_round(total_alpha))
            } else {
                T::narrow(total_alpha.div_round(weight_sum))
            };
        }
        store_pixel(&px[..channels], &mut dst[..pixel_size]);
    }
}

/// The mixer of every built-in color space.
pub(crate) struct MixColorsOpImpl<T> {
    layout: PixelLayout,
    _channel: PhantomData<fn() -> T>,
}

impl<T: ChannelValue> MixColorsOpImpl<T> {
    pub(crate) fn new(layout: PixelLayout) -> Self {
        Self {
            layout,
            _channel: PhantomData,
        }
    }

    fn mix_pair(&self, a: &[u8], b: &[u8], weight: i16, dst: &mut [u8]) {
        let mut acc = Accumulator::<T>::new(self.layout);
        acc.add(a, 255 - weight as i64);
        acc.add(b, weight as i64);
        acc.finish(255, dst);
    }
}

impl<T> fmt::Debug for MixColorsOpImpl<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MixColorsOp")
            .field("layout", &self.layout)
            .finish()
    }
}

impl<T: ChannelValue> MixColorsOp for MixColorsOpImpl<T> {
    fn mix_colors(&self, colors: &[&[u8]], weights: &[i16], weight_sum: i32, dst: &mut [u8]) {
        let mut acc = Accumulator::<T>::new(self.layout);
        for (color, weight) in colors.iter().zip(weights) {
            acc.add(color, *weight as i64);
        }
        acc.finish(weight_sum as i64, dst);
    }

    fn mix_colors_packed(&self, colors: &[u8], weights: &[i16], weight_sum: i32, dst: &mut [u8]) {
        let mut acc = Accumulator::<T>::new(self.layout);
        for (color, weight) in colors.chunks_exact(self.layout.pixel_size()).zip(weights) {
            acc.add(color, *weight as i64);
        }
        acc.finish(weight_sum as i64, dst);
    }

    fn mix_colors_average(&self, colors: &[&[u8]], dst: &mut [u8]) {
        let mut acc = Accumulator::<T>::new(self.layout);
        for color in colors {
            acc.add(color, 1);
        }
        acc.finish(colors.len() as i64, dst);
    }

    fn mix_two_color_arrays(&self, a: &[u8], b: &[u8], n: usize, weight: f32, dst: &mut [u8]) {
        let pixel_size = self.layout.pixel_size();
        let weight = weight_255(weight);

        for ((a, b), dst) in a
            .chunks_exact(pixel_size)
            .zip(b.chunks_exact(pixel_size))
            .zip(dst.chunks_exact_mut(pixel_size))
            .take(n)
        {
            self.mix_pair(a, b, weight, dst);
        }
    }

    fn mix_array_with_color(&self, a: &[u8], color: &[u8], n: usize, weight: f32, dst: &mut [u8]) {
        let pixel_size = self.layout.pixel_size();
        let weight = weight_255(weight);

        for (a, dst) in a
            .chunks_exact(pixel_size)
            .zip(dst.chunks_exact_mut(pixel_size))
            .take(n)
        {
            self.mix_pair(a, color, weight, dst);
        }
    }

    fn create_mixer(&self) -> Box<dyn Mixer> {
        Box::new(MixerImpl {
            acc: Accumulator::<T>::new(self.layout),
            weight_sum: 0,
        })
    }
}

struct MixerImpl<T: ChannelValue> {
    acc: Accumulator<T>,
    weight_sum: i64,
}

impl<T: ChannelValue> Mixer for MixerImpl<T> {
    fn accumulate(&mut self, colors: &[u8], weights: &[i16], weight_sum: i32) {
        let pixel_size = self.acc.layout.pixel_size();
        for (color, weight) in colors.chunks_exact(pixel_size).zip(weights) {
            self.acc.add(color, *weight as i64);
        }
        self.weight_sum += weight_sum as i64;
    }

    fn accumulate_average(&mut self, colors: &[u8], n: usize) {
        let pixel_size = self.acc.layout.pixel_size();
        for color in colors.chunks_exact(pixel_size).take(n) {
            self.acc.add(color, 1);
        }
        self.weight_sum += n as i64;
    }

    fn compute_mixed_color(&self, dst: &mut [u8]) {
        self.acc.finish(self.weight_sum, dst);
    }
}

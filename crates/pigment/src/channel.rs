// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Channel value types and the arithmetic every pixel operator is written against.
//!
//! Integer channels are normalized against their maximum value (`UNIT == MAX`), floating
//! point channels against `1.0`. All the helpers here round the way the blend formulas
//! expect, so that for example `a.mul(UNIT) == a` and `a.lerp(b, UNIT) == b` hold exactly.

use bytemuck::Pod;
use half::f16;
use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

/// Bit depth of a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorDepth {
    U8,
    U16,
    U32,
    F16,
    F32,
}

impl ColorDepth {
    pub const ALL: [ColorDepth; 5] = [
        ColorDepth::U8,
        ColorDepth::U16,
        ColorDepth::U32,
        ColorDepth::F16,
        ColorDepth::F32,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ColorDepth::U8 => "U8",
            ColorDepth::U16 => "U16",
            ColorDepth::U32 => "U32",
            ColorDepth::F16 => "F16",
            ColorDepth::F32 => "F32",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.id() == id)
    }

    /// Size of one channel in bytes.
    pub fn channel_size(self) -> usize {
        match self {
            ColorDepth::U8 => 1,
            ColorDepth::U16 | ColorDepth::F16 => 2,
            ColorDepth::U32 | ColorDepth::F32 => 4,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, ColorDepth::F16 | ColorDepth::F32)
    }
}

/// The wide accumulator used when summing many weighted channel values.
pub trait CompositeValue:
    Copy
    + Debug
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Send
    + Sync
    + 'static
{
    const ZERO: Self;

    fn from_i64(v: i64) -> Self;

    /// Division that rounds half up for integers and divides exactly for floats.
    fn div_round(self, divisor: Self) -> Self;
}

impl CompositeValue for i64 {
    const ZERO: Self = 0;

    #[inline]
    fn from_i64(v: i64) -> Self {
        v
    }

    #[inline]
    fn div_round(self, divisor: Self) -> Self {
        (self + divisor / 2) / divisor
    }
}

impl CompositeValue for i128 {
    const ZERO: Self = 0;

    #[inline]
    fn from_i64(v: i64) -> Self {
        v as i128
    }

    #[inline]
    fn div_round(self, divisor: Self) -> Self {
        (self + divisor / 2) / divisor
    }
}

impl CompositeValue for f64 {
    const ZERO: Self = 0.0;

    #[inline]
    fn from_i64(v: i64) -> Self {
        v as f64
    }

    #[inline]
    fn div_round(self, divisor: Self) -> Self {
        self / divisor
    }
}

/// Per-channel numeric traits.
pub trait ChannelValue: Pod + Debug + PartialOrd + Send + Sync {
    /// Accumulator wide enough for `value * alpha * weight` sums.
    type Composite: CompositeValue;

    const DEPTH: ColorDepth;
    const ZERO: Self;
    /// Fully opaque / full intensity.
    const UNIT: Self;
    const HALF: Self;
    const MIN: Self;
    const MAX: Self;
    /// Largest value of the domain used by the bitwise blend modes.
    const BITS_MAX: u32;

    /// Normalized value, `UNIT` maps to `1.0`.
    fn to_f32(self) -> f32;
    fn from_f32(v: f32) -> Self;
    fn to_f64(self) -> f64;
    fn from_f64(v: f64) -> Self;

    fn widen(self) -> Self::Composite;
    /// Narrow an accumulator back into the channel range, clamping to `[MIN, MAX]`.
    fn narrow(v: Self::Composite) -> Self;

    fn from_u8(v: u8) -> Self;
    fn to_u8(self) -> u8;
    fn from_u16(v: u16) -> Self;
    fn to_u16(self) -> u16;

    /// The value as an unsigned integer for bitwise operators.
    fn to_bits(self) -> u32;
    fn from_bits(v: u32) -> Self;

    /// `a * b / UNIT`.
    fn mul(self, b: Self) -> Self;
    /// `a * b * c / UNIT²`.
    fn mul3(self, b: Self, c: Self) -> Self;
    /// `a * UNIT / b`, saturating. Division by zero yields zero for a zero dividend and
    /// `UNIT` otherwise.
    fn div(self, b: Self) -> Self;
    fn inv(self) -> Self;
    /// `a + (b - a) * alpha`.
    fn lerp(self, b: Self, alpha: Self) -> Self;
    fn add_clamped(self, b: Self) -> Self;
    fn sub_clamped(self, b: Self) -> Self;
    /// Union of two coverages: `a + b - a * b`.
    fn union(self, b: Self) -> Self;
    /// Porter-Duff style blend of a separable result, still multiplied by the new alpha.
    fn blend(src: Self, src_alpha: Self, dst: Self, dst_alpha: Self, cf: Self) -> Self;
}

macro_rules! int_channel {
    ($ty:ty, $wide:ty, $composite:ty, $depth:expr) => {
        impl ChannelValue for $ty {
            type Composite = $composite;

            const DEPTH: ColorDepth = $depth;
            const ZERO: Self = 0;
            const UNIT: Self = <$ty>::MAX;
            const HALF: Self = <$ty>::MAX / 2 + 1;
            const MIN: Self = 0;
            const MAX: Self = <$ty>::MAX;
            const BITS_MAX: u32 = <$ty>::MAX as u32;

            #[inline]
            fn to_f32(self) -> f32 {
                self.to_f64() as f32
            }

            #[inline]
            fn from_f32(v: f32) -> Self {
                Self::from_f64(v as f64)
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64 / <$ty>::MAX as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                // NaN saturates to zero in the cast.
                (v.clamp(0.0, 1.0) * <$ty>::MAX as f64 + 0.5) as Self
            }

            #[inline]
            fn widen(self) -> $composite {
                self as $composite
            }

            #[inline]
            fn narrow(v: $composite) -> Self {
                v.clamp(0, <$ty>::MAX as $composite) as Self
            }

            #[inline]
            fn from_u8(v: u8) -> Self {
                let unit = <$ty>::MAX as $wide;
                ((v as $wide * unit + 127) / 255) as Self
            }

            #[inline]
            fn to_u8(self) -> u8 {
                let unit = <$ty>::MAX as $wide;
                ((self as $wide * 255 + unit / 2) / unit) as u8
            }

            #[inline]
            fn from_u16(v: u16) -> Self {
                let unit = <$ty>::MAX as $wide;
                ((v as $wide * unit + 32767) / 65535) as Self
            }

            #[inline]
            fn to_u16(self) -> u16 {
                let unit = <$ty>::MAX as $wide;
                ((self as $wide * 65535 + unit / 2) / unit) as u16
            }

            #[inline]
            fn to_bits(self) -> u32 {
                self as u32
            }

            #[inline]
            fn from_bits(v: u32) -> Self {
                v.min(<$ty>::MAX as u32) as Self
            }

            #[inline]
            fn mul(self, b: Self) -> Self {
                let unit = <$ty>::MAX as $wide;
                ((self as $wide * b as $wide + unit / 2) / unit) as Self
            }

            #[inline]
            fn mul3(self, b: Self, c: Self) -> Self {
                let unit = <$ty>::MAX as $wide;
                let unit2 = unit * unit;
                ((self as $wide * b as $wide * c as $wide + unit2 / 2) / unit2) as Self
            }

            #[inline]
            fn div(self, b: Self) -> Self {
                if b == 0 {
                    return if self == 0 { 0 } else { <$ty>::MAX };
                }
                let unit = <$ty>::MAX as $wide;
                let q = (self as $wide * unit + b as $wide / 2) / b as $wide;
                if q > unit {
                    <$ty>::MAX
                } else {
                    q as Self
                }
            }

            #[inline]
            fn inv(self) -> Self {
                <$ty>::MAX - self
            }

            #[inline]
            fn lerp(self, b: Self, alpha: Self) -> Self {
                let unit = <$ty>::MAX as $composite;
                let d = (b as $composite - self as $composite) * alpha as $composite;
                let q = if d >= 0 {
                    (d + unit / 2) / unit
                } else {
                    (d - unit / 2) / unit
                };
                (self as $composite + q) as Self
            }

            #[inline]
            fn add_clamped(self, b: Self) -> Self {
                self.saturating_add(b)
            }

            #[inline]
            fn sub_clamped(self, b: Self) -> Self {
                self.saturating_sub(b)
            }

            #[inline]
            fn union(self, b: Self) -> Self {
                let ab = ChannelValue::mul(self, b) as $wide;
                let sum = self as $wide + b as $wide - ab;
                sum.min(<$ty>::MAX as $wide) as Self
            }

            #[inline]
            fn blend(src: Self, src_alpha: Self, dst: Self, dst_alpha: Self, cf: Self) -> Self {
                let a = src_alpha.inv().mul3(dst_alpha, dst) as $wide;
                let b = dst_alpha.inv().mul3(src_alpha, src) as $wide;
                let c = src_alpha.mul3(dst_alpha, cf) as $wide;
                (a + b + c).min(<$ty>::MAX as $wide) as Self
            }
        }
    };
}

int_channel!(u8, u64, i64, ColorDepth::U8);
int_channel!(u16, u64, i64, ColorDepth::U16);
int_channel!(u32, u128, i128, ColorDepth::U32);

impl ChannelValue for f32 {
    type Composite = f64;

    const DEPTH: ColorDepth = ColorDepth::F32;
    const ZERO: Self = 0.0;
    const UNIT: Self = 1.0;
    const HALF: Self = 0.5;
    const MIN: Self = f32::MIN;
    const MAX: Self = f32::MAX;
    const BITS_MAX: u32 = u16::MAX as u32;

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        if v.is_nan() {
            0.0
        } else {
            v
        }
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        Self::narrow(v)
    }

    #[inline]
    fn widen(self) -> f64 {
        self as f64
    }

    #[inline]
    fn narrow(v: f64) -> Self {
        if v.is_nan() {
            0.0
        } else {
            v.clamp(f32::MIN as f64, f32::MAX as f64) as f32
        }
    }

    #[inline]
    fn from_u8(v: u8) -> Self {
        v as f32 / 255.0
    }

    #[inline]
    fn to_u8(self) -> u8 {
        (self.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
    }

    #[inline]
    fn from_u16(v: u16) -> Self {
        v as f32 / 65535.0
    }

    #[inline]
    fn to_u16(self) -> u16 {
        (self.clamp(0.0, 1.0) * 65535.0 + 0.5) as u16
    }

    #[inline]
    fn to_bits(self) -> u32 {
        self.to_u16() as u32
    }

    #[inline]
    fn from_bits(v: u32) -> Self {
        v.min(u16::MAX as u32) as f32 / 65535.0
    }

    #[inline]
    fn mul(self, b: Self) -> Self {
        self * b
    }

    #[inline]
    fn mul3(self, b: Self, c: Self) -> Self {
        self * b * c
    }

    #[inline]
    fn div(self, b: Self) -> Self {
        if b == 0.0 {
            return if self == 0.0 { 0.0 } else { 1.0 };
        }
        self / b
    }

    #[inline]
    fn inv(self) -> Self {
        1.0 - self
    }

    #[inline]
    fn lerp(self, b: Self, alpha: Self) -> Self {
        self + (b - self) * alpha
    }

    #[inline]
    fn add_clamped(self, b: Self) -> Self {
        Self::narrow(self as f64 + b as f64)
    }

    #[inline]
    fn sub_clamped(self, b: Self) -> Self {
        Self::narrow(self as f64 - b as f64)
    }

    #[inline]
    fn union(self, b: Self) -> Self {
        self + b - self * b
    }

    #[inline]
    fn blend(src: Self, src_alpha: Self, dst: Self, dst_alpha: Self, cf: Self) -> Self {
        (1.0 - src_alpha) * dst_alpha * dst
            + (1.0 - dst_alpha) * src_alpha * src
            + src_alpha * dst_alpha * cf
    }
}

impl ChannelValue for f16 {
    type Composite = f64;

    const DEPTH: ColorDepth = ColorDepth::F16;
    const ZERO: Self = f16::ZERO;
    const UNIT: Self = f16::ONE;
    const HALF: Self = f16::from_f32_const(0.5);
    const MIN: Self = f16::MIN;
    const MAX: Self = f16::MAX;
    const BITS_MAX: u32 = u16::MAX as u32;

    #[inline]
    fn to_f32(self) -> f32 {
        f32::from(self)
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        Self::narrow(v as f64)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        Self::narrow(v)
    }

    #[inline]
    fn widen(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn narrow(v: f64) -> Self {
        if v.is_nan() {
            f16::ZERO
        } else {
            f16::from_f64(v.clamp(f64::from(f16::MIN), f64::from(f16::MAX)))
        }
    }

    #[inline]
    fn from_u8(v: u8) -> Self {
        f16::from_f32(v as f32 / 255.0)
    }

    #[inline]
    fn to_u8(self) -> u8 {
        (f32::from(self).clamp(0.0, 1.0) * 255.0 + 0.5) as u8
    }

    #[inline]
    fn from_u16(v: u16) -> Self {
        f16::from_f32(v as f32 / 65535.0)
    }

    #[inline]
    fn to_u16(self) -> u16 {
        (f32::from(self).clamp(0.0, 1.0) * 65535.0 + 0.5) as u16
    }

    #[inline]
    fn to_bits(self) -> u32 {
        ChannelValue::to_u16(self) as u32
    }

    #[inline]
    fn from_bits(v: u32) -> Self {
        f16::from_f32(v.min(u16::MAX as u32) as f32 / 65535.0)
    }

    #[inline]
    fn mul(self, b: Self) -> Self {
        f16::from_f32(f32::from(self) * f32::from(b))
    }

    #[inline]
    fn mul3(self, b: Self, c: Self) -> Self {
        f16::from_f32(f32::from(self) * f32::from(b) * f32::from(c))
    }

    #[inline]
    fn div(self, b: Self) -> Self {
        let (a, b) = (f32::from(self), f32::from(b));
        if b == 0.0 {
            return if a == 0.0 { f16::ZERO } else { f16::ONE };
        }
        Self::narrow((a / b) as f64)
    }

    #[inline]
    fn inv(self) -> Self {
        f16::from_f32(1.0 - f32::from(self))
    }

    #[inline]
    fn lerp(self, b: Self, alpha: Self) -> Self {
        let a = f32::from(self);
        f16::from_f32(a + (f32::from(b) - a) * f32::from(alpha))
    }

    #[inline]
    fn add_clamped(self, b: Self) -> Self {
        Self::narrow(f64::from(self) + f64::from(b))
    }

    #[inline]
    fn sub_clamped(self, b: Self) -> Self {
        Self::narrow(f64::from(self) - f64::from(b))
    }

    #[inline]
    fn union(self, b: Self) -> Self {
        let (a, b) = (f32::from(self), f32::from(b));
        f16::from_f32(a + b - a * b)
    }

    #[inline]
    fn blend(src: Self, src_alpha: Self, dst: Self, dst_alpha: Self, cf: Self) -> Self {
        let v = f32::blend(
            f32::from(src),
            f32::from(src_alpha),
            f32::from(dst),
            f32::from(dst_alpha),
            f32::from(cf),
        );
        Self::narrow(v as f64)
    }
}

/// Per-channel enable bits. A cleared bit leaves that channel untouched by compositing;
/// clearing the alpha bit locks alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelFlags(u32);

impl ChannelFlags {
    pub const ALL: Self = Self(u32::MAX);
    pub const NONE: Self = Self(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn has(self, channel: usize) -> bool {
        channel >= 32 || self.0 & (1 << channel) != 0
    }

    #[must_use]
    pub fn with(self, channel: usize, enabled: bool) -> Self {
        if channel >= 32 {
            return self;
        }

        if enabled {
            Self(self.0 | (1 << channel))
        } else {
            Self(self.0 & !(1 << channel))
        }
    }

    /// Whether all of the first `channel_count` channels are enabled.
    pub fn is_all(self, channel_count: usize) -> bool {
        (0..channel_count).all(|c| self.has(c))
    }
}

impl Default for ChannelFlags {
    fn default() -> Self {
        Self::ALL
    }
}

/// Largest channel count of any built-in pixel layout.
pub(crate) const MAX_CHANNELS: usize = 5;

#[inline(always)]
pub(crate) fn load_pixel<T: ChannelValue>(bytes: &[u8], out: &mut [T]) {
    let size = std::mem::size_of::<T>();
    for (value, chunk) in out.iter_mut().zip(bytes.chunks_exact(size)) {
        *value = bytemuck::pod_read_unaligned(chunk);
    }
}

#[inline(always)]
pub(crate) fn store_pixel<T: ChannelValue>(values: &[T], bytes: &mut [u8]) {
    let size = std::mem::size_of::<T>();
    for (value, chunk) in values.iter().zip(bytes.chunks_exact_mut(size)) {
        chunk.copy_from_slice(bytemuck::bytes_of(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_is_identity_for_mul() {
        for v in 0..=255u8 {
            assert_eq!(ChannelValue::mul(v, u8::UNIT), v);
            assert_eq!(ChannelValue::mul(u8::UNIT, v), v);
        }
        assert_eq!(ChannelValue::mul(40000u16, u16::UNIT), 40000);
        assert_eq!(ChannelValue::mul(3_000_000_000u32, u32::UNIT), 3_000_000_000);
    }

    #[test]
    fn lerp_hits_endpoints() {
        assert_eq!(10u8.lerp(200, 0), 10);
        assert_eq!(10u8.lerp(200, 255), 200);
        assert_eq!(200u8.lerp(10, 255), 10);
        assert_eq!(ChannelValue::lerp(0.25f32, 0.75, 0.5), 0.5);
    }

    #[test]
    fn depth_scaling_round_trips() {
        for v in 0..=255u8 {
            assert_eq!(u16::from_u8(v).to_u8(), v);
            assert_eq!(u32::from_u8(v).to_u8(), v);
            assert_eq!(f32::from_u8(v).to_u8(), v);
            assert_eq!(f16::from_u8(v).to_u8(), v);
        }
        assert_eq!(u8::from_u16(65535), 255);
        assert_eq!(u16::from_u8(255), 65535);
    }

    #[test]
    fn div_saturates() {
        assert_eq!(ChannelValue::div(200u8, 100), 255);
        assert_eq!(ChannelValue::div(0u8, 0), 0);
        assert_eq!(ChannelValue::div(1u8, 0), 255);
        assert_eq!(ChannelValue::div(51u8, 255), 51);
    }

    #[test]
    fn union_never_exceeds_unit() {
        for a in (0..=255u8).step_by(5) {
            for b in (0..=255u8).step_by(5) {
                let u = a.union(b);
                assert!(u >= a.max(b));
            }
        }
        assert_eq!(255u8.union(255), 255);
    }

    #[test]
    fn channel_flags() {
        let flags = ChannelFlags::ALL.with(3, false);
        assert!(flags.has(0));
        assert!(!flags.has(3));
        assert!(!flags.is_all(4));
        assert!(flags.is_all(3));
        assert_eq!(ChannelFlags::default(), ChannelFlags::ALL);
    }
}

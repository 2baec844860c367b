// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Separable blend functions.
//!
//! Each function maps a source and a destination channel value to the blended value,
//! without looking at alpha. `src` is the layer being composited, `dst` the backdrop.
//! Integer channels use exact integer arithmetic where the formula allows it, so that
//! results at `0` and `UNIT` are reproduced exactly.

use crate::channel::{ChannelValue, CompositeValue};
use std::f64::consts::PI;

/// Signature of a separable blend function.
pub(crate) type BlendFn<T> = fn(T, T) -> T;

#[inline]
fn float<T: ChannelValue>(src: T, dst: T, f: impl Fn(f64, f64) -> f64) -> T {
    T::from_f64(f(src.to_f64(), dst.to_f64()))
}

#[inline]
fn wide<T: ChannelValue>(v: i64) -> T::Composite {
    T::Composite::from_i64(v)
}

// Arithmetic

pub(crate) fn add<T: ChannelValue>(src: T, dst: T) -> T {
    T::narrow(src.widen() + dst.widen())
}

pub(crate) fn subtract<T: ChannelValue>(src: T, dst: T) -> T {
    T::narrow(dst.widen() - src.widen())
}

pub(crate) fn inverse_subtract<T: ChannelValue>(src: T, dst: T) -> T {
    T::narrow(dst.widen() - src.inv().widen())
}

pub(crate) fn multiply<T: ChannelValue>(src: T, dst: T) -> T {
    src.mul(dst)
}

pub(crate) fn divide<T: ChannelValue>(src: T, dst: T) -> T {
    if src == T::ZERO {
        return if dst == T::ZERO { T::ZERO } else { T::UNIT };
    }
    dst.div(src)
}

// Dark

pub(crate) fn darken<T: ChannelValue>(src: T, dst: T) -> T {
    if src < dst {
        src
    } else {
        dst
    }
}

pub(crate) fn color_burn<T: ChannelValue>(src: T, dst: T) -> T {
    if dst == T::UNIT {
        return T::UNIT;
    }
    let inv_dst = dst.inv();
    if src < inv_dst {
        return T::ZERO;
    }
    inv_dst.div(src).inv()
}

pub(crate) fn linear_burn<T: ChannelValue>(src: T, dst: T) -> T {
    T::narrow(src.widen() + dst.widen() - T::UNIT.widen())
}

pub(crate) fn gamma_dark<T: ChannelValue>(src: T, dst: T) -> T {
    if src == T::ZERO {
        return T::ZERO;
    }
    float(src, dst, |s, d| d.powf(1.0 / s))
}

/// Dual of [`tint_ifs_illusions`] on inverted inputs.
pub(crate) fn shade_ifs_illusions<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, |s, d| 1.0 - ((1.0 - s) * d + (1.0 - d).sqrt()))
}

pub(crate) fn fog_darken_ifs_illusions<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, |s, d| {
        if s < 0.5 {
            (1.0 - s) * s + s * d
        } else {
            s * d + s - s * s
        }
    })
}

pub(crate) fn easy_burn<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, |s, d| {
        let s = if s >= 1.0 { 0.999999999999 } else { s };
        1.0 - (1.0 - s).powf(d * 1.039999999)
    })
}

// Light

pub(crate) fn lighten<T: ChannelValue>(src: T, dst: T) -> T {
    if src > dst {
        src
    } else {
        dst
    }
}

pub(crate) fn color_dodge<T: ChannelValue>(src: T, dst: T) -> T {
    if dst == T::ZERO {
        return T::ZERO;
    }
    let inv_src = src.inv();
    if inv_src < dst {
        return T::UNIT;
    }
    dst.div(inv_src)
}

pub(crate) fn screen<T: ChannelValue>(src: T, dst: T) -> T {
    src.union(dst)
}

pub(crate) fn hard_light<T: ChannelValue>(src: T, dst: T) -> T {
    let src2 = src.widen() + src.widen();
    if src > T::HALF {
        T::narrow(src2 - T::UNIT.widen()).union(dst)
    } else {
        T::narrow(src2).mul(dst)
    }
}

pub(crate) fn soft_light_photoshop<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, |s, d| {
        if s > 0.5 {
            d + (2.0 * s - 1.0) * (d.sqrt() - d)
        } else {
            d - (1.0 - 2.0 * s) * d * (1.0 - d)
        }
    })
}

pub(crate) fn soft_light_svg<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, |s, d| {
        if s > 0.5 {
            let dd = if d > 0.25 {
                d.sqrt()
            } else {
                ((16.0 * d - 12.0) * d + 4.0) * d
            };
            d + (2.0 * s - 1.0) * (dd - d)
        } else {
            d - (1.0 - 2.0 * s) * d * (1.0 - d)
        }
    })
}

pub(crate) fn soft_light_ifs_illusions<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, |s, d| d.powf(2.0_f64.powf(2.0 * (0.5 - s))))
}

pub(crate) fn soft_light_pegtop_delphi<T: ChannelValue>(src: T, dst: T) -> T {
    let a = dst.inv().mul(src.mul(dst));
    let b = dst.mul(screen(src, dst));
    add(a, b)
}

pub(crate) fn gamma_light<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, |s, d| d.powf(s))
}

pub(crate) fn gamma_illumination<T: ChannelValue>(src: T, dst: T) -> T {
    gamma_dark(src.inv(), dst.inv()).inv()
}

pub(crate) fn vivid_light<T: ChannelValue>(src: T, dst: T) -> T {
    if src < T::HALF {
        if src == T::ZERO {
            return if dst == T::UNIT { T::UNIT } else { T::ZERO };
        }
        float(src, dst, |s, d| 1.0 - (1.0 - d) / (2.0 * s))
    } else {
        if src == T::UNIT {
            return if dst == T::ZERO { T::ZERO } else { T::UNIT };
        }
        float(src, dst, |s, d| d / (2.0 * (1.0 - s)))
    }
}

pub(crate) fn flat_light<T: ChannelValue>(src: T, dst: T) -> T {
    if src == T::ZERO {
        return T::ZERO;
    }
    if hard_mix_photoshop(src.inv(), dst) == T::UNIT {
        penumbra_b(src, dst)
    } else {
        penumbra_a(src, dst)
    }
}

pub(crate) fn linear_light<T: ChannelValue>(src: T, dst: T) -> T {
    T::narrow(dst.widen() + src.widen() + src.widen() - T::UNIT.widen())
}

pub(crate) fn pin_light<T: ChannelValue>(src: T, dst: T) -> T {
    let src2 = src.widen() + src.widen();
    let a = if dst.widen() < src2 { dst.widen() } else { src2 };
    let b = src2 - T::UNIT.widen();
    T::narrow(if b > a { b } else { a })
}

pub(crate) fn pnorm_a<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, |s, d| {
        (d.powf(7.0 / 3.0) + s.powf(7.0 / 3.0)).powf(3.0 / 7.0)
    })
}

pub(crate) fn pnorm_b<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, |s, d| (d.powi(4) + s.powi(4)).powf(0.25))
}

pub(crate) fn super_light<T: ChannelValue>(src: T, dst: T) -> T {
    const P: f64 = 2.875;
    float(src, dst, |s, d| {
        if s < 0.5 {
            1.0 - ((1.0 - d).powf(P) + (1.0 - 2.0 * s).powf(P)).powf(1.0 / P)
        } else {
            (d.powf(P) + (2.0 * s - 1.0).powf(P)).powf(1.0 / P)
        }
    })
}

pub(crate) fn tint_ifs_illusions<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, |s, d| s * (1.0 - d) + d.sqrt())
}

pub(crate) fn fog_lighten_ifs_illusions<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, |s, d| {
        if s < 0.5 {
            1.0 - (1.0 - s) * s - (1.0 - d) * (1.0 - s)
        } else {
            s - (1.0 - d) * (1.0 - s) + (1.0 - s) * (1.0 - s)
        }
    })
}

pub(crate) fn easy_dodge<T: ChannelValue>(src: T, dst: T) -> T {
    if src == T::UNIT {
        return T::UNIT;
    }
    float(src, dst, |s, d| d.powf((1.0 - s) * 1.039999999))
}

// Negative

pub(crate) fn difference<T: ChannelValue>(src: T, dst: T) -> T {
    if src > dst {
        T::narrow(src.widen() - dst.widen())
    } else {
        T::narrow(dst.widen() - src.widen())
    }
}

pub(crate) fn equivalence<T: ChannelValue>(src: T, dst: T) -> T {
    let x = dst.widen() - src.widen();
    T::narrow(if x < T::Composite::ZERO {
        T::Composite::ZERO - x
    } else {
        x
    })
}

pub(crate) fn additive_subtractive<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, |s, d| (d.sqrt() - s.sqrt()).abs())
}

pub(crate) fn exclusion<T: ChannelValue>(src: T, dst: T) -> T {
    let x = src.mul(dst).widen();
    T::narrow(dst.widen() + src.widen() - (x + x))
}

pub(crate) fn arc_tangent<T: ChannelValue>(src: T, dst: T) -> T {
    if dst == T::ZERO {
        return if src == T::ZERO { T::ZERO } else { T::UNIT };
    }
    float(src, dst, |s, d| 2.0 * (s / d).atan() / PI)
}

pub(crate) fn negation<T: ChannelValue>(src: T, dst: T) -> T {
    let unit = T::UNIT.widen();
    let x = unit - src.widen() - dst.widen();
    let abs = if x < T::Composite::ZERO {
        T::Composite::ZERO - x
    } else {
        x
    };
    T::narrow(unit - abs)
}

// Mix

pub(crate) fn overlay<T: ChannelValue>(src: T, dst: T) -> T {
    hard_light(dst, src)
}

pub(crate) fn hard_overlay<T: ChannelValue>(src: T, dst: T) -> T {
    if src == T::UNIT {
        return T::UNIT;
    }
    float(src, dst, |s, d| {
        if s > 0.5 {
            d / (2.0 - 2.0 * s)
        } else {
            2.0 * s * d
        }
    })
}

pub(crate) fn grain_merge<T: ChannelValue>(src: T, dst: T) -> T {
    T::narrow(dst.widen() + src.widen() - T::HALF.widen())
}

pub(crate) fn grain_extract<T: ChannelValue>(src: T, dst: T) -> T {
    T::narrow(dst.widen() - src.widen() + T::HALF.widen())
}

pub(crate) fn hard_mix<T: ChannelValue>(src: T, dst: T) -> T {
    if dst > T::HALF {
        color_dodge(src, dst)
    } else {
        color_burn(src, dst)
    }
}

pub(crate) fn hard_mix_photoshop<T: ChannelValue>(src: T, dst: T) -> T {
    if src.widen() + dst.widen() > T::UNIT.widen() {
        T::UNIT
    } else {
        T::ZERO
    }
}

pub(crate) fn hard_mix_softer_photoshop<T: ChannelValue>(src: T, dst: T) -> T {
    T::narrow(wide::<T>(3) * dst.widen() - wide::<T>(2) * src.inv().widen())
}

pub(crate) fn geometric_mean<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, |s, d| (s * d).sqrt())
}

pub(crate) fn parallel<T: ChannelValue>(src: T, dst: T) -> T {
    if src == T::ZERO || dst == T::ZERO {
        return T::ZERO;
    }
    float(src, dst, |s, d| 2.0 / (1.0 / s + 1.0 / d))
}

pub(crate) fn allanon<T: ChannelValue>(src: T, dst: T) -> T {
    T::narrow((src.widen() + dst.widen()).div_round(wide::<T>(2)))
}

pub(crate) fn interpolation<T: ChannelValue>(src: T, dst: T) -> T {
    if src == T::ZERO && dst == T::ZERO {
        return T::ZERO;
    }
    float(src, dst, |s, d| 0.5 - 0.25 * (PI * s).cos() - 0.25 * (PI * d).cos())
}

pub(crate) fn interpolation_b<T: ChannelValue>(src: T, dst: T) -> T {
    let x = interpolation(src, dst);
    interpolation(x, x)
}

pub(crate) fn penumbra_a<T: ChannelValue>(src: T, dst: T) -> T {
    if src == T::UNIT {
        return T::UNIT;
    }
    if src.widen() + dst.widen() < T::UNIT.widen() {
        return T::narrow(color_dodge(dst, src).widen().div_round(wide::<T>(2)));
    }
    if src == T::ZERO {
        return T::ZERO;
    }
    float(src, dst, |s, d| 1.0 - ((1.0 - d) / s).min(1.0) / 2.0)
}

pub(crate) fn penumbra_b<T: ChannelValue>(src: T, dst: T) -> T {
    penumbra_a(dst, src)
}

pub(crate) fn penumbra_c<T: ChannelValue>(src: T, dst: T) -> T {
    if src == T::UNIT {
        return T::UNIT;
    }
    float(src, dst, |s, d| 2.0 * (d / (1.0 - s)).atan() / PI)
}

pub(crate) fn penumbra_d<T: ChannelValue>(src: T, dst: T) -> T {
    if dst == T::UNIT {
        return T::UNIT;
    }
    float(src, dst, |s, d| 2.0 * (s / (1.0 - d)).atan() / PI)
}

// Quadratic

pub(crate) fn glow<T: ChannelValue>(src: T, dst: T) -> T {
    if dst == T::UNIT {
        return T::UNIT;
    }
    src.mul(src).div(dst.inv())
}

pub(crate) fn reflect<T: ChannelValue>(src: T, dst: T) -> T {
    glow(dst, src)
}

pub(crate) fn heat<T: ChannelValue>(src: T, dst: T) -> T {
    if src == T::UNIT {
        return T::UNIT;
    }
    if dst == T::ZERO {
        return T::ZERO;
    }
    let inv_src = src.inv();
    inv_src.mul(inv_src).div(dst).inv()
}

pub(crate) fn freeze<T: ChannelValue>(src: T, dst: T) -> T {
    heat(dst, src)
}

pub(crate) fn glow_heat<T: ChannelValue>(src: T, dst: T) -> T {
    if hard_mix_photoshop(src, dst) == T::UNIT {
        return glow(src, dst);
    }
    if dst == T::ZERO {
        return T::ZERO;
    }
    heat(src, dst)
}

pub(crate) fn heat_glow<T: ChannelValue>(src: T, dst: T) -> T {
    if hard_mix_photoshop(src, dst) == T::UNIT {
        return heat(src, dst);
    }
    if src == T::ZERO {
        return T::ZERO;
    }
    glow(src, dst)
}

pub(crate) fn reflect_freeze<T: ChannelValue>(src: T, dst: T) -> T {
    if hard_mix_photoshop(src, dst) == T::UNIT {
        return reflect(src, dst);
    }
    if src == T::ZERO {
        return T::ZERO;
    }
    freeze(src, dst)
}

pub(crate) fn freeze_reflect<T: ChannelValue>(src: T, dst: T) -> T {
    if hard_mix_photoshop(src, dst) == T::UNIT {
        return freeze(src, dst);
    }
    if dst == T::ZERO {
        return T::ZERO;
    }
    reflect(src, dst)
}

pub(crate) fn glow_heat_freeze_reflect<T: ChannelValue>(src: T, dst: T) -> T {
    allanon(freeze_reflect(src, dst), heat_glow(src, dst))
}

// Modulo

/// `a mod b` with `b` nudged up slightly so that `1 mod 1 == 1`.
fn modulo_f(a: f64, b: f64) -> f64 {
    let b = b + f64::EPSILON;
    a - b * (a / b).floor()
}

pub(crate) fn modulo<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, |s, d| modulo_f(d, s))
}

fn divisive_modulo_f(s: f64, d: f64) -> f64 {
    let s = if s == 0.0 { f64::EPSILON } else { s };
    modulo_f(d / s, 1.0)
}

fn divisive_modulo_continuous_f(s: f64, d: f64) -> f64 {
    if d == 0.0 {
        return 0.0;
    }
    if s == 0.0 {
        return divisive_modulo_f(s, d);
    }
    let v = divisive_modulo_f(s, d);
    if (d / s).ceil() as i64 % 2 != 0 {
        v
    } else {
        1.0 - v
    }
}

pub(crate) fn divisive_modulo<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, divisive_modulo_f)
}

pub(crate) fn divisive_modulo_continuous<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, divisive_modulo_continuous_f)
}

pub(crate) fn modulo_continuous<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, |s, d| divisive_modulo_continuous_f(s, d) * s)
}

fn modulo_shift_f(s: f64, d: f64) -> f64 {
    if s == 1.0 && d == 0.0 {
        return 0.0;
    }
    modulo_f(s + d, 1.0)
}

pub(crate) fn modulo_shift<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, modulo_shift_f)
}

pub(crate) fn modulo_shift_continuous<T: ChannelValue>(src: T, dst: T) -> T {
    float(src, dst, |s, d| {
        if s == 1.0 && d == 0.0 {
            return 1.0;
        }
        let v = modulo_shift_f(s, d);
        if (s + d).ceil() as i64 % 2 != 0 || d == 0.0 {
            v
        } else {
            1.0 - v
        }
    })
}

// Binary

#[inline]
fn bits<T: ChannelValue>(src: T, dst: T, f: impl Fn(u32, u32, u32) -> u32) -> T {
    T::from_bits(f(src.to_bits(), dst.to_bits(), T::BITS_MAX) & T::BITS_MAX)
}

pub(crate) fn xor<T: ChannelValue>(src: T, dst: T) -> T {
    bits(src, dst, |s, d, _| s ^ d)
}

pub(crate) fn or<T: ChannelValue>(src: T, dst: T) -> T {
    bits(src, dst, |s, d, _| s | d)
}

pub(crate) fn and<T: ChannelValue>(src: T, dst: T) -> T {
    bits(src, dst, |s, d, _| s & d)
}

pub(crate) fn nand<T: ChannelValue>(src: T, dst: T) -> T {
    bits(src, dst, |s, d, max| (max - s) | (max - d))
}

pub(crate) fn nor<T: ChannelValue>(src: T, dst: T) -> T {
    bits(src, dst, |s, d, max| (max - s) & (max - d))
}

pub(crate) fn xnor<T: ChannelValue>(src: T, dst: T) -> T {
    bits(src, dst, |s, d, max| s ^ (max - d))
}

pub(crate) fn implication<T: ChannelValue>(src: T, dst: T) -> T {
    bits(src, dst, |s, d, max| (max - s) | d)
}

pub(crate) fn not_implication<T: ChannelValue>(src: T, dst: T) -> T {
    bits(src, dst, |s, d, max| s & (max - d))
}

pub(crate) fn converse<T: ChannelValue>(src: T, dst: T) -> T {
    bits(src, dst, |s, d, max| s | (max - d))
}

pub(crate) fn not_converse<T: ChannelValue>(src: T, dst: T) -> T {
    bits(src, dst, |s, d, max| (max - s) & d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn darken_and_lighten_are_exact_at_the_edges() {
        assert_eq!(darken(0u8, 255), 0);
        assert_eq!(lighten(0u8, 255), 255);
        assert_eq!(color_dodge(255u8, 0), 0);
        assert_eq!(color_dodge(255u8, 1), 255);
        assert_eq!(color_burn(0u8, 255), 255);
        assert_eq!(color_burn(0u8, 254), 0);
    }

    #[test]
    fn add_saturates() {
        assert_eq!(add(100u8, 50), 150);
        assert_eq!(add(200u8, 100), 255);
        assert_eq!(subtract(200u8, 100), 0);
    }

    #[test]
    fn screen_and_multiply_identities() {
        for v in [0u8, 17, 128, 255] {
            assert_eq!(multiply(v, 255), v);
            assert_eq!(screen(v, 0), v);
            assert_eq!(multiply(v, 0), 0);
        }
    }

    #[test]
    fn overlay_of_mid_gray_is_identity_for_src() {
        assert_eq!(hard_light(0.5f32, 0.3), 0.3);
    }

    #[test]
    fn binary_ops_use_full_bit_range() {
        assert_eq!(xor(0b1010_1010u8, 0b1111_0000), 0b0101_1010);
        assert_eq!(nand(255u8, 255), 0);
        assert_eq!(nor(0u8, 0), 255);
        assert_eq!(and(1.0f32, 1.0), 1.0);
    }

    #[test]
    fn modulo_shift_wraps() {
        let v = modulo_shift(0.75f32, 0.5);
        assert!((v - 0.25).abs() < 1e-6, "{v}");
        assert_eq!(modulo_shift(1.0f32, 0.0), 0.0);
    }
}

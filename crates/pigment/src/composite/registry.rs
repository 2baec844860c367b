// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::base::{AdditionSai, CompositeOpImpl, Compositor, Separable};
use super::categories::*;
use super::functions::{self as f, BlendFn};
use super::hsx::{self, Hsi, Hsl, Hsv, HsxFn, Hsy, NonSeparable};
use super::ids::*;
use super::special::*;
use super::CompositeOp;
use crate::channel::ChannelValue;
use crate::color_space::PixelLayout;
use std::marker::PhantomData;
use std::sync::Arc;

struct OpList<T> {
    layout: PixelLayout,
    ops: Vec<Arc<dyn CompositeOp>>,
    _channel: PhantomData<fn() -> T>,
}

impl<T: ChannelValue> OpList<T> {
    fn add<C: Compositor<T>>(
        &mut self,
        id: &'static str,
        category: &'static str,
        description: &'static str,
        compositor: C,
    ) {
        self.ops.push(Arc::new(CompositeOpImpl::new(
            id,
            category,
            description,
            self.layout,
            compositor,
        )));
    }

    fn separable(
        &mut self,
        id: &'static str,
        category: &'static str,
        description: &'static str,
        func: BlendFn<T>,
    ) {
        self.add(id, category, description, Separable::new(func));
    }

    fn hsx(
        &mut self,
        rgb: [usize; 3],
        id: &'static str,
        category: &'static str,
        description: &'static str,
        func: HsxFn,
    ) {
        self.add(id, category, description, NonSeparable::new(func, rgb));
    }
}

/// All ops available for pixels of `layout` stored as `T`, over first.
pub(crate) fn standard_ops<T: ChannelValue>(layout: PixelLayout) -> Vec<Arc<dyn CompositeOp>> {
    let mut ops = OpList::<T> {
        layout,
        ops: Vec::with_capacity(160),
        _channel: PhantomData,
    };

    ops.add(COMPOSITE_OVER, MISC, "Normal", Over);
    ops.add(COMPOSITE_ALPHA_DARKEN, MISC, "Alpha darken", AlphaDarken);
    ops.add(COMPOSITE_BEHIND, MISC, "Behind", Behind);
    ops.add(COMPOSITE_GREATER, MISC, "Greater", Greater);
    ops.add(COMPOSITE_COPY, MISC, "Copy", CopyPixels);
    ops.add(COMPOSITE_ERASE, MISC, "Erase", Erase);
    ops.add(COMPOSITE_DESTINATION_IN, MISC, "Destination In", DestinationIn);
    ops.add(COMPOSITE_DESTINATION_ATOP, MISC, "Destination Atop", DestinationAtop);
    ops.add(COMPOSITE_IN, MISC, "In", In);
    ops.add(COMPOSITE_OUT, MISC, "Out", Out);
    ops.add(COMPOSITE_ATOP, MISC, "Atop", Atop);
    ops.add(COMPOSITE_CLEAR, MISC, "Clear", Clear);
    ops.add(COMPOSITE_DISSOLVE, MISC, "Dissolve", Dissolve);
    ops.add(COMPOSITE_NO, MISC, "No Composition", NoComposition);

    ops.separable(COMPOSITE_ADD, ARITHMETIC, "Addition", f::add);
    ops.separable(COMPOSITE_SUBTRACT, ARITHMETIC, "Subtract", f::subtract);
    ops.separable(COMPOSITE_INVERSE_SUBTRACT, ARITHMETIC, "Inversed-Subtract", f::inverse_subtract);
    ops.separable(COMPOSITE_MULT, ARITHMETIC, "Multiply", f::multiply);
    ops.separable(COMPOSITE_DIVIDE, ARITHMETIC, "Divide", f::divide);

    ops.separable(COMPOSITE_MOD, MODULO, "Modulo", f::modulo);
    ops.separable(COMPOSITE_MOD_CON, MODULO, "Modulo - Continuous", f::modulo_continuous);
    ops.separable(COMPOSITE_DIVISIVE_MOD, MODULO, "Divisive Modulo", f::divisive_modulo);
    ops.separable(
        COMPOSITE_DIVISIVE_MOD_CON,
        MODULO,
        "Divisive Modulo - Continuous",
        f::divisive_modulo_continuous,
    );
    ops.separable(COMPOSITE_MODULO_SHIFT, MODULO, "Modulo Shift", f::modulo_shift);
    ops.separable(
        COMPOSITE_MODULO_SHIFT_CON,
        MODULO,
        "Modulo Shift - Continuous",
        f::modulo_shift_continuous,
    );

    ops.separable(COMPOSITE_DIFF, NEGATIVE, "Difference", f::difference);
    ops.separable(COMPOSITE_EQUIVALENCE, NEGATIVE, "Equivalence", f::equivalence);
    ops.separable(
        COMPOSITE_ADDITIVE_SUBTRACTIVE,
        NEGATIVE,
        "Additive-Subtractive",
        f::additive_subtractive,
    );
    ops.separable(COMPOSITE_EXCLUSION, NEGATIVE, "Exclusion", f::exclusion);
    ops.separable(COMPOSITE_ARC_TANGENT, NEGATIVE, "Arcus Tangent", f::arc_tangent);
    ops.separable(COMPOSITE_NEGATION, NEGATIVE, "Negation", f::negation);

    ops.separable(COMPOSITE_OVERLAY, MIX, "Overlay", f::overlay);
    ops.separable(COMPOSITE_HARD_OVERLAY, MIX, "Hard Overlay", f::hard_overlay);
    ops.separable(COMPOSITE_GRAIN_MERGE, MIX, "Grain Merge", f::grain_merge);
    ops.separable(COMPOSITE_GRAIN_EXTRACT, MIX, "Grain Extract", f::grain_extract);
    ops.separable(COMPOSITE_HARD_MIX, MIX, "Hard Mix", f::hard_mix);
    ops.separable(
        COMPOSITE_HARD_MIX_PHOTOSHOP,
        MIX,
        "Hard Mix (Photoshop)",
        f::hard_mix_photoshop,
    );
    ops.separable(
        COMPOSITE_HARD_MIX_SOFTER_PHOTOSHOP,
        MIX,
        "Hard Mix Softer (Photoshop)",
        f::hard_mix_softer_photoshop,
    );
    ops.separable(COMPOSITE_GEOMETRIC_MEAN, MIX, "Geometric Mean", f::geometric_mean);
    ops.separable(COMPOSITE_PARALLEL, MIX, "Parallel", f::parallel);
    ops.separable(COMPOSITE_ALLANON, MIX, "Allanon", f::allanon);
    ops.separable(COMPOSITE_INTERPOLATION, MIX, "Interpolation", f::interpolation);
    ops.separable(COMPOSITE_INTERPOLATIONB, MIX, "Interpolation - 2X", f::interpolation_b);
    ops.separable(COMPOSITE_PENUMBRAA, MIX, "Penumbra A", f::penumbra_a);
    ops.separable(COMPOSITE_PENUMBRAB, MIX, "Penumbra B", f::penumbra_b);
    ops.separable(COMPOSITE_PENUMBRAC, MIX, "Penumbra C", f::penumbra_c);
    ops.separable(COMPOSITE_PENUMBRAD, MIX, "Penumbra D", f::penumbra_d);

    ops.separable(COMPOSITE_DARKEN, DARK, "Darken", f::darken);
    ops.separable(COMPOSITE_BURN, DARK, "Color Burn", f::color_burn);
    ops.separable(COMPOSITE_LINEAR_BURN, DARK, "Linear Burn", f::linear_burn);
    ops.separable(COMPOSITE_GAMMA_DARK, DARK, "Gamma Dark", f::gamma_dark);
    ops.separable(
        COMPOSITE_SHADE_IFS_ILLUSIONS,
        DARK,
        "Shade (IFS Illusions)",
        f::shade_ifs_illusions,
    );
    ops.separable(
        COMPOSITE_FOG_DARKEN_IFS_ILLUSIONS,
        DARK,
        "Fog Darken (IFS Illusions)",
        f::fog_darken_ifs_illusions,
    );
    ops.separable(COMPOSITE_EASY_BURN, DARK, "Easy Burn", f::easy_burn);

    ops.separable(COMPOSITE_LIGHTEN, LIGHT, "Lighten", f::lighten);
    ops.separable(COMPOSITE_DODGE, LIGHT, "Color Dodge", f::color_dodge);
    ops.separable(COMPOSITE_LINEAR_DODGE, LIGHT, "Linear Dodge", f::add);
    ops.separable(COMPOSITE_SCREEN, LIGHT, "Screen", f::screen);
    ops.separable(COMPOSITE_HARD_LIGHT, LIGHT, "Hard Light", f::hard_light);
    ops.separable(
        COMPOSITE_SOFT_LIGHT_IFS_ILLUSIONS,
        LIGHT,
        "Soft Light (IFS Illusions)",
        f::soft_light_ifs_illusions,
    );
    ops.separable(
        COMPOSITE_SOFT_LIGHT_PEGTOP_DELPHI,
        LIGHT,
        "Soft Light (Pegtop-Delphi)",
        f::soft_light_pegtop_delphi,
    );
    ops.separable(
        COMPOSITE_SOFT_LIGHT_PHOTOSHOP,
        LIGHT,
        "Soft Light (Photoshop)",
        f::soft_light_photoshop,
    );
    ops.separable(COMPOSITE_SOFT_LIGHT_SVG, LIGHT, "Soft Light (SVG)", f::soft_light_svg);
    ops.separable(COMPOSITE_GAMMA_LIGHT, LIGHT, "Gamma Light", f::gamma_light);
    ops.separable(
        COMPOSITE_GAMMA_ILLUMINATION,
        LIGHT,
        "Gamma Illumination",
        f::gamma_illumination,
    );
    ops.separable(COMPOSITE_VIVID_LIGHT, LIGHT, "Vivid Light", f::vivid_light);
    ops.separable(COMPOSITE_FLAT_LIGHT, LIGHT, "Flat Light", f::flat_light);
    ops.separable(COMPOSITE_LINEAR_LIGHT, LIGHT, "Linear Light", f::linear_light);
    ops.separable(COMPOSITE_PIN_LIGHT, LIGHT, "Pin Light", f::pin_light);
    ops.separable(COMPOSITE_PNORM_A, LIGHT, "P-Norm A", f::pnorm_a);
    ops.separable(COMPOSITE_PNORM_B, LIGHT, "P-Norm B", f::pnorm_b);
    ops.separable(COMPOSITE_SUPER_LIGHT, LIGHT, "Super Light", f::super_light);
    ops.separable(
        COMPOSITE_TINT_IFS_ILLUSIONS,
        LIGHT,
        "Tint (IFS Illusions)",
        f::tint_ifs_illusions,
    );
    ops.separable(
        COMPOSITE_FOG_LIGHTEN_IFS_ILLUSIONS,
        LIGHT,
        "Fog Lighten (IFS Illusions)",
        f::fog_lighten_ifs_illusions,
    );
    ops.separable(COMPOSITE_EASY_DODGE, LIGHT, "Easy Dodge", f::easy_dodge);
    ops.add(COMPOSITE_LUMINOSITY_SAI, LIGHT, "Luminosity/Shine (SAI)", AdditionSai);

    ops.separable(COMPOSITE_REFLECT, QUADRATIC, "Reflect", f::reflect);
    ops.separable(COMPOSITE_GLOW, QUADRATIC, "Glow", f::glow);
    ops.separable(COMPOSITE_FREEZE, QUADRATIC, "Freeze", f::freeze);
    ops.separable(COMPOSITE_HEAT, QUADRATIC, "Heat", f::heat);
    ops.separable(COMPOSITE_GLEAT, QUADRATIC, "Glow-Heat", f::glow_heat);
    ops.separable(COMPOSITE_HELOW, QUADRATIC, "Heat-Glow", f::heat_glow);
    ops.separable(COMPOSITE_REEZE, QUADRATIC, "Reflect-Freeze", f::reflect_freeze);
    ops.separable(COMPOSITE_FRECT, QUADRATIC, "Freeze-Reflect", f::freeze_reflect);
    ops.separable(
        COMPOSITE_FHYRD,
        QUADRATIC,
        "Heat-Glow & Freeze-Reflect Hybrid",
        f::glow_heat_freeze_reflect,
    );

    ops.separable(COMPOSITE_XOR, BINARY, "XOR", f::xor);
    ops.separable(COMPOSITE_OR, BINARY, "OR", f::or);
    ops.separable(COMPOSITE_AND, BINARY, "AND", f::and);
    ops.separable(COMPOSITE_NAND, BINARY, "NAND", f::nand);
    ops.separable(COMPOSITE_NOR, BINARY, "NOR", f::nor);
    ops.separable(COMPOSITE_XNOR, BINARY, "XNOR", f::xnor);
    ops.separable(COMPOSITE_IMPLICATION, BINARY, "IMPLICATION", f::implication);
    ops.separable(
        COMPOSITE_NOT_IMPLICATION,
        BINARY,
        "NOT IMPLICATION",
        f::not_implication,
    );
    ops.separable(COMPOSITE_CONVERSE, BINARY, "CONVERSE", f::converse);
    ops.separable(COMPOSITE_NOT_CONVERSE, BINARY, "NOT CONVERSE", f::not_converse);

    if let Some(rgb) = layout.rgb {
        ops.add(COMPOSITE_COPY_RED, MISC, "Copy Red", CopyChannel { channel: rgb[0] });
        ops.add(COMPOSITE_COPY_GREEN, MISC, "Copy Green", CopyChannel { channel: rgb[1] });
        ops.add(COMPOSITE_COPY_BLUE, MISC, "Copy Blue", CopyChannel { channel: rgb[2] });

        ops.hsx(rgb, COMPOSITE_DARKER_COLOR, DARK, "Darker Color", hsx::darker_color::<Hsy>);
        ops.hsx(rgb, COMPOSITE_LIGHTER_COLOR, LIGHT, "Lighter Color", hsx::lighter_color::<Hsy>);

        ops.hsx(rgb, COMPOSITE_HUE, HSY, "Hue", hsx::hue::<Hsy>);
        ops.hsx(rgb, COMPOSITE_COLOR, HSY, "Color", hsx::color::<Hsy>);
        ops.hsx(rgb, COMPOSITE_SATURATION, HSY, "Saturation", hsx::saturation::<Hsy>);
        ops.hsx(
            rgb,
            COMPOSITE_INC_SATURATION,
            HSY,
            "Increase Saturation",
            hsx::increase_saturation::<Hsy>,
        );
        ops.hsx(
            rgb,
            COMPOSITE_DEC_SATURATION,
            HSY,
            "Decrease Saturation",
            hsx::decrease_saturation::<Hsy>,
        );
        ops.hsx(rgb, COMPOSITE_LUMINIZE, HSY, "Luminosity", hsx::lightness::<Hsy>);
        ops.hsx(
            rgb,
            COMPOSITE_INC_LUMINOSITY,
            HSY,
            "Increase Luminosity",
            hsx::increase_lightness::<Hsy>,
        );
        ops.hsx(
            rgb,
            COMPOSITE_DEC_LUMINOSITY,
            HSY,
            "Decrease Luminosity",
            hsx::decrease_lightness::<Hsy>,
        );

        ops.hsx(rgb, COMPOSITE_HUE_HSI, HSI, "Hue HSI", hsx::hue::<Hsi>);
        ops.hsx(rgb, COMPOSITE_COLOR_HSI, HSI, "Color HSI", hsx::color::<Hsi>);
        ops.hsx(rgb, COMPOSITE_SATURATION_HSI, HSI, "Saturation HSI", hsx::saturation::<Hsi>);
        ops.hsx(
            rgb,
            COMPOSITE_INC_SATURATION_HSI,
            HSI,
            "Increase Saturation HSI",
            hsx::increase_saturation::<Hsi>,
        );
        ops.hsx(
            rgb,
            COMPOSITE_DEC_SATURATION_HSI,
            HSI,
            "Decrease Saturation HSI",
            hsx::decrease_saturation::<Hsi>,
        );
        ops.hsx(rgb, COMPOSITE_INTENSITY, HSI, "Intensity", hsx::lightness::<Hsi>);
        ops.hsx(
            rgb,
            COMPOSITE_INC_INTENSITY,
            HSI,
            "Increase Intensity",
            hsx::increase_lightness::<Hsi>,
        );
        ops.hsx(
            rgb,
            COMPOSITE_DEC_INTENSITY,
            HSI,
            "Decrease Intensity",
            hsx::decrease_lightness::<Hsi>,
        );

        ops.hsx(rgb, COMPOSITE_HUE_HSL, HSL, "Hue HSL", hsx::hue::<Hsl>);
        ops.hsx(rgb, COMPOSITE_COLOR_HSL, HSL, "Color HSL", hsx::color::<Hsl>);
        ops.hsx(rgb, COMPOSITE_SATURATION_HSL, HSL, "Saturation HSL", hsx::saturation::<Hsl>);
        ops.hsx(
            rgb,
            COMPOSITE_INC_SATURATION_HSL,
            HSL,
            "Increase Saturation HSL",
            hsx::increase_saturation::<Hsl>,
        );
        ops.hsx(
            rgb,
            COMPOSITE_DEC_SATURATION_HSL,
            HSL,
            "Decrease Saturation HSL",
            hsx::decrease_saturation::<Hsl>,
        );
        ops.hsx(rgb, COMPOSITE_LIGHTNESS, HSL, "Lightness", hsx::lightness::<Hsl>);
        ops.hsx(
            rgb,
            COMPOSITE_INC_LIGHTNESS,
            HSL,
            "Increase Lightness",
            hsx::increase_lightness::<Hsl>,
        );
        ops.hsx(
            rgb,
            COMPOSITE_DEC_LIGHTNESS,
            HSL,
            "Decrease Lightness",
            hsx::decrease_lightness::<Hsl>,
        );

        ops.hsx(rgb, COMPOSITE_HUE_HSV, HSV, "Hue HSV", hsx::hue::<Hsv>);
        ops.hsx(rgb, COMPOSITE_COLOR_HSV, HSV, "Color HSV", hsx::color::<Hsv>);
        ops.hsx(rgb, COMPOSITE_SATURATION_HSV, HSV, "Saturation HSV", hsx::saturation::<Hsv>);
        ops.hsx(
            rgb,
            COMPOSITE_INC_SATURATION_HSV,
            HSV,
            "Increase Saturation HSV",
            hsx::increase_saturation::<Hsv>,
        );
        ops.hsx(
            rgb,
            COMPOSITE_DEC_SATURATION_HSV,
            HSV,
            "Decrease Saturation HSV",
            hsx::decrease_saturation::<Hsv>,
        );
        ops.hsx(rgb, COMPOSITE_VALUE, HSV, "Value", hsx::lightness::<Hsv>);
        ops.hsx(
            rgb,
            COMPOSITE_INC_VALUE,
            HSV,
            "Increase Value",
            hsx::increase_lightness::<Hsv>,
        );
        ops.hsx(
            rgb,
            COMPOSITE_DEC_VALUE,
            HSV,
            "Decrease Value",
            hsx::decrease_lightness::<Hsv>,
        );
    }

    ops.ops
}

// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! String ids of the composite ops.
//!
//! These ids are stored in documents, so they never change.

pub const COMPOSITE_OVER: &str = "normal";
pub const COMPOSITE_ERASE: &str = "erase";
pub const COMPOSITE_IN: &str = "in";
pub const COMPOSITE_OUT: &str = "out";
pub const COMPOSITE_ATOP: &str = "atop";
pub const COMPOSITE_ALPHA_DARKEN: &str = "alphadarken";
pub const COMPOSITE_DESTINATION_IN: &str = "destination-in";
pub const COMPOSITE_DESTINATION_ATOP: &str = "destination-atop";
pub const COMPOSITE_BEHIND: &str = "behind";
pub const COMPOSITE_GREATER: &str = "greater";
pub const COMPOSITE_COPY: &str = "copy";
pub const COMPOSITE_COPY_RED: &str = "copy_red";
pub const COMPOSITE_COPY_GREEN: &str = "copy_green";
pub const COMPOSITE_COPY_BLUE: &str = "copy_blue";
pub const COMPOSITE_CLEAR: &str = "clear";
pub const COMPOSITE_DISSOLVE: &str = "dissolve";
pub const COMPOSITE_NO: &str = "nocomposition";

pub const COMPOSITE_XOR: &str = "xor";
pub const COMPOSITE_OR: &str = "or";
pub const COMPOSITE_AND: &str = "and";
pub const COMPOSITE_NAND: &str = "nand";
pub const COMPOSITE_NOR: &str = "nor";
pub const COMPOSITE_XNOR: &str = "xnor";
pub const COMPOSITE_IMPLICATION: &str = "implication";
pub const COMPOSITE_NOT_IMPLICATION: &str = "not_implication";
pub const COMPOSITE_CONVERSE: &str = "converse";
pub const COMPOSITE_NOT_CONVERSE: &str = "not_converse";

pub const COMPOSITE_ADD: &str = "add";
pub const COMPOSITE_SUBTRACT: &str = "subtract";
pub const COMPOSITE_INVERSE_SUBTRACT: &str = "inverse_subtract";
pub const COMPOSITE_MULT: &str = "multiply";
pub const COMPOSITE_DIVIDE: &str = "divide";

pub const COMPOSITE_MOD: &str = "modulo";
pub const COMPOSITE_MOD_CON: &str = "modulo_continuous";
pub const COMPOSITE_DIVISIVE_MOD: &str = "divisive_modulo";
pub const COMPOSITE_DIVISIVE_MOD_CON: &str = "divisive_modulo_continuous";
pub const COMPOSITE_MODULO_SHIFT: &str = "modulo_shift";
pub const COMPOSITE_MODULO_SHIFT_CON: &str = "modulo_shift_continuous";

pub const COMPOSITE_DIFF: &str = "diff";
pub const COMPOSITE_EQUIVALENCE: &str = "equivalence";
pub const COMPOSITE_ADDITIVE_SUBTRACTIVE: &str = "additive_subtractive";
pub const COMPOSITE_EXCLUSION: &str = "exclusion";
pub const COMPOSITE_ARC_TANGENT: &str = "arc_tangent";
pub const COMPOSITE_NEGATION: &str = "negation";

pub const COMPOSITE_OVERLAY: &str = "overlay";
pub const COMPOSITE_HARD_OVERLAY: &str = "hard overlay";
pub const COMPOSITE_GRAIN_MERGE: &str = "grain_merge";
pub const COMPOSITE_GRAIN_EXTRACT: &str = "grain_extract";
pub const COMPOSITE_HARD_MIX: &str = "hard mix";
pub const COMPOSITE_HARD_MIX_PHOTOSHOP: &str = "hard_mix_photoshop";
pub const COMPOSITE_HARD_MIX_SOFTER_PHOTOSHOP: &str = "hard_mix_softer_photoshop";
pub const COMPOSITE_GEOMETRIC_MEAN: &str = "geometric_mean";
pub const COMPOSITE_PARALLEL: &str = "parallel";
pub const COMPOSITE_ALLANON: &str = "allanon";
pub const COMPOSITE_INTERPOLATION: &str = "interpolation";
pub const COMPOSITE_INTERPOLATIONB: &str = "interpolation 2x";
pub const COMPOSITE_PENUMBRAA: &str = "penumbra a";
pub const COMPOSITE_PENUMBRAB: &str = "penumbra b";
pub const COMPOSITE_PENUMBRAC: &str = "penumbra c";
pub const COMPOSITE_PENUMBRAD: &str = "penumbra d";

pub const COMPOSITE_DARKEN: &str = "darken";
pub const COMPOSITE_BURN: &str = "burn";
pub const COMPOSITE_LINEAR_BURN: &str = "linear_burn";
pub const COMPOSITE_GAMMA_DARK: &str = "gamma_dark";
pub const COMPOSITE_SHADE_IFS_ILLUSIONS: &str = "shade_ifs_illusions";
pub const COMPOSITE_FOG_DARKEN_IFS_ILLUSIONS: &str = "fog_darken_ifs_illusions";
pub const COMPOSITE_EASY_BURN: &str = "easy burn";
pub const COMPOSITE_DARKER_COLOR: &str = "darker color";

pub const COMPOSITE_LIGHTEN: &str = "lighten";
pub const COMPOSITE_DODGE: &str = "dodge";
pub const COMPOSITE_LINEAR_DODGE: &str = "linear_dodge";
pub const COMPOSITE_SCREEN: &str = "screen";
pub const COMPOSITE_HARD_LIGHT: &str = "hard_light";
pub const COMPOSITE_SOFT_LIGHT_IFS_ILLUSIONS: &str = "soft_light_ifs_illusions";
pub const COMPOSITE_SOFT_LIGHT_PEGTOP_DELPHI: &str = "soft_light_pegtop_delphi";
pub const COMPOSITE_SOFT_LIGHT_PHOTOSHOP: &str = "soft_light";
pub const COMPOSITE_SOFT_LIGHT_SVG: &str = "soft_light_svg";
pub const COMPOSITE_GAMMA_LIGHT: &str = "gamma_light";
pub const COMPOSITE_GAMMA_ILLUMINATION: &str = "gamma_illumination";
pub const COMPOSITE_VIVID_LIGHT: &str = "vivid_light";
pub const COMPOSITE_FLAT_LIGHT: &str = "flat_light";
pub const COMPOSITE_LINEAR_LIGHT: &str = "linear light";
pub const COMPOSITE_PIN_LIGHT: &str = "pin_light";
pub const COMPOSITE_PNORM_A: &str = "pnorm_a";
pub const COMPOSITE_PNORM_B: &str = "pnorm_b";
pub const COMPOSITE_SUPER_LIGHT: &str = "super_light";
pub const COMPOSITE_TINT_IFS_ILLUSIONS: &str = "tint_ifs_illusions";
pub const COMPOSITE_FOG_LIGHTEN_IFS_ILLUSIONS: &str = "fog_lighten_ifs_illusions";
pub const COMPOSITE_EASY_DODGE: &str = "easy dodge";
pub const COMPOSITE_LUMINOSITY_SAI: &str = "luminosity_sai";
pub const COMPOSITE_LIGHTER_COLOR: &str = "lighter color";

pub const COMPOSITE_REFLECT: &str = "reflect";
pub const COMPOSITE_GLOW: &str = "glow";
pub const COMPOSITE_FREEZE: &str = "freeze";
pub const COMPOSITE_HEAT: &str = "heat";
pub const COMPOSITE_GLEAT: &str = "glow_heat";
pub const COMPOSITE_HELOW: &str = "heat_glow";
pub const COMPOSITE_REEZE: &str = "reflect_freeze";
pub const COMPOSITE_FRECT: &str = "freeze_reflect";
pub const COMPOSITE_FHYRD: &str = "heat_glow_freeze_reflect_hybrid";

pub const COMPOSITE_HUE: &str = "hue";
pub const COMPOSITE_COLOR: &str = "color";
pub const COMPOSITE_SATURATION: &str = "saturation";
pub const COMPOSITE_INC_SATURATION: &str = "inc_saturation";
pub const COMPOSITE_DEC_SATURATION: &str = "dec_saturation";
pub const COMPOSITE_LUMINIZE: &str = "luminize";
pub const COMPOSITE_INC_LUMINOSITY: &str = "inc_luminosity";
pub const COMPOSITE_DEC_LUMINOSITY: &str = "dec_luminosity";

pub const COMPOSITE_HUE_HSV: &str = "hue_hsv";
pub const COMPOSITE_COLOR_HSV: &str = "color_hsv";
pub const COMPOSITE_SATURATION_HSV: &str = "saturation_hsv";
pub const COMPOSITE_INC_SATURATION_HSV: &str = "inc_saturation_hsv";
pub const COMPOSITE_DEC_SATURATION_HSV: &str = "dec_saturation_hsv";
pub const COMPOSITE_VALUE: &str = "value";
pub const COMPOSITE_INC_VALUE: &str = "inc_value";
pub const COMPOSITE_DEC_VALUE: &str = "dec_value";

pub const COMPOSITE_HUE_HSL: &str = "hue_hsl";
pub const COMPOSITE_COLOR_HSL: &str = "color_hsl";
pub const COMPOSITE_SATURATION_HSL: &str = "saturation_hsl";
pub const COMPOSITE_INC_SATURATION_HSL: &str = "inc_saturation_hsl";
pub const COMPOSITE_DEC_SATURATION_HSL: &str = "dec_saturation_hsl";
pub const COMPOSITE_LIGHTNESS: &str = "lightness";
pub const COMPOSITE_INC_LIGHTNESS: &str = "inc_lightness";
pub const COMPOSITE_DEC_LIGHTNESS: &str = "dec_lightness";

pub const COMPOSITE_HUE_HSI: &str = "hue_hsi";
pub const COMPOSITE_COLOR_HSI: &str = "color_hsi";
pub const COMPOSITE_SATURATION_HSI: &str = "saturation_hsi";
pub const COMPOSITE_INC_SATURATION_HSI: &str = "inc_saturation_hsi";
pub const COMPOSITE_DEC_SATURATION_HSI: &str = "dec_saturation_hsi";
pub const COMPOSITE_INTENSITY: &str = "intensity";
pub const COMPOSITE_INC_INTENSITY: &str = "inc_intensity";
pub const COMPOSITE_DEC_INTENSITY: &str = "dec_intensity";

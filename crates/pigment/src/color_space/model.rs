// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color models and the canonical 16-bit exchange encodings.
//!
//! A model works on normalized channel values (`0.0..=1.0` for the full integer range) and
//! knows how to reach non-premultiplied sRGB and CIE Lab (D50). The actual colorimetry is
//! delegated to `peniko::color`.

use peniko::color::{AlphaColor, Lab, Srgb};

/// The color model of a color space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorModel {
    Rgba,
    GrayA,
    LabA,
    CmykA,
}

impl ColorModel {
    pub const ALL: [ColorModel; 4] = [
        ColorModel::Rgba,
        ColorModel::GrayA,
        ColorModel::LabA,
        ColorModel::CmykA,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ColorModel::Rgba => "RGBA",
            ColorModel::GrayA => "GRAYA",
            ColorModel::LabA => "LABA",
            ColorModel::CmykA => "CMYKA",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.id() == id)
    }
}

pub(crate) trait ModelTraits: Send + Sync + 'static {
    const MODEL: ColorModel;
    /// Names of the color channels in memory order. Alpha always follows.
    const COLOR_CHANNELS: &'static [&'static str];
    const PROFILE: &'static str;
    const DISPLAY_NAME: &'static str;
    /// Red, green and blue channel indices for additive RGB models.
    const RGB: Option<[usize; 3]> = None;
    const SUBTRACTIVE: bool = false;

    fn to_srgb(channels: &[f32]) -> [f32; 3];
    fn from_srgb(rgb: [f32; 3], channels: &mut [f32]);

    fn to_lab(channels: &[f32]) -> [f32; 3] {
        srgb_to_lab(Self::to_srgb(channels))
    }

    fn from_lab(lab: [f32; 3], channels: &mut [f32]) {
        Self::from_srgb(lab_to_srgb(lab), channels);
    }
}

#[derive(Debug)]
pub(crate) struct Rgba;

impl ModelTraits for Rgba {
    const MODEL: ColorModel = ColorModel::Rgba;
    const COLOR_CHANNELS: &'static [&'static str] = &["Red", "Green", "Blue"];
    const PROFILE: &'static str = "sRGB";
    const DISPLAY_NAME: &'static str = "RGB/Alpha";
    const RGB: Option<[usize; 3]> = Some([0, 1, 2]);

    fn to_srgb(c: &[f32]) -> [f32; 3] {
        [c[0], c[1], c[2]]
    }

    fn from_srgb(rgb: [f32; 3], c: &mut [f32]) {
        c[..3].copy_from_slice(&rgb);
    }
}

#[derive(Debug)]
pub(crate) struct GrayA;

impl ModelTraits for GrayA {
    const MODEL: ColorModel = ColorModel::GrayA;
    const COLOR_CHANNELS: &'static [&'static str] = &["Gray"];
    const PROFILE: &'static str = "Gray-sRGB-TRC";
    const DISPLAY_NAME: &'static str = "Grayscale/Alpha";

    fn to_srgb(c: &[f32]) -> [f32; 3] {
        [c[0], c[0], c[0]]
    }

    fn from_srgb(rgb: [f32; 3], c: &mut [f32]) {
        c[0] = luma(rgb);
    }
}

#[derive(Debug)]
pub(crate) struct LabA;

impl ModelTraits for LabA {
    const MODEL: ColorModel = ColorModel::LabA;
    const COLOR_CHANNELS: &'static [&'static str] = &["L", "a", "b"];
    const PROFILE: &'static str = "Lab-D50";
    const DISPLAY_NAME: &'static str = "L*a*b*/Alpha";

    fn to_srgb(c: &[f32]) -> [f32; 3] {
        lab_to_srgb(Self::to_lab(c))
    }

    fn from_srgb(rgb: [f32; 3], c: &mut [f32]) {
        Self::from_lab(srgb_to_lab(rgb), c);
    }

    fn to_lab(c: &[f32]) -> [f32; 3] {
        [c[0] * 100.0, c[1] * 255.0 - 128.0, c[2] * 255.0 - 128.0]
    }

    fn from_lab(lab: [f32; 3], c: &mut [f32]) {
        c[0] = lab[0] / 100.0;
        c[1] = (lab[1] + 128.0) / 255.0;
        c[2] = (lab[2] + 128.0) / 255.0;
    }
}

#[derive(Debug)]
pub(crate) struct CmykA;

impl ModelTraits for CmykA {
    const MODEL: ColorModel = ColorModel::CmykA;
    const COLOR_CHANNELS: &'static [&'static str] = &["Cyan", "Magenta", "Yellow", "Black"];
    const PROFILE: &'static str = "CMYK-naive";
    const DISPLAY_NAME: &'static str = "CMYK/Alpha";
    const SUBTRACTIVE: bool = true;

    fn to_srgb(c: &[f32]) -> [f32; 3] {
        let k = 1.0 - c[3];
        [(1.0 - c[0]) * k, (1.0 - c[1]) * k, (1.0 - c[2]) * k]
    }

    fn from_srgb(rgb: [f32; 3], c: &mut [f32]) {
        let max = rgb[0].max(rgb[1]).max(rgb[2]);
        let k = 1.0 - max;

        if max <= f32::EPSILON {
            c[..3].fill(0.0);
        } else {
            for i in 0..3 {
                c[i] = (1.0 - rgb[i] - k) / max;
            }
        }
        c[3] = k;
    }
}

/// Rec. 601 luma of encoded sRGB components.
pub(crate) fn luma(rgb: [f32; 3]) -> f32 {
    0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2]
}

pub(crate) fn srgb_to_lab(rgb: [f32; 3]) -> [f32; 3] {
    let lab = AlphaColor::<Srgb>::new([rgb[0], rgb[1], rgb[2], 1.0]).convert::<Lab>();
    [lab.components[0], lab.components[1], lab.components[2]]
}

pub(crate) fn lab_to_srgb(lab: [f32; 3]) -> [f32; 3] {
    let rgb = AlphaColor::<Lab>::new([lab[0], lab[1], lab[2], 1.0]).convert::<Srgb>();
    [
        rgb.components[0].clamp(0.0, 1.0),
        rgb.components[1].clamp(0.0, 1.0),
        rgb.components[2].clamp(0.0, 1.0),
    ]
}

/// Encode CIE Lab into the 16-bit exchange format: `L` spans `0..=65535` for `0..=100`,
/// `a` and `b` are offset by 128 and scaled by 257.
pub(crate) fn encode_lab16(lab: [f32; 3]) -> [u16; 3] {
    let l = (lab[0] / 100.0).clamp(0.0, 1.0) * 65535.0;
    let a = ((lab[1] + 128.0) * 257.0).clamp(0.0, 65535.0);
    let b = ((lab[2] + 128.0) * 257.0).clamp(0.0, 65535.0);

    [(l + 0.5) as u16, (a + 0.5) as u16, (b + 0.5) as u16]
}

pub(crate) fn decode_lab16(lab: [u16; 3]) -> [f32; 3] {
    [
        lab[0] as f32 / 65535.0 * 100.0,
        lab[1] as f32 / 257.0 - 128.0,
        lab[2] as f32 / 257.0 - 128.0,
    ]
}

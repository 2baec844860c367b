// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::model::{CmykA, GrayA, LabA, ModelTraits, Rgba};
use super::{ColorModel, ColorSpace, ModelColorSpace};
use crate::channel::{ChannelValue, ColorDepth};
use crate::error::RegistryError;
use half::f16;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

static RGB16: Lazy<Arc<dyn ColorSpace>> = Lazy::new(|| Arc::new(ModelColorSpace::<Rgba, u16>::new()));
static LAB16: Lazy<Arc<dyn ColorSpace>> = Lazy::new(|| Arc::new(ModelColorSpace::<LabA, u16>::new()));

/// Looks up color spaces by model and depth.
///
/// The registry is an ordinary value owned by the application. The canonical 16-bit RGBA
/// and Lab spaces are shared by every registry, so pointers to them compare equal.
#[derive(Debug, Clone)]
pub struct ColorSpaceRegistry {
    spaces: BTreeMap<String, Arc<dyn ColorSpace>>,
}

impl ColorSpaceRegistry {
    pub fn new() -> Self {
        let mut spaces = BTreeMap::new();

        for model in ColorModel::ALL {
            for depth in ColorDepth::ALL {
                let space = build(model, depth);
                spaces.insert(space.id().to_string(), space);
            }
        }

        debug!(count = spaces.len(), "built color space registry");

        Self { spaces }
    }

    pub fn color_space(
        &self,
        model_id: &str,
        depth_id: &str,
    ) -> Result<Arc<dyn ColorSpace>, RegistryError> {
        let unknown = || RegistryError::UnknownColorSpace {
            model: model_id.to_string(),
            depth: depth_id.to_string(),
        };

        let model = ColorModel::from_id(model_id).ok_or_else(unknown)?;
        let depth = ColorDepth::from_id(depth_id).ok_or_else(unknown)?;

        self.get(model, depth).ok_or_else(unknown)
    }

    pub fn get(&self, model: ColorModel, depth: ColorDepth) -> Option<Arc<dyn ColorSpace>> {
        self.spaces
            .get(&format!("{}{}", model.id(), depth.id()))
            .cloned()
    }

    pub fn by_id(&self, id: &str) -> Result<Arc<dyn ColorSpace>, RegistryError> {
        self.spaces
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownId(id.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.spaces.keys().map(String::as_str)
    }

    pub fn rgb8(&self) -> Arc<dyn ColorSpace> {
        self.spaces[&format!("{}{}", ColorModel::Rgba.id(), ColorDepth::U8.id())].clone()
    }

    pub fn rgb16(&self) -> Arc<dyn ColorSpace> {
        rgb16()
    }

    pub fn lab16(&self) -> Arc<dyn ColorSpace> {
        lab16()
    }
}

impl Default for ColorSpaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The canonical 16-bit RGBA space.
pub fn rgb16() -> Arc<dyn ColorSpace> {
    RGB16.clone()
}

/// The canonical 16-bit Lab (D50) space.
pub fn lab16() -> Arc<dyn ColorSpace> {
    LAB16.clone()
}

fn build(model: ColorModel, depth: ColorDepth) -> Arc<dyn ColorSpace> {
    match model {
        ColorModel::Rgba if depth == ColorDepth::U16 => rgb16(),
        ColorModel::LabA if depth == ColorDepth::U16 => lab16(),
        ColorModel::Rgba => build_depth::<Rgba>(depth),
        ColorModel::GrayA => build_depth::<GrayA>(depth),
        ColorModel::LabA => build_depth::<LabA>(depth),
        ColorModel::CmykA => build_depth::<CmykA>(depth),
    }
}

fn build_depth<M: ModelTraits>(depth: ColorDepth) -> Arc<dyn ColorSpace> {
    fn make<M: ModelTraits, T: ChannelValue>() -> Arc<dyn ColorSpace> {
        Arc::new(ModelColorSpace::<M, T>::new())
    }

    match depth {
        ColorDepth::U8 => make::<M, u8>(),
        ColorDepth::U16 => make::<M, u16>(),
        ColorDepth::U32 => make::<M, u32>(),
        ColorDepth::F16 => make::<M, f16>(),
        ColorDepth::F32 => make::<M, f32>(),
    }
}

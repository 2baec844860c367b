// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::color_space::{convert_canonical, ColorSpace};
use peniko::color::{AlphaColor, Srgb};
use std::fmt;
use std::sync::Arc;

/// A single pixel tagged with its color space.
#[derive(Clone)]
pub struct Color {
    space: Arc<dyn ColorSpace>,
    data: Vec<u8>,
}

impl Color {
    /// A fully transparent color.
    pub fn new(space: Arc<dyn ColorSpace>) -> Self {
        let data = space.transparent_pixel();
        Self { space, data }
    }

    /// Wrap the raw bytes of one pixel of `space`.
    pub fn from_data(space: Arc<dyn ColorSpace>, data: &[u8]) -> Self {
        let mut color = Self::new(space);
        let len = color.data.len();
        color.data.copy_from_slice(&data[..len]);
        color
    }

    pub fn from_rgba(color: AlphaColor<Srgb>, space: Arc<dyn ColorSpace>) -> Self {
        let mut out = Self::new(space);
        out.space.from_rgba_color(color, &mut out.data);
        out
    }

    pub fn to_rgba(&self) -> AlphaColor<Srgb> {
        self.space.to_rgba_color(&self.data)
    }

    pub fn color_space(&self) -> &Arc<dyn ColorSpace> {
        &self.space
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn opacity_u8(&self) -> u8 {
        self.space.opacity_u8(&self.data)
    }

    pub fn opacity_f(&self) -> f32 {
        self.space.opacity_f(&self.data)
    }

    pub fn set_opacity_u8(&mut self, alpha: u8) {
        self.space.set_opacity_u8(&mut self.data, alpha, 1);
    }

    pub fn set_opacity_f(&mut self, alpha: f32) {
        self.space.set_opacity_f(&mut self.data, alpha, 1);
    }

    /// Convert in place into `space`. Does nothing if the spaces are the same.
    pub fn convert_to(&mut self, space: Arc<dyn ColorSpace>) {
        if self.space.is_same(&*space) {
            return;
        }

        let mut data = space.transparent_pixel();
        convert_canonical(&*self.space, &*space, &self.data, &mut data, 1, &mut Vec::new());
        self.space = space;
        self.data = data;
    }

    #[must_use]
    pub fn converted_to(&self, space: Arc<dyn ColorSpace>) -> Self {
        let mut color = self.clone();
        color.convert_to(space);
        color
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Color")
            .field("space", &self.space.id())
            .field("data", &self.data)
            .finish()
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.space.is_same(&*other.space) && self.data == other.data
    }
}

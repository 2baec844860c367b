// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colorspace-agnostic pixel compositing.
//!
//! A [`ColorSpace`] describes a pixel format and hands out the operators working on it:
//! [`CompositeOp`]s blend runs of pixels in place and the [`MixColorsOp`] averages
//! weighted colors. On top of those sit gradients, a small [`Painter`] for pixmaps and
//! the [`OnionSkinCompositor`] for animation previews.

#![forbid(unsafe_code)]

pub mod animation;
pub mod channel;
mod color;
pub mod color_space;
pub mod composite;
pub mod config;
pub mod error;
pub mod gradient;
pub mod mix;
pub mod onion_skin;
mod painter;
pub mod pixmap;
mod rect;

pub use peniko;

pub use channel::{ChannelFlags, ChannelValue, ColorDepth};
pub use color::Color;
pub use color_space::{ColorModel, ColorSpace, ColorSpaceRegistry, ConversionCache};
pub use composite::{CompositeOp, CompositeParams};
pub use mix::MixColorsOp;
pub use onion_skin::OnionSkinCompositor;
pub use painter::Painter;
pub use pixmap::Pixmap;
pub use rect::PixelRect;

// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositing whole rectangles onto a pixmap.

use crate::channel::ChannelFlags;
use crate::color::Color;
use crate::color_space::{ColorSpace, ConversionCache, RenderingIntent};
use crate::composite::{CompositeOp, CompositeParams, COMPOSITE_OVER};
use crate::pixmap::{Mask, Pixmap};
use crate::rect::PixelRect;
use std::sync::Arc;

/// Composites pixmaps and fixed colors onto a target pixmap.
///
/// The painter keeps the composite op, opacity, flow, channel flags and an optional
/// selection mask between calls. The selection is in target coordinates.
pub struct Painter<'a> {
    device: &'a mut Pixmap,
    cache: &'a mut ConversionCache,
    op: Arc<dyn CompositeOp>,
    opacity: f32,
    flow: f32,
    channel_flags: ChannelFlags,
    selection: Option<&'a Mask>,
    intent: RenderingIntent,
}

impl<'a> Painter<'a> {
    pub fn new(device: &'a mut Pixmap, cache: &'a mut ConversionCache) -> Self {
        let op = device.color_space().composite_op(COMPOSITE_OVER);
        Self {
            device,
            cache,
            op,
            opacity: 1.0,
            flow: 1.0,
            channel_flags: ChannelFlags::ALL,
            selection: None,
            intent: RenderingIntent::default(),
        }
    }

    pub fn device(&self) -> &Pixmap {
        self.device
    }

    /// Select the composite op by id. Unknown ids fall back to `normal`.
    pub fn set_composite_op(&mut self, id: &str) {
        self.op = self.device.color_space().composite_op(id);
    }

    pub fn composite_op(&self) -> &Arc<dyn CompositeOp> {
        &self.op
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_opacity_u8(&mut self, opacity: u8) {
        self.opacity = opacity as f32 / 255.0;
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_flow(&mut self, flow: f32) {
        self.flow = flow.clamp(0.0, 1.0);
    }

    pub fn set_channel_flags(&mut self, channel_flags: ChannelFlags) {
        self.channel_flags = channel_flags;
    }

    /// Keep the alpha channel of the target untouched.
    pub fn set_alpha_locked(&mut self, locked: bool) {
        self.channel_flags = self.device.color_space().channel_flags(true, !locked);
    }

    pub fn set_selection(&mut self, selection: Option<&'a Mask>) {
        self.selection = selection;
    }

    pub fn set_rendering_intent(&mut self, intent: RenderingIntent) {
        self.intent = intent;
    }

    /// Composite the pixels of `src` inside `src_rect` so that the top left corner of
    /// `src_rect` lands on `(dst_x, dst_y)`.
    pub fn bit_blt(&mut self, dst_x: i32, dst_y: i32, src: &Pixmap, src_rect: PixelRect) {
        let (dx, dy) = (dst_x - src_rect.x, dst_y - src_rect.y);
        let dst_rect = self.clip(src_rect.intersect(&src.bounds()).translate(dx, dy));
        if dst_rect.is_empty() {
            return;
        }

        let src_rect = dst_rect.translate(-dx, -dy);
        let Some(src_bytes) = src.rect_slice(src_rect) else {
            return;
        };
        self.composite(dst_rect, &**src.color_space(), src_bytes, src.row_stride());
    }

    /// Composite `color` over every pixel inside `rect`.
    pub fn fill_rect(&mut self, rect: PixelRect, color: &Color) {
        let rect = self.clip(rect);
        if rect.is_empty() {
            return;
        }

        let color = color.converted_to(self.device.color_space().clone());
        self.composite(rect, &**color.color_space(), color.data(), 0);
    }

    fn clip(&self, rect: PixelRect) -> PixelRect {
        let rect = rect.intersect(&self.device.bounds());
        match self.selection {
            Some(selection) => rect.intersect(&selection.bounds()),
            None => rect,
        }
    }

    /// `dst_rect` must already be clipped.
    fn composite(
        &mut self,
        dst_rect: PixelRect,
        src_space: &dyn ColorSpace,
        src_bytes: &[u8],
        src_row_stride: usize,
    ) {
        let dst_row_stride = self.device.row_stride();
        let dst_space = self.device.color_space().clone();
        let Some(dst_bytes) = self.device.rect_slice_mut(dst_rect) else {
            return;
        };

        let mut params = CompositeParams::new(
            dst_bytes,
            dst_row_stride,
            src_bytes,
            src_row_stride,
            dst_rect.height as usize,
            dst_rect.width as usize,
        )
        .with_opacity(self.opacity)
        .with_flow(self.flow)
        .with_channel_flags(self.channel_flags);

        if let Some(selection) = self.selection {
            let start = dst_rect.y as usize * selection.width() + dst_rect.x as usize;
            params = params.with_mask(&selection.data()[start..], selection.width());
        }

        dst_space.bit_blt(
            src_space,
            &mut params,
            &*self.op,
            self.intent,
            self.cache,
        );
    }
}

// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The slice of an animation timeline that frame compositing needs.

use crate::color_space::{ColorSpace, ConversionCache};
use crate::composite::COMPOSITE_COPY;
use crate::painter::Painter;
use crate::pixmap::Pixmap;
use crate::rect::PixelRect;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A sparse timeline of keyframes, addressed by frame time.
///
/// A keyframe is identified by the time it starts at.
pub trait KeyframeChannel: Send + Sync {
    /// The keyframe shown at `time`, i.e. the last one starting at or before it.
    fn active_keyframe_time(&self, time: i32) -> Option<i32>;
    /// The keyframe before the one starting at `time`.
    fn previous_keyframe_time(&self, time: i32) -> Option<i32>;
    fn next_keyframe_time(&self, time: i32) -> Option<i32>;
    fn has_keyframe_at(&self, time: i32) -> bool;
    fn color_label(&self, time: i32) -> i32;
    /// Bounds of the non-transparent content of a keyframe.
    fn frame_extents(&self, time: i32) -> PixelRect;
    /// Replace the contents of `target` with the keyframe starting at `time`.
    fn write_frame_to(&self, time: i32, target: &mut Pixmap, cache: &mut ConversionCache);
}

/// Something drawn differently depending on the current animation time.
pub trait AnimatedDevice {
    fn current_time(&self) -> i32;
    /// `None` for devices that are not animated.
    fn keyframe_channel(&self) -> Option<&dyn KeyframeChannel>;
}

#[derive(Debug, Clone)]
struct RasterKeyframe {
    pixmap: Pixmap,
    color_label: i32,
}

/// Keyframes held as whole pixmaps in memory.
#[derive(Debug, Clone, Default)]
pub struct RasterKeyframeChannel {
    frames: BTreeMap<i32, RasterKeyframe>,
}

impl RasterKeyframeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, time: i32, pixmap: Pixmap) {
        self.insert_labeled(time, pixmap, 0);
    }

    pub fn insert_labeled(&mut self, time: i32, pixmap: Pixmap, color_label: i32) {
        self.frames.insert(
            time,
            RasterKeyframe {
                pixmap,
                color_label,
            },
        );
    }

    pub fn remove(&mut self, time: i32) -> Option<Pixmap> {
        self.frames.remove(&time).map(|frame| frame.pixmap)
    }

    pub fn frame(&self, time: i32) -> Option<&Pixmap> {
        self.frames.get(&time).map(|frame| &frame.pixmap)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl KeyframeChannel for RasterKeyframeChannel {
    fn active_keyframe_time(&self, time: i32) -> Option<i32> {
        self.frames.range(..=time).next_back().map(|(t, _)| *t)
    }

    fn previous_keyframe_time(&self, time: i32) -> Option<i32> {
        self.frames.range(..time).next_back().map(|(t, _)| *t)
    }

    fn next_keyframe_time(&self, time: i32) -> Option<i32> {
        self.frames
            .range(time.saturating_add(1)..)
            .next()
            .map(|(t, _)| *t)
    }

    fn has_keyframe_at(&self, time: i32) -> bool {
        self.frames.contains_key(&time)
    }

    fn color_label(&self, time: i32) -> i32 {
        self.frames.get(&time).map_or(0, |frame| frame.color_label)
    }

    fn frame_extents(&self, time: i32) -> PixelRect {
        self.frames
            .get(&time)
            .map_or_else(PixelRect::default, |frame| frame.pixmap.exact_bounds())
    }

    fn write_frame_to(&self, time: i32, target: &mut Pixmap, cache: &mut ConversionCache) {
        target.clear_rect(target.bounds());
        let Some(frame) = self.frames.get(&time) else {
            return;
        };

        let mut painter = Painter::new(target, cache);
        painter.set_composite_op(COMPOSITE_COPY);
        painter.bit_blt(0, 0, &frame.pixmap, frame.pixmap.bounds());
    }
}

/// A pixmap-backed layer with an optional keyframe channel.
#[derive(Debug, Clone)]
pub struct AnimatedPixmap {
    color_space: Arc<dyn ColorSpace>,
    current_time: i32,
    channel: Option<RasterKeyframeChannel>,
}

impl AnimatedPixmap {
    /// A layer without animation.
    pub fn new(color_space: Arc<dyn ColorSpace>) -> Self {
        Self {
            color_space,
            current_time: 0,
            channel: None,
        }
    }

    pub fn with_channel(color_space: Arc<dyn ColorSpace>, channel: RasterKeyframeChannel) -> Self {
        Self {
            color_space,
            current_time: 0,
            channel: Some(channel),
        }
    }

    pub fn color_space(&self) -> &Arc<dyn ColorSpace> {
        &self.color_space
    }

    pub fn set_current_time(&mut self, time: i32) {
        self.current_time = time;
    }

    pub fn channel_mut(&mut self) -> Option<&mut RasterKeyframeChannel> {
        self.channel.as_mut()
    }
}

impl AnimatedDevice for AnimatedPixmap {
    fn current_time(&self) -> i32 {
        self.current_time
    }

    fn keyframe_channel(&self) -> Option<&dyn KeyframeChannel> {
        self.channel.as_ref().map(|c| c as &dyn KeyframeChannel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_space::ColorSpaceRegistry;

    fn channel() -> RasterKeyframeChannel {
        let space = ColorSpaceRegistry::new().rgb8();
        let mut channel = RasterKeyframeChannel::new();
        for t in [0, 5, 10] {
            channel.insert(t, Pixmap::new(1, 1, space.clone()));
        }
        channel
    }

    #[test]
    fn keyframe_lookup() {
        let channel = channel();
        assert_eq!(channel.active_keyframe_time(-1), None);
        assert_eq!(channel.active_keyframe_time(7), Some(5));
        assert_eq!(channel.active_keyframe_time(10), Some(10));
        assert_eq!(channel.previous_keyframe_time(5), Some(0));
        assert_eq!(channel.previous_keyframe_time(0), None);
        assert_eq!(channel.next_keyframe_time(5), Some(10));
        assert_eq!(channel.next_keyframe_time(10), None);
        assert!(channel.has_keyframe_at(5));
        assert!(!channel.has_keyframe_at(6));
    }

    #[test]
    fn write_frame_copies_pixels() {
        let space = ColorSpaceRegistry::new().rgb8();
        let mut frame = Pixmap::new(2, 2, space.clone());
        frame.fill(&[1, 2, 3, 255]);

        let mut channel = RasterKeyframeChannel::new();
        channel.insert(3, frame);

        let mut target = Pixmap::new(2, 2, space);
        target.fill(&[9, 9, 9, 9]);
        let mut cache = ConversionCache::new();
        channel.write_frame_to(3, &mut target, &mut cache);
        assert_eq!(target.pixel(1, 1), Some(&[1, 2, 3, 255][..]));

        channel.write_frame_to(4, &mut target, &mut cache);
        assert_eq!(target.pixel(1, 1), Some(&[0, 0, 0, 0][..]));
    }
}

// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::util::rgba8;
use pigment::animation::{AnimatedPixmap, RasterKeyframeChannel};
use pigment::config::KeyValueConfig;
use pigment::onion_skin::keys;
use pigment::{ConversionCache, OnionSkinCompositor, PixelRect, Pixmap};
use std::sync::Arc;

mod util;

const SIZE: usize = 4;
const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const CURRENT: i32 = 12;

fn frame(pixel: [u8; 4]) -> Pixmap {
    let mut pixmap = Pixmap::new(SIZE, SIZE, rgba8());
    pixmap.fill(&pixel);
    pixmap
}

/// A green frame that only covers the left half.
fn half_frame(pixel: [u8; 4]) -> Pixmap {
    let mut pixmap = Pixmap::new(SIZE, SIZE, rgba8());
    pixmap.fill_rect(PixelRect::new(0, 0, SIZE as i32 / 2, SIZE as i32), &pixel);
    pixmap
}

/// Blue two frames back, red one frame back and `current` at the current time.
fn device(current: Pixmap) -> AnimatedPixmap {
    let mut channel = RasterKeyframeChannel::new();
    channel.insert_labeled(CURRENT - 2, frame(BLUE), 1);
    channel.insert(CURRENT - 1, frame(RED));
    channel.insert(CURRENT, current);

    let mut device = AnimatedPixmap::with_channel(rgba8(), channel);
    device.set_current_time(CURRENT);
    device
}

fn two_skins() -> Arc<KeyValueConfig> {
    let store = KeyValueConfig::new();
    store.set(keys::NUMBER_OF_SKINS, 2);
    Arc::new(store)
}

fn full_rect() -> PixelRect {
    PixelRect::new(0, 0, SIZE as i32, SIZE as i32)
}

fn composite(compositor: &OnionSkinCompositor, device: &AnimatedPixmap) -> Pixmap {
    let mut target = Pixmap::new(SIZE, SIZE, rgba8());
    target.fill(&[1, 2, 3, 4]);
    let mut cache = ConversionCache::new();
    compositor.composite(device, &mut target, full_rect(), &mut cache);
    target
}

#[test]
fn current_frame_covers_its_skins() {
    let compositor = OnionSkinCompositor::new(two_skins());
    let target = composite(&compositor, &device(frame(GREEN)));

    for y in 0..SIZE {
        for x in 0..SIZE {
            assert_eq!(target.pixel(x, y).unwrap(), GREEN);
        }
    }
}

#[test]
fn skins_show_through_transparent_areas() {
    let compositor = OnionSkinCompositor::new(two_skins());
    let target = composite(&compositor, &device(half_frame(GREEN)));

    assert_eq!(target.pixel(0, 0).unwrap(), GREEN);

    let skin = target.pixel(SIZE - 1, 0).unwrap();
    assert!(skin[3] > 0, "{skin:?}");
    assert!(skin[3] >= compositor.skin_opacity(-1), "{skin:?}");
    // The closer, red frame lies above the blue one.
    assert!(skin[0] > skin[2], "{skin:?}");
}

#[test]
fn label_filter_skips_keyframes() {
    let store = two_skins();
    store.set(keys::COLOR_LABEL_FILTER, vec![1]);
    store.set(keys::TINT_FACTOR, 0);
    let compositor = OnionSkinCompositor::new(store);

    let target = composite(&compositor, &device(half_frame(GREEN)));
    let skin = target.pixel(SIZE - 1, 0).unwrap();
    assert_eq!(skin, [0, 0, 255, compositor.skin_opacity(-1)]);
}

#[test]
fn tint_pulls_skins_towards_the_tint_color() {
    let store = two_skins();
    store.set(keys::COLOR_LABEL_FILTER, vec![1]);
    store.set(keys::TINT_FACTOR, 255);
    store.set(keys::BACKWARD_TINT_COLOR, "#00ff00");
    let compositor = OnionSkinCompositor::new(store);

    let target = composite(&compositor, &device(half_frame(RED)));
    let skin = target.pixel(SIZE - 1, 0).unwrap();
    assert_eq!(skin[..3], [0, 255, 0]);
}

#[test]
fn forward_skins_use_later_keyframes() {
    let mut device = device(half_frame(GREEN));
    device
        .channel_mut()
        .unwrap()
        .insert(CURRENT + 1, frame(BLUE));
    device.set_current_time(CURRENT);

    let store = two_skins();
    store.set(keys::TINT_FACTOR, 0);
    store.set(&keys::state(-1), false);
    store.set(&keys::state(-2), false);
    let compositor = OnionSkinCompositor::new(store);

    let target = composite(&compositor, &device);
    let skin = target.pixel(SIZE - 1, 0).unwrap();
    assert_eq!(skin, [0, 0, 255, compositor.skin_opacity(1)]);
}

#[test]
fn device_without_keyframes_is_untouched() {
    let compositor = OnionSkinCompositor::new(two_skins());
    let target = composite(&compositor, &AnimatedPixmap::new(rgba8()));

    assert!(target.data().chunks_exact(4).all(|p| p == [1, 2, 3, 4]));
    assert!(compositor
        .calculate_extent(&AnimatedPixmap::new(rgba8()))
        .is_empty());
}

#[test]
fn nothing_before_the_first_keyframe() {
    let compositor = OnionSkinCompositor::new(two_skins());
    let mut device = device(frame(GREEN));
    device.set_current_time(CURRENT - 5);

    let target = composite(&compositor, &device);
    assert!(target.data().iter().all(|b| *b == 0));
}

#[test]
fn only_the_rect_is_touched() {
    let compositor = OnionSkinCompositor::new(two_skins());
    let mut target = Pixmap::new(SIZE, SIZE, rgba8());
    target.fill(&[1, 2, 3, 4]);
    let mut cache = ConversionCache::new();
    let rect = PixelRect::new(1, 1, 2, 2);
    compositor.composite(&device(frame(GREEN)), &mut target, rect, &mut cache);

    assert_eq!(target.pixel(1, 1).unwrap(), GREEN);
    assert_eq!(target.pixel(2, 2).unwrap(), GREEN);
    assert_eq!(target.pixel(0, 0).unwrap(), [1, 2, 3, 4]);
    assert_eq!(target.pixel(3, 3).unwrap(), [1, 2, 3, 4]);
}

#[test]
fn config_changes_are_picked_up() {
    let store = two_skins();
    let compositor = OnionSkinCompositor::new(store.clone());
    assert_eq!(compositor.config_seq_no(), 0);
    assert!(compositor.skin_opacity(-1) > 0);

    store.set(&keys::state(0), false);
    // Still the old snapshot.
    assert!(compositor.skin_opacity(-1) > 0);

    compositor.config_changed();
    assert_eq!(compositor.config_seq_no(), 1);
    assert_eq!(compositor.skin_opacity(-1), 0);
    let (config, seq_no) = compositor.versioned_config();
    assert_eq!(seq_no, 1);
    assert_eq!(config.skin_opacity(-1), 0);

    let target = composite(&compositor, &device(half_frame(GREEN)));
    assert_eq!(target.pixel(SIZE - 1, 0).unwrap(), [0, 0, 0, 0]);
}

#[test]
fn extent_covers_visible_skins() {
    let mut channel = RasterKeyframeChannel::new();
    let mut small = Pixmap::new(8, 8, rgba8());
    small.fill_rect(PixelRect::new(0, 0, 2, 2), &GREEN);
    let mut other = Pixmap::new(8, 8, rgba8());
    other.fill_rect(PixelRect::new(5, 5, 3, 3), &RED);
    channel.insert(0, other);
    channel.insert(1, small);

    let mut device = AnimatedPixmap::with_channel(rgba8(), channel);
    device.set_current_time(1);

    let store = two_skins();
    let compositor = OnionSkinCompositor::new(store.clone());
    assert_eq!(compositor.calculate_extent(&device), PixelRect::new(0, 0, 8, 8));

    store.set(&keys::state(-1), false);
    compositor.config_changed();
    assert_eq!(compositor.calculate_extent(&device), PixelRect::new(0, 0, 2, 2));
}

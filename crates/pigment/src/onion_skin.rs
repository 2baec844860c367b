// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Onion skins: tinted neighbouring animation frames drawn under the current one.

use crate::animation::{AnimatedDevice, KeyframeChannel};
use crate::color::Color;
use crate::color_space::ConversionCache;
use crate::composite::{COMPOSITE_BEHIND, COMPOSITE_OVER};
use crate::config::ConfigStore;
use crate::painter::Painter;
use crate::pixmap::Pixmap;
use crate::rect::PixelRect;
use peniko::color::{AlphaColor, Srgb};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

pub const DEFAULT_NUMBER_OF_SKINS: usize = 10;
pub const DEFAULT_TINT_FACTOR: u8 = 192;

/// Settings keys read from the [`ConfigStore`].
pub mod keys {
    pub const NUMBER_OF_SKINS: &str = "numberOfOnionSkins";
    pub const TINT_FACTOR: &str = "onionSkinTintFactor";
    pub const BACKWARD_TINT_COLOR: &str = "onionSkinTintColorBackward";
    pub const FORWARD_TINT_COLOR: &str = "onionSkinTintColorForward";
    pub const COLOR_LABEL_FILTER: &str = "onionSkinColorLabelFilter";

    /// Whether the skin at `offset` is shown. Offset `0` switches all skins.
    pub fn state(offset: i32) -> String {
        format!("onionSkinState_{offset}")
    }

    pub fn opacity(offset: i32) -> String {
        format!("onionSkinOpacity_{offset}")
    }
}

/// A snapshot of the onion skin settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnionSkinConfig {
    pub number_of_skins: usize,
    pub tint_factor: u8,
    /// sRGB components with straight alpha.
    pub backward_tint_color: [f32; 4],
    pub forward_tint_color: [f32; 4],
    /// Opacity of the skin at distance `k + 1`.
    pub backward_opacities: Vec<u8>,
    pub forward_opacities: Vec<u8>,
    /// Color labels of keyframes that get skins. Empty allows every label.
    pub color_label_filter: Vec<i32>,
}

impl OnionSkinConfig {
    pub fn load(store: &dyn ConfigStore) -> Self {
        let number_of_skins = store
            .read_i32(keys::NUMBER_OF_SKINS, DEFAULT_NUMBER_OF_SKINS as i32)
            .max(0) as usize;
        let tint_factor = store
            .read_i32(keys::TINT_FACTOR, DEFAULT_TINT_FACTOR as i32)
            .clamp(0, 255) as u8;

        let red = AlphaColor::<Srgb>::new([1.0, 0.0, 0.0, 1.0]);
        let green = AlphaColor::<Srgb>::new([0.0, 1.0, 0.0, 1.0]);
        let backward_tint_color = store.read_color(keys::BACKWARD_TINT_COLOR, red).components;
        let forward_tint_color = store.read_color(keys::FORWARD_TINT_COLOR, green).components;

        let skin_value = |offset: i32| {
            let state = store.read_bool(&keys::state(offset), offset.abs() <= 2);
            let opacity = store
                .read_i32(&keys::opacity(offset), default_opacity(offset, number_of_skins))
                .clamp(0, 255);
            if state {
                opacity
            } else {
                0
            }
        };

        let main = skin_value(0);
        let table = |sign: i32| -> Vec<u8> {
            (1..=number_of_skins as i32)
                .map(|distance| (main * skin_value(sign * distance) / 255) as u8)
                .collect()
        };

        Self {
            number_of_skins,
            tint_factor,
            backward_tint_color,
            forward_tint_color,
            backward_opacities: table(-1),
            forward_opacities: table(1),
            color_label_filter: store.read_i32_list(keys::COLOR_LABEL_FILTER),
        }
    }

    /// Opacity of the skin at signed `offset`, `0` outside the configured range.
    pub fn skin_opacity(&self, offset: i32) -> u8 {
        let table = if offset < 0 {
            &self.backward_opacities
        } else {
            &self.forward_opacities
        };
        let distance = offset.unsigned_abs() as usize;
        distance
            .checked_sub(1)
            .and_then(|k| table.get(k))
            .copied()
            .unwrap_or(0)
    }

    pub fn tint_color(&self, backward: bool) -> AlphaColor<Srgb> {
        AlphaColor::new(if backward {
            self.backward_tint_color
        } else {
            self.forward_tint_color
        })
    }

    fn passes_filter(&self, color_label: i32) -> bool {
        self.color_label_filter.is_empty() || self.color_label_filter.contains(&color_label)
    }
}

/// Falls off with the distance relative to the number of skins.
fn default_opacity(offset: i32, number_of_skins: usize) -> i32 {
    let n = number_of_skins.max(1) as f64;
    let x = offset.unsigned_abs() as f64 / n;
    (0.7 * (-(x * x) / 0.5).exp() * 255.0) as i32
}

/// Composites onion skins of animated devices.
///
/// One compositor is owned by the application. Settings are read once and kept as a
/// snapshot until [`config_changed`](Self::config_changed) is called; compositing can
/// run on any thread meanwhile.
pub struct OnionSkinCompositor {
    store: Arc<dyn ConfigStore>,
    snapshot: RwLock<Snapshot>,
}

/// Settings together with the reload they came from.
#[derive(Debug, Clone)]
struct Snapshot {
    config: Arc<OnionSkinConfig>,
    seq_no: u64,
}

impl OnionSkinCompositor {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        let config = OnionSkinConfig::load(&*store);
        Self {
            store,
            snapshot: RwLock::new(Snapshot {
                config: Arc::new(config),
                seq_no: 0,
            }),
        }
    }

    fn snapshot(&self) -> Snapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The current settings snapshot.
    pub fn config(&self) -> Arc<OnionSkinConfig> {
        self.snapshot().config
    }

    /// The current settings with the sequence number they were loaded under.
    pub fn versioned_config(&self) -> (Arc<OnionSkinConfig>, u64) {
        let Snapshot { config, seq_no } = self.snapshot();
        (config, seq_no)
    }

    /// Reload the settings. Bumps [`config_seq_no`](Self::config_seq_no) so cached
    /// composites can tell they are stale.
    pub fn config_changed(&self) {
        let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        snapshot.config = Arc::new(OnionSkinConfig::load(&*self.store));
        snapshot.seq_no += 1;
        debug!(seq_no = snapshot.seq_no, "reloaded onion skin config");
    }

    pub fn config_seq_no(&self) -> u64 {
        self.snapshot().seq_no
    }

    pub fn skin_opacity(&self, offset: i32) -> u8 {
        self.config().skin_opacity(offset)
    }

    /// Draw the current frame of `source` into `rect` of `target`, with its skins
    /// behind it. Devices without keyframes leave the target untouched.
    pub fn composite(
        &self,
        source: &dyn AnimatedDevice,
        target: &mut Pixmap,
        rect: PixelRect,
        cache: &mut ConversionCache,
    ) {
        let Some(channel) = source.keyframe_channel() else {
            return;
        };

        let config = self.config();
        let time = source.current_time();
        target.clear_rect(rect);

        let Some(active) = channel.active_keyframe_time(time) else {
            return;
        };

        let backward = skin_times(channel, &config, active, false);
        let forward = skin_times(channel, &config, active, true);

        let mut scratch = Pixmap::new(target.width(), target.height(), target.color_space().clone());

        // Closer skins go first so that `behind` keeps them above farther ones.
        for index in 0..config.number_of_skins {
            let offset = index as i32 + 1;
            for (times, is_backward) in [(&backward, true), (&forward, false)] {
                let Some(&frame) = times.get(index) else {
                    continue;
                };
                let opacity = config.skin_opacity(if is_backward { -offset } else { offset });
                if opacity == 0 {
                    continue;
                }

                channel.write_frame_to(frame, &mut scratch, cache);

                let tint = Color::from_rgba(config.tint_color(is_backward), target.color_space().clone());
                let mut painter = Painter::new(&mut scratch, cache);
                painter.set_alpha_locked(true);
                painter.set_opacity_u8(config.tint_factor);
                painter.fill_rect(rect, &tint);

                let mut painter = Painter::new(target, cache);
                painter.set_composite_op(COMPOSITE_BEHIND);
                painter.set_opacity_u8(opacity);
                painter.bit_blt(rect.x, rect.y, &scratch, rect);
            }
        }

        channel.write_frame_to(active, &mut scratch, cache);
        let mut painter = Painter::new(target, cache);
        painter.set_composite_op(COMPOSITE_OVER);
        painter.bit_blt(rect.x, rect.y, &scratch, rect);
    }

    /// The area [`composite`](Self::composite) can paint for `source`.
    pub fn calculate_extent(&self, source: &dyn AnimatedDevice) -> PixelRect {
        let Some(channel) = source.keyframe_channel() else {
            return PixelRect::default();
        };
        let Some(active) = channel.active_keyframe_time(source.current_time()) else {
            return PixelRect::default();
        };

        let config = self.config();
        let mut extent = channel.frame_extents(active);
        for forward in [false, true] {
            for (index, frame) in skin_times(channel, &config, active, forward)
                .into_iter()
                .enumerate()
            {
                let offset = index as i32 + 1;
                if config.skin_opacity(if forward { offset } else { -offset }) > 0 {
                    extent = extent.union(&channel.frame_extents(frame));
                }
            }
        }
        extent
    }
}

impl std::fmt::Debug for OnionSkinCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnionSkinCompositor")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

/// Keyframes next to `active` in one direction, nearest first, skipping filtered
/// color labels.
fn skin_times(
    channel: &dyn KeyframeChannel,
    config: &OnionSkinConfig,
    active: i32,
    forward: bool,
) -> Vec<i32> {
    let step = |time: i32| {
        if forward {
            channel.next_keyframe_time(time)
        } else {
            channel.previous_keyframe_time(time)
        }
    };

    let mut times = Vec::with_capacity(config.number_of_skins);
    let mut time = active;
    while times.len() < config.number_of_skins {
        let Some(next) = step(time) else {
            break;
        };
        time = next;
        if config.passes_filter(channel.color_label(time)) {
            times.push(time);
        }
    }
    times
}

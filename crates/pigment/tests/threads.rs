// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::util::{all_spaces, random_pixels, rgba8};
use bench_gen::Alpha;
use pigment::animation::{AnimatedPixmap, RasterKeyframeChannel};
use pigment::color_space::RenderingIntent;
use pigment::composite::{COMPOSITE_OVER, COMPOSITE_SOFT_LIGHT_SVG};
use pigment::config::KeyValueConfig;
use pigment::onion_skin::keys;
use pigment::{CompositeParams, ConversionCache, OnionSkinCompositor, PixelRect, Pixmap};
use rayon::prelude::*;
use std::sync::Arc;

mod util;

const COLS: usize = 64;
const ROWS: usize = 48;

#[test]
fn parallel_rows_match_serial() {
    for space in all_spaces() {
        let row_bytes = COLS * space.pixel_size();
        let src = random_pixels(&*space, COLS * ROWS, Alpha::Random);
        let dst = random_pixels(&*space, COLS * ROWS, Alpha::Random);
        let mask = bench_gen::mask(COLS * ROWS);
        let op = space.composite_op(COMPOSITE_SOFT_LIGHT_SVG);

        let mut serial = dst.clone();
        let mut params = CompositeParams::new(&mut serial, row_bytes, &src, row_bytes, ROWS, COLS)
            .with_mask(&mask, COLS)
            .with_opacity(0.7);
        op.composite(&mut params);

        let mut parallel = dst.clone();
        parallel
            .par_chunks_mut(row_bytes)
            .zip(src.par_chunks(row_bytes))
            .zip(mask.par_chunks(COLS))
            .for_each(|((dst, src), mask)| {
                let mut params = CompositeParams::row(dst, src, COLS)
                    .with_mask(mask, COLS)
                    .with_opacity(0.7);
                op.composite(&mut params);
            });

        assert_eq!(serial, parallel, "{}", space.id());
    }
}

#[test]
fn conversion_caches_per_worker() {
    let rgb8 = rgba8();
    let others = all_spaces();

    let results: Vec<Vec<u8>> = others
        .par_iter()
        .map_init(ConversionCache::new, |cache, src_space| {
            let src = random_pixels(&**src_space, COLS, Alpha::Opaque);
            let mut dst = vec![0; COLS * rgb8.pixel_size()];
            let op = rgb8.composite_op(COMPOSITE_OVER);
            let mut params = CompositeParams::row(&mut dst, &src, COLS);
            rgb8.bit_blt(&**src_space, &mut params, &*op, RenderingIntent::default(), cache);
            dst
        })
        .collect();

    for (src_space, dst) in others.iter().zip(&results) {
        let src = random_pixels(&**src_space, COLS, Alpha::Opaque);
        let mut expected = vec![0; COLS * rgb8.pixel_size()];
        src_space
            .convert_pixels_to(&src, &mut expected, &*rgb8, COLS, RenderingIntent::default())
            .unwrap();
        assert_eq!(&expected, dst, "{}", src_space.id());
    }
}

#[test]
fn onion_skins_from_many_threads() {
    let mut channel = RasterKeyframeChannel::new();
    for (time, pixel) in [(0, [255, 0, 0, 255]), (1, [0, 0, 255, 255]), (2, [0, 255, 0, 128])] {
        let mut pixmap = Pixmap::new(16, 16, rgba8());
        pixmap.fill(&pixel);
        channel.insert(time, pixmap);
    }
    let mut device = AnimatedPixmap::with_channel(rgba8(), channel);
    device.set_current_time(2);

    let compositor = OnionSkinCompositor::new(Arc::new(KeyValueConfig::new()));
    let rect = PixelRect::new(0, 0, 16, 16);

    let mut cache = ConversionCache::new();
    let mut expected = Pixmap::new(16, 16, rgba8());
    compositor.composite(&device, &mut expected, rect, &mut cache);

    let targets: Vec<Pixmap> = (0..8)
        .into_par_iter()
        .map_init(ConversionCache::new, |cache, _| {
            let mut target = Pixmap::new(16, 16, rgba8());
            compositor.composite(&device, &mut target, rect, cache);
            target
        })
        .collect();

    for target in targets {
        assert_eq!(target.data(), expected.data());
    }
}

#[test]
fn reloads_pair_config_with_seq_no() {
    const RELOADS: u64 = 200;

    let store = Arc::new(KeyValueConfig::new());
    let compositor = OnionSkinCompositor::new(store.clone());

    std::thread::scope(|scope| {
        scope.spawn(|| {
            // Skins are off after every odd reload.
            for seq_no in 1..=RELOADS {
                store.set(&keys::state(0), seq_no % 2 == 0);
                compositor.config_changed();
            }
        });

        for _ in 0..4 {
            scope.spawn(|| loop {
                let (config, seq_no) = compositor.versioned_config();
                assert_eq!(config.skin_opacity(-1) == 0, seq_no % 2 == 1, "{seq_no}");
                if seq_no == RELOADS {
                    break;
                }
            });
        }
    });
}

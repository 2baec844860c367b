// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::util::{all_spaces, assert_close, composite_rgba8, composite_row, random_pixels, rgba8};
use bench_gen::Alpha;
use pigment::composite::*;
use pigment::{ChannelFlags, CompositeParams};

mod util;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const COLS: usize = 32;

#[test]
fn over_at_zero_opacity_keeps_destination() {
    for space in all_spaces() {
        let src = random_pixels(&*space, COLS, Alpha::Random);
        let dst = random_pixels(&*space, COLS, Alpha::Opaque);

        let mut out = dst.clone();
        composite_row(&*space, COMPOSITE_OVER, &mut out, &src, 0.0);
        assert_eq!(out, dst, "{}", space.id());
    }
}

#[test]
fn over_opaque_source_replaces() {
    assert_eq!(composite_rgba8(COMPOSITE_OVER, RED, BLUE, 1.0), RED);
    assert_eq!(composite_rgba8(COMPOSITE_OVER, RED, [0, 0, 0, 0], 1.0), RED);
}

#[test]
fn over_half_opacity() {
    let out = composite_rgba8(COMPOSITE_OVER, RED, BLUE, 0.5);
    assert_eq!(out[3], 255);
    assert_close(&out[..3], &[128, 0, 127], 1);
}

#[test]
fn copy_replaces_destination() {
    assert_eq!(composite_rgba8(COMPOSITE_COPY, RED, BLUE, 1.0), RED);
    assert_eq!(
        composite_rgba8(COMPOSITE_COPY, [0, 0, 0, 0], BLUE, 1.0),
        [0, 0, 0, 0]
    );
}

#[test]
fn addition_saturates() {
    assert_eq!(
        composite_rgba8(COMPOSITE_ADD, [100, 100, 100, 255], [50, 50, 50, 255], 1.0),
        [150, 150, 150, 255]
    );
    assert_eq!(
        composite_rgba8(COMPOSITE_ADD, [200, 200, 200, 255], [100, 100, 100, 255], 1.0),
        [255, 255, 255, 255]
    );
}

#[test]
fn multiply_with_white_is_identity() {
    let dst = [12, 140, 250, 255];
    assert_eq!(
        composite_rgba8(COMPOSITE_MULT, [255, 255, 255, 255], dst, 1.0),
        dst
    );
    assert_eq!(
        composite_rgba8(COMPOSITE_MULT, [0, 0, 0, 255], dst, 1.0),
        [0, 0, 0, 255]
    );
}

#[test]
fn unknown_op_falls_back_to_over() {
    assert_eq!(
        composite_rgba8("no such op", RED, BLUE, 1.0),
        composite_rgba8(COMPOSITE_OVER, RED, BLUE, 1.0)
    );
}

#[test]
fn erase_and_clear() {
    assert_eq!(composite_rgba8(COMPOSITE_ERASE, RED, BLUE, 1.0), [0, 0, 0, 0]);
    assert_eq!(composite_rgba8(COMPOSITE_ERASE, [0, 0, 0, 0], BLUE, 1.0), BLUE);
    assert_eq!(composite_rgba8(COMPOSITE_CLEAR, RED, BLUE, 1.0), [0, 0, 0, 0]);
}

#[test]
fn destination_in_with_transparent_source() {
    assert_eq!(
        composite_rgba8(COMPOSITE_DESTINATION_IN, [0, 0, 0, 0], BLUE, 1.0),
        [0, 0, 0, 0]
    );
    assert_eq!(composite_rgba8(COMPOSITE_DESTINATION_IN, RED, BLUE, 1.0), BLUE);
}

#[test]
fn transparent_results_have_no_color() {
    let mut transparent = 0;
    for space in all_spaces() {
        let pixel_size = space.pixel_size();
        let channel_size = pixel_size / space.channel_count();
        let Some(alpha_pos) = space.alpha_pos() else {
            continue;
        };
        let alpha_bytes = alpha_pos * channel_size..(alpha_pos + 1) * channel_size;

        for (src_alpha, dst_alpha) in [
            (Alpha::Opaque, Alpha::Opaque),
            (Alpha::Fixed(0), Alpha::Opaque),
            (Alpha::Opaque, Alpha::Fixed(200)),
            (Alpha::Fixed(0), Alpha::Fixed(200)),
        ] {
            let src = random_pixels(&*space, COLS, src_alpha);
            let dst = random_pixels(&*space, COLS, dst_alpha);

            for op in space.composite_ops() {
                let mut out = dst.clone();
                let mut params = CompositeParams::row(&mut out, &src, COLS);
                op.composite(&mut params);

                for pixel in out.chunks_exact(pixel_size) {
                    if space.opacity_f(pixel) != 0.0 {
                        continue;
                    }
                    transparent += 1;
                    let color_is_zero = pixel
                        .iter()
                        .enumerate()
                        .all(|(i, b)| alpha_bytes.contains(&i) || *b == 0);
                    assert!(color_is_zero, "{} {}: {pixel:?}", space.id(), op.id());
                }
            }
        }
    }
    assert!(transparent > 0);
}

#[test]
fn behind_paints_under() {
    assert_eq!(composite_rgba8(COMPOSITE_BEHIND, RED, BLUE, 1.0), BLUE);
    assert_eq!(composite_rgba8(COMPOSITE_BEHIND, RED, [0, 0, 0, 0], 1.0), RED);

    let out = composite_rgba8(COMPOSITE_BEHIND, RED, [0, 0, 255, 200], 1.0);
    assert_eq!(out[3], 255);
    assert!(out[2] > out[0]);
}

#[test]
fn no_composition_leaves_destination() {
    assert_eq!(composite_rgba8(COMPOSITE_NO, RED, BLUE, 1.0), BLUE);
}

#[test]
fn copy_red_only_touches_red() {
    assert_eq!(
        composite_rgba8(COMPOSITE_COPY_RED, [200, 10, 10, 255], [0, 50, 60, 255], 1.0),
        [200, 50, 60, 255]
    );
}

#[test]
fn color_takes_source_saturation() {
    let out = composite_rgba8(COMPOSITE_COLOR, [128, 128, 128, 255], RED, 1.0);
    assert_eq!(out[3], 255);
    assert!(out[0].abs_diff(out[1]) <= 1 && out[1].abs_diff(out[2]) <= 1, "{out:?}");
}

#[test]
fn dissolve_is_deterministic() {
    let space = rgba8();
    let src = random_pixels(&*space, COLS, Alpha::Fixed(128));
    let dst = random_pixels(&*space, COLS, Alpha::Opaque);

    let mut first = dst.clone();
    composite_row(&*space, COMPOSITE_DISSOLVE, &mut first, &src, 1.0);
    let mut second = dst.clone();
    composite_row(&*space, COMPOSITE_DISSOLVE, &mut second, &src, 1.0);
    assert_eq!(first, second);

    let opaque = random_pixels(&*space, COLS, Alpha::Opaque);
    let mut out = dst.clone();
    composite_row(&*space, COMPOSITE_DISSOLVE, &mut out, &opaque, 1.0);
    assert_eq!(out, opaque);
}

#[test]
fn zero_mask_keeps_destination() {
    let space = rgba8();
    let src = random_pixels(&*space, COLS, Alpha::Opaque);
    let dst = random_pixels(&*space, COLS, Alpha::Random);
    let mut mask = vec![255; COLS];
    mask[..COLS / 2].fill(0);

    let mut out = dst.clone();
    let mut params = CompositeParams::row(&mut out, &src, COLS).with_mask(&mask, COLS);
    space.composite_op(COMPOSITE_OVER).composite(&mut params);

    let half = COLS / 2 * 4;
    assert_eq!(out[..half], dst[..half]);
    assert_eq!(out[half..], src[half..]);
}

#[test]
fn fixed_color_source() {
    let space = rgba8();
    let mut dst = vec![0; 4 * 4 * 3];
    let mut params = CompositeParams::new(&mut dst, 16, &RED, 0, 3, 4);
    space.composite_op(COMPOSITE_OVER).composite(&mut params);

    for pixel in dst.chunks_exact(4) {
        assert_eq!(pixel, RED);
    }
}

#[test]
fn rows_respect_strides() {
    let space = rgba8();
    // Two rows of two pixels with one padding pixel per destination row.
    let mut dst = vec![7; 2 * 12];
    let src = [RED, RED, BLUE, BLUE].concat();
    let mut params = CompositeParams::new(&mut dst, 12, &src, 8, 2, 2);
    space.composite_op(COMPOSITE_COPY).composite(&mut params);

    assert_eq!(dst[..8], [RED, RED].concat());
    assert_eq!(dst[8..12], [7; 4]);
    assert_eq!(dst[12..20], [BLUE, BLUE].concat());
    assert_eq!(dst[20..], [7; 4]);
}

#[test]
fn channel_flags_skip_channels() {
    let space = rgba8();
    let mut out = BLUE;
    let flags = ChannelFlags::ALL.with(2, false);
    let mut params = CompositeParams::row(&mut out, &RED, 1).with_channel_flags(flags);
    space.composite_op(COMPOSITE_OVER).composite(&mut params);

    assert_eq!(out, [255, 0, 255, 255]);
}

#[test]
fn locked_alpha_is_preserved_by_every_op() {
    for space in all_spaces() {
        let src = random_pixels(&*space, COLS, Alpha::Random);
        let dst = random_pixels(&*space, COLS, Alpha::Random);
        let flags = space.channel_flags(true, false);

        for op in space.composite_ops() {
            let mut out = dst.clone();
            let mut params = CompositeParams::row(&mut out, &src, COLS)
                .with_opacity(0.8)
                .with_channel_flags(flags);
            op.composite(&mut params);

            for (a, b) in out
                .chunks_exact(space.pixel_size())
                .zip(dst.chunks_exact(space.pixel_size()))
            {
                assert_eq!(
                    space.opacity_u8(a),
                    space.opacity_u8(b),
                    "{} {}",
                    space.id(),
                    op.id()
                );
            }
        }
    }
}

#[test]
fn alpha_darken_caps_at_opacity() {
    let space = rgba8();
    let mut out = [0, 0, 0, 0];
    for _ in 0..8 {
        let mut params = CompositeParams::row(&mut out, &RED, 1).with_opacity(0.5);
        space.composite_op(COMPOSITE_ALPHA_DARKEN).composite(&mut params);
    }
    assert_eq!(out[0], 255);
    assert!(out[3].abs_diff(128) <= 1, "{out:?}");
}

#[test]
fn categories_are_known() {
    let known = [
        categories::ARITHMETIC,
        categories::BINARY,
        categories::DARK,
        categories::LIGHT,
        categories::MODULO,
        categories::NEGATIVE,
        categories::MIX,
        categories::MISC,
        categories::HSY,
        categories::HSI,
        categories::HSL,
        categories::HSV,
        categories::QUADRATIC,
    ];
    for op in rgba8().composite_ops() {
        assert!(known.contains(&op.category()), "{}", op.id());
        assert!(!op.description().is_empty());
    }
}

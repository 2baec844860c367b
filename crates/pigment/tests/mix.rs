// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::util::{all_spaces, random_pixels, rgba8};
use bench_gen::Alpha;
use pigment::ColorSpace;

mod util;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn assert_same_color(space: &dyn ColorSpace, a: &[u8], b: &[u8]) {
    let (mut x, mut y) = ([0_u16; 4], [0_u16; 4]);
    space.to_rgb_a16(a, &mut x, 1);
    space.to_rgb_a16(b, &mut y, 1);
    for (p, q) in x.iter().zip(&y) {
        assert!(p.abs_diff(*q) <= 1, "{}: {x:?} vs {y:?}", space.id());
    }
}

#[test]
fn mixing_one_color_is_identity() {
    for space in all_spaces() {
        let pixels = random_pixels(&*space, 16, Alpha::Opaque);
        let mix = space.mix_colors_op();

        for pixel in pixels.chunks_exact(space.pixel_size()) {
            let mut dst = vec![0; space.pixel_size()];
            mix.mix_colors(&[pixel], &[255], 255, &mut dst);
            assert_same_color(&*space, &dst, pixel);
        }
    }
}

#[test]
fn zero_weight_is_excluded() {
    let space = rgba8();
    let mix = space.mix_colors_op();
    let mut dst = [0; 4];
    mix.mix_colors(&[&RED, &BLUE], &[255, 0], 255, &mut dst);
    assert_eq!(dst, RED);
}

#[test]
fn zero_alpha_mixes_to_zero() {
    for space in all_spaces() {
        let pixels = random_pixels(&*space, 4, Alpha::Fixed(0));
        let colors: Vec<&[u8]> = pixels.chunks_exact(space.pixel_size()).collect();

        let mut dst = vec![0xAA; space.pixel_size()];
        space
            .mix_colors_op()
            .mix_colors(&colors, &[64, 64, 64, 63], 255, &mut dst);
        assert!(dst.iter().all(|b| *b == 0), "{}", space.id());
    }
}

#[test]
fn non_positive_weight_sum_mixes_to_zero() {
    let space = rgba8();
    let mix = space.mix_colors_op();
    let mut dst = [9; 4];
    mix.mix_colors(&[&RED], &[255], 0, &mut dst);
    assert_eq!(dst, [0; 4]);
}

#[test]
fn average_of_black_and_white() {
    let space = rgba8();
    let mix = space.mix_colors_op();
    let mut dst = [0; 4];
    mix.mix_colors_average(&[&[0, 0, 0, 255], &[255, 255, 255, 255]], &mut dst);
    assert_eq!(dst, [128, 128, 128, 255]);
}

#[test]
fn alpha_is_the_weighted_average() {
    let space = rgba8();
    let mix = space.mix_colors_op();
    let mut dst = [0; 4];
    mix.mix_colors(&[&RED, &[0, 0, 255, 0]], &[128, 127], 255, &mut dst);
    assert_eq!(dst, [255, 0, 0, 128]);
}

#[test]
fn packed_matches_slices() {
    let space = rgba8();
    let pixels = random_pixels(&*space, 8, Alpha::Random);
    let (weights, sum) = bench_gen::weights(8);
    let mix = space.mix_colors_op();

    let mut packed = [0; 4];
    mix.mix_colors_packed(&pixels, &weights, sum, &mut packed);

    let colors: Vec<&[u8]> = pixels.chunks_exact(4).collect();
    let mut sliced = [0; 4];
    mix.mix_colors(&colors, &weights, sum, &mut sliced);

    assert_eq!(packed, sliced);
}

#[test]
fn mixer_accumulates_across_calls() {
    let space = rgba8();
    let pixels = random_pixels(&*space, 8, Alpha::Random);
    let (weights, sum) = bench_gen::weights(8);
    let mix = space.mix_colors_op();

    let mut expected = [0; 4];
    mix.mix_colors_packed(&pixels, &weights, sum, &mut expected);

    let first_sum: i32 = weights[..3].iter().map(|w| *w as i32).sum();
    let mut mixer = mix.create_mixer();
    mixer.accumulate(&pixels[..12], &weights[..3], first_sum);
    mixer.accumulate(&pixels[12..], &weights[3..], sum - first_sum);

    let mut actual = [0; 4];
    mixer.compute_mixed_color(&mut actual);
    assert_eq!(actual, expected);
}

#[test]
fn mixer_average() {
    let space = rgba8();
    let mix = space.mix_colors_op();
    let mut mixer = mix.create_mixer();
    mixer.accumulate_average(&[RED, RED].concat(), 2);
    mixer.accumulate_average(&[0, 0, 0, 0], 1);

    let mut dst = [0; 4];
    mixer.compute_mixed_color(&mut dst);
    assert_eq!(dst, [255, 0, 0, 170]);
}

#[test]
fn two_color_arrays() {
    let space = rgba8();
    let mix = space.mix_colors_op();
    let a = [RED, RED].concat();
    let b = [BLUE, BLUE].concat();

    let mut dst = [0; 8];
    mix.mix_two_color_arrays(&a, &b, 2, 0.0, &mut dst);
    assert_eq!(dst[..], a[..]);
    mix.mix_two_color_arrays(&a, &b, 2, 1.0, &mut dst);
    assert_eq!(dst[..], b[..]);

    mix.mix_array_with_color(&a, &BLUE, 2, 0.5, &mut dst);
    for pixel in dst.chunks_exact(4) {
        assert_eq!(pixel[3], 255);
        assert!(pixel[0].abs_diff(pixel[2]) <= 1, "{pixel:?}");
    }
}

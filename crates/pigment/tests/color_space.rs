// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::util::{all_spaces, random_pixels, rgba8, space, REGISTRY};
use bench_gen::Alpha;
use pigment::color_space::RenderingIntent;
use pigment::composite::{
    COMPOSITE_COPY, COMPOSITE_DARKEN, COMPOSITE_HUE, COMPOSITE_MULT, COMPOSITE_OVER,
    COMPOSITE_SCREEN,
};
use pigment::error::{ConversionError, PixmapError, RegistryError};
use pigment::peniko::color::{AlphaColor, Srgb};
use pigment::peniko::{BlendMode, Compose, Mix};
use pigment::{ColorDepth, ColorModel, ColorSpace, CompositeParams, ConversionCache, Pixmap};

mod util;

const PIXELS: usize = 64;
// Three steps of an 8-bit channel, expressed in 16 bits.
const RGB16_TOLERANCE: u16 = 3 * 257;

fn assert_close16(a: &[u16], b: &[u16], tolerance: u16, space: &dyn ColorSpace) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert!(
            x.abs_diff(*y) <= tolerance,
            "{}: {a:?} vs {b:?}",
            space.id()
        );
    }
}

fn lab_round_trip(alpha: Alpha) {
    for space in all_spaces() {
        let pixels = random_pixels(&*space, PIXELS, alpha);

        let mut lab = vec![0_u16; PIXELS * 4];
        space.to_lab_a16(&pixels, &mut lab, PIXELS);
        let mut back = vec![0_u8; pixels.len()];
        space.from_lab_a16(&lab, &mut back, PIXELS);

        let mut expected = vec![0_u16; PIXELS * 4];
        let mut actual = vec![0_u16; PIXELS * 4];
        space.to_rgb_a16(&pixels, &mut expected, PIXELS);
        space.to_rgb_a16(&back, &mut actual, PIXELS);

        assert_close16(&expected, &actual, RGB16_TOLERANCE, &*space);
    }
}

#[test]
fn lab_round_trip_opaque() {
    lab_round_trip(Alpha::Opaque);
}

#[test]
fn lab_round_trip_transparent() {
    lab_round_trip(Alpha::Fixed(0));

    for space in all_spaces() {
        let pixels = random_pixels(&*space, PIXELS, Alpha::Fixed(0));
        for pixel in pixels.chunks_exact(space.pixel_size()) {
            assert_eq!(space.opacity_u8(pixel), 0, "{}", space.id());
        }
    }
}

#[test]
fn rgb16_is_lossless() {
    let rgb16 = REGISTRY.rgb16();
    let canonical = bench_gen::rgba16_run(bench_gen::Params {
        cols: PIXELS,
        rows: 1,
        alpha: Alpha::Random,
    });

    let mut pixels = vec![0; PIXELS * rgb16.pixel_size()];
    rgb16.from_rgb_a16(&canonical, &mut pixels, PIXELS);
    let mut back = vec![0; PIXELS * 4];
    rgb16.to_rgb_a16(&pixels, &mut back, PIXELS);

    assert_eq!(canonical, back);
}

#[test]
fn pixel_size_matches_channels() {
    for space in all_spaces() {
        let total: usize = space.channels().iter().map(|c| c.size()).sum();
        assert_eq!(space.pixel_size(), total, "{}", space.id());
        assert_eq!(space.channel_count(), space.color_channel_count() + 1);
        assert!(space.alpha_pos().is_some());
    }
}

#[test]
fn registry_lookup() {
    let rgb = REGISTRY.color_space("RGBA", "U8").unwrap();
    assert!(rgb.is_same(&*rgba8()));
    assert_eq!(rgb.model(), ColorModel::Rgba);
    assert_eq!(rgb.depth(), ColorDepth::U8);

    let by_id = REGISTRY.by_id(rgb.id()).unwrap();
    assert!(by_id.is_same(&*rgb));

    assert!(matches!(
        REGISTRY.color_space("XYZA", "U8"),
        Err(RegistryError::UnknownColorSpace { .. })
    ));
    assert!(matches!(
        REGISTRY.by_id("nope"),
        Err(RegistryError::UnknownId(_))
    ));

    assert_eq!(REGISTRY.ids().count(), ColorModel::ALL.len() * ColorDepth::ALL.len());
}

#[test]
fn converts_between_spaces() {
    let src = space(ColorModel::Rgba, ColorDepth::U8);
    let dst = space(ColorModel::Rgba, ColorDepth::F32);

    let pixels = [255, 0, 0, 255, 0, 0, 255, 128];
    let mut out = vec![0; 2 * dst.pixel_size()];
    src.convert_pixels_to(&pixels, &mut out, &*dst, 2, RenderingIntent::default())
        .unwrap();

    let mut values = [0.0; 4];
    dst.normalised_channel_values(&out[..dst.pixel_size()], &mut values);
    assert!(values[0] > 0.99);
    assert!(values[2] < 0.01);
    assert!(values[3] > 0.99);
    assert_eq!(dst.opacity_u8(&out[dst.pixel_size()..]), 128);
}

#[test]
fn converts_through_lab() {
    let rgb = rgba8();
    let lab = space(ColorModel::LabA, ColorDepth::U16);

    let gray = [128, 128, 128, 255];
    let mut lab_pixel = vec![0; lab.pixel_size()];
    rgb.convert_pixels_to(&gray, &mut lab_pixel, &*lab, 1, RenderingIntent::default())
        .unwrap();

    let mut back = [0; 4];
    lab.convert_pixels_to(&lab_pixel, &mut back, &*rgb, 1, RenderingIntent::default())
        .unwrap();
    util::assert_close(&back, &gray, 1);
}

#[test]
fn conversion_rejects_short_buffers() {
    let rgb = rgba8();
    let gray = space(ColorModel::GrayA, ColorDepth::U16);

    let mut dst = vec![0; 4];
    assert!(matches!(
        rgb.convert_pixels_to(&[0; 4], &mut dst, &*gray, 2, RenderingIntent::default()),
        Err(ConversionError::SourceTooSmall { expected: 8, actual: 4 })
    ));
    assert!(matches!(
        rgb.convert_pixels_to(&[0; 12], &mut dst, &*gray, 3, RenderingIntent::default()),
        Err(ConversionError::DestinationTooSmall { .. })
    ));
}

#[test]
fn rgba_color_round_trip() {
    for space in all_spaces() {
        let color = AlphaColor::<Srgb>::from_rgba8(200, 100, 50, 255);
        let mut pixel = vec![0; space.pixel_size()];
        space.from_rgba_color(color, &mut pixel);

        assert_eq!(space.opacity_u8(&pixel), 255, "{}", space.id());
        if space.model() == ColorModel::Rgba {
            let back = space.to_rgba_color(&pixel).to_rgba8().to_u8_array();
            util::assert_close(&back, &[200, 100, 50, 255], 1);
        }
    }
}

#[test]
fn intensity_of_white_and_black() {
    for space in all_spaces() {
        let mut white = vec![0; space.pixel_size()];
        let mut black = vec![0; space.pixel_size()];
        space.from_rgba_color(AlphaColor::from_rgba8(255, 255, 255, 255), &mut white);
        space.from_rgba_color(AlphaColor::from_rgba8(0, 0, 0, 255), &mut black);

        assert!(space.intensity8(&white) >= 250, "{}", space.id());
        assert!(space.intensity8(&black) <= 5, "{}", space.id());
    }
}

#[test]
fn difference() {
    let rgb = rgba8();
    let red = [255, 0, 0, 255];
    let transparent = [0, 0, 0, 0];

    assert_eq!(rgb.difference(&red, &red), 0);
    assert_eq!(rgb.difference(&transparent, &transparent), 0);
    assert_eq!(rgb.difference(&red, &transparent), 255);
    assert!(rgb.difference(&red, &[0, 0, 255, 255]) > 100);

    let half = [255, 0, 0, 128];
    assert_eq!(rgb.difference(&red, &half), 0);
    assert_eq!(rgb.difference_a(&red, &half), 127);
}

#[test]
fn composite_op_lookup() {
    let rgb = rgba8();
    let gray = space(ColorModel::GrayA, ColorDepth::U8);

    assert_eq!(rgb.composite_op("not an op").id(), COMPOSITE_OVER);
    assert!(!rgb.has_composite_op("not an op"));

    assert!(rgb.has_composite_op(COMPOSITE_HUE));
    assert!(!gray.has_composite_op(COMPOSITE_HUE));
    assert_eq!(gray.composite_op(COMPOSITE_HUE).id(), COMPOSITE_OVER);

    assert!(rgb.composite_ops().len() > gray.composite_ops().len());
    assert!(rgb.composite_ops().len() >= 100);

    for space in all_spaces() {
        for op in space.composite_ops() {
            assert_eq!(op.layout(), space.layout(), "{} {}", space.id(), op.id());
            assert!(space.has_composite_op(op.id()));
        }
    }
}

#[test]
fn blend_modes_map_to_ops() {
    let rgb = rgba8();
    let multiply = BlendMode::new(Mix::Multiply, Compose::SrcOver);
    assert_eq!(rgb.composite_op_for_blend_mode(multiply).id(), COMPOSITE_MULT);

    let copy = BlendMode::new(Mix::Normal, Compose::Copy);
    assert_eq!(rgb.composite_op_for_blend_mode(copy).id(), COMPOSITE_COPY);

    let over = BlendMode::new(Mix::Normal, Compose::SrcOver);
    assert_eq!(rgb.composite_op_for_blend_mode(over).id(), COMPOSITE_OVER);
}

#[test]
fn cmyk_blends_like_rgb() {
    let cmyk = space(ColorModel::CmykA, ColorDepth::U8);
    let rgb = rgba8();
    let cyan = AlphaColor::from_rgba8(0, 255, 255, 255);
    let white = AlphaColor::from_rgba8(255, 255, 255, 255);
    let yellow = AlphaColor::from_rgba8(255, 255, 0, 255);

    for op in [COMPOSITE_MULT, COMPOSITE_DARKEN, COMPOSITE_SCREEN] {
        for dst_color in [white, yellow] {
            let blended: Vec<[u8; 4]> = [&cmyk, &rgb]
                .into_iter()
                .map(|space| {
                    let mut src = vec![0; space.pixel_size()];
                    let mut dst = vec![0; space.pixel_size()];
                    space.from_rgba_color(cyan, &mut src);
                    space.from_rgba_color(dst_color, &mut dst);
                    let mut params = CompositeParams::row(&mut dst, &src, 1);
                    space.composite_op(op).composite(&mut params);
                    space.to_rgba_color(&dst).to_rgba8().to_u8_array()
                })
                .collect();
            assert_eq!(blended[0], blended[1], "{op} over {dst_color:?}");
        }
    }

    let mut dst = vec![0; cmyk.pixel_size()];
    let mut src = vec![0; cmyk.pixel_size()];
    cmyk.from_rgba_color(white, &mut dst);
    cmyk.from_rgba_color(cyan, &mut src);
    let mut params = CompositeParams::row(&mut dst, &src, 1);
    cmyk.composite_op(COMPOSITE_MULT).composite(&mut params);
    assert_eq!(cmyk.to_rgba_color(&dst).to_rgba8().to_u8_array(), [0, 255, 255, 255]);
}

#[test]
fn bit_blt_converts_the_source() {
    let rgb8 = rgba8();
    let rgb16 = REGISTRY.rgb16();

    let mut src = vec![0; rgb16.pixel_size()];
    rgb16.from_rgba_color(AlphaColor::from_rgba8(10, 20, 30, 255), &mut src);

    let mut dst = [0_u8, 0, 0, 0, 0, 0, 0, 0];
    let op = rgb8.composite_op(COMPOSITE_COPY);
    let mut params = CompositeParams::new(&mut dst, 8, &src, 0, 1, 2);
    let mut cache = ConversionCache::new();
    rgb8.bit_blt(&*rgb16, &mut params, &*op, RenderingIntent::default(), &mut cache);

    assert_eq!(dst, [10, 20, 30, 255, 10, 20, 30, 255]);
    assert!(cache.capacity() >= rgb8.pixel_size());
}

#[test]
fn pixmap_stream_round_trip() {
    let space = space(ColorModel::CmykA, ColorDepth::U16);
    let mut pixmap = Pixmap::new(5, 3, space.clone());
    let pixels = random_pixels(&*space, 15, Alpha::Random);
    pixmap.data_mut().copy_from_slice(&pixels);

    let mut bytes = Vec::new();
    pixmap.write_to(&mut bytes).unwrap();
    let read = Pixmap::read_from(bytes.as_slice(), &REGISTRY).unwrap();

    assert_eq!(read.width(), 5);
    assert_eq!(read.height(), 3);
    assert!(read.color_space().is_same(&*space));
    assert_eq!(read.data(), pixmap.data());
}

fn pixmap_header(id: &str, id_len: u32, width: u32, height: u32) -> Vec<u8> {
    let mut bytes = b"PIGMENT1".to_vec();
    bytes.extend_from_slice(&id_len.to_le_bytes());
    bytes.extend_from_slice(id.as_bytes());
    bytes.extend_from_slice(&width.to_le_bytes());
    bytes.extend_from_slice(&height.to_le_bytes());
    bytes
}

#[test]
fn malformed_pixmap_streams() {
    let rgb8 = rgba8();
    let id = rgb8.id();
    let read = |bytes: Vec<u8>| Pixmap::read_from(bytes.as_slice(), &REGISTRY);

    assert!(matches!(
        read(pixmap_header(id, id.len() as u32, u32::MAX, u32::MAX)),
        Err(PixmapError::TooLarge { .. })
    ));
    assert!(matches!(
        read(pixmap_header(id, u32::MAX, 1, 1)),
        Err(PixmapError::InvalidId)
    ));
    assert!(matches!(
        read(b"PIXMAP00".to_vec()),
        Err(PixmapError::BadMagic)
    ));
    // A header promising gigabytes is not allocated up front.
    assert!(matches!(
        read(pixmap_header(id, id.len() as u32, 60_000, 60_000)),
        Err(PixmapError::Truncated)
    ));

    let mut short = pixmap_header(id, id.len() as u32, 2, 2);
    short.extend_from_slice(&[0; 15]);
    assert!(matches!(read(short), Err(PixmapError::Truncated)));

    let mut exact = pixmap_header(id, id.len() as u32, 2, 2);
    exact.extend_from_slice(&[7; 16]);
    let pixmap = read(exact).unwrap();
    assert_eq!(pixmap.data(), [7; 16]);
}

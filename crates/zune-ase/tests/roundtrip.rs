/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::io::Cursor;

use nanorand::{Rng, WyRand};
use zune_ase::zune_core::bytestream::ZCursor;
use zune_ase::zune_core::options::{DecoderOptions, EncoderOptions};
use zune_ase::{
    AseDecoder, AseEncoder, BlendMode, Cel, Color, Image, Layer, LayerId, PixelFormat, Sprite
};

fn random_image(rng: &mut WyRand, format: PixelFormat, width: usize, height: usize) -> Image {
    let mut pixels = vec![0_u8; width * height * format.bytes_per_pixel()];
    rng.fill(&mut pixels);

    Image::from_pixels(format, width, height, pixels).unwrap()
}

fn encode(sprite: &Sprite, options: EncoderOptions) -> Vec<u8> {
    let mut output = Cursor::new(Vec::new());
    let written = AseEncoder::new_with_options(sprite, options)
        .encode(&mut output)
        .unwrap();

    let bytes = output.into_inner();
    assert_eq!(written, bytes.len());
    bytes
}

fn decode(bytes: &[u8]) -> Sprite {
    let mut decoder = AseDecoder::new_with_options(ZCursor::new(bytes), DecoderOptions::new_strict());
    let sprite = decoder.decode().unwrap();

    assert!(decoder.warnings().is_empty(), "{:?}", decoder.warnings());
    sprite
}

/// A sprite with nested folders, empty cels and per frame durations
fn build_sprite(rng: &mut WyRand, format: PixelFormat) -> Sprite {
    let (width, height) = (13, 7);
    let mut sprite = Sprite::new(format, width, height, 16);
    sprite.set_frame_count(4);

    for (frame, duration) in [90, 40, 40, 250].into_iter().enumerate() {
        sprite.set_frame_duration(frame, duration).unwrap();
    }

    // layers are added in pre-order
    let root = sprite.root();
    let background = sprite.add_layer(root, Layer::new_image("background")).unwrap();
    let group = sprite.add_layer(root, Layer::new_folder("group")).unwrap();
    let body = sprite.add_layer(group, Layer::new_image("body")).unwrap();
    let inner = sprite.add_layer(group, Layer::new_folder("inner")).unwrap();
    let eyes = sprite.add_layer(inner, Layer::new_image(vec![b'e', 0xFF, b's'])).unwrap();
    let top = sprite.add_layer(root, Layer::new_image("top")).unwrap();

    sprite.layer_mut(body).unwrap().set_flags(3);
    sprite.layer_mut(top).unwrap().set_blend_mode(BlendMode(7));
    sprite.layer_mut(group).unwrap().set_flags(1);

    let mut place = |sprite: &mut Sprite, layer: LayerId, frame: usize, x: i16, y: i16| {
        let w = rng.generate_range(1_usize..=width);
        let h = rng.generate_range(1_usize..=height);
        let image = random_image(rng, format, w, h);
        let opacity = rng.generate::<u8>();

        sprite
            .set_cel(layer, frame, Cel::new(x, y, opacity, Some(image)))
            .unwrap();
    };

    for frame in 0..4 {
        place(&mut sprite, background, frame, 0, 0);
    }
    place(&mut sprite, body, 0, -4, 2);
    place(&mut sprite, body, 2, 100, -100);
    place(&mut sprite, eyes, 1, 3, 3);
    place(&mut sprite, top, 3, i16::MIN, i16::MAX);

    sprite
        .set_cel(eyes, 3, Cel::new(1, 1, 255, None))
        .unwrap();

    if format == PixelFormat::Indexed {
        sprite.set_transparent_index(3);

        let mut first = sprite.palette(0).clone();
        for i in 0..16 {
            first.set_entry(i, Color::rgb(i as u8 * 16, 255 - i as u8, 7)).unwrap();
        }
        sprite.set_palette(first.clone());

        let mut second = first;
        second.set_frame(2);
        second.set_entry(20, Color::rgb(1, 2, 3)).unwrap();
        sprite.set_palette(second);
    }
    sprite
}

#[test]
fn round_trip_every_format() {
    let mut rng = WyRand::new_seed(0x5EED);

    for format in [PixelFormat::Rgb, PixelFormat::Grayscale, PixelFormat::Indexed] {
        let sprite = build_sprite(&mut rng, format);

        for effort in [0, 1, 6, 9] {
            let options = EncoderOptions::default().set_effort(effort);
            let decoded = decode(&encode(&sprite, options));

            assert_eq!(decoded, sprite, "{format:?} at effort {effort}");
        }
    }
}

#[test]
fn raw_cels_are_larger() {
    let mut rng = WyRand::new_seed(7);
    let mut sprite = Sprite::new(PixelFormat::Rgb, 64, 64, 1);
    let layer = sprite
        .add_layer(sprite.root(), Layer::new_image("flat"))
        .unwrap();

    // a single repeated color compresses well
    let mut image = Image::new(PixelFormat::Rgb, 64, 64);
    for pixel in image.pixels_mut().chunks_exact_mut(4) {
        pixel.copy_from_slice(&[10, 20, 30, 255]);
    }
    sprite.set_cel(layer, 0, Cel::new(0, 0, 255, Some(image))).unwrap();

    let raw = encode(&sprite, EncoderOptions::default().set_effort(0));
    let compressed = encode(&sprite, EncoderOptions::default());

    assert!(raw.len() > 64 * 64 * 4);
    assert!(compressed.len() < raw.len() / 4);
    assert_eq!(decode(&raw), decode(&compressed));

    // noise still survives
    let noise = random_image(&mut rng, PixelFormat::Rgb, 64, 64);
    sprite.set_cel(layer, 0, Cel::new(0, 0, 255, Some(noise))).unwrap();
    assert_eq!(decode(&encode(&sprite, EncoderOptions::default())), sprite);
}

#[test]
fn layer_depths_survive() {
    let mut sprite = Sprite::new(PixelFormat::Grayscale, 4, 4, 1);
    let root = sprite.root();

    // a
    // f1
    //   f2
    //     f3
    //       b
    //   c
    // d
    sprite.add_layer(root, Layer::new_image("a")).unwrap();
    let f1 = sprite.add_layer(root, Layer::new_folder("f1")).unwrap();
    let f2 = sprite.add_layer(f1, Layer::new_folder("f2")).unwrap();
    let f3 = sprite.add_layer(f2, Layer::new_folder("f3")).unwrap();
    sprite.add_layer(f3, Layer::new_image("b")).unwrap();
    sprite.add_layer(f1, Layer::new_image("c")).unwrap();
    sprite.add_layer(root, Layer::new_image("d")).unwrap();

    let decoded = decode(&encode(&sprite, EncoderOptions::default()));

    let describe = |sprite: &Sprite| -> Vec<(Vec<u8>, u16)> {
        sprite
            .layer_indices()
            .into_iter()
            .map(|id| {
                let layer = sprite.layer(id).unwrap();
                (layer.name().to_vec(), sprite.depth(id).unwrap())
            })
            .collect()
    };
    assert_eq!(describe(&decoded), describe(&sprite));
    assert_eq!(
        describe(&decoded)
            .iter()
            .map(|(_, depth)| *depth)
            .collect::<Vec<_>>(),
        [0, 0, 1, 2, 3, 1, 0]
    );
}

#[test]
fn palette_changes_only_where_they_happen() {
    let mut sprite = Sprite::new(PixelFormat::Indexed, 2, 2, 8);
    sprite.set_frame_count(5);

    for frame in [1, 3] {
        let mut palette = sprite.palette(frame).clone();
        palette.set_entry(frame, Color::rgb(200, 100, frame as u8)).unwrap();
        palette.set_frame(frame);
        sprite.set_palette(palette);
    }
    let decoded = decode(&encode(&sprite, EncoderOptions::default()));

    let starts: Vec<usize> = decoded.palettes().iter().map(|p| p.frame()).collect();
    assert_eq!(starts, [0, 1, 3]);

    for frame in 0..5 {
        assert_eq!(decoded.palette(frame).colors(), sprite.palette(frame).colors());
    }
    assert_eq!(decoded, sprite);
}

#[test]
fn full_palette_round_trips() {
    let mut sprite = Sprite::new(PixelFormat::Indexed, 1, 1, 256);
    let mut palette = sprite.palette(0).clone();

    for i in 0..256 {
        palette.set_entry(i, Color::rgb(i as u8, 0, 255 - i as u8)).unwrap();
    }
    sprite.set_palette(palette);

    let bytes = encode(&sprite, EncoderOptions::default());
    // written verbatim, readers map 0 to 256 for older files
    assert_eq!(&bytes[32..34], &256_u16.to_le_bytes());
    assert_eq!(decode(&bytes), sprite);
}

/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::io::Cursor;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use nanorand::{Rng, WyRand};
use zune_ase::zune_core::bytestream::ZCursor;
use zune_ase::zune_core::options::EncoderOptions;
use zune_ase::{AseDecoder, AseEncoder, Cel, Image, Layer, PixelFormat, Sprite};

/// A 256x256 RGBA sprite with eight frames of noise on two layers
fn make_sprite() -> Sprite {
    let (width, height) = (256, 256);
    let mut rng = WyRand::new_seed(42);

    let mut sprite = Sprite::new(PixelFormat::Rgb, width, height, 1);
    sprite.set_frame_count(8);

    let root = sprite.root();
    let layers = [
        sprite.add_layer(root, Layer::new_image("back")).unwrap(),
        sprite.add_layer(root, Layer::new_image("front")).unwrap()
    ];
    for frame in 0..8 {
        for layer in layers {
            let mut pixels = vec![0_u8; width * height * 4];
            // runs of noise, mostly compressible
            for run in pixels.chunks_mut(64) {
                let value = rng.generate::<u8>();
                run.fill(value);
            }
            let image = Image::from_pixels(PixelFormat::Rgb, width, height, pixels).unwrap();
            sprite
                .set_cel(layer, frame, Cel::new(0, 0, 255, Some(image)))
                .unwrap();
        }
    }
    sprite
}

fn encode(sprite: &Sprite, options: EncoderOptions) -> Vec<u8> {
    let mut output = Cursor::new(Vec::new());
    AseEncoder::new_with_options(sprite, options)
        .encode(&mut output)
        .unwrap();
    output.into_inner()
}

fn decode(data: &[u8]) -> Sprite {
    AseDecoder::new(ZCursor::new(data)).decode().unwrap()
}

fn bench_roundtrip(c: &mut Criterion) {
    let sprite = make_sprite();
    let raw_size = (256 * 256 * 4 * 2 * 8) as u64;

    let mut group = c.benchmark_group("ase: Sprite encode");
    group.throughput(Throughput::Bytes(raw_size));

    for effort in [0, 1, 6] {
        let options = EncoderOptions::default().set_effort(effort);

        group.bench_function(format!("effort {effort}"), |b| {
            b.iter(|| black_box(encode(&sprite, options)))
        });
    }
    group.finish();

    let data = encode(&sprite, EncoderOptions::default());
    let mut group = c.benchmark_group("ase: Sprite decode");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("zune-ase", |b| {
        b.iter(|| black_box(decode(data.as_slice())))
    });
}

criterion_group!(name=benches;
      config={
      let c = Criterion::default();
        c.measurement_time(Duration::from_secs(20))
      };
    targets=bench_roundtrip);

criterion_main!(benches);

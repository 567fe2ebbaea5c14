/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Decoding and encoding of `.ase` layered, animated sprites
//!
//! An `.ase` file is a 128 byte header followed by one record per frame, each
//! frame holding a list of chunks. Chunks describe palettes, the layer tree and
//! cels, which place an image on a layer for a given frame.
//!
//! The crate reads such files into a [`Sprite`] and writes sprites back.
//!
//! # Features
//! - Decoding and encoding of RGBA, grayscale with alpha and indexed sprites
//! - Raw, linked and zlib compressed cels
//! - Both historical palette chunk encodings
//! - Tolerant decoding: malformed chunks are skipped and reported,
//!   or rejected in strict mode
//! - Progress reporting and cancellation
//!
//! ## Features flags
//! - `log`: Log header information and skipped chunks via the `log` crate
//! - `serde`: Serialize a [`SpriteInfo`] summary of a sprite
//!
//! # Example
//! ```
//! use std::io::Cursor;
//!
//! use zune_ase::zune_core::bytestream::ZCursor;
//! use zune_ase::{AseDecoder, AseEncoder, Cel, Image, Layer, PixelFormat, Sprite};
//!
//! let mut sprite = Sprite::new(PixelFormat::Indexed, 2, 2, 4);
//! let layer = sprite.add_layer(sprite.root(), Layer::new_image("Layer 1")).unwrap();
//!
//! let image = Image::from_pixels(PixelFormat::Indexed, 2, 2, vec![1, 2, 3, 0]).unwrap();
//! sprite.set_cel(layer, 0, Cel::new(0, 0, 255, Some(image))).unwrap();
//!
//! let mut output = Cursor::new(Vec::new());
//! AseEncoder::new(&sprite).encode(&mut output).unwrap();
//!
//! let mut decoder = AseDecoder::new(ZCursor::new(output.into_inner()));
//! let decoded = decoder.decode().unwrap();
//!
//! assert_eq!(decoded, sprite);
//! ```
pub use chunks::mask::Mask;
pub use decoder::*;
pub use encoder::*;
pub use errors::*;
pub use image::{Image, PixelFormat};
pub use palette::{Color, Palette};
pub use sprite::{BlendMode, Cel, Layer, LayerId, LayerKind, Sprite, SpriteInfo};
pub use zune_core;

mod chunks;
mod compress;
mod constants;
mod decoder;
mod encoder;
mod errors;
mod headers;
mod image;
mod palette;
mod pixel;
mod serde;
mod sprite;

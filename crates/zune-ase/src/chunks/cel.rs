/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Cel chunks
//!
//! A cel is stored as raw pixels, as a link to the cel of an earlier frame on
//! the same layer, or as a zlib stream. Links are resolved into copies on load.
use zune_core::bytestream::{ZByteReaderTrait, ZByteWriterTrait, ZReader, ZWriter};

use crate::chunks::layer::LayerTreeBuilder;
use crate::chunks::{ChunkType, ChunkWriter};
use crate::compress::{read_compressed_image, write_compressed_image};
use crate::constants::{CEL_COMPRESSED, CEL_LINK, CEL_RAW, MAX_INFLATE_RATIO};
use crate::errors::{AseEncodeErrors, ChunkErrors, ChunkFault, CompressionError};
use crate::image::{Image, PixelFormat};
use crate::pixel::{GrayscaleIo, IndexedIo, PixelIo, RgbIo};
use crate::sprite::{Cel, LayerId, Sprite};

/// A cel read from a chunk, ready to be placed in the sprite
pub(crate) struct DecodedCel {
    pub layer: LayerId,
    pub cel:   Cel,
    /// A problem that left the cel without pixels but did not drop it
    pub error: Option<ChunkErrors>
}

/// Limits and context for reading cels of a frame
pub(crate) struct CelContext<'a> {
    pub sprite:     &'a Sprite,
    pub layers:     &'a LayerTreeBuilder,
    pub frame:      usize,
    pub max_width:  usize,
    pub max_height: usize
}

pub(crate) fn read_cel_chunk<T: ZByteReaderTrait>(
    reader: &mut ZReader<T>, context: &CelContext, chunk_end: u64
) -> Result<DecodedCel, ChunkFault> {
    let frame = context.frame;

    let index = reader.get_u16_le_err()?;
    let x = reader.get_i16_le_err()?;
    let y = reader.get_i16_le_err()?;
    let opacity = reader.get_u8_err()?;
    let cel_type = reader.get_u16_le_err()?;
    reader.skip(7)?;

    let layer_id = context
        .layers
        .layer_at(usize::from(index))
        .ok_or(ChunkErrors::UnknownLayerIndex { frame, index })?;

    let layer = context
        .sprite
        .layer(layer_id)
        .ok_or(ChunkErrors::UnknownLayerIndex { frame, index })?;

    if !layer.is_image() {
        return Err(ChunkErrors::NotAnImageLayer { frame, index }.into());
    }
    let format = context.sprite.pixel_format();
    let mut error = None;

    let image = match cel_type {
        CEL_RAW => match read_dimensions(reader, context)? {
            Some((width, height)) => {
                let size = width * height * format.bytes_per_pixel();

                if reader.position()? + size as u64 > chunk_end {
                    return Err(ChunkErrors::CelPastChunkEnd { frame }.into());
                }
                let mut image = Image::new(format, width, height);

                match format {
                    PixelFormat::Rgb => read_raw_image::<RgbIo, T>(reader, &mut image)?,
                    PixelFormat::Grayscale => read_raw_image::<GrayscaleIo, T>(reader, &mut image)?,
                    PixelFormat::Indexed => read_raw_image::<IndexedIo, T>(reader, &mut image)?
                }
                Some(image)
            }
            None => None
        },
        CEL_LINK => {
            let link_frame = reader.get_u16_le_err()?;
            let linked = layer
                .cel(usize::from(link_frame))
                .ok_or(ChunkErrors::DanglingLink { frame, link_frame })?;
            // an owned copy, links never share pixels
            linked.image.clone()
        }
        CEL_COMPRESSED => match read_dimensions(reader, context)? {
            Some((width, height)) => {
                let size = width * height * format.bytes_per_pixel();
                let available = chunk_end.saturating_sub(reader.position()?);

                if size as u64 > available.saturating_mul(MAX_INFLATE_RATIO) {
                    let err = CompressionError::TooFewBytes { size, available };

                    return Ok(DecodedCel {
                        layer: layer_id,
                        cel:   Cel::new(x, y, opacity, None),
                        error: Some(err.into())
                    });
                }
                let mut image = Image::new(format, width, height);

                let result = match format {
                    PixelFormat::Rgb => read_compressed_image::<RgbIo, T>(reader, &mut image, chunk_end),
                    PixelFormat::Grayscale => {
                        read_compressed_image::<GrayscaleIo, T>(reader, &mut image, chunk_end)
                    }
                    PixelFormat::Indexed => {
                        read_compressed_image::<IndexedIo, T>(reader, &mut image, chunk_end)
                    }
                };
                match result {
                    Ok(()) => Some(image),
                    Err(ChunkFault::Recoverable(err)) => {
                        error = Some(err);
                        None
                    }
                    Err(fatal) => return Err(fatal)
                }
            }
            None => None
        },
        other => return Err(ChunkErrors::UnknownCelType(other).into())
    };

    Ok(DecodedCel {
        layer: layer_id,
        cel: Cel::new(x, y, opacity, image),
        error
    })
}

/// Read cel width and height, `None` when the cel has no pixels
fn read_dimensions<T: ZByteReaderTrait>(
    reader: &mut ZReader<T>, context: &CelContext
) -> Result<Option<(usize, usize)>, ChunkFault> {
    let width = usize::from(reader.get_u16_le_err()?);
    let height = usize::from(reader.get_u16_le_err()?);

    if width == 0 || height == 0 {
        return Ok(None);
    }
    if width > context.max_width || height > context.max_height {
        return Err(ChunkErrors::CelTooLarge {
            frame: context.frame,
            width,
            height
        }
        .into());
    }
    Ok(Some((width, height)))
}

fn read_raw_image<P: PixelIo, T: ZByteReaderTrait>(
    reader: &mut ZReader<T>, image: &mut Image
) -> Result<(), ChunkFault> {
    for y in 0..image.height() {
        for pixel in image.row_mut(y).chunks_exact_mut(P::BYTES_PER_PIXEL) {
            P::read_pixel(reader, pixel)?;
        }
    }
    Ok(())
}

fn write_raw_image<P: PixelIo, T: ZByteWriterTrait>(
    writer: &mut ZWriter<T>, image: &Image
) -> Result<(), AseEncodeErrors> {
    for y in 0..image.height() {
        for pixel in image.row(y).chunks_exact(P::BYTES_PER_PIXEL) {
            P::write_pixel(writer, pixel)?;
        }
    }
    Ok(())
}

/// How pixels of written cels are stored
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum CelStorage {
    Raw,
    /// zlib at the given level
    Compressed(u32)
}

/// Write `cel` as the cel of the layer at `index`
pub(crate) fn write_cel_chunk<T: ZByteWriterTrait>(
    writer: &mut ZWriter<T>, chunks: &mut ChunkWriter, format: PixelFormat, index: u16, cel: &Cel,
    storage: CelStorage
) -> Result<(), AseEncodeErrors> {
    if let Some(image) = &cel.image {
        if image.format() != format {
            return Err(AseEncodeErrors::Generic(
                "Cel image pixel format differs from the sprite pixel format"
            ));
        }
    }
    chunks.start_chunk(writer, ChunkType::Cel)?;

    writer.write_u16_le_err(index)?;
    writer.write_i16_le_err(cel.x)?;
    writer.write_i16_le_err(cel.y)?;
    writer.write_u8_err(cel.opacity)?;
    writer.write_u16_le_err(match storage {
        CelStorage::Raw => CEL_RAW,
        CelStorage::Compressed(_) => CEL_COMPRESSED
    })?;
    writer.write_zeros(7)?;

    match &cel.image {
        Some(image) => {
            let width = u16::try_from(image.width())
                .map_err(|_| AseEncodeErrors::TooLargeDimensions("cel width", image.width()))?;
            let height = u16::try_from(image.height())
                .map_err(|_| AseEncodeErrors::TooLargeDimensions("cel height", image.height()))?;

            writer.write_u16_le_err(width)?;
            writer.write_u16_le_err(height)?;

            // zero sized images carry no pixels
            if width > 0 && height > 0 {
                match (storage, format) {
                    (CelStorage::Raw, PixelFormat::Rgb) => write_raw_image::<RgbIo, T>(writer, image)?,
                    (CelStorage::Raw, PixelFormat::Grayscale) => {
                        write_raw_image::<GrayscaleIo, T>(writer, image)?
                    }
                    (CelStorage::Raw, PixelFormat::Indexed) => {
                        write_raw_image::<IndexedIo, T>(writer, image)?
                    }
                    (CelStorage::Compressed(level), PixelFormat::Rgb) => {
                        write_compressed_image::<RgbIo, T>(writer, image, level)?
                    }
                    (CelStorage::Compressed(level), PixelFormat::Grayscale) => {
                        write_compressed_image::<GrayscaleIo, T>(writer, image, level)?
                    }
                    (CelStorage::Compressed(level), PixelFormat::Indexed) => {
                        write_compressed_image::<IndexedIo, T>(writer, image, level)?
                    }
                }
            }
        }
        None => {
            writer.write_u16_le_err(0)?;
            writer.write_u16_le_err(0)?;
        }
    }
    chunks.close_chunk(writer)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use zune_core::bytestream::ZCursor;

    use super::*;
    use crate::chunks::layer::LayerRecord;
    use crate::chunks::ChunkHeader;
    use crate::constants::{LAYER_FOLDER, LAYER_IMAGE};

    fn sprite_with_layers() -> (Sprite, LayerTreeBuilder) {
        let mut sprite = Sprite::new(PixelFormat::Indexed, 4, 4, 4);
        sprite.set_frame_count(3);
        let mut layers = LayerTreeBuilder::new(&sprite);

        for (kind, name) in [(LAYER_IMAGE, "image"), (LAYER_FOLDER, "folder")] {
            let record = LayerRecord {
                flags: 0,
                kind,
                depth: 0,
                blend_mode: 0,
                name: name.into()
            };
            layers.insert(&mut sprite, record).unwrap();
        }
        (sprite, layers)
    }

    fn cel_chunk(index: u16, cel: &Cel, storage: CelStorage) -> Vec<u8> {
        let mut sink = Cursor::new(Vec::new());
        let mut writer = ZWriter::new(&mut sink);
        let mut chunks = ChunkWriter::new();

        chunks.start_frame(&mut writer, 100).unwrap();
        write_cel_chunk(&mut writer, &mut chunks, PixelFormat::Indexed, index, cel, storage).unwrap();
        chunks.close_frame(&mut writer).unwrap();
        sink.into_inner()
    }

    fn decode(bytes: &[u8], sprite: &Sprite, layers: &LayerTreeBuilder, frame: usize) -> Result<DecodedCel, ChunkFault> {
        let mut reader = ZReader::new(ZCursor::new(bytes));
        reader.set_position(16).unwrap();
        let header = ChunkHeader::read(&mut reader).unwrap();
        let context = CelContext {
            sprite,
            layers,
            frame,
            max_width: 1 << 14,
            max_height: 1 << 14
        };
        read_cel_chunk(&mut reader, &context, header.end())
    }

    fn two_by_two() -> Image {
        Image::from_pixels(PixelFormat::Indexed, 2, 2, vec![1, 2, 3, 0]).unwrap()
    }

    #[test]
    fn raw_and_compressed_cels() {
        let (sprite, layers) = sprite_with_layers();
        let cel = Cel::new(-3, 7, 200, Some(two_by_two()));

        for storage in [CelStorage::Raw, CelStorage::Compressed(6)] {
            let bytes = cel_chunk(0, &cel, storage);
            let decoded = decode(&bytes, &sprite, &layers, 0).unwrap();

            assert_eq!(decoded.cel, cel);
            assert_eq!(Some(decoded.layer), layers.layer_at(0));
            assert!(decoded.error.is_none());
        }
    }

    #[test]
    fn folders_and_unknown_layers_are_rejected() {
        let (sprite, layers) = sprite_with_layers();
        let cel = Cel::new(0, 0, 255, Some(two_by_two()));

        let bytes = cel_chunk(1, &cel, CelStorage::Raw);
        assert!(matches!(
            decode(&bytes, &sprite, &layers, 0),
            Err(ChunkFault::Recoverable(ChunkErrors::NotAnImageLayer { frame: 0, index: 1 }))
        ));
        let bytes = cel_chunk(9, &cel, CelStorage::Raw);
        assert!(matches!(
            decode(&bytes, &sprite, &layers, 2),
            Err(ChunkFault::Recoverable(ChunkErrors::UnknownLayerIndex { frame: 2, index: 9 }))
        ));
    }

    #[test]
    fn links_are_copied() {
        let (mut sprite, layers) = sprite_with_layers();
        let layer = layers.layer_at(0).unwrap();
        sprite
            .set_cel(layer, 0, Cel::new(1, 1, 255, Some(two_by_two())))
            .unwrap();

        // cel type 1 pointing at frame 0
        let mut bytes = vec![0_u8; 16];
        bytes.extend_from_slice(&[24, 0, 0, 0, 0x05, 0x20]);
        bytes.extend_from_slice(&[0, 0, 5, 0, 6, 0, 128, 1, 0]);
        bytes.extend_from_slice(&[0; 7]);
        bytes.extend_from_slice(&[0, 0]);

        let decoded = decode(&bytes, &sprite, &layers, 1).unwrap();
        assert_eq!((decoded.cel.x, decoded.cel.y, decoded.cel.opacity), (5, 6, 128));
        assert_eq!(decoded.cel.image, Some(two_by_two()));

        // a link to a frame without a cel is dropped
        bytes[38] = 2;
        assert!(matches!(
            decode(&bytes, &sprite, &layers, 1),
            Err(ChunkFault::Recoverable(ChunkErrors::DanglingLink { frame: 1, link_frame: 2 }))
        ));
    }

    #[test]
    fn empty_cels_have_no_image() {
        let (sprite, layers) = sprite_with_layers();
        let cel = Cel::new(0, 0, 255, None);
        let bytes = cel_chunk(0, &cel, CelStorage::Compressed(6));

        // prefix + fixed fields + width and height
        assert_eq!(bytes.len(), 16 + 6 + 16 + 4);
        assert_eq!(decode(&bytes, &sprite, &layers, 0).unwrap().cel.image, None);
    }

    #[test]
    fn corrupt_pixels_keep_the_cel() {
        let (sprite, layers) = sprite_with_layers();
        let cel = Cel::new(2, 2, 255, Some(two_by_two()));
        let mut bytes = cel_chunk(0, &cel, CelStorage::Compressed(6));
        // break the zlib header
        bytes[16 + 6 + 16 + 4] = 0xFF;

        let decoded = decode(&bytes, &sprite, &layers, 0).unwrap();
        assert_eq!(decoded.cel.image, None);
        assert_eq!((decoded.cel.x, decoded.cel.y), (2, 2));
        assert!(matches!(decoded.error, Some(ChunkErrors::Compression(_))));
    }

    #[test]
    fn compressed_cel_too_large_for_its_chunk() {
        let (sprite, layers) = sprite_with_layers();

        // a 4096x4096 cel backed by 10 bytes of zlib data
        let mut bytes = vec![0_u8; 16];
        bytes.extend_from_slice(&[36, 0, 0, 0, 0x05, 0x20]);
        bytes.extend_from_slice(&[0, 0, 3, 0, 4, 0, 255, 2, 0]);
        bytes.extend_from_slice(&[0; 7]);
        bytes.extend_from_slice(&[0x00, 0x10, 0x00, 0x10]);
        bytes.extend_from_slice(&[0x78, 0x9C, 1, 2, 3, 4, 5, 6, 7, 8]);

        let decoded = decode(&bytes, &sprite, &layers, 0).unwrap();
        assert_eq!(decoded.cel.image, None);
        assert_eq!((decoded.cel.x, decoded.cel.y), (3, 4));
        assert!(matches!(
            decoded.error,
            Some(ChunkErrors::Compression(CompressionError::TooFewBytes {
                size:      16_777_216,
                available: 10
            }))
        ));
    }
}

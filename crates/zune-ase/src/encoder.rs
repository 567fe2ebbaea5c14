/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::ops::ControlFlow;

use zune_core::bytestream::{ZByteIoError, ZByteWriterTrait, ZWriter};
use zune_core::log::trace;
use zune_core::options::EncoderOptions;

use crate::chunks::cel::{write_cel_chunk, CelStorage};
use crate::chunks::layer::write_layer_chunk;
use crate::chunks::palette::write_palette_chunk;
use crate::chunks::ChunkWriter;
use crate::constants::{ASE_HEADER_SIZE, DEFAULT_FRAME_DURATION};
use crate::decoder::ProgressHandler;
use crate::errors::AseEncodeErrors;
use crate::headers::AseHeader;
use crate::image::PixelFormat;
use crate::sprite::Sprite;

/// An `.ase` sprite encoder
///
/// Every frame gets its own frame record. Frame 0 carries the layer tree,
/// palettes are written on frame 0 and on every frame where the palette changes,
/// cels are zlib compressed at the level given by
/// [`EncoderOptions::get_effort`], an effort of zero stores them uncompressed.
///
/// # Example
/// ```
/// use std::io::Cursor;
///
/// use zune_ase::{AseEncoder, PixelFormat, Sprite};
///
/// let sprite = Sprite::new(PixelFormat::Rgb, 16, 16, 1);
/// let mut output = Cursor::new(Vec::new());
///
/// let written = AseEncoder::new(&sprite).encode(&mut output).unwrap();
/// assert_eq!(written, output.get_ref().len());
/// ```
pub struct AseEncoder<'a> {
    sprite:   &'a Sprite,
    options:  EncoderOptions,
    progress: Option<ProgressHandler>
}

impl<'a> AseEncoder<'a> {
    /// Create an encoder with the default options
    pub fn new(sprite: &'a Sprite) -> AseEncoder<'a> {
        AseEncoder::new_with_options(sprite, EncoderOptions::default())
    }

    pub fn new_with_options(sprite: &'a Sprite, options: EncoderOptions) -> AseEncoder<'a> {
        AseEncoder {
            sprite,
            options,
            progress: None
        }
    }

    /// Install a callback invoked after every frame with the fraction of frames written
    ///
    /// Returning [`ControlFlow::Break`] aborts the encode with [`AseEncodeErrors::Cancelled`].
    pub fn set_progress_handler<F>(&mut self, handler: F)
    where
        F: FnMut(f32) -> ControlFlow<()> + 'static
    {
        self.progress = Some(Box::new(handler));
    }

    /// Encode the sprite into `sink`
    ///
    /// The sink must be seekable, sizes are patched after each frame and chunk
    /// is written.
    ///
    /// # Returns
    /// The number of bytes written
    pub fn encode<T: ZByteWriterTrait>(&mut self, sink: T) -> Result<usize, AseEncodeErrors> {
        let sprite = self.sprite;
        let mut header = AseHeader::from_sprite(sprite)?;

        let format = sprite.pixel_format();
        let storage = match self.options.get_effort() {
            0 => CelStorage::Raw,
            effort => CelStorage::Compressed(u32::from(effort))
        };
        let order = sprite.layer_indices();
        let frames = sprite.frame_count();

        let mut writer = ZWriter::new(sink);
        let mut chunks = ChunkWriter::new();

        let start = writer.position()?;
        // placeholder, patched once the size is known
        writer.write_zeros(ASE_HEADER_SIZE)?;

        for frame in 0..frames {
            let duration = sprite
                .frame_duration(frame)
                .unwrap_or(DEFAULT_FRAME_DURATION);

            chunks.start_frame(&mut writer, duration)?;

            if format == PixelFormat::Indexed {
                let palette = sprite.palette(frame);

                if frame == 0 || palette.count_diff(sprite.palette(frame - 1)) > 0 {
                    trace!("Writing palette for frame {frame}");
                    write_palette_chunk(&mut writer, &mut chunks, palette)?;
                }
            }
            if frame == 0 {
                for id in &order {
                    write_layer_chunk(&mut writer, &mut chunks, sprite, *id)?;
                }
            }
            for (index, id) in order.iter().enumerate() {
                if let Some(cel) = sprite.cel(*id, frame) {
                    let index =
                        u16::try_from(index).map_err(|_| AseEncodeErrors::TooManyLayers(order.len()))?;

                    write_cel_chunk(&mut writer, &mut chunks, format, index, cel, storage)?;
                }
            }
            chunks.close_frame(&mut writer)?;

            if let Some(handler) = self.progress.as_mut() {
                if handler((frame + 1) as f32 / frames as f32).is_break() {
                    trace!("Encoding cancelled after frame {frame}");
                    return Err(AseEncodeErrors::Cancelled);
                }
            }
        }
        let end = writer.position()?;

        header.size = u32::try_from(end - start).map_err(ZByteIoError::from)?;
        writer.set_position(start)?;
        header.write(&mut writer)?;
        writer.set_position(end)?;
        writer.flush()?;

        trace!("Wrote {} bytes", header.size);

        Ok(header.size as usize)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::palette::{Color, Palette};

    fn encode(sprite: &Sprite) -> Vec<u8> {
        let mut sink = Cursor::new(Vec::new());
        AseEncoder::new(sprite).encode(&mut sink).unwrap();
        sink.into_inner()
    }

    #[test]
    fn empty_sprite_layout() {
        let mut sprite = Sprite::new(PixelFormat::Rgb, 8, 8, 1);
        sprite.set_frame_count(2);
        sprite.set_frame_duration(1, 40).unwrap();

        let bytes = encode(&sprite);
        // header and two empty frames
        assert_eq!(bytes.len(), 128 + 16 * 2);
        assert_eq!(&bytes[0..4], &160_u32.to_le_bytes());
        assert_eq!(&bytes[4..6], &[0xE0, 0xA5]);
        assert_eq!(&bytes[128 + 4..128 + 6], &[0xFA, 0xF1]);
        assert_eq!(&bytes[144 + 8..144 + 10], &40_u16.to_le_bytes());
    }

    #[test]
    fn palettes_only_when_changed() {
        let mut sprite = Sprite::new(PixelFormat::Indexed, 2, 2, 4);
        sprite.set_frame_count(3);

        let mut changed = sprite.palette(0).clone();
        changed.set_entry(1, Color::rgb(1, 2, 3)).unwrap();
        changed.set_frame(2);
        sprite.set_palette(changed);

        let bytes = encode(&sprite);
        let chunk_count = |start: usize| u16::from_le_bytes([bytes[start + 6], bytes[start + 7]]);

        let palette_frame = 16 + 6 + 4 + 4 * 3;
        assert_eq!(chunk_count(128), 1);
        assert_eq!(chunk_count(128 + palette_frame), 0);
        assert_eq!(chunk_count(128 + palette_frame + 16), 1);
    }

    #[test]
    fn oversized_palette_is_rejected() {
        let mut sprite = Sprite::new(PixelFormat::Indexed, 2, 2, 4);
        sprite.set_palette(Palette::new(0, 300));
        let mut sink = Cursor::new(Vec::new());
        assert!(matches!(
            AseEncoder::new(&sprite).encode(&mut sink),
            Err(AseEncodeErrors::InvalidPaletteSize(300))
        ));
    }

    #[test]
    fn cancelled_encode() {
        let mut sprite = Sprite::new(PixelFormat::Grayscale, 2, 2, 1);
        sprite.set_frame_count(4);

        let mut encoder = AseEncoder::new(&sprite);
        encoder.set_progress_handler(|fraction| {
            if fraction >= 0.5 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        let mut sink = Cursor::new(Vec::new());
        assert!(matches!(encoder.encode(&mut sink), Err(AseEncodeErrors::Cancelled)));
    }
}

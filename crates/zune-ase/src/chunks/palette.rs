/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Palette chunks
//!
//! Both historical encodings share a layout, a `u16` packet count followed by
//! packets of `(u8 skip, u8 count, count * rgb)`. A count of zero means 256.
//! The scaled variant stores 6 bit components.
use zune_core::bytestream::{ZByteReaderTrait, ZByteWriterTrait, ZReader, ZWriter};

use crate::chunks::{ChunkType, ChunkWriter};
use crate::constants::{MAX_PALETTE_SIZE, RGB_SCALE_6};
use crate::errors::{AseEncodeErrors, ChunkErrors, ChunkFault};
use crate::palette::{Color, Palette};

/// Apply the packets of a palette chunk on top of `base`
///
/// The returned palette starts at `frame`.
pub(crate) fn read_palette_chunk<T: ZByteReaderTrait>(
    reader: &mut ZReader<T>, base: &Palette, frame: usize, scaled: bool
) -> Result<Palette, ChunkFault> {
    let mut palette = base.clone();
    palette.set_frame(frame);

    let packets = reader.get_u16_le_err()?;
    let mut index = 0_usize;

    for _ in 0..packets {
        index += usize::from(reader.get_u8_err()?);

        let count = match reader.get_u8_err()? {
            0 => MAX_PALETTE_SIZE,
            n => usize::from(n)
        };
        for _ in 0..count {
            let [r, g, b] = reader.read_fixed_bytes_or_error::<3>()?;

            let color = if scaled {
                Color::rgb(scale_6(r), scale_6(g), scale_6(b))
            } else {
                Color::rgb(r, g, b)
            };
            palette
                .set_entry(index, color)
                .map_err(|_| ChunkErrors::MalformedPalette(index))?;
            index += 1;
        }
    }
    Ok(palette)
}

fn scale_6(component: u8) -> u8 {
    RGB_SCALE_6[usize::from(component.min(63))]
}

/// Write `palette` as a single packet 8 bit palette chunk
pub(crate) fn write_palette_chunk<T: ZByteWriterTrait>(
    writer: &mut ZWriter<T>, chunks: &mut ChunkWriter, palette: &Palette
) -> Result<(), AseEncodeErrors> {
    let size = palette.len();

    if size == 0 || size > MAX_PALETTE_SIZE {
        return Err(AseEncodeErrors::InvalidPaletteSize(size));
    }
    chunks.start_chunk(writer, ChunkType::Palette)?;

    // one packet, skipping nothing
    writer.write_u16_le_err(1)?;
    writer.write_u8_err(0)?;
    writer.write_u8_err(if size == MAX_PALETTE_SIZE { 0 } else { size as u8 })?;

    for color in palette.colors() {
        writer.write_const_bytes(&[color.r, color.g, color.b])?;
    }
    chunks.close_chunk(writer)
}

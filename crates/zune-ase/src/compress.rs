/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Streaming zlib adapter for compressed cels
//!
//! Reading pulls the compressed stream in bounded pieces so it never
//! crosses the end of the chunk it lives in, whatever the stream claims.
use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};
use zune_core::bytestream::{ZByteReaderTrait, ZByteWriterTrait, ZReader, ZWriter};
use zune_core::log::trace;

use crate::constants::COMPRESSED_BUFFER_SIZE;
use crate::errors::{AseEncodeErrors, ChunkFault, CompressionError};
use crate::image::Image;
use crate::pixel::PixelIo;

/// Inflate the pixels of `image` from the stream, reading no further than `chunk_end`
///
/// Output is unpacked one scanline at a time. Running out of input before the
/// image is full is not an error, rows never reached keep their previous contents.
pub(crate) fn read_compressed_image<P: PixelIo, T: ZByteReaderTrait>(
    reader: &mut ZReader<T>, image: &mut Image, chunk_end: u64
) -> Result<(), ChunkFault> {
    let scanline_size = P::scanline_size(image.width());
    let height = image.height();

    if scanline_size == 0 || height == 0 {
        return Ok(());
    }
    let mut inflater = Decompress::new(true);
    let mut compressed = vec![0; COMPRESSED_BUFFER_SIZE];
    let mut scanline = vec![0; scanline_size];
    // output landing here means the stream holds more than the image
    let mut overflow = [0_u8; 1];
    let mut filled = 0;
    let mut y = 0;

    'input: loop {
        let bytes_read = reader.read_bytes_until(&mut compressed, chunk_end)?;

        if bytes_read == 0 {
            // consumed the whole chunk
            break;
        }
        let mut input = &compressed[..bytes_read];

        loop {
            let output = if y < height {
                &mut scanline[filled..]
            } else {
                &mut overflow[..]
            };
            let room = output.len();

            let in_before = inflater.total_in();
            let out_before = inflater.total_out();

            let status = inflater
                .decompress(input, output, FlushDecompress::None)
                .map_err(|e| CompressionError::Inflate(e.to_string()))?;

            let consumed = (inflater.total_in() - in_before) as usize;
            let produced = (inflater.total_out() - out_before) as usize;

            input = &input[consumed..];

            if y == height {
                if produced > 0 {
                    return Err(CompressionError::BadCompressedImage(scanline_size * height).into());
                }
            } else {
                filled += produced;

                if filled == scanline_size {
                    P::unpack_scanline(&scanline, image.row_mut(y));
                    filled = 0;
                    y += 1;
                }
            }
            if status == Status::StreamEnd {
                break 'input;
            }
            // a full output buffer may hide more pending output
            if input.is_empty() && produced < room {
                break;
            }
            if consumed == 0 && produced == 0 {
                // needs input past what this read returned
                break;
            }
        }
    }
    if filled > 0 {
        scanline[filled..].fill(0);
        P::unpack_scanline(&scanline, image.row_mut(y));
    }
    trace!("Inflated {y} of {height} rows");

    Ok(())
}

/// Deflate `image` row by row into the writer
///
/// `level` is a zlib compression level between 0 and 9
pub(crate) fn write_compressed_image<P: PixelIo, T: ZByteWriterTrait>(
    writer: &mut ZWriter<T>, image: &Image, level: u32
) -> Result<(), AseEncodeErrors> {
    let height = image.height();

    let mut deflater = Compress::new(Compression::new(level), true);
    let mut scanline = vec![0; P::scanline_size(image.width())];
    let mut compressed = vec![0; COMPRESSED_BUFFER_SIZE];

    for y in 0..height {
        P::pack_scanline(image.row(y), &mut scanline);

        let flush = if y == height - 1 {
            FlushCompress::Finish
        } else {
            FlushCompress::None
        };
        let mut input = &scanline[..];

        loop {
            let in_before = deflater.total_in();
            let out_before = deflater.total_out();

            let status = deflater
                .compress(input, &mut compressed, flush)
                .map_err(|e| CompressionError::Deflate(e.to_string()))?;

            let consumed = (deflater.total_in() - in_before) as usize;
            let produced = (deflater.total_out() - out_before) as usize;

            input = &input[consumed..];

            if produced > 0 {
                writer.write_all(&compressed[..produced])?;
            }
            let done = match flush {
                FlushCompress::Finish => status == Status::StreamEnd,
                _ => input.is_empty() && produced < compressed.len()
            };
            if done {
                break;
            }
            if consumed == 0 && produced == 0 {
                return Err(CompressionError::Stalled.into());
            }
        }
    }
    Ok(())
}

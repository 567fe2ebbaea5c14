/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Per pixel format reading, writing and scanline packing
//!
//! Each [`PixelFormat`](crate::PixelFormat) has a zero sized implementor of [`PixelIo`].
//! Callers match on the format once and run a generic routine for the whole
//! image, so the per pixel work is monomorphized.
use zune_core::bytestream::{ZByteIoError, ZByteReaderTrait, ZByteWriterTrait, ZReader, ZWriter};

pub(crate) trait PixelIo {
    const BYTES_PER_PIXEL: usize;

    /// Read one pixel from the stream into `out`
    fn read_pixel<T: ZByteReaderTrait>(
        reader: &mut ZReader<T>, out: &mut [u8]
    ) -> Result<(), ZByteIoError>;

    /// Write one pixel from `pixel` to the stream
    fn write_pixel<T: ZByteWriterTrait>(
        writer: &mut ZWriter<T>, pixel: &[u8]
    ) -> Result<(), ZByteIoError>;

    /// Expand a packed scanline into an image row
    fn unpack_scanline(packed: &[u8], row: &mut [u8]);

    /// Pack an image row into the on disk scanline layout
    fn pack_scanline(row: &[u8], packed: &mut [u8]);

    fn scanline_size(width: usize) -> usize {
        width * Self::BYTES_PER_PIXEL
    }
}

/// `r, g, b, a`
pub(crate) struct RgbIo;

/// `value, alpha`
pub(crate) struct GrayscaleIo;

/// Palette index
pub(crate) struct IndexedIo;

impl PixelIo for RgbIo {
    const BYTES_PER_PIXEL: usize = 4;

    fn read_pixel<T: ZByteReaderTrait>(
        reader: &mut ZReader<T>, out: &mut [u8]
    ) -> Result<(), ZByteIoError> {
        let [r, g, b, a] = reader.read_fixed_bytes_or_error::<4>()?;

        out[0] = r;
        out[1] = g;
        out[2] = b;
        out[3] = a;
        Ok(())
    }

    fn write_pixel<T: ZByteWriterTrait>(
        writer: &mut ZWriter<T>, pixel: &[u8]
    ) -> Result<(), ZByteIoError> {
        writer.write_const_bytes(&[pixel[0], pixel[1], pixel[2], pixel[3]])
    }

    fn unpack_scanline(packed: &[u8], row: &mut [u8]) {
        for (src, dst) in packed.chunks_exact(4).zip(row.chunks_exact_mut(4)) {
            let (r, g, b, a) = (src[0], src[1], src[2], src[3]);
            dst.copy_from_slice(&[r, g, b, a]);
        }
    }

    fn pack_scanline(row: &[u8], packed: &mut [u8]) {
        for (src, dst) in row.chunks_exact(4).zip(packed.chunks_exact_mut(4)) {
            let (r, g, b, a) = (src[0], src[1], src[2], src[3]);
            dst.copy_from_slice(&[r, g, b, a]);
        }
    }
}

impl PixelIo for GrayscaleIo {
    const BYTES_PER_PIXEL: usize = 2;

    fn read_pixel<T: ZByteReaderTrait>(
        reader: &mut ZReader<T>, out: &mut [u8]
    ) -> Result<(), ZByteIoError> {
        let [value, alpha] = reader.read_fixed_bytes_or_error::<2>()?;

        out[0] = value;
        out[1] = alpha;
        Ok(())
    }

    fn write_pixel<T: ZByteWriterTrait>(
        writer: &mut ZWriter<T>, pixel: &[u8]
    ) -> Result<(), ZByteIoError> {
        writer.write_const_bytes(&[pixel[0], pixel[1]])
    }

    fn unpack_scanline(packed: &[u8], row: &mut [u8]) {
        for (src, dst) in packed.chunks_exact(2).zip(row.chunks_exact_mut(2)) {
            let (value, alpha) = (src[0], src[1]);
            dst.copy_from_slice(&[value, alpha]);
        }
    }

    fn pack_scanline(row: &[u8], packed: &mut [u8]) {
        for (src, dst) in row.chunks_exact(2).zip(packed.chunks_exact_mut(2)) {
            let (value, alpha) = (src[0], src[1]);
            dst.copy_from_slice(&[value, alpha]);
        }
    }
}

impl PixelIo for IndexedIo {
    const BYTES_PER_PIXEL: usize = 1;

    fn read_pixel<T: ZByteReaderTrait>(
        reader: &mut ZReader<T>, out: &mut [u8]
    ) -> Result<(), ZByteIoError> {
        out[0] = reader.get_u8_err()?;
        Ok(())
    }

    fn write_pixel<T: ZByteWriterTrait>(
        writer: &mut ZWriter<T>, pixel: &[u8]
    ) -> Result<(), ZByteIoError> {
        writer.write_u8_err(pixel[0])
    }

    fn unpack_scanline(packed: &[u8], row: &mut [u8]) {
        row.copy_from_slice(&packed[..row.len()]);
    }

    fn pack_scanline(row: &[u8], packed: &mut [u8]) {
        packed[..row.len()].copy_from_slice(row);
    }
}

#[cfg(test)]
mod tests {
    use zune_core::bytestream::ZCursor;

    use super::*;

    #[test]
    fn read_rgb_pixels() {
        let mut reader = ZReader::new(ZCursor::new([10, 20, 30, 40, 1, 2]));
        let mut pixel = [0; 4];

        RgbIo::read_pixel(&mut reader, &mut pixel).unwrap();
        assert_eq!(pixel, [10, 20, 30, 40]);
        // two bytes left, not enough for another pixel
        assert!(RgbIo::read_pixel(&mut reader, &mut pixel).is_err());
    }

    #[test]
    fn grayscale_scanline() {
        let row = [1, 255, 2, 128, 3, 0];
        let mut packed = [0; 6];
        let mut unpacked = [0; 6];

        assert_eq!(GrayscaleIo::scanline_size(3), 6);
        GrayscaleIo::pack_scanline(&row, &mut packed);
        GrayscaleIo::unpack_scanline(&packed, &mut unpacked);
        assert_eq!(unpacked, row);
    }

    #[test]
    fn write_indexed_pixels() {
        let mut sink = std::io::Cursor::new(Vec::new());
        let mut writer = ZWriter::new(&mut sink);

        for index in [7_u8, 0, 255] {
            IndexedIo::write_pixel(&mut writer, &[index]).unwrap();
        }
        assert_eq!(writer.bytes_written(), 3);
        assert_eq!(sink.into_inner(), [7, 0, 255]);
    }
}

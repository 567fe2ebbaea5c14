/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Mask chunks
//!
//! Masks are parsed so their chunks can be validated and traced, the
//! sprite does not keep them.
use zune_core::bytestream::{ZByteReaderTrait, ZReader};

use crate::chunks::read_string;
use crate::constants::CHUNK_MASK;
use crate::errors::{ChunkErrors, ChunkFault};

/// A named selection bitmap
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mask {
    x:      i16,
    y:      i16,
    width:  usize,
    height: usize,
    name:   Vec<u8>,
    // one byte per pixel, 0 or 1
    bitmap: Vec<u8>
}

impl Mask {
    /// Return `(x, y, width, height)`
    pub const fn bounds(&self) -> (i16, i16, usize, usize) {
        (self.x, self.y, self.width, self.height)
    }
    pub fn name(&self) -> &[u8] {
        &self.name
    }
    /// Whether the pixel at `(x, y)` relative to the mask bounds is selected
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bitmap[y * self.width + x] != 0
    }
}

/// Read a mask chunk whose bitmap rows are packed 8 pixels per byte, MSB first
///
/// `reader` must end where the chunk ends, the bitmap size is checked
/// against it before anything is allocated.
pub(crate) fn read_mask_chunk<T: ZByteReaderTrait>(reader: &mut ZReader<T>) -> Result<Mask, ChunkFault> {
    let x = reader.get_i16_le_err()?;
    let y = reader.get_i16_le_err()?;
    let width = usize::from(reader.get_u16_le_err()?);
    let height = usize::from(reader.get_u16_le_err()?);
    reader.skip(8)?;
    let name = read_string(reader)?;

    let stride = width.div_ceil(8);

    if (stride * height) as u64 > reader.remaining()? {
        return Err(ChunkErrors::ChunkOverrun(CHUNK_MASK).into());
    }
    let mut packed = vec![0; stride];
    let mut bitmap = vec![0; width * height];

    for row in bitmap.chunks_exact_mut(width.max(1)).take(height) {
        reader.read_exact_bytes(&mut packed)?;

        for (u, pixel) in row.iter_mut().enumerate() {
            *pixel = (packed[u / 8] >> (7 - (u % 8))) & 1;
        }
    }
    Ok(Mask {
        x,
        y,
        width,
        height,
        name,
        bitmap
    })
}

#[cfg(test)]
mod tests {
    use zune_core::bytestream::ZCursor;

    use super::*;

    #[test]
    fn unpacks_msb_first() {
        let mut payload = vec![];
        payload.extend_from_slice(&(-2_i16).to_le_bytes());
        payload.extend_from_slice(&3_i16.to_le_bytes());
        payload.extend_from_slice(&10_u16.to_le_bytes());
        payload.extend_from_slice(&2_u16.to_le_bytes());
        payload.extend_from_slice(&[0; 8]);
        payload.extend_from_slice(&[3, 0, b's', b'e', b'l']);
        // 10 pixels wide, two bytes per row
        payload.extend_from_slice(&[0b1000_0001, 0b0100_0000]);
        payload.extend_from_slice(&[0b0000_0000, 0b1000_0000]);

        let mut reader = ZReader::new(ZCursor::new(&payload));
        let mask = read_mask_chunk(&mut reader).unwrap();

        assert_eq!(mask.bounds(), (-2, 3, 10, 2));
        assert_eq!(mask.name(), b"sel");
        assert!(mask.contains(0, 0));
        assert!(mask.contains(7, 0));
        assert!(mask.contains(9, 0));
        assert!(!mask.contains(8, 0));
        assert!(mask.contains(8, 1));
        assert!(!mask.contains(10, 1));
        assert!(reader.eof().unwrap());
    }

    #[test]
    fn bitmap_larger_than_the_chunk() {
        let mut payload = vec![];
        payload.extend_from_slice(&[0; 4]);
        payload.extend_from_slice(&u16::MAX.to_le_bytes());
        payload.extend_from_slice(&u16::MAX.to_le_bytes());
        payload.extend_from_slice(&[0; 8]);
        payload.extend_from_slice(&[0, 0]);
        payload.extend_from_slice(&[0xFF; 16]);

        let mut reader = ZReader::new(ZCursor::new(&payload));

        assert!(matches!(
            read_mask_chunk(&mut reader),
            Err(ChunkFault::Recoverable(ChunkErrors::ChunkOverrun(CHUNK_MASK)))
        ));
    }
}

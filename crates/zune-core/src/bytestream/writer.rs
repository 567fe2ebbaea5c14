/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use crate::bytestream::{ZByteIoError, ZByteWriterTrait, ZSeekFrom};

mod std_writer;

/// Encapsulates a simple Byte writer with
/// support for Endian aware writes and seeking
///
/// Seeking is what allows container formats to reserve space for a
/// size prefix, write the payload and come back to fill the prefix in.
pub struct ZWriter<T: ZByteWriterTrait> {
    buffer:        T,
    bytes_written: usize
}

impl<T: ZByteWriterTrait> ZWriter<T> {
    /// Create a new writer for the stream
    pub fn new(data: T) -> ZWriter<T> {
        ZWriter {
            buffer:        data,
            bytes_written: 0
        }
    }
    /// Return the number of bytes the writer has written
    ///
    /// Bytes rewritten after seeking back are counted again.
    pub const fn bytes_written(&self) -> usize {
        self.bytes_written
    }
    /// Current absolute position of the sink
    pub fn position(&mut self) -> Result<u64, ZByteIoError> {
        self.buffer.z_position()
    }
    /// Move the write cursor to an absolute position
    pub fn set_position(&mut self, position: u64) -> Result<(), ZByteIoError> {
        self.buffer.z_seek(ZSeekFrom::Start(position))?;
        Ok(())
    }

    /// Write bytes from buf into the sink
    pub fn write_all(&mut self, buf: &[u8]) -> Result<(), ZByteIoError> {
        self.buffer.write_all_bytes(buf)?;
        self.bytes_written += buf.len();
        Ok(())
    }
    /// Write a fixed compile time known number of bytes to the sink
    #[inline(always)]
    pub fn write_const_bytes<const N: usize>(&mut self, byte: &[u8; N]) -> Result<(), ZByteIoError> {
        self.buffer.write_const_bytes(byte)?;
        self.bytes_written += N;
        Ok(())
    }
    /// Write a single byte into the sink
    pub fn write_u8_err(&mut self, byte: u8) -> Result<(), ZByteIoError> {
        self.write_const_bytes(&[byte])
    }
    /// Write `num` zero bytes, used for reserved and padding fields
    pub fn write_zeros(&mut self, num: usize) -> Result<(), ZByteIoError> {
        const ZEROS: [u8; 32] = [0; 32];

        let mut left = num;
        while left > 0 {
            let take = left.min(ZEROS.len());
            self.write_all(&ZEROS[..take])?;
            left -= take;
        }
        Ok(())
    }
    /// Ensure bytes are written to the sink
    pub fn flush(&mut self) -> Result<(), ZByteIoError> {
        self.buffer.flush_bytes()
    }
}

macro_rules! write_single_type {
    ($name:tt,$int_type:tt) => {
        impl<T: ZByteWriterTrait> ZWriter<T> {
            #[doc=concat!("Write ",stringify!($int_type)," as a little endian integer")]
            #[doc=concat!("Returning an error if the underlying sink cannot support a ",stringify!($int_type)," write.")]
            #[inline]
            pub fn $name(&mut self, byte: $int_type) -> Result<(), ZByteIoError> {
                self.write_const_bytes(&byte.to_le_bytes())
            }
        }
    };
}

write_single_type!(write_u32_le_err, u32);
write_single_type!(write_u16_le_err, u16);
write_single_type!(write_i16_le_err, i16);

#[cfg(all(test, feature = "std"))]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn backpatch_size_prefix() {
        let mut sink = Cursor::new(Vec::new());
        let mut writer = ZWriter::new(&mut sink);

        let start = writer.position().unwrap();
        writer.write_zeros(4).unwrap();
        writer.write_u16_le_err(0xF1FA).unwrap();
        writer.write_i16_le_err(-3).unwrap();
        let end = writer.position().unwrap();

        writer.set_position(start).unwrap();
        writer.write_u32_le_err((end - start) as u32).unwrap();
        writer.set_position(end).unwrap();
        writer.write_u8_err(7).unwrap();

        assert_eq!(
            sink.into_inner(),
            [8, 0, 0, 0, 0xFA, 0xF1, 0xFD, 0xFF, 7]
        );
    }
}

#![cfg(feature = "std")]
use std::io::{Seek, Write};

use crate::bytestream::{ZByteIoError, ZByteWriterTrait, ZSeekFrom};

// Any seekable std sink works, `Cursor<Vec<u8>>`, `File`, `BufWriter<File>`
// and mutable references to them included.
impl<T: Write + Seek> ZByteWriterTrait for T {
    fn write_all_bytes(&mut self, buf: &[u8]) -> Result<(), ZByteIoError> {
        self.write_all(buf).map_err(ZByteIoError::StdIoError)
    }

    fn write_const_bytes<const N: usize>(&mut self, buf: &[u8; N]) -> Result<(), ZByteIoError> {
        self.write_all_bytes(buf)
    }

    fn flush_bytes(&mut self) -> Result<(), ZByteIoError> {
        self.flush().map_err(ZByteIoError::StdIoError)
    }

    fn z_seek(&mut self, from: ZSeekFrom) -> Result<u64, ZByteIoError> {
        self.seek(from.to_std_seek()).map_err(ZByteIoError::StdIoError)
    }

    fn z_position(&mut self) -> Result<u64, ZByteIoError> {
        self.stream_position().map_err(ZByteIoError::StdIoError)
    }
}

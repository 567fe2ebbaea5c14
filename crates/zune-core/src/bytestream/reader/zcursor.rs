use crate::bytestream::{ZByteIoError, ZByteReaderTrait, ZSeekFrom};

/// A cursor over an in-memory buffer
///
/// This is the preferred reader for data already in memory, reads are
/// simple slice copies and never fail partially.
pub struct ZCursor<T: AsRef<[u8]>> {
    stream:   T,
    position: usize
}

impl<T: AsRef<[u8]>> ZCursor<T> {
    pub fn new(buffer: T) -> ZCursor<T> {
        ZCursor {
            stream:   buffer,
            position: 0
        }
    }
    fn len(&self) -> usize {
        self.stream.as_ref().len()
    }
}

impl<T: AsRef<[u8]>> ZByteReaderTrait for ZCursor<T> {
    #[inline(always)]
    fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ZByteIoError> {
        let end = self.position.saturating_add(buf.len());

        match self.stream.as_ref().get(self.position..end) {
            Some(bytes) => {
                buf.copy_from_slice(bytes);
                self.position = end;
                Ok(())
            }
            None => Err(ZByteIoError::NotEnoughBytes(
                buf.len(),
                self.len().saturating_sub(self.position)
            ))
        }
    }

    #[inline(always)]
    fn read_const_bytes<const N: usize>(&mut self, buf: &mut [u8; N]) -> Result<(), ZByteIoError> {
        self.read_exact_bytes(buf)
    }

    #[inline(always)]
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, ZByteIoError> {
        let start = self.position.min(self.len());
        let end = self.position.saturating_add(buf.len()).min(self.len());
        let bytes = &self.stream.as_ref()[start..end];

        buf[..bytes.len()].copy_from_slice(bytes);
        self.position = end;

        Ok(end - start)
    }

    #[inline(always)]
    fn z_seek(&mut self, from: ZSeekFrom) -> Result<u64, ZByteIoError> {
        let new_position = match from {
            ZSeekFrom::Start(position) => i64::try_from(position)?,
            ZSeekFrom::End(position) => i64::try_from(self.len())? + position,
            ZSeekFrom::Current(position) => i64::try_from(self.position)? + position
        };
        if new_position < 0 {
            return Err(ZByteIoError::SeekError("Seeking before the start of the stream"));
        }
        self.position = usize::try_from(new_position)?;

        Ok(self.position as u64)
    }

    #[inline(always)]
    fn is_eof(&mut self) -> Result<bool, ZByteIoError> {
        Ok(self.position >= self.len())
    }

    #[inline(always)]
    fn z_position(&mut self) -> Result<u64, ZByteIoError> {
        Ok(self.position as u64)
    }

    #[inline(always)]
    fn z_size(&mut self) -> Result<u64, ZByteIoError> {
        Ok(self.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_past_end_reads_nothing() {
        let data = [1_u8, 2, 3];
        let mut cursor = ZCursor::new(&data[..]);
        let mut buf = [0; 2];

        assert_eq!(cursor.z_seek(ZSeekFrom::Start(10)).unwrap(), 10);
        assert_eq!(cursor.read_bytes(&mut buf).unwrap(), 0);
        assert!(cursor.read_exact_bytes(&mut buf).is_err());
        assert!(cursor.z_seek(ZSeekFrom::Current(-11)).is_err());
    }

    #[test]
    fn partial_read_returns_count() {
        let data = [1_u8, 2, 3];
        let mut cursor = ZCursor::new(&data[..]);
        let mut buf = [0; 8];

        cursor.z_seek(ZSeekFrom::Start(1)).unwrap();
        assert_eq!(cursor.read_bytes(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[2, 3]);
        assert!(cursor.is_eof().unwrap());
    }
}

use alloc::string::String;
use core::fmt::Formatter;

pub(crate) mod std_readers;
pub(crate) mod zcursor;
use crate::bytestream::ZByteReaderTrait;

/// Enumeration of possible methods to seek within an I/O object.
///
/// It is analogous to the [SeekFrom](std::io::SeekFrom) in the std library but
/// it's here to allow this to work in no-std crates
#[derive(Copy, PartialEq, Eq, Clone, Debug)]
pub enum ZSeekFrom {
    /// Sets the offset to the provided number of bytes.
    Start(u64),

    /// Sets the offset to the size of this object plus the specified number of
    /// bytes.
    ///
    /// It is possible to seek beyond the end of an object, but it's an error to
    /// seek before byte 0.
    End(i64),

    /// Sets the offset to the current position plus the specified number of
    /// bytes.
    ///
    /// It is possible to seek beyond the end of an object, but it's an error to
    /// seek before byte 0.
    Current(i64)
}

impl ZSeekFrom {
    /// Convert to [SeekFrom](std::io::SeekFrom) from the `std::io` library
    ///
    /// This is only present when std feature is present
    #[cfg(feature = "std")]
    pub(crate) fn to_std_seek(self) -> std::io::SeekFrom {
        match self {
            ZSeekFrom::Start(pos) => std::io::SeekFrom::Start(pos),
            ZSeekFrom::End(pos) => std::io::SeekFrom::End(pos),
            ZSeekFrom::Current(pos) => std::io::SeekFrom::Current(pos)
        }
    }
}

pub enum ZByteIoError {
    #[cfg(feature = "std")]
    StdIoError(std::io::Error),
    TryFromIntError(core::num::TryFromIntError),
    // requested, read
    NotEnoughBytes(usize, usize),
    Generic(&'static str),
    SeekError(&'static str),
    SeekErrorOwned(String)
}

impl core::fmt::Debug for ZByteIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            #[cfg(feature = "std")]
            ZByteIoError::StdIoError(err) => {
                writeln!(f, "Underlying I/O error {}", err)
            }
            ZByteIoError::TryFromIntError(err) => {
                writeln!(f, "Cannot convert to int {}", err)
            }
            ZByteIoError::NotEnoughBytes(expected, found) => {
                writeln!(f, "Not enough bytes, expected {expected} but found {found}")
            }
            ZByteIoError::Generic(err) => {
                writeln!(f, "Generic I/O error: {err}")
            }
            ZByteIoError::SeekError(err) => {
                writeln!(f, "Seek error: {err}")
            }
            ZByteIoError::SeekErrorOwned(err) => {
                writeln!(f, "Seek error {err}")
            }
        }
    }
}

impl core::fmt::Display for ZByteIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ZByteIoError {}

#[cfg(feature = "std")]
impl From<std::io::Error> for ZByteIoError {
    fn from(value: std::io::Error) -> Self {
        ZByteIoError::StdIoError(value)
    }
}

impl From<core::num::TryFromIntError> for ZByteIoError {
    fn from(value: core::num::TryFromIntError) -> Self {
        ZByteIoError::TryFromIntError(value)
    }
}

impl From<&'static str> for ZByteIoError {
    fn from(value: &'static str) -> Self {
        ZByteIoError::Generic(value)
    }
}

/// An endian aware reader over a [`ZByteReaderTrait`] source
pub struct ZReader<T: ZByteReaderTrait> {
    inner: T
}

impl<T: ZByteReaderTrait> ZReader<T> {
    pub fn new(source: T) -> ZReader<T> {
        ZReader { inner: source }
    }
    /// Skip `num` bytes ahead, returning the new position
    #[inline(always)]
    pub fn skip(&mut self, num: usize) -> Result<u64, ZByteIoError> {
        let num = i64::try_from(num)?;
        self.inner.z_seek(ZSeekFrom::Current(num))
    }
    #[inline(always)]
    pub fn seek(&mut self, from: ZSeekFrom) -> Result<u64, ZByteIoError> {
        self.inner.z_seek(from)
    }
    #[inline(always)]
    pub fn get_u8_err(&mut self) -> Result<u8, ZByteIoError> {
        let mut buf = [0];
        self.inner.read_const_bytes(&mut buf)?;
        Ok(buf[0])
    }
    #[inline(always)]
    pub fn read_fixed_bytes_or_error<const N: usize>(&mut self) -> Result<[u8; N], ZByteIoError> {
        let mut byte_store: [u8; N] = [0; N];
        self.inner.read_const_bytes(&mut byte_store)?;
        Ok(byte_store)
    }

    #[inline]
    pub fn set_position(&mut self, position: u64) -> Result<(), ZByteIoError> {
        self.seek(ZSeekFrom::Start(position))?;

        Ok(())
    }

    #[inline(always)]
    pub fn eof(&mut self) -> Result<bool, ZByteIoError> {
        self.inner.is_eof()
    }
    #[inline(always)]
    pub fn position(&mut self) -> Result<u64, ZByteIoError> {
        self.inner.z_position()
    }
    /// Total length of the underlying stream
    #[inline(always)]
    pub fn size(&mut self) -> Result<u64, ZByteIoError> {
        self.inner.z_size()
    }
    /// Number of bytes between the current position and the end of the stream
    pub fn remaining(&mut self) -> Result<u64, ZByteIoError> {
        let size = self.size()?;
        let position = self.position()?;
        Ok(size.saturating_sub(position))
    }

    pub fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ZByteIoError> {
        self.inner.read_exact_bytes(buf)
    }

    /// Read at most `buf.len()` bytes without moving past `limit`
    ///
    /// The read is shortened so the cursor never crosses `limit`, returning the
    /// number of bytes read, zero once the cursor sits at or after `limit`.
    pub fn read_bytes_until(&mut self, buf: &mut [u8], limit: u64) -> Result<usize, ZByteIoError> {
        let position = self.position()?;

        if position >= limit {
            return Ok(0);
        }
        let allowed = usize::try_from(limit - position).unwrap_or(usize::MAX);
        let end = buf.len().min(allowed);

        self.inner.read_bytes(&mut buf[..end])
    }
}

macro_rules! get_single_type {
    ($name:tt,$name2:tt,$int_type:tt) => {
        impl<T:ZByteReaderTrait> ZReader<T>
        {
            #[doc=concat!("Read ",stringify!($int_type)," as a little endian integer")]
            #[doc=concat!("Returning an error if the underlying buffer cannot support a ",stringify!($int_type)," read.")]
            #[inline]
            pub fn $name(&mut self) -> Result<$int_type, ZByteIoError>
            {
                const SIZE_OF_VAL: usize = core::mem::size_of::<$int_type>();

                let mut space = [0; SIZE_OF_VAL];
                self.inner.read_const_bytes(&mut space)?;

                Ok($int_type::from_le_bytes(space))
            }
            #[doc=concat!("Read ",stringify!($int_type)," as a little endian integer")]
            #[doc=concat!("Returning 0 if the underlying buffer does not have enough bytes for a ",stringify!($int_type)," read.")]
            #[inline(always)]
            pub fn $name2(&mut self) -> $int_type
            {
                self.$name().unwrap_or(0)
            }
        }
    };
}

get_single_type!(get_u16_le_err, get_u16_le, u16);
get_single_type!(get_i16_le_err, get_i16_le, i16);
get_single_type!(get_u32_le_err, get_u32_le, u32);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytestream::ZCursor;

    #[test]
    fn little_endian_reads() {
        let data = [0x34, 0x12, 0xfe, 0xff, 0x78, 0x56, 0x34, 0x12];
        let mut reader = ZReader::new(ZCursor::new(&data));

        assert_eq!(reader.get_u16_le_err().unwrap(), 0x1234);
        assert_eq!(reader.get_i16_le_err().unwrap(), -2);
        assert_eq!(reader.get_u32_le_err().unwrap(), 0x1234_5678);
        assert!(reader.get_u8_err().is_err());
        assert_eq!(reader.get_u16_le(), 0);
    }

    #[test]
    fn bounded_reads_stop_at_limit() {
        let data = [1_u8; 32];
        let mut reader = ZReader::new(ZCursor::new(&data));
        let mut buf = [0; 16];

        reader.set_position(10).unwrap();
        assert_eq!(reader.read_bytes_until(&mut buf, 14).unwrap(), 4);
        assert_eq!(reader.position().unwrap(), 14);
        assert_eq!(reader.read_bytes_until(&mut buf, 14).unwrap(), 0);
        assert_eq!(reader.remaining().unwrap(), 18);
    }
}

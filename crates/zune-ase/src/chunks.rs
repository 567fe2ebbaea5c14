/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Chunk framing
//!
//! Every chunk is a 6 byte prefix (`u32` size including the prefix, `u16` type)
//! followed by its payload. Sizes are unknown until the payload has been written,
//! so [`ChunkWriter`] reserves the prefix and patches it when the chunk closes.
//! Frames get the same treatment for their 16 byte header.
use zune_core::bytestream::{ZByteIoError, ZByteReaderTrait, ZByteWriterTrait, ZReader, ZWriter};
use zune_core::log::trace;

use crate::constants::{
    ASE_CHUNK_PREFIX_SIZE, ASE_FRAME_HEADER_SIZE, ASE_FRAME_MAGIC, CHUNK_CEL, CHUNK_FLI_COLOR,
    CHUNK_FLI_COLOR2, CHUNK_LAYER, CHUNK_MASK, CHUNK_PATH
};
use crate::errors::{AseDecodeErrors, AseEncodeErrors};
use crate::headers::FrameHeader;

pub(crate) mod cel;
pub(crate) mod layer;
pub(crate) mod mask;
pub(crate) mod palette;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum ChunkType {
    /// Palette with 6 bit components
    PaletteScaled,
    /// Palette with 8 bit components
    Palette,
    Layer,
    Cel,
    Mask,
    Path,
    Unknown(u16)
}

impl ChunkType {
    pub const fn from_u16(value: u16) -> ChunkType {
        match value {
            CHUNK_FLI_COLOR => ChunkType::PaletteScaled,
            CHUNK_FLI_COLOR2 => ChunkType::Palette,
            CHUNK_LAYER => ChunkType::Layer,
            CHUNK_CEL => ChunkType::Cel,
            CHUNK_MASK => ChunkType::Mask,
            CHUNK_PATH => ChunkType::Path,
            v => ChunkType::Unknown(v)
        }
    }
    pub const fn to_u16(self) -> u16 {
        match self {
            ChunkType::PaletteScaled => CHUNK_FLI_COLOR,
            ChunkType::Palette => CHUNK_FLI_COLOR2,
            ChunkType::Layer => CHUNK_LAYER,
            ChunkType::Cel => CHUNK_CEL,
            ChunkType::Mask => CHUNK_MASK,
            ChunkType::Path => CHUNK_PATH,
            ChunkType::Unknown(v) => v
        }
    }
}

/// A chunk prefix along with where the chunk lives in the stream
#[derive(Copy, Clone, Debug)]
pub(crate) struct ChunkHeader {
    pub start:      u64,
    pub size:       u32,
    pub chunk_type: ChunkType
}

impl ChunkHeader {
    /// Read a chunk prefix at the current position
    ///
    /// The declared size is validated against the stream so the caller can
    /// always seek to [`end`](Self::end) to reach the next chunk.
    pub fn read<T: ZByteReaderTrait>(reader: &mut ZReader<T>) -> Result<ChunkHeader, AseDecodeErrors> {
        let start = reader.position()?;
        let size = reader.get_u32_le_err()?;
        let chunk_type = ChunkType::from_u16(reader.get_u16_le_err()?);

        if (size as usize) < ASE_CHUNK_PREFIX_SIZE {
            return Err(AseDecodeErrors::BadDeclaredSize("Chunk", size));
        }
        let end = start + u64::from(size);
        let length = reader.size()?;

        if end > length {
            return Err(AseDecodeErrors::ExtentBeyondStream("Chunk", end, length));
        }
        trace!("Chunk {chunk_type:?} at {start}, {size} bytes");

        Ok(ChunkHeader {
            start,
            size,
            chunk_type
        })
    }
    pub const fn end(&self) -> u64 {
        self.start + self.size as u64
    }
    /// Bytes following the prefix
    pub const fn payload_size(&self) -> usize {
        self.size as usize - ASE_CHUNK_PREFIX_SIZE
    }
}

enum FrameState {
    Closed,
    Open { start: u64, chunks: u16, duration: u16 }
}

enum ChunkState {
    Closed,
    Open { start: u64, chunk_type: ChunkType }
}

/// Write side framing state of a single save
///
/// Tracks the open frame and the open chunk, patching their size
/// prefixes when they close.
pub(crate) struct ChunkWriter {
    frame: FrameState,
    chunk: ChunkState
}

impl ChunkWriter {
    pub const fn new() -> ChunkWriter {
        ChunkWriter {
            frame: FrameState::Closed,
            chunk: ChunkState::Closed
        }
    }

    /// Reserve a frame header at the current position
    pub fn start_frame<T: ZByteWriterTrait>(
        &mut self, writer: &mut ZWriter<T>, duration: u16
    ) -> Result<(), AseEncodeErrors> {
        if let FrameState::Open { .. } = self.frame {
            return Err(AseEncodeErrors::FrameAlreadyOpen);
        }
        let start = writer.position()?;
        writer.write_zeros(ASE_FRAME_HEADER_SIZE)?;

        self.frame = FrameState::Open {
            start,
            chunks: 0,
            duration
        };
        Ok(())
    }

    /// Patch the header of the open frame
    pub fn close_frame<T: ZByteWriterTrait>(
        &mut self, writer: &mut ZWriter<T>
    ) -> Result<(), AseEncodeErrors> {
        if let ChunkState::Open { chunk_type, .. } = self.chunk {
            return Err(AseEncodeErrors::ChunkAlreadyOpen(chunk_type.to_u16()));
        }
        let FrameState::Open {
            start,
            chunks,
            duration
        } = self.frame
        else {
            return Err(AseEncodeErrors::NoOpenFrame);
        };
        let end = writer.position()?;
        let header = FrameHeader {
            size: u32::try_from(end - start).map_err(ZByteIoError::from)?,
            magic: ASE_FRAME_MAGIC,
            chunks,
            duration
        };
        writer.set_position(start)?;
        header.write(writer)?;
        writer.set_position(end)?;

        self.frame = FrameState::Closed;
        Ok(())
    }

    /// Reserve a chunk prefix and count the chunk in the open frame
    pub fn start_chunk<T: ZByteWriterTrait>(
        &mut self, writer: &mut ZWriter<T>, chunk_type: ChunkType
    ) -> Result<(), AseEncodeErrors> {
        if let ChunkState::Open { chunk_type, .. } = self.chunk {
            return Err(AseEncodeErrors::ChunkAlreadyOpen(chunk_type.to_u16()));
        }
        let FrameState::Open { chunks, .. } = &mut self.frame else {
            return Err(AseEncodeErrors::NoOpenFrame);
        };
        *chunks = chunks
            .checked_add(1)
            .ok_or(AseEncodeErrors::TooManyChunks)?;

        let start = writer.position()?;
        writer.write_zeros(ASE_CHUNK_PREFIX_SIZE)?;

        self.chunk = ChunkState::Open { start, chunk_type };
        Ok(())
    }

    /// Patch the prefix of the open chunk with its final size
    pub fn close_chunk<T: ZByteWriterTrait>(
        &mut self, writer: &mut ZWriter<T>
    ) -> Result<(), AseEncodeErrors> {
        let ChunkState::Open { start, chunk_type } = self.chunk else {
            return Err(AseEncodeErrors::NoOpenChunk);
        };
        let end = writer.position()?;
        let size = u32::try_from(end - start).map_err(ZByteIoError::from)?;

        writer.set_position(start)?;
        writer.write_u32_le_err(size)?;
        writer.write_u16_le_err(chunk_type.to_u16())?;
        writer.set_position(end)?;

        self.chunk = ChunkState::Closed;
        Ok(())
    }
}

/// Read a `u16` length prefixed byte string
pub(crate) fn read_string<T: ZByteReaderTrait>(reader: &mut ZReader<T>) -> Result<Vec<u8>, ZByteIoError> {
    let length = usize::from(reader.get_u16_le_err()?);
    let mut string = vec![0; length];
    reader.read_exact_bytes(&mut string)?;

    Ok(string)
}

/// Write a `u16` length prefixed byte string
pub(crate) fn write_string<T: ZByteWriterTrait>(
    writer: &mut ZWriter<T>, string: &[u8]
) -> Result<(), AseEncodeErrors> {
    let length = u16::try_from(string.len()).map_err(|_| AseEncodeErrors::NameTooLong(string.len()))?;

    writer.write_u16_le_err(length)?;
    writer.write_all(string)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use zune_core::bytestream::ZCursor;

    use super::*;

    #[test]
    fn chunk_sizes_are_patched() {
        let mut sink = Cursor::new(Vec::new());
        let mut writer = ZWriter::new(&mut sink);
        let mut chunks = ChunkWriter::new();

        chunks.start_frame(&mut writer, 50).unwrap();
        chunks.start_chunk(&mut writer, ChunkType::Layer).unwrap();
        writer.write_zeros(4).unwrap();
        chunks.close_chunk(&mut writer).unwrap();
        chunks.start_chunk(&mut writer, ChunkType::Unknown(0x7777)).unwrap();
        chunks.close_chunk(&mut writer).unwrap();
        chunks.close_frame(&mut writer).unwrap();

        let bytes = sink.into_inner();
        assert_eq!(bytes.len(), 16 + 10 + 6);

        let mut reader = ZReader::new(ZCursor::new(&bytes));
        let frame = FrameHeader::read(&mut reader).unwrap();
        assert_eq!(frame.size, 32);
        assert_eq!(frame.chunks, 2);
        assert_eq!(frame.duration, 50);
        assert!(frame.is_valid());

        let first = ChunkHeader::read(&mut reader).unwrap();
        assert_eq!((first.start, first.size, first.chunk_type), (16, 10, ChunkType::Layer));
        reader.set_position(first.end()).unwrap();

        let second = ChunkHeader::read(&mut reader).unwrap();
        assert_eq!(second.chunk_type, ChunkType::Unknown(0x7777));
        assert_eq!(second.end(), 32);
    }

    #[test]
    fn framing_misuse_is_reported() {
        let mut sink = Cursor::new(Vec::new());
        let mut writer = ZWriter::new(&mut sink);
        let mut chunks = ChunkWriter::new();

        assert!(matches!(
            chunks.start_chunk(&mut writer, ChunkType::Cel),
            Err(AseEncodeErrors::NoOpenFrame)
        ));
        chunks.start_frame(&mut writer, 1).unwrap();
        assert!(matches!(
            chunks.start_frame(&mut writer, 1),
            Err(AseEncodeErrors::FrameAlreadyOpen)
        ));
        assert!(matches!(
            chunks.close_chunk(&mut writer),
            Err(AseEncodeErrors::NoOpenChunk)
        ));
        chunks.start_chunk(&mut writer, ChunkType::Cel).unwrap();
        assert!(matches!(
            chunks.start_chunk(&mut writer, ChunkType::Layer),
            Err(AseEncodeErrors::ChunkAlreadyOpen(0x2005))
        ));
        assert!(matches!(
            chunks.close_frame(&mut writer),
            Err(AseEncodeErrors::ChunkAlreadyOpen(0x2005))
        ));
    }

    #[test]
    fn chunk_past_stream_end() {
        // claims 100 bytes, only 8 present
        let bytes = [100, 0, 0, 0, 0x04, 0x20, 0, 0];
        let err = ChunkHeader::read(&mut ZReader::new(ZCursor::new(&bytes))).unwrap_err();
        assert!(matches!(err, AseDecodeErrors::ExtentBeyondStream("Chunk", 100, 8)));

        let bytes = [3, 0, 0, 0, 0x04, 0x20];
        let err = ChunkHeader::read(&mut ZReader::new(ZCursor::new(&bytes))).unwrap_err();
        assert!(matches!(err, AseDecodeErrors::BadDeclaredSize("Chunk", 3)));
    }

    #[test]
    fn strings_are_opaque_bytes() {
        let name = [0xFF_u8, 0x00, b'a', 0xC3];
        let mut sink = Cursor::new(Vec::new());
        write_string(&mut ZWriter::new(&mut sink), &name).unwrap();

        let bytes = sink.into_inner();
        assert_eq!(&bytes[..2], &[4, 0]);
        assert_eq!(read_string(&mut ZReader::new(ZCursor::new(&bytes))).unwrap(), name);
    }
}

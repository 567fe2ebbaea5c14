/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! File and frame headers
use zune_core::bytestream::{ZByteIoError, ZByteReaderTrait, ZByteWriterTrait, ZReader, ZWriter};

use crate::constants::{
    ASE_FRAME_HEADER_SIZE, ASE_FRAME_MAGIC, ASE_HEADER_SIZE, ASE_MAGIC, MAX_PALETTE_SIZE
};
use crate::errors::{AseDecodeErrors, AseEncodeErrors};
use crate::image::PixelFormat;
use crate::sprite::Sprite;

/// The 128 byte header at the start of every file
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct AseHeader {
    /// Size of the whole file, including this header
    pub size:              u32,
    pub frames:            u16,
    pub width:             u16,
    pub height:            u16,
    pub depth:             u16,
    pub flags:             u32,
    /// Legacy duration of every frame, in milliseconds
    pub speed:             u16,
    pub transparent_index: u8,
    /// Entries in the first palette, 0 means 256
    pub ncolors:           u16
}

impl AseHeader {
    /// Read a header, leaving the stream positioned right after its 128 bytes
    pub fn read<T: ZByteReaderTrait>(reader: &mut ZReader<T>) -> Result<AseHeader, AseDecodeErrors> {
        let start = reader.position()?;

        let size = reader.get_u32_le_err()?;
        let magic = reader.get_u16_le_err()?;

        if magic != ASE_MAGIC {
            return Err(AseDecodeErrors::WrongMagicBytes(magic));
        }
        let frames = reader.get_u16_le_err()?;
        let width = reader.get_u16_le_err()?;
        let height = reader.get_u16_le_err()?;
        let depth = reader.get_u16_le_err()?;
        let flags = reader.get_u32_le_err()?;
        let speed = reader.get_u16_le_err()?;
        // next, frit
        reader.skip(8)?;
        let transparent_index = reader.get_u8_err()?;
        reader.skip(3)?;
        let ncolors = match reader.get_u16_le_err()? {
            // 0 means 256 (old files)
            0 => MAX_PALETTE_SIZE as u16,
            n => n
        };
        // make sure the remaining reserved bytes are there
        let end = start + ASE_HEADER_SIZE as u64;
        let length = reader.size()?;

        if end > length {
            return Err(AseDecodeErrors::ExtentBeyondStream("Header", end, length));
        }
        reader.set_position(end)?;

        Ok(AseHeader {
            size,
            frames,
            width,
            height,
            depth,
            flags,
            speed,
            transparent_index,
            ncolors
        })
    }

    /// Describe `sprite`, validating that it fits into the 16 bit header fields
    ///
    /// The size field is left at zero, it is patched once the frames are written.
    pub fn from_sprite(sprite: &Sprite) -> Result<AseHeader, AseEncodeErrors> {
        let width = u16::try_from(sprite.width())
            .map_err(|_| AseEncodeErrors::TooLargeDimensions("width", sprite.width()))?;
        let height = u16::try_from(sprite.height())
            .map_err(|_| AseEncodeErrors::TooLargeDimensions("height", sprite.height()))?;
        let frames = u16::try_from(sprite.frame_count())
            .map_err(|_| AseEncodeErrors::TooManyFrames(sprite.frame_count()))?;

        let ncolors = sprite.palette(0).len();

        if ncolors == 0 || ncolors > MAX_PALETTE_SIZE {
            return Err(AseEncodeErrors::InvalidPaletteSize(ncolors));
        }

        Ok(AseHeader {
            size: 0,
            frames,
            width,
            height,
            depth: sprite.pixel_format().color_depth(),
            flags: 0,
            speed: sprite.frame_duration(0).unwrap_or(0),
            transparent_index: sprite.transparent_index(),
            ncolors: ncolors as u16
        })
    }

    pub fn pixel_format(&self) -> Result<PixelFormat, AseDecodeErrors> {
        PixelFormat::from_color_depth(self.depth)
            .ok_or(AseDecodeErrors::UnsupportedColorDepth(self.depth))
    }

    /// Write all 128 bytes of the header
    pub fn write<T: ZByteWriterTrait>(&self, writer: &mut ZWriter<T>) -> Result<(), ZByteIoError> {
        writer.write_u32_le_err(self.size)?;
        writer.write_u16_le_err(ASE_MAGIC)?;
        writer.write_u16_le_err(self.frames)?;
        writer.write_u16_le_err(self.width)?;
        writer.write_u16_le_err(self.height)?;
        writer.write_u16_le_err(self.depth)?;
        writer.write_u32_le_err(self.flags)?;
        writer.write_u16_le_err(self.speed)?;
        // next, frit
        writer.write_zeros(8)?;
        writer.write_u8_err(self.transparent_index)?;
        writer.write_zeros(3)?;
        writer.write_u16_le_err(self.ncolors)?;
        // pad up to 128 bytes
        writer.write_zeros(ASE_HEADER_SIZE - 34)
    }
}

/// The 16 byte header in front of every frame
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct FrameHeader {
    /// Size of the frame including this header
    pub size:     u32,
    pub magic:    u16,
    pub chunks:   u16,
    /// Frame duration in milliseconds, 0 keeps the previous duration
    pub duration: u16
}

impl FrameHeader {
    pub fn read<T: ZByteReaderTrait>(reader: &mut ZReader<T>) -> Result<FrameHeader, ZByteIoError> {
        let size = reader.get_u32_le_err()?;
        let magic = reader.get_u16_le_err()?;
        let chunks = reader.get_u16_le_err()?;
        let duration = reader.get_u16_le_err()?;
        // reserved
        reader.skip(6)?;

        Ok(FrameHeader {
            size,
            magic,
            chunks,
            duration
        })
    }

    pub const fn is_valid(&self) -> bool {
        self.magic == ASE_FRAME_MAGIC
    }

    pub fn write<T: ZByteWriterTrait>(&self, writer: &mut ZWriter<T>) -> Result<(), ZByteIoError> {
        writer.write_u32_le_err(self.size)?;
        writer.write_u16_le_err(self.magic)?;
        writer.write_u16_le_err(self.chunks)?;
        writer.write_u16_le_err(self.duration)?;
        writer.write_zeros(ASE_FRAME_HEADER_SIZE - 10)
    }
}

/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors possible when decoding and encoding sprites
//!
//! Decoding distinguishes two classes of problems
//!
//! - [`AseDecodeErrors`]: the container itself cannot be trusted anymore,
//!   decoding stops.
//! - [`ChunkErrors`]: a single chunk was malformed or referenced something that
//!   does not exist, the chunk is skipped and decoding continues. These are
//!   collected in [`AseDecoder::warnings`](crate::AseDecoder::warnings).
use core::fmt::{Debug, Display, Formatter};

use zune_core::bytestream::ZByteIoError;

use crate::constants::{ASE_FRAME_MAGIC, ASE_MAGIC};
use crate::image::PixelFormat;

/// Errors from the zlib adapter
pub enum CompressionError {
    /// The inflater reported a corrupt stream
    Inflate(String),
    /// The deflater reported an error
    Deflate(String),
    /// The stream inflated to more bytes than the image can hold
    ///
    /// The argument is the size of the image in bytes
    BadCompressedImage(usize),
    /// The deflater neither consumed input nor produced output
    Stalled,
    /// An image of `size` bytes cannot inflate from the `available` bytes left in its chunk
    TooFewBytes { size: usize, available: u64 }
}

impl Debug for CompressionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            CompressionError::Inflate(reason) => {
                writeln!(f, "zlib error in inflate(): {reason}")
            }
            CompressionError::Deflate(reason) => {
                writeln!(f, "zlib error in deflate(): {reason}")
            }
            CompressionError::BadCompressedImage(capacity) => {
                writeln!(
                    f,
                    "Bad compressed image, data inflates past the {capacity} bytes of the image"
                )
            }
            CompressionError::Stalled => {
                writeln!(f, "zlib deflate() made no progress")
            }
            CompressionError::TooFewBytes { size, available } => {
                writeln!(
                    f,
                    "Compressed image of {size} bytes cannot come from {available} bytes of zlib data"
                )
            }
        }
    }
}

/// Fatal errors that can occur during decoding
///
/// When one of these is returned the sprite cannot be recovered.
pub enum AseDecodeErrors {
    /// The first two bytes after the file size are not `0xA5E0`
    WrongMagicBytes(u16),
    /// The header color depth is not one of 32, 16 or 8
    UnsupportedColorDepth(u16),
    /// Dimension, value and configured maximum
    TooLargeDimensions(&'static str, usize, usize),
    /// Width or height is zero
    ZeroDimensions,
    /// A declared size points past the end of the stream
    ///
    /// # Arguments
    /// - What the size belonged to
    /// - The position the size pointed to
    /// - Length of the stream
    ExtentBeyondStream(&'static str, u64, u64),
    /// A frame or chunk declared a size smaller than its own header
    ///
    /// The first argument is the structure, the second the declared size
    BadDeclaredSize(&'static str, u32),
    /// A recoverable error promoted because the decoder is in strict mode
    Chunk(ChunkErrors),
    Generic(&'static str),
    GenericString(String),
    IoErrors(ZByteIoError)
}

impl Debug for AseDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            AseDecodeErrors::WrongMagicBytes(magic) => {
                writeln!(
                    f,
                    "Wrong magic bytes, expected {ASE_MAGIC:#06X} but found {magic:#06X}, not an ase file"
                )
            }
            AseDecodeErrors::UnsupportedColorDepth(depth) => {
                writeln!(
                    f,
                    "Unsupported color depth {depth}, supported depths are 32, 16 and 8"
                )
            }
            AseDecodeErrors::TooLargeDimensions(dimension, value, max) => {
                writeln!(
                    f,
                    "Too large sprite {dimension} {value}, maximum configured is {max}"
                )
            }
            AseDecodeErrors::ZeroDimensions => {
                writeln!(f, "Sprite width or height is zero")
            }
            AseDecodeErrors::ExtentBeyondStream(what, end, length) => {
                writeln!(
                    f,
                    "{what} ends at byte {end} but the stream is only {length} bytes long"
                )
            }
            AseDecodeErrors::BadDeclaredSize(what, size) => {
                writeln!(f, "{what} declares an impossible size of {size} bytes")
            }
            AseDecodeErrors::Chunk(error) => {
                writeln!(f, "Strict mode: {error:?}")
            }
            AseDecodeErrors::Generic(reason) => {
                writeln!(f, "{reason}")
            }
            AseDecodeErrors::GenericString(reason) => {
                writeln!(f, "{reason}")
            }
            AseDecodeErrors::IoErrors(err) => {
                writeln!(f, "I/O error {err:?}")
            }
        }
    }
}

impl Display for AseDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl std::error::Error for AseDecodeErrors {}

impl From<&'static str> for AseDecodeErrors {
    fn from(r: &'static str) -> Self {
        Self::Generic(r)
    }
}

impl From<ZByteIoError> for AseDecodeErrors {
    fn from(err: ZByteIoError) -> Self {
        AseDecodeErrors::IoErrors(err)
    }
}

/// Errors confined to a single chunk or frame
///
/// The decoder skips the offending chunk using its declared size and carries on.
pub enum ChunkErrors {
    /// A palette packet addressed an entry past 255
    MalformedPalette(usize),
    /// A palette chunk was found in a sprite that has no palette
    PaletteInNonIndexed(PixelFormat),
    /// Layer kind that is neither an image nor a folder
    UnknownLayerKind(u16),
    /// A layer claimed to be the child of an image layer
    ///
    /// It was attached as a sibling of that layer instead, the argument is its depth
    LayerAttachedAsSibling(u16),
    /// A layer at the given depth could not be placed in the tree
    DetachedLayer(u16),
    /// A cel pointed to a layer index that was never declared
    UnknownLayerIndex { frame: usize, index: u16 },
    /// A cel pointed to a folder
    NotAnImageLayer { frame: usize, index: u16 },
    /// A link cel pointed to a frame without a cel on the same layer
    DanglingLink { frame: usize, link_frame: u16 },
    UnknownCelType(u16),
    /// Cel dimensions above the configured limits
    CelTooLarge { frame: usize, width: usize, height: usize },
    /// Raw cel pixels extend past the end of their chunk
    CelPastChunkEnd { frame: usize },
    /// Pixels of a compressed cel could not be inflated
    Compression(CompressionError),
    /// A frame header did not carry `0xF1FA`
    BadFrameMagic { frame: usize, magic: u16 },
    /// A chunk type this decoder does not understand
    UnknownChunk(u16),
    /// The record inside a chunk of this type is larger than the chunk
    ChunkOverrun(u16)
}

impl Debug for ChunkErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ChunkErrors::MalformedPalette(index) => {
                writeln!(f, "Palette chunk addresses entry {index}, past the 256 entry limit")
            }
            ChunkErrors::PaletteInNonIndexed(format) => {
                writeln!(f, "Found a color chunk in a {format:?} sprite, ignoring it")
            }
            ChunkErrors::UnknownLayerKind(kind) => {
                writeln!(f, "Unknown layer kind {kind}, expected 0 (image) or 1 (folder)")
            }
            ChunkErrors::LayerAttachedAsSibling(depth) => {
                writeln!(
                    f,
                    "Layer at depth {depth} follows an image layer, attached it as a sibling"
                )
            }
            ChunkErrors::DetachedLayer(depth) => {
                writeln!(f, "Layer at depth {depth} has no folder to attach to")
            }
            ChunkErrors::UnknownLayerIndex { frame, index } => {
                writeln!(f, "Frame {frame} references layer index {index} which was not found")
            }
            ChunkErrors::NotAnImageLayer { frame, index } => {
                writeln!(
                    f,
                    "Frame {frame} places a cel in layer {index} which does not contain images"
                )
            }
            ChunkErrors::DanglingLink { frame, link_frame } => {
                writeln!(
                    f,
                    "Link cel in frame {frame} points to frame {link_frame} which has no cel"
                )
            }
            ChunkErrors::UnknownCelType(cel_type) => {
                writeln!(f, "Unknown cel type {cel_type}, dropping cel")
            }
            ChunkErrors::CelTooLarge {
                frame,
                width,
                height
            } => {
                writeln!(
                    f,
                    "Cel in frame {frame} is {width}x{height}, larger than the configured limits"
                )
            }
            ChunkErrors::CelPastChunkEnd { frame } => {
                writeln!(f, "Raw cel pixels in frame {frame} run past the end of the chunk")
            }
            ChunkErrors::Compression(err) => {
                writeln!(f, "{err:?}")
            }
            ChunkErrors::BadFrameMagic { frame, magic } => {
                writeln!(
                    f,
                    "Frame {frame} has magic {magic:#06X}, expected {ASE_FRAME_MAGIC:#06X}, skipping frame"
                )
            }
            ChunkErrors::UnknownChunk(chunk_type) => {
                writeln!(f, "Unsupported chunk type {chunk_type:#06X} (skipping)")
            }
            ChunkErrors::ChunkOverrun(chunk_type) => {
                writeln!(
                    f,
                    "Chunk {chunk_type:#06X} holds less data than its record needs, skipping it"
                )
            }
        }
    }
}

impl Display for ChunkErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl std::error::Error for ChunkErrors {}

impl From<CompressionError> for ChunkErrors {
    fn from(err: CompressionError) -> Self {
        ChunkErrors::Compression(err)
    }
}

/// Outcome of a failed chunk decode
///
/// Chunk decoders return this so the frame loop can decide whether to
/// propagate or to skip to the next chunk.
pub enum ChunkFault {
    Fatal(AseDecodeErrors),
    Recoverable(ChunkErrors)
}

impl Debug for ChunkFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ChunkFault::Fatal(err) => Debug::fmt(err, f),
            ChunkFault::Recoverable(err) => Debug::fmt(err, f)
        }
    }
}

impl From<ZByteIoError> for ChunkFault {
    fn from(err: ZByteIoError) -> Self {
        ChunkFault::Fatal(AseDecodeErrors::IoErrors(err))
    }
}

impl From<AseDecodeErrors> for ChunkFault {
    fn from(err: AseDecodeErrors) -> Self {
        ChunkFault::Fatal(err)
    }
}

impl From<CompressionError> for ChunkFault {
    fn from(err: CompressionError) -> Self {
        ChunkFault::Recoverable(ChunkErrors::Compression(err))
    }
}

impl From<ChunkErrors> for ChunkFault {
    fn from(err: ChunkErrors) -> Self {
        ChunkFault::Recoverable(err)
    }
}

/// Errors that can occur during encoding
pub enum AseEncodeErrors {
    /// Dimension name and value, the format stores dimensions in 16 bits
    TooLargeDimensions(&'static str, usize),
    /// Sprite has more frames than a u16 frame count can hold
    TooManyFrames(usize),
    /// Sprite has more layers than a u16 layer index can address
    TooManyLayers(usize),
    /// Palettes must hold between 1 and 256 entries
    InvalidPaletteSize(usize),
    /// A layer name longer than a u16 length prefix can describe
    NameTooLong(usize),
    /// `start_chunk` while a chunk of the given type was still open
    ChunkAlreadyOpen(u16),
    /// `close_chunk` without a matching `start_chunk`
    NoOpenChunk,
    /// `start_frame` while a frame was still open
    FrameAlreadyOpen,
    /// A chunk or frame operation outside of a frame
    NoOpenFrame,
    /// A frame holds more chunks than the u16 chunk count allows
    TooManyChunks,
    Compression(CompressionError),
    /// The progress handler asked to stop
    Cancelled,
    Generic(&'static str),
    IoErrors(ZByteIoError)
}

impl Debug for AseEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            AseEncodeErrors::TooLargeDimensions(dimension, value) => {
                writeln!(
                    f,
                    "Too large {dimension} {value}, maximum supported is {}",
                    u16::MAX
                )
            }
            AseEncodeErrors::TooManyFrames(frames) => {
                writeln!(f, "Too many frames {frames}, maximum supported is {}", u16::MAX)
            }
            AseEncodeErrors::TooManyLayers(layers) => {
                writeln!(f, "Too many layers {layers}, maximum supported is {}", u16::MAX)
            }
            AseEncodeErrors::InvalidPaletteSize(size) => {
                writeln!(f, "Palette has {size} entries, expected between 1 and 256")
            }
            AseEncodeErrors::NameTooLong(length) => {
                writeln!(f, "Name of {length} bytes cannot be stored, maximum is {}", u16::MAX)
            }
            AseEncodeErrors::ChunkAlreadyOpen(chunk_type) => {
                writeln!(f, "Started a chunk while chunk {chunk_type:#06X} is still open")
            }
            AseEncodeErrors::NoOpenChunk => {
                writeln!(f, "Closed a chunk but none was open")
            }
            AseEncodeErrors::FrameAlreadyOpen => {
                writeln!(f, "Started a frame while the previous one is still open")
            }
            AseEncodeErrors::NoOpenFrame => {
                writeln!(f, "No frame is open")
            }
            AseEncodeErrors::TooManyChunks => {
                writeln!(f, "Frame holds more than {} chunks", u16::MAX)
            }
            AseEncodeErrors::Compression(err) => {
                writeln!(f, "{err:?}")
            }
            AseEncodeErrors::Cancelled => {
                writeln!(f, "Encoding cancelled")
            }
            AseEncodeErrors::Generic(reason) => {
                writeln!(f, "{reason}")
            }
            AseEncodeErrors::IoErrors(err) => {
                writeln!(f, "I/O error {err:?}")
            }
        }
    }
}

impl Display for AseEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl std::error::Error for AseEncodeErrors {}

impl From<&'static str> for AseEncodeErrors {
    fn from(r: &'static str) -> Self {
        Self::Generic(r)
    }
}

impl From<ZByteIoError> for AseEncodeErrors {
    fn from(err: ZByteIoError) -> Self {
        AseEncodeErrors::IoErrors(err)
    }
}

impl From<CompressionError> for AseEncodeErrors {
    fn from(err: CompressionError) -> Self {
        AseEncodeErrors::Compression(err)
    }
}

/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::ops::ControlFlow;

use zune_core::bytestream::{ZByteReaderTrait, ZCursor, ZReader};
use zune_core::log::{trace, warn};
use zune_core::options::DecoderOptions;

use crate::chunks::cel::{read_cel_chunk, CelContext};
use crate::chunks::layer::{LayerRecord, LayerTreeBuilder};
use crate::chunks::mask::read_mask_chunk;
use crate::chunks::palette::read_palette_chunk;
use crate::chunks::{ChunkHeader, ChunkType};
use crate::constants::{ASE_FRAME_HEADER_SIZE, ASE_MAGIC};
use crate::errors::{AseDecodeErrors, ChunkErrors, ChunkFault};
use crate::headers::{AseHeader, FrameHeader};
use crate::image::PixelFormat;
use crate::sprite::Sprite;

/// Probe some bytes to see
/// if they consist of an `.ase` sprite
pub fn probe_ase(bytes: &[u8]) -> bool {
    // skip file size -> 4
    if let Some(magic) = bytes.get(4..6) {
        return u16::from_le_bytes([magic[0], magic[1]]) == ASE_MAGIC;
    }
    false
}

/// Callback receiving the fraction of the file consumed so far
///
/// Returning [`ControlFlow::Break`] asks the decoder to stop at the next frame boundary.
pub type ProgressHandler = Box<dyn FnMut(f32) -> ControlFlow<()>>;

/// An `.ase` sprite decoder
///
/// The decoder reads the 128 byte header with [`decode_headers`] and the whole
/// sprite with [`decode`].
///
/// Malformed chunks do not stop decoding, they are skipped and the problem
/// is stored, see [`warnings`]. Use [`DecoderOptions::new_strict`] to turn
/// them into errors.
///
/// # Example
/// ```no_run
/// use zune_ase::zune_core::bytestream::ZCursor;
/// use zune_ase::AseDecoder;
///
/// let data = std::fs::read("sprite.ase").unwrap();
/// let mut decoder = AseDecoder::new(ZCursor::new(&data));
/// let sprite = decoder.decode().unwrap();
///
/// println!("{} frames, {} layers", sprite.frame_count(), sprite.layer_count());
/// ```
///
/// [`decode_headers`]: AseDecoder::decode_headers
/// [`decode`]: AseDecoder::decode
/// [`warnings`]: AseDecoder::warnings
pub struct AseDecoder<T>
where
    T: ZByteReaderTrait
{
    stream:    ZReader<T>,
    options:   DecoderOptions,
    header:    Option<AseHeader>,
    warnings:  Vec<ChunkErrors>,
    progress:  Option<ProgressHandler>,
    cancelled: bool
}

impl<T> AseDecoder<T>
where
    T: ZByteReaderTrait
{
    /// Create a decoder with the default options
    pub fn new(data: T) -> AseDecoder<T> {
        AseDecoder::new_with_options(data, DecoderOptions::default())
    }

    /// Create a decoder that obeys the given options
    ///
    /// The decoder respects the maximum width and height, strict mode and
    /// [`ase_get_decode_first_frame_only`](DecoderOptions::ase_get_decode_first_frame_only)
    pub fn new_with_options(data: T, options: DecoderOptions) -> AseDecoder<T> {
        AseDecoder {
            stream: ZReader::new(data),
            options,
            header: None,
            warnings: Vec::new(),
            progress: None,
            cancelled: false
        }
    }

    /// Install a callback invoked at frame and chunk boundaries
    pub fn set_progress_handler<F>(&mut self, handler: F)
    where
        F: FnMut(f32) -> ControlFlow<()> + 'static
    {
        self.progress = Some(Box::new(handler));
    }

    /// Read and validate the file header
    ///
    /// Calling this more than once does nothing.
    pub fn decode_headers(&mut self) -> Result<(), AseDecodeErrors> {
        if self.header.is_some() {
            return Ok(());
        }
        let header = AseHeader::read(&mut self.stream)?;
        let format = header.pixel_format()?;

        let width = usize::from(header.width);
        let height = usize::from(header.height);

        if width == 0 || height == 0 {
            return Err(AseDecodeErrors::ZeroDimensions);
        }
        if width > self.options.get_max_width() {
            return Err(AseDecodeErrors::TooLargeDimensions(
                "width",
                width,
                self.options.get_max_width()
            ));
        }
        if height > self.options.get_max_height() {
            return Err(AseDecodeErrors::TooLargeDimensions(
                "height",
                height,
                self.options.get_max_height()
            ));
        }
        let length = self.stream.size()?;

        if u64::from(header.size) > length {
            return Err(AseDecodeErrors::ExtentBeyondStream(
                "File",
                u64::from(header.size),
                length
            ));
        }

        trace!("Sprite width: {width}");
        trace!("Sprite height: {height}");
        trace!("Pixel format: {format:?}");
        trace!("Frames: {}", header.frames);
        trace!("Palette entries: {}", header.ncolors);

        self.header = Some(header);
        Ok(())
    }

    /// Sprite width and height, or `None` if headers were not decoded
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.header
            .map(|h| (usize::from(h.width), usize::from(h.height)))
    }

    /// Pixel format of the sprite, or `None` if headers were not decoded
    pub fn pixel_format(&self) -> Option<PixelFormat> {
        self.header.and_then(|h| PixelFormat::from_color_depth(h.depth))
    }

    /// Problems encountered by the last [`decode`](Self::decode) that were skipped
    pub fn warnings(&self) -> &[ChunkErrors] {
        &self.warnings
    }

    /// Whether the progress handler stopped the last decode early
    ///
    /// The sprite returned by such a decode is missing the remaining frames.
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Decode the whole sprite
    pub fn decode(&mut self) -> Result<Sprite, AseDecodeErrors> {
        self.decode_headers()?;

        let header = self
            .header
            .ok_or(AseDecodeErrors::Generic("Headers not decoded"))?;
        let format = header.pixel_format()?;

        let mut sprite = Sprite::new(
            format,
            usize::from(header.width),
            usize::from(header.height),
            usize::from(header.ncolors)
        );
        sprite.set_frame_count(usize::from(header.frames));
        sprite.set_duration_for_all_frames(header.speed);
        sprite.set_transparent_index(header.transparent_index);

        let mut layers = LayerTreeBuilder::new(&sprite);
        let length = self.stream.size()?;

        self.warnings.clear();
        self.cancelled = false;

        for frame in 0..usize::from(header.frames) {
            let frame_start = self.stream.position()?;
            self.report_progress(frame_start, header.size);

            let frame_header = FrameHeader::read(&mut self.stream)?;

            if (frame_header.size as usize) < ASE_FRAME_HEADER_SIZE {
                return Err(AseDecodeErrors::BadDeclaredSize("Frame", frame_header.size));
            }
            let frame_end = frame_start + u64::from(frame_header.size);

            if frame_end > length {
                return Err(AseDecodeErrors::ExtentBeyondStream("Frame", frame_end, length));
            }

            if frame_header.is_valid() {
                if frame_header.duration > 0 {
                    sprite.set_frame_duration(frame, frame_header.duration)?;
                } else if frame > 0 {
                    let previous = sprite.frame_duration(frame - 1).unwrap_or(header.speed);
                    sprite.set_frame_duration(frame, previous)?;
                }
                trace!(
                    "Frame {frame}: {} chunks, {} bytes",
                    frame_header.chunks,
                    frame_header.size
                );

                for _ in 0..frame_header.chunks {
                    let chunk = ChunkHeader::read(&mut self.stream)?;
                    self.report_progress(chunk.start, header.size);

                    match self.decode_chunk(&mut sprite, &mut layers, frame, &chunk) {
                        Ok(()) => (),
                        Err(ChunkFault::Fatal(err)) => return Err(err),
                        Err(ChunkFault::Recoverable(err)) => self.recover(err)?
                    }
                    self.stream.set_position(chunk.end())?;
                }
            } else {
                self.recover(ChunkErrors::BadFrameMagic {
                    frame,
                    magic: frame_header.magic
                })?;
            }
            self.stream.set_position(frame_end)?;

            if self.options.ase_get_decode_first_frame_only() {
                trace!("Stopping after the first frame");
                break;
            }
            if self.cancelled {
                trace!("Decoding cancelled after frame {frame}");
                break;
            }
        }
        Ok(sprite)
    }

    fn decode_chunk(
        &mut self, sprite: &mut Sprite, layers: &mut LayerTreeBuilder, frame: usize,
        chunk: &ChunkHeader
    ) -> Result<(), ChunkFault> {
        match chunk.chunk_type {
            ChunkType::Path => {
                trace!("Ignoring path chunk");
                return Ok(());
            }
            ChunkType::Unknown(chunk_type) => {
                // never fatal, even in strict mode
                let err = ChunkErrors::UnknownChunk(chunk_type);
                warn!("{err:?}");
                self.warnings.push(err);
                return Ok(());
            }
            _ => ()
        }
        // ChunkHeader::read checked the chunk fits in the stream
        let mut payload = vec![0; chunk.payload_size()];
        self.stream.read_exact_bytes(&mut payload)?;

        // chunk decoders only see their own payload, running out of it
        // means the record is larger than its declared size
        let mut reader = ZReader::new(ZCursor::new(payload));

        match self.decode_payload(&mut reader, sprite, layers, frame, chunk.chunk_type) {
            Err(ChunkFault::Fatal(AseDecodeErrors::IoErrors(_))) => {
                Err(ChunkErrors::ChunkOverrun(chunk.chunk_type.to_u16()).into())
            }
            result => result
        }
    }

    fn decode_payload(
        &mut self, reader: &mut ZReader<ZCursor<Vec<u8>>>, sprite: &mut Sprite,
        layers: &mut LayerTreeBuilder, frame: usize, chunk_type: ChunkType
    ) -> Result<(), ChunkFault> {
        match chunk_type {
            ChunkType::Palette | ChunkType::PaletteScaled => {
                let format = sprite.pixel_format();

                if format != PixelFormat::Indexed {
                    return Err(ChunkErrors::PaletteInNonIndexed(format).into());
                }
                let scaled = chunk_type == ChunkType::PaletteScaled;
                let palette = read_palette_chunk(reader, sprite.palette(frame), frame, scaled)?;

                if palette.count_diff(sprite.palette(frame)) > 0 {
                    trace!("Installing a {} entry palette at frame {frame}", palette.len());
                    sprite.set_palette(palette);
                }
            }
            ChunkType::Layer => {
                let record = LayerRecord::read(reader)?;
                let (_, fixup) = layers.insert(sprite, record)?;

                if let Some(fixup) = fixup {
                    self.recover(fixup)?;
                }
            }
            ChunkType::Cel => {
                let context = CelContext {
                    sprite,
                    layers,
                    frame,
                    max_width: self.options.get_max_width(),
                    max_height: self.options.get_max_height()
                };
                let chunk_end = reader.size()?;
                let decoded = read_cel_chunk(reader, &context, chunk_end)?;

                sprite
                    .set_cel(decoded.layer, frame, decoded.cel)
                    .map_err(AseDecodeErrors::Generic)?;

                if let Some(err) = decoded.error {
                    self.recover(err)?;
                }
            }
            ChunkType::Mask => {
                let mask = read_mask_chunk(reader)?;
                trace!("Skipping mask {:?} with bounds {:?}", mask.name(), mask.bounds());
            }
            ChunkType::Path | ChunkType::Unknown(_) => ()
        }
        Ok(())
    }

    /// Keep going after `error` unless the decoder is strict
    fn recover(&mut self, error: ChunkErrors) -> Result<(), AseDecodeErrors> {
        if self.options.get_strict_mode() {
            return Err(AseDecodeErrors::Chunk(error));
        }
        warn!("{error:?}");
        self.warnings.push(error);
        Ok(())
    }

    fn report_progress(&mut self, position: u64, total: u32) {
        if let Some(handler) = self.progress.as_mut() {
            let fraction = if total == 0 {
                1.0
            } else {
                (position as f32 / total as f32).min(1.0)
            };
            if handler(fraction).is_break() {
                self.cancelled = true;
            }
        }
    }
}

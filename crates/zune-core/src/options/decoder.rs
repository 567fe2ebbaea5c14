/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Global Decoder options

/// Decoder options that are flags
#[derive(Copy, Debug, Clone, Default)]
pub struct DecoderFlags {
    /// Whether errors the decoder could recover from, like a cel pointing
    /// to a layer that doesn't exist, should abort decoding instead
    error_on_recoverable: bool,
    /// Whether the ase decoder should stop after the first frame
    ase_first_frame_only: bool
}

/// Decoder options
///
/// Not all options are respected by decoders all decoders
#[derive(Debug, Copy, Clone)]
pub struct DecoderOptions {
    /// Maximum width for which decoders will
    /// not try to decode images larger than
    /// the specified width.
    ///
    /// - Default value: 16384
    /// - Respected by: `all decoders`
    max_width:  usize,
    /// Maximum height for which decoders will not
    /// try to decode images larger than the
    /// specified height
    ///
    /// - Default value: 16384
    /// - Respected by: `all decoders`
    max_height: usize,
    /// Boolean flags that influence decoding
    flags:      DecoderFlags
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_width:  1 << 14,
            max_height: 1 << 14,
            flags:      DecoderFlags::default()
        }
    }
}

/// Initializers
impl DecoderOptions {
    /// Create the decoder with options that reject any malformed
    /// record instead of skipping it
    pub fn new_strict() -> DecoderOptions {
        DecoderOptions::default().set_strict_mode(true)
    }
}

/// Global options respected by all decoders
impl DecoderOptions {
    /// Get maximum width configured for which the decoder
    /// should not try to decode images greater than this width
    pub const fn get_max_width(&self) -> usize {
        self.max_width
    }

    /// Get maximum height configured for which the decoder should
    /// not try to decode images greater than this height
    pub const fn get_max_height(&self) -> usize {
        self.max_height
    }

    /// Return true whether the decoder should be in strict mode
    /// And reject most errors
    pub const fn get_strict_mode(&self) -> bool {
        self.flags.error_on_recoverable
    }

    /// Set maximum width for which the decoder should not try
    /// decoding images greater than that width
    ///
    /// # Arguments
    ///
    /// * `width`:  The maximum width allowed
    ///
    /// returns: DecoderOptions
    #[must_use]
    pub fn set_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    /// Set maximum height for which the decoder should not try
    /// decoding images greater than that height
    /// # Arguments
    ///
    /// * `height`: The maximum height allowed
    ///
    /// returns: DecoderOptions
    ///
    #[must_use]
    pub fn set_max_height(mut self, height: usize) -> Self {
        self.max_height = height;
        self
    }

    /// Set whether the decoder should be in standards conforming/
    /// strict mode
    ///
    /// This reduces the error tolerance level for the decoders, records
    /// which would otherwise be skipped will abort decoding
    ///
    /// returns: DecoderOptions
    #[must_use]
    pub fn set_strict_mode(mut self, yes: bool) -> Self {
        self.flags.error_on_recoverable = yes;
        self
    }
}

/// ASE specific options
impl DecoderOptions {
    /// Return whether the ase decoder should only decode the
    /// first frame of the animation
    pub const fn ase_get_decode_first_frame_only(&self) -> bool {
        self.flags.ase_first_frame_only
    }
    /// Set whether the ase decoder should only decode the first frame,
    /// which is useful for thumbnails
    ///
    /// The frame count of the returned sprite is left as declared in the header,
    /// cels for later frames are simply not present
    #[must_use]
    pub const fn ase_set_decode_first_frame_only(mut self, yes: bool) -> Self {
        self.flags.ase_first_frame_only = yes;
        self
    }
}

/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// Options shared by the encoders in
/// the `zune-` family of crates
#[derive(Debug, Copy, Clone)]
pub struct EncoderOptions {
    effort: u8
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self { effort: 6 }
    }
}

impl EncoderOptions {
    /// Get the effort the encoder spends compressing
    ///
    /// For deflate based encoders this is the zlib compression
    /// level, 0 stores data, 9 compresses best.
    pub const fn get_effort(&self) -> u8 {
        self.effort
    }

    /// Set the effort the encoder spends compressing, values
    /// above 9 are clamped
    #[must_use]
    pub fn set_effort(mut self, effort: u8) -> Self {
        self.effort = effort.min(9);
        self
    }
}

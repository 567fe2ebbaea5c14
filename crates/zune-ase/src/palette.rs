/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Palettes of indexed sprites
use crate::constants::MAX_PALETTE_SIZE;

/// A single palette entry
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color { r, g, b, a }
    }
    /// An opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 255 }
    }
}

/// An ordered list of colors which becomes active at a frame
///
/// A palette stays active until the next palette of the sprite starts,
/// see [`Sprite::palette`](crate::Sprite::palette).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Palette {
    frame:  usize,
    colors: Vec<Color>
}

impl Palette {
    /// Create a palette of `size` opaque black entries
    pub fn new(frame: usize, size: usize) -> Palette {
        Palette {
            frame,
            colors: vec![Color::rgb(0, 0, 0); size]
        }
    }
    pub fn from_colors(frame: usize, colors: Vec<Color>) -> Palette {
        Palette { frame, colors }
    }
    /// First frame this palette applies to
    pub const fn frame(&self) -> usize {
        self.frame
    }
    pub fn set_frame(&mut self, frame: usize) {
        self.frame = frame;
    }
    pub fn len(&self) -> usize {
        self.colors.len()
    }
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
    pub fn entry(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied()
    }
    /// Set entry `index`, growing the palette with opaque black if needed
    ///
    /// # Errors
    /// If `index` is past the 256 entries a palette can hold, the palette
    /// is left untouched.
    pub fn set_entry(&mut self, index: usize, color: Color) -> Result<(), &'static str> {
        if index >= MAX_PALETTE_SIZE {
            return Err("Palette index out of range");
        }
        if index >= self.colors.len() {
            self.colors.resize(index + 1, Color::rgb(0, 0, 0));
        }
        self.colors[index] = color;
        Ok(())
    }
    /// Count entries differing between two palettes
    ///
    /// Entries present in only one of the palettes count as different,
    /// so palettes of different lengths never compare as equal.
    pub fn count_diff(&self, other: &Palette) -> usize {
        let common = self
            .colors
            .iter()
            .zip(other.colors.iter())
            .filter(|(a, b)| a != b)
            .count();

        common + self.colors.len().abs_diff(other.colors.len())
    }
}

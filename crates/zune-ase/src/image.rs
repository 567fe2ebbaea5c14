/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Pixel buffers placed on layers by cels

use zune_core::colorspace::ColorSpace;

/// Pixel formats a sprite can be stored in
///
/// The in memory layout of a pixel matches its layout on disk
///
/// | Format    | Bytes | Layout          |
/// |-----------|-------|-----------------|
/// | Rgb       | 4     | `r, g, b, a`    |
/// | Grayscale | 2     | `value, alpha`  |
/// | Indexed   | 1     | palette index   |
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PixelFormat {
    Rgb,
    Grayscale,
    Indexed
}

impl PixelFormat {
    /// Number of bytes a single pixel occupies
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb => 4,
            PixelFormat::Grayscale => 2,
            PixelFormat::Indexed => 1
        }
    }
    /// The value stored in the depth field of the file header
    pub const fn color_depth(self) -> u16 {
        match self {
            PixelFormat::Rgb => 32,
            PixelFormat::Grayscale => 16,
            PixelFormat::Indexed => 8
        }
    }
    /// Map a header depth field to a pixel format
    ///
    /// Returns `None` for depths other than 32, 16 and 8
    pub const fn from_color_depth(depth: u16) -> Option<PixelFormat> {
        match depth {
            32 => Some(PixelFormat::Rgb),
            16 => Some(PixelFormat::Grayscale),
            8 => Some(PixelFormat::Indexed),
            _ => None
        }
    }
    /// The colorspace pixels expand to
    ///
    /// Indexed pixels expand to RGBA once looked up in the palette
    pub const fn colorspace(self) -> ColorSpace {
        match self {
            PixelFormat::Rgb | PixelFormat::Indexed => ColorSpace::RGBA,
            PixelFormat::Grayscale => ColorSpace::LumaA
        }
    }
}

/// A rectangular pixel buffer in one of the [`PixelFormat`]s
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Image {
    format: PixelFormat,
    width:  usize,
    height: usize,
    pixels: Vec<u8>
}

impl Image {
    /// Create an image with all bytes set to zero
    ///
    /// For RGB and grayscale this is a fully transparent image,
    /// for indexed images every pixel points to entry zero.
    pub fn new(format: PixelFormat, width: usize, height: usize) -> Image {
        Image {
            format,
            width,
            height,
            pixels: vec![0; width * height * format.bytes_per_pixel()]
        }
    }
    /// Wrap existing pixels
    ///
    /// # Errors
    /// If `pixels.len()` is not `width * height * format.bytes_per_pixel()`
    pub fn from_pixels(
        format: PixelFormat, width: usize, height: usize, pixels: Vec<u8>
    ) -> Result<Image, &'static str> {
        let expected = width
            .checked_mul(height)
            .and_then(|x| x.checked_mul(format.bytes_per_pixel()))
            .ok_or("Image dimensions overflow")?;

        if expected != pixels.len() {
            return Err("Pixel buffer length does not match image dimensions");
        }
        Ok(Image {
            format,
            width,
            height,
            pixels
        })
    }
    pub const fn format(&self) -> PixelFormat {
        self.format
    }
    pub const fn width(&self) -> usize {
        self.width
    }
    pub const fn height(&self) -> usize {
        self.height
    }
    /// Number of bytes in a single row
    pub const fn stride(&self) -> usize {
        self.width * self.format.bytes_per_pixel()
    }
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
    /// Return row `y`
    ///
    /// # Panics
    /// If `y` is out of bounds
    pub fn row(&self, y: usize) -> &[u8] {
        let stride = self.stride();
        &self.pixels[y * stride..(y + 1) * stride]
    }
    /// Return row `y` for modification
    ///
    /// # Panics
    /// If `y` is out of bounds
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let stride = self.stride();
        &mut self.pixels[y * stride..(y + 1) * stride]
    }
    /// Return the bytes making up the pixel at `(x, y)`, `None` outside the image
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let start = (y * self.width + x) * bpp;

        Some(&self.pixels[start..start + bpp])
    }
    /// Overwrite the pixel at `(x, y)`
    ///
    /// Writes outside the image and pixels of the wrong size are ignored.
    pub fn put_pixel(&mut self, x: usize, y: usize, pixel: &[u8]) {
        let bpp = self.format.bytes_per_pixel();

        if x >= self.width || y >= self.height || pixel.len() != bpp {
            return;
        }
        let start = (y * self.width + x) * bpp;
        self.pixels[start..start + bpp].copy_from_slice(pixel);
    }
}

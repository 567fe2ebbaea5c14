/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![cfg(feature = "serde")]

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::image::PixelFormat;
use crate::sprite::{BlendMode, LayerKind, SpriteInfo};

impl Serialize for SpriteInfo {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        const STRUCT_FIELDS: usize = 7;
        let mut state = serializer.serialize_struct("SpriteInfo", STRUCT_FIELDS)?;

        state.serialize_field("width", &self.width)?;
        state.serialize_field("height", &self.height)?;
        state.serialize_field("frames", &self.frames)?;
        state.serialize_field("pixel_format", &self.pixel_format)?;
        state.serialize_field("colorspace", &self.pixel_format.colorspace())?;
        state.serialize_field("layers", &self.layers)?;
        state.serialize_field("palettes", &self.palettes)?;

        state.end()
    }
}

impl Serialize for PixelFormat {
    #[allow(clippy::uninlined_format_args)]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        serializer.serialize_str(&format!("{:?}", self))
    }
}

impl Serialize for LayerKind {
    #[allow(clippy::uninlined_format_args)]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        serializer.serialize_str(&format!("{:?}", self))
    }
}

impl Serialize for BlendMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        // the raw mode number, modes are not interpreted by the codec
        serializer.serialize_u16(self.0)
    }
}

/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The in memory sprite the codec reads into and writes from
//!
//! A sprite owns every layer in an arena, layers are addressed by [`LayerId`].
//! Index zero is always the root folder, which is never written to disk.
use std::collections::BTreeMap;

use crate::constants::DEFAULT_FRAME_DURATION;
use crate::image::{Image, PixelFormat};
use crate::palette::Palette;

/// Handle to a layer inside a [`Sprite`]
///
/// Handles stay valid for the lifetime of the sprite that produced them,
/// layers are never removed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LayerId(usize);

/// What a layer holds
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LayerKind {
    /// A layer holding cels
    Image,
    /// A layer holding other layers
    Folder
}

/// How an image layer is composited
///
/// The value is carried through the codec untouched.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct BlendMode(pub u16);

impl BlendMode {
    pub const NORMAL: BlendMode = BlendMode(0);
}

/// Placement of an image on a layer at a frame
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cel {
    pub x:       i16,
    pub y:       i16,
    pub opacity: u8,
    /// `None` when the cel has no pixels, e.g. zero sized or undecodable
    pub image:   Option<Image>
}

impl Cel {
    pub fn new(x: i16, y: i16, opacity: u8, image: Option<Image>) -> Cel {
        Cel {
            x,
            y,
            opacity,
            image
        }
    }
}

/// A node of the layer tree
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layer {
    name:       Vec<u8>,
    flags:      u16,
    kind:       LayerKind,
    blend_mode: BlendMode,
    parent:     Option<LayerId>,
    children:   Vec<LayerId>,
    cels:       BTreeMap<usize, Cel>
}

impl Layer {
    fn new(kind: LayerKind, name: Vec<u8>) -> Layer {
        Layer {
            name,
            flags: 0,
            kind,
            blend_mode: BlendMode::NORMAL,
            parent: None,
            children: Vec::new(),
            cels: BTreeMap::new()
        }
    }
    /// Create a layer which can hold cels
    pub fn new_image(name: impl Into<Vec<u8>>) -> Layer {
        Layer::new(LayerKind::Image, name.into())
    }
    /// Create a layer which can hold other layers
    pub fn new_folder(name: impl Into<Vec<u8>>) -> Layer {
        Layer::new(LayerKind::Folder, name.into())
    }
    /// The layer name, an opaque run of bytes
    pub fn name(&self) -> &[u8] {
        &self.name
    }
    pub fn set_name(&mut self, name: impl Into<Vec<u8>>) {
        self.name = name.into();
    }
    pub const fn flags(&self) -> u16 {
        self.flags
    }
    pub fn set_flags(&mut self, flags: u16) {
        self.flags = flags;
    }
    pub const fn kind(&self) -> LayerKind {
        self.kind
    }
    pub const fn is_image(&self) -> bool {
        matches!(self.kind, LayerKind::Image)
    }
    pub const fn is_folder(&self) -> bool {
        matches!(self.kind, LayerKind::Folder)
    }
    /// Blend mode, only meaningful for image layers
    pub const fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }
    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }
    /// The folder containing this layer, `None` for the root
    pub const fn parent(&self) -> Option<LayerId> {
        self.parent
    }
    /// Layers of a folder from bottom to top
    pub fn children(&self) -> &[LayerId] {
        &self.children
    }
    pub fn cel(&self, frame: usize) -> Option<&Cel> {
        self.cels.get(&frame)
    }
    /// Iterate over `(frame, cel)` pairs in frame order
    pub fn cels(&self) -> impl Iterator<Item = (usize, &Cel)> {
        self.cels.iter().map(|(frame, cel)| (*frame, cel))
    }
}

/// A layered, animated sprite
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Sprite {
    width:             usize,
    height:            usize,
    format:            PixelFormat,
    transparent_index: u8,
    durations:         Vec<u16>,
    palettes:          Vec<Palette>,
    layers:            Vec<Layer>
}

const ROOT: LayerId = LayerId(0);

impl Sprite {
    /// Create a one frame sprite with an empty root folder
    ///
    /// The sprite gets a palette of `palette_size` opaque black entries
    /// starting at frame zero.
    pub fn new(format: PixelFormat, width: usize, height: usize, palette_size: usize) -> Sprite {
        Sprite {
            width,
            height,
            format,
            transparent_index: 0,
            durations: vec![DEFAULT_FRAME_DURATION],
            palettes: vec![Palette::new(0, palette_size)],
            layers: vec![Layer::new_folder(Vec::new())]
        }
    }
    pub const fn width(&self) -> usize {
        self.width
    }
    pub const fn height(&self) -> usize {
        self.height
    }
    /// Return `(width, height)`
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
    pub const fn pixel_format(&self) -> PixelFormat {
        self.format
    }
    /// Palette entry treated as transparent in indexed sprites
    pub const fn transparent_index(&self) -> u8 {
        self.transparent_index
    }
    pub fn set_transparent_index(&mut self, index: u8) {
        self.transparent_index = index;
    }

    pub fn frame_count(&self) -> usize {
        self.durations.len()
    }
    /// Change the number of frames
    ///
    /// New frames take the duration of the current last frame.
    /// A sprite always has at least one frame. Cels on removed frames are dropped.
    pub fn set_frame_count(&mut self, frames: usize) {
        let frames = frames.max(1);
        let last = self
            .durations
            .last()
            .copied()
            .unwrap_or(DEFAULT_FRAME_DURATION);

        self.durations.resize(frames, last);

        for layer in &mut self.layers {
            layer.cels.retain(|frame, _| *frame < frames);
        }
    }
    /// Duration of `frame` in milliseconds
    pub fn frame_duration(&self, frame: usize) -> Option<u16> {
        self.durations.get(frame).copied()
    }
    /// Set the duration of `frame`, durations are at least one millisecond
    pub fn set_frame_duration(&mut self, frame: usize, duration: u16) -> Result<(), &'static str> {
        let slot = self
            .durations
            .get_mut(frame)
            .ok_or("Frame out of range")?;
        *slot = duration.max(1);
        Ok(())
    }
    pub fn set_duration_for_all_frames(&mut self, duration: u16) {
        self.durations.fill(duration.max(1));
    }

    /// The invisible folder holding all top level layers
    pub const fn root(&self) -> LayerId {
        ROOT
    }
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0)
    }
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(id.0)
    }
    /// Number of layers excluding the root folder
    pub fn layer_count(&self) -> usize {
        self.layers.len() - 1
    }
    /// Append `layer` on top of the children of `parent`
    ///
    /// # Errors
    /// If `parent` does not exist or is not a folder
    pub fn add_layer(&mut self, parent: LayerId, mut layer: Layer) -> Result<LayerId, &'static str> {
        let id = LayerId(self.layers.len());
        let folder = self
            .layers
            .get_mut(parent.0)
            .ok_or("Parent layer does not exist")?;

        if !folder.is_folder() {
            return Err("Parent layer is not a folder");
        }
        folder.children.push(id);

        layer.parent = Some(parent);
        layer.children.clear();
        self.layers.push(layer);

        Ok(id)
    }
    /// Number of parent links between `id` and the root minus one
    ///
    /// Top level layers have depth zero, the root has no depth.
    pub fn depth(&self, id: LayerId) -> Option<u16> {
        let mut parent = self.layer(id)?.parent?;
        let mut depth = 0_u16;

        while let Some(next) = self.layers[parent.0].parent {
            depth = depth.saturating_add(1);
            parent = next;
        }
        Some(depth)
    }
    /// Every layer except the root in pre-order
    ///
    /// A folder comes before its children, children are visited bottom to top.
    /// Cels on disk refer to layers by their position in this list.
    pub fn layer_indices(&self) -> Vec<LayerId> {
        let mut order = Vec::with_capacity(self.layer_count());
        let mut stack: Vec<LayerId> = self.layers[ROOT.0].children.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.layers[id.0].children.iter().rev());
        }
        order
    }
    /// Position of `id` in [`layer_indices`](Self::layer_indices)
    pub fn index_of_layer(&self, id: LayerId) -> Option<usize> {
        self.layer_indices().iter().position(|x| *x == id)
    }
    /// Layer at position `index` of [`layer_indices`](Self::layer_indices)
    pub fn layer_at_index(&self, index: usize) -> Option<LayerId> {
        self.layer_indices().get(index).copied()
    }

    pub fn cel(&self, layer: LayerId, frame: usize) -> Option<&Cel> {
        self.layer(layer)?.cel(frame)
    }
    pub fn cel_mut(&mut self, layer: LayerId, frame: usize) -> Option<&mut Cel> {
        self.layer_mut(layer)?.cels.get_mut(&frame)
    }
    /// Place `cel` on `layer` at `frame`, returning the cel it replaced
    ///
    /// # Errors
    /// If the layer does not exist, is a folder or the frame is out of range
    pub fn set_cel(&mut self, layer: LayerId, frame: usize, cel: Cel) -> Result<Option<Cel>, &'static str> {
        if frame >= self.frame_count() {
            return Err("Frame out of range");
        }
        let layer = self.layer_mut(layer).ok_or("Layer does not exist")?;

        if !layer.is_image() {
            return Err("Cels can only be placed on image layers");
        }
        Ok(layer.cels.insert(frame, cel))
    }
    pub fn remove_cel(&mut self, layer: LayerId, frame: usize) -> Option<Cel> {
        self.layer_mut(layer)?.cels.remove(&frame)
    }

    /// The palette active at `frame`
    ///
    /// This is the palette with the greatest start frame not after `frame`
    pub fn palette(&self, frame: usize) -> &Palette {
        self.palettes
            .iter()
            .rev()
            .find(|p| p.frame() <= frame)
            .unwrap_or(&self.palettes[0])
    }
    /// All palettes ordered by start frame
    pub fn palettes(&self) -> &[Palette] {
        &self.palettes
    }
    /// Install `palette` at its frame, replacing a palette starting at the same frame
    pub fn set_palette(&mut self, palette: Palette) {
        match self
            .palettes
            .binary_search_by_key(&palette.frame(), Palette::frame)
        {
            Ok(pos) => self.palettes[pos] = palette,
            Err(pos) => self.palettes.insert(pos, palette)
        }
    }

    /// Summary of the sprite, useful for logging and serialization
    pub fn info(&self) -> SpriteInfo {
        SpriteInfo {
            width:        self.width,
            height:       self.height,
            frames:       self.frame_count(),
            pixel_format: self.format,
            layers:       self.layer_count(),
            palettes:     self.palettes.len()
        }
    }
}

/// Sprite properties without pixel data
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SpriteInfo {
    pub width:        usize,
    pub height:       usize,
    pub frames:       usize,
    pub pixel_format: PixelFormat,
    pub layers:       usize,
    pub palettes:     usize
}

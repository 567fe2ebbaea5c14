/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Layer chunks and layer tree reconstruction
//!
//! Layers are stored flat in pre-order, each tagged with its depth below the
//! root folder. The tree is rebuilt by comparing each depth with the depth of
//! the layer read before it.
use zune_core::bytestream::{ZByteReaderTrait, ZByteWriterTrait, ZReader, ZWriter};
use zune_core::log::trace;

use crate::chunks::{read_string, write_string, ChunkType, ChunkWriter};
use crate::constants::{LAYER_FOLDER, LAYER_IMAGE};
use crate::errors::{AseEncodeErrors, ChunkErrors, ChunkFault};
use crate::sprite::{BlendMode, Layer, LayerId, LayerKind, Sprite};

/// Payload of a layer chunk
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct LayerRecord {
    pub flags:      u16,
    pub kind:       u16,
    pub depth:      u16,
    pub blend_mode: u16,
    pub name:       Vec<u8>
}

impl LayerRecord {
    pub fn read<T: ZByteReaderTrait>(reader: &mut ZReader<T>) -> Result<LayerRecord, ChunkFault> {
        let flags = reader.get_u16_le_err()?;
        let kind = reader.get_u16_le_err()?;
        let depth = reader.get_u16_le_err()?;
        // legacy default width and height
        reader.skip(4)?;
        let blend_mode = reader.get_u16_le_err()?;
        reader.skip(4)?;
        let name = read_string(reader)?;

        Ok(LayerRecord {
            flags,
            kind,
            depth,
            blend_mode,
            name
        })
    }

    fn into_layer(self) -> Result<Layer, ChunkErrors> {
        let mut layer = match self.kind {
            LAYER_IMAGE => Layer::new_image(self.name),
            LAYER_FOLDER => Layer::new_folder(self.name),
            kind => return Err(ChunkErrors::UnknownLayerKind(kind))
        };
        layer.set_flags(self.flags);

        if layer.is_image() {
            layer.set_blend_mode(BlendMode(self.blend_mode));
        }
        Ok(layer)
    }
}

/// Rebuilds the layer tree from the flat sequence of layer chunks
///
/// It also remembers the order layers were inserted in, which is the
/// index cel chunks use to refer to their layer.
pub(crate) struct LayerTreeBuilder {
    previous:      LayerId,
    current_level: i32,
    index:         Vec<LayerId>
}

impl LayerTreeBuilder {
    pub fn new(sprite: &Sprite) -> LayerTreeBuilder {
        LayerTreeBuilder {
            previous:      sprite.root(),
            current_level: -1,
            index:         Vec::new()
        }
    }

    /// Attach the layer described by `record` to the tree
    ///
    /// On success returns the new layer and, when the depth pointed below an
    /// image layer, the fix-up that was applied.
    pub fn insert(
        &mut self, sprite: &mut Sprite, record: LayerRecord
    ) -> Result<(LayerId, Option<ChunkErrors>), ChunkErrors> {
        let depth = record.depth;
        let level = i32::from(depth);
        let layer = record.into_layer()?;

        let root = sprite.root();
        let mut fixup = None;

        let parent = if level == self.current_level {
            parent_of(sprite, self.previous)
        } else if level > self.current_level {
            let previous_kind = sprite.layer(self.previous).map(Layer::kind);

            if previous_kind == Some(LayerKind::Folder) {
                self.previous
            } else {
                fixup = Some(ChunkErrors::LayerAttachedAsSibling(depth));
                parent_of(sprite, self.previous)
            }
        } else {
            // walk up to the ancestor sharing our depth and become its sibling
            let mut ancestor = self.previous;

            for _ in 0..(self.current_level - level) {
                if ancestor == root {
                    break;
                }
                ancestor = parent_of(sprite, ancestor);
            }
            parent_of(sprite, ancestor)
        };

        let id = sprite
            .add_layer(parent, layer)
            .map_err(|_| ChunkErrors::DetachedLayer(depth))?;
        trace!("Layer {} at depth {depth} attached to {parent:?}", self.index.len());

        self.previous = id;
        self.current_level = level;
        self.index.push(id);

        Ok((id, fixup))
    }

    /// Layer that was inserted `index`-th
    pub fn layer_at(&self, index: usize) -> Option<LayerId> {
        self.index.get(index).copied()
    }
}

/// Parent of `id`, the root stands in for missing parents
fn parent_of(sprite: &Sprite, id: LayerId) -> LayerId {
    sprite
        .layer(id)
        .and_then(Layer::parent)
        .unwrap_or(sprite.root())
}

/// Write the layer chunk describing `id`
pub(crate) fn write_layer_chunk<T: ZByteWriterTrait>(
    writer: &mut ZWriter<T>, chunks: &mut ChunkWriter, sprite: &Sprite, id: LayerId
) -> Result<(), AseEncodeErrors> {
    let layer = sprite.layer(id).ok_or("Layer does not belong to sprite")?;
    let depth = sprite.depth(id).ok_or("The root folder has no layer chunk")?;

    chunks.start_chunk(writer, ChunkType::Layer)?;

    writer.write_u16_le_err(layer.flags())?;
    writer.write_u16_le_err(match layer.kind() {
        LayerKind::Image => LAYER_IMAGE,
        LayerKind::Folder => LAYER_FOLDER
    })?;
    writer.write_u16_le_err(depth)?;
    // legacy default width and height
    writer.write_zeros(4)?;
    writer.write_u16_le_err(if layer.is_image() {
        layer.blend_mode().0
    } else {
        0
    })?;
    writer.write_zeros(4)?;
    write_string(writer, layer.name())?;

    chunks.close_chunk(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PixelFormat;

    fn record(kind: u16, depth: u16, name: &str) -> LayerRecord {
        LayerRecord {
            flags: 1,
            kind,
            depth,
            blend_mode: 0,
            name: name.as_bytes().to_vec()
        }
    }

    fn names(sprite: &Sprite, ids: &[LayerId]) -> Vec<String> {
        ids.iter()
            .map(|id| String::from_utf8_lossy(sprite.layer(*id).unwrap().name()).to_string())
            .collect()
    }

    #[test]
    fn rebuilds_nested_folders() {
        let mut sprite = Sprite::new(PixelFormat::Rgb, 4, 4, 1);
        let mut builder = LayerTreeBuilder::new(&sprite);

        // a
        // f
        //   g
        //     b
        //   c
        // d
        let layers = [
            record(LAYER_IMAGE, 0, "a"),
            record(LAYER_FOLDER, 0, "f"),
            record(LAYER_FOLDER, 1, "g"),
            record(LAYER_IMAGE, 2, "b"),
            record(LAYER_IMAGE, 1, "c"),
            record(LAYER_IMAGE, 0, "d")
        ];
        for layer in layers {
            let (_, fixup) = builder.insert(&mut sprite, layer).unwrap();
            assert!(fixup.is_none());
        }
        let order = sprite.layer_indices();
        assert_eq!(names(&sprite, &order), ["a", "f", "g", "b", "c", "d"]);

        let depths: Vec<_> = order.iter().map(|id| sprite.depth(*id).unwrap()).collect();
        assert_eq!(depths, [0, 0, 1, 2, 1, 0]);

        for (i, id) in order.iter().enumerate() {
            assert_eq!(builder.layer_at(i), Some(*id));
        }
    }

    #[test]
    fn walks_up_several_levels() {
        let mut sprite = Sprite::new(PixelFormat::Rgb, 4, 4, 1);
        let mut builder = LayerTreeBuilder::new(&sprite);

        for layer in [
            record(LAYER_FOLDER, 0, "f"),
            record(LAYER_FOLDER, 1, "g"),
            record(LAYER_IMAGE, 2, "b"),
            record(LAYER_IMAGE, 0, "top")
        ] {
            builder.insert(&mut sprite, layer).unwrap();
        }
        let top = builder.layer_at(3).unwrap();
        assert_eq!(sprite.layer(top).unwrap().parent(), Some(sprite.root()));
    }

    #[test]
    fn child_of_image_becomes_sibling() {
        let mut sprite = Sprite::new(PixelFormat::Rgb, 4, 4, 1);
        let mut builder = LayerTreeBuilder::new(&sprite);

        let (image, _) = builder.insert(&mut sprite, record(LAYER_IMAGE, 0, "a")).unwrap();
        let (child, fixup) = builder.insert(&mut sprite, record(LAYER_IMAGE, 1, "b")).unwrap();

        assert!(matches!(fixup, Some(ChunkErrors::LayerAttachedAsSibling(1))));
        assert_eq!(
            sprite.layer(child).unwrap().parent(),
            sprite.layer(image).unwrap().parent()
        );
    }

    #[test]
    fn unknown_kind_creates_nothing() {
        let mut sprite = Sprite::new(PixelFormat::Rgb, 4, 4, 1);
        let mut builder = LayerTreeBuilder::new(&sprite);

        let result = builder.insert(&mut sprite, record(7, 0, "?"));
        assert!(matches!(result, Err(ChunkErrors::UnknownLayerKind(7))));
        assert_eq!(sprite.layer_count(), 0);
        assert_eq!(builder.layer_at(0), None);
    }
}

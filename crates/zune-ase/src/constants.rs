/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// Magic number stored at offset 4 of every `.ase` file
pub const ASE_MAGIC: u16 = 0xA5E0;
/// Magic number stored at offset 4 of every frame header
pub const ASE_FRAME_MAGIC: u16 = 0xF1FA;

pub const ASE_HEADER_SIZE: usize = 128;
pub const ASE_FRAME_HEADER_SIZE: usize = 16;
/// u32 size + u16 type
pub const ASE_CHUNK_PREFIX_SIZE: usize = 6;

// chunk type codes
pub const CHUNK_FLI_COLOR2: u16 = 0x0004;
pub const CHUNK_FLI_COLOR: u16 = 0x000B;
pub const CHUNK_LAYER: u16 = 0x2004;
pub const CHUNK_CEL: u16 = 0x2005;
pub const CHUNK_MASK: u16 = 0x2016;
pub const CHUNK_PATH: u16 = 0x2017;

// cel type codes
pub const CEL_RAW: u16 = 0;
pub const CEL_LINK: u16 = 1;
pub const CEL_COMPRESSED: u16 = 2;

// layer kind codes
pub const LAYER_IMAGE: u16 = 0;
pub const LAYER_FOLDER: u16 = 1;

/// Duration given to frames of a freshly created sprite
pub const DEFAULT_FRAME_DURATION: u16 = 100;

/// Largest number of entries a palette can hold on the wire
pub const MAX_PALETTE_SIZE: usize = 256;

/// Most bytes a single byte of deflate data can expand to
pub const MAX_INFLATE_RATIO: u64 = 1032;

/// Size of the bounded reads feeding the inflater and of the deflater output buffer
pub const COMPRESSED_BUFFER_SIZE: usize = 4096;

const fn rgb_scale_6() -> [u8; 64] {
    let mut table = [0; 64];
    let mut i = 0;

    while i < 64 {
        // replicate the top bits into the low ones, 62 -> 251
        table[i] = ((i << 2) | (i >> 4)) as u8;
        i += 1;
    }
    table
}

/// Maps the 6 bit components of the legacy palette chunk to 8 bits
pub static RGB_SCALE_6: [u8; 64] = rgb_scale_6();

#[test]
fn scale_table_endpoints() {
    assert_eq!(RGB_SCALE_6[0], 0);
    assert_eq!(RGB_SCALE_6[1], 4);
    assert_eq!(RGB_SCALE_6[15], 60);
    assert_eq!(RGB_SCALE_6[16], 65);
    assert_eq!(RGB_SCALE_6[21], 85);
    assert_eq!(RGB_SCALE_6[32], 130);
    assert_eq!(RGB_SCALE_6[62], 251);
    assert_eq!(RGB_SCALE_6[63], 255);
}

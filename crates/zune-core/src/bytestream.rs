/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A simple implementation of a bytestream reader
//! and writer.
//!
//! This module contains two main structs that help in
//! byte reading and byte writing
//!
//! - [`ZReader`]: endian aware reads over anything implementing [`ZByteReaderTrait`],
//!   with [`ZCursor`] as the in-memory source.
//! - [`ZWriter`]: endian aware writes over anything implementing [`ZByteWriterTrait`],
//!   which must be seekable so that containers with size prefixes can go back
//!   and patch them once the payload length is known.
pub use reader::zcursor::ZCursor;
pub use reader::{ZByteIoError, ZReader, ZSeekFrom};
pub use traits::{ZByteReaderTrait, ZByteWriterTrait};
pub use writer::ZWriter;

mod reader;
mod traits;
mod writer;

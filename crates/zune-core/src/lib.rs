//! Core routines shared by the sprite codec
//!
//! This crate provides a set of core routines shared
//! by the decoder and encoder under the `zune` umbrella
//!
//! It currently contains
//!
//! - A bytestream reader with endian aware reads and bounds aware seeking
//! - A seekable bytestream writer which allows going back to patch sizes
//! - Colorspace information shared by images
//! - Decoder and encoder options
//! - Logging macros which compile away when the `log` feature is off
//!
//! This library is `#[no_std]` with `alloc` needed for defining `Vec`
//! unless the `std` feature is enabled, which adds readers and writers
//! over `std::io` types.
//!
//! # Features
//!  - `std`: Enables readers and writers for `std::io` types.
//!
//!  - `log`: Forwards the logging macros to the `log` crate.
//!
//!  - `serde`: Enables serializing of some of the data structures
//!     present in the crate
//!
#![cfg_attr(not(feature = "std"), no_std)]
#![macro_use]
extern crate alloc;

pub mod bytestream;
pub mod colorspace;
pub mod log;
pub mod options;
pub mod serde;

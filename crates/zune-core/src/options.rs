//! Decoder and Encoder Options
//!
//! This module exposes the structs through which the decoder
//! and encoder get their configuration
//!
//! All supported options are put into one _Options to allow for global configurations
//! options e.g the same `DecoderOption` can be reused for every file decoded
//!
pub use decoder::DecoderOptions;
pub use encoder::EncoderOptions;

mod decoder;
mod encoder;

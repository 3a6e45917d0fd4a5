#![warn(clippy::pedantic)]

pub mod batch_encoder;
pub mod bitplane;
pub mod compression;
pub mod error;

pub use batch_encoder::BatchEncoder;
pub use bitplane::{encode_bits, encode_rows, BitPlanes};
pub use error::EncodeError;

#![warn(clippy::pedantic)]

pub mod bitpack;
pub mod chunk;
pub mod codec;
pub mod error;
pub mod frame;

pub use codec::{BlockCodec, CodecKind, Lz4Codec, ZstdCodec};
pub use error::{CodecError, WireError};

#![warn(clippy::pedantic)]

pub mod bitplane;
pub mod client;
pub mod decoder;
pub mod decompression;
pub mod error;

pub use bitplane::decode_planes;
pub use client::Client;
pub use decoder::{DecodedResponse, PlaneStats, ResponseDecoder};
pub use error::DecodeError;

#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod producer;
pub mod response;
pub mod server;
pub mod store;

pub use config::ServerConfig;
pub use error::ServerError;
pub use producer::{Producer, SampleSource};
pub use server::{QueryHandler, Server};
pub use store::BatchStore;

#![warn(clippy::pedantic)]

pub mod batch;
pub mod error;
pub mod header;
pub mod plane;
pub mod request;
pub mod sample;

pub use batch::{Batch, PlaneBlocks};
pub use error::TypeError;
pub use header::{CompressionInfo, ResponseHeader, SegmentInfo, DTYPE_FP16};
pub use plane::{choose_planes, MANDATORY_PLANES, PLANE_COUNT};
pub use request::QueryRequest;
pub use sample::{PackedPlane, SampleMatrix, SampleRow};

pub use half::f16;

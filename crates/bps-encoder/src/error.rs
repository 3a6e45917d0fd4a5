use bps_wire::CodecError;

/// Errors that can occur while turning sample rows into a [`Batch`].
///
/// ```text
///   EncodeError
///   ├── RowWidthMismatch  ← a row does not have one value per sensor
///   ├── NoSensors         ← encoder configured with an empty sensor list
///   ├── EmptyBatch        ← encoder configured with zero rows per batch
///   └── Codec(CodecError) ← block compression failed
/// ```
///
/// [`Batch`]: bps_types::Batch
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("row {row} has {actual} values, expected {expected}")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("at least one sensor is required")]
    NoSensors,

    #[error("batch size must be at least one row")]
    EmptyBatch,

    #[error(transparent)]
    Codec(#[from] CodecError),
}

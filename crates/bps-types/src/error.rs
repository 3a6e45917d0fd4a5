/// Errors raised while constructing data-model values.
///
/// ```text
///   TypeError
///   ├── InvalidPlane   ← plane index outside 0..=15
///   └── MatrixShape    ← value count is not a multiple of the sensor count
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    #[error("plane index {plane} out of range 0..=15")]
    InvalidPlane { plane: u8 },

    #[error("{len} values cannot be shaped into rows of {sensors} sensors")]
    MatrixShape { len: usize, sensors: usize },
}

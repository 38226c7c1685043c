use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantizeError {
    #[error("pixel input cannot be empty")]
    EmptyInput,

    #[error("max_colors must be between 2 and 256, got {0}")]
    InvalidMaxColors(u32),

    /// A guarded branch in the splitter or refinement loop was reached.
    /// Never produced for validated input.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(&'static str),
}

impl QuantizeError {
    /// Whether this error was caused by the caller's arguments rather than
    /// by the algorithm itself.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::InvalidMaxColors(_))
    }
}

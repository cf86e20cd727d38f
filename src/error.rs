//! Error types for grid operations.

use thiserror::Error;

/// Errors returned by [`LayoutGrid`](crate::layout::LayoutGrid) and the codec.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Snapshot length is not a whole number of records.
    /// Only produced by [`decode_checked`](crate::codec::decode_checked).
    #[error(
        "malformed buffer: {len} bytes leaves {trailing} trailing bytes after the last full record"
    )]
    MalformedBuffer { len: usize, trailing: usize },

    /// The overlap resolver ran out of displacement budget.
    #[error("overlap resolution exceeded {steps} displacements")]
    ResolutionLimitExceeded { steps: usize },

    /// A rectangle or parameter was non-finite or out of range.
    #[error("invalid input: {field} = {value}")]
    InvalidInput { field: &'static str, value: f64 },
}

impl GridError {
    /// Short machine-readable name, used in JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            GridError::MalformedBuffer { .. } => "malformed_buffer",
            GridError::ResolutionLimitExceeded { .. } => "resolution_limit_exceeded",
            GridError::InvalidInput { .. } => "invalid_input",
        }
    }
}

pub type Result<T> = std::result::Result<T, GridError>;

//! Central error handling for swell3d
//!
//! Provides a unified DeformError enum covering argument validation,
//! buffer shape checks, and faults surfaced from parallel kernel execution.

/// Centralized error type for all deformation operations
#[derive(thiserror::Error, Debug)]
pub enum DeformError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("kernel fault: {0}")]
    KernelFault(String),

    #[error("a dispatch is already in flight for this surface")]
    DispatchInFlight,

    #[error("worker pool is shut down")]
    PoolShutdown,
}

impl DeformError {
    /// Convenience constructors for common error types
    pub fn invalid_argument<T: ToString>(msg: T) -> Self {
        DeformError::InvalidArgument(msg.to_string())
    }

    pub fn kernel_fault<T: ToString>(msg: T) -> Self {
        DeformError::KernelFault(msg.to_string())
    }

    pub fn shape_mismatch(expected: usize, actual: usize) -> Self {
        DeformError::ShapeMismatch { expected, actual }
    }
}

/// Result type alias for deformation operations
pub type DeformResult<T> = Result<T, DeformError>;

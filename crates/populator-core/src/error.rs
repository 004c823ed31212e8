use thiserror::Error;

/// Core error type shared across populator crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested run configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// An allocation step lost or invented units. Indicates a defect.
    #[error("allocation invariant violated: expected {expected} units, got {actual}")]
    AllocationInvariant { expected: usize, actual: usize },
}

/// Convenience alias for results returned by populator crates.
pub type Result<T> = std::result::Result<T, Error>;

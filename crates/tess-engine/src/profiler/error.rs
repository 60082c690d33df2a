use thiserror::Error;

/// Errors raised by the profiler and its query backends.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfilerError {
    /// A query object could not be allocated.
    #[error("failed to create GPU query: {0}")]
    ResourceCreationFailed(String),

    /// A result was requested before the GPU finished writing it.
    #[error("GPU query result is not ready")]
    QueryNotReady,

    /// The device could not hand the recorded value back to the CPU.
    #[error("GPU query read-back failed")]
    ReadbackFailed,

    /// The device lacks a capability the backend needs.
    #[error("GPU timing unsupported: {0}")]
    Unsupported(&'static str),
}

use std::collections::TryReserveError;
use thiserror::Error;

/// Everything that can go wrong before or while starting a dithering run.
///
/// All variants are setup-time failures. Once workers are running, the
/// kernel is total and nothing is retried.
#[derive(Debug, Error)]
pub enum DitherError {
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("sample buffer holds {actual} values, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("failed to allocate {what} for {cells} cells: {source}")]
    AllocationFailure {
        what: &'static str,
        cells: usize,
        #[source]
        source: TryReserveError,
    },

    #[cfg(feature = "rayon")]
    #[error("failed to start wavefront workers: {0}")]
    ThreadCreationFailure(#[from] rayon::ThreadPoolBuildError),
}

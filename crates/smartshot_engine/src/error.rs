use thiserror::Error;

use crate::host::HostError;

/// Storage-layer failure, wrapping the host's key-value store error.
/// The only reconciliation error that reaches a caller; per-record
/// problems are filtered silently instead.
#[derive(Debug, Error)]
#[error("storage error: {0}")]
pub struct StoreError(#[from] pub HostError);

/// Failure of one capture-flow invocation. Terminal for that invocation:
/// logged by the caller, never retried.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no active surface")]
    NoActiveSurface,
    #[error("surface capture returned no data")]
    CaptureFailed,
    #[error(transparent)]
    Storage(#[from] StoreError),
}

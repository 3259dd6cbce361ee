use std::time::Duration;

use smartshot_core::DownloadStatus;
use tokio::sync::broadcast;

use crate::host::{DownloadId, DownloadState, StateChange};

/// How long a download may stay non-terminal before we stop waiting.
pub const DEFAULT_TRACK_TIMEOUT: Duration = Duration::from_secs(15);

/// Waits for the first terminal state-change event for `id`.
///
/// The state machine is `Created -> {Complete, Interrupted, TimedOut}`:
/// the first `complete` or `interrupted` event for this id resolves it,
/// and elapsing the timeout resolves it to `TimedOut`. Resolving twice is
/// impossible: the future completes once and the receiver is dropped on
/// return, so a late event cannot fire again for the same id.
pub async fn await_terminal(
    mut events: broadcast::Receiver<StateChange>,
    id: DownloadId,
    timeout: Duration,
) -> DownloadStatus {
    let first_terminal = async {
        loop {
            match events.recv().await {
                Ok(change) if change.id == id => match change.state {
                    DownloadState::Complete => return DownloadStatus::Complete,
                    DownloadState::Interrupted => return DownloadStatus::Interrupted,
                    DownloadState::InProgress => {}
                },
                // Events for other downloads are ignored.
                Ok(_) => {}
                // A lagged receiver skips what it missed and keeps waiting.
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                // No more events can arrive; treat as a timed-out wait.
                Err(broadcast::error::RecvError::Closed) => return DownloadStatus::TimedOut,
            }
        }
    };

    match tokio::time::timeout(timeout, first_terminal).await {
        Ok(status) => status,
        Err(_) => DownloadStatus::TimedOut,
    }
}

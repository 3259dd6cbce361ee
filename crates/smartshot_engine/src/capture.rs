use chrono::{DateTime, Utc};
use smartshot_core::capture_filename;

use crate::error::{CaptureError, StoreError};
use crate::host::{ConflictPolicy, ImageFormat, SaveRequest, SurfaceHost};

/// The one named command the capture coordinator reacts to.
pub const SCREENSHOT_COMMAND: &str = "take-screenshot";

/// One screenshot of the active surface: resolve the tab, derive a
/// filename from its title, capture PNG bytes, and hand them to the host
/// to save with auto-rename on conflict and no save-location prompt.
///
/// Stateless between invocations and single best-effort: there is no
/// retry, and overlapping invocations run independently against the
/// host's capture service. Returns the composed filename.
pub async fn capture_active_surface(
    host: &dyn SurfaceHost,
    now: DateTime<Utc>,
) -> Result<String, CaptureError> {
    let tab = host.active_tab().await.ok_or(CaptureError::NoActiveSurface)?;
    let filename = capture_filename(&tab.title, now);

    let image = host
        .capture_visible(ImageFormat::Png)
        .await
        .ok_or(CaptureError::CaptureFailed)?;

    host.save(SaveRequest {
        data: image,
        filename: filename.clone(),
        conflict: ConflictPolicy::Uniquify,
        prompt: false,
    })
    .await
    .map_err(StoreError)?;

    Ok(filename)
}

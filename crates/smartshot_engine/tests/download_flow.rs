use std::sync::Arc;
use std::sync::Once;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use smartshot_core::DownloadStatus;
use smartshot_engine::{
    DownloadDetails, DownloadEvent, DownloadHost, DownloadId, DownloadState, HostError,
    ImageFormat, SaveRequest, SmartShot, StateChange, SurfaceHost, TabContext,
};
use tokio::sync::broadcast;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(shot_logging::initialize_for_tests);
}

struct FakeSurface {
    tab: Option<TabContext>,
}

#[async_trait]
impl SurfaceHost for FakeSurface {
    async fn active_tab(&self) -> Option<TabContext> {
        self.tab.clone()
    }

    async fn capture_visible(&self, _format: ImageFormat) -> Option<Vec<u8>> {
        None
    }

    async fn save(&self, _request: SaveRequest) -> Result<(), HostError> {
        Ok(())
    }
}

struct FakeDownloads {
    sender: broadcast::Sender<StateChange>,
    details: Option<DownloadDetails>,
}

impl FakeDownloads {
    fn new(details: Option<DownloadDetails>) -> Self {
        let (sender, _) = broadcast::channel(16);
        Self { sender, details }
    }
}

#[async_trait]
impl DownloadHost for FakeDownloads {
    fn state_changes(&self) -> broadcast::Receiver<StateChange> {
        self.sender.subscribe()
    }

    async fn lookup(&self, _id: DownloadId) -> Result<Option<DownloadDetails>, HostError> {
        Ok(self.details.clone())
    }
}

fn service(downloads: Arc<FakeDownloads>) -> SmartShot {
    let surface = Arc::new(FakeSurface {
        tab: Some(TabContext {
            title: "Quarterly Report".to_string(),
            url: "https://reports.example.org/2024".to_string(),
        }),
    });
    SmartShot::new(
        surface,
        downloads,
        Arc::new(smartshot_engine::MemoryStore::new()),
    )
}

#[tokio::test(start_paused = true)]
async fn completed_download_is_recorded_with_final_details() {
    init_logging();
    let downloads = Arc::new(FakeDownloads::new(Some(DownloadDetails {
        filename: Some("/home/user/Downloads/report.pdf".to_string()),
        file_size: Some(2048),
        mime: Some("application/pdf".to_string()),
    })));
    let service = Arc::new(service(downloads.clone()));

    let sender = downloads.sender.clone();
    let tracked = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .handle_download_created(DownloadEvent {
                    id: 7,
                    url: "https://reports.example.org/report.pdf".to_string(),
                    ..DownloadEvent::default()
                })
                .await;
        })
    };
    tokio::time::sleep(Duration::from_secs(1)).await;
    sender
        .send(StateChange {
            id: 7,
            state: DownloadState::Complete,
        })
        .unwrap();
    tracked.await.unwrap();

    let items = service.history().raw_history().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], json!("7"));
    assert_eq!(items[0]["filename"], json!("report.pdf"));
    assert_eq!(items[0]["filePath"], json!("/home/user/Downloads/report.pdf"));
    assert_eq!(items[0]["status"], json!("complete"));
    assert_eq!(items[0]["fileSize"], json!(2048));
    assert_eq!(items[0]["tabTitle"], json!("Quarterly Report"));
}

#[tokio::test(start_paused = true)]
async fn silent_download_is_recorded_as_timed_out() {
    init_logging();
    let downloads = Arc::new(FakeDownloads::new(None));
    let service = Arc::new(service(downloads.clone()).with_track_timeout(Duration::from_secs(2)));

    service
        .handle_download_created(DownloadEvent {
            id: 3,
            url: "https://example.org/archive.zip".to_string(),
            filename: Some("archive.zip".to_string()),
            ..DownloadEvent::default()
        })
        .await;

    let records = service.history().load().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status.as_deref(), Some("timeout"));
    assert_eq!(records[0].filename.as_deref(), Some("archive.zip"));
}

#[tokio::test(start_paused = true)]
async fn interrupted_download_keeps_event_fields_when_lookup_is_empty() {
    init_logging();
    let downloads = Arc::new(FakeDownloads::new(None));
    let service = Arc::new(service(downloads.clone()));

    let sender = downloads.sender.clone();
    let tracked = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .handle_download_created(DownloadEvent {
                    id: 11,
                    url: "https://example.org/music.flac".to_string(),
                    filename: Some("music.flac".to_string()),
                    file_size: Some(900),
                    ..DownloadEvent::default()
                })
                .await;
        })
    };
    tokio::time::sleep(Duration::from_secs(1)).await;
    sender
        .send(StateChange {
            id: 11,
            state: DownloadState::Interrupted,
        })
        .unwrap();
    tracked.await.unwrap();

    let items = service.history().raw_history().await.unwrap();
    assert_eq!(items[0]["status"], json!("interrupted"));
    assert_eq!(items[0]["filename"], json!("music.flac"));
    assert_eq!(items[0]["fileSize"], json!(900));
}

#[tokio::test(start_paused = true)]
async fn classified_view_partitions_recorded_downloads() {
    init_logging();
    let downloads = Arc::new(FakeDownloads::new(Some(DownloadDetails {
        filename: Some("screenshot_dashboard.png".to_string()),
        file_size: Some(4096),
        mime: Some("image/png".to_string()),
    })));
    let service = Arc::new(service(downloads.clone()));

    let sender = downloads.sender.clone();
    let tracked = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .handle_download_created(DownloadEvent {
                    id: 1,
                    url: "data:image/png;base64,iVBORw0KGgo".to_string(),
                    ..DownloadEvent::default()
                })
                .await;
        })
    };
    tokio::time::sleep(Duration::from_secs(1)).await;
    sender
        .send(StateChange {
            id: 1,
            state: DownloadState::Complete,
        })
        .unwrap();
    tracked.await.unwrap();

    let view = service.classified_view().await.unwrap();
    assert_eq!(view.screenshots.len(), 1);
    assert_eq!(view.downloads.len(), 0);
    assert_eq!(view.screenshots[0].filename, "screenshot_dashboard.png");
    // Assembled records carry the host download id; synthesis is only for
    // legacy items that never got one.
    assert_eq!(view.screenshots[0].id, "1");
}

#[test]
fn lookup_mime_overrides_the_event_hint() {
    init_logging();
    let event = DownloadEvent {
        id: 4,
        url: "https://example.org/report".to_string(),
        mime: Some("application/octet-stream".to_string()),
        ..DownloadEvent::default()
    };
    let details = DownloadDetails {
        filename: Some("report.pdf".to_string()),
        file_size: Some(2048),
        mime: Some("application/pdf".to_string()),
    };

    let record = smartshot_engine::assemble_record(
        &event,
        DownloadStatus::Complete,
        Some(&details),
        None,
        chrono::Utc::now(),
    );

    // The terminal-state lookup saw the finished file; the creation event
    // only carried the server's initial hint.
    assert_eq!(record.mime.as_deref(), Some("application/pdf"));
    assert_eq!(record.file_size, Some(2048));
}

#[test]
fn event_mime_fills_in_when_the_lookup_has_none() {
    init_logging();
    let event = DownloadEvent {
        id: 5,
        url: "https://example.org/data.csv".to_string(),
        filename: Some("data.csv".to_string()),
        mime: Some("text/csv".to_string()),
        ..DownloadEvent::default()
    };

    let record = smartshot_engine::assemble_record(
        &event,
        DownloadStatus::Complete,
        None,
        None,
        chrono::Utc::now(),
    );

    assert_eq!(record.mime.as_deref(), Some("text/csv"));
}

#[tokio::test]
async fn initialize_then_message_round_trip() {
    init_logging();
    let downloads = Arc::new(FakeDownloads::new(None));
    let service = service(downloads);

    service.initialize().await.unwrap();
    let reply = service.handle_message(&json!({"action": "getHistory"})).await;
    assert_eq!(reply, json!([]));
}

#[tokio::test(start_paused = true)]
async fn recorded_status_survives_the_storage_round_trip() {
    init_logging();
    let downloads = Arc::new(FakeDownloads::new(None));
    let service = Arc::new(service(downloads.clone()).with_track_timeout(Duration::from_secs(1)));

    service
        .handle_download_created(DownloadEvent {
            id: 5,
            url: "https://example.org/data.csv".to_string(),
            filename: Some("data.csv".to_string()),
            ..DownloadEvent::default()
        })
        .await;

    let records = service.history().load().await.unwrap();
    let decoded: DownloadStatus =
        serde_json::from_value(json!(records[0].status.as_deref().unwrap())).unwrap();
    assert_eq!(decoded, DownloadStatus::TimedOut);
}

use chrono::{TimeZone, Utc};
use serde_json::json;
use smartshot_core::{DownloadRecord, DownloadStatus, RawRecord, TimestampValue};

#[test]
fn raw_record_reads_alternate_field_names() {
    let value = json!({
        "id": 7,
        "filePath": "C:\\Users\\me\\Pictures\\shot.png",
        "fileSize": 512,
        "timestamp": "2024-01-01T00:00:00Z",
        "downloadUrl": "https://example.com/shot.png"
    });

    let record: RawRecord = serde_json::from_value(value).unwrap();

    assert_eq!(record.id.as_deref(), Some("7"));
    assert_eq!(record.resolved_filename(), Some("shot.png"));
    assert_eq!(record.resolved_size(), Some(512));
    assert_eq!(
        record.resolved_timestamp(),
        Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    );
    assert_eq!(record.resolved_url(), Some("https://example.com/shot.png"));
}

#[test]
fn filename_resolution_precedence_is_filepath_filename_name() {
    let record = RawRecord {
        filepath: Some("/downloads/from_path.bin".to_string()),
        filename: Some("from_filename.bin".to_string()),
        name: Some("from_name.bin".to_string()),
        ..RawRecord::default()
    };
    assert_eq!(record.resolved_filename(), Some("from_path.bin"));

    let record = RawRecord {
        filename: Some("from_filename.bin".to_string()),
        name: Some("from_name.bin".to_string()),
        ..RawRecord::default()
    };
    assert_eq!(record.resolved_filename(), Some("from_filename.bin"));

    // A trailing separator leaves an empty leaf, which counts as absent.
    let record = RawRecord {
        filepath: Some("/downloads/".to_string()),
        name: Some("from_name.bin".to_string()),
        ..RawRecord::default()
    };
    assert_eq!(record.resolved_filename(), Some("from_name.bin"));
}

#[test]
fn size_resolution_precedence_is_size_filesize_totalbytes() {
    let record = RawRecord {
        size: Some(1),
        file_size: Some(2),
        total_bytes: Some(3),
        ..RawRecord::default()
    };
    assert_eq!(record.resolved_size(), Some(1));

    let record = RawRecord {
        file_size: Some(2),
        total_bytes: Some(3),
        ..RawRecord::default()
    };
    assert_eq!(record.resolved_size(), Some(2));

    let record = RawRecord {
        total_bytes: Some(3),
        ..RawRecord::default()
    };
    assert_eq!(record.resolved_size(), Some(3));
}

#[test]
fn out_of_range_millis_do_not_resolve() {
    let record = RawRecord {
        timestamp: Some(TimestampValue::Millis(i64::MAX)),
        ..RawRecord::default()
    };
    assert!(record.has_timestamp());
    assert_eq!(record.resolved_timestamp(), None);
}

#[test]
fn download_record_serializes_to_storage_shape() {
    let record = DownloadRecord {
        id: "42".to_string(),
        filename: "report.pdf".to_string(),
        file_path: Some("/home/me/Downloads/report.pdf".to_string()),
        original_url: "https://example.com/report.pdf".to_string(),
        download_url: "https://example.com/report.pdf".to_string(),
        tab_title: "Example".to_string(),
        tab_url: "https://example.com/".to_string(),
        timestamp: 1_704_067_200_000,
        status: DownloadStatus::TimedOut,
        file_size: Some(5000),
        mime: None,
    };

    let value = serde_json::to_value(&record).unwrap();

    assert_eq!(value["filePath"], "/home/me/Downloads/report.pdf");
    assert_eq!(value["downloadUrl"], "https://example.com/report.pdf");
    assert_eq!(value["tabTitle"], "Example");
    assert_eq!(value["status"], "timeout");
    assert_eq!(value["fileSize"], 5000);
    assert!(value.get("mime").is_none());

    // What the assembler writes, the reconciler can read back.
    let raw: RawRecord = serde_json::from_value(value).unwrap();
    assert_eq!(raw.resolved_filename(), Some("report.pdf"));
    assert_eq!(raw.resolved_size(), Some(5000));
    assert_eq!(raw.status.as_deref(), Some("timeout"));
}

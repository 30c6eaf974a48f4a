use crate::backup::fake_server::{ARCHIVE_BYTES, settings_for, spawn_fake_cvat};
use crate::backup::*;
use crate::config::Secret;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_archive_file_name() {
    assert_eq!(archive_file_name(42), "project_42_backup.zip");
    assert_eq!(archive_file_name(7), "project_7_backup.zip");
}

#[tokio::test]
async fn test_backup_project_polls_until_finished_and_downloads() {
    let cvat = spawn_fake_cvat(
        vec!["queued", "started", "finished"],
        Some("/files/project.zip"),
        None,
    )
    .await;
    let temp_dir = TempDir::new().unwrap();
    let save_dir = temp_dir.path().join("out");
    let settings = settings_for(&cvat.base_url, save_dir.clone());

    let client = BackupClient::new(&settings);
    let zip_path = client.backup_project(42, &save_dir).await.unwrap();

    assert_eq!(zip_path, save_dir.join("project_42_backup.zip"));
    assert_eq!(std::fs::read(&zip_path).unwrap(), ARCHIVE_BYTES);
    assert_eq!(cvat.exports.load(Ordering::SeqCst), 1);
    assert_eq!(cvat.polls.load(Ordering::SeqCst), 3);
    assert_eq!(cvat.downloads.load(Ordering::SeqCst), 1);

    let entries: Vec<_> = std::fs::read_dir(&save_dir).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_failed_export_does_not_download() {
    let cvat = spawn_fake_cvat(
        vec!["queued", "failed"],
        Some("/files/project.zip"),
        Some("disk full"),
    )
    .await;
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_for(&cvat.base_url, temp_dir.path().to_path_buf());

    let client = BackupClient::new(&settings);
    let err = client.backup_project(42, temp_dir.path()).await.unwrap_err();

    match err {
        BackupError::ExportFailed { message, .. } => assert_eq!(message, "disk full"),
        other => panic!("Expected ExportFailed, got {:?}", other),
    }
    assert_eq!(cvat.polls.load(Ordering::SeqCst), 2);
    assert_eq!(cvat.downloads.load(Ordering::SeqCst), 0);
    assert!(!temp_dir.path().join("project_42_backup.zip").exists());
}

#[tokio::test]
async fn test_unknown_status_stops_polling() {
    let cvat = spawn_fake_cvat(vec!["started", "paused"], None, None).await;
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_for(&cvat.base_url, temp_dir.path().to_path_buf());

    let client = BackupClient::new(&settings);
    let err = client.wait_for_export("rq").await.unwrap_err();

    assert!(matches!(err, BackupError::UnknownStatus { ref status } if status == "paused"));
    assert_eq!(cvat.polls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_finished_without_result_url_is_error() {
    let cvat = spawn_fake_cvat(vec!["finished"], None, None).await;
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_for(&cvat.base_url, temp_dir.path().to_path_buf());

    let client = BackupClient::new(&settings);
    let err = client.wait_for_export("rq").await.unwrap_err();

    assert!(matches!(err, BackupError::MissingResultUrl { .. }));
}

#[tokio::test]
async fn test_poll_timeout_gives_up_on_pending_export() {
    let cvat = spawn_fake_cvat(vec!["queued"], None, None).await;
    let temp_dir = TempDir::new().unwrap();
    let mut settings = settings_for(&cvat.base_url, temp_dir.path().to_path_buf());
    settings.poll_timeout = Some(Duration::from_millis(50));

    let client = BackupClient::new(&settings);
    let err = client.wait_for_export("rq").await.unwrap_err();

    assert!(matches!(err, BackupError::PollTimeout { .. }));
    assert!(cvat.polls.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn test_start_export_surfaces_api_errors() {
    let cvat = spawn_fake_cvat(vec!["finished"], None, None).await;
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_for(&cvat.base_url, temp_dir.path().to_path_buf());

    let client = BackupClient::new(&settings);
    let err = client.start_export(7).await.unwrap_err();

    match err {
        BackupError::Api { status, message } => {
            assert_eq!(status, 404);
            assert!(message.contains("Not found"));
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wrong_credentials_are_rejected() {
    let cvat = spawn_fake_cvat(vec!["finished"], None, None).await;
    let temp_dir = TempDir::new().unwrap();
    let mut settings = settings_for(&cvat.base_url, temp_dir.path().to_path_buf());
    settings.password = Secret::new("wrong");

    let client = BackupClient::new(&settings);
    let err = client.start_export(42).await.unwrap_err();

    assert!(matches!(err, BackupError::Api { status: 401, .. }));
    assert_eq!(cvat.exports.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_connection_error_is_http_error() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_for("http://127.0.0.1:9", temp_dir.path().to_path_buf());

    let client = BackupClient::new(&settings);
    let err = client.start_export(42).await.unwrap_err();

    assert!(matches!(err, BackupError::Http(_)));
}

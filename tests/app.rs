//! End-to-end wiring of the pages through the root crate.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use depresso_assist::settings::Environment;
use depresso_assist::{
    load_config, render_transcript, AnalysisBackend, AnalysisSource, App, Error, MediaFile, Result,
    TextGenerator, UploadOutcome, View,
};
use depresso_assist::communication::AnalysisUpload;
use serde_json::{json, Value};

struct EchoBackend;

#[async_trait]
impl AnalysisBackend for EchoBackend {
    async fn upload_image(&self, file: &MediaFile, _metadata: Option<&Value>) -> Result<AnalysisUpload> {
        Ok(AnalysisUpload {
            file_id: Some(file.name.clone()),
            analysis_id: None,
            analysis: Some(json!({"emotions": {"joy": 0.9}, "diagnosis": "bright"})),
            advice: None,
            message: "Image analyzed successfully.".to_string(),
        })
    }

    async fn upload_video(&self, _file: &MediaFile, _metadata: Option<&Value>) -> Result<AnalysisUpload> {
        Err(Error::other("video analysis unavailable"))
    }
}

struct FixedGenerator;

#[async_trait]
impl TextGenerator for FixedGenerator {
    async fn generate(&self, _text: &str) -> Result<String> {
        Ok("Keep doing what helps.".to_string())
    }

    async fn send_intent(&self, _text: &str) -> Result<String> {
        Ok(String::new())
    }
}

fn write_files(dir: &tempfile::TempDir, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            std::fs::write(&path, b"fake media").unwrap();
            path
        })
        .collect()
}

#[tokio::test]
async fn test_files_from_disk_reach_the_chat() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_files(&dir, &["smile.png", "notes.txt"]);

    let mut app = App::with_services(Arc::new(EchoBackend), Arc::new(FixedGenerator));
    assert_eq!(app.queue_paths(&paths).await.unwrap(), 1);
    assert_eq!(app.upload().files()[0].mime_type, "image/png");

    let UploadOutcome::Published(event) = app.analyze().await else {
        panic!("expected a publish");
    };
    assert_eq!(event.source, AnalysisSource::Image);
    assert_eq!(app.host().view(), View::Chat);
    assert_eq!(app.bus().last_event(), Some(event));

    let transcript = render_transcript(&app.chat().messages());
    assert!(transcript.ends_with(
        "[assistant] Diagnosis: bright | Dominant Emotion: joy\n\nKeep doing what helps."
    ));
}

#[tokio::test]
async fn test_failed_upload_stays_on_upload_view() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_files(&dir, &["clip.mp4"]);

    let mut app = App::with_services(Arc::new(EchoBackend), Arc::new(FixedGenerator));
    app.queue_paths(&paths).await.unwrap();

    assert_eq!(
        app.analyze().await,
        UploadOutcome::Failed("Some uploads failed: video analysis unavailable".to_string())
    );
    assert_eq!(app.host().view(), View::Upload);
    assert_eq!(app.chat().len(), 2);
}

#[tokio::test]
async fn test_missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::with_services(Arc::new(EchoBackend), Arc::new(FixedGenerator));

    let err = app
        .queue_paths(&[dir.path().join("gone.png")])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("gone.png"));
}

#[test]
fn test_load_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "environment = \"production\"\n\n[chat]\nconnect_timeout_ms = 1500\nreconnect_delay_ms = 2000\n",
    )
    .unwrap();

    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.environment, Environment::Production);
    assert_eq!(config.chat.connect_timeout_ms, 1500);
    assert_eq!(config.upload.max_file_size_mb(), 50);

    let err = load_config(Some(&dir.path().join("missing.toml"))).unwrap_err();
    assert!(err.to_string().contains("missing.toml"));
}

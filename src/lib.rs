//! # depressoAssist
//!
//! Emotion-analysis uploads and a supportive chat companion, connected by a
//! replaying event bus:
//! - media uploads are analysed by the backend and summarised
//! - the summary and suggested next steps are published on the bus
//! - the chat picks them up, even when it is opened after the publish
//!
//! ## Architecture
//!
//! depressoAssist is organized as a workspace with multiple crates:
//!
//! 1. **depresso-core** - Event bus, analysis events, error types
//! 2. **depresso-settings** - Configuration model and file I/O
//! 3. **depresso-communication** - HTTP analysis/chat clients, chat socket
//! 4. **depresso-pages** - Upload flow, chat session, host bridge
//! 5. **depresso-assist** - Command-line driver that wires them together

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

pub use depresso_communication as communication;
pub use depresso_pages as pages;
pub use depresso_settings as settings;

pub use depresso_core::{
    AnalysisBus, AnalysisEvent, AnalysisSource, ConnectionError, Error, EventBus, Result,
    Subscription, SubscriptionId, UploadError,
};

pub use depresso_communication::{
    AnalysisBackend, AnalysisClient, ChatClient, ChatMessage, ChatRole, ChatSocket,
    ChunkedUploads, MediaFile, TextGenerator,
};

pub use depresso_pages::{ChatSession, HostBridge, UploadOutcome, UploadPage, View};

pub use depresso_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty console output on stderr, leaving stdout to the transcript
/// - RUST_LOG environment variable support, `info` when unset
/// - Targets, thread ids and line numbers
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(())
}

/// Load the configuration: the given file, else the default location if a
/// file exists there, else built-in defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = Config::load_or_default(path).with_context(|| match path {
        Some(path) => format!("failed to load config from {}", path.display()),
        None => "failed to load config from the default location".to_string(),
    })?;
    tracing::info!("Using {} backend profile", config.environment);
    Ok(config)
}

/// The pages of one application window, sharing one bus
pub struct App {
    bus: AnalysisBus,
    upload: UploadPage,
    chat: ChatSession,
    host: HostBridge,
}

impl App {
    /// Wire the pages to the configured HTTP backend
    pub fn connect(config: Arc<Config>, chunked: bool) -> Self {
        let analysis = AnalysisClient::new(Arc::clone(&config));
        let backend: Arc<dyn AnalysisBackend> = if chunked {
            Arc::new(ChunkedUploads::new(analysis))
        } else {
            Arc::new(analysis)
        };
        Self::with_services(backend, Arc::new(ChatClient::new(config)))
    }

    /// Wire the pages to the given services
    pub fn with_services(
        backend: Arc<dyn AnalysisBackend>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let bus = AnalysisBus::new();
        let chat = ChatSession::mount(&bus, Arc::clone(&generator));
        Self {
            upload: UploadPage::new(bus.clone(), backend, generator),
            host: HostBridge::new(bus.clone()),
            bus,
            chat,
        }
    }

    pub fn bus(&self) -> &AnalysisBus {
        &self.bus
    }

    pub fn upload(&mut self) -> &mut UploadPage {
        &mut self.upload
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn host(&mut self) -> &mut HostBridge {
        &mut self.host
    }

    /// Read files from disk into the upload queue. Returns how many were
    /// accepted as images or videos.
    pub async fn queue_paths(&mut self, paths: &[PathBuf]) -> anyhow::Result<usize> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let file = MediaFile::read(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            files.push(file);
        }
        Ok(self.upload.add_files(files))
    }

    /// Analyse the queue; a published result also switches to the chat view
    pub async fn analyze(&mut self) -> UploadOutcome {
        let outcome = self.upload.analyze().await;
        if matches!(outcome, UploadOutcome::Published(_)) {
            self.host.navigate(View::Chat);
        }
        outcome
    }
}

/// Render a transcript as plain text, one block per message
pub fn render_transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|message| {
            let role = match message.role {
                ChatRole::User => "you",
                ChatRole::Ai => "assistant",
                ChatRole::System => "system",
            };
            format!("[{}] {}", role, message.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_transcript() {
        let messages = vec![
            ChatMessage::new(ChatRole::System, "Welcome", None),
            ChatMessage::new(ChatRole::User, "hi", None),
            ChatMessage::new(ChatRole::Ai, "hello\nthere", None),
        ];
        assert_eq!(
            render_transcript(&messages),
            "[system] Welcome\n\n[you] hi\n\n[assistant] hello\nthere"
        );
    }

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
        assert!(BUILD_DATE.ends_with("UTC"));
    }
}

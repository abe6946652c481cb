//! Upload flow
//!
//! Queues media files, uploads them for analysis, summarises the results and
//! publishes one [`AnalysisEvent`] for the chat flow.

use std::sync::Arc;

use depresso_communication::{AnalysisBackend, AnalysisDigest, AnalysisUpload, MediaFile, TextGenerator};
use depresso_core::{AnalysisBus, AnalysisEvent, AnalysisSource, Result};
use futures_util::future::join_all;

/// Instruction sent ahead of the summary when asking for next steps.
pub const ADVICE_PROMPT: &str = "Based on the following emotional analysis, provide 3-5 warm, \
practical next steps without medical claims. Keep it concise and actionable.";

/// Summary used when no upload produced a digest line.
pub const EMPTY_SUMMARY: &str = "Upload complete. Analysis finished.";

/// Result of [`UploadPage::analyze`]
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// Nothing was queued
    Idle,
    /// At least one upload failed; nothing was published
    Failed(String),
    /// The event that was published
    Published(AnalysisEvent),
}

/// Producer side of the analysis bus
pub struct UploadPage {
    bus: AnalysisBus,
    backend: Arc<dyn AnalysisBackend>,
    generator: Arc<dyn TextGenerator>,
    files: Vec<MediaFile>,
}

impl UploadPage {
    pub fn new(
        bus: AnalysisBus,
        backend: Arc<dyn AnalysisBackend>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            bus,
            backend,
            generator,
            files: Vec::new(),
        }
    }

    /// Queue files, keeping only images and videos. Returns how many were
    /// accepted.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = MediaFile>) -> usize {
        let before = self.files.len();
        for file in files {
            if file.kind().is_some() {
                self.files.push(file);
            } else {
                tracing::debug!("Skipping {} ({})", file.name, file.mime_type);
            }
        }
        self.files.len() - before
    }

    /// Remove a queued file by position
    pub fn remove_file(&mut self, index: usize) -> Option<MediaFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn files(&self) -> &[MediaFile] {
        &self.files
    }

    /// Upload every queued file and publish the combined result.
    ///
    /// The queue is left as it was.
    pub async fn analyze(&self) -> UploadOutcome {
        let Some(source) = self.files.first().and_then(MediaFile::kind) else {
            return UploadOutcome::Idle;
        };

        let results: Vec<Result<AnalysisUpload>> =
            join_all(self.files.iter().map(|file| self.upload(file))).await;

        let mut uploads = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(upload) => uploads.push(upload),
                Err(e) => failures.push(e.to_string()),
            }
        }
        if !failures.is_empty() {
            tracing::warn!("{} of {} uploads failed", failures.len(), self.files.len());
            return UploadOutcome::Failed(format!("Some uploads failed: {}", failures.join(", ")));
        }

        let summary = compose_summary(&uploads);
        let prompt = format!("{}\n\n{}", ADVICE_PROMPT, summary);
        let advice = match self.generator.generate(&prompt).await {
            Ok(reply) if !reply.is_empty() => Some(reply),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Next-step generation failed: {}", e);
                None
            }
        };

        let event = AnalysisEvent::new(source, Some(summary), advice);
        tracing::info!("Publishing {}", event.description());
        self.bus.publish(event.clone());
        UploadOutcome::Published(event)
    }

    async fn upload(&self, file: &MediaFile) -> Result<AnalysisUpload> {
        match file.kind() {
            Some(AnalysisSource::Image) => self.backend.upload_image(file, None).await,
            _ => self.backend.upload_video(file, None).await,
        }
    }
}

/// One digest line per upload, then the backend guidance, if any.
pub fn compose_summary(uploads: &[AnalysisUpload]) -> String {
    let lines: Vec<String> = uploads
        .iter()
        .map(|u| AnalysisDigest::from_payload(u.analysis.as_ref()).to_string())
        .collect();
    let advices: Vec<&str> = uploads.iter().filter_map(|u| u.advice.as_deref()).collect();

    let mut summary = if lines.is_empty() {
        EMPTY_SUMMARY.to_string()
    } else {
        lines.join("\n")
    };
    if !advices.is_empty() {
        summary.push_str("\nGuidance:\n");
        summary.push_str(&advices.join("\n\n"));
    }
    summary
}

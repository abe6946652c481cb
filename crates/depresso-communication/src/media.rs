//! Media files and upload validation.

use depresso_core::{AnalysisSource, Result, UploadError};
use depresso_settings::UploadSettings;
use std::path::Path;

/// An in-memory file queued for analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// File name sent with the upload
    pub name: String,
    /// Mime type, e.g. `image/png`
    pub mime_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl MediaFile {
    /// Create a media file from its parts
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its mime type from the extension
    pub async fn read(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(name, mime_from_path(path), bytes))
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Image or video, judged by mime prefix
    pub fn kind(&self) -> Option<AnalysisSource> {
        if self.mime_type.starts_with("image/") {
            Some(AnalysisSource::Image)
        } else if self.mime_type.starts_with("video/") {
            Some(AnalysisSource::Video)
        } else {
            None
        }
    }

    /// Check the file against the upload allow-lists and size limit
    pub fn validate(
        &self,
        kind: AnalysisSource,
        limits: &UploadSettings,
    ) -> std::result::Result<(), UploadError> {
        let accepted = match kind {
            AnalysisSource::Image => limits.accepts_image(&self.mime_type),
            AnalysisSource::Video => limits.accepts_video(&self.mime_type),
        };
        if !accepted {
            return Err(match kind {
                AnalysisSource::Image => UploadError::InvalidImageType,
                AnalysisSource::Video => UploadError::InvalidVideoType,
            });
        }

        if self.size() > limits.max_file_size {
            return Err(UploadError::FileTooLarge {
                max_mb: limits.max_file_size_mb(),
            });
        }

        Ok(())
    }
}

/// Guess a mime type from a file extension
pub fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_by_prefix() {
        assert_eq!(
            MediaFile::new("a.gif", "image/gif", vec![]).kind(),
            Some(AnalysisSource::Image)
        );
        assert_eq!(
            MediaFile::new("a.avi", "video/x-msvideo", vec![]).kind(),
            Some(AnalysisSource::Video)
        );
        assert_eq!(MediaFile::new("a.txt", "text/plain", vec![]).kind(), None);
    }

    #[test]
    fn test_validate_type() {
        let limits = UploadSettings::default();
        let gif = MediaFile::new("a.gif", "image/gif", vec![0; 4]);
        assert_eq!(
            gif.validate(AnalysisSource::Image, &limits),
            Err(UploadError::InvalidImageType)
        );

        let avi = MediaFile::new("a.avi", "video/x-msvideo", vec![0; 4]);
        assert_eq!(
            avi.validate(AnalysisSource::Video, &limits),
            Err(UploadError::InvalidVideoType)
        );

        let png = MediaFile::new("a.png", "image/png", vec![0; 4]);
        assert!(png.validate(AnalysisSource::Image, &limits).is_ok());
    }

    #[test]
    fn test_validate_size() {
        let limits = UploadSettings {
            max_file_size: 2 * 1024 * 1024,
            chunk_size: 1024,
            ..Default::default()
        };
        let big = MediaFile::new("big.mp4", "video/mp4", vec![0; 2 * 1024 * 1024 + 1]);
        assert_eq!(
            big.validate(AnalysisSource::Video, &limits),
            Err(UploadError::FileTooLarge { max_mb: 2 })
        );
    }

    #[test]
    fn test_mime_from_path() {
        assert_eq!(mime_from_path(Path::new("face.JPG")), "image/jpeg");
        assert_eq!(mime_from_path(Path::new("clip.mov")), "video/quicktime");
        assert_eq!(mime_from_path(Path::new("notes")), "application/octet-stream");
    }
}

mod client;
mod traits;

pub use client::CaseApiClient;
pub use traits::{CaseBackend, EventByteStream};

use std::path::Path;

use crate::error::{CounselError, CounselResult};

/// A document queued for extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadDocument {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> CounselResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| CounselError::IoError(format!("{}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        Ok(Self { file_name, bytes })
    }

    pub fn is_pdf(&self) -> bool {
        self.file_name.to_lowercase().ends_with(".pdf")
    }

    pub fn content_type(&self) -> &'static str {
        if self.is_pdf() {
            "application/pdf"
        } else {
            "application/octet-stream"
        }
    }
}

//! Upload handling: turn a user-supplied path or URL into an in-memory PDF.
//!
//! PDFium can parse straight from a byte slice, so nothing is written to
//! disk: URLs are downloaded into memory and local files are read whole. The
//! `%PDF` magic is checked here so a wrong file type is rejected at upload
//! time with a clear message instead of surfacing later as a parse failure.

use crate::error::FinsightError;
use crate::pipeline::cache::ContentKey;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// A PDF the user uploaded: file name plus raw content.
#[derive(Clone)]
pub struct UploadedDocument {
    name: String,
    bytes: Arc<[u8]>,
}

impl UploadedDocument {
    /// Accept in-memory content, rejecting anything that is not a PDF.
    pub fn from_bytes(
        name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<Self, FinsightError> {
        let name = name.into();
        let bytes = bytes.into();
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(FinsightError::NotAPdf {
                name,
                magic: bytes.iter().take(4).copied().collect(),
            });
        }
        Ok(Self { name, bytes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the content, cheap to move into a blocking task.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Digest of the content, used as the extraction cache key.
    pub fn content_key(&self) -> ContentKey {
        ContentKey::of(&self.bytes)
    }
}

impl std::fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Read an upload from a local path or an HTTP/HTTPS URL.
pub async fn read_upload(input: &str, timeout_secs: u64) -> Result<UploadedDocument, FinsightError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(Path::new(input)).await
    }
}

async fn read_local(path: &Path) -> Result<UploadedDocument, FinsightError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => FinsightError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => FinsightError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;

    let name = file_name_of(path);
    debug!("Read local upload {} ({} bytes)", name, bytes.len());
    UploadedDocument::from_bytes(name, bytes)
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<UploadedDocument, FinsightError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| FinsightError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            FinsightError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            FinsightError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(FinsightError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| FinsightError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());
    UploadedDocument::from_bytes(url_file_name(url), bytes.to_vec())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| PathBuf::from(path).display().to_string())
}

/// Last path segment of a URL, or `downloaded.pdf`.
fn url_file_name(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/annual-report.pdf"));
        assert!(is_url("http://example.com/10-k.pdf"));
        assert!(!is_url("/tmp/report.pdf"));
        assert!(!is_url("report.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn rejects_non_pdf_bytes() {
        let err = UploadedDocument::from_bytes("notes.txt", b"hello world".to_vec()).unwrap_err();
        match err {
            FinsightError::NotAPdf { name, magic } => {
                assert_eq!(name, "notes.txt");
                assert_eq!(magic, b"hell".to_vec());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_empty_upload() {
        assert!(UploadedDocument::from_bytes("empty.pdf", Vec::new()).is_err());
    }

    #[test]
    fn accepts_pdf_magic() {
        let doc = UploadedDocument::from_bytes("q3.pdf", b"%PDF-1.7\n...".to_vec()).unwrap();
        assert_eq!(doc.name(), "q3.pdf");
        assert_eq!(doc.len(), 12);
        assert_eq!(doc.content_key(), ContentKey::of(b"%PDF-1.7\n..."));
    }

    #[test]
    fn url_file_name_from_path() {
        assert_eq!(url_file_name("https://x.com/ir/2024-annual.pdf"), "2024-annual.pdf");
        assert_eq!(url_file_name("https://x.com/download"), "downloaded.pdf");
    }

    #[tokio::test]
    async fn reads_local_pdf() {
        let mut tmp = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        tmp.write_all(b"%PDF-1.4\n%%EOF\n").unwrap();

        let doc = read_upload(tmp.path().to_str().unwrap(), 5).await.unwrap();
        assert!(doc.name().ends_with(".pdf"));
        assert_eq!(doc.bytes(), b"%PDF-1.4\n%%EOF\n");
    }

    #[tokio::test]
    async fn missing_local_file() {
        let err = read_upload("/definitely/not/a/real/report.pdf", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, FinsightError::FileNotFound { .. }));
    }
}

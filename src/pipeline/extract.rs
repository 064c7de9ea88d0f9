//! Text extraction: PDF bytes → one plain-text string.
//!
//! Each page's text layer is read through PDFium and the pages are joined in
//! document order, one trailing `\n` per page. Pages with no text (scans,
//! blank separators) contribute nothing at all, not even a newline.
//!
//! ## Why a trait seam?
//!
//! PDFium is a native library that may be missing on a developer machine.
//! [`PageTextSource`] isolates it so the joining, caching and session logic
//! can be exercised in tests with an in-process page list.

use crate::error::StepError;
use crate::pipeline::cache::ContentCache;
use crate::pipeline::input::UploadedDocument;
use crate::progress::ProgressCallback;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Produces the text of every page, in order.
///
/// `None` (or an empty string) marks a page with no extractable text.
/// Called from a blocking thread.
pub trait PageTextSource: Send + Sync {
    fn page_texts(&self, pdf: &[u8]) -> Result<Vec<Option<String>>, StepError>;
}

/// Concatenate page texts, each followed by a newline; skip empty pages.
pub fn join_pages<I>(pages: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut text = String::new();
    for page in pages.into_iter().flatten() {
        if page.is_empty() {
            continue;
        }
        text.push_str(&page);
        text.push('\n');
    }
    text
}

/// Production [`PageTextSource`] backed by PDFium.
///
/// Library lookup order: the explicit path, `PDFIUM_LIB_PATH`, `./lib`,
/// then the system library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumTextSource {
    lib_path: Option<PathBuf>,
}

impl PdfiumTextSource {
    pub fn new(lib_path: Option<PathBuf>) -> Self {
        Self { lib_path }
    }

    fn bind(&self) -> Result<Pdfium, StepError> {
        let explicit = self
            .lib_path
            .clone()
            .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

        let bindings = match explicit {
            Some(path) => Pdfium::bind_to_library(library_file(&path)),
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./lib"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| StepError::PdfiumUnavailable(format!("{:?}", e)))?;

        Ok(Pdfium::new(bindings))
    }
}

/// A directory names the folder holding the platform library
/// (`libpdfium.so`, `libpdfium.dylib` or `pdfium.dll`); a file is used as-is.
fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}

impl PageTextSource for PdfiumTextSource {
    fn page_texts(&self, pdf: &[u8]) -> Result<Vec<Option<String>>, StepError> {
        let pdfium = self.bind()?;

        let document = pdfium.load_pdf_from_byte_slice(pdf, None).map_err(|e| {
            StepError::ExtractionFailed {
                detail: format!("{:?}", e),
            }
        })?;

        let pages = document.pages();
        debug!("PDF loaded: {} pages", pages.len());

        let texts = pages
            .iter()
            .enumerate()
            .map(|(idx, page)| match page.text() {
                Ok(text) => Some(text.all()),
                Err(e) => {
                    warn!("Page {}: no text layer ({:?})", idx + 1, e);
                    None
                }
            })
            .collect();

        Ok(texts)
    }
}

/// Extracts text from uploads, memoized by file content.
pub struct DocumentLoader<S> {
    source: Arc<S>,
    cache: ContentCache<String>,
    progress: Option<ProgressCallback>,
}

impl<S: PageTextSource + 'static> DocumentLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            cache: ContentCache::new("extraction"),
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: Option<ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Extract the document's text, reusing the cached text for identical bytes.
    ///
    /// Failures are not cached: re-running after fixing the environment
    /// (e.g. installing PDFium) tries again.
    pub async fn extract(&mut self, doc: &UploadedDocument) -> Result<String, StepError> {
        let key = doc.content_key();
        if let Some(text) = self.cache.get(&key) {
            return Ok(text);
        }

        if let Some(ref cb) = self.progress {
            cb.on_extraction_start(doc.name());
        }

        let source = Arc::clone(&self.source);
        let bytes = doc.shared_bytes();
        let pages = tokio::task::spawn_blocking(move || source.page_texts(&bytes))
            .await
            .map_err(|e| StepError::ExtractionFailed {
                detail: format!("Extraction task panicked: {}", e),
            })??;

        let page_count = pages.len();
        let text = join_pages(pages);
        let chars = text.chars().count();
        info!(
            "Extracted {} chars from {} pages of '{}'",
            chars,
            page_count,
            doc.name()
        );

        if let Some(ref cb) = self.progress {
            cb.on_extraction_complete(chars);
        }

        self.cache.insert(key, text.clone());
        Ok(text)
    }

    /// Number of distinct documents extracted so far.
    pub fn cached_documents(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedPages {
        pages: Vec<Option<String>>,
        calls: Arc<AtomicUsize>,
    }

    impl PageTextSource for FixedPages {
        fn page_texts(&self, _pdf: &[u8]) -> Result<Vec<Option<String>>, StepError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.pages.clone())
        }
    }

    struct Corrupt;

    impl PageTextSource for Corrupt {
        fn page_texts(&self, _pdf: &[u8]) -> Result<Vec<Option<String>>, StepError> {
            Err(StepError::ExtractionFailed {
                detail: "invalid cross-reference table".into(),
            })
        }
    }

    fn pdf(name: &str, body: &[u8]) -> UploadedDocument {
        let mut bytes = b"%PDF-1.7\n".to_vec();
        bytes.extend_from_slice(body);
        UploadedDocument::from_bytes(name, bytes).unwrap()
    }

    #[test]
    fn joins_pages_with_trailing_newlines() {
        let text = join_pages(vec![
            Some("Revenue: 100".to_string()),
            Some("Net Income: 10".to_string()),
        ]);
        assert_eq!(text, "Revenue: 100\nNet Income: 10\n");
    }

    #[test]
    fn skips_pages_without_text() {
        let text = join_pages(vec![
            None,
            Some("Balance Sheet".to_string()),
            Some(String::new()),
            Some("Cash".to_string()),
        ]);
        assert_eq!(text, "Balance Sheet\nCash\n");
    }

    #[test]
    fn library_dir_resolves_to_platform_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            library_file(dir.path()),
            dir.path().join(Pdfium::pdfium_platform_library_name())
        );

        let file = dir.path().join("custom-pdfium.so");
        std::fs::write(&file, b"").unwrap();
        assert_eq!(library_file(&file), file);
    }

    #[test]
    fn no_pages_is_empty_text() {
        assert_eq!(join_pages(Vec::new()), "");
    }

    #[tokio::test]
    async fn extraction_is_memoized_by_content() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut loader = DocumentLoader::new(FixedPages {
            pages: vec![Some("Revenue: 100".into())],
            calls: Arc::clone(&calls),
        });

        let a = pdf("a.pdf", b"same");
        let renamed = pdf("b.pdf", b"same");
        let other = pdf("c.pdf", b"different");

        assert_eq!(loader.extract(&a).await.unwrap(), "Revenue: 100\n");
        assert_eq!(loader.extract(&renamed).await.unwrap(), "Revenue: 100\n");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        loader.extract(&other).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(loader.cached_documents(), 2);
    }

    #[tokio::test]
    async fn failure_is_reported_and_not_cached() {
        let mut loader = DocumentLoader::new(Corrupt);
        let doc = pdf("broken.pdf", b"garbage");
        let err = loader.extract(&doc).await.unwrap_err();
        assert!(matches!(err, StepError::ExtractionFailed { .. }));
        assert_eq!(loader.cached_documents(), 0);
    }
}

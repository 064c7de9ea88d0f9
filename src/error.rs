//! Error types for the finsight library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`FinsightError`] is **fatal**: the tool cannot start or the upload cannot
//!   be accepted at all (missing API credential, file not found, not a PDF).
//!   Returned as `Err(FinsightError)` from configuration and one-shot entry
//!   points.
//!
//! * [`StepError`] is **recoverable**: one pipeline step failed (extraction,
//!   insufficient text, remote analysis, malformed reply). The interactive
//!   [`crate::session::Session`] turns it into a user-visible
//!   [`crate::state::Notice`] and stays usable for the next attempt.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the finsight library.
#[derive(Debug, Error)]
pub enum FinsightError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// The provider needs an API credential and none was found.
    #[error(
        "API credential for provider '{provider}' not found.\n\
         Set {env_var} in the environment before starting finsight."
    )]
    MissingCredential { provider: String, env_var: String },

    /// The configured provider could not be constructed.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Upload errors ─────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The uploaded content is not a PDF.
    #[error("'{name}' is not a PDF document (first bytes: {magic:?})")]
    NotAPdf { name: String, magic: Vec<u8> },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Pipeline errors ───────────────────────────────────────────────────
    /// A recoverable step error surfaced by a one-shot entry point.
    #[error(transparent)]
    Step(#[from] StepError),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A recoverable error for one step of the analysis flow.
///
/// Shown to the user in place of the result; nothing is retried.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum StepError {
    /// `analyze` was requested before any document was uploaded.
    #[error("No document uploaded. Open a PDF report first.")]
    NoDocument,

    /// PDFium could not be loaded.
    #[error(
        "Failed to bind to the PDFium library: {0}\n\
         Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumUnavailable(String),

    /// The PDF could not be parsed.
    #[error("Error extracting text from PDF: {detail}")]
    ExtractionFailed { detail: String },

    /// Extraction produced too little text to be worth analysing.
    #[error("Could not extract sufficient text from the document. Please try another file.")]
    InsufficientText { chars: usize, minimum: usize },

    /// The remote service returned an error.
    #[error("Error during AI analysis with {provider}: {detail}")]
    AnalysisFailed { provider: String, detail: String },

    /// The remote call did not finish in time.
    #[error("AI analysis with {provider} timed out after {secs}s")]
    AnalysisTimeout { provider: String, secs: u64 },

    /// The reply was not the JSON object the prompt asked for.
    #[error("AI reply was not valid analysis JSON: {detail}")]
    MalformedReply { detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_names_env_var() {
        let e = FinsightError::MissingCredential {
            provider: "gemini".into(),
            env_var: "GEMINI_API_KEY".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("gemini"), "got: {msg}");
        assert!(msg.contains("GEMINI_API_KEY"), "got: {msg}");
    }

    #[test]
    fn insufficient_text_display() {
        let e = StepError::InsufficientText {
            chars: 12,
            minimum: 100,
        };
        assert!(e.to_string().starts_with("Could not extract sufficient text"));
    }

    #[test]
    fn step_error_is_transparent_inside_fatal() {
        let step = StepError::MalformedReply {
            detail: "expected value at line 1 column 1".into(),
        };
        let fatal: FinsightError = step.clone().into();
        assert_eq!(fatal.to_string(), step.to_string());
    }

    #[test]
    fn analysis_timeout_display() {
        let e = StepError::AnalysisTimeout {
            provider: "gemini".into(),
            secs: 120,
        };
        assert!(e.to_string().contains("120s"));
    }

    #[test]
    fn step_error_serialises() {
        let e = StepError::ExtractionFailed {
            detail: "bad xref".into(),
        };
        let json = serde_json::to_string(&e).expect("serialise");
        assert!(json.contains("ExtractionFailed"));
    }
}

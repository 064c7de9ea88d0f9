//! # finsight
//!
//! Analyse financial PDF reports with a Large Language Model.
//!
//! Upload an annual report or financial statement; finsight extracts the
//! text with PDFium, asks the model (Gemini by default) for a strict JSON
//! answer, and renders an executive summary, four key ratios and the raw
//! extracted figures.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Upload   local file or URL, checked for the %PDF magic
//!  ├─ 2. Extract  per-page text via pdfium        (memoized by file bytes)
//!  ├─ 3. Gate     too little text → error, no remote call
//!  ├─ 4. Analyse  one JSON-mode completion        (memoized by text)
//!  └─ 5. Render   summary · ratio columns · collapsible raw data
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use finsight::{analyze_path, AnalysisConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Needs GEMINI_API_KEY (or the key of the provider you configure).
//!     let config = AnalysisConfig::default();
//!     let result = analyze_path("annual-report.pdf", &config).await?;
//!     println!("{}", result.executive_summary.unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! For an interactive front end, drive a [`Session`] with
//! [`Session::upload`] and [`Session::analyze`] and re-render with
//! [`report::render`] after each action.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `finsight` binary (clap + anyhow + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod command;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod report;
pub mod session;
pub mod state;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze_bytes, analyze_path, resolve_provider};
pub use command::{Command, CommandError};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, DEFAULT_MODEL, DEFAULT_PROVIDER};
pub use error::{FinsightError, StepError};
pub use output::AnalysisResult;
pub use pipeline::extract::{PageTextSource, PdfiumTextSource};
pub use pipeline::input::UploadedDocument;
pub use pipeline::llm::{CompletionBackend, LlmBackend};
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback};
pub use report::{SessionView, ViewOptions};
pub use session::{LiveSession, Session};
pub use state::{FileIdentity, Notice, NoticeLevel, Phase, SessionState};

//! Pipeline stages for financial report analysis.
//!
//! Each submodule implements exactly one step, so each can be tested alone.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ llm
//! (path/URL)  (pdfium)   (prompt → JSON)
//!               │          │
//!               └─ cache ──┘  (SHA-256 keyed memoization)
//! ```
//!
//! 1. [`input`]  : read the upload into memory and check it is a PDF
//! 2. [`extract`]: per-page text via PDFium, joined in page order; runs in
//!    `spawn_blocking` because PDFium is blocking FFI
//! 3. [`llm`]    : one JSON-mode completion per distinct text, parsed into
//!    an [`crate::output::AnalysisResult`]
//! 4. [`cache`]  : the content-addressed tables behind steps 2 and 3

pub mod cache;
pub mod extract;
pub mod input;
pub mod llm;

//! The interactive session: an explicit state machine over upload and analyze.
//!
//! A [`Session`] owns the [`SessionState`], the two memoizing pipeline stages
//! and the notices produced by the last action. Front ends drive it with
//! exactly two events:
//!
//! * [`Session::upload`]: records the file and clears a stale result. It
//!   never starts an analysis.
//! * [`Session::analyze`]: extraction, the text-length gate, then the remote
//!   call, run to completion before returning.
//!
//! Every recoverable failure ends the action in [`Phase::ErrorShown`] with a
//! [`Notice`]; the session stays usable for the next upload or attempt.

use crate::config::AnalysisConfig;
use crate::error::StepError;
use crate::output::AnalysisResult;
use crate::pipeline::extract::{DocumentLoader, PageTextSource, PdfiumTextSource};
use crate::pipeline::input::UploadedDocument;
use crate::pipeline::llm::{AnalysisClient, CompletionBackend, LlmBackend};
use crate::progress::ProgressCallback;
use crate::state::{FileIdentity, Notice, Phase, SessionState};
use edgequake_llm::LLMProvider;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A session wired to PDFium and a live LLM provider.
pub type LiveSession = Session<PdfiumTextSource, LlmBackend>;

pub struct Session<S, B> {
    state: SessionState,
    phase: Phase,
    document: Option<UploadedDocument>,
    notices: Vec<Notice>,
    last_error: Option<StepError>,
    loader: DocumentLoader<S>,
    client: AnalysisClient<B>,
    min_text_chars: usize,
    progress: Option<ProgressCallback>,
}

impl LiveSession {
    /// Build a session from configuration and an already-resolved provider.
    pub fn live(config: &AnalysisConfig, provider: Arc<dyn LLMProvider>) -> Self {
        Session::new(
            PdfiumTextSource::new(config.pdfium_lib_path.clone()),
            LlmBackend::new(provider, config),
            config,
        )
    }
}

impl<S: PageTextSource + 'static, B: CompletionBackend> Session<S, B> {
    pub fn new(source: S, backend: B, config: &AnalysisConfig) -> Self {
        let progress = config.progress_callback.clone();
        Self {
            state: SessionState::default(),
            phase: Phase::NoFile,
            document: None,
            notices: Vec::new(),
            last_error: None,
            loader: DocumentLoader::new(source).with_progress(progress.clone()),
            client: AnalysisClient::new(backend).with_progress(progress.clone()),
            min_text_chars: config.min_text_chars,
            progress,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn document(&self) -> Option<&UploadedDocument> {
        self.document.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.state.analysis_result()
    }

    /// Messages produced by the most recent action.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// The first step failure of the last action, if any.
    ///
    /// An unreadable PDF reports both the extraction error and the
    /// insufficient-text error; this keeps the root cause.
    pub fn last_error(&self) -> Option<&StepError> {
        self.last_error.as_ref()
    }

    pub fn backend(&self) -> &B {
        self.client.backend()
    }

    /// Accept a new upload.
    ///
    /// A different file (by name or content) clears the stored result before
    /// anything else happens; re-uploading the same file keeps it.
    pub fn upload(&mut self, doc: UploadedDocument) -> Phase {
        self.notices.clear();
        self.last_error = None;
        let changed = self.state.observe_upload(FileIdentity::of(&doc));
        if changed {
            info!("New upload '{}' ({} bytes)", doc.name(), doc.len());
            self.phase = Phase::FileUploaded;
        } else {
            debug!("Re-upload of '{}', keeping current result", doc.name());
            if self.state.analysis_result().is_none() {
                self.phase = Phase::FileUploaded;
            }
        }
        self.notices
            .push(Notice::info(format!("Uploaded '{}'.", doc.name())));
        self.document = Some(doc);
        self.phase
    }

    /// Run extraction and analysis for the current upload.
    pub async fn analyze(&mut self) -> Phase {
        self.notices.clear();
        self.last_error = None;

        let Some(doc) = self.document.clone() else {
            return self.fail(StepError::NoDocument);
        };

        self.phase = Phase::Analyzing;

        let text = match self.loader.extract(&doc).await {
            Ok(text) => text,
            Err(e) => {
                // Reported, then treated as an empty document.
                self.report(&e);
                String::new()
            }
        };

        let chars = text.chars().count();
        if chars <= self.min_text_chars {
            return self.fail(StepError::InsufficientText {
                chars,
                minimum: self.min_text_chars,
            });
        }

        match self.client.analyze(&text).await {
            Ok(result) => {
                if !result.key_ratios.is_empty() && result.all_ratios_unavailable() {
                    self.notices.push(Notice::warning(
                        "None of the ratios could be derived from this document.",
                    ));
                }
                self.state.set_analysis_result(Some(result));
                self.phase = Phase::ResultShown;
                info!("Analysis of '{}' ready", doc.name());
            }
            Err(e) => {
                self.fail(e);
            }
        }
        self.phase
    }

    /// Record a step error and end the action without a result.
    fn fail(&mut self, error: StepError) -> Phase {
        self.report(&error);
        if self.document.is_some() {
            self.state.set_analysis_result(None);
            self.phase = Phase::ErrorShown;
        }
        self.phase
    }

    fn report(&mut self, error: &StepError) {
        warn!("{}", error);
        if let Some(ref cb) = self.progress {
            cb.on_step_error(error);
        }
        self.notices.push(Notice::from(error));
        if self.last_error.is_none() {
            self.last_error = Some(error.clone());
        }
    }
}

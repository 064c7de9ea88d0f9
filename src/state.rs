//! Session-scoped state: the last result, the last upload, and what to show.

use crate::error::StepError;
use crate::output::AnalysisResult;
use crate::pipeline::cache::ContentKey;
use crate::pipeline::input::UploadedDocument;
use std::fmt;

/// Where the session is in its upload → analyze cycle.
///
/// ```text
/// NoFile ──upload──▶ FileUploaded ──analyze──▶ Analyzing ──▶ ResultShown
///                        ▲                                 └─▶ ErrorShown
///                        └──────────── upload (any phase) ───────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    NoFile,
    FileUploaded,
    Analyzing,
    ResultShown,
    ErrorShown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::NoFile => "no file",
            Phase::FileUploaded => "file uploaded",
            Phase::Analyzing => "analyzing",
            Phase::ResultShown => "result shown",
            Phase::ErrorShown => "error shown",
        };
        f.write_str(s)
    }
}

/// Identity of an upload: same name and same content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIdentity {
    pub name: String,
    pub digest: ContentKey,
}

impl FileIdentity {
    pub fn of(doc: &UploadedDocument) -> Self {
        Self {
            name: doc.name().to_string(),
            digest: doc.content_key(),
        }
    }
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message produced by the last action, shown in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl From<&StepError> for Notice {
    fn from(e: &StepError) -> Self {
        Notice::error(e.to_string())
    }
}

/// The last analysis result and the identity of the upload it belongs to.
#[derive(Debug, Default)]
pub struct SessionState {
    analysis_result: Option<AnalysisResult>,
    last_file_identity: Option<FileIdentity>,
}

impl SessionState {
    pub fn analysis_result(&self) -> Option<&AnalysisResult> {
        self.analysis_result.as_ref()
    }

    pub fn set_analysis_result(&mut self, result: Option<AnalysisResult>) {
        self.analysis_result = result;
    }

    pub fn last_file_identity(&self) -> Option<&FileIdentity> {
        self.last_file_identity.as_ref()
    }

    /// Record a new upload. When its identity differs from the stored one the
    /// stored result is cleared; returns whether that happened.
    pub fn observe_upload(&mut self, identity: FileIdentity) -> bool {
        if self.last_file_identity.as_ref() == Some(&identity) {
            return false;
        }
        self.analysis_result = None;
        self.last_file_identity = Some(identity);
        true
    }
}

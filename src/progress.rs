//! Progress-callback trait for analysis events.
//!
//! Inject an [`Arc<dyn AnalysisProgressCallback>`] via
//! [`crate::config::AnalysisConfigBuilder::progress_callback`] to be told when
//! the slow steps (text extraction, the remote analysis call) start and end.
//!
//! Cached steps are silent: a callback only fires when the pipeline actually
//! does the work, so a front end shows a spinner exactly when the user has to
//! wait.
//!
//! # Example
//!
//! ```rust
//! use finsight::{AnalysisConfig, AnalysisProgressCallback};
//! use std::sync::Arc;
//!
//! struct Log;
//!
//! impl AnalysisProgressCallback for Log {
//!     fn on_analysis_start(&self, prompt_chars: usize) {
//!         eprintln!("sending {prompt_chars} chars to the model");
//!     }
//! }
//!
//! let config = AnalysisConfig::builder()
//!     .progress_callback(Arc::new(Log) as Arc<dyn AnalysisProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::StepError;
use std::sync::Arc;

/// Called by the session as it runs each pipeline step.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait AnalysisProgressCallback: Send + Sync {
    /// Called before PDF text extraction runs (cache miss only).
    fn on_extraction_start(&self, file_name: &str) {
        let _ = file_name;
    }

    /// Called after extraction succeeded.
    ///
    /// # Arguments
    /// * `chars`: character count of the extracted text
    fn on_extraction_complete(&self, chars: usize) {
        let _ = chars;
    }

    /// Called just before the remote analysis request is sent (cache miss only).
    fn on_analysis_start(&self, prompt_chars: usize) {
        let _ = prompt_chars;
    }

    /// Called when the remote analysis returned a usable result.
    fn on_analysis_complete(&self) {}

    /// Called when any step fails.
    fn on_step_error(&self, error: &StepError) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AnalysisProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AnalysisConfig`].
pub type ProgressCallback = Arc<dyn AnalysisProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
    }

    impl AnalysisProgressCallback for TrackingCallback {
        fn on_analysis_start(&self, _prompt_chars: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_analysis_complete(&self) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_step_error(&self, _error: &StepError) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_extraction_start("report.pdf");
        cb.on_extraction_complete(4200);
        cb.on_analysis_start(5000);
        cb.on_analysis_complete();
        cb.on_step_error(&StepError::NoDocument);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_analysis_start(10);
        tracker.on_analysis_complete();
        tracker.on_analysis_start(10);
        tracker.on_step_error(&StepError::MalformedReply {
            detail: "eof".into(),
        });

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_extraction_start("q3.pdf");
        cb.on_extraction_complete(512);
    }
}

//! One-shot entry points and provider resolution.
//!
//! [`analyze_path`] and [`analyze_bytes`] run a throw-away
//! [`Session`](crate::session::Session)
//! through upload → analyze and hand back the result, turning any step
//! failure into `Err`. Interactive front ends drive the session directly.

use crate::config::{check_credential, AnalysisConfig};
use crate::error::{FinsightError, StepError};
use crate::output::AnalysisResult;
use crate::pipeline::input::{read_upload, UploadedDocument};
use crate::session::LiveSession;
use crate::state::Phase;
use edgequake_llm::{GeminiProvider, LLMProvider, ProviderFactory, ProviderType};
use std::sync::Arc;
use tracing::info;

/// Analyse a PDF given as a local path or HTTP/HTTPS URL.
///
/// # Example
/// ```rust,no_run
/// use finsight::{analyze_path, AnalysisConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Reads GEMINI_API_KEY from the environment.
/// let result = analyze_path("annual-report.pdf", &AnalysisConfig::default()).await?;
/// for (ratio, value) in result.ratios() {
///     println!("{ratio}: {value}");
/// }
/// # Ok(())
/// # }
/// ```
pub async fn analyze_path(
    input: impl AsRef<str>,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, FinsightError> {
    let provider = resolve_provider(config)?;
    let doc = read_upload(input.as_ref(), config.download_timeout_secs).await?;
    run_once(doc, config, provider).await
}

/// Analyse PDF bytes held in memory.
pub async fn analyze_bytes(
    name: impl Into<String>,
    bytes: impl Into<Arc<[u8]>>,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, FinsightError> {
    let provider = resolve_provider(config)?;
    let doc = UploadedDocument::from_bytes(name, bytes)?;
    run_once(doc, config, provider).await
}

async fn run_once(
    doc: UploadedDocument,
    config: &AnalysisConfig,
    provider: Arc<dyn LLMProvider>,
) -> Result<AnalysisResult, FinsightError> {
    info!("Analysing '{}'", doc.name());
    let mut session = LiveSession::live(config, provider);
    session.upload(doc);

    match session.analyze().await {
        Phase::ResultShown => session
            .result()
            .cloned()
            .ok_or_else(|| FinsightError::Internal("result missing after analysis".into())),
        _ => Err(FinsightError::Step(session.last_error().cloned().unwrap_or_else(
            || StepError::AnalysisFailed {
                provider: config.provider_name.clone(),
                detail: "analysis did not complete".to_string(),
            },
        ))),
    }
}

/// Resolve the LLM provider for a configuration.
///
/// 1. **Pre-built provider** (`config.provider`) is used as-is.
/// 2. Otherwise one of the provider's credential variables must be set (e.g.
///    `GEMINI_API_KEY` or `GOOGLE_API_KEY`); a missing credential is fatal
///    before any upload is read.
/// 3. [`ProviderFactory::create_llm_provider`] builds the named provider.
pub fn resolve_provider(config: &AnalysisConfig) -> Result<Arc<dyn LLMProvider>, FinsightError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let name = config.provider_name.as_str();
    let env = |var: &str| std::env::var(var).ok();
    check_credential(name, env)?;

    if let Some(key) = google_api_key(name, &config.model, env) {
        return Ok(Arc::new(GeminiProvider::new(key).with_model(&config.model)));
    }

    ProviderFactory::create_llm_provider(name, &config.model).map_err(|e| {
        FinsightError::ProviderNotConfigured {
            provider: name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// `GOOGLE_API_KEY` for a Gemini provider when `GEMINI_API_KEY` is absent.
///
/// The factory's Gemini path only reads `GEMINI_API_KEY` before falling back
/// to VertexAI, so the Google AI key is wired up here.
fn google_api_key(
    provider: &str,
    model: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    let set = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
    if ProviderType::from_str(provider) != Some(ProviderType::Gemini)
        || model.starts_with("vertexai:")
        || set("GEMINI_API_KEY").is_some()
    {
        return None;
    }
    set("GOOGLE_API_KEY")
}

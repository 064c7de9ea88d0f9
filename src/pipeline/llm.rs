//! LLM interaction: send the analysis prompt and parse the JSON reply.
//!
//! The module is intentionally thin: prompt wording lives in
//! [`crate::prompts`], and the remote call sits behind [`CompletionBackend`]
//! so the caching and parsing rules can be tested without a network.
//!
//! There is no retry: one failed call is terminal for that `analyze` action,
//! and the user decides whether to try again.

use crate::config::AnalysisConfig;
use crate::error::StepError;
use crate::output::AnalysisResult;
use crate::pipeline::cache::{ContentCache, ContentKey};
use crate::progress::ProgressCallback;
use crate::prompts::build_analysis_prompt;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use once_cell::sync::Lazy;
use regex::Regex;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

/// A remote completion service that can be asked for a JSON reply.
pub trait CompletionBackend: Send + Sync {
    /// Human-readable name used in error messages (e.g. `gemini`).
    fn name(&self) -> &str;

    /// Send `prompt` and return the raw reply text.
    fn complete_json(&self, prompt: &str) -> impl Future<Output = Result<String, StepError>> + Send;
}

/// Production backend over an `edgequake-llm` provider.
pub struct LlmBackend {
    provider: Arc<dyn LLMProvider>,
    provider_name: String,
    options: CompletionOptions,
    timeout_secs: u64,
}

impl LlmBackend {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &AnalysisConfig) -> Self {
        Self {
            provider,
            provider_name: config.provider_name.clone(),
            options: build_options(config),
            timeout_secs: config.api_timeout_secs,
        }
    }
}

impl CompletionBackend for LlmBackend {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete_json(&self, prompt: &str) -> Result<String, StepError> {
        let messages = vec![ChatMessage::user(prompt)];
        let start = Instant::now();

        let call = self.provider.chat(&messages, Some(&self.options));
        match timeout(Duration::from_secs(self.timeout_secs), call).await {
            Err(_) => Err(StepError::AnalysisTimeout {
                provider: self.provider_name.clone(),
                secs: self.timeout_secs,
            }),
            Ok(Err(e)) => Err(StepError::AnalysisFailed {
                provider: self.provider_name.clone(),
                detail: e.to_string(),
            }),
            Ok(Ok(response)) => {
                debug!(
                    "{} input tokens, {} output tokens, {:?}",
                    response.prompt_tokens,
                    response.completion_tokens,
                    start.elapsed()
                );
                Ok(response.content)
            }
        }
    }
}

/// Build `CompletionOptions` that constrain the reply to a JSON object.
fn build_options(config: &AnalysisConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        response_format: Some("json_object".to_string()),
        ..Default::default()
    }
}

static RE_JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json|JSON)?\s*\n(.*)\n```\s*$").unwrap());

/// Parse the raw reply as an [`AnalysisResult`].
///
/// Providers without a native JSON mode sometimes wrap the object in a
/// ```` ```json ```` fence despite the prompt; a single outer fence is removed.
/// Anything that is not a JSON object of the expected shape is a
/// [`StepError::MalformedReply`].
pub fn parse_reply(raw: &str) -> Result<AnalysisResult, StepError> {
    let trimmed = raw.trim();
    let body = match RE_JSON_FENCE.captures(trimmed) {
        Some(caps) => caps.get(1).map_or(trimmed, |m| m.as_str()),
        None => trimmed,
    };

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| StepError::MalformedReply {
            detail: e.to_string(),
        })?;

    if !value.is_object() {
        return Err(StepError::MalformedReply {
            detail: format!("expected a JSON object, got {}", json_kind(&value)),
        });
    }

    serde_json::from_value(value).map_err(|e| StepError::MalformedReply {
        detail: e.to_string(),
    })
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Runs analyses, memoized by the exact extracted text.
pub struct AnalysisClient<B> {
    backend: B,
    cache: ContentCache<AnalysisResult>,
    progress: Option<ProgressCallback>,
}

impl<B: CompletionBackend> AnalysisClient<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cache: ContentCache::new("analysis"),
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: Option<ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Analyse `text`, calling the backend at most once per distinct text.
    ///
    /// Only successful results are cached.
    pub async fn analyze(&mut self, text: &str) -> Result<AnalysisResult, StepError> {
        let key = ContentKey::of(text);
        if let Some(result) = self.cache.get(&key) {
            return Ok(result);
        }

        let prompt = build_analysis_prompt(text);
        info!(
            "Requesting analysis from {} ({} prompt chars)",
            self.backend.name(),
            prompt.len()
        );
        if let Some(ref cb) = self.progress {
            cb.on_analysis_start(prompt.len());
        }

        let raw = self.backend.complete_json(&prompt).await?;
        let result = parse_reply(&raw).inspect_err(|e| {
            warn!("Discarding reply from {}: {}", self.backend.name(), e);
        })?;

        if let Some(ref cb) = self.progress {
            cb.on_analysis_complete();
        }

        self.cache.insert(key, result.clone());
        Ok(result)
    }

    /// Number of remote calls that were answered from the cache.
    pub fn cache_hits(&self) -> u64 {
        self.cache.hits()
    }
}

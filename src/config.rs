//! Configuration types for financial report analysis.
//!
//! Everything the pipeline needs to know (which provider and model to call,
//! how long to wait, how much text is "enough") lives in [`AnalysisConfig`],
//! built via its [`AnalysisConfigBuilder`].

use crate::error::FinsightError;
use crate::progress::ProgressCallback;
use edgequake_llm::{LLMProvider, ProviderType};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Provider used when none is named.
pub const DEFAULT_PROVIDER: &str = "gemini";

/// Model used when none is named.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Configuration for an analysis session.
///
/// # Example
/// ```rust
/// use finsight::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .model("gemini-2.5-pro")
///     .min_text_chars(200)
///     .build()
///     .unwrap();
/// assert_eq!(config.provider_name, "gemini");
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// LLM provider name (e.g. "gemini", "openai", "ollama"). Default: "gemini".
    pub provider_name: String,

    /// LLM model identifier. Default: "gemini-2.0-flash".
    pub model: String,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for the completion. Default: 0.2.
    ///
    /// Ratios and figures are read off the text; a low temperature keeps the
    /// model from inventing numbers.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 8192.
    pub max_tokens: usize,

    /// Extracted text must be longer than this many characters before a
    /// remote call is attempted. Default: 100.
    ///
    /// Scanned reports without a text layer extract to a handful of stray
    /// characters; sending those to the model only buys a hallucinated report.
    pub min_text_chars: usize,

    /// Timeout for the single remote analysis call, in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Download timeout for URL uploads, in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Explicit path to the PDFium shared library, or the directory holding it.
    /// If None, `PDFIUM_LIB_PATH`, then `./lib`, then the system library.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Progress callback for the extraction and analysis steps.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            provider_name: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            provider: None,
            temperature: 0.2,
            max_tokens: 8192,
            min_text_chars: 100,
            api_timeout_secs: 120,
            download_timeout_secs: 120,
            pdfium_lib_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("min_text_chars", &self.min_text_chars)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn AnalysisProgressCallback>"),
            )
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = name.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn min_text_chars(mut self, n: usize) -> Self {
        self.config.min_text_chars = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, FinsightError> {
        let c = &self.config;
        if c.provider_name.trim().is_empty() {
            return Err(FinsightError::InvalidConfig(
                "Provider name must not be empty".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(FinsightError::InvalidConfig("Model must not be empty".into()));
        }
        if c.max_tokens == 0 {
            return Err(FinsightError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.api_timeout_secs == 0 {
            return Err(FinsightError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Environment variables any one of which satisfies a provider's credential.
///
/// Aliases are resolved the way [`ProviderType::from_str`] resolves them.
/// An empty slice means there is nothing to pre-check: the provider runs
/// locally, uses ambient credentials (Copilot proxy, AWS), or is unknown, in
/// which case [`ProviderFactory`](edgequake_llm::ProviderFactory) reports it.
pub fn credential_env_vars(provider: &str) -> &'static [&'static str] {
    match ProviderType::from_str(provider) {
        Some(ProviderType::OpenAI) => &["OPENAI_API_KEY"],
        Some(ProviderType::Anthropic) => &["ANTHROPIC_API_KEY"],
        // GOOGLE_CLOUD_PROJECT selects the VertexAI endpoint.
        Some(ProviderType::Gemini) => &["GEMINI_API_KEY", "GOOGLE_API_KEY", "GOOGLE_CLOUD_PROJECT"],
        Some(ProviderType::OpenRouter) => &["OPENROUTER_API_KEY"],
        Some(ProviderType::XAI) => &["XAI_API_KEY"],
        Some(ProviderType::HuggingFace) => &["HF_TOKEN", "HUGGINGFACE_TOKEN"],
        Some(ProviderType::Mistral) => &["MISTRAL_API_KEY"],
        Some(ProviderType::AzureOpenAI) => &["AZURE_OPENAI_CONTENTGEN_API_KEY", "AZURE_OPENAI_API_KEY"],
        _ => &[],
    }
}

/// Check that at least one of the provider's credential variables is set and
/// non-empty.
///
/// `lookup` abstracts the environment so the check is testable.
pub fn check_credential(
    provider: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), FinsightError> {
    let vars = credential_env_vars(provider);
    if vars.is_empty() {
        return Ok(());
    }
    let present = vars
        .iter()
        .any(|var| lookup(var).is_some_and(|value| !value.trim().is_empty()));
    if present {
        Ok(())
    } else {
        Err(FinsightError::MissingCredential {
            provider: provider.to_string(),
            env_var: vars.join(" or "),
        })
    }
}

//! CLI binary for finsight.
//!
//! A thin shim over the library crate: maps CLI flags to `AnalysisConfig`,
//! then either analyses one report and prints it, or runs an interactive
//! upload / analyze session.

use anyhow::{Context, Result};
use clap::Parser;
use finsight::pipeline::input::read_upload;
use finsight::report::{self, SessionView, ViewOptions};
use finsight::{
    analyze_path, resolve_provider, AnalysisConfig, AnalysisProgressCallback, Command,
    LiveSession, Phase, ProgressCallback, StepError, DEFAULT_MODEL, DEFAULT_PROVIDER,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Terminal progress callback: one spinner per slow step.
struct CliProgressCallback {
    model: String,
    /// The spinner of the step in flight, with its start time.
    active: Mutex<Option<(ProgressBar, Instant)>>,
}

impl CliProgressCallback {
    fn new(model: &str) -> Arc<Self> {
        Arc::new(Self {
            model: model.to_string(),
            active: Mutex::new(None),
        })
    }

    fn start(&self, prefix: &str, message: String) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix(prefix.to_string());
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut active) = self.active.lock() {
            if let Some((old, _)) = active.replace((bar, Instant::now())) {
                old.finish_and_clear();
            }
        }
    }

    /// Clear the spinner and return how long the step took.
    fn finish(&self) -> Option<Duration> {
        let (bar, started) = self.active.lock().ok()?.take()?;
        bar.finish_and_clear();
        Some(started.elapsed())
    }
}

impl AnalysisProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, file_name: &str) {
        self.start("Extracting", format!("Extracting text from {file_name}…"));
    }

    fn on_extraction_complete(&self, chars: usize) {
        let elapsed = self.finish().unwrap_or_default();
        eprintln!(
            "  {} Extracted {}  {}",
            green("✓"),
            dim(&format!("{chars} chars")),
            dim(&format!("{:.1}s", elapsed.as_secs_f64())),
        );
    }

    fn on_analysis_start(&self, prompt_chars: usize) {
        self.start(
            "Analyzing",
            format!("{} is analyzing the document… ({prompt_chars} chars)", self.model),
        );
    }

    fn on_analysis_complete(&self) {
        let elapsed = self.finish().unwrap_or_default();
        eprintln!(
            "  {} Analysis ready  {}",
            green("✓"),
            dim(&format!("{:.1}s", elapsed.as_secs_f64())),
        );
    }

    fn on_step_error(&self, error: &StepError) {
        if self.finish().is_some() {
            eprintln!("  {} {}", red("✗"), red(&error.to_string()));
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyse one report and print it
  finsight annual-report-2024.pdf

  # Machine-readable result
  finsight --json annual-report-2024.pdf > analysis.json

  # Show the raw extracted figures too
  finsight --raw annual-report-2024.pdf

  # Analyse a report straight from a URL
  finsight https://example.com/investors/10-k.pdf

  # Interactive session (open / analyze / raw / show / help / quit)
  finsight

  # Use a different provider
  finsight --provider openai --model gpt-4.1-mini report.pdf

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (default provider)
  GOOGLE_API_KEY          Accepted for Gemini when GEMINI_API_KEY is unset
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  FINSIGHT_PROVIDER       Override provider (gemini, openai, anthropic, ollama, …)
  FINSIGHT_MODEL          Override model ID
  PDFIUM_LIB_PATH         Path to an existing libpdfium
  RUST_LOG                Log filter (e.g. finsight=debug)

SETUP:
  1. Set API key:     export GEMINI_API_KEY=...
  2. Analyse:         finsight report.pdf

  PDFium is loaded from PDFIUM_LIB_PATH, then ./lib, then the system library
  path.
"#;

/// Analyse financial PDF reports with a Large Language Model.
#[derive(Parser, Debug)]
#[command(
    name = "finsight",
    version,
    about = "FinSight AI: analyse financial reports (PDF) with an LLM",
    long_about = "Upload a company's financial report (PDF) to receive an AI-powered analysis: \
an executive summary, four key ratios and the raw figures the model extracted. Uses Google \
Gemini by default; any provider supported by edgequake-llm works.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL. Omit for an interactive session.
    input: Option<String>,

    /// Start an interactive session (opens `input` first when given).
    #[arg(short, long)]
    interactive: bool,

    /// Print the analysis result as JSON instead of the report.
    #[arg(long, env = "FINSIGHT_JSON", conflicts_with = "interactive")]
    json: bool,

    /// Expand the raw extracted-data viewer.
    #[arg(long, env = "FINSIGHT_RAW")]
    raw: bool,

    /// LLM model ID.
    #[arg(long, env = "FINSIGHT_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// LLM provider: gemini, openai, anthropic, azure, ollama, …
    #[arg(long, env = "FINSIGHT_PROVIDER", default_value = DEFAULT_PROVIDER)]
    provider: String,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "FINSIGHT_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "FINSIGHT_MAX_TOKENS", default_value_t = 8192)]
    max_tokens: usize,

    /// Extracted text must be longer than this many characters.
    #[arg(long, env = "FINSIGHT_MIN_TEXT_CHARS", default_value_t = 100)]
    min_text_chars: usize,

    /// LLM call timeout in seconds.
    #[arg(long, env = "FINSIGHT_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "FINSIGHT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Path to libpdfium (file or directory).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Report width in columns.
    #[arg(long, env = "FINSIGHT_WIDTH", default_value_t = 100,
          value_parser = clap::value_parser!(u16).range(40..=400))]
    width: u16,

    /// Disable progress spinners.
    #[arg(long, env = "FINSIGHT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FINSIGHT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except the result and errors.
    #[arg(short, long, env = "FINSIGHT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinners carry the user-facing feedback; library INFO logs only
    // show up when they are disabled.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new(&cli.model) as Arc<dyn AnalysisProgressCallback>)
    } else {
        None
    };

    let mut config = build_config(&cli, progress_cb)?;

    // A missing credential is fatal before any upload is read.
    let provider = resolve_provider(&config).context("Cannot start the analysis service")?;
    config.provider = Some(provider);

    let view = ViewOptions {
        width: usize::from(cli.width),
        raw_expanded: cli.raw,
    };

    match cli.input {
        Some(ref input) if !cli.interactive => {
            if cli.json {
                let result = analyze_path(input, &config)
                    .await
                    .context("Analysis failed")?;
                let json =
                    serde_json::to_string_pretty(&result).context("Failed to serialise result")?;
                println!("{json}");
                Ok(())
            } else {
                run_once(input, &config, view).await
            }
        }
        ref input => run_interactive(input.as_deref(), &config, view).await,
    }
}

/// Map CLI args to `AnalysisConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<AnalysisConfig> {
    let mut builder = AnalysisConfig::builder()
        .provider_name(&cli.provider)
        .model(&cli.model)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .min_text_chars(cli.min_text_chars)
        .api_timeout_secs(cli.api_timeout)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(path);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Upload, analyse, print the report. A failed analysis still prints the
/// screen (with its error notice) before exiting non-zero.
async fn run_once(input: &str, config: &AnalysisConfig, view: ViewOptions) -> Result<()> {
    let provider = resolve_provider(config)?;
    let mut session = LiveSession::live(config, provider);

    let doc = read_upload(input, config.download_timeout_secs)
        .await
        .with_context(|| format!("Failed to read {input}"))?;
    session.upload(doc);
    let phase = session.analyze().await;

    print_screen(&session, config, &view)?;

    match (phase, session.last_error()) {
        (Phase::ResultShown, _) => Ok(()),
        (_, Some(err)) => Err(err.clone()).context("Analysis failed"),
        (phase, None) => anyhow::bail!("Analysis ended in state '{phase}'"),
    }
}

async fn run_interactive(
    initial: Option<&str>,
    config: &AnalysisConfig,
    mut view: ViewOptions,
) -> Result<()> {
    let provider = resolve_provider(config)?;
    let mut session = LiveSession::live(config, provider);

    if let Some(input) = initial {
        open(&mut session, input, config).await;
    }
    print_screen(&session, config, &view)?;
    eprintln!("{}", dim("Type `help` for commands."));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("{} ", cyan("finsight>"));
        io::stderr().flush().ok();

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", yellow(&e.to_string()));
                continue;
            }
        };

        match command {
            Command::Open(input) => open(&mut session, &input, config).await,
            Command::Analyze => {
                session.analyze().await;
            }
            Command::ToggleRaw => view.raw_expanded = !view.raw_expanded,
            Command::Show => {}
            Command::Help => {
                println!("{}", finsight::command::HELP);
                continue;
            }
            Command::Quit => break,
        }
        print_screen(&session, config, &view)?;
    }

    Ok(())
}

/// Read an upload; a read failure is shown and the session keeps its state.
async fn open(session: &mut LiveSession, input: &str, config: &AnalysisConfig) {
    match read_upload(input, config.download_timeout_secs).await {
        Ok(doc) => {
            session.upload(doc);
        }
        Err(e) => eprintln!("{} {}", red("✗"), red(&e.to_string())),
    }
}

fn print_screen(session: &LiveSession, config: &AnalysisConfig, opts: &ViewOptions) -> Result<()> {
    let view = SessionView {
        phase: session.phase(),
        document: session.document(),
        notices: session.notices(),
        result: session.result(),
        model: &config.model,
    };
    let screen = report::render(&view, opts);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for line in screen.lines() {
        writeln!(handle, "{}", colourize(line)).context("Failed to write to stdout")?;
    }
    Ok(())
}

/// Colour notice lines and section headings; everything else passes through.
fn colourize(line: &str) -> String {
    if line.starts_with("[error]") {
        red(line)
    } else if line.starts_with("[warning]") {
        yellow(line)
    } else if line.starts_with("[info]") {
        green(line)
    } else if line == report::TITLE
        || line == "Financial Analysis Report"
        || line == "Executive Summary"
        || line == "Key Financial Ratios"
    {
        bold(line)
    } else if line.starts_with('─') || line.starts_with("Powered by") {
        dim(line)
    } else {
        line.to_string()
    }
}

//! CLI binary for yt-digest.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `SummaryConfig`, shows streaming progress and writes the PDF.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use yt_digest::{
    clean_for_pdf, export_pdf, language_display_name, resolve_input, stream_summary, AiModel,
    ChunkError, CompletedSummary, DigestError, PdfLayout, ProgressCallback, ProgressStatus,
    RenderMeta, Stage, SummaryConfig, SummaryMode, SummaryProgressCallback, SummaryRoute,
    SummaryState, DEFAULT_ENDPOINT,
};

const INVALID_URL_MESSAGE: &str = "Invalid YouTube URL. Please enter a valid YouTube URL.";
const PDF_FAILED_MESSAGE: &str = "Failed to generate PDF. Please try again.";

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
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

/// Terminal progress callback: a percentage bar for chunk progress plus a
/// stage checklist printed above it as stages are passed.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Index into [`Stage::ALL`] of the stage currently shown as active.
    stage: Mutex<usize>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix(Stage::Analyzing.label());
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            stage: Mutex::new(0),
        })
    }

    /// Tick off every stage before `upto` that has not been ticked yet.
    fn advance_to(&self, upto: usize) {
        let mut current = self.stage.lock().unwrap();
        while *current < upto {
            self.bar
                .println(format!("  {} {}", green("✓"), Stage::ALL[*current].label()));
            *current += 1;
        }
    }
}

impl SummaryProgressCallback for CliProgressCallback {
    fn on_request_start(&self, url: &str) {
        self.bar
            .println(format!("{} {}", cyan("◆"), bold(&format!("Summarizing {url}"))));
    }

    fn on_progress(&self, status: &ProgressStatus) {
        let idx = Stage::ALL
            .iter()
            .position(|s| *s == status.stage)
            .unwrap_or(0);
        self.advance_to(idx);
        self.bar.set_prefix(status.stage.label());
        self.bar.set_position(status.percent().clamp(0.0, 100.0) as u64);
        if status.total_chunks > 0 {
            self.bar.set_message(format!(
                "{}  {}",
                status.message,
                dim(&format!("chunk {}/{}", status.current_chunk, status.total_chunks))
            ));
        } else {
            self.bar.set_message(status.message.clone());
        }
    }

    fn on_chunk_skipped(&self, error: &ChunkError) {
        self.bar
            .println(format!("  {} {}", cyan("⚠"), dim(&error.to_string())));
    }

    fn on_complete(&self, summary: &CompletedSummary) {
        self.advance_to(Stage::ALL.len());
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} {}",
            green("✔"),
            bold(&summary.document.title),
            dim(&format!("({} chars)", summary.document.content.len()))
        );
    }

    fn on_failed(&self, message: String) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", red("✘"), red(&message));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarize a video, print Markdown and save a PDF in the current directory
  ytdigest https://www.youtube.com/watch?v=dQw4w9WgXcQ

  # Podcast-style summary in Spanish, PDF into ./summaries
  ytdigest --mode podcast --lang es -o summaries https://youtu.be/dQw4w9WgXcQ

  # Re-open a shared summary route
  ytdigest '/summary/aHR0cHM6Ly95b3V0dS5iZS9kUXc0dzlXZ1hjUQ?lang=en&mode=video&model=gemini'

  # Only print the route for a URL (no request)
  ytdigest --route-only --lang fr https://youtu.be/dQw4w9WgXcQ

  # JSON output, no PDF
  ytdigest --json --no-pdf https://youtu.be/dQw4w9WgXcQ > summary.json

LANGUAGES:
  en English   es Spanish   fr French    de German
  ja Japanese  zh Chinese   ko Korean    ru Russian

ENVIRONMENT VARIABLES:
  YTDIGEST_ENDPOINT       Summarization endpoint URL
  YTDIGEST_LANG           Summary language (name or code)
  YTDIGEST_OUTPUT_DIR     Directory for exported PDFs
  RUST_LOG                Override the log filter
"#;

/// Summarize YouTube videos through a summarization backend and export PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "ytdigest",
    version,
    about = "Summarize YouTube videos and export the summary as a PDF",
    long_about = "Send a YouTube URL to a summarization backend, follow its progress as it \
streams in, print the finished summary and save it as a paginated PDF.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// YouTube URL or /summary/... route.
    input: String,

    /// Summarization endpoint.
    #[arg(long, env = "YTDIGEST_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Summary language, as a name (Spanish) or code (es).
    #[arg(short, long, env = "YTDIGEST_LANG", default_value = "en")]
    lang: String,

    /// Summary style.
    #[arg(long, env = "YTDIGEST_MODE", value_enum, default_value = "video")]
    mode: ModeArg,

    /// AI model used by the backend.
    #[arg(long, env = "YTDIGEST_MODEL", value_enum, default_value = "gemini")]
    model: ModelArg,

    /// Directory the PDF is written to.
    #[arg(short, long, env = "YTDIGEST_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Do not export a PDF.
    #[arg(long, env = "YTDIGEST_NO_PDF")]
    no_pdf: bool,

    /// Print the summary as JSON instead of Markdown.
    #[arg(long, env = "YTDIGEST_JSON", conflicts_with = "plain_text")]
    json: bool,

    /// Print the summary as plain ASCII text instead of Markdown.
    #[arg(long, env = "YTDIGEST_PLAIN_TEXT")]
    plain_text: bool,

    /// Print the /summary route for the input and exit.
    #[arg(long)]
    route_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "YTDIGEST_NO_PROGRESS")]
    no_progress: bool,

    /// Whole-request timeout in seconds (0 = none).
    #[arg(long, env = "YTDIGEST_TIMEOUT", default_value_t = 600)]
    timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "YTDIGEST_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the summary itself.
    #[arg(short, long, env = "YTDIGEST_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Video,
    Podcast,
}

impl From<ModeArg> for SummaryMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Video => SummaryMode::Video,
            ModeArg::Podcast => SummaryMode::Podcast,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModelArg {
    Gemini,
}

impl From<ModelArg> for AiModel {
    fn from(v: ModelArg) -> Self {
        match v {
            ModelArg::Gemini => AiModel::Gemini,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar provides the feedback that matters; keep library
    // INFO logs out of its way unless asked for.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.route_only;
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

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn SummaryProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Resolve input ────────────────────────────────────────────────────
    let request = match resolve_input(&cli.input, &config) {
        Ok(request) => request,
        Err(DigestError::InvalidVideoUrl { input }) => {
            tracing::debug!("rejected input '{}'", input);
            anyhow::bail!(INVALID_URL_MESSAGE);
        }
        Err(e) => return Err(e).context("Invalid input"),
    };

    if cli.route_only {
        let route = SummaryRoute {
            url: request.url,
            language: request.language,
            mode: request.mode,
            ai_model: request.ai_model,
        };
        println!("{}", route.to_path());
        return Ok(());
    }

    // ── Stream the summary ───────────────────────────────────────────────
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let summary = match stream_summary(&request, &config, cancel).await {
        SummaryState::Complete(summary) => summary,
        SummaryState::Cancelled => {
            if !cli.quiet {
                eprintln!("{} Cancelled", cyan("⚠"));
            }
            std::process::exit(130);
        }
        SummaryState::Failed(message) => {
            // The progress callback already printed the failure.
            if !show_progress {
                eprintln!("{} {}", red("✘"), red(&message));
            }
            std::process::exit(1);
        }
        other => anyhow::bail!("Summary request ended in unexpected state {other:?}"),
    };

    // ── Print ────────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?;
        println!("{json}");
    } else {
        let text = if cli.plain_text {
            clean_for_pdf(&summary.document.content)
        } else {
            summary.document.content.clone()
        };
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(text.as_bytes())
            .context("Failed to write to stdout")?;
        if !text.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    // ── Export PDF ───────────────────────────────────────────────────────
    if !cli.no_pdf {
        let meta = RenderMeta {
            language_name: language_display_name(&request.language).to_string(),
            source: summary.source,
            mode: request.mode,
            generated_at: chrono::Local::now(),
        };
        match export_pdf(&summary.document, &meta, &PdfLayout::default(), &cli.output_dir) {
            Ok(path) => {
                if !cli.quiet {
                    eprintln!("{}  PDF  →  {}", green("✔"), bold(&path.display().to_string()));
                }
            }
            Err(e) => {
                tracing::error!("PDF export failed: {}", e);
                anyhow::bail!(PDF_FAILED_MESSAGE);
            }
        }
    }

    Ok(())
}

/// Map CLI args to `SummaryConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<SummaryConfig> {
    let mut builder = SummaryConfig::builder()
        .endpoint(&cli.endpoint)
        .language(&cli.lang)
        .mode(cli.mode.into())
        .ai_model(cli.model.into())
        .request_timeout_secs(cli.timeout);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

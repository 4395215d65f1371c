//! CLI binary for docsift.
//!
//! A thin shim over the library crate: maps CLI flags to `PipelineConfig`,
//! runs one of the two paths and prints the result.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use docsift::answer::{render, render_html, AnswerSlot, BackendPayload, RevealState, SearchReply, SearchSession};
use docsift::{
    ingest_file, ExtractionProgressCallback, PageSeparator, PipelineConfig, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

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

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Live progress bar plus one log line per extracted page.
struct CliProgressCallback {
    bar: ProgressBar,
    /// When the previous page finished, for per-page timing.
    last_page_at: Mutex<Instant>,
}

impl CliProgressCallback {
    /// Spinner until the page count is known.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(SPINNER);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            last_page_at: Mutex::new(Instant::now()),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(SPINNER);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
        self.bar.reset_eta();
    }

    fn page_elapsed_ms(&self) -> u128 {
        match self.last_page_at.lock() {
            Ok(mut last) => {
                let elapsed = last.elapsed().as_millis();
                *last = Instant::now();
                elapsed
            }
            Err(_) => 0,
        }
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        if let Ok(mut last) = self.last_page_at.lock() {
            *last = Instant::now();
        }
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Extracting {total_pages} pages…"))
        ));
    }

    fn on_page_complete(&self, current: usize, total: usize, text_len: usize) {
        let elapsed_ms = self.page_elapsed_ms();
        let marker = if text_len == 0 { cyan("○") } else { green("✓") };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<8}  {}",
            marker,
            current,
            total,
            dim(&format!("{text_len:>6} bytes")),
            dim(&format!("{}ms", elapsed_ms)),
        ));
        self.bar.inc(1);
    }

    fn on_extraction_error(&self, page: Option<usize>, error: &str) {
        self.bar.finish_and_clear();
        match page {
            Some(p) => eprintln!("{} Page {} failed: {}", red("✘"), p, red(error)),
            None => eprintln!("{} {}", red("✘"), red(error)),
        }
    }

    fn on_extraction_complete(&self, total_pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages extracted",
            green("✔"),
            bold(&total_pages.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract a PDF to stdout
  docsift extract document.pdf

  # Extract to a file with a heading per page
  docsift extract document.pdf --separator page -o document.txt

  # Full output (pages, paragraphs, stats) as JSON
  docsift extract --json document.pdf > output.json

  # Render a backend answer as HTML
  echo "{'result': '## Summary\n\n- **one**\n- two'}" | docsift render --html -

  # Play back the answer of a saved search reply
  docsift reveal --reply reply.json --interval-ms 10

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to an existing libpdfium
  RUST_LOG                Overrides the log filter (e.g. docsift=debug)
"#;

/// Extract text from PDFs and render search answers.
#[derive(Parser, Debug)]
#[command(
    name = "docsift",
    version,
    about = "Extract text from PDFs and render search answers",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCSIFT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCSIFT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract and normalise the text of a PDF.
    Extract(ExtractArgs),
    /// Resolve an answer payload and print its markup tree or HTML.
    Render(RenderArgs),
    /// Resolve an answer payload and reveal it in the terminal.
    Reveal(RevealArgs),
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Local PDF file path.
    input: PathBuf,

    /// Write the text to this file instead of stdout.
    #[arg(short, long, env = "DOCSIFT_OUTPUT")]
    output: Option<PathBuf>,

    /// Page separator: blank, page, hr, or a custom string.
    #[arg(long, env = "DOCSIFT_SEPARATOR", default_value = "blank")]
    separator: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "DOCSIFT_PASSWORD")]
    password: Option<String>,

    /// Path to the pdfium shared library.
    #[arg(long, env = "DOCSIFT_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,

    /// Output structured JSON (IngestOutput) instead of text.
    #[arg(long, env = "DOCSIFT_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "DOCSIFT_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Args, Debug)]
struct PayloadArgs {
    /// File holding the payload, or `-` for stdin.
    input: String,

    /// Treat the input as a full search reply body.
    #[arg(long)]
    reply: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    payload: PayloadArgs,

    /// Print HTML instead of the JSON markup tree.
    #[arg(long, env = "DOCSIFT_HTML")]
    html: bool,
}

#[derive(Args, Debug)]
struct RevealArgs {
    #[command(flatten)]
    payload: PayloadArgs,

    /// Milliseconds per revealed character.
    #[arg(long, env = "DOCSIFT_REVEAL_INTERVAL_MS", default_value_t = 20,
          value_parser = clap::value_parser!(u64).range(1..))]
    interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar gives all the feedback that matters while it is up.
    let show_progress = match &cli.command {
        Command::Extract(args) => !cli.quiet && !args.no_progress && !args.json,
        _ => false,
    };
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

    match cli.command {
        Command::Extract(ref args) => run_extract(args, cli.quiet, show_progress).await,
        Command::Render(ref args) => run_render(args).await,
        Command::Reveal(ref args) => run_reveal(args, cli.quiet).await,
    }
}

async fn run_extract(args: &ExtractArgs, quiet: bool, show_progress: bool) -> Result<()> {
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };

    let config = build_config(args, progress_cb)?;
    let output = ingest_file(&args.input, &config)
        .await
        .with_context(|| format!("Extraction failed for {}", args.input.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if let Some(ref path) = args.output {
        tokio::fs::write(path, &output.text)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !quiet {
            eprintln!(
                "{}  {} pages  {} paragraphs  {}ms  →  {}",
                green("✔"),
                output.stats.total_pages,
                output.stats.paragraphs,
                output.stats.extraction_duration_ms,
                bold(&path.display().to_string()),
            );
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.text.as_bytes())
            .context("Failed to write to stdout")?;
        if !output.text.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if !quiet && !show_progress && !args.json {
        eprintln!(
            "Extracted {} pages ({} empty) in {}ms",
            output.stats.total_pages, output.stats.empty_pages, output.stats.extraction_duration_ms
        );
    }

    Ok(())
}

async fn run_render(args: &RenderArgs) -> Result<()> {
    let text = load_answer(&args.payload).await?;
    if args.html {
        println!("{}", render_html(&text));
    } else {
        let json = serde_json::to_string_pretty(&render(&text)).context("Failed to serialise markup")?;
        println!("{json}");
    }
    Ok(())
}

async fn run_reveal(args: &RevealArgs, quiet: bool) -> Result<()> {
    let config = PipelineConfig::builder()
        .reveal_interval(Duration::from_millis(args.interval_ms))
        .build()
        .context("Invalid configuration")?;

    if args.payload.reply {
        let body = read_input(&args.payload.input).await?;
        let reply = SearchReply::parse(&body).context("Failed to parse search reply")?;
        let mut session = SearchSession::new(&config);
        let ticket = session.begin(args.payload.input.clone());
        let answer = session.subscribe_answer();
        session.apply(&ticket, reply);
        if !quiet {
            print_results(&session);
        }
        return play(answer).await;
    }

    let text = load_answer(&args.payload).await?;
    let mut slot = AnswerSlot::from_config(&config);
    let answer = slot.subscribe();
    slot.present(text);
    play(answer).await
}

/// Print the visible prefix as it grows, until the reveal completes.
async fn play(mut answer: watch::Receiver<RevealState>) -> Result<()> {
    let stdout = io::stdout();
    let mut shown = 0;
    loop {
        let (delta, done) = {
            let state = answer.borrow_and_update();
            let visible = state.visible();
            (visible.get(shown..).unwrap_or_default().to_string(), state.is_complete())
        };
        if !delta.is_empty() {
            shown += delta.len();
            let mut handle = stdout.lock();
            handle.write_all(delta.as_bytes()).context("Failed to write to stdout")?;
            handle.flush().ok();
        }
        if done || answer.changed().await.is_err() {
            break;
        }
    }
    println!();
    Ok(())
}

fn print_results(session: &SearchSession) {
    if let Some(warning) = session.warning() {
        eprintln!("{} {}", cyan("⚠"), warning);
    }
    for result in session.results() {
        eprintln!(
            "  {} {}  {}",
            green("•"),
            bold(&result.document_name),
            dim(&format!(
                "{}% match  doc {}  chunk {}",
                result.match_percent(),
                result.document_id,
                result.chunk_id
            )),
        );
    }
}

/// Read the payload and resolve it to display text.
async fn load_answer(args: &PayloadArgs) -> Result<String> {
    let raw = read_input(&args.input).await?;
    if args.reply {
        let reply = SearchReply::parse(&raw).context("Failed to parse search reply")?;
        return Ok(reply.answer());
    }
    // Raw text goes through the string resolver, so JSON without `result` is shown as written.
    Ok(BackendPayload::Plain(raw).resolve())
}

async fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read {input}"))
    }
}

/// Map CLI args to `PipelineConfig`.
fn build_config(args: &ExtractArgs, progress: Option<ProgressCallback>) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder().page_separator(parse_separator(&args.separator));

    if let Some(ref pwd) = args.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref path) = args.pdfium_lib {
        builder = builder.pdfium_lib_path(path.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--separator` into `PageSeparator`.
fn parse_separator(s: &str) -> PageSeparator {
    match s.trim().to_lowercase().as_str() {
        "blank" | "none" => PageSeparator::Blank,
        "page" | "heading" => PageSeparator::PageHeading,
        "hr" | "---" => PageSeparator::HorizontalRule,
        _ => PageSeparator::Custom(s.to_string()),
    }
}

//! CLI binary for repharvest.
//!
//! A thin shim over the library crate that maps CLI flags to the two
//! pipeline configs and prints summaries.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use repharvest::{
    convert_dir, ConvertConfig, HarvestProgress, ProgressCallback, ScrapeConfig, Scraper,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: a bar over the unit set plus one log line per
/// downloaded/converted/failed unit. Skipped units only advance the bar —
/// on a resumed scrape thousands of them fly past in a blink and a line
/// each would drown the interesting output.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new(prefix: &'static str) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>4}/{len} units  ⏱ {elapsed_precise}  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix(prefix);
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl HarvestProgress for CliProgress {
    fn on_start(&self, total_units: usize) {
        self.bar.set_length(total_units as u64);
    }

    fn on_unit_start(&self, label: &str) {
        self.bar.set_message(label.to_string());
    }

    fn on_unit_done(&self, label: &str, bytes: usize) {
        self.bar.println(format!(
            "  {} {label}  {}",
            green("✓"),
            dim(&format!("{bytes} bytes"))
        ));
        self.bar.inc(1);
    }

    fn on_unit_skipped(&self, _label: &str) {
        self.bar.inc(1);
    }

    fn on_unit_failed(&self, label: &str, error: &str) {
        self.bar.println(format!("  {} {label}  {}", red("✗"), red(error)));
        self.bar.inc(1);
    }

    fn on_finish(&self, _done: usize, _skipped: usize, _failed: usize) {
        self.bar.finish_and_clear();
    }
}

// ── CLI definition ────────────────────────────────────────────────────────────

const AFTER_HELP: &str = r#"EXAMPLES:
  # Download every report type since 2010 (resumes automatically)
  repharvest scrape --session 6770B1C923A4B663BAF6A40FEFB9877F

  # Only types 1 and 4, starting 2015, into a custom directory
  repharvest scrape --session $SID --types 1,4 --start-year 2015 --out archive

  # Convert the downloaded PDFs to text
  repharvest convert reports --out reports_txt

  # Machine-readable run summary
  repharvest scrape --session $SID --json

SESSION IDENTIFIER:
  The site issues a session cookie when you open the report page in a
  browser; copy its value (devtools → cookies) and pass it via --session or
  REPHARVEST_SESSION. The whole run reuses that one session — if it expires
  mid-run, re-run with a fresh identifier and the already-downloaded months
  are skipped.
"#;

/// Fetch monthly report PDFs and batch-convert them to plain text.
#[derive(Parser, Debug)]
#[command(
    name = "repharvest",
    version,
    about = "Fetch monthly report PDFs from the reporting site and convert them to text",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output the run summary as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, global = true)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download report PDFs for every (type, month) unit since the start year.
    Scrape {
        /// Session identifier (the site's session cookie value).
        #[arg(long, env = "REPHARVEST_SESSION")]
        session: String,

        /// Output directory for the downloaded PDFs.
        #[arg(short, long, default_value = "reports")]
        out: PathBuf,

        /// Comma-separated report types to fetch (1–6). Default: all.
        #[arg(long)]
        types: Option<String>,

        /// First year of the date range.
        #[arg(long, default_value_t = 2010)]
        start_year: i32,

        /// Override the report endpoint URL.
        #[arg(long, env = "REPHARVEST_URL")]
        url: Option<String>,

        /// Fixed delay before every request, in milliseconds.
        #[arg(long, default_value_t = 1500)]
        delay_ms: u64,

        /// Extra attempts after the first failed request.
        #[arg(long, default_value_t = 3)]
        retries: u32,

        /// Per-request HTTP timeout in seconds.
        #[arg(long, default_value_t = 60)]
        timeout: u64,
    },

    /// Convert a directory of PDFs to text files via an external converter.
    Convert {
        /// Directory containing the source PDFs.
        src: PathBuf,

        /// Output directory for the text files.
        #[arg(short, long, default_value = "reports_txt")]
        out: PathBuf,

        /// Converter program.
        #[arg(long, default_value = "pdftotext", env = "REPHARVEST_CONVERTER")]
        program: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
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

    let progress: Option<ProgressCallback> = if show_progress {
        let prefix = match &cli.command {
            Command::Scrape { .. } => "Scraping",
            Command::Convert { .. } => "Converting",
        };
        Some(CliProgress::new(prefix) as ProgressCallback)
    } else {
        None
    };

    match cli.command {
        Command::Scrape {
            session,
            out,
            types,
            start_year,
            url,
            delay_ms,
            retries,
            timeout,
        } => {
            let mut builder = ScrapeConfig::builder(session)
                .start_year(start_year)
                .request_delay(Duration::from_millis(delay_ms))
                .max_retries(retries)
                .http_timeout(Duration::from_secs(timeout));

            if let Some(ref spec) = types {
                builder = builder.report_types(parse_types(spec)?);
            }
            if let Some(url) = url {
                let mut site = repharvest::SiteProfile::default();
                site.url = url;
                builder = builder.site(site);
            }
            if let Some(cb) = progress {
                builder = builder.progress(cb);
            }

            let config = builder.build().context("Invalid configuration")?;
            let scraper = Scraper::new(config).context("Failed to set up HTTP client")?;
            let summary = scraper.run(&out).await.context("Scrape failed")?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary)
                        .context("Failed to serialise summary")?
                );
            } else if !cli.quiet {
                eprintln!(
                    "{} {} downloaded, {} skipped  →  {}",
                    green("✔"),
                    bold(&summary.downloaded.to_string()),
                    summary.skipped,
                    bold(&out.display().to_string()),
                );
            }
        }

        Command::Convert { src, out, program } => {
            let mut builder = ConvertConfig::builder().program(program);
            if let Some(cb) = progress {
                builder = builder.progress(cb);
            }
            let config = builder.build().context("Invalid configuration")?;

            let summary = convert_dir(&src, &out, &config)
                .await
                .context("Conversion failed")?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary)
                        .context("Failed to serialise summary")?
                );
            } else if !cli.quiet {
                if summary.failed.is_empty() {
                    eprintln!(
                        "{} {} files converted  →  {}",
                        green("✔"),
                        bold(&summary.converted.to_string()),
                        bold(&out.display().to_string()),
                    );
                } else {
                    eprintln!(
                        "{} {}/{} files converted  ({} failed)",
                        red("⚠"),
                        bold(&summary.converted.to_string()),
                        summary.converted + summary.failed.len(),
                        red(&summary.failed.len().to_string()),
                    );
                    for failure in &summary.failed {
                        eprintln!("   {}", red(&failure.to_string()));
                    }
                }
            }
        }
    }

    Ok(())
}

/// Parse `--types "1,2,5"` into a type list. Range checking happens in the
/// config builder.
fn parse_types(spec: &str) -> Result<Vec<u8>> {
    spec.split(',')
        .map(|part| {
            part.trim()
                .parse::<u8>()
                .with_context(|| format!("Invalid report type: '{}'", part.trim()))
        })
        .collect()
}

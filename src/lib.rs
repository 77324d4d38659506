//! # repharvest
//!
//! Fetch monthly report PDFs from a legacy government reporting site and
//! batch-convert them to plain text.
//!
//! ## Two independent pipelines
//!
//! ```text
//! scrape    types × months ──▶ skip-if-exists ──▶ select POST ──▶ download POST ──▶ REL_*.pdf
//! convert   *.pdf ──▶ external converter (pdftotext) ──▶ *.txt
//! ```
//!
//! * **Scrape** — the site is a stateful form application: emitting one
//!   report takes two sequential POSTs per (type, month, year) unit, the
//!   first parametrising the report in the server session, the second
//!   returning the rendered PDF. Every request goes through a retrying
//!   engine with a fixed pre-request delay that doubles as rate limiting.
//!   A unit whose output file already exists is skipped entirely, so an
//!   interrupted multi-year run resumes where it stopped.
//!
//! * **Convert** — one external converter invocation per PDF, collecting
//!   per-file failures without stopping the batch.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use repharvest::{convert_dir, ConvertConfig, ScrapeConfig, Scraper};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Session identifier pre-obtained from the site (e.g. browser devtools).
//!     let config = ScrapeConfig::builder("6770B1C923A4B663BAF6A40FEFB9877F").build()?;
//!     let summary = Scraper::new(config)?.run("reports").await?;
//!     eprintln!("{} downloaded, {} skipped", summary.downloaded, summary.skipped);
//!
//!     let summary = convert_dir("reports", "reports_txt", &ConvertConfig::default()).await?;
//!     eprintln!("{} converted, {} failed", summary.converted, summary.failed.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `repharvest` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! repharvest = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod progress;
pub mod retry;
pub mod scrape;
pub mod transport;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConvertConfig, ConvertConfigBuilder, ScrapeConfig, ScrapeConfigBuilder};
pub use convert::{convert_dir, ConvertSummary};
pub use error::{FileError, HarvestError};
pub use progress::{HarvestProgress, ProgressCallback};
pub use retry::{Engine, RetryPolicy};
pub use scrape::{MonthYear, ReportUnit, ScrapeSummary, Scraper, SiteProfile};
pub use transport::{FormRequest, FormResponse, FormTransport, HttpTransport};

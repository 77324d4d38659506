//! Scrape pipeline: replay the two-step report form for every unit.
//!
//! ## Data Flow
//!
//! ```text
//! units ──▶ skip-if-exists ──▶ select POST ──▶ download POST ──▶ save
//! (type×month)  (filesystem)     (session side   (PDF bytes)     (REL_*.pdf)
//!                                 effect only)
//! ```
//!
//! One *unit* is a (report type, month, year) triple. The unit's output file
//! is the sole completion marker: if `REL_<type>_<month>_<year>.pdf` already
//! exists, the unit is skipped without touching the network, which makes the
//! run safely resumable after any interruption. Files are never overwritten.
//!
//! Iteration is sequential, report types outer, dates inner — the same
//! deterministic order every run, so a resumed run skips exactly the prefix
//! it already downloaded before picking up where it stopped.

pub mod dates;
pub mod site;

use std::path::Path;
use std::sync::Arc;

use chrono::Datelike;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ScrapeConfig;
use crate::error::HarvestError;
use crate::retry::Engine;
use crate::transport::{FormTransport, HttpTransport};

pub use dates::{month_span, MonthYear};
pub use site::SiteProfile;

/// One unit of scrape work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportUnit {
    /// Report category, 1–6.
    pub report_type: u8,
    pub date: MonthYear,
}

impl ReportUnit {
    /// Deterministic output file name for this unit.
    pub fn file_name(&self) -> String {
        format!(
            "REL_{}_{}_{}.pdf",
            self.report_type, self.date.month, self.date.year
        )
    }
}

/// Counters for a completed scrape run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScrapeSummary {
    /// Units fetched and written during this run.
    pub downloaded: usize,
    /// Units skipped because their file already existed.
    pub skipped: usize,
    /// Total PDF bytes written during this run.
    pub bytes_written: u64,
}

/// The scrape orchestrator.
///
/// Owns a retrying [`Engine`] over an injected [`FormTransport`]; tests pass
/// an in-memory double, production uses [`Scraper::new`] which builds an
/// [`HttpTransport`].
pub struct Scraper {
    engine: Engine,
    config: ScrapeConfig,
}

impl Scraper {
    /// Build a scraper with the production HTTP transport.
    pub fn new(config: ScrapeConfig) -> Result<Self, HarvestError> {
        let transport = Arc::new(HttpTransport::new(config.http_timeout)?);
        Ok(Self::with_transport(transport, config))
    }

    /// Build a scraper over an arbitrary transport (used by tests).
    pub fn with_transport(transport: Arc<dyn FormTransport>, config: ScrapeConfig) -> Self {
        let engine = Engine::new(transport, config.retry);
        Self { engine, config }
    }

    /// The full unit set for this config: configured types crossed with the
    /// months from the start year through the current month.
    pub fn units(&self) -> Vec<ReportUnit> {
        let now = chrono::Local::now();
        let span = month_span(self.config.start_year, now.month(), now.year());

        self.config
            .report_types
            .iter()
            .flat_map(|&report_type| {
                span.iter()
                    .map(move |&date| ReportUnit { report_type, date })
            })
            .collect()
    }

    /// Run the scrape over the full unit set into `output_dir`.
    ///
    /// Creates the directory if absent. Any unit whose POST sequence
    /// exhausts its retries aborts the run; everything downloaded up to that
    /// point stays on disk and is skipped by the next run.
    pub async fn run(&self, output_dir: impl AsRef<Path>) -> Result<ScrapeSummary, HarvestError> {
        let units = self.units();
        self.run_units(output_dir, &units).await
    }

    /// Run the scrape over an explicit unit list.
    ///
    /// The order of `units` is preserved; any deterministic order resumes
    /// correctly since completion is tracked per file.
    pub async fn run_units(
        &self,
        output_dir: impl AsRef<Path>,
        units: &[ReportUnit],
    ) -> Result<ScrapeSummary, HarvestError> {
        let output_dir = output_dir.as_ref();
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|source| HarvestError::OutputDir {
                path: output_dir.to_path_buf(),
                source,
            })?;

        info!(
            "Scraping {} report units into {}",
            units.len(),
            output_dir.display()
        );
        if let Some(ref cb) = self.config.progress {
            cb.on_start(units.len());
        }

        let mut summary = ScrapeSummary::default();

        for unit in units {
            let file_name = unit.file_name();
            let path = output_dir.join(&file_name);

            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                debug!("{file_name} already present, skipping");
                summary.skipped += 1;
                if let Some(ref cb) = self.config.progress {
                    cb.on_unit_skipped(&file_name);
                }
                continue;
            }

            if let Some(ref cb) = self.config.progress {
                cb.on_unit_start(&file_name);
            }
            debug!(
                "Fetching type {} for {} ({})",
                unit.report_type,
                unit.date,
                unit.date.label()
            );

            // Step 1: parametrise the report inside the server session.
            // The response body is irrelevant; only the side effect counts.
            let select = self
                .config
                .site
                .select_request(&self.config.session_id, unit);
            self.engine.post(&select).await?;

            // Step 2: press print; the body is the rendered PDF.
            let download = self.config.site.download_request(&self.config.session_id);
            let body = self.engine.post(&download).await?;

            tokio::fs::write(&path, &body)
                .await
                .map_err(|source| HarvestError::SaveFailed {
                    path: path.clone(),
                    source,
                })?;

            info!("Saved {} ({} bytes)", file_name, body.len());
            summary.downloaded += 1;
            summary.bytes_written += body.len() as u64;
            if let Some(ref cb) = self.config.progress {
                cb.on_unit_done(&file_name, body.len());
            }
        }

        info!(
            "Scrape complete: {} downloaded, {} skipped, {} bytes",
            summary.downloaded, summary.skipped, summary.bytes_written
        );
        if let Some(ref cb) = self.config.progress {
            cb.on_finish(summary.downloaded, summary.skipped, 0);
        }

        Ok(summary)
    }
}

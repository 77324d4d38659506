//! Configuration types for the scrape and convert pipelines.
//!
//! Both pipelines are configured through one struct each, built via a
//! builder with validation. Keeping every knob in one place makes a run
//! reproducible from its config alone and gives the CLI a single mapping
//! target for its flags.

use std::fmt;
use std::time::Duration;

use crate::error::HarvestError;
use crate::progress::ProgressCallback;
use crate::retry::RetryPolicy;
use crate::scrape::SiteProfile;

/// The report categories the reporting site offers.
pub const REPORT_TYPES: std::ops::RangeInclusive<u8> = 1..=6;

/// Default first year of the archive.
pub const DEFAULT_START_YEAR: i32 = 2010;

// ── Scrape ────────────────────────────────────────────────────────────────

/// Configuration for a scrape run.
///
/// Built via [`ScrapeConfig::builder`]; only the session identifier is
/// required.
///
/// # Example
/// ```rust
/// use repharvest::ScrapeConfig;
///
/// let config = ScrapeConfig::builder("6770B1C923A4B663BAF6A40FEFB9877F")
///     .report_types(vec![1, 4])
///     .start_year(2015)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ScrapeConfig {
    /// Opaque session identifier issued by the site, sent as a cookie on
    /// every request. Pre-obtained; there is no renewal logic.
    pub session_id: String,

    /// Report types to fetch, each in 1–6. Default: all six.
    pub report_types: Vec<u8>,

    /// First year of the date range. The range always ends at the current
    /// month. Default: 2010, the oldest year the archive serves.
    pub start_year: i32,

    /// Retry ceiling and fixed pre-request delay.
    pub retry: RetryPolicy,

    /// Per-request HTTP timeout. Default: 60 s — report rendering on the
    /// server side is slow for the dense months.
    pub http_timeout: Duration,

    /// Wire-level form contract of the target site.
    pub site: SiteProfile,

    /// Optional per-unit progress callback.
    pub progress: Option<ProgressCallback>,
}

impl fmt::Debug for ScrapeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrapeConfig")
            .field("session_id", &"<redacted>")
            .field("report_types", &self.report_types)
            .field("start_year", &self.start_year)
            .field("retry", &self.retry)
            .field("http_timeout", &self.http_timeout)
            .field("site.url", &self.site.url)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl ScrapeConfig {
    /// Create a builder with the given session identifier.
    pub fn builder(session_id: impl Into<String>) -> ScrapeConfigBuilder {
        ScrapeConfigBuilder {
            config: ScrapeConfig {
                session_id: session_id.into(),
                report_types: REPORT_TYPES.collect(),
                start_year: DEFAULT_START_YEAR,
                retry: RetryPolicy::default(),
                http_timeout: Duration::from_secs(60),
                site: SiteProfile::default(),
                progress: None,
            },
        }
    }
}

/// Builder for [`ScrapeConfig`].
pub struct ScrapeConfigBuilder {
    config: ScrapeConfig,
}

impl ScrapeConfigBuilder {
    pub fn report_types(mut self, types: Vec<u8>) -> Self {
        self.config.report_types = types;
        self
    }

    pub fn start_year(mut self, year: i32) -> Self {
        self.config.start_year = year;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.retry.max_retries = n;
        self
    }

    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.config.retry.request_delay = delay;
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn site(mut self, site: SiteProfile) -> Self {
        self.config.site = site;
        self
    }

    pub fn progress(mut self, callback: ProgressCallback) -> Self {
        self.config.progress = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ScrapeConfig, HarvestError> {
        let c = &self.config;
        if c.session_id.trim().is_empty() {
            return Err(HarvestError::InvalidConfig(
                "Session identifier must not be empty".into(),
            ));
        }
        if c.report_types.is_empty() {
            return Err(HarvestError::InvalidConfig(
                "At least one report type is required".into(),
            ));
        }
        if let Some(&bad) = c
            .report_types
            .iter()
            .find(|t| !REPORT_TYPES.contains(*t))
        {
            return Err(HarvestError::InvalidConfig(format!(
                "Report type must be {}–{}, got {bad}",
                REPORT_TYPES.start(),
                REPORT_TYPES.end()
            )));
        }
        if c.start_year < 1990 {
            return Err(HarvestError::InvalidConfig(format!(
                "Start year must be ≥ 1990, got {}",
                c.start_year
            )));
        }
        Ok(self.config)
    }
}

// ── Convert ───────────────────────────────────────────────────────────────

/// Configuration for a conversion batch.
///
/// The defaults reproduce the canonical invocation:
/// `pdftotext -enc UTF-8 -nopgbrk -table <in> <out>`.
#[derive(Clone)]
pub struct ConvertConfig {
    /// Converter program name or path. Default: `pdftotext`.
    pub program: String,

    /// Flags inserted before the positional input and output paths.
    /// Default: UTF-8 output, no page-break characters, table layout kept.
    pub flags: Vec<String>,

    /// Optional per-file progress callback.
    pub progress: Option<ProgressCallback>,
}

impl fmt::Debug for ConvertConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertConfig")
            .field("program", &self.program)
            .field("flags", &self.flags)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            program: "pdftotext".into(),
            flags: ["-enc", "UTF-8", "-nopgbrk", "-table"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            progress: None,
        }
    }
}

impl ConvertConfig {
    /// Create a builder with the default `pdftotext` invocation.
    pub fn builder() -> ConvertConfigBuilder {
        ConvertConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConvertConfig`].
pub struct ConvertConfigBuilder {
    config: ConvertConfig,
}

impl ConvertConfigBuilder {
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.config.program = program.into();
        self
    }

    pub fn flags(mut self, flags: Vec<String>) -> Self {
        self.config.flags = flags;
        self
    }

    pub fn progress(mut self, callback: ProgressCallback) -> Self {
        self.config.progress = Some(callback);
        self
    }

    pub fn build(self) -> Result<ConvertConfig, HarvestError> {
        if self.config.program.trim().is_empty() {
            return Err(HarvestError::InvalidConfig(
                "Converter program must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

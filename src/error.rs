//! Error types for the repharvest library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`HarvestError`] — **Fatal**: the run cannot proceed at all (output
//!   directory cannot be created, retries exhausted against the reporting
//!   site, converter program missing). Returned as `Err(HarvestError)` from
//!   the top-level entry points.
//!
//! * [`FileError`] — **Non-fatal**: one file of a batch failed (the external
//!   converter exited non-zero) but the rest of the batch is fine. Collected
//!   inside [`crate::convert::ConvertSummary`] so callers can inspect partial
//!   success rather than losing the whole batch to one bad file.
//!
//! The split matters for the scraper in particular: a unit whose POST
//! sequence exhausts its retries aborts the entire run (the session is
//! probably dead and every further request would burn the same retry budget),
//! while progress already on disk is preserved by the skip-if-exists check on
//! the next run.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the repharvest library.
///
/// Per-file conversion failures use [`FileError`] and are stored in
/// [`crate::convert::ConvertSummary`] rather than propagated here.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Output directory could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every attempt against the reporting site failed.
    ///
    /// `attempts` counts the initial request plus all retries.
    #[error(
        "Gave up POSTing to '{url}' after {attempts} attempts: {detail}\n\
         The session identifier may have expired — obtain a fresh one and re-run;\n\
         already-downloaded reports are skipped automatically."
    )]
    Connectivity {
        url: String,
        attempts: u32,
        detail: String,
    },

    /// A downloaded report could not be written to disk.
    #[error("Failed to write report file '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The converter source directory could not be listed.
    #[error("Failed to read source directory '{path}': {source}")]
    SourceDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external converter program could not be started at all.
    ///
    /// Distinct from a non-zero exit (a [`FileError`]): if the program does
    /// not exist, every file of the batch would fail identically, so this is
    /// fatal.
    #[error(
        "Failed to run converter '{program}': {source}\n\
         Check the program is installed and on PATH (e.g. poppler-utils for pdftotext)."
    )]
    ConverterSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A non-fatal error for a single file of a conversion batch.
///
/// Stored in [`crate::convert::ConvertSummary::failed`]. The batch continues
/// past failed files.
#[derive(Debug, Clone, Error, serde::Serialize)]
pub enum FileError {
    /// Converter exited with a non-zero status for this file.
    #[error("'{file}': converter exited with status {status}")]
    ConverterFailed { file: String, status: i32 },

    /// Converter was terminated by a signal before producing an exit status.
    #[error("'{file}': converter terminated by signal")]
    ConverterKilled { file: String },
}

/// Transport-level failure of a single POST attempt.
///
/// Always retryable from the [`crate::retry::Engine`]'s point of view; the
/// engine decides when to stop and wraps the final one into
/// [`HarvestError::Connectivity`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("request failed: {0}")]
    Request(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_display() {
        let e = HarvestError::Connectivity {
            url: "http://reports.example/index_er.jsf".into(),
            attempts: 4,
            detail: "HTTP 502".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("4 attempts"), "got: {msg}");
        assert!(msg.contains("HTTP 502"), "got: {msg}");
    }

    #[test]
    fn converter_failed_display() {
        let e = FileError::ConverterFailed {
            file: "REL_3_5_2014.pdf".into(),
            status: 99,
        };
        assert!(e.to_string().contains("REL_3_5_2014.pdf"));
        assert!(e.to_string().contains("99"));
    }

    #[test]
    fn file_error_serialises() {
        let e = FileError::ConverterFailed {
            file: "a.pdf".into(),
            status: 1,
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("a.pdf"), "got: {json}");
    }
}

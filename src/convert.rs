//! Convert pipeline: batch PDF-to-text via an external converter.
//!
//! Each `<name>.pdf` in the source directory becomes `<dest>/<name>.txt`,
//! produced by one converter invocation (`pdftotext` by default, with UTF-8
//! output, no page-break characters, and table layout preserved). The work
//! is embarrassingly per-file, so a failed file never stops the batch: a
//! non-zero exit is logged, recorded in the summary, and the loop moves on.
//! Only a spawn failure — the program missing outright — is fatal, because
//! every remaining file would fail the same way.
//!
//! Re-running over the same directories is idempotent as long as the
//! external converter is deterministic: the same inputs produce the same
//! `.txt` outputs, file for file.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::ConvertConfig;
use crate::error::{FileError, HarvestError};

/// Counters and per-file failures for a completed conversion batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConvertSummary {
    /// Files whose converter invocation exited successfully.
    pub converted: usize,
    /// Per-file failures, in batch order.
    pub failed: Vec<FileError>,
}

/// Destination path for one source PDF: same stem, `.txt` extension.
fn output_path(dest: &Path, pdf: &Path) -> PathBuf {
    let stem = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.join(format!("{stem}.txt"))
}

/// List the `.pdf` files of `src` in name order.
///
/// Sorting keeps batch order (and therefore logs and summaries) stable
/// across runs; `read_dir` order is filesystem-dependent.
async fn pdf_files(src: &Path) -> Result<Vec<PathBuf>, HarvestError> {
    let source_err = |source| HarvestError::SourceDir {
        path: src.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(src).await.map_err(source_err)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(source_err)? {
        let path = entry.path();
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Convert every PDF in `src` to a text file in `dest`.
///
/// Creates `dest` if absent. Returns the batch summary; per-file converter
/// failures are collected in [`ConvertSummary::failed`] rather than
/// propagated.
///
/// # Errors
/// Fatal only: unreadable source directory, uncreatable destination
/// directory, or a converter program that cannot be started at all.
pub async fn convert_dir(
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    config: &ConvertConfig,
) -> Result<ConvertSummary, HarvestError> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    tokio::fs::create_dir_all(dest)
        .await
        .map_err(|source| HarvestError::OutputDir {
            path: dest.to_path_buf(),
            source,
        })?;

    let files = pdf_files(src).await?;
    info!(
        "Converting {} PDF files from {} into {}",
        files.len(),
        src.display(),
        dest.display()
    );
    if let Some(ref cb) = config.progress {
        cb.on_start(files.len());
    }

    let mut summary = ConvertSummary::default();

    for pdf in &files {
        let file_name = pdf
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let txt = output_path(dest, pdf);

        if let Some(ref cb) = config.progress {
            cb.on_unit_start(&file_name);
        }
        info!("Converting {}", pdf.display());

        let status = Command::new(&config.program)
            .args(&config.flags)
            .arg(pdf)
            .arg(&txt)
            .status()
            .await
            .map_err(|source| HarvestError::ConverterSpawn {
                program: config.program.clone(),
                source,
            })?;

        if status.success() {
            summary.converted += 1;
            if let Some(ref cb) = config.progress {
                let bytes = tokio::fs::metadata(&txt)
                    .await
                    .map(|m| m.len() as usize)
                    .unwrap_or(0);
                cb.on_unit_done(&file_name, bytes);
            }
        } else {
            let error = match status.code() {
                Some(code) => FileError::ConverterFailed {
                    file: file_name.clone(),
                    status: code,
                },
                None => FileError::ConverterKilled {
                    file: file_name.clone(),
                },
            };
            warn!("{error}");
            if let Some(ref cb) = config.progress {
                cb.on_unit_failed(&file_name, &error.to_string());
            }
            summary.failed.push(error);
        }
    }

    info!(
        "Conversion complete: {} converted, {} failed",
        summary.converted,
        summary.failed.len()
    );
    if let Some(ref cb) = config.progress {
        cb.on_finish(summary.converted, 0, summary.failed.len());
    }

    Ok(summary)
}

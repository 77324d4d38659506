//! Integration tests for both pipelines.
//!
//! The scrape tests drive the real orchestrator against an in-memory
//! transport double that records every request, so the resumability
//! properties ("an existing file means zero HTTP calls") are checked
//! exactly. The convert tests use ubiquitous unix tools (`cp`, `false`) as
//! stand-in converter programs — the pipeline only cares about argv shape
//! and exit status, not what the program does.

use async_trait::async_trait;
use repharvest::{
    convert_dir, ConvertConfig, FormRequest, FormResponse, FormTransport, MonthYear, ReportUnit,
    ScrapeConfig, Scraper,
};
use repharvest::error::TransportError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Scrape pipeline ──────────────────────────────────────────────────────────

/// Transport double: always succeeds, records the form-field names of every
/// request so tests can assert the select/download sequence.
struct RecordingTransport {
    calls: AtomicUsize,
    requests: Mutex<Vec<Vec<String>>>,
}

impl RecordingTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FormTransport for RecordingTransport {
    async fn post_form(&self, request: &FormRequest) -> Result<FormResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push(request.form.iter().map(|(k, _)| k.clone()).collect());
        Ok(FormResponse {
            status: 200,
            body: b"%PDF-1.4 scripted report body".to_vec(),
        })
    }
}

fn test_config() -> ScrapeConfig {
    ScrapeConfig::builder("TESTSESSION")
        .request_delay(Duration::ZERO)
        .build()
        .unwrap()
}

fn units() -> Vec<ReportUnit> {
    vec![
        ReportUnit {
            report_type: 1,
            date: MonthYear {
                month: 1,
                year: 2010,
            },
        },
        ReportUnit {
            report_type: 1,
            date: MonthYear {
                month: 2,
                year: 2010,
            },
        },
    ]
}

#[tokio::test]
async fn scrape_writes_one_pdf_per_unit() {
    let transport = RecordingTransport::new();
    let scraper = Scraper::with_transport(transport.clone(), test_config());
    let out = tempfile::tempdir().unwrap();

    let summary = scraper.run_units(out.path(), &units()).await.unwrap();

    assert_eq!(summary.downloaded, 2);
    assert_eq!(summary.skipped, 0);
    // Two POSTs per unit: select, then download.
    assert_eq!(transport.call_count(), 4);

    for name in ["REL_1_1_2010.pdf", "REL_1_2_2010.pdf"] {
        let body = std::fs::read(out.path().join(name)).unwrap();
        assert!(body.starts_with(b"%PDF"), "{name} is not the PDF body");
    }
}

#[tokio::test]
async fn select_precedes_download_for_every_unit() {
    let transport = RecordingTransport::new();
    let config = test_config();
    let type_field = config.site.type_field.clone();
    let scraper = Scraper::with_transport(transport.clone(), config);
    let out = tempfile::tempdir().unwrap();

    scraper.run_units(out.path(), &units()).await.unwrap();

    let requests = transport.requests.lock().unwrap();
    assert_eq!(requests.len(), 4);
    for pair in requests.chunks(2) {
        assert!(
            pair[0].contains(&type_field),
            "first POST of a unit must be the select step"
        );
        assert!(
            !pair[1].contains(&type_field),
            "second POST of a unit must be the download step"
        );
    }
}

#[tokio::test]
async fn existing_units_cost_zero_http_calls() {
    let transport = RecordingTransport::new();
    let scraper = Scraper::with_transport(transport.clone(), test_config());
    let out = tempfile::tempdir().unwrap();

    scraper.run_units(out.path(), &units()).await.unwrap();
    let first_run_calls = transport.call_count();

    // Everything exists now — the rerun must not touch the network.
    let summary = scraper.run_units(out.path(), &units()).await.unwrap();
    assert_eq!(summary.downloaded, 0);
    assert_eq!(summary.skipped, 2);
    assert_eq!(transport.call_count(), first_run_calls);
}

#[tokio::test]
async fn existing_files_are_never_overwritten() {
    let transport = RecordingTransport::new();
    let scraper = Scraper::with_transport(transport.clone(), test_config());
    let out = tempfile::tempdir().unwrap();

    let marker = out.path().join("REL_1_1_2010.pdf");
    std::fs::write(&marker, b"bytes from an earlier interrupted run").unwrap();

    let summary = scraper.run_units(out.path(), &units()).await.unwrap();

    assert_eq!(summary.downloaded, 1);
    assert_eq!(summary.skipped, 1);
    let body = std::fs::read(&marker).unwrap();
    assert_eq!(body, b"bytes from an earlier interrupted run");
}

/// Transport double that fails every request.
struct DeadTransport {
    calls: AtomicUsize,
}

#[async_trait]
impl FormTransport for DeadTransport {
    async fn post_form(&self, _request: &FormRequest) -> Result<FormResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TransportError::Request("connection refused".into()))
    }
}

#[tokio::test]
async fn exhausted_retries_abort_the_run() {
    let transport = Arc::new(DeadTransport {
        calls: AtomicUsize::new(0),
    });
    let scraper = Scraper::with_transport(transport.clone(), test_config());
    let out = tempfile::tempdir().unwrap();

    let err = scraper.run_units(out.path(), &units()).await.unwrap_err();

    assert!(err.to_string().contains("4 attempts"), "got: {err}");
    // The run aborts on the first unit's select step: 1 + 3 retries, and no
    // POST is issued for the second unit.
    assert_eq!(transport.calls.load(Ordering::SeqCst), 4);
    assert!(!out.path().join("REL_1_1_2010.pdf").exists());
}

// ── Convert pipeline ─────────────────────────────────────────────────────────

#[cfg(unix)]
mod convert_pipeline {
    use super::*;

    /// `cp <in> <out>` stands in for the converter: deterministic, exits 0,
    /// and produces an output file the pipeline can account for.
    fn cp_config() -> ConvertConfig {
        ConvertConfig::builder()
            .program("cp")
            .flags(Vec::new())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn converts_exactly_the_pdfs_and_nothing_else() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        for name in ["a.pdf", "b.pdf", "skip.csv"] {
            std::fs::write(src.path().join(name), b"content").unwrap();
        }

        let summary = convert_dir(src.path(), dest.path(), &cp_config())
            .await
            .unwrap();

        assert_eq!(summary.converted, 2);
        assert!(summary.failed.is_empty());

        let mut produced: Vec<_> = std::fs::read_dir(dest.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        produced.sort();
        assert_eq!(produced, vec!["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn rerun_is_idempotent() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("a.pdf"), b"stable input").unwrap();

        convert_dir(src.path(), dest.path(), &cp_config())
            .await
            .unwrap();
        let first = std::fs::read(dest.path().join("a.txt")).unwrap();

        convert_dir(src.path(), dest.path(), &cp_config())
            .await
            .unwrap();
        let second = std::fs::read(dest.path().join("a.txt")).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn failing_converter_is_collected_not_fatal() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        for name in ["a.pdf", "b.pdf"] {
            std::fs::write(src.path().join(name), b"content").unwrap();
        }

        // `false` ignores its arguments and exits 1 for every file.
        let config = ConvertConfig::builder()
            .program("false")
            .flags(Vec::new())
            .build()
            .unwrap();

        let summary = convert_dir(src.path(), dest.path(), &config)
            .await
            .unwrap();

        assert_eq!(summary.converted, 0);
        assert_eq!(summary.failed.len(), 2, "batch must continue past failures");
        assert!(summary.failed[0].to_string().contains("a.pdf"));
    }

    #[tokio::test]
    async fn missing_program_is_fatal() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("a.pdf"), b"content").unwrap();

        let config = ConvertConfig::builder()
            .program("definitely-not-a-real-converter-binary")
            .build()
            .unwrap();

        let err = convert_dir(src.path(), dest.path(), &config)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("converter"), "got: {err}");
    }
}

//! Analysis view against a scripted backend

mod common;

use std::time::Duration;

use audit_client::{AnalysisView, SectionKind};
use audit_types::Severity;
use common::{init_tracing, FakeBackend};

const ENDPOINTS: [&str; 4] = ["fileinfo", "summarize", "keyfindings", "vulnerabilities"];

#[tokio::test]
async fn test_all_sections_requested_before_any_resolves() {
    init_tracing();
    let backend = FakeBackend::new();
    let gates: Vec<_> = ENDPOINTS.iter().map(|e| backend.gate(*e)).collect();
    let mut view = AnalysisView::new("abc123");

    let release = async {
        while backend.calls().len() < ENDPOINTS.len() {
            tokio::task::yield_now().await;
        }
        for gate in &gates {
            gate.add_permits(1);
        }
    };

    tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(view.load(&backend, |_| {}), release);
    })
    .await
    .expect("section requests were not issued concurrently");

    let calls = backend.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls.iter().all(|c| c.detail == "abc123"));
    for endpoint in ENDPOINTS {
        assert_eq!(backend.calls_to(endpoint).len(), 1, "{}", endpoint);
    }
    assert!(!view.state().any_loading());
}

#[tokio::test]
async fn test_sections_render_as_they_arrive() {
    init_tracing();
    let backend = FakeBackend::new();
    let slow = backend.gate("vulnerabilities");
    let mut view = AnalysisView::new("abc123");
    let mut snapshots = Vec::new();

    let release = async {
        while backend.calls().len() < ENDPOINTS.len() {
            tokio::task::yield_now().await;
        }
        // Let the three ungated sections settle first
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
        slow.add_permits(1);
    };

    tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(
            view.load(&backend, |state| snapshots.push(state.clone())),
            release
        );
    })
    .await
    .expect("load did not finish");

    // initial all-loading snapshot plus one per section
    assert_eq!(snapshots.len(), 5);
    assert!(snapshots[0].any_loading());

    let before_last = &snapshots[3];
    assert_eq!(before_last.summary_text(), "## Summary of abc123");
    assert!(before_last.file_info.data().is_some());
    assert!(before_last.key_findings.data().is_some());
    assert!(before_last.is_loading(SectionKind::Vulnerabilities));

    let last = &snapshots[4];
    assert!(!last.any_loading());
    assert_eq!(last.vulnerability_rows().len(), 2);
}

#[tokio::test]
async fn test_failing_section_does_not_affect_others() {
    init_tracing();
    let backend = FakeBackend::new();
    backend.fail("keyfindings");
    let mut view = AnalysisView::new("abc123");

    view.load(&backend, |_| {}).await;

    let state = view.state();
    assert!(state.key_findings.is_failed());
    assert!(!state.any_loading());
    assert_eq!(state.summary_text(), "## Summary of abc123");
    assert_eq!(state.file_info.data().map(|f| f.page_count), Some(42));
    assert_eq!(state.vulnerability_rows().len(), 2);
}

#[tokio::test]
async fn test_every_section_failing_leaves_empty_view() {
    let backend = FakeBackend::new();
    for endpoint in ENDPOINTS {
        backend.fail(endpoint);
    }
    let mut view = AnalysisView::new("abc123");

    view.load(&backend, |_| {}).await;

    let state = view.state();
    assert!(!state.any_loading());
    assert_eq!(state.summary_text(), "");
    assert!(state.vulnerability_rows().is_empty());
    assert!(state.file_info.is_failed());
}

#[tokio::test]
async fn test_critical_vulnerability_is_banded_high() {
    let backend = FakeBackend::new();
    let mut view = AnalysisView::new("abc123");
    view.load(&backend, |_| {}).await;

    let rows = view.state().vulnerability_rows();
    let top = rows
        .iter()
        .find(|r| r.description == "Unpatched software with known exploits")
        .unwrap();
    assert_eq!(top.criticality, 9.0);
    assert_eq!(top.severity, Severity::High);
    assert_eq!(top.color, "red");

    let other = rows.iter().find(|r| r.criticality == 6.5).unwrap();
    assert_eq!(other.severity, Severity::Medium);
}

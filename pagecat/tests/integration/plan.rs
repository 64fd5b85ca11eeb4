//! Batch merges described by a plan.

use lopdf::Document;
use pagecat::config::{MergePlan, PageSelection};
use pagecat::merge::CancellationToken;
use pagecat::{PageCatError, Session};
use tempfile::TempDir;

use crate::common::{marker, page_markers, write_pdf, write_png};

#[test]
fn test_plan_file_with_selections() {
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "a.pdf", 3);
    write_png(dir.path(), "cover.png", 30, 40);
    let plan_path = dir.path().join("plan.json");
    std::fs::write(
        &plan_path,
        r#"{"entries": [
            {"path": "cover.png"},
            {"path": "a.pdf", "pages": "3,1"},
            {"path": "a.pdf", "pages": "1"}
        ]}"#,
    )
    .unwrap();

    let plan = MergePlan::from_json_file(&plan_path).unwrap();
    let mut session = Session::default();
    let report = session.add_plan(&plan).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.pages_added, 4);

    let output = dir.path().join("out.pdf");
    session.export(&output, &CancellationToken::new(), None).unwrap();

    let doc = Document::load(&output).unwrap();
    assert_eq!(
        page_markers(&doc),
        vec![
            None,
            Some(marker("a.pdf", 2)),
            Some(marker("a.pdf", 0)),
            Some(marker("a.pdf", 0)),
        ]
    );
}

#[test]
fn test_inputs_with_global_selection() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 2);
    let b = write_pdf(dir.path(), "b.pdf", 2);
    let img = write_png(dir.path(), "img.png", 5, 5);

    let pages = PageSelection::parse("2").unwrap();
    let plan = MergePlan::from_inputs(&[a, img, b], Some(&pages));

    let mut session = Session::default();
    session.add_plan(&plan).unwrap();
    let labels: Vec<_> = session.pages().iter().map(|p| p.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["[PDF] a.pdf - 2p", "[IMG] img.png", "[PDF] b.pdf - 2p"]
    );
}

#[test]
fn test_selection_past_end_skips_source() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 2);
    let b = write_pdf(dir.path(), "b.pdf", 5);

    let pages = PageSelection::parse("4-5").unwrap();
    let plan = MergePlan::from_inputs(&[a, b], Some(&pages));

    let mut session = Session::default();
    let report = session.add_plan(&plan).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        PageCatError::InvalidSelection { .. }
    ));
    assert_eq!(session.len(), 2);
}

#[test]
fn test_missing_plan_file() {
    let err = MergePlan::from_json_file(std::path::Path::new("/nonexistent/plan.json"))
        .unwrap_err();
    assert!(matches!(err, PageCatError::InvalidPlan { .. }));
}

//! Batch add with per-file recovery.

use pagecat::{PageCatError, Session, SourceKind};
use tempfile::TempDir;

use crate::common::{write_corrupt_pdf, write_pdf, write_png};

#[test]
fn test_corrupt_file_does_not_block_batch() {
    let dir = TempDir::new().unwrap();
    let good1 = write_pdf(dir.path(), "good1.pdf", 2);
    let corrupt = write_corrupt_pdf(dir.path(), "corrupt.pdf");
    let good2 = write_png(dir.path(), "good2.png", 20, 20);

    let mut session = Session::default();
    let report = session
        .add_files(&[good1, corrupt.clone(), good2])
        .unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, corrupt);
    assert!(matches!(
        report.failures[0].error,
        PageCatError::SourceOpen { .. }
    ));

    let kinds: Vec<_> = session.pages().iter().map(|p| p.source_kind).collect();
    assert_eq!(kinds, vec![SourceKind::Pdf, SourceKind::Pdf, SourceKind::Image]);
    assert_eq!(session.status_line(), "3 page(s) queued");
}

#[test]
fn test_missing_and_unsupported_files() {
    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, b"text").unwrap();
    let missing = dir.path().join("missing.pdf");

    let mut session = Session::default();
    let report = session.add_files(&[notes, missing]).unwrap();

    assert!(session.is_empty());
    assert_eq!(report.sources_added, 0);
    assert!(matches!(
        report.failures[0].error,
        PageCatError::UnsupportedSource { .. }
    ));
    assert!(matches!(
        report.failures[1].error,
        PageCatError::SourceOpen { .. }
    ));
    assert!(report.failures.iter().all(|f| f.error.is_recoverable()));
}

#[test]
fn test_append_then_remove_restores_collection() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 2);
    let b = write_png(dir.path(), "b.png", 5, 5);

    let mut session = Session::default();
    session.add_files(&[a]).unwrap();
    let before = session.pages().to_vec();

    session.add_files(&[b]).unwrap();
    session.remove_at(session.len() - 1).unwrap();
    assert_eq!(session.pages(), before.as_slice());
}

//! Output page order and content.

use lopdf::Document;
use pagecat::merge::{CancellationToken, MergeExporter};
use pagecat::source::SourceCache;
use pagecat::{PageCatError, PageRef, Session};
use tempfile::TempDir;

use crate::common::{draws_image, marker, media_box, page_markers, write_pdf, write_png};

#[test]
fn test_mixed_sequence_exports_in_order() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 2);
    let b = write_png(dir.path(), "b.png", 200, 100);
    let output = dir.path().join("out.pdf");

    let mut session = Session::default();
    session.add_files(&[a, b]).unwrap();
    // [A#0, A#1, B] -> [A#1, B, A#0]
    session.move_to(0, 2).unwrap();
    let order: Vec<_> = session.pages().iter().map(|p| p.label.as_str()).collect();
    assert_eq!(order, vec!["[PDF] a.pdf - 2p", "[IMG] b.png", "[PDF] a.pdf - 1p"]);

    let report = session
        .export(&output, &CancellationToken::new(), None)
        .unwrap();
    assert_eq!(report.statistics.total_pages, 3);
    assert_eq!(report.statistics.pdf_pages, 2);
    assert_eq!(report.statistics.image_pages, 1);

    let doc = Document::load(&output).unwrap();
    assert_eq!(
        page_markers(&doc),
        vec![Some(marker("a.pdf", 1)), None, Some(marker("a.pdf", 0))]
    );

    let ids: Vec<_> = doc.get_pages().values().copied().collect();
    assert!(!draws_image(&doc, ids[0]));
    assert!(draws_image(&doc, ids[1]));
    assert_eq!(media_box(&doc, ids[1]), vec![0.0, 0.0, 144.0, 72.0]);
    // Inherited from the source page tree.
    assert_eq!(media_box(&doc, ids[0]), vec![0.0, 0.0, 595.0, 842.0]);
}

#[test]
fn test_repeated_export_is_stable() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 3);
    let b = write_png(dir.path(), "b.png", 10, 10);

    let mut session = Session::default();
    session.add_files(&[b, a]).unwrap();
    session.move_to(3, 1).unwrap();

    let first = dir.path().join("first.pdf");
    let second = dir.path().join("second.pdf");
    session.export(&first, &CancellationToken::new(), None).unwrap();
    session.export(&second, &CancellationToken::new(), None).unwrap();

    let first = Document::load(&first).unwrap();
    let second = Document::load(&second).unwrap();
    assert_eq!(first.get_pages().len(), 4);
    assert_eq!(page_markers(&first), page_markers(&second));
}

#[test]
fn test_duplicate_pages_are_independent_positions() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 1);
    let output = dir.path().join("out.pdf");

    let mut session = Session::default();
    session.add_files(&[a.clone(), a]).unwrap();
    assert_eq!(session.pages()[0], session.pages()[1]);

    session.remove_at(1).unwrap();
    assert_eq!(session.len(), 1);

    session.export(&output, &CancellationToken::new(), None).unwrap();
    let doc = Document::load(&output).unwrap();
    assert_eq!(page_markers(&doc), vec![Some(marker("a.pdf", 0))]);
}

#[test]
fn test_stale_page_reference_aborts_export() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 2);
    let output = dir.path().join("out.pdf");
    let pages = vec![PageRef::pdf(&a, 0), PageRef::pdf(&a, 1)];

    // The source lost a page after the references were taken.
    write_pdf(dir.path(), "a.pdf", 1);

    let err = MergeExporter::default()
        .export(
            &pages,
            &mut SourceCache::new(),
            &output,
            &CancellationToken::new(),
            None,
        )
        .unwrap_err();

    match err {
        PageCatError::PageIndex {
            position,
            page_index,
            page_count,
            ..
        } => assert_eq!((position, page_index, page_count), (1, 1, 1)),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
}

//! Failed and cancelled exports leave the destination alone.

use std::path::Path;

use lopdf::Document;
use pagecat::config::{ExportOptions, Metadata};
use pagecat::merge::CancellationToken;
use pagecat::merge::bookmarks::BookmarkManager;
use pagecat::merge::metadata::MetadataManager;
use pagecat::{PageCatError, Session};
use tempfile::TempDir;

use crate::common::{write_pdf, write_png, write_transparent_png};

fn leftover_temp_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .count()
}

#[test]
fn test_decode_failure_keeps_existing_output() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 1);
    let b = write_png(dir.path(), "b.png", 8, 8);
    let output = dir.path().join("out.pdf");
    std::fs::write(&output, b"previous export").unwrap();

    let mut session = Session::default();
    session.add_files(&[a, b.clone()]).unwrap();
    // Probed fine when added, unreadable by export time.
    std::fs::write(&b, b"\x89PNG\r\n\x1a\ntruncated").unwrap();

    let err = session
        .export(&output, &CancellationToken::new(), None)
        .unwrap_err();

    match err {
        PageCatError::ImageDecode { position, path, .. } => {
            assert_eq!(position, 1);
            assert!(path.ends_with("b.png"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(std::fs::read(&output).unwrap(), b"previous export");
    assert_eq!(leftover_temp_files(dir.path()), 0);
    assert_eq!(session.len(), 2);
}

#[test]
fn test_cancel_mid_export_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 5);
    let output = dir.path().join("out.pdf");

    let mut session = Session::default();
    session.add_files(&[a]).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let mut seen = Vec::new();
    let mut progress = |done: usize, total: usize| {
        seen.push((done, total));
        if done == 2 {
            trigger.cancel();
        }
    };

    let err = session
        .export(&output, &cancel, Some(&mut progress))
        .unwrap_err();
    assert!(matches!(err, PageCatError::Cancelled));
    assert_eq!(err.exit_code(), 130);
    assert_eq!(seen, vec![(1, 5), (2, 5)]);
    assert!(!output.exists());
    assert_eq!(leftover_temp_files(dir.path()), 0);
}

#[test]
fn test_unwritable_destination() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 1);
    let output = dir.path().join("missing").join("out.pdf");

    let mut session = Session::default();
    session.add_files(&[a]).unwrap();
    let err = session
        .export(&output, &CancellationToken::new(), None)
        .unwrap_err();
    assert!(matches!(err, PageCatError::ExportWrite { .. }));
    assert!(!session.is_exporting());
}

#[test]
fn test_bookmarks_and_metadata() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 2);
    let b = write_transparent_png(dir.path(), "b.png", 4, 4);
    let output = dir.path().join("out.pdf");

    let metadata = Metadata::new(Some("Bundle".into()), Some("QA".into()), None, None);
    let mut session = Session::new(ExportOptions {
        bookmarks: true,
        metadata: metadata.clone(),
        ..Default::default()
    });
    session.add_files(&[a.clone(), b, a]).unwrap();

    let report = session
        .export(&output, &CancellationToken::new(), None)
        .unwrap();
    // a.pdf x2, b.png, a.pdf x2
    assert_eq!(report.statistics.bookmarks_added, 3);
    assert_eq!(report.statistics.sources_used, 2);

    let doc = Document::load(&output).unwrap();
    assert!(BookmarkManager::new().has_bookmarks(&doc));
    let written = MetadataManager::new().get_metadata(&doc);
    assert_eq!(written.title.as_deref(), Some("Bundle"));
    assert_eq!(written.author.as_deref(), Some("QA"));
}

#[test]
fn test_non_ascii_bookmark_title() {
    let dir = TempDir::new().unwrap();
    let image = write_png(dir.path(), "보고서.png", 4, 4);
    let output = dir.path().join("out.pdf");

    let mut session = Session::new(ExportOptions {
        bookmarks: true,
        ..Default::default()
    });
    session.add_files(&[image]).unwrap();
    session
        .export(&output, &CancellationToken::new(), None)
        .unwrap();

    let doc = Document::load(&output).unwrap();
    let outline_id = doc
        .catalog()
        .unwrap()
        .get(b"Outlines")
        .unwrap()
        .as_reference()
        .unwrap();
    let first = doc
        .get_dictionary(outline_id)
        .unwrap()
        .get(b"First")
        .unwrap()
        .as_reference()
        .unwrap();
    let title = doc.get_dictionary(first).unwrap().get(b"Title").unwrap();

    assert!(title.as_str().unwrap().starts_with(b"\xFE\xFF"));
    assert_eq!(lopdf::decode_text_string(title).unwrap(), "보고서.png");
}

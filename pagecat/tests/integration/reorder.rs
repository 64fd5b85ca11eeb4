//! Reordering through the session, observed by a list view.

use pagecat::{PageCatError, Session};
use rstest::rstest;
use tempfile::TempDir;

use crate::common::write_pdf;

fn session_with_pages(dir: &TempDir, count: usize) -> Session {
    let pdf = write_pdf(dir.path(), "p.pdf", count);
    let mut session = Session::default();
    session.add_files(&[pdf]).unwrap();
    session
}

fn order(session: &Session) -> Vec<usize> {
    session
        .pages()
        .iter()
        .map(|p| p.page_index.unwrap())
        .collect()
}

#[test]
fn test_drag_commits_each_step() {
    let dir = TempDir::new().unwrap();
    let mut session = session_with_pages(&dir, 4);
    let (view, _) = session.attach_view();

    session.drag_start(0).unwrap();
    session.drag_move(1).unwrap();
    assert_eq!(order(&session), vec![1, 0, 2, 3]);
    assert_eq!(view.borrow().len(), 4);

    session.drag_move(2).unwrap();
    session.drag_end();
    assert_eq!(order(&session), vec![1, 2, 0, 3]);
    assert_eq!(view.borrow().rows()[2], "[PDF] p.pdf - 1p");
}

#[rstest]
#[case(-5, vec![0, 1, 2, 3])]
#[case(99, vec![1, 2, 3, 0])]
fn test_drag_clamps_to_collection(#[case] target: i64, #[case] expected: Vec<usize>) {
    let dir = TempDir::new().unwrap();
    let mut session = session_with_pages(&dir, 4);
    session.move_to(0, 2).unwrap();
    assert_eq!(order(&session), vec![1, 2, 0, 3]);

    session.drag_start(2).unwrap();
    session.drag_move(target).unwrap();
    session.drag_end();
    assert_eq!(order(&session), expected);
}

#[test]
fn test_move_up_and_down_at_boundaries() {
    let dir = TempDir::new().unwrap();
    let mut session = session_with_pages(&dir, 3);

    assert_eq!(session.move_up(0).unwrap(), 0);
    assert_eq!(session.move_down(2).unwrap(), 2);
    assert_eq!(order(&session), vec![0, 1, 2]);

    assert_eq!(session.move_down(0).unwrap(), 1);
    assert_eq!(session.move_up(2).unwrap(), 1);
    assert_eq!(order(&session), vec![1, 2, 0]);
}

#[test]
fn test_invalid_positions_leave_collection_unchanged() {
    let dir = TempDir::new().unwrap();
    let mut session = session_with_pages(&dir, 3);
    let (view, _) = session.attach_view();

    assert!(matches!(
        session.move_to(0, 3),
        Err(PageCatError::IndexOutOfRange { index: 3, len: 3 })
    ));
    assert!(session.remove_at(5).is_err());
    assert!(session.remove_many(&[0, 7]).is_err());
    assert!(session.drag_start(3).is_err());

    assert_eq!(order(&session), vec![0, 1, 2]);
    assert_eq!(view.borrow().len(), session.len());
}

#[test]
fn test_remove_many_keeps_survivors_in_order() {
    let dir = TempDir::new().unwrap();
    let mut session = session_with_pages(&dir, 5);
    let (view, _) = session.attach_view();

    let removed = session.remove_many(&[3, 0, 3]).unwrap();
    assert_eq!(removed.len(), 2);
    assert_eq!(order(&session), vec![1, 2, 4]);
    assert_eq!(view.borrow().len(), 3);
}

mod common;

use samu_tracker::export::export_view;
use samu_tracker::filter::FilterSelection;
use samu_tracker::match_history::GameMode;

use common::{context_from, letter_roster};

#[test]
fn writes_filtered_rows_and_summary() {
    let ctx = context_from(
        &[("2024-01-01_10-00-00", "A B"), ("2024-01-02_10-00-00", "A C")],
        letter_roster(&["A", "B", "C"]),
        GameMode::DOUBLES,
    );
    let outcome = ctx.filter(&FilterSelection::new(GameMode::DOUBLES, 100));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("view.xlsx");
    let report = export_view(&path, &outcome.rows, ctx.roster()).expect("export should succeed");

    assert_eq!(report.match_rows, 4);
    assert_eq!(report.summary_rows, 3);
    let meta = std::fs::metadata(&path).expect("workbook written");
    assert!(meta.len() > 0);
}

#[test]
fn empty_view_still_writes_headers() {
    let ctx = context_from(&[], letter_roster(&["A"]), GameMode::DOUBLES);
    let outcome = ctx.filter(&FilterSelection::new(GameMode::DOUBLES, 100));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.xlsx");
    let report = export_view(&path, &outcome.rows, ctx.roster()).unwrap();
    assert_eq!(report.match_rows, 0);
    assert_eq!(report.summary_rows, 0);
    assert!(path.exists());
}

#[test]
fn unwritable_target_is_an_error() {
    let ctx = context_from(&[("M1", "A")], letter_roster(&["A"]), GameMode::SOLO);
    let outcome = ctx.filter(&FilterSelection::new(GameMode::SOLO, 100));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("view.xlsx");
    assert!(export_view(&path, &outcome.rows, ctx.roster()).is_err());
}

//! FILENAME: tests/test_session.rs
//! PURPOSE: Session commands end to end: import, configure, edit, store.

mod common;

use app_lib::{
    card_summary, close_card, current_view, drill_down_group, edit_cell, import_rows,
    list_cards, load_card_file, load_project, remove_formula, save_active, save_project,
    select_card, set_column_format, set_filters, set_formula, set_itemize, set_output_column,
    set_sort, set_visible_columns, CommandError,
};
use common::{sample_table, TestHarness};
use engine::{CardError, ColumnFormat, EditError, FilterOperator, FilterPredicate, SortSpec};

// ============================================================================
// IMPORT
// ============================================================================

#[test]
fn test_import_normalizes_and_renders() {
    let (_harness, view) = TestHarness::with_sample_takeoff();

    assert!(view.itemize);
    assert!(!view.grouped);
    assert_eq!(view.rows.len(), 4);
    let area = view.columns.iter().find(|c| c.name == "Area").unwrap();
    assert_eq!(area.format, ColumnFormat::Number);
    assert_eq!(TestHarness::cell(&view, 0, "Area"), "12.00");
    assert_eq!(TestHarness::cell(&view, 0, "Type"), "Wall");
}

#[test]
fn test_commands_without_card_fail() {
    let harness = TestHarness::new();
    assert!(matches!(
        set_itemize(&harness.session, false),
        Err(CommandError::NoActiveCard)
    ));
    assert!(matches!(
        current_view(&harness.session),
        Err(CommandError::NoActiveCard)
    ));
}

// ============================================================================
// PIPELINE CONFIGURATION
// ============================================================================

#[test]
fn test_formula_filter_group_scenario() {
    let (harness, _) = TestHarness::with_sample_takeoff();
    let s = &harness.session;

    set_formula(s, "Labor".into(), "[Area] * 10".into()).unwrap();
    set_filters(
        s,
        vec![FilterPredicate::new("Type", FilterOperator::Equals, "wall")],
    )
    .unwrap();
    set_sort(s, Some(SortSpec::ascending("Type"))).unwrap();
    let view = set_itemize(s, false).unwrap();

    assert!(view.grouped);
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].count, 2);
    assert_eq!(view.rows[0].source_index, None);
    assert_eq!(TestHarness::cell(&view, 0, "Area"), "20.00");
    assert_eq!(TestHarness::cell(&view, 0, "Labor"), "200.00");
    assert_eq!(TestHarness::cell(&view, 0, "Level"), "<Varios>");
    assert!(view.columns.iter().any(|c| c.name == "Labor" && c.is_derived));
}

#[test]
fn test_currency_totals_and_rollups() {
    let (harness, _) = TestHarness::with_sample_takeoff();
    let s = &harness.session;

    set_column_format(s, "Cost", ColumnFormat::Currency).unwrap();
    set_output_column(s, "Cost", true).unwrap();
    let view = set_filters(
        s,
        vec![FilterPredicate::new("Level", FilterOperator::Equals, "L1")],
    )
    .unwrap();

    let total = view.totals.iter().find(|t| t.column == "Cost").unwrap();
    assert_eq!(total.display, "$1,650.00");
    assert_eq!(view.rollups[0].value, 1650.0);
    assert_eq!(view.rollups[0].display, "$1,650.00");

    let type_total = view.totals.iter().find(|t| t.column == "Type").unwrap();
    assert_eq!(type_total.display, "");
}

#[test]
fn test_rollup_ignores_sort_and_grouping() {
    let (harness, view) = TestHarness::with_sample_takeoff();
    let s = &harness.session;
    set_output_column(s, "Area", true).unwrap();
    let before = card_summary(s, &view.card_id).unwrap();

    set_sort(s, Some(SortSpec::descending("Level"))).unwrap();
    set_itemize(s, false).unwrap();
    let after = card_summary(s, &view.card_id).unwrap();

    assert_eq!(before.rollups, after.rollups);
    assert_eq!(after.rollups[0].value, 25.0);
    assert_eq!(after.row_count, 4);
}

#[test]
fn test_unknown_columns_are_rejected() {
    let (harness, _) = TestHarness::with_sample_takeoff();
    let s = &harness.session;
    assert!(matches!(
        set_sort(s, Some(SortSpec::ascending("Ghost"))),
        Err(CommandError::Card(CardError::UnknownColumn(_)))
    ));
    assert!(matches!(
        set_visible_columns(s, vec!["Type".into(), "Ghost".into()]),
        Err(CommandError::Card(CardError::UnknownColumn(_)))
    ));
    assert!(matches!(
        remove_formula(s, "Area"),
        Err(CommandError::Card(CardError::UnknownColumn(_)))
    ));
}

#[test]
fn test_visible_columns_drive_cells() {
    let (harness, _) = TestHarness::with_sample_takeoff();
    let view = set_visible_columns(&harness.session, vec!["Area".into(), "Type".into()]).unwrap();
    assert_eq!(view.rows[0].cells, ["12.00", "Wall"]);
    assert_eq!(view.totals.len(), 2);
}

// ============================================================================
// EDITING
// ============================================================================

#[test]
fn test_edit_updates_view() {
    let (harness, _) = TestHarness::with_sample_takeoff();
    let s = &harness.session;
    set_formula(s, "Labor".into(), "[Area] * 10".into()).unwrap();

    let view = edit_cell(s, 1, "Area", "9.5").unwrap();
    assert_eq!(TestHarness::cell(&view, 1, "Area"), "9.50");
    assert_eq!(TestHarness::cell(&view, 1, "Labor"), "95.00");
    assert_eq!(current_view(s).unwrap(), view);
}

#[test]
fn test_percent_column_entry() {
    let (harness, _) = TestHarness::with_sample_takeoff();
    let s = &harness.session;
    set_column_format(s, "Area", ColumnFormat::Percent).unwrap();

    for input in ["50", "50%", "0.5"] {
        let view = edit_cell(s, 0, "Area", input).unwrap();
        assert_eq!(TestHarness::cell(&view, 0, "Area"), "50.00%");
    }
}

#[test]
fn test_edit_while_grouped_is_rejected_without_changes() {
    let (harness, _) = TestHarness::with_sample_takeoff();
    let s = &harness.session;
    set_sort(s, Some(SortSpec::ascending("Type"))).unwrap();
    let grouped = set_itemize(s, false).unwrap();

    let err = edit_cell(s, 0, "Area", "100").unwrap_err();
    assert!(matches!(err, CommandError::Edit(EditError::GroupedView)));
    assert_eq!(current_view(s).unwrap(), grouped);

    let itemized = set_itemize(s, true).unwrap();
    let row = itemized
        .rows
        .iter()
        .position(|r| r.source_index == Some(0))
        .unwrap();
    assert_eq!(TestHarness::cell(&itemized, row, "Area"), "12.00");
}

#[test]
fn test_formula_columns_are_not_editable() {
    let (harness, _) = TestHarness::with_sample_takeoff();
    let s = &harness.session;
    set_formula(s, "Labor".into(), "[Area] * 10".into()).unwrap();
    assert!(matches!(
        edit_cell(s, 0, "Labor", "1"),
        Err(CommandError::Edit(EditError::DerivedColumn(_)))
    ));
}

#[test]
fn test_drill_down_lists_group_members() {
    let (harness, _) = TestHarness::with_sample_takeoff();
    let s = &harness.session;
    set_sort(s, Some(SortSpec::ascending("Type"))).unwrap();
    set_itemize(s, false).unwrap();

    let rows = drill_down_group(s, "Wall").unwrap();
    let mut indices: Vec<usize> = rows.iter().filter_map(|r| r.source_index).collect();
    indices.sort();
    assert_eq!(indices, [0, 1]);
}

#[test]
fn test_drill_down_by_numeric_group_key() {
    let (harness, _) = TestHarness::with_sample_takeoff();
    let s = &harness.session;
    edit_cell(s, 1, "Area", "12").unwrap();
    set_sort(s, Some(SortSpec::descending("Area"))).unwrap();
    let view = set_itemize(s, false).unwrap();

    assert_eq!(TestHarness::cell(&view, 0, "Area"), "12.00");
    assert_eq!(view.rows[0].count, 2);
    let key = view.rows[0].group_key.clone().unwrap();
    assert_eq!(key, "12");

    let rows = drill_down_group(s, &key).unwrap();
    let mut indices: Vec<usize> = rows.iter().filter_map(|r| r.source_index).collect();
    indices.sort();
    assert_eq!(indices, [0, 1]);
    assert!(rows.iter().all(|r| r.group_key.is_none()));
}

// ============================================================================
// CARDS AND STORAGE
// ============================================================================

#[test]
fn test_switching_and_closing_cards() {
    let (harness, first) = TestHarness::with_sample_takeoff();
    let s = &harness.session;
    let second = import_rows(s, "Puertas".into(), sample_table(), vec!["Type".into()]).unwrap();
    assert_eq!(second.columns.len(), 1);
    assert_eq!(list_cards(s).unwrap().len(), 2);

    let view = select_card(s, &first.card_id).unwrap();
    assert_eq!(view.name, "Tabiques");

    let after_close = close_card(s, &first.card_id).unwrap().unwrap();
    assert_eq!(after_close.card_id, second.card_id);
    assert!(close_card(s, &second.card_id).unwrap().is_none());
    assert!(matches!(
        select_card(s, &first.card_id),
        Err(CommandError::UnknownCard(_))
    ));
}

#[test]
fn test_save_and_reload_card_reproduces_view() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tabiques.json");

    let (harness, _) = TestHarness::with_sample_takeoff();
    let s = &harness.session;
    set_formula(s, "Labor".into(), "[Area] * 10".into()).unwrap();
    set_sort(s, Some(SortSpec::ascending("Type"))).unwrap();
    let original = set_itemize(s, false).unwrap();
    save_active(s, &path).unwrap();

    let other = TestHarness::new();
    let reloaded = load_card_file(&other.session, &path).unwrap();
    assert_eq!(reloaded, original);
}

#[test]
fn test_project_round_trip_keeps_card_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project.zip");

    let (harness, first) = TestHarness::with_sample_takeoff();
    import_rows(&harness.session, "Puertas".into(), sample_table(), Vec::new()).unwrap();
    save_project(&harness.session, &path).unwrap();

    let other = TestHarness::new();
    let active = load_project(&other.session, &path).unwrap().unwrap();
    assert_eq!(active.card_id, first.card_id);
    let names: Vec<String> = list_cards(&other.session)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, ["Tabiques", "Puertas"]);
}

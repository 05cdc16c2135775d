//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for takeoff backend integration tests.

#![allow(dead_code)]

use app_lib::{create_session, import_rows, AppConfig, CardView, TakeoffSession};
use engine::{CellValue, Row};
use persistence::RawTable;

/// Test harness for creating and managing a session.
pub struct TestHarness {
    pub session: TakeoffSession,
}

impl TestHarness {
    /// Create a new harness with no open cards.
    pub fn new() -> Self {
        TestHarness {
            session: create_session(AppConfig::default()),
        }
    }

    /// Create a harness with the wall/door takeoff open.
    pub fn with_sample_takeoff() -> (Self, CardView) {
        let harness = Self::new();
        let view = import_rows(&harness.session, "Tabiques".to_string(), sample_table(), Vec::new())
            .unwrap();
        (harness, view)
    }

    /// Index of a visible column in the current view.
    pub fn column_index(view: &CardView, name: &str) -> usize {
        view.columns.iter().position(|c| c.name == name).unwrap()
    }

    /// Display string at (row, column name) of a view.
    pub fn cell<'a>(view: &'a CardView, row: usize, column: &str) -> &'a str {
        &view.rows[row].cells[Self::column_index(view, column)]
    }
}

/// Element rows as exported by the modeling tool.
pub fn sample_table() -> RawTable {
    let elements = [
        ("Wall", "12 m2", "L1", "$1,200.00"),
        ("Wall", "8 m2", "L2", "$800.00"),
        ("Door", "3 m2", "L1", "$450.00"),
        ("Window", "2 m2", "L2", "$300.00"),
    ];
    RawTable::from_rows(
        elements
            .iter()
            .map(|(kind, area, level, cost)| {
                Row::from_iter([
                    ("Type", CellValue::text(*kind)),
                    ("Area", CellValue::text(*area)),
                    ("Level", CellValue::text(*level)),
                    ("Cost", CellValue::text(*cost)),
                ])
            })
            .collect(),
    )
}

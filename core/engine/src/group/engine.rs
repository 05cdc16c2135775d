//! FILENAME: core/engine/src/group/engine.rs
//! Group engine - collapses a row sequence into one aggregate row per key.
//!
//! Algorithm:
//! 1. Walk rows in their incoming (filtered, sorted) order
//! 2. The first row of each key seeds an aggregate: numeric cells start at 0,
//!    anything else is copied
//! 3. Every row, the first included, is merged into its aggregate:
//!    numbers add, blanks next to numbers are skipped whichever comes first,
//!    disagreeing text becomes `<Varios>` and stays that way
//! 4. Aggregates come out in first-appearance order of their key

use log::debug;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::cell::CellValue;
use crate::group::definition::{GroupDefinition, EMPTY_GROUP_LABEL, VARIES_LABEL};
use crate::row::{IndexedRow, Row};

// ============================================================================
// GROUP ROW
// ============================================================================

/// One aggregate row of a grouped view.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    /// Identity of the group (display text of the key, or the empty label).
    pub key: String,
    /// Aggregated cells, keyed by the definition's output columns.
    pub row: Row,
    /// Number of source rows merged into this aggregate.
    pub count: usize,
    /// Source indices of the merged rows, in merge order.
    pub members: SmallVec<[usize; 8]>,
}

impl GroupRow {
    fn seed(key: String, first: &Row, definition: &GroupDefinition) -> Self {
        let mut row = Row::with_capacity(definition.columns.len() + 1);
        for column in definition.output_columns() {
            if column == definition.key_field {
                let key_cell = first.value(column);
                let key_cell = if key_cell.is_empty() {
                    CellValue::text(EMPTY_GROUP_LABEL)
                } else {
                    key_cell.clone()
                };
                row.set(column, key_cell);
                continue;
            }

            let seeded = match first.value(column) {
                CellValue::Number(_) => CellValue::Number(0.0),
                other => other.clone(),
            };
            row.set(column, seeded);
        }

        GroupRow {
            key,
            row,
            count: 0,
            members: SmallVec::new(),
        }
    }

    fn merge(&mut self, source_index: usize, source: &Row, definition: &GroupDefinition) {
        for column in definition.output_columns() {
            if column == definition.key_field {
                continue;
            }
            if let Some(slot) = self.row.get_mut(column) {
                merge_cell(slot, source.value(column));
            }
        }
        self.count += 1;
        self.members.push(source_index);
    }
}

fn merge_cell(slot: &mut CellValue, incoming: &CellValue) {
    let merged = match (&*slot, incoming) {
        (CellValue::Number(a), CellValue::Number(b)) => Some(CellValue::Number(a + b)),
        (CellValue::Text(s), _) if s == VARIES_LABEL => None,
        (CellValue::Number(_), v) if v.is_empty() => None,
        (current, CellValue::Number(b)) if current.is_empty() => Some(CellValue::Number(*b)),
        (current, v) if current.is_empty() && v.is_empty() => None,
        (current, v) if current == v => None,
        _ => Some(CellValue::text(VARIES_LABEL)),
    };
    if let Some(value) = merged {
        *slot = value;
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Group identity of a key cell. Missing or blank keys share the empty label.
pub fn group_key(value: &CellValue) -> String {
    if value.is_empty() {
        EMPTY_GROUP_LABEL.to_string()
    } else {
        value.display_text()
    }
}

/// Collapses `rows` into one aggregate per distinct key value.
pub fn group_rows(rows: &[IndexedRow], definition: &GroupDefinition) -> Vec<GroupRow> {
    let mut groups: Vec<GroupRow> = Vec::new();
    let mut index_by_key: FxHashMap<String, usize> = FxHashMap::default();

    for indexed in rows {
        let key = group_key(indexed.row.value(&definition.key_field));
        let slot = match index_by_key.get(&key) {
            Some(&i) => i,
            None => {
                groups.push(GroupRow::seed(key.clone(), &indexed.row, definition));
                index_by_key.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].merge(indexed.source_index, &indexed.row, definition);
    }

    debug!(
        target: "GROUP",
        "grouped {} rows by '{}' into {} groups",
        rows.len(),
        definition.key_field,
        groups.len()
    );
    groups
}

/// The source rows behind one aggregate, in their incoming order.
pub fn drill_down(rows: &[IndexedRow], definition: &GroupDefinition, key: &str) -> Vec<IndexedRow> {
    rows.iter()
        .filter(|r| group_key(r.row.value(&definition.key_field)) == key)
        .cloned()
        .collect()
}

//! FILENAME: core/persistence/src/json_reader.rs
//! PURPOSE: Reads raw element rows from a JSON export.
//! CONTEXT: The export is an array of flat objects whose key sets may differ.
//! Key order is kept. Numbers and strings map directly; null is an empty cell;
//! booleans and nested values are kept as their JSON text.

use std::fmt;
use std::fs;
use std::path::Path;

use engine::{CellValue, Row};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{PersistenceError, RawTable};

struct RawRecord(Row);

struct RawRecordVisitor;

impl<'de> Visitor<'de> for RawRecordVisitor {
    type Value = RawRecord;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a flat object of column values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawRecord, A::Error> {
        let mut row = Row::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((column, value)) = map.next_entry::<String, Value>()? {
            row.set(column, json_to_cell(value));
        }
        Ok(RawRecord(row))
    }
}

impl<'de> Deserialize<'de> for RawRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawRecordVisitor)
    }
}

fn json_to_cell(value: Value) -> CellValue {
    match value {
        Value::Null => CellValue::Empty,
        Value::Number(n) => n.as_f64().map_or(CellValue::Empty, CellValue::Number),
        Value::String(s) => CellValue::Text(s),
        other => CellValue::Text(other.to_string()),
    }
}

/// Parses a JSON array of flat objects.
pub fn rows_from_json(json: &str) -> Result<RawTable, PersistenceError> {
    let records: Vec<RawRecord> = serde_json::from_str(json)?;
    Ok(RawTable::from_rows(records.into_iter().map(|r| r.0).collect()))
}

pub fn load_json_rows(path: &Path) -> Result<RawTable, PersistenceError> {
    let json = fs::read_to_string(path)?;
    rows_from_json(&json)
}

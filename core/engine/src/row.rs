//! FILENAME: core/engine/src/row.rs
//! PURPOSE: Ordered column-name -> value mapping for one table element.
//! CONTEXT: Rows of one dataset need not share the same column set. Column
//! order follows insertion so exports keep their original layout, and a row
//! serializes as a plain JSON object in that order.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::cell::CellValue;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// One element row. Lookups are linear; element tables are narrow.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    entries: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Row {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Row {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Missing columns read as `Empty`.
    pub fn value(&self, column: &str) -> &CellValue {
        self.get(column).unwrap_or(&EMPTY_CELL)
    }

    pub fn get_mut(&mut self, column: &str) -> Option<&mut CellValue> {
        self.entries
            .iter_mut()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Replaces the value in place (keeping its position) or appends a new column.
    pub fn set(&mut self, column: impl Into<String>, value: CellValue) {
        let column = column.into();
        match self.get_mut(&column) {
            Some(slot) => *slot = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn remove(&mut self, column: &str) -> Option<CellValue> {
        let idx = self.entries.iter().position(|(name, _)| name == column)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.set(name, value.into());
        }
        row
    }
}

/// A row together with its position in the card's source row set, so edits
/// made on a filtered or sorted view land on the right element.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedRow {
    pub source_index: usize,
    pub row: Row,
}

impl IndexedRow {
    pub fn new(source_index: usize, row: Row) -> Self {
        IndexedRow { source_index, row }
    }

    /// Numbers every row by its position.
    pub fn enumerate(rows: &[Row]) -> Vec<IndexedRow> {
        rows.iter()
            .cloned()
            .enumerate()
            .map(|(i, row)| IndexedRow::new(i, row))
            .collect()
    }
}

/// Distinct column names across `rows`, in first-appearance order.
pub fn discover_columns(rows: &[Row]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for name in row.columns() {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }
    }
    columns
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct RowVisitor;

impl<'de> Visitor<'de> for RowVisitor {
    type Value = Row;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "an object mapping column names to numbers, strings or null")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Row, A::Error> {
        let mut row = Row::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((name, value)) = access.next_entry::<String, CellValue>()? {
            row.set(name, value);
        }
        Ok(row)
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RowVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_keeps_position_and_appends_new_columns() {
        let mut row: Row = [("Tipo", CellValue::text("Muro")), ("Area", 12.0.into())]
            .into_iter()
            .collect();
        row.set("Tipo", CellValue::text("Puerta"));
        row.set("Costo", 120.0.into());

        let cols: Vec<&str> = row.columns().collect();
        assert_eq!(cols, vec!["Tipo", "Area", "Costo"]);
        assert_eq!(row.value("Tipo"), &CellValue::text("Puerta"));
        assert_eq!(row.value("Nada"), &CellValue::Empty);
    }

    #[test]
    fn column_names_are_case_sensitive() {
        let row: Row = [("Area", 1.0)].into_iter().collect();
        assert!(row.get("Area").is_some());
        assert!(row.get("area").is_none());
    }

    #[test]
    fn discovers_columns_in_first_appearance_order() {
        let rows = vec![
            [("A", 1.0), ("B", 2.0)].into_iter().collect::<Row>(),
            [("C", 3.0), ("A", 4.0)].into_iter().collect::<Row>(),
        ];
        assert_eq!(discover_columns(&rows), vec!["A", "B", "C"]);
    }

    #[test]
    fn json_object_order_survives_round_trip() {
        let json = r#"{"Zona":"Norte","Area":12.5,"Nota":null}"#;
        let row: Row = serde_json::from_str(json).unwrap();
        let cols: Vec<&str> = row.columns().collect();
        assert_eq!(cols, vec!["Zona", "Area", "Nota"]);
        assert_eq!(serde_json::to_string(&row).unwrap(), json);
    }
}

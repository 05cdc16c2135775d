//! FILENAME: core/persistence/src/xlsx_reader.rs
//! PURPOSE: Reads raw element rows from a worksheet export.
//! CONTEXT: The first row is the header. Blank header cells become "Column N"
//! and repeated names get a numeric suffix so column names stay unique.

use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use engine::{CellValue, Row};
use log::info;

use crate::{PersistenceError, RawTable};

fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::Error(e) => CellValue::Text(format!("{:?}", e)),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn header_names(header: &[Data]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(header.len());
    for (i, cell) in header.iter().enumerate() {
        let base = match data_to_cell(cell) {
            v if v.is_empty() => format!("Column {}", i + 1),
            v => v.display_text().trim().to_string(),
        };
        let mut name = base.clone();
        let mut n = 2;
        while names.contains(&name) {
            name = format!("{} ({})", base, n);
            n += 1;
        }
        names.push(name);
    }
    names
}

/// Loads `sheet` (or the first sheet) of an XLSX file as a raw table.
pub fn load_xlsx_rows(path: &Path, sheet: Option<&str>) -> Result<RawTable, PersistenceError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_names = workbook.sheet_names().to_vec();

    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| PersistenceError::SheetNotFound(name.to_string()))?,
        None => sheet_names.first().cloned().ok_or_else(|| {
            PersistenceError::InvalidFormat("Workbook contains no sheets".to_string())
        })?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut lines = range.rows();
    let Some(header) = lines.next() else {
        return Ok(RawTable::default());
    };
    let columns = header_names(header);

    let rows: Vec<Row> = lines
        .filter(|line| line.iter().any(|d| !matches!(d, Data::Empty)))
        .map(|line| {
            let mut row = Row::with_capacity(columns.len());
            for (name, data) in columns.iter().zip(line) {
                let value = data_to_cell(data);
                if !matches!(value, CellValue::Empty) {
                    row.set(name.clone(), value);
                }
            }
            row
        })
        .collect();

    info!(
        target: "PERSIST",
        "read {} rows from sheet '{}' of {}",
        rows.len(),
        sheet_name,
        path.display()
    );
    Ok(RawTable { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_fill_blanks_and_dedupe() {
        let header = vec![
            Data::String("Type".into()),
            Data::Empty,
            Data::String("Type".into()),
            Data::Float(2024.0),
        ];
        assert_eq!(
            header_names(&header),
            ["Type", "Column 2", "Type (2)", "2024"]
        );
    }

    #[test]
    fn data_maps_to_cells() {
        assert_eq!(data_to_cell(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(data_to_cell(&Data::Bool(true)), CellValue::text("true"));
        assert_eq!(data_to_cell(&Data::Empty), CellValue::Empty);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_xlsx_rows(&dir.path().join("nope.xlsx"), None).is_err());
    }
}

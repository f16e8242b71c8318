//! Spreadsheet reading.

use std::collections::HashSet;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use polars::prelude::{Column, DataFrame};

use crate::error::{IngestError, Result};

/// Reads the first worksheet of a workbook, using its first row as header.
///
/// Blank header cells become `Unnamed: <index>`; repeated names get a
/// `.<n>` suffix. Empty and error cells are nulls.
pub fn read_xlsx(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let spreadsheet_error = |message: String| IngestError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| spreadsheet_error("workbook has no worksheets".to_string()))?
        .map_err(|e| spreadsheet_error(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Err(spreadsheet_error("first worksheet is empty".to_string()));
    };
    let names = header_names(header);
    let body: Vec<&[Data]> = rows.collect();

    let columns = names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| row.get(idx).unwrap_or(&Data::Empty))
                .collect();
            build_column(name, &cells)
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

fn header_names(header: &[Data]) -> Vec<String> {
    let mut seen = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let base = match cell_text(cell) {
                Some(text) if !text.trim().is_empty() => text,
                _ => format!("Unnamed: {idx}"),
            };
            let mut name = base.clone();
            let mut n = 1;
            while !seen.insert(name.clone()) {
                name = format!("{base}.{n}");
                n += 1;
            }
            name
        })
        .collect()
}

/// Display form of a cell, or `None` for empty and error cells.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Bool(b) => Some(b.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(f.to_string()),
        Data::DateTime(dt) => Some(match dt.as_datetime() {
            Some(datetime) => datetime.to_string(),
            None => dt.as_f64().to_string(),
        }),
    }
}

fn whole_number(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(i) => Some(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Some(*f as i64),
        _ => None,
    }
}

fn number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        _ => None,
    }
}

fn is_blank(cell: &Data) -> bool {
    matches!(cell, Data::Empty | Data::Error(_))
}

/// Booleans, then whole numbers, then numbers, otherwise text.
fn build_column(name: &str, cells: &[&Data]) -> Column {
    let name = name.into();
    let filled: Vec<&Data> = cells.iter().copied().filter(|c| !is_blank(c)).collect();

    if !filled.is_empty() && filled.iter().all(|c| matches!(c, Data::Bool(_))) {
        let data: Vec<Option<bool>> = cells
            .iter()
            .map(|c| match c {
                Data::Bool(b) => Some(*b),
                _ => None,
            })
            .collect();
        return Column::new(name, data);
    }
    if !filled.is_empty() && filled.iter().all(|c| whole_number(c).is_some()) {
        let data: Vec<Option<i64>> = cells.iter().map(|c| whole_number(c)).collect();
        return Column::new(name, data);
    }
    if !filled.is_empty() && filled.iter().all(|c| number(c).is_some()) {
        let data: Vec<Option<f64>> = cells.iter().map(|c| number(c)).collect();
        return Column::new(name, data);
    }
    let data: Vec<Option<String>> = cells.iter().map(|c| cell_text(c)).collect();
    Column::new(name, data)
}

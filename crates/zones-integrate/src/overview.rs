//! Duplication overview of a relation.

use std::collections::HashSet;

use polars::prelude::{DataFrame, PolarsResult};
use serde::Serialize;

use crate::dedupe::first_occurrences;
use crate::frame::cell_key;

/// Counts of duplicate rows and duplicate columns in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DuplicationOverview {
    pub rows: usize,
    /// Rows equal to an earlier row.
    pub duplicate_rows: usize,
    pub columns: usize,
    /// Columns whose dtype and values equal an earlier column's.
    pub duplicate_columns: usize,
}

impl DuplicationOverview {
    pub fn duplicate_row_pct(&self) -> f64 {
        percentage(self.duplicate_rows, self.rows)
    }

    pub fn duplicate_column_pct(&self) -> f64 {
        percentage(self.duplicate_columns, self.columns)
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

pub fn duplication_overview(df: &DataFrame) -> PolarsResult<DuplicationOverview> {
    let duplicate_rows = first_occurrences(df)?.iter().filter(|k| !**k).count();

    let mut seen = HashSet::new();
    let mut duplicate_columns = 0;
    for column in df.get_columns() {
        let values = (0..column.len())
            .map(|idx| column.get(idx).map(cell_key))
            .collect::<PolarsResult<Vec<_>>>()?;
        if !seen.insert((column.dtype().to_string(), values)) {
            duplicate_columns += 1;
        }
    }

    Ok(DuplicationOverview {
        rows: df.height(),
        duplicate_rows,
        columns: df.width(),
        duplicate_columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn counts_duplicate_rows_and_columns() {
        let df = df! {
            "country" => ["Chile", "Chile", "Peru", "Chile"],
            "alias" => ["Chile", "Chile", "Peru", "Chile"],
            "year" => [2019i64, 2019, 2019, 2020],
            "code" => ["2019", "2019", "2019", "2020"],
        }
        .unwrap();

        let overview = duplication_overview(&df).unwrap();

        assert_eq!(
            overview,
            DuplicationOverview {
                rows: 4,
                duplicate_rows: 1,
                columns: 4,
                duplicate_columns: 1,
            }
        );
        assert!((overview.duplicate_row_pct() - 25.0).abs() < 1e-9);
        assert!((overview.duplicate_column_pct() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn empty_frame_has_zero_shares() {
        let overview = duplication_overview(&DataFrame::empty()).unwrap();
        assert_eq!(overview.duplicate_row_pct(), 0.0);
        assert_eq!(overview.duplicate_column_pct(), 0.0);
    }
}

use std::collections::HashSet;

use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray, PolarsResult};

use crate::frame::cell_key;

/// Row keys of `df`, one `Vec` of cell keys per row.
pub(crate) fn row_keys(df: &DataFrame) -> PolarsResult<Vec<Vec<Option<String>>>> {
    let columns = df.get_columns();
    (0..df.height())
        .map(|idx| {
            columns
                .iter()
                .map(|column| column.get(idx).map(cell_key))
                .collect::<PolarsResult<Vec<_>>>()
        })
        .collect()
}

/// Which rows are the first occurrence of their full-row value.
pub(crate) fn first_occurrences(df: &DataFrame) -> PolarsResult<Vec<bool>> {
    let mut seen = HashSet::new();
    Ok(row_keys(df)?
        .into_iter()
        .map(|key| seen.insert(key))
        .collect())
}

/// Removes exact full-row duplicates, keeping the first occurrence.
///
/// Nulls compare equal to nulls. Returns the number of rows removed.
pub fn drop_duplicate_rows(df: &mut DataFrame) -> PolarsResult<usize> {
    if df.height() == 0 {
        return Ok(0);
    }
    let keep = first_occurrences(df)?;
    let removed = keep.iter().filter(|k| !**k).count();
    if removed > 0 {
        let mask = BooleanChunked::from_slice("dedupe".into(), &keep);
        *df = df.filter(&mask)?;
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn keeps_first_of_each_row() {
        let mut df = df! {
            "country" => [Some("Chile"), Some("Peru"), Some("Chile"), None, None],
            "year" => [2019i64, 2019, 2019, 2020, 2020],
        }
        .unwrap();

        let removed = drop_duplicate_rows(&mut df).unwrap();

        assert_eq!(removed, 2);
        let expected = df! {
            "country" => [Some("Chile"), Some("Peru"), None],
            "year" => [2019i64, 2019, 2020],
        }
        .unwrap();
        assert!(df.equals_missing(&expected));
    }

    #[test]
    fn rows_differing_in_one_cell_are_kept() {
        let mut df = df! {
            "country" => ["Chile", "Chile"],
            "gdp" => [Some(1.5f64), None],
        }
        .unwrap();
        assert_eq!(drop_duplicate_rows(&mut df).unwrap(), 0);
        assert_eq!(df.height(), 2);
    }
}

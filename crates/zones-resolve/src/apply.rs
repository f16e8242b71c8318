//! Using a resolution on a join-key column.

use std::collections::HashSet;

use polars::prelude::{Column, DataFrame, DataType};

use crate::error::{ResolveError, Result};
use crate::resolver::ResolutionMapping;

fn string_values(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    let col = df.column(column).map_err(|_| ResolveError::ColumnNotFound {
        column: column.to_string(),
    })?;
    if !matches!(col.dtype(), DataType::String | DataType::Null) {
        return Err(ResolveError::NotText {
            column: column.to_string(),
            dtype: col.dtype().to_string(),
        });
    }
    let casted = col.cast(&DataType::String)?;
    Ok(casted
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Non-null values of a text column in first-appearance order, without repeats.
pub fn distinct_labels(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    Ok(string_values(df, column)?
        .into_iter()
        .flatten()
        .filter(|label| seen.insert(label.clone()))
        .collect())
}

/// Replaces each value of `column` that the mapping resolves.
///
/// Unresolved values and nulls are kept. Returns how many cells changed.
pub fn rewrite_column(
    df: &mut DataFrame,
    column: &str,
    mapping: &ResolutionMapping,
) -> Result<usize> {
    let lookup = mapping.to_map();
    let mut changed = 0;
    let rewritten: Vec<Option<String>> = string_values(df, column)?
        .into_iter()
        .map(|value| {
            value.map(|label| match lookup.get(&label) {
                Some(resolved) => {
                    if *resolved != label {
                        changed += 1;
                    }
                    resolved.clone()
                }
                None => label,
            })
        })
        .collect();
    df.with_column(Column::new(column.into(), rewritten))?;
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve;
    use polars::prelude::*;

    #[test]
    fn distinct_labels_keep_first_appearance() {
        let df = df! {
            "country" => [Some("Peru"), Some("Chile"), None, Some("Peru")],
        }
        .unwrap();
        assert_eq!(distinct_labels(&df, "country").unwrap(), ["Peru", "Chile"]);
    }

    #[test]
    fn non_text_and_missing_columns_are_rejected() {
        let df = df! { "year" => [2020i64] }.unwrap();
        assert!(matches!(
            distinct_labels(&df, "year"),
            Err(ResolveError::NotText { .. })
        ));
        assert!(matches!(
            distinct_labels(&df, "country"),
            Err(ResolveError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn rewrite_replaces_only_resolved_values() {
        let mut df = df! {
            "country" => [Some("Korea"), None, Some("Narnia"), Some("Korea")],
            "year" => [2019i64, 2019, 2020, 2020],
        }
        .unwrap();
        let mapping = resolve(&["Korea"], &["South Korea"]);

        let changed = rewrite_column(&mut df, "country", &mapping).unwrap();

        assert_eq!(changed, 2);
        let expected = df! {
            "country" => [Some("South Korea"), None, Some("Narnia"), Some("South Korea")],
            "year" => [2019i64, 2019, 2020, 2020],
        }
        .unwrap();
        assert!(df.equals_missing(&expected));
    }
}

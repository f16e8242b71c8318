//! Frame alignment and value keys.

use polars::prelude::{AnyValue, Column, DataFrame, DataType, PolarsResult};

/// Comparable form of a cell. Nulls are `None` so they equal each other.
pub fn cell_key(value: AnyValue<'_>) -> Option<String> {
    match value {
        AnyValue::Null => None,
        AnyValue::String(s) => Some(s.to_string()),
        AnyValue::StringOwned(s) => Some(s.to_string()),
        other => Some(other.to_string()),
    }
}

/// The union schema of `frames`: names in first-seen order.
///
/// Only columns holding at least one value vote on a dtype, so a column
/// that is empty in one version (often read back as `String`) takes the
/// dtype of the versions that filled it. Disagreeing votes widen through
/// [`widen`].
pub fn union_schema(frames: &[DataFrame]) -> Vec<(String, DataType)> {
    // (name, dtype, whether a column with values has decided the dtype)
    let mut schema: Vec<(String, DataType, bool)> = Vec::new();
    for frame in frames {
        for column in frame.get_columns() {
            let name = column.name().as_str();
            let dtype = column.dtype();
            let has_values = *dtype != DataType::Null && column.null_count() < column.len();
            match schema.iter_mut().find(|(n, _, _)| n == name) {
                None => schema.push((name.to_string(), dtype.clone(), has_values)),
                Some((_, existing, false)) if !has_values && *existing == DataType::Null => {
                    *existing = dtype.clone();
                }
                Some(_) if !has_values => {}
                Some((_, existing, decided)) if !*decided => {
                    *existing = dtype.clone();
                    *decided = true;
                }
                Some((_, existing, _)) if existing != dtype => *existing = widen(existing, dtype),
                Some(_) => {}
            }
        }
    }
    schema
        .into_iter()
        .map(|(name, dtype, _)| (name, dtype))
        .collect()
}

/// The narrowest dtype both `a` and `b` cast into without losing values:
/// integers meet at `Int64`, integers and floats at `Float64`, anything
/// else at `String`.
pub fn widen(a: &DataType, b: &DataType) -> DataType {
    let numeric = |d: &DataType| d.is_integer() || d.is_float();
    if a == b {
        a.clone()
    } else if a.is_integer() && b.is_integer() {
        DataType::Int64
    } else if numeric(a) && numeric(b) {
        DataType::Float64
    } else {
        DataType::String
    }
}

/// Stacks `frames` vertically on their union schema.
///
/// A frame lacking a column contributes nulls for it. Returns `None` when
/// `frames` is empty.
pub fn concat_aligned(frames: &[DataFrame]) -> PolarsResult<Option<DataFrame>> {
    let schema = union_schema(frames);
    let mut stacked: Option<DataFrame> = None;
    for frame in frames {
        let aligned = align(frame, &schema)?;
        match stacked.as_mut() {
            Some(out) => {
                out.vstack_mut(&aligned)?;
            }
            None => stacked = Some(aligned),
        }
    }
    Ok(stacked)
}

fn align(frame: &DataFrame, schema: &[(String, DataType)]) -> PolarsResult<DataFrame> {
    let height = frame.height();
    let columns = schema
        .iter()
        .map(|(name, dtype)| match frame.column(name) {
            Ok(column) if column.dtype() == dtype => Ok(column.clone()),
            Ok(column) => column.cast(dtype),
            Err(_) => Ok(Column::full_null(name.as_str().into(), height, dtype)),
        })
        .collect::<PolarsResult<Vec<_>>>()?;
    DataFrame::new(columns)
}

//! Polars DataFrame conversion.

use std::path::Path;

use polars::prelude::{Column, DataFrame, DataType, PlSmallStr, PolarsResult, TimeUnit};

use crate::dates::unix_millis;
use crate::error::Result;
use crate::reader::read_dta;
use crate::types::{DtaDataset, DtaValue, ValueLabels};

/// Read a `.dta` file straight into a DataFrame.
pub fn read_dta_to_dataframe(path: &Path) -> Result<DataFrame> {
    let dataset = read_dta(path)?;
    dataset_to_dataframe(&dataset)
}

/// Convert a decoded dataset to a DataFrame.
///
/// Integer storage types become `Int64`, float types `Float64` and string
/// types `String`. Stata missing values become nulls. A numeric variable
/// with a stored value label table becomes a `String` column of label
/// texts (codes without a label keep their number). `%td`-style formats
/// become `Date` and `%tc`/`%tC` become millisecond `Datetime`.
pub fn dataset_to_dataframe(dataset: &DtaDataset) -> Result<DataFrame> {
    let columns = dataset
        .variables
        .iter()
        .enumerate()
        .map(|(idx, variable)| {
            let name: PlSmallStr = variable.name.as_str().into();
            let values = dataset.column_values(idx);
            if variable.kind.is_string() {
                let data: Vec<Option<String>> = values
                    .map(|v| match v {
                        DtaValue::Text(s) => Some(s.clone()),
                        _ => None,
                    })
                    .collect();
                return Ok(Column::new(name, data));
            }
            if let Some(labels) = dataset.labels_of(idx) {
                let data: Vec<Option<String>> =
                    values.map(|v| labelled_text(v, labels)).collect();
                return Ok(Column::new(name, data));
            }
            match variable.date_format() {
                Some(format) if format.is_clock() => {
                    let data: Vec<Option<i64>> = values
                        .map(|v| whole_number(v).and_then(unix_millis))
                        .collect();
                    Column::new(name, data)
                        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
                }
                Some(format) => {
                    let data: Vec<Option<i32>> = values
                        .map(|v| {
                            whole_number(v)
                                .and_then(|n| format.unix_days(n))
                                .and_then(|d| i32::try_from(d).ok())
                        })
                        .collect();
                    Column::new(name, data).cast(&DataType::Date)
                }
                None if variable.kind.is_integer() => {
                    let data: Vec<Option<i64>> = values
                        .map(|v| match v {
                            DtaValue::Int(i) => Some(*i),
                            _ => None,
                        })
                        .collect();
                    Ok(Column::new(name, data))
                }
                None => {
                    let data: Vec<Option<f64>> = values
                        .map(|v| match v {
                            DtaValue::Float(f) => Some(*f),
                            DtaValue::Int(i) => Some(*i as f64),
                            _ => None,
                        })
                        .collect();
                    Ok(Column::new(name, data))
                }
            }
        })
        .collect::<PolarsResult<Vec<_>>>()?;

    Ok(DataFrame::new(columns)?)
}

fn labelled_text(value: &DtaValue, labels: &ValueLabels) -> Option<String> {
    if let Some(text) = value.label_code().and_then(|code| labels.get(&code)) {
        return Some(text.clone());
    }
    match value {
        DtaValue::Int(i) => Some(i.to_string()),
        DtaValue::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

/// Date values are counts; fractional clock values are floored.
fn whole_number(value: &DtaValue) -> Option<i64> {
    match value {
        DtaValue::Int(i) => Some(*i),
        DtaValue::Float(f) if f.is_finite() => Some(f.floor() as i64),
        _ => None,
    }
}

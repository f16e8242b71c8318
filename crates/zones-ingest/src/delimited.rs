//! Delimited text reading with a lenient fallback.

use std::io::Cursor;
use std::path::Path;

use polars::prelude::*;
use tracing::warn;

use crate::error::{IngestError, Result};

/// A parsed CSV file and the number of malformed rows left out.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub frame: DataFrame,
    pub dropped_rows: usize,
}

/// Reads a CSV file with a header row, inferring column types from all rows.
///
/// A strict parse is tried first. If it fails, the file is re-read once
/// dropping rows that have more fields than the header or are not valid
/// UTF-8. Short rows are padded with nulls either way.
pub fn read_csv(path: &Path) -> Result<CsvTable> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match read_strict(path) {
        Ok(frame) => Ok(CsvTable {
            frame,
            dropped_rows: 0,
        }),
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "strict CSV parse failed; re-reading and dropping malformed rows"
            );
            read_lenient(path)
        }
    }
}

fn read_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
}

fn read_strict(path: &Path) -> PolarsResult<DataFrame> {
    read_options()
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

fn read_lenient(path: &Path) -> Result<CsvTable> {
    let parse_error = |message: String| IngestError::CsvParse {
        path: path.to_path_buf(),
        message,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| parse_error(e.to_string()))?;
    let headers = reader
        .headers()
        .map_err(|e| parse_error(e.to_string()))?
        .clone();
    let width = headers.len();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&headers)
        .map_err(|e| parse_error(e.to_string()))?;

    let mut dropped_rows = 0;
    for record in reader.records() {
        match record {
            Ok(mut record) if record.len() <= width => {
                while record.len() < width {
                    record.push_field("");
                }
                writer
                    .write_record(&record)
                    .map_err(|e| parse_error(e.to_string()))?;
            }
            Err(err) if err.is_io_error() => return Err(parse_error(err.to_string())),
            _ => dropped_rows += 1,
        }
    }

    let buffer = writer
        .into_inner()
        .map_err(|e| parse_error(e.to_string()))?;
    let frame = read_options()
        .into_reader_with_file_handle(Cursor::new(buffer))
        .finish()
        .map_err(|e| parse_error(e.to_string()))?;

    Ok(CsvTable {
        frame,
        dropped_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_well_formed_file_reads_strictly() {
        let file = create_temp_csv(b"country,year,gdp\nChile,2019,1.5\nPeru,2020,\n");
        let table = read_csv(file.path()).unwrap();

        assert_eq!(table.dropped_rows, 0);
        assert_eq!(table.frame.shape(), (2, 3));
        assert_eq!(table.frame.column("year").unwrap().dtype(), &DataType::Int64);
        assert_eq!(table.frame.column("gdp").unwrap().null_count(), 1);
    }

    #[test]
    fn test_rows_with_extra_fields_are_dropped() {
        let file = create_temp_csv(b"country,year\nChile,2019\nPeru,2020,oops,more\nBolivia,2021\n");
        let table = read_csv(file.path()).unwrap();

        assert_eq!(table.dropped_rows, 1);
        assert_eq!(table.frame.height(), 2);
        let countries: Vec<_> = table
            .frame
            .column("country")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(countries, [Some("Chile"), Some("Bolivia")]);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_lenient_fallback_warns_with_the_file() {
        let file = create_temp_csv(b"country,year\nChile,2019\nPeru,2020,oops\n");
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();

        let table = tracing::subscriber::with_default(subscriber, || read_csv(file.path()).unwrap());

        assert_eq!(table.dropped_rows, 1);
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains(&file.path().display().to_string()), "{output}");
    }

    #[test]
    fn test_undecodable_rows_are_dropped() {
        let file = create_temp_csv(b"country,year\nChile,2019\nP\xffru,2020\n");
        let table = read_csv(file.path()).unwrap();

        assert_eq!(table.dropped_rows, 1);
        assert_eq!(table.frame.height(), 1);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_csv(&dir.path().join("absent.csv"));
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }
}

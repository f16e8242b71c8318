//! SQLite adapter.

use std::thread;
use std::time::Duration;

use polars::prelude::{AnyValue, Column, DataFrame, DataType};
use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::store::{BulkWriter, RelationStore};
use crate::url::StoreUrl;

/// A relational store backed by one SQLite connection.
pub struct SqliteStore {
    conn: Connection,
    url: StoreUrl,
}

impl SqliteStore {
    /// Open the store at `url` (`sqlite://<path>` or `sqlite::memory:`).
    pub fn open(url: &str) -> Result<Self> {
        Self::open_url(url.parse()?)
    }

    pub fn open_url(url: StoreUrl) -> Result<Self> {
        let conn = match &url {
            StoreUrl::SqliteMemory => Connection::open_in_memory(),
            StoreUrl::SqliteFile(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
                Connection::open(path).and_then(|conn| {
                    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
                    Ok(conn)
                })
            }
        }
        .map_err(|source| StoreError::Connect {
            url: url.to_string(),
            source,
        })?;
        debug!(url = %url, "store connection opened");
        Ok(Self { conn, url })
    }

    /// Open the store, retrying up to `attempts` times with a fixed pause.
    ///
    /// An unparseable URL fails immediately.
    pub fn connect_with_retry(url: &str, attempts: u32, backoff: Duration) -> Result<Self> {
        let parsed: StoreUrl = url.parse()?;
        let attempts = attempts.max(1);
        let mut attempt = 1;
        loop {
            match Self::open_url(parsed.clone()) {
                Ok(store) => return Ok(store),
                Err(error) if attempt < attempts => {
                    warn!(
                        url = %parsed,
                        attempt,
                        attempts,
                        error = %error,
                        "store connection failed; retrying"
                    );
                    thread::sleep(backoff);
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    pub fn url(&self) -> &StoreUrl {
        &self.url
    }

    /// Close the connection, surfacing any error SQLite reports.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, source)| StoreError::Catalog(source))
    }

    /// `(name, declared type)` per column, in table order.
    fn table_info(&self, name: &str) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(name)))
            .map_err(StoreError::sql(name))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))
            .map_err(StoreError::sql(name))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::sql(name))
    }
}

impl RelationStore for SqliteStore {
    fn relation_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    fn has_relation(&self, name: &str) -> Result<bool> {
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
        Ok(stmt.exists(params![name])?)
    }

    fn read_relation(&self, name: &str) -> Result<DataFrame> {
        if !self.has_relation(name)? {
            return Err(StoreError::RelationNotFound {
                relation: name.to_string(),
            });
        }
        let declared = self.table_info(name)?;

        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {}", quote_ident(name)))
            .map_err(StoreError::sql(name))?;
        let mut cells: Vec<Vec<Value>> = vec![Vec::new(); declared.len()];
        let mut rows = stmt.query([]).map_err(StoreError::sql(name))?;
        while let Some(row) = rows.next().map_err(StoreError::sql(name))? {
            for (idx, column) in cells.iter_mut().enumerate() {
                column.push(row.get::<_, Value>(idx).map_err(StoreError::sql(name))?);
            }
        }

        let columns = declared
            .iter()
            .zip(cells)
            .map(|((column, decl), values)| build_column(column, decl, values))
            .collect();
        let frame = DataFrame::new(columns)?;
        debug!(relation = name, rows = frame.height(), "relation read");
        Ok(frame)
    }
}

impl BulkWriter for SqliteStore {
    fn write_relation(&mut self, name: &str, frame: &DataFrame) -> Result<()> {
        if frame.width() == 0 {
            return Err(StoreError::EmptySchema {
                relation: name.to_string(),
            });
        }
        let columns = frame.get_columns();
        let table = quote_ident(name);
        let definitions = columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(c.name()), declared_type(c.dtype())))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; columns.len()].join(", ");

        let tx = self.conn.transaction().map_err(StoreError::sql(name))?;
        tx.execute(&format!("DROP TABLE IF EXISTS {table}"), [])
            .map_err(StoreError::sql(name))?;
        tx.execute(&format!("CREATE TABLE {table} ({definitions})"), [])
            .map_err(StoreError::sql(name))?;
        {
            let mut insert = tx
                .prepare(&format!("INSERT INTO {table} VALUES ({placeholders})"))
                .map_err(StoreError::sql(name))?;
            let mut values = Vec::with_capacity(columns.len());
            for row in 0..frame.height() {
                values.clear();
                for column in columns {
                    values.push(to_sql_value(column.get(row)?));
                }
                insert
                    .execute(params_from_iter(values.iter()))
                    .map_err(StoreError::sql(name))?;
            }
        }
        tx.commit().map_err(StoreError::sql(name))?;

        info!(
            relation = name,
            rows = frame.height(),
            columns = frame.width(),
            "relation written"
        );
        Ok(())
    }
}

/// Quote an identifier for SQLite, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn declared_type(dtype: &DataType) -> &'static str {
    match dtype {
        DataType::Boolean => "BOOLEAN",
        d if d.is_integer() => "INTEGER",
        d if d.is_float() => "REAL",
        _ => "TEXT",
    }
}

fn to_sql_value(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Integer(i64::from(b)),
        AnyValue::Int32(i) => Value::Integer(i64::from(i)),
        AnyValue::Int64(i) => Value::Integer(i),
        AnyValue::UInt32(i) => Value::Integer(i64::from(i)),
        AnyValue::UInt64(i) => match i64::try_from(i) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Real(i as f64),
        },
        AnyValue::Float32(f) => Value::Real(f64::from(f)),
        AnyValue::Float64(f) => Value::Real(f),
        AnyValue::String(s) => Value::Text(s.to_string()),
        AnyValue::StringOwned(s) => Value::Text(s.to_string()),
        other => Value::Text(other.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Affinity {
    Boolean,
    Integer,
    Real,
    Text,
}

impl Affinity {
    /// SQLite's column affinity rules, with `BOOL*` kept apart from numeric.
    fn from_declared(declared: &str) -> Self {
        let declared = declared.to_ascii_uppercase();
        if declared.starts_with("BOOL") {
            Self::Boolean
        } else if declared.contains("INT") {
            Self::Integer
        } else if ["CHAR", "CLOB", "TEXT"].iter().any(|t| declared.contains(t)) {
            Self::Text
        } else if ["REAL", "FLOA", "DOUB"].iter().any(|t| declared.contains(t)) {
            Self::Real
        } else {
            Self::Text
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) | (Self::Text, _) => true,
            (Self::Boolean, Value::Integer(i)) => *i == 0 || *i == 1,
            (Self::Integer, Value::Integer(_)) => true,
            (Self::Real, Value::Integer(_) | Value::Real(_)) => true,
            _ => false,
        }
    }
}

/// Build a column from stored values, falling back to the narrowest type
/// that holds every value when they do not fit the declared type.
fn build_column(name: &str, declared: &str, values: Vec<Value>) -> Column {
    let declared = Affinity::from_declared(declared);
    let affinity = if values.iter().all(|v| declared.accepts(v)) {
        declared
    } else {
        [Affinity::Integer, Affinity::Real]
            .into_iter()
            .find(|a| values.iter().all(|v| a.accepts(v)))
            .unwrap_or(Affinity::Text)
    };

    let name = name.into();
    match affinity {
        Affinity::Boolean => {
            let data: Vec<Option<bool>> = values
                .iter()
                .map(|v| match v {
                    Value::Integer(i) => Some(*i != 0),
                    _ => None,
                })
                .collect();
            Column::new(name, data)
        }
        Affinity::Integer => {
            let data: Vec<Option<i64>> = values
                .iter()
                .map(|v| match v {
                    Value::Integer(i) => Some(*i),
                    _ => None,
                })
                .collect();
            Column::new(name, data)
        }
        Affinity::Real => {
            let data: Vec<Option<f64>> = values
                .iter()
                .map(|v| match v {
                    Value::Integer(i) => Some(*i as f64),
                    Value::Real(f) => Some(*f),
                    _ => None,
                })
                .collect();
            Column::new(name, data)
        }
        Affinity::Text => {
            let data: Vec<Option<String>> = values
                .into_iter()
                .map(|v| match v {
                    Value::Null => None,
                    Value::Integer(i) => Some(i.to_string()),
                    Value::Real(f) => Some(f.to_string()),
                    Value::Text(s) => Some(s),
                    Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
                })
                .collect();
            Column::new(name, data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("wgi_2020"), "\"wgi_2020\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }

    #[test]
    fn affinity_follows_declared_type() {
        assert_eq!(Affinity::from_declared("INTEGER"), Affinity::Integer);
        assert_eq!(Affinity::from_declared("bigint"), Affinity::Integer);
        assert_eq!(Affinity::from_declared("BOOLEAN"), Affinity::Boolean);
        assert_eq!(Affinity::from_declared("DOUBLE PRECISION"), Affinity::Real);
        assert_eq!(Affinity::from_declared("VARCHAR(20)"), Affinity::Text);
        assert_eq!(Affinity::from_declared(""), Affinity::Text);
    }

    #[test]
    fn mismatched_values_widen_the_column() {
        let col = build_column(
            "year",
            "INTEGER",
            vec![Value::Integer(1), Value::Real(2.5), Value::Null],
        );
        assert_eq!(col.dtype(), &DataType::Float64);

        let col = build_column(
            "year",
            "INTEGER",
            vec![Value::Integer(1), Value::Text("n/a".into())],
        );
        assert_eq!(col.dtype(), &DataType::String);
    }
}

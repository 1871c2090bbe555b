//! Reader for WiGLE SQLite exports.
//!
//! Opens the export read-only and materializes the `network` table as JSON
//! objects keyed by column name, so the normalization layer never touches
//! SQLite types directly. Column names come from the prepared statement's
//! descriptor, without consuming any rows.

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::{Map, Number, Value};
use std::path::Path;

use crate::error::{SourceError, SourceResult};

/// The source table every WiGLE export carries.
const NETWORK_TABLE: &str = "network";

/// A WiGLE SQLite export, opened read-only.
pub struct SqliteSource {
    conn: Connection,
}

impl SqliteSource {
    /// Open a WiGLE export file.
    pub fn open<P: AsRef<Path>>(path: P) -> SourceResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| SourceError::Open {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { conn })
    }

    /// Column names of the `network` table, from the statement descriptor.
    pub fn columns(&self) -> SourceResult<Vec<String>> {
        let stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {NETWORK_TABLE}"))
            .map_err(|e| SourceError::MissingNetworkTable(e.to_string()))?;
        Ok(stmt.column_names().iter().map(|s| s.to_string()).collect())
    }

    /// Number of rows in the `network` table.
    pub fn row_count(&self) -> SourceResult<u64> {
        let count: u64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {NETWORK_TABLE}"), [], |row| {
                row.get(0)
            })
            .map_err(|e| SourceError::MissingNetworkTable(e.to_string()))?;
        Ok(count)
    }

    /// Read rows from the `network` table via a single forward-only cursor.
    ///
    /// Each row becomes a JSON object with one entry per column. SQLite
    /// values map as: NULL stays null, integers and reals become numbers,
    /// text becomes a string (lossy UTF-8), blobs become hex strings.
    ///
    /// `limit` caps the number of rows read; `None` reads everything.
    pub fn read_rows(&self, limit: Option<usize>) -> SourceResult<Vec<Map<String, Value>>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {NETWORK_TABLE}"))
            .map_err(|e| SourceError::MissingNetworkTable(e.to_string()))?;

        let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let column_count = columns.len();

        let mut records = Vec::new();
        let mut rows = stmt.query([])?;

        while let Some(row) = rows.next()? {
            if let Some(max) = limit {
                if records.len() >= max {
                    break;
                }
            }

            let mut obj = Map::with_capacity(column_count);
            for (idx, name) in columns.iter().enumerate() {
                obj.insert(name.clone(), value_ref_to_json(row.get_ref(idx)?));
            }
            records.push(obj);
        }

        Ok(records)
    }
}

/// Convert a SQLite value into its JSON representation.
fn value_ref_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(hex::encode(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    /// Build a minimal WiGLE-shaped export on disk.
    fn fixture_db() -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        let conn = Connection::open(file.path()).unwrap();
        conn.execute_batch(
            "CREATE TABLE network (
                bssid TEXT,
                ssid TEXT,
                type TEXT,
                time INTEGER,
                bestlat REAL,
                bestlon REAL,
                lastlat REAL,
                lastlon REAL,
                bestlevel INTEGER
            );
            INSERT INTO network VALUES
                ('AA:BB:CC:00:11:22', 'CoffeeShop', 'W', 1700000000000, 40.1, -73.9, 40.0, -74.0, -62),
                ('11:22:33:44:55:66', NULL, 'E', 1700000001500, NULL, NULL, 41.0, -72.0, NULL);",
        )
        .unwrap();
        file
    }

    #[test]
    fn test_columns_from_descriptor() {
        let file = fixture_db();
        let source = SqliteSource::open(file.path()).unwrap();
        let columns = source.columns().unwrap();
        assert_eq!(columns[0], "bssid");
        assert!(columns.contains(&"time".to_string()));
        assert_eq!(columns.len(), 9);
    }

    #[test]
    fn test_row_count() {
        let file = fixture_db();
        let source = SqliteSource::open(file.path()).unwrap();
        assert_eq!(source.row_count().unwrap(), 2);
    }

    #[test]
    fn test_read_rows_value_mapping() {
        let file = fixture_db();
        let source = SqliteSource::open(file.path()).unwrap();
        let rows = source.read_rows(None).unwrap();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first["bssid"], "AA:BB:CC:00:11:22");
        assert_eq!(first["time"], 1700000000000i64);
        assert_eq!(first["bestlat"], 40.1);
        assert_eq!(first["bestlevel"], -62);

        let second = &rows[1];
        assert!(second["ssid"].is_null());
        assert!(second["bestlat"].is_null());
    }

    #[test]
    fn test_read_rows_limit() {
        let file = fixture_db();
        let source = SqliteSource::open(file.path()).unwrap();
        let rows = source.read_rows(Some(1)).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_blob_becomes_hex() {
        let file = NamedTempFile::new().unwrap();
        let conn = Connection::open(file.path()).unwrap();
        conn.execute_batch("CREATE TABLE network (bssid TEXT, payload BLOB);")
            .unwrap();
        conn.execute(
            "INSERT INTO network VALUES ('aa', ?1)",
            rusqlite::params![vec![0xDEu8, 0xAD, 0xBE, 0xEF]],
        )
        .unwrap();

        let source = SqliteSource::open(file.path()).unwrap();
        let rows = source.read_rows(None).unwrap();
        assert_eq!(rows[0]["payload"], "deadbeef");
    }

    #[test]
    fn test_open_missing_file() {
        let result = SqliteSource::open("/nonexistent/path/to.sqlite");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_network_table() {
        let file = NamedTempFile::new().unwrap();
        // Valid SQLite file, wrong schema
        let conn = Connection::open(file.path()).unwrap();
        conn.execute_batch("CREATE TABLE other (x INTEGER);").unwrap();
        drop(conn);

        let source = SqliteSource::open(file.path()).unwrap();
        assert!(matches!(
            source.columns(),
            Err(SourceError::MissingNetworkTable(_))
        ));
    }
}

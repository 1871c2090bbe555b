//! High-level import pipeline: read, normalize, write.
//!
//! Rows are processed strictly sequentially; each row's device upsert,
//! identity resolution, and observation append complete before the next
//! row begins. There is no batching, no retry, and no partial-completion
//! checkpointing: any store or source fault aborts the run.

use std::path::Path;

use crate::config::PgSettings;
use crate::error::ImportResult;
use crate::models::ImportSummary;
use crate::source::SqliteSource;
use crate::store::PgStore;
use crate::transform::{normalize_row, RowOutcome, SkipReason};

/// How many written rows get echoed as diagnostic samples.
const DEBUG_SAMPLE_ROWS: usize = 5;

/// Options for one import run.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Full destination DSN; overrides the environment settings.
    pub dsn: Option<String>,
    /// Normalize everything but write nothing.
    pub dry_run: bool,
    /// Stop after this many source rows.
    pub limit: Option<usize>,
}

/// Run a full import of a WiGLE export into the destination.
///
/// Returns the run's counters. Skippable rows are logged as warnings and
/// counted; anything else propagates and terminates the run.
pub async fn run_import(path: &Path, options: ImportOptions) -> ImportResult<ImportSummary> {
    let source = SqliteSource::open(path)?;

    let columns = source.columns()?;
    eprintln!("📖 Source: {}", path.display());
    eprintln!("   Columns: {}", columns.join(", "));

    let rows = source.read_rows(options.limit)?;
    eprintln!("   Read {} rows", rows.len());

    let store = if options.dry_run {
        eprintln!("🚫 Dry run: nothing will be written");
        None
    } else {
        let dsn = match options.dsn {
            Some(ref dsn) => dsn.clone(),
            None => {
                let settings = PgSettings::from_env();
                eprintln!("🔌 Connecting to: {}", settings.redacted());
                settings.dsn()
            }
        };
        Some(PgStore::connect(&dsn).await?)
    };

    let mut summary = ImportSummary {
        rows_read: rows.len(),
        ..Default::default()
    };

    for (idx, row) in rows.iter().enumerate() {
        let sighting = match normalize_row(row)? {
            RowOutcome::Ready(sighting) => sighting,
            RowOutcome::Skip(reason) => {
                warn_skip(idx, row, &reason);
                match reason {
                    SkipReason::NoTimestamp => summary.skipped_no_timestamp += 1,
                    SkipReason::NoCoordinates => summary.skipped_no_coordinates += 1,
                }
                continue;
            }
        };

        if summary.imported < DEBUG_SAMPLE_ROWS {
            eprintln!(
                "   🔎 {} -> lat: {}, lon: {}, signal: {}",
                sighting.device_id, sighting.latitude, sighting.longitude, sighting.signal
            );
        }

        let Some(store) = store.as_ref() else {
            summary.imported += 1;
            continue;
        };

        // Device write happens-before the observation write for this row.
        let Some(device) = store.upsert_device(&sighting).await? else {
            eprintln!(
                "   ⚠️  Row {}: device {} unresolved after upsert - skipped",
                idx, sighting.device_id
            );
            summary.skipped_unresolved_device += 1;
            continue;
        };

        if device.created {
            summary.devices_created += 1;
        }

        store.insert_observation(device.id, &sighting).await?;
        summary.imported += 1;
    }

    if let Some(store) = store {
        store.close().await;
    }

    Ok(summary)
}

/// Log a per-row skip warning.
fn warn_skip(idx: usize, row: &serde_json::Map<String, serde_json::Value>, reason: &SkipReason) {
    match reason {
        SkipReason::NoTimestamp => {
            let columns: Vec<&str> = row.keys().map(String::as_str).collect();
            eprintln!(
                "   ⚠️  Row {}: {} (columns: {})",
                idx,
                reason,
                columns.join(", ")
            );
        }
        SkipReason::NoCoordinates => {
            let bssid = row
                .get("bssid")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("?");
            eprintln!("   ⚠️  Row {}: skipping {} - {}", idx, bssid, reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use tempfile::NamedTempFile;

    fn fixture_db() -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        let conn = Connection::open(file.path()).unwrap();
        conn.execute_batch(
            "CREATE TABLE network (
                bssid TEXT, ssid TEXT, type TEXT, time INTEGER,
                bestlat REAL, bestlon REAL, lastlat REAL, lastlon REAL,
                bestlevel INTEGER
            );
            INSERT INTO network VALUES
                ('AA:BB:CC:00:11:22', 'Cafe', 'E', 1700000000000, NULL, NULL, 40.0, -73.0, NULL),
                ('11:22:33:44:55:66', 'NoCoords', 'W', 1700000000000, NULL, NULL, NULL, NULL, -50),
                ('DE:AD:BE:EF:00:01', 'Office', 'W', 1700000005000, 41.0, -72.0, 40.9, -72.1, -61);",
        )
        .unwrap();
        file
    }

    #[tokio::test]
    async fn test_dry_run_counts() {
        let file = fixture_db();
        let options = ImportOptions {
            dry_run: true,
            ..Default::default()
        };
        let summary = run_import(file.path(), options).await.unwrap();

        assert_eq!(summary.rows_read, 3);
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.skipped_no_coordinates, 1);
        assert_eq!(summary.skipped_no_timestamp, 0);
    }

    #[tokio::test]
    async fn test_dry_run_respects_limit() {
        let file = fixture_db();
        let options = ImportOptions {
            dry_run: true,
            limit: Some(1),
            ..Default::default()
        };
        let summary = run_import(file.path(), options).await.unwrap();

        assert_eq!(summary.rows_read, 1);
        assert_eq!(summary.imported, 1);
    }

    #[tokio::test]
    async fn test_missing_source_file_is_fatal() {
        let options = ImportOptions {
            dry_run: true,
            ..Default::default()
        };
        let result = run_import(Path::new("/nonexistent.sqlite"), options).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_row_without_timestamp_column_skipped() {
        let file = NamedTempFile::new().unwrap();
        let conn = Connection::open(file.path()).unwrap();
        // No timestamp alias at all
        conn.execute_batch(
            "CREATE TABLE network (bssid TEXT, lastlat REAL, lastlon REAL);
             INSERT INTO network VALUES ('aa:bb', 40.0, -73.0);",
        )
        .unwrap();
        drop(conn);

        let options = ImportOptions {
            dry_run: true,
            ..Default::default()
        };
        let summary = run_import(file.path(), options).await.unwrap();
        assert_eq!(summary.imported, 0);
        assert_eq!(summary.skipped_no_timestamp, 1);
    }
}

//! Per-row normalization: timestamp resolution, type mapping, text
//! sanitization, coordinate selection, and the raw snapshot.
//!
//! A row either normalizes into a [`NormalizedSighting`], is skipped with a
//! [`SkipReason`] (warning, run continues), or surfaces a
//! [`TransformError`] (malformed schema, run aborts).

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::{TransformError, TransformResult};
use crate::models::{DeviceType, NormalizedSighting};

/// Known aliases for the "last seen" timestamp column, in priority order.
pub const TIMESTAMP_COLUMNS: [&str; 4] = ["time", "lasttime", "lastupdt", "lastseen"];

/// Why a row was skipped rather than written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// None of the timestamp column aliases is present.
    NoTimestamp,
    /// Neither best nor last coordinates yield a usable pair.
    NoCoordinates,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoTimestamp => write!(f, "no timestamp column found"),
            Self::NoCoordinates => write!(f, "no coordinates available"),
        }
    }
}

/// Outcome of normalizing one source row.
#[derive(Debug)]
pub enum RowOutcome {
    /// Row normalized and ready to write.
    Ready(Box<NormalizedSighting>),
    /// Row skipped; log a warning and continue.
    Skip(SkipReason),
}

/// Sanitize a scalar field value.
///
/// Null passes through as `None`. Anything else is stringified, stripped
/// of NUL code points (the raw control character and its literal `\x00` /
/// `\u0000` spellings), and trimmed; an empty result collapses to `None`.
///
/// Sanitization is idempotent: applying it to an already-clean string
/// returns the same string.
pub fn sanitize(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    // Removing a match can splice the surrounding characters into a new
    // occurrence, so strip repeatedly until nothing changes.
    let mut clean = text;
    loop {
        let next = clean
            .replace('\u{0}', "")
            .replace("\\x00", "")
            .replace("\\u0000", "");
        if next == clean {
            break;
        }
        clean = next;
    }
    let trimmed = clean.trim();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Resolve the sighting timestamp from the first present column alias.
///
/// Returns `Ok(None)` when no alias is present (row skip). A present but
/// non-numeric value is a schema error. Epoch milliseconds convert to a
/// UTC instant with sub-second precision preserved.
pub fn resolve_timestamp(row: &Map<String, Value>) -> TransformResult<Option<DateTime<Utc>>> {
    let Some(column) = TIMESTAMP_COLUMNS.iter().find(|c| row.contains_key(**c)) else {
        return Ok(None);
    };

    let value = &row[*column];
    let instant = match value {
        Value::Number(n) if n.is_i64() => {
            // Epoch milliseconds as stored by WiGLE
            DateTime::from_timestamp_millis(n.as_i64().unwrap_or(0))
        }
        Value::Number(n) => n
            .as_f64()
            .and_then(|ms| DateTime::from_timestamp_micros((ms * 1000.0) as i64)),
        _ => None,
    };

    instant
        .map(Some)
        .ok_or_else(|| TransformError::InvalidTimestamp {
            column: column.to_string(),
            message: format!("expected epoch milliseconds, got {value}"),
        })
}

/// Select the best-available coordinate pair.
///
/// Prefers `bestlat`/`bestlon`, falling back per-axis to
/// `lastlat`/`lastlon`. Returns `None` when either axis is still missing.
pub fn select_coordinates(row: &Map<String, Value>) -> Option<(f64, f64)> {
    let lat = coordinate(row, "bestlat").or_else(|| coordinate(row, "lastlat"))?;
    let lon = coordinate(row, "bestlon").or_else(|| coordinate(row, "lastlon"))?;
    Some((lat, lon))
}

fn coordinate(row: &Map<String, Value>, column: &str) -> Option<f64> {
    row.get(column).and_then(Value::as_f64)
}

/// Best signal level, defaulting to 0 when absent.
pub fn select_signal(row: &Map<String, Value>) -> i32 {
    row.get("bestlevel")
        .and_then(Value::as_i64)
        .map(|level| level as i32)
        .unwrap_or(0)
}

/// Build the sparse sanitized snapshot of a source row.
///
/// Every non-null field is sanitized independently; keys whose sanitized
/// value comes out empty are omitted.
pub fn build_snapshot(row: &Map<String, Value>) -> Map<String, Value> {
    let mut snapshot = Map::new();
    for (key, value) in row {
        if let Some(clean) = sanitize(value) {
            snapshot.insert(key.clone(), Value::String(clean));
        }
    }
    snapshot
}

/// Normalize one source row into a write-ready sighting, or decide to
/// skip it.
///
/// Skip points, in order: no timestamp column, then no usable
/// coordinates. A row without a `bssid` column indicates a malformed
/// export and aborts.
pub fn normalize_row(row: &Map<String, Value>) -> TransformResult<RowOutcome> {
    let Some(timestamp) = resolve_timestamp(row)? else {
        return Ok(RowOutcome::Skip(SkipReason::NoTimestamp));
    };

    let device_id = row
        .get("bssid")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TransformError::MissingColumn("bssid".into()))?;

    let name = row.get("ssid").and_then(|v| sanitize(v));
    let device_type = DeviceType::from_code(row.get("type").and_then(Value::as_str));

    let Some((latitude, longitude)) = select_coordinates(row) else {
        return Ok(RowOutcome::Skip(SkipReason::NoCoordinates));
    };

    Ok(RowOutcome::Ready(Box::new(NormalizedSighting {
        device_type,
        device_id,
        name,
        timestamp,
        latitude,
        longitude,
        signal: select_signal(row),
        raw: build_snapshot(row),
    })))
}

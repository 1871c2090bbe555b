//! Domain models for the sigload import pipeline.
//!
//! - [`DeviceType`] - canonical category of a wireless emitter
//! - [`NormalizedSighting`] - one source row after normalization, ready to write
//! - [`ImportSummary`] - counters reported at the end of a run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Map;

// =============================================================================
// Device Type
// =============================================================================

/// Canonical category of a wireless emitter.
///
/// Mapped from WiGLE single-character type codes. The mapping is total:
/// unrecognized or absent codes default to [`DeviceType::Wifi`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Wifi,
    Bluetooth,
    Cell,
}

impl DeviceType {
    /// Map a WiGLE type code to a device category.
    ///
    /// W = WiFi, B = Bluetooth classic, E = Bluetooth LE,
    /// D = cell (2G/3G/4G/5G), G = GSM. Anything else, including an
    /// absent code, is treated as WiFi.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("B") | Some("E") => Self::Bluetooth,
            Some("D") | Some("G") => Self::Cell,
            _ => Self::Wifi,
        }
    }

    /// The destination enum label for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wifi => "wifi",
            Self::Bluetooth => "bluetooth",
            Self::Cell => "cell",
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Normalized Sighting
// =============================================================================

/// One source row after normalization.
///
/// Produced by [`crate::transform::normalize_row`] and consumed by the
/// store layer: the device fields drive the natural-key upsert, the rest
/// become the appended observation.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedSighting {
    /// Canonical device category.
    pub device_type: DeviceType,
    /// Natural identifier (BSSID / MAC-like address).
    pub device_id: String,
    /// Sanitized display name (SSID), if any survived sanitization.
    pub name: Option<String>,
    /// Sighting instant, millisecond precision preserved.
    pub timestamp: DateTime<Utc>,
    /// Resolved latitude (best, falling back to last).
    pub latitude: f64,
    /// Resolved longitude (best, falling back to last).
    pub longitude: f64,
    /// Best signal level, 0 when absent.
    pub signal: i32,
    /// Sparse sanitized snapshot of all non-null original fields.
    pub raw: Map<String, serde_json::Value>,
}

// =============================================================================
// Import Summary
// =============================================================================

/// Counters for one import run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    /// Rows read from the source cursor.
    pub rows_read: usize,
    /// Rows that produced an observation (or would have, in dry-run).
    pub imported: usize,
    /// Devices newly created by the upsert (conflicts not counted).
    pub devices_created: usize,
    /// Rows skipped: no recognized timestamp column.
    pub skipped_no_timestamp: usize,
    /// Rows skipped: no usable coordinate pair.
    pub skipped_no_coordinates: usize,
    /// Rows skipped: device identity lookup failed after upsert.
    pub skipped_unresolved_device: usize,
}

impl ImportSummary {
    /// Total rows skipped for any reason.
    pub fn skipped(&self) -> usize {
        self.skipped_no_timestamp + self.skipped_no_coordinates + self.skipped_unresolved_device
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_type_mapping_total() {
        assert_eq!(DeviceType::from_code(Some("W")), DeviceType::Wifi);
        assert_eq!(DeviceType::from_code(Some("B")), DeviceType::Bluetooth);
        assert_eq!(DeviceType::from_code(Some("E")), DeviceType::Bluetooth);
        assert_eq!(DeviceType::from_code(Some("D")), DeviceType::Cell);
        assert_eq!(DeviceType::from_code(Some("G")), DeviceType::Cell);
        // Unrecognized and absent codes default to wifi
        assert_eq!(DeviceType::from_code(Some("Z")), DeviceType::Wifi);
        assert_eq!(DeviceType::from_code(Some("")), DeviceType::Wifi);
        assert_eq!(DeviceType::from_code(None), DeviceType::Wifi);
        // Exact-match lookup: a padded code is not a recognized code
        assert_eq!(DeviceType::from_code(Some("B ")), DeviceType::Wifi);
        assert_eq!(DeviceType::from_code(Some(" E")), DeviceType::Wifi);
    }

    #[test]
    fn test_device_type_labels() {
        assert_eq!(DeviceType::Wifi.as_str(), "wifi");
        assert_eq!(DeviceType::Bluetooth.as_str(), "bluetooth");
        assert_eq!(DeviceType::Cell.as_str(), "cell");
    }

    #[test]
    fn test_summary_skipped_total() {
        let summary = ImportSummary {
            rows_read: 10,
            imported: 6,
            devices_created: 5,
            skipped_no_timestamp: 1,
            skipped_no_coordinates: 2,
            skipped_unresolved_device: 1,
        };
        assert_eq!(summary.skipped(), 4);
    }
}

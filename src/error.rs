//! Error types for the sigload import pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`SourceError`] - reading the WiGLE SQLite export
//! - [`TransformError`] - per-row normalization failures that indicate a
//!   malformed source schema (skippable row conditions are not errors,
//!   see [`crate::transform::SkipReason`])
//! - [`StoreError`] - PostgreSQL/PostGIS write side
//! - [`ImportError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Source Errors (SQLite side)
// =============================================================================

/// Errors while reading the WiGLE SQLite export.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to open the source database file.
    #[error("Cannot open source database '{path}': {message}")]
    Open { path: String, message: String },

    /// SQLite query error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The `network` table is missing or unreadable.
    #[error("Source file has no readable 'network' table: {0}")]
    MissingNetworkTable(String),
}

// =============================================================================
// Transform Errors
// =============================================================================

/// Errors during row normalization.
///
/// These indicate a malformed source schema and abort the run. Rows that
/// merely lack optional data (timestamp aliases, coordinates) are skipped
/// with a warning instead, which is not an error.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A column the schema guarantees is absent from the row.
    #[error("Missing source column: {0}")]
    MissingColumn(String),

    /// A timestamp column held a non-numeric value.
    #[error("Invalid timestamp in column '{column}': {message}")]
    InvalidTimestamp { column: String, message: String },
}

// =============================================================================
// Store Errors (PostgreSQL side)
// =============================================================================

/// Errors from the destination database.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection or query failure.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),
}

// =============================================================================
// Import Errors (top-level)
// =============================================================================

/// Top-level import orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline::run_import`].
/// Any of these terminates the run; there is no retry or checkpointing.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Source read error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Normalization error (malformed schema).
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Destination write error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for normalization operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // TransformError -> ImportError
        let transform_err = TransformError::MissingColumn("bssid".into());
        let import_err: ImportError = transform_err.into();
        assert!(import_err.to_string().contains("bssid"));

        // SourceError -> ImportError
        let source_err = SourceError::MissingNetworkTable("no such table".into());
        let import_err: ImportError = source_err.into();
        assert!(import_err.to_string().contains("network"));
    }

    #[test]
    fn test_invalid_timestamp_format() {
        let err = TransformError::InvalidTimestamp {
            column: "lasttime".into(),
            message: "expected epoch milliseconds".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("lasttime"));
        assert!(msg.contains("epoch milliseconds"));
    }
}

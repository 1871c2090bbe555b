//! # sigload - WiGLE sighting importer
//!
//! Sigload migrates wireless-device sighting records from a WiGLE-format
//! SQLite export into a PostgreSQL/PostGIS device catalog.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ WiGLE .sqlite│────▶│   Source    │────▶│  Normalize  │────▶│   PostGIS   │
//! │  (network)   │     │  (rusqlite) │     │  (per row)  │     │ (two writes)│
//! └──────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sigload::{run_import, ImportOptions};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() {
//!     let summary = run_import(Path::new("export.sqlite"), ImportOptions::default())
//!         .await
//!         .unwrap();
//!     println!("Imported {} observations", summary.imported);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - hierarchical error types
//! - [`models`] - domain models (DeviceType, NormalizedSighting, ImportSummary)
//! - [`config`] - destination connection settings
//! - [`source`] - WiGLE SQLite reader
//! - [`transform`] - per-row normalization and the pipeline
//! - [`store`] - PostgreSQL/PostGIS writes

// Core modules
pub mod error;
pub mod models;

// Configuration
pub mod config;

// Source reading
pub mod source;

// Transformation
pub mod transform;

// Destination writes
pub mod store;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ImportError, SourceError, StoreError, TransformError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{DeviceType, ImportSummary, NormalizedSighting};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::PgSettings;

// =============================================================================
// Re-exports - Source
// =============================================================================

pub use source::SqliteSource;

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    build_snapshot, normalize_row, resolve_timestamp, sanitize, select_coordinates, select_signal,
    run_import, ImportOptions, RowOutcome, SkipReason, TIMESTAMP_COLUMNS,
};

// =============================================================================
// Re-exports - Store
// =============================================================================

pub use store::{DeviceHandle, PgStore};

//! Row normalization and the import pipeline.

pub mod normalize;
pub mod pipeline;

pub use normalize::{
    build_snapshot, normalize_row, resolve_timestamp, sanitize, select_coordinates, select_signal,
    RowOutcome, SkipReason, TIMESTAMP_COLUMNS,
};
pub use pipeline::{run_import, ImportOptions};

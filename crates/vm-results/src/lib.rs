//! vm-results: model output types, text reports and run fingerprints.

pub mod hash;
pub mod report;
pub mod types;

pub use hash::compute_run_id;
pub use report::{aperture_check, agreement_check, column_density_table, radial_density_table};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Grid and value lengths differ for {what}: {grid} vs {values}")]
    LengthMismatch {
        what: &'static str,
        grid: usize,
        values: usize,
    },
}

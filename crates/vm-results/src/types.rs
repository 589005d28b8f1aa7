//! Result data types.

use serde::{Deserialize, Serialize};

use crate::{ResultsError, ResultsResult};

/// The parts of a finished vectorial-model run that the text reports read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorialResult {
    pub volume_density_grid_km: Vec<f64>,
    pub volume_density_per_cm3: Vec<f64>,
    pub column_density_grid_km: Vec<f64>,
    pub column_density_per_cm2: Vec<f64>,
    pub num_fragments_theory: f64,
    pub num_fragments_grid: f64,
    pub max_grid_radius_m: f64,
}

impl VectorialResult {
    /// Parse a result and make sure every grid lines up with its values.
    pub fn from_json(content: &str) -> ResultsResult<Self> {
        let result: VectorialResult = serde_json::from_str(content)?;
        result.check_shapes()?;
        Ok(result)
    }

    pub fn check_shapes(&self) -> ResultsResult<()> {
        let pairs = [
            (
                "volume density",
                self.volume_density_grid_km.len(),
                self.volume_density_per_cm3.len(),
            ),
            (
                "column density",
                self.column_density_grid_km.len(),
                self.column_density_per_cm2.len(),
            ),
        ];
        for (what, grid, values) in pairs {
            if grid != values {
                return Err(ResultsError::LengthMismatch { what, grid, values });
            }
        }
        Ok(())
    }
}

/// Fragment counts recovered by integrating column density over apertures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ApertureRecovery {
    pub fragments_theory: f64,
    /// Circular aperture covering the whole grid.
    pub circular_total: f64,
    /// Annulus from 500000 km out to the edge of the grid.
    pub annular_total: f64,
}

impl ApertureRecovery {
    pub fn circular_percent(&self) -> f64 {
        self.circular_total * 100.0 / self.fragments_theory
    }

    pub fn annular_percent(&self) -> f64 {
        self.annular_total * 100.0 / self.fragments_theory
    }
}

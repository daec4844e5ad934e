//! Engine settings.
//!
//! [`EngineSettings`] gathers the tunables of the lattice engine that are not
//! part of an instrument or a scenario. It is a plain value passed to the
//! scenario driver; there is no process-wide state.

use serde::{Deserialize, Serialize};

use crate::compounding::Compounding;
use crate::errors::Result;
use crate::{ensure, Real};

/// Settings shared by every scenario of a valuation batch.
///
/// Deserializes from any `serde` format; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Lower bound applied to the mean-reversion speed before the tree is
    /// laid out. Keeps the half-width `jMax` finite.
    pub mean_reversion_floor: Real,
    /// Constant `c` in `jMax = ceil(c / (alpha·Δt))`.
    pub width_threshold: Real,
    /// Compounding used to convert scenario zero rates to discount factors.
    pub compounding: Compounding,
    /// Compounding periods per year, used with [`Compounding::Compounded`].
    pub compounding_frequency: u32,
    /// Price scenarios on the rayon thread pool.
    pub parallel: bool,
    /// Keep the full lattices of the first scenario for inspection.
    pub retain_diagnostics: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            mean_reversion_floor: 0.0002,
            width_threshold: 0.1835,
            compounding: Compounding::Continuous,
            compounding_frequency: 1,
            parallel: false,
            retain_diagnostics: true,
        }
    }
}

impl EngineSettings {
    /// Return a copy with parallel scenario execution switched on or off.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Return a copy with the given rate compounding.
    pub fn with_compounding(mut self, compounding: Compounding, frequency: u32) -> Self {
        self.compounding = compounding;
        self.compounding_frequency = frequency;
        self
    }

    /// Return a copy that does (not) retain first-scenario lattices.
    pub fn with_diagnostics(mut self, retain: bool) -> Self {
        self.retain_diagnostics = retain;
        self
    }

    /// Check that the settings describe a usable tree.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.mean_reversion_floor > 0.0 && self.mean_reversion_floor.is_finite(),
            "mean_reversion_floor must be positive, got {}",
            self.mean_reversion_floor
        );
        ensure!(
            self.width_threshold > 0.0 && self.width_threshold.is_finite(),
            "width_threshold must be positive, got {}",
            self.width_threshold
        );
        ensure!(
            self.compounding != Compounding::Compounded || self.compounding_frequency > 0,
            "compounding_frequency must be positive for discrete compounding"
        );
        Ok(())
    }
}

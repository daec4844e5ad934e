//! Hull-White (extended Vasicek) model on a trinomial tree.
//!
//! ```text
//! dr = (θ(t) − a·r) dt + σ dW
//! ```
//!
//! The tree is built for the de-meaned process `x = r − α(t)`, whose
//! branching probabilities only depend on `M = −a·Δt`. The time-dependent
//! drift `θ(t)` never appears explicitly: it is absorbed by the per-column
//! level shift solved during calibration.
//!
//! References: Hull, *Options, Futures and other Derivatives*; Clewlow and
//! Strickland, *Implementing Derivatives Models*, ch. 9.

use hwl_core::errors::Result;
use hwl_core::{EngineSettings, Real, Size, Time, Volatility};

use crate::short_rate_model::{OneFactorTreeModel, TreeLayout};

/// Hull-White one-factor model parameters relevant to tree construction.
///
/// The volatility is not stored: it varies per scenario and only scales the
/// state ladder through [`OneFactorTreeModel::state_spacing`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullWhite {
    /// Mean-reversion speed as supplied.
    pub a: Real,
    floor: Real,
    width_threshold: Real,
}

impl HullWhite {
    /// Create a model with the default floor (0.0002) and width constant
    /// (0.1835).
    pub fn new(a: Real) -> Self {
        Self::with_settings(a, &EngineSettings::default())
    }

    /// Create a model taking the floor and width constant from `settings`.
    pub fn with_settings(a: Real, settings: &EngineSettings) -> Self {
        Self {
            a,
            floor: settings.mean_reversion_floor,
            width_threshold: settings.width_threshold,
        }
    }

    /// Mean reversion actually used by the tree: `max(a, floor)`.
    pub fn effective_mean_reversion(&self) -> Real {
        self.a.max(self.floor)
    }
}

impl OneFactorTreeModel for HullWhite {
    /// `Δt = T/N`, `M = −max(a, floor)·Δt`, `jMax = ⌈−c/M⌉`.
    fn tree_layout(&self, maturity: Time, steps: Size) -> Result<TreeLayout> {
        hwl_core::ensure!(
            maturity > 0.0 && maturity.is_finite(),
            "maturity must be positive, got {maturity}"
        );
        hwl_core::ensure!(steps >= 1, "need at least one time step");
        hwl_core::ensure!(
            self.a.is_finite(),
            "mean reversion must be finite, got {}",
            self.a
        );

        let step = maturity / steps as Real;
        let spacing = -self.effective_mean_reversion() * step;
        let width = (-self.width_threshold / spacing).ceil();
        hwl_core::ensure!(
            width.is_finite() && width >= 1.0 && width <= u32::MAX as Real,
            "tree half-width {width} is not representable (M = {spacing})"
        );
        let j_max = width as Size;

        tracing::debug!(step, spacing, j_max, steps, "hull-white tree layout");
        Ok(TreeLayout {
            step,
            spacing,
            j_max,
            steps,
        })
    }

    /// `Δx = σ·√(3Δt)`.
    fn state_spacing(&self, volatility: Volatility, step: Time) -> Real {
        volatility * (3.0 * step).sqrt()
    }
}

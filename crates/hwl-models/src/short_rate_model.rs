//! Short-rate model trait for trinomial lattices.
//!
//! A one-factor model that can be discretised on a recombining trinomial
//! tree provides two things: the scenario-invariant [`TreeLayout`] (time
//! step, drift-scaling constant `M`, half-width `jMax`) and the spacing of
//! the state ladder for a given volatility.

use hwl_core::errors::Result;
use hwl_core::{Real, Size, Time, Volatility};

/// Scenario-invariant layout of a trinomial short-rate tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeLayout {
    /// Uniform step `Δt = T / N` used for the tree geometry.
    pub step: Time,
    /// Drift-scaling constant `M = -a·Δt` entering the branching
    /// probabilities.
    pub spacing: Real,
    /// Half-width of the tree: rows run from `+jMax` to `-jMax`.
    pub j_max: Size,
    /// Number of time steps `N`.
    pub steps: Size,
}

/// A one-factor short-rate model discretised on a trinomial tree.
pub trait OneFactorTreeModel {
    /// Lay out a tree of `steps` steps up to `maturity` years.
    fn tree_layout(&self, maturity: Time, steps: Size) -> Result<TreeLayout>;

    /// Spacing `Δx` of the state ladder for short-rate volatility
    /// `volatility` and time step `step`.
    fn state_spacing(&self, volatility: Volatility, step: Time) -> Real;
}

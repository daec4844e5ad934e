//! Hull-White trinomial lattice.
//!
//! # Overview
//!
//! * [`LatticeShape`] — rows, columns, populated band and successor rule
//! * [`ProbabilityGrid`] — `pu`, `pm`, `pd` per node, shared by all scenarios
//! * [`CalibratedLattice`] — rates, discounts and state prices fitted to one
//!   scenario's discount curve
//! * [`TimeGrid`] — column lengths and discount times

pub mod calibration;
pub mod geometry;
pub mod probabilities;

pub use calibration::CalibratedLattice;
pub use geometry::{LatticeShape, Successors};
pub use probabilities::ProbabilityGrid;

use hwl_core::errors::{check_len, Result};
use hwl_core::{ensure, Real, Time};
use hwl_math::DayCountBasis;

// ─── TimeGrid ─────────────────────────────────────────────────────────────────

/// Column lengths `dt(c)` and the times `Timevec(c)` at which the scenario
/// zero rates are read, one entry per lattice column.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    dts: Vec<Time>,
    discount_times: Vec<Time>,
}

impl TimeGrid {
    /// Create from explicit column lengths and discount times.
    ///
    /// # Errors
    /// `Shape` if the vectors differ in length; `Precondition` if a column
    /// length is not positive or a discount time is negative.
    pub fn new(dts: Vec<Time>, discount_times: Vec<Time>) -> Result<Self> {
        check_len("discount_times", dts.len(), discount_times.len())?;
        ensure!(!dts.is_empty(), "time grid needs at least one column");
        for (c, &h) in dts.iter().enumerate() {
            ensure!(h > 0.0 && h.is_finite(), "dt({c}) must be positive, got {h}");
        }
        for (c, &t) in discount_times.iter().enumerate() {
            ensure!(
                t >= 0.0 && t.is_finite(),
                "discount time ({c}) must be non-negative, got {t}"
            );
        }
        Ok(Self {
            dts,
            discount_times,
        })
    }

    /// `steps + 1` columns of length `end / steps`; column `c` discounts to
    /// `(c + 1)·Δt`.
    pub fn uniform(end: Time, steps: usize) -> Result<Self> {
        ensure!(steps > 0, "steps must be > 0");
        ensure!(end > 0.0 && end.is_finite(), "end must be positive, got {end}");
        let dt = end / steps as Real;
        let discount_times = (0..=steps).map(|c| (c + 1) as Real * dt).collect();
        Self::new(vec![dt; steps + 1], discount_times)
    }

    /// Columns spanning the cash-flow dates, given as day offsets from the
    /// valuation date, plus one final column of a year after the last cash
    /// flow.
    ///
    /// With year fractions `t_1 < … < t_N`, `dt = [t_1, t_2 - t_1, …,
    /// t_N - t_{N-1}, 1]` and column `c` discounts to `t_{c+1}` (the last
    /// column to `t_N + 1`).
    pub fn from_cash_flow_days(days: &[Real], basis: DayCountBasis) -> Result<Self> {
        ensure!(!days.is_empty(), "at least one cash-flow date is required");
        ensure_increasing_days(days)?;
        ensure!(days[0] > 0.0, "first cash flow must follow the valuation date");

        let mut discount_times: Vec<Time> =
            days.iter().map(|&d| basis.year_fraction(d)).collect();
        let mut dts = Vec::with_capacity(days.len() + 1);
        let mut previous = 0.0;
        for &t in &discount_times {
            dts.push(t - previous);
            previous = t;
        }
        dts.push(1.0);
        discount_times.push(previous + 1.0);
        Self::new(dts, discount_times)
    }

    /// Number of columns (`N + 1`).
    pub fn columns(&self) -> usize {
        self.dts.len()
    }

    /// Number of steps (`N`).
    pub fn steps(&self) -> usize {
        self.dts.len() - 1
    }

    /// Length of column `c`.
    pub fn dt(&self, c: usize) -> Time {
        self.dts[c]
    }

    /// Discount time of column `c`.
    pub fn discount_time(&self, c: usize) -> Time {
        self.discount_times[c]
    }

    /// All column lengths.
    pub fn dts(&self) -> &[Time] {
        &self.dts
    }

    /// All discount times.
    pub fn discount_times(&self) -> &[Time] {
        &self.discount_times
    }
}

/// Check that cash-flow day offsets are finite and strictly increasing.
pub fn ensure_increasing_days(days: &[Real]) -> Result<()> {
    for (i, &d) in days.iter().enumerate() {
        ensure!(d.is_finite(), "cash_flow_days({i}) is not finite");
    }
    for (i, w) in days.windows(2).enumerate() {
        ensure!(
            w[1] > w[0],
            "cash_flow_days must be strictly increasing: day {} ({}) <= day {} ({})",
            i + 1,
            w[1],
            i,
            w[0]
        );
    }
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────

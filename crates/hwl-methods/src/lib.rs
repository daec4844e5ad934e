//! # hwl-methods
//!
//! The trinomial short-rate lattice: its shape and successor rule, the
//! branching probabilities, calibration of the level shifts to a discount
//! curve, and the time grid of column lengths.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Trinomial lattice: geometry, probabilities, calibration, time grid.
pub mod lattice;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use lattice::{
    ensure_increasing_days, CalibratedLattice, LatticeShape, ProbabilityGrid, Successors,
    TimeGrid,
};

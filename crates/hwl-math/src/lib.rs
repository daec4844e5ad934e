//! # hwl-math
//!
//! Mathematical utilities for the lattice engine: the `Matrix` newtype
//! (over nalgebra) that stores lattice quantities, discount-factor
//! conversion and NPV sums, and day-count year fractions.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Day-count bases.
pub mod day_count;

/// Discount factors and net present values.
pub mod discounting;

/// Dense matrix newtype.
pub mod matrix;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use day_count::DayCountBasis;
pub use discounting::{discount_curve, discount_factor, npv};
pub use matrix::Matrix;

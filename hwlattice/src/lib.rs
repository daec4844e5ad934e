//! # hwlattice
//!
//! A calibrated Hull-White one-factor trinomial lattice for pricing coupon
//! bonds and the European or American options embedded in them, across many
//! rate scenarios.
//!
//! This crate is a **façade** that re-exports the workspace crates.
//! Application code should depend on this crate rather than the individual
//! `hwl-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use hwlattice::prelude::*;
//!
//! // Three yearly steps, 10% mean reversion: jMax = 2.
//! let engine = HullWhiteLatticeEngine::new(
//!     0.1,
//!     3.0,
//!     TimeGrid::uniform(3.0, 3).unwrap(),
//!     100.0,
//!     EngineSettings::default(),
//! )
//! .unwrap();
//! assert_eq!(engine.layout().j_max, 2);
//!
//! let scenarios = ScenarioSet::new(
//!     vec![0.01],
//!     Matrix::from_row_slice(1, 4, &[0.03; 4]),
//!     Matrix::from_row_slice(1, 3, &[0.0, 0.0, 100.0]),
//!     Matrix::zeros(1, 3),
//! );
//! let option = BondOption::new(97.0, 2, OptionType::Put, ExerciseStyle::European);
//! let batch = engine.price(&option, &scenarios).unwrap();
//!
//! let value = batch.outcomes[0].value().unwrap();
//! // The lattice reprices the zero-coupon bond exactly.
//! assert!((value.bond_value - 100.0 * (-0.03_f64 * 3.0).exp()).abs() < 1e-10);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, settings, cancellation, and error definitions.
pub use hwl_core as core;

/// Matrices, discounting, and day counts.
pub use hwl_math as math;

/// Short-rate models.
pub use hwl_models as models;

/// The trinomial lattice.
pub use hwl_methods as methods;

/// Bond and bond-option engines and the scenario driver.
pub use hwl_pricingengines as pricingengines;

/// The items most programs need.
pub mod prelude {
    pub use hwl_core::{
        CancellationToken, Compounding, EngineSettings, Error, ExerciseStyle, OptionType, Result,
    };
    pub use hwl_math::{DayCountBasis, Matrix};
    pub use hwl_methods::TimeGrid;
    pub use hwl_pricingengines::{
        BatchStatus, BatchValuation, BondOption, HullWhiteLatticeEngine, ScenarioOutcome,
        ScenarioSet, ScenarioValue,
    };
}

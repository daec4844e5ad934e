//! # hwl-pricingengines
//!
//! Valuation on the calibrated Hull-White lattice.
//!
//! ## Engines
//!
//! - [`bond_lattice`] — bond value process by backward induction
//! - [`european_bond_option`] / [`american_bond_option`] — embedded bond options
//! - [`HullWhiteLatticeEngine`] — scenario driver: one tree layout, many
//!   curves, sequential or on the rayon pool

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bond_lattice_engine;
pub mod bond_option_engine;
pub mod scenario_engine;

pub use bond_lattice_engine::{bond_lattice, BondLattice};
pub use bond_option_engine::{
    american_bond_option, european_bond_option, value_bond_option, BondOption, OptionValuation,
    PutCallPair,
};
pub use scenario_engine::{
    BatchStatus, BatchValuation, HullWhiteLatticeEngine, LatticeDiagnostics, ScenarioOutcome,
    ScenarioSet, ScenarioValue,
};

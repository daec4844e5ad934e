//! # hwl-models
//!
//! Short-rate models discretised on trinomial trees.
//!
//! ```text
//! OneFactorTreeModel
//! └── HullWhite
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod hull_white;
pub mod short_rate_model;

pub use hull_white::HullWhite;
pub use short_rate_model::{OneFactorTreeModel, TreeLayout};

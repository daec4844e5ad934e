//! # hwl-core
//!
//! Core types, settings, and error definitions for hwlattice.
//!
//! This crate provides the foundational building blocks shared across all
//! other crates in the workspace – type aliases, the error hierarchy, the
//! option/compounding enums, [`EngineSettings`], and the
//! [`CancellationToken`] used by scenario sweeps.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Cooperative cancellation flag.
pub mod cancellation;

/// Compounding conventions.
pub mod compounding;

/// Error types and the `ensure!` / `ensure_post!` macros.
pub mod errors;

/// Option type and exercise style.
pub mod option;

/// Engine settings.
pub mod settings;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;

/// A rate expressed as a decimal (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A discount factor in (0, 1].
pub type DiscountFactor = Real;

/// A price or value.
pub type Price = Real;

/// A volatility level expressed as a decimal.
pub type Volatility = Real;

/// A time measurement in years.
pub type Time = Real;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use cancellation::CancellationToken;
pub use compounding::Compounding;
pub use errors::{Error, Result};
pub use option::{ExerciseStyle, OptionType};
pub use settings::EngineSettings;

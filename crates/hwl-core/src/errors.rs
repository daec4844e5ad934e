//! Error types for hwlattice.
//!
//! A single `thiserror`-derived enum covers the three failure classes of the
//! lattice engine: caller contract violations (bad shapes, out-of-range
//! indices), numerical degeneration inside a scenario, and cooperative
//! cancellation. The `ensure!` and `ensure_post!` macros build the
//! precondition and postcondition variants.

use thiserror::Error;

/// The top-level error type used throughout hwlattice.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Precondition violated by the caller.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated by a computation.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// An input vector or matrix does not have the dimension the lattice needs.
    #[error("{parameter}: expected {expected} entries, found {found}")]
    Shape {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Required length.
        expected: usize,
        /// Supplied length.
        found: usize,
    },

    /// Index out of range.
    #[error("{parameter}: index ({index}) out of range [0, {size})")]
    IndexOutOfRange {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// The index that was out of range.
        index: usize,
        /// The size of the container.
        size: usize,
    },

    /// A numerical quantity degenerated (e.g. a non-positive argument to a
    /// logarithm while solving a level shift).
    #[error("degenerate numerics: {0}")]
    Degenerate(String),

    /// The computation was cancelled through a
    /// [`CancellationToken`](crate::CancellationToken).
    #[error("computation cancelled")]
    Cancelled,
}

impl Error {
    /// `true` for errors caused by the caller's inputs: shapes, indices and
    /// preconditions. These abort a whole batch.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::Precondition(_) | Error::Shape { .. } | Error::IndexOutOfRange { .. }
        )
    }

    /// `true` for numerical failures confined to a single scenario: a
    /// degenerate quantity or a calibrated column that misses its price.
    pub fn is_numerical(&self) -> bool {
        matches!(self, Error::Degenerate(_) | Error::Postcondition(_))
    }
}

/// Shorthand `Result` type used throughout hwlattice.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Check that `found == expected`, naming `parameter` in the error.
///
/// # Example
/// ```
/// use hwl_core::errors::{check_len, Error};
/// assert!(check_len("dt", 4, 4).is_ok());
/// assert_eq!(
///     check_len("dt", 4, 3),
///     Err(Error::Shape { parameter: "dt", expected: 4, found: 3 })
/// );
/// ```
pub fn check_len(parameter: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::Shape {
            parameter,
            expected,
            found,
        })
    }
}

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use hwl_core::{ensure, errors::Error};
/// fn positive(x: f64) -> hwl_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use hwl_core::{ensure_post, errors::Error};
/// fn compute(x: f64) -> hwl_core::errors::Result<f64> {
///     let result = x * 2.0;
///     ensure_post!(result > 0.0, "result must be positive, got {result}");
///     Ok(result)
/// }
/// assert!(compute(1.0).is_ok());
/// assert!(compute(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

//! European and American options on the lattice bond.
//!
//! The exercise value at node `(row, c)` is measured against the bond value
//! `B(row, c)` adjusted for accrued interest: `B - K - accr` for a call and
//! `K - B + accr` for a put. Accrued interest is aligned with the cash flows,
//! so column `c >= 1` uses `accrued[c - 1]` and the root uses zero.

use hwl_core::errors::{check_len, Error, Result};
use hwl_core::{ensure, CancellationToken, ExerciseStyle, OptionType, Price, Real, Size};
use hwl_math::Matrix;
use hwl_methods::CalibratedLattice;
use serde::{Deserialize, Serialize};

use crate::bond_lattice_engine::BondLattice;

/// An option on the bond, exercisable at (or, for American style, up to)
/// lattice column `exercise_column`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BondOption {
    /// Strike price.
    pub strike: Price,
    /// Exercise (maturity) column of the option, `0 ..= N`.
    pub exercise_column: Size,
    /// Call or put.
    pub option_type: OptionType,
    /// European or American.
    pub exercise: ExerciseStyle,
}

impl BondOption {
    /// Create an option.
    pub fn new(
        strike: Price,
        exercise_column: Size,
        option_type: OptionType,
        exercise: ExerciseStyle,
    ) -> Self {
        Self {
            strike,
            exercise_column,
            option_type,
            exercise,
        }
    }

    /// Check the option against a lattice of `steps` steps.
    pub fn validate(&self, steps: Size) -> Result<()> {
        ensure!(
            self.strike.is_finite(),
            "strike must be finite, got {}",
            self.strike
        );
        if self.exercise_column > steps {
            return Err(Error::IndexOutOfRange {
                parameter: "exercise_column",
                index: self.exercise_column,
                size: steps + 1,
            });
        }
        Ok(())
    }
}

/// Put and call values on the same strike and exercise column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PutCallPair {
    /// Put value.
    pub put: Price,
    /// Call value.
    pub call: Price,
}

impl PutCallPair {
    /// Value of the `option_type` side.
    pub fn get(&self, option_type: OptionType) -> Price {
        match option_type {
            OptionType::Call => self.call,
            OptionType::Put => self.put,
        }
    }
}

/// Result of valuing a [`BondOption`].
#[derive(Debug, Clone, PartialEq)]
pub struct OptionValuation {
    /// Value of the requested option.
    pub value: Price,
    /// Put and call values, for European options.
    pub paired: Option<PutCallPair>,
}

#[inline]
fn accrued_at(accrued: &[Real], col: usize) -> Real {
    if col == 0 {
        0.0
    } else {
        accrued[col - 1]
    }
}

fn check_inputs(
    lattice: &CalibratedLattice<'_>,
    option: &BondOption,
    accrued: &[Real],
) -> Result<()> {
    let steps = lattice.shape().steps();
    option.validate(steps)?;
    check_len("accrued_interest", steps, accrued.len())?;
    for (k, a) in accrued.iter().enumerate() {
        ensure!(a.is_finite(), "accrued_interest({k}) is not finite");
    }
    Ok(())
}

/// European put and call struck at `strike`, exercisable at
/// `exercise_column`.
///
/// Both values are `Σ Q(row, c)·max(intrinsic, 0)` over the exercise column.
/// At every node at most one of the two payoffs is positive.
pub fn european_bond_option(
    lattice: &CalibratedLattice<'_>,
    bond: &BondLattice,
    strike: Price,
    exercise_column: Size,
    accrued: &[Real],
) -> Result<PutCallPair> {
    let probe = BondOption::new(strike, exercise_column, OptionType::Call, ExerciseStyle::European);
    check_inputs(lattice, &probe, accrued)?;

    let col = exercise_column;
    let accr = accrued_at(accrued, col);
    let q = lattice.state_prices();
    let mut pair = PutCallPair { put: 0.0, call: 0.0 };
    for row in lattice.shape().populated_rows(col) {
        let b = bond.price_at(row, col);
        pair.call += q[(row, col)] * OptionType::Call.intrinsic(b, strike, accr).max(0.0);
        pair.put += q[(row, col)] * OptionType::Put.intrinsic(b, strike, accr).max(0.0);
    }
    Ok(pair)
}

/// American option value process, rolled back from the exercise column.
///
/// Returns the value matrix; columns past `exercise_column` are zero. The
/// price is the root entry.
pub fn american_bond_option(
    lattice: &CalibratedLattice<'_>,
    bond: &BondLattice,
    option: &BondOption,
    accrued: &[Real],
    token: &CancellationToken,
) -> Result<Matrix> {
    check_inputs(lattice, option, accrued)?;
    let shape = lattice.shape();
    let (strike, kind) = (option.strike, option.option_type);
    let exercise = |row: usize, col: usize| {
        kind.intrinsic(bond.price_at(row, col), strike, accrued_at(accrued, col))
            .max(0.0)
    };

    let mat = option.exercise_column;
    let mut values = Matrix::zeros(shape.rows(), shape.columns());
    for row in shape.populated_rows(mat) {
        values[(row, mat)] = exercise(row, mat);
    }
    for col in (0..mat).rev() {
        token.check()?;
        for row in shape.populated_rows(col) {
            let hold = lattice.continuation(&values, row, col);
            values[(row, col)] = hold.max(exercise(row, col));
        }
    }
    Ok(values)
}

/// Value `option` on the bond lattice.
///
/// # Errors
/// * `IndexOutOfRange` if the exercise column is past the last column.
/// * `Shape` if `accrued` does not have `N` entries.
/// * `Cancelled` if `token` is cancelled during the American rollback.
pub fn value_bond_option(
    lattice: &CalibratedLattice<'_>,
    bond: &BondLattice,
    option: &BondOption,
    accrued: &[Real],
    token: &CancellationToken,
) -> Result<OptionValuation> {
    match option.exercise {
        ExerciseStyle::European => {
            let pair = european_bond_option(
                lattice,
                bond,
                option.strike,
                option.exercise_column,
                accrued,
            )?;
            Ok(OptionValuation {
                value: pair.get(option.option_type),
                paired: Some(pair),
            })
        }
        ExerciseStyle::American => {
            let values = american_bond_option(lattice, bond, option, accrued, token)?;
            Ok(OptionValuation {
                value: values[(lattice.shape().center(), 0)],
                paired: None,
            })
        }
    }
}

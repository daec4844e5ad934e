//! Option type and exercise style of an embedded bond option.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Price, Real};

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    /// Right to buy the bond at the strike.
    Call,
    /// Right to sell the bond at the strike.
    Put,
}

impl OptionType {
    /// Return the payoff sign (+1 for Call, -1 for Put).
    pub fn sign(&self) -> Real {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// Exercise value of the option against a bond value `bond`, strike
    /// `strike` and accrued interest `accrued`, not floored.
    ///
    /// Call: `bond - strike - accrued`; put: `strike - bond + accrued`.
    #[inline]
    pub fn intrinsic(&self, bond: Price, strike: Price, accrued: Price) -> Price {
        self.sign() * (bond - strike - accrued)
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

/// When the option may be exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseStyle {
    /// Exercise only at the exercise column.
    European,
    /// Exercise at any column up to and including the exercise column.
    American,
}

impl fmt::Display for ExerciseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseStyle::European => write!(f, "European"),
            ExerciseStyle::American => write!(f, "American"),
        }
    }
}

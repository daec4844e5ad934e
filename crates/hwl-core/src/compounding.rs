//! Compounding conventions used to turn scenario zero rates into discount
//! factors.

use serde::{Deserialize, Serialize};

/// How interest is compounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compounding {
    /// Simple interest: `1 + r·t`
    Simple,
    /// Discretely compounded interest: `(1 + r/f)^(f·t)`
    Compounded,
    /// Continuously compounded: `e^(r·t)`
    #[default]
    Continuous,
}

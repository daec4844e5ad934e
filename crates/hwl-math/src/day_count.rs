//! Day-count bases for turning day offsets into year fractions.

use hwl_core::{Real, Time};
use serde::{Deserialize, Serialize};

/// Day-count basis for offsets measured in calendar days from the
/// valuation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayCountBasis {
    /// Actual/365 (Fixed).
    #[default]
    Actual365Fixed,
    /// Actual/360.
    Actual360,
    /// Actual/365.25.
    Actual36525,
}

impl DayCountBasis {
    /// Days per year under this basis.
    pub fn days_per_year(&self) -> Real {
        match self {
            DayCountBasis::Actual365Fixed => 365.0,
            DayCountBasis::Actual360 => 360.0,
            DayCountBasis::Actual36525 => 365.25,
        }
    }

    /// Year fraction of `days` calendar days.
    #[inline]
    pub fn year_fraction(&self, days: Real) -> Time {
        days / self.days_per_year()
    }
}

//! Discount factors from zero rates, and net present values.
//!
//! Scenario curves arrive as zero rates per lattice column; the calibrator
//! needs discount factors. [`discount_factor`] performs the conversion under
//! a [`Compounding`] convention and [`npv`] sums discounted cash flows.

use hwl_core::errors::{check_len, Result};
use hwl_core::{Compounding, DiscountFactor, Rate, Real, Time};

/// Discount factor for a zero rate `rate` over `t` years.
///
/// * `Simple` — `1 / (1 + r·t)`
/// * `Compounded` — `(1 + r/f)^(-f·t)` with `f = frequency`
/// * `Continuous` — `exp(-r·t)`
///
/// # Errors
/// `Precondition` if `t` is negative or not finite, if the frequency is zero
/// for discrete compounding, or if the compound factor is not positive.
pub fn discount_factor(
    rate: Rate,
    t: Time,
    compounding: Compounding,
    frequency: u32,
) -> Result<DiscountFactor> {
    hwl_core::ensure!(t >= 0.0 && t.is_finite(), "invalid time ({t}) for discounting");
    hwl_core::ensure!(rate.is_finite(), "invalid rate ({rate}) for discounting");
    let df = match compounding {
        Compounding::Simple => {
            let factor = 1.0 + rate * t;
            hwl_core::ensure!(factor > 0.0, "negative compound factor for rate {rate}, t {t}");
            1.0 / factor
        }
        Compounding::Compounded => {
            hwl_core::ensure!(frequency > 0, "compounding frequency must be positive");
            let f = frequency as Real;
            let base = 1.0 + rate / f;
            hwl_core::ensure!(base > 0.0, "negative compound factor for rate {rate}");
            base.powf(-f * t)
        }
        Compounding::Continuous => (-rate * t).exp(),
    };
    Ok(df)
}

/// Discount factors for a whole curve, one per `(rate, time)` pair.
pub fn discount_curve(
    rates: &[Rate],
    times: &[Time],
    compounding: Compounding,
    frequency: u32,
) -> Result<Vec<DiscountFactor>> {
    check_len("discount_times", rates.len(), times.len())?;
    rates
        .iter()
        .zip(times)
        .map(|(&r, &t)| discount_factor(r, t, compounding, frequency))
        .collect()
}

/// Net present value `Σ values[i] · dfs[i]`.
pub fn npv(values: &[Real], dfs: &[DiscountFactor]) -> Result<Real> {
    check_len("discount_factors", values.len(), dfs.len())?;
    Ok(values.iter().zip(dfs).map(|(v, df)| v * df).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn continuous_discount() {
        let df = discount_factor(0.05, 2.0, Compounding::Continuous, 1).unwrap();
        assert_relative_eq!(df, (-0.1_f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn simple_discount() {
        let df = discount_factor(0.05, 1.0, Compounding::Simple, 1).unwrap();
        assert_relative_eq!(df, 1.0 / 1.05, epsilon = 1e-15);
    }

    #[test]
    fn semiannual_discount() {
        // (1 + 0.10/2)^(-2) = 1 / 1.1025
        let df = discount_factor(0.10, 1.0, Compounding::Compounded, 2).unwrap();
        assert_relative_eq!(df, 1.0 / 1.1025, epsilon = 1e-14);
    }

    #[test]
    fn zero_time_is_par() {
        for comp in [Compounding::Simple, Compounding::Compounded, Compounding::Continuous] {
            assert_eq!(discount_factor(0.07, 0.0, comp, 4).unwrap(), 1.0);
        }
    }

    #[test]
    fn rejects_negative_time_and_bad_factor() {
        assert!(discount_factor(0.05, -1.0, Compounding::Continuous, 1).is_err());
        assert!(discount_factor(-2.0, 1.0, Compounding::Simple, 1).is_err());
        assert!(discount_factor(0.05, 1.0, Compounding::Compounded, 0).is_err());
    }

    #[test]
    fn curve_requires_matching_lengths() {
        let err = discount_curve(&[0.01, 0.02], &[1.0], Compounding::Continuous, 1).unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn npv_of_coupon_strip() {
        let v = npv(&[2.0, 2.0, 102.0], &[0.99, 0.98, 0.97]).unwrap();
        assert_relative_eq!(v, 2.0 * 0.99 + 2.0 * 0.98 + 102.0 * 0.97, epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn equivalent_rates_give_the_same_discount_factor(
            r in -0.05f64..0.20,
            t in 0.0f64..30.0,
            frequency in 1u32..13,
        ) {
            let f = frequency as Real;
            let discrete = f * ((r / f).exp() - 1.0);
            let df = discount_factor(discrete, t, Compounding::Compounded, frequency).unwrap();
            let expected = (-r * t).exp();
            prop_assert!((df - expected).abs() <= 1e-12 * expected.max(1.0));
        }
    }
}

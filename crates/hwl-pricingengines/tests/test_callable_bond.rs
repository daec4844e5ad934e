//! End-to-end valuation of an option on a coupon bond across rate scenarios.
//!
//! The bond pays a 2.0 coupon every half year for five years, with the
//! principal of 100 in the last payment. The curve is
//! `R(c) = 2% + 0.2%·c + shift` on a semi-annual grid, mean reversion is 10%
//! (so `jMax = 4`) and the option is exercisable at column 6.

use approx::assert_abs_diff_eq;
use hwl_core::{
    CancellationToken, Compounding, EngineSettings, Error, ExerciseStyle, OptionType, Real,
};
use hwl_math::Matrix;
use hwl_methods::TimeGrid;
use hwl_pricingengines::{
    BatchStatus, BondOption, HullWhiteLatticeEngine, ScenarioOutcome, ScenarioSet,
};

const STEPS: usize = 10;

fn engine(settings: EngineSettings) -> HullWhiteLatticeEngine {
    HullWhiteLatticeEngine::new(0.1, 5.0, TimeGrid::uniform(5.0, STEPS).unwrap(), 100.0, settings)
        .unwrap()
}

fn curve(shift: Real) -> Vec<Real> {
    (0..=STEPS).map(|c| 0.02 + 0.002 * c as Real + shift).collect()
}

fn cash_flows() -> Vec<Real> {
    let mut cf = vec![2.0; STEPS];
    cf[STEPS - 1] = 102.0;
    cf
}

/// Two scenarios: (σ = 1.2%, no shift) and (σ = 2%, +50bp).
fn two_scenarios() -> ScenarioSet {
    ScenarioSet::new(
        vec![0.012, 0.02],
        Matrix::from_rows(&[curve(0.0), curve(0.005)]).unwrap(),
        Matrix::from_row_slice(1, STEPS, &cash_flows()),
        Matrix::from_element(1, STEPS, 0.5),
    )
}

fn option(strike: Real, kind: OptionType, exercise: ExerciseStyle) -> BondOption {
    BondOption::new(strike, 6, kind, exercise)
}

fn values(batch: &hwl_pricingengines::BatchValuation) -> Vec<Real> {
    batch
        .option_values()
        .into_iter()
        .map(|v| v.expect("scenario priced"))
        .collect()
}

#[test]
fn layout_from_mean_reversion() {
    let e = engine(EngineSettings::default());
    assert_eq!(e.layout().j_max, 4);
    assert_abs_diff_eq!(e.layout().step, 0.5, epsilon = 1e-15);
    assert_abs_diff_eq!(e.layout().spacing, -0.05, epsilon = 1e-15);
}

#[test]
fn bond_value_equals_discounted_cash_flows() {
    let batch = engine(EngineSettings::default())
        .price(
            &option(100.0, OptionType::Put, ExerciseStyle::European),
            &two_scenarios(),
        )
        .unwrap();
    assert_eq!(batch.status, BatchStatus::Completed);

    let expected = [101.041_656_319_889, 98.757_235_222_147];
    for (outcome, want) in batch.outcomes.iter().zip(expected) {
        let v = outcome.value().unwrap();
        assert_abs_diff_eq!(v.bond_value, want, epsilon = 1e-9);
        assert_abs_diff_eq!(v.bond_value, v.cash_flow_npv, epsilon = 1e-9);
    }
}

#[test]
fn option_values_match_reference() {
    use ExerciseStyle::{American, European};
    use OptionType::{Call, Put};

    // (type, strike, [European s0, s1], [American s0, s1])
    let cases = [
        (
            Put,
            100.0,
            [1.424_044_798_039, 2.697_801_163_807],
            [2.017_740_683_108, 4.228_329_188_932],
        ),
        (
            Put,
            101.0,
            [2.018_875_166_332, 3.278_549_410_932],
            [2.656_041_877_806, 4.903_889_080_323],
        ),
        (
            Call,
            100.0,
            [0.986_310_900_105, 1.414_290_024_520],
            [2.397_166_157_637, 2.889_828_606_170],
        ),
        (
            Call,
            101.0,
            [0.667_210_083_126, 1.094_713_749_060],
            [1.910_516_265_565, 2.406_761_378_886],
        ),
    ];
    let e = engine(EngineSettings::default());
    let set = two_scenarios();
    for (kind, strike, european, american) in cases {
        let eu = values(&e.price(&option(strike, kind, European), &set).unwrap());
        let am = values(&e.price(&option(strike, kind, American), &set).unwrap());
        for s in 0..2 {
            assert_abs_diff_eq!(eu[s], european[s], epsilon = 1e-9);
            assert_abs_diff_eq!(am[s], american[s], epsilon = 1e-9);
            assert!(am[s] >= eu[s]);
        }
    }
}

#[test]
fn european_run_reports_both_sides() {
    let e = engine(EngineSettings::default());
    let batch = e
        .price(&option(101.0, OptionType::Call, ExerciseStyle::European), &two_scenarios())
        .unwrap();
    let pair = batch.outcomes[0].value().unwrap().paired.unwrap();
    assert_abs_diff_eq!(pair.call, 0.667_210_083_126, epsilon = 1e-9);
    assert_abs_diff_eq!(pair.put, 2.018_875_166_332, epsilon = 1e-9);

    let american = e
        .price(&option(101.0, OptionType::Call, ExerciseStyle::American), &two_scenarios())
        .unwrap();
    assert!(american.outcomes[0].value().unwrap().paired.is_none());
}

#[test]
fn scenarios_are_independent() {
    let e = engine(EngineSettings::default());
    let opt = option(100.0, OptionType::Put, ExerciseStyle::American);
    let batch = e.price(&opt, &two_scenarios()).unwrap();

    let alone = ScenarioSet::new(
        vec![0.02],
        Matrix::from_row_slice(1, STEPS + 1, &curve(0.005)),
        Matrix::from_row_slice(1, STEPS, &cash_flows()),
        Matrix::from_element(1, STEPS, 0.5),
    );
    let single = e.price(&opt, &alone).unwrap();
    assert_eq!(single.outcomes[0], batch.outcomes[1]);
}

#[test]
fn parallel_matches_sequential() {
    let opt = option(100.0, OptionType::Call, ExerciseStyle::American);
    let vols: Vec<Real> = (0..16).map(|s| 0.005 + 0.001 * s as Real).collect();
    let set = ScenarioSet::new(
        vols,
        Matrix::from_row_slice(1, STEPS + 1, &curve(0.0)),
        Matrix::from_row_slice(1, STEPS, &cash_flows()),
        Matrix::from_element(1, STEPS, 0.5),
    );
    let sequential = engine(EngineSettings::default()).price(&opt, &set).unwrap();
    let parallel = engine(EngineSettings::default().with_parallel(true))
        .price(&opt, &set)
        .unwrap();
    assert_eq!(sequential.outcomes, parallel.outcomes);
    assert_eq!(parallel.priced(), 16);
    assert!(parallel.diagnostics.is_some());
}

#[test]
fn degenerate_scenario_does_not_stop_the_batch() {
    let mut rates = curve(0.0);
    rates.extend(vec![800.0; STEPS + 1]);
    rates.extend(curve(0.005));
    let set = ScenarioSet::new(
        vec![0.012],
        Matrix::from_row_slice(3, STEPS + 1, &rates),
        Matrix::from_row_slice(1, STEPS, &cash_flows()),
        Matrix::from_element(1, STEPS, 0.5),
    );
    let batch = engine(EngineSettings::default())
        .price(&option(100.0, OptionType::Put, ExerciseStyle::European), &set)
        .unwrap();

    assert_eq!(batch.status, BatchStatus::Completed);
    assert_eq!(batch.priced(), 2);
    let failures = batch.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, 1);
    assert!(failures[0].1.is_numerical());
}

#[test]
fn cancellation_keeps_finished_scenarios() {
    let set = ScenarioSet::new(
        vec![0.01, 0.011, 0.012, 0.013, 0.014],
        Matrix::from_row_slice(1, STEPS + 1, &curve(0.0)),
        Matrix::from_row_slice(1, STEPS, &cash_flows()),
        Matrix::from_element(1, STEPS, 0.5),
    );
    let token = CancellationToken::new();
    let batch = engine(EngineSettings::default())
        .price_with_progress(
            &option(100.0, OptionType::Put, ExerciseStyle::American),
            &set,
            &token,
            |s| {
                if s == 1 {
                    token.cancel();
                }
            },
        )
        .unwrap();

    assert_eq!(batch.status, BatchStatus::Cancelled);
    assert!(batch.outcomes[0].value().is_some());
    assert!(batch.outcomes[1].value().is_some());
    for outcome in &batch.outcomes[2..] {
        assert_eq!(*outcome, ScenarioOutcome::Skipped);
    }
}

#[test]
fn cancelled_token_skips_everything() {
    let token = CancellationToken::new();
    token.cancel();
    let batch = engine(EngineSettings::default())
        .price_with_cancellation(
            &option(100.0, OptionType::Put, ExerciseStyle::American),
            &two_scenarios(),
            &token,
        )
        .unwrap();
    assert_eq!(batch.status, BatchStatus::Cancelled);
    assert_eq!(batch.priced(), 0);
    assert!(batch.diagnostics.is_none());
}

#[test]
fn discrete_compounding_with_equivalent_rates() {
    let frequency = 2;
    let f = frequency as Real;
    let continuous = curve(0.0);
    let discrete: Vec<Real> = continuous.iter().map(|r| f * ((r / f).exp() - 1.0)).collect();

    let opt = option(100.0, OptionType::Call, ExerciseStyle::American);
    let set = |rates: &[Real]| {
        ScenarioSet::new(
            vec![0.012],
            Matrix::from_row_slice(1, STEPS + 1, rates),
            Matrix::from_row_slice(1, STEPS, &cash_flows()),
            Matrix::from_element(1, STEPS, 0.5),
        )
    };
    let a = values(&engine(EngineSettings::default()).price(&opt, &set(&continuous)).unwrap());
    let b = values(
        &engine(EngineSettings::default().with_compounding(Compounding::Compounded, frequency))
            .price(&opt, &set(&discrete))
            .unwrap(),
    );
    assert_abs_diff_eq!(a[0], b[0], epsilon = 1e-9);
    assert_abs_diff_eq!(a[0], 2.397_166_157_637, epsilon = 1e-9);
}

#[test]
fn diagnostics_describe_the_first_scenario() {
    let batch = engine(EngineSettings::default())
        .price(
            &option(100.0, OptionType::Put, ExerciseStyle::European),
            &two_scenarios(),
        )
        .unwrap();
    let diag = batch.diagnostics.unwrap();
    assert_eq!(diag.bond_prices.rows(), 9);
    assert_eq!(diag.bond_prices.cols(), STEPS + 1);
    assert_abs_diff_eq!(diag.bond_prices[(4, 0)], 101.041_656_319_889, epsilon = 1e-9);
    assert_eq!(diag.shifts.len(), STEPS + 1);
    assert_abs_diff_eq!(diag.interest_flows[STEPS], 2.0, epsilon = 1e-12);
    assert_eq!(diag.bond_prices[(0, STEPS)], 102.0);
    for col in 0..=STEPS {
        let total = diag.up[(4, col)] + diag.mid[(4, col)] + diag.down[(4, col)];
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
    }
    assert_eq!(diag.state_prices[(4, 0)], 1.0);
}

#[test]
fn shape_errors_abort_before_pricing() {
    let set = ScenarioSet::new(
        vec![0.01, 0.02],
        Matrix::from_element(2, STEPS + 1, 0.03),
        Matrix::from_row_slice(1, STEPS, &cash_flows()),
        Matrix::from_element(3, STEPS, 0.5),
    );
    let err = engine(EngineSettings::default())
        .price(&option(100.0, OptionType::Put, ExerciseStyle::European), &set)
        .unwrap_err();
    assert!(err.is_contract_violation());
    assert!(matches!(err, Error::Shape { .. }));
}

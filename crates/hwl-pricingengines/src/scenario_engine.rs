//! Scenario driver for the Hull-White lattice.
//!
//! A batch shares one tree layout and one [`ProbabilityGrid`]; each scenario
//! supplies its own volatility, zero-rate curve, cash flows and accrued
//! interest. Every per-scenario input is a matrix with either one row per
//! scenario or a single row that is broadcast to all scenarios.
//!
//! Shape and range problems abort the whole batch before any lattice work.
//! Numerical failure inside a scenario is recorded as that scenario's
//! [`ScenarioOutcome::Failed`] and the other scenarios carry on.

use hwl_core::errors::{check_len, Error, Result};
use hwl_core::{
    ensure, CancellationToken, EngineSettings, Price, Rate, Real, Size, Time, Volatility,
};
use hwl_math::{discount_curve, npv, Matrix};
use hwl_methods::{ensure_increasing_days, CalibratedLattice, ProbabilityGrid, TimeGrid};
use hwl_models::{HullWhite, OneFactorTreeModel, TreeLayout};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::bond_lattice_engine::{bond_lattice, BondLattice};
use crate::bond_option_engine::{value_bond_option, BondOption, PutCallPair};

// ─── Inputs ───────────────────────────────────────────────────────────────────

/// Per-scenario market data and bond schedule.
#[derive(Debug, Clone)]
pub struct ScenarioSet {
    volatilities: Vec<Volatility>,
    rates: Matrix,
    cash_flows: Matrix,
    accrued_interest: Matrix,
}

fn broadcast_row(m: &Matrix, scenario: usize) -> Vec<Real> {
    m.row(if m.rows() == 1 { 0 } else { scenario })
}

fn check_rows(parameter: &'static str, scenarios: usize, rows: usize) -> Result<()> {
    if rows == 1 {
        Ok(())
    } else {
        check_len(parameter, scenarios, rows)
    }
}

fn ensure_finite(parameter: &str, m: &Matrix) -> Result<()> {
    ensure!(
        m.inner().iter().all(|v| v.is_finite()),
        "{parameter} contains non-finite values"
    );
    Ok(())
}

impl ScenarioSet {
    /// Assemble a scenario set.
    ///
    /// * `volatilities` — short-rate volatility per scenario
    /// * `rates` — zero rates, `N + 1` columns
    /// * `cash_flows` — bond cash flows, `N` columns, principal in the last
    /// * `accrued_interest` — accrued interest, `N` columns
    pub fn new(
        volatilities: Vec<Volatility>,
        rates: Matrix,
        cash_flows: Matrix,
        accrued_interest: Matrix,
    ) -> Self {
        Self {
            volatilities,
            rates,
            cash_flows,
            accrued_interest,
        }
    }

    /// Number of scenarios: the largest row count among the inputs.
    pub fn scenario_count(&self) -> usize {
        self.volatilities
            .len()
            .max(self.rates.rows())
            .max(self.cash_flows.rows())
            .max(self.accrued_interest.rows())
    }

    /// Check every input against a lattice of `steps` steps and return the
    /// scenario count.
    pub fn validate(&self, steps: Size) -> Result<usize> {
        let count = self.scenario_count();
        ensure!(count > 0, "scenario set is empty");

        check_rows("volatilities", count, self.volatilities.len())?;
        check_rows("rates.rows", count, self.rates.rows())?;
        check_rows("cash_flows.rows", count, self.cash_flows.rows())?;
        check_rows("accrued_interest.rows", count, self.accrued_interest.rows())?;

        check_len("rates.cols", steps + 1, self.rates.cols())?;
        check_len("cash_flows.cols", steps, self.cash_flows.cols())?;
        check_len("accrued_interest.cols", steps, self.accrued_interest.cols())?;

        for (s, &sigma) in self.volatilities.iter().enumerate() {
            ensure!(
                sigma >= 0.0 && sigma.is_finite(),
                "volatilities({s}) must be non-negative, got {sigma}"
            );
        }
        ensure_finite("rates", &self.rates)?;
        ensure_finite("cash_flows", &self.cash_flows)?;
        ensure_finite("accrued_interest", &self.accrued_interest)?;
        Ok(count)
    }

    /// Volatility of scenario `scenario`.
    pub fn volatility(&self, scenario: usize) -> Volatility {
        if self.volatilities.len() == 1 {
            self.volatilities[0]
        } else {
            self.volatilities[scenario]
        }
    }

    /// Zero rates of scenario `scenario`.
    pub fn rates(&self, scenario: usize) -> Vec<Rate> {
        broadcast_row(&self.rates, scenario)
    }

    /// Cash flows of scenario `scenario`.
    pub fn cash_flows(&self, scenario: usize) -> Vec<Real> {
        broadcast_row(&self.cash_flows, scenario)
    }

    /// Accrued interest of scenario `scenario`.
    pub fn accrued_interest(&self, scenario: usize) -> Vec<Real> {
        broadcast_row(&self.accrued_interest, scenario)
    }
}

// ─── Outputs ──────────────────────────────────────────────────────────────────

/// Values produced by one priced scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioValue {
    /// Value of the requested option.
    pub option_value: Price,
    /// Lattice value of the bond at the root.
    pub bond_value: Price,
    /// `Σ cf[k]·P(k)` from the scenario discount curve.
    pub cash_flow_npv: Price,
    /// Put and call values, for European options.
    pub paired: Option<PutCallPair>,
}

/// What happened to one scenario.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioOutcome {
    /// The scenario was priced.
    Priced(ScenarioValue),
    /// The scenario's numerics degenerated.
    Failed(Error),
    /// The batch was cancelled before the scenario finished.
    Skipped,
}

impl ScenarioOutcome {
    /// The priced values, if any.
    pub fn value(&self) -> Option<&ScenarioValue> {
        match self {
            ScenarioOutcome::Priced(v) => Some(v),
            _ => None,
        }
    }
}

/// Whether a batch ran to the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    /// Every scenario was attempted.
    Completed,
    /// Cancellation left some scenarios unpriced.
    Cancelled,
}

/// Full lattices of the first scenario.
#[derive(Debug, Clone)]
pub struct LatticeDiagnostics {
    /// Bond prices `B`.
    pub bond_prices: Matrix,
    /// Interest-only cash flows per column.
    pub interest_flows: Vec<Real>,
    /// Short rates `r`.
    pub rates: Matrix,
    /// Arrow-Debreu state prices `Q`.
    pub state_prices: Matrix,
    /// Up probabilities.
    pub up: Matrix,
    /// Middle probabilities.
    pub mid: Matrix,
    /// Down probabilities.
    pub down: Matrix,
    /// Level shifts `a`.
    pub shifts: Vec<Real>,
}

impl LatticeDiagnostics {
    fn capture(lattice: &CalibratedLattice<'_>, bond: &BondLattice) -> Self {
        let grid = lattice.grid();
        Self {
            bond_prices: bond.prices().clone(),
            interest_flows: bond.interest_flows().to_vec(),
            rates: lattice.rates().clone(),
            state_prices: lattice.state_prices().clone(),
            up: grid.up().clone(),
            mid: grid.mid().clone(),
            down: grid.down().clone(),
            shifts: lattice.shifts().to_vec(),
        }
    }
}

/// Result of a batch.
#[derive(Debug, Clone)]
pub struct BatchValuation {
    /// One outcome per scenario, in scenario order.
    pub outcomes: Vec<ScenarioOutcome>,
    /// Completion status.
    pub status: BatchStatus,
    /// Tree layout shared by all scenarios.
    pub layout: TreeLayout,
    /// First-scenario lattices, when retained and that scenario was priced.
    pub diagnostics: Option<LatticeDiagnostics>,
}

impl BatchValuation {
    /// Option value per scenario, `None` where the scenario was not priced.
    pub fn option_values(&self) -> Vec<Option<Price>> {
        self.outcomes
            .iter()
            .map(|o| o.value().map(|v| v.option_value))
            .collect()
    }

    /// Number of priced scenarios.
    pub fn priced(&self) -> usize {
        self.outcomes.iter().filter(|o| o.value().is_some()).count()
    }

    /// Indices and errors of failed scenarios.
    pub fn failures(&self) -> Vec<(usize, &Error)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(s, o)| match o {
                ScenarioOutcome::Failed(e) => Some((s, e)),
                _ => None,
            })
            .collect()
    }
}

// ─── Engine ───────────────────────────────────────────────────────────────────

/// Prices a bond option across scenarios on a calibrated Hull-White lattice.
///
/// # Example
/// ```
/// use hwl_core::{EngineSettings, ExerciseStyle, OptionType};
/// use hwl_math::Matrix;
/// use hwl_methods::TimeGrid;
/// use hwl_pricingengines::{BondOption, HullWhiteLatticeEngine, ScenarioSet};
///
/// let grid = TimeGrid::uniform(3.0, 3).unwrap();
/// let engine =
///     HullWhiteLatticeEngine::new(0.1, 3.0, grid, 100.0, EngineSettings::default()).unwrap();
/// let scenarios = ScenarioSet::new(
///     vec![0.01],
///     Matrix::from_row_slice(1, 4, &[0.03; 4]),
///     Matrix::from_row_slice(1, 3, &[0.0, 0.0, 100.0]),
///     Matrix::zeros(1, 3),
/// );
/// let option = BondOption::new(95.0, 2, OptionType::Call, ExerciseStyle::American);
/// let batch = engine.price(&option, &scenarios).unwrap();
/// assert_eq!(batch.priced(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct HullWhiteLatticeEngine {
    model: HullWhite,
    layout: TreeLayout,
    time_grid: TimeGrid,
    notional: Real,
    settings: EngineSettings,
    cash_flow_days: Option<Vec<Real>>,
}

impl HullWhiteLatticeEngine {
    /// Create an engine for a tree of `time_grid.steps()` steps up to
    /// `maturity` with mean reversion `mean_reversion`.
    ///
    /// # Errors
    /// `Precondition` for invalid settings, maturity or notional, or a tree
    /// half-width that cannot be represented.
    pub fn new(
        mean_reversion: Real,
        maturity: Time,
        time_grid: TimeGrid,
        notional: Real,
        settings: EngineSettings,
    ) -> Result<Self> {
        settings.validate()?;
        ensure!(notional.is_finite(), "notional must be finite, got {notional}");
        let model = HullWhite::with_settings(mean_reversion, &settings);
        let layout = model.tree_layout(maturity, time_grid.steps())?;
        Ok(Self {
            model,
            layout,
            time_grid,
            notional,
            settings,
            cash_flow_days: None,
        })
    }

    /// Attach the cash-flow dates as day offsets from the valuation date.
    /// They are informational; there must be one per lattice step, in strictly
    /// increasing order.
    pub fn with_cash_flow_days(mut self, days: Vec<Real>) -> Result<Self> {
        check_len("cash_flow_days", self.steps(), days.len())?;
        ensure_increasing_days(&days)?;
        self.cash_flow_days = Some(days);
        Ok(self)
    }

    /// Tree layout shared by all scenarios.
    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    /// Column lengths and discount times.
    pub fn time_grid(&self) -> &TimeGrid {
        &self.time_grid
    }

    /// Engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Cash-flow day offsets, if attached.
    pub fn cash_flow_days(&self) -> Option<&[Real]> {
        self.cash_flow_days.as_deref()
    }

    /// Number of time steps `N`.
    pub fn steps(&self) -> Size {
        self.layout.steps
    }

    /// Price `option` in every scenario.
    pub fn price(&self, option: &BondOption, scenarios: &ScenarioSet) -> Result<BatchValuation> {
        self.price_with_cancellation(option, scenarios, &CancellationToken::new())
    }

    /// Price `option` in every scenario, stopping early once `token` is
    /// cancelled.
    pub fn price_with_cancellation(
        &self,
        option: &BondOption,
        scenarios: &ScenarioSet,
        token: &CancellationToken,
    ) -> Result<BatchValuation> {
        self.price_with_progress(option, scenarios, token, |_| {})
    }

    /// As [`price_with_cancellation`], calling `on_finished(scenario)` after
    /// each scenario that was attempted.
    ///
    /// [`price_with_cancellation`]: Self::price_with_cancellation
    pub fn price_with_progress<F>(
        &self,
        option: &BondOption,
        scenarios: &ScenarioSet,
        token: &CancellationToken,
        on_finished: F,
    ) -> Result<BatchValuation>
    where
        F: Fn(usize) + Sync,
    {
        option.validate(self.steps())?;
        let count = scenarios.validate(self.steps())?;

        let grid = ProbabilityGrid::from_layout(&self.layout)?;
        let min_probability = grid.min_probability();
        if min_probability < 0.0 {
            warn!(
                min_probability,
                j_max = self.layout.j_max,
                "negative branching probability in tree layout"
            );
        }

        info!(
            scenarios = count,
            j_max = self.layout.j_max,
            steps = self.layout.steps,
            parallel = self.settings.parallel,
            option_type = %option.option_type,
            exercise = %option.exercise,
            "pricing scenario batch"
        );

        let run = |s: usize| {
            let result = self.run_scenario(&grid, option, scenarios, s, token);
            if !matches!(result.0, ScenarioOutcome::Skipped) {
                on_finished(s);
            }
            result
        };
        let results: Vec<(ScenarioOutcome, Option<LatticeDiagnostics>)> = if self.settings.parallel
        {
            (0..count).into_par_iter().map(run).collect()
        } else {
            (0..count).map(run).collect()
        };

        let mut outcomes = Vec::with_capacity(count);
        let mut diagnostics = None;
        for (outcome, captured) in results {
            if captured.is_some() {
                diagnostics = captured;
            }
            outcomes.push(outcome);
        }

        let skipped = outcomes
            .iter()
            .filter(|o| matches!(o, ScenarioOutcome::Skipped))
            .count();
        let status = if skipped > 0 {
            warn!(skipped, "scenario batch cancelled");
            BatchStatus::Cancelled
        } else {
            BatchStatus::Completed
        };
        let batch = BatchValuation {
            outcomes,
            status,
            layout: self.layout,
            diagnostics,
        };
        info!(
            priced = batch.priced(),
            failed = batch.failures().len(),
            skipped,
            "scenario batch finished"
        );
        Ok(batch)
    }

    fn run_scenario(
        &self,
        grid: &ProbabilityGrid,
        option: &BondOption,
        scenarios: &ScenarioSet,
        s: usize,
        token: &CancellationToken,
    ) -> (ScenarioOutcome, Option<LatticeDiagnostics>) {
        if token.is_cancelled() {
            return (ScenarioOutcome::Skipped, None);
        }
        match self.price_scenario(grid, option, scenarios, s, token) {
            Ok((value, captured)) => {
                debug!(scenario = s, option_value = value.option_value, "scenario priced");
                (ScenarioOutcome::Priced(value), captured)
            }
            Err(Error::Cancelled) => {
                debug!(scenario = s, "scenario interrupted");
                (ScenarioOutcome::Skipped, None)
            }
            Err(err) => {
                warn!(scenario = s, error = %err, "scenario failed");
                (ScenarioOutcome::Failed(err), None)
            }
        }
    }

    fn price_scenario(
        &self,
        grid: &ProbabilityGrid,
        option: &BondOption,
        scenarios: &ScenarioSet,
        s: usize,
        token: &CancellationToken,
    ) -> Result<(ScenarioValue, Option<LatticeDiagnostics>)> {
        let dx = self
            .model
            .state_spacing(scenarios.volatility(s), self.layout.step);
        let curve = discount_curve(
            &scenarios.rates(s),
            self.time_grid.discount_times(),
            self.settings.compounding,
            self.settings.compounding_frequency,
        )?;
        let lattice = CalibratedLattice::calibrate(grid, dx, &curve, self.time_grid.dts())?;

        let cash_flows = scenarios.cash_flows(s);
        let bond = bond_lattice(&lattice, &cash_flows, self.notional, token)?;
        let valuation =
            value_bond_option(&lattice, &bond, option, &scenarios.accrued_interest(s), token)?;
        let cash_flow_npv = npv(&cash_flows, &curve[..self.steps()])?;

        let captured = (s == 0 && self.settings.retain_diagnostics)
            .then(|| LatticeDiagnostics::capture(&lattice, &bond));
        Ok((
            ScenarioValue {
                option_value: valuation.value,
                bond_value: bond.root_price(),
                cash_flow_npv,
                paired: valuation.paired,
            },
            captured,
        ))
    }
}

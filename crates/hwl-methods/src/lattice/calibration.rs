//! Fitting the lattice to a discount curve.
//!
//! Arrow-Debreu state prices are carried forward one column at a time. At
//! each column the level shift `a(c)` is solved in closed form so that the
//! lattice reprices the zero-coupon bond maturing at the end of that
//! column:
//!
//! ```text
//! S(c)  = Σ Q(row, c) · exp(-x(row) · dt(c))
//! a(c)  = (ln S(c) - ln P(c)) / dt(c)
//! r     = x(row) + a(c)
//! d     = exp(-r · dt(c))
//! ```

use hwl_core::errors::{check_len, Error, Result};
use hwl_core::{ensure, ensure_post, DiscountFactor, Real, Time};
use hwl_math::Matrix;
use tracing::{debug, trace};

use super::geometry::LatticeShape;
use super::probabilities::ProbabilityGrid;

/// Relative error allowed between `Σ Q·d` and the target discount factor.
const REPRICING_TOLERANCE: Real = 1e-8;

/// Short rates, node discount factors and state prices of one scenario.
///
/// Borrows the shared [`ProbabilityGrid`]; everything else is owned and
/// dropped with the scenario.
#[derive(Debug, Clone)]
pub struct CalibratedLattice<'g> {
    grid: &'g ProbabilityGrid,
    state_spacing: Real,
    dt: Vec<Time>,
    rates: Matrix,
    discounts: Matrix,
    state_prices: Matrix,
    shifts: Vec<Real>,
}

impl<'g> CalibratedLattice<'g> {
    /// Calibrate `grid` to `discount_curve`.
    ///
    /// `discount_curve[c]` is the price of a unit paid at the end of
    /// column `c`, `dt[c]` the length of that column. Both need one entry
    /// per lattice column. `state_spacing` is `Δx = σ·√(3Δt)`.
    ///
    /// # Errors
    /// * `Shape` if a vector does not have `N + 1` entries.
    /// * `Precondition` if `state_spacing` is negative or not finite.
    /// * `Degenerate` if a column length is not positive, a discount
    ///   factor is not positive, or the state-price sum `S(c)` degenerates.
    /// * `Postcondition` if a calibrated column misses its discount factor
    ///   by more than 1e-8 relative.
    pub fn calibrate(
        grid: &'g ProbabilityGrid,
        state_spacing: Real,
        discount_curve: &[DiscountFactor],
        dt: &[Time],
    ) -> Result<Self> {
        let shape = grid.shape();
        let (rows, cols) = (shape.rows(), shape.columns());
        check_len("discount_curve", cols, discount_curve.len())?;
        check_len("dt", cols, dt.len())?;
        ensure!(
            state_spacing >= 0.0 && state_spacing.is_finite(),
            "invalid state spacing ({state_spacing})"
        );

        let x: Vec<Real> = (0..rows)
            .map(|row| shape.ladder_index(row) as Real * state_spacing)
            .collect();

        let mut rates = Matrix::zeros(rows, cols);
        let mut discounts = Matrix::zeros(rows, cols);
        let mut state_prices = Matrix::zeros(rows, cols);
        let mut shifts = Vec::with_capacity(cols);

        state_prices[(shape.center(), 0)] = 1.0;

        for col in 0..cols {
            if col > 0 {
                propagate(grid, &discounts, &mut state_prices, col);
            }

            let h = dt[col];
            if !(h > 0.0 && h.is_finite()) {
                return Err(Error::Degenerate(format!("dt({col}) = {h}")));
            }
            let p = discount_curve[col];
            if !(p > 0.0 && p.is_finite()) {
                return Err(Error::Degenerate(format!(
                    "discount factor P({col}) = {p}"
                )));
            }
            let s: Real = shape
                .populated_rows(col)
                .map(|row| state_prices[(row, col)] * (-x[row] * h).exp())
                .sum();
            if !(s > 0.0 && s.is_finite()) {
                return Err(Error::Degenerate(format!(
                    "state-price sum S({col}) = {s}"
                )));
            }

            let shift = (s.ln() - p.ln()) / h;
            let mut implied = 0.0;
            for row in shape.populated_rows(col) {
                let r = x[row] + shift;
                rates[(row, col)] = r;
                discounts[(row, col)] = (-r * h).exp();
                implied += state_prices[(row, col)] * discounts[(row, col)];
            }
            ensure_post!(
                (implied - p).abs() <= REPRICING_TOLERANCE * p,
                "column {col} reprices to {implied}, expected {p}"
            );
            trace!(col, shift, "calibrated column");
            shifts.push(shift);
        }

        debug!(
            j_max = shape.j_max(),
            steps = shape.steps(),
            state_spacing,
            "lattice calibrated"
        );

        Ok(Self {
            grid,
            state_spacing,
            dt: dt.to_vec(),
            rates,
            discounts,
            state_prices,
            shifts,
        })
    }

    /// The shared probability grid.
    pub fn grid(&self) -> &'g ProbabilityGrid {
        self.grid
    }

    /// Lattice shape.
    pub fn shape(&self) -> LatticeShape {
        self.grid.shape()
    }

    /// `Δx`.
    pub fn state_spacing(&self) -> Real {
        self.state_spacing
    }

    /// State coordinate `x(row) = J(row)·Δx`.
    pub fn state(&self, row: usize) -> Real {
        self.shape().ladder_index(row) as Real * self.state_spacing
    }

    /// Length of column `col`.
    pub fn dt(&self, col: usize) -> Time {
        self.dt[col]
    }

    /// Short rates `r(row, col)`.
    pub fn rates(&self) -> &Matrix {
        &self.rates
    }

    /// Node discount factors `d(row, col)`.
    pub fn discounts(&self) -> &Matrix {
        &self.discounts
    }

    /// Arrow-Debreu state prices `Q(row, col)`.
    pub fn state_prices(&self) -> &Matrix {
        &self.state_prices
    }

    /// Level shifts `a(col)`.
    pub fn shifts(&self) -> &[Real] {
        &self.shifts
    }

    /// Discount factor to the end of column `col` implied by the lattice,
    /// `Σ Q(row, col)·d(row, col)`.
    pub fn implied_discount(&self, col: usize) -> DiscountFactor {
        self.shape()
            .populated_rows(col)
            .map(|row| self.state_prices[(row, col)] * self.discounts[(row, col)])
            .sum()
    }

    /// Discounted expectation at node `(row, col)` of the values held in
    /// column `col + 1` of `values`.
    #[inline]
    pub fn continuation(&self, values: &Matrix, row: usize, col: usize) -> Real {
        let next = col + 1;
        let succ = self.shape().successors(row, col);
        let (pu, pm, pd) = self.grid.branch(row, col);
        self.discounts[(row, col)]
            * (pu * values[(succ.up, next)]
                + pm * values[(succ.mid, next)]
                + pd * values[(succ.down, next)])
    }
}

/// Scatter the discounted state prices of column `col - 1` onto column
/// `col` through the successor rule.
///
/// In the box the reflected branches of the boundary rows land two rows in:
/// row 2 collects the top row's down branch and row `2·jMax - 2` the bottom
/// row's up branch. With `jMax == 2` both are row 2.
fn propagate(grid: &ProbabilityGrid, discounts: &Matrix, state_prices: &mut Matrix, col: usize) {
    let shape = grid.shape();
    let prev = col - 1;
    for row in shape.populated_rows(prev) {
        let mass = state_prices[(row, prev)] * discounts[(row, prev)];
        let (pu, pm, pd) = grid.branch(row, prev);
        let succ = shape.successors(row, prev);
        state_prices[(succ.up, col)] += mass * pu;
        state_prices[(succ.mid, col)] += mass * pm;
        state_prices[(succ.down, col)] += mass * pd;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const CURVE: [Real; 4] = [0.995, 0.985, 0.970, 0.950];
    const DT: [Real; 4] = [1.0; 4];

    fn grid(j_max: usize, steps: usize, m: Real) -> ProbabilityGrid {
        ProbabilityGrid::new(LatticeShape::new(j_max, steps).unwrap(), m)
    }

    fn dx(sigma: Real, step: Real) -> Real {
        sigma * (3.0 * step).sqrt()
    }

    #[test]
    fn shifts_match_reference() {
        let g = grid(2, 3, -0.1);
        let lattice = CalibratedLattice::calibrate(&g, dx(0.01, 1.0), &CURVE, &DT).unwrap();
        let expected = [
            0.005_012_541_823_544_286,
            0.010_151_095_986_495_624,
            0.015_526_069_671_648_409,
            0.021_201_290_430_991_68,
        ];
        for (a, e) in lattice.shifts().iter().zip(expected) {
            assert_abs_diff_eq!(*a, e, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(lattice.shifts()[0], -(0.995_f64).ln(), epsilon = 1e-15);
    }

    #[test]
    fn first_column_state_prices() {
        let g = grid(2, 3, -0.1);
        let lattice = CalibratedLattice::calibrate(&g, dx(0.01, 1.0), &CURVE, &DT).unwrap();
        let q = lattice.state_prices().column(1);
        let expected = [0.0, 0.995 / 6.0, 0.995 * 2.0 / 3.0, 0.995 / 6.0, 0.0];
        for (got, want) in q.iter().zip(expected) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-15);
        }
    }

    #[test]
    fn reprices_every_column() {
        let g = grid(2, 3, -0.1);
        let lattice = CalibratedLattice::calibrate(&g, dx(0.01, 1.0), &CURVE, &DT).unwrap();
        let shape = lattice.shape();
        for col in 0..shape.columns() {
            assert_abs_diff_eq!(lattice.implied_discount(col), CURVE[col], epsilon = 1e-10);

            let h = lattice.dt(col);
            let shifted: Real = shape
                .populated_rows(col)
                .map(|row| {
                    lattice.state_prices()[(row, col)] * (-lattice.state(row) * h).exp()
                })
                .sum::<Real>()
                * (-lattice.shifts()[col] * h).exp();
            assert_abs_diff_eq!(shifted, CURVE[col], epsilon = 1e-10);
        }
    }

    #[test]
    fn row_two_collects_both_reflected_branches_when_j_max_is_two() {
        let g = grid(2, 3, -0.1);
        let lattice = CalibratedLattice::calibrate(&g, dx(0.01, 1.0), &CURVE, &DT).unwrap();
        let q = lattice.state_prices();
        let d = lattice.discounts();
        let (col, prev) = (3, 2);

        let expected = q[(0, prev)] * d[(0, prev)] * g.down()[(0, prev)]
            + q[(1, prev)] * d[(1, prev)] * g.down()[(1, prev)]
            + q[(2, prev)] * d[(2, prev)] * g.mid()[(2, prev)]
            + q[(3, prev)] * d[(3, prev)] * g.up()[(3, prev)]
            + q[(4, prev)] * d[(4, prev)] * g.up()[(4, prev)];
        assert_abs_diff_eq!(q[(2, col)], expected, epsilon = 1e-15);
    }

    #[test]
    fn state_price_mass_is_conserved_through_the_box() {
        let steps = 10;
        let g = grid(3, steps, -0.07);
        let curve: Vec<Real> = (0..=steps)
            .map(|c| (-0.03 * 0.5 * (c + 1) as Real).exp())
            .collect();
        let dt = vec![0.5; steps + 1];
        let lattice = CalibratedLattice::calibrate(&g, dx(0.015, 0.5), &curve, &dt).unwrap();
        let shape = lattice.shape();
        for col in 1..shape.columns() {
            let arrived: Real = lattice.state_prices().column(col).iter().sum();
            assert_abs_diff_eq!(arrived, lattice.implied_discount(col - 1), epsilon = 1e-13);
            assert_abs_diff_eq!(lattice.implied_discount(col), curve[col], epsilon = 1e-10);
        }
    }

    #[test]
    fn smallest_lattice_calibrates() {
        let g = grid(1, 3, -0.2);
        let lattice = CalibratedLattice::calibrate(&g, dx(0.01, 1.0), &CURVE, &DT).unwrap();
        for col in 0..4 {
            assert_abs_diff_eq!(lattice.implied_discount(col), CURVE[col], epsilon = 1e-10);
        }
    }

    #[test]
    fn continuation_of_ones_is_the_node_discount() {
        let g = grid(2, 3, -0.1);
        let lattice = CalibratedLattice::calibrate(&g, dx(0.01, 1.0), &CURVE, &DT).unwrap();
        let ones = Matrix::from_element(5, 4, 1.0);
        for col in 0..3 {
            for row in lattice.shape().populated_rows(col) {
                assert_abs_diff_eq!(
                    lattice.continuation(&ones, row, col),
                    lattice.discounts()[(row, col)],
                    epsilon = 1e-14
                );
            }
        }
    }

    #[test]
    fn non_positive_discount_factor_is_degenerate() {
        let g = grid(2, 3, -0.1);
        let err =
            CalibratedLattice::calibrate(&g, 0.01, &[0.995, 0.0, 0.97, 0.95], &DT).unwrap_err();
        assert!(err.is_numerical());
    }

    #[test]
    fn zero_length_column_is_degenerate() {
        let g = grid(2, 3, -0.1);
        let err =
            CalibratedLattice::calibrate(&g, 0.01, &CURVE, &[1.0, 1.0, 0.0, 1.0]).unwrap_err();
        assert!(err.is_numerical());
    }

    #[test]
    fn short_curve_is_a_shape_error() {
        let g = grid(2, 3, -0.1);
        let err = CalibratedLattice::calibrate(&g, 0.01, &CURVE[..3], &DT).unwrap_err();
        assert_eq!(
            err,
            Error::Shape {
                parameter: "discount_curve",
                expected: 4,
                found: 3
            }
        );
    }
}

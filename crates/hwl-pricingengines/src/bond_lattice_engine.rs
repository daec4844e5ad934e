//! Bond prices on a calibrated lattice.
//!
//! The bond value process is built by backward induction from the final
//! cash flow. Cash flow `k` is paid at column `k + 1`, so a column `c >= 1`
//! node adds `cf[c - 1]` to its discounted continuation value; the root
//! adds nothing. The root value therefore equals `Σ cf[k]·P(k)`.

use hwl_core::errors::{check_len, Result};
use hwl_core::{ensure, CancellationToken, Price, Real};
use hwl_math::Matrix;
use hwl_methods::CalibratedLattice;
use tracing::trace;

/// Bond value process of one scenario.
#[derive(Debug, Clone)]
pub struct BondLattice {
    prices: Matrix,
    interest_flows: Vec<Real>,
    root: (usize, usize),
}

impl BondLattice {
    /// `B(row, col)`.
    pub fn prices(&self) -> &Matrix {
        &self.prices
    }

    /// Cash flow received at each column with the notional removed from the
    /// last one: `[0, cf[0], …, cf[N-1] - notional]`.
    pub fn interest_flows(&self) -> &[Real] {
        &self.interest_flows
    }

    /// Bond value at the root node.
    pub fn root_price(&self) -> Price {
        self.prices[self.root]
    }

    /// Bond value at node `(row, col)`.
    #[inline]
    pub fn price_at(&self, row: usize, col: usize) -> Price {
        self.prices[(row, col)]
    }
}

/// Roll the bond paying `cash_flows` back through `lattice`.
///
/// `cash_flows` holds one entry per step; the last one includes the
/// principal. `notional` only enters the interest-only flow vector.
///
/// # Errors
/// * `Shape` if `cash_flows` does not have `N` entries.
/// * `Precondition` if a cash flow or the notional is not finite.
/// * `Cancelled` if `token` is cancelled between columns.
pub fn bond_lattice(
    lattice: &CalibratedLattice<'_>,
    cash_flows: &[Real],
    notional: Real,
    token: &CancellationToken,
) -> Result<BondLattice> {
    let shape = lattice.shape();
    let steps = shape.steps();
    check_len("cash_flows", steps, cash_flows.len())?;
    ensure!(notional.is_finite(), "notional must be finite, got {notional}");
    for (k, cf) in cash_flows.iter().enumerate() {
        ensure!(cf.is_finite(), "cash_flows({k}) is not finite");
    }

    let mut prices = Matrix::zeros(shape.rows(), shape.columns());
    let terminal = cash_flows[steps - 1];
    for row in 0..shape.rows() {
        prices[(row, steps)] = terminal;
    }

    for col in (0..steps).rev() {
        token.check()?;
        let paid = if col == 0 { 0.0 } else { cash_flows[col - 1] };
        for row in shape.populated_rows(col) {
            prices[(row, col)] = lattice.continuation(&prices, row, col) + paid;
        }
    }

    let mut interest_flows = Vec::with_capacity(steps + 1);
    interest_flows.push(0.0);
    interest_flows.extend_from_slice(cash_flows);
    interest_flows[steps] -= notional;

    let root = (shape.center(), 0);
    trace!(root_price = prices[root], "bond lattice built");

    Ok(BondLattice {
        prices,
        interest_flows,
        root,
    })
}

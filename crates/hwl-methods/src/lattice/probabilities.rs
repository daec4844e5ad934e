//! Branching probabilities of the Hull-White trinomial lattice.
//!
//! The probabilities depend only on the ladder index `J`, the drift-scaling
//! constant `M = -a·Δt` and whether the node sits in the tip, the top box
//! row, the bottom box row or the box interior. They are therefore built
//! once per batch and shared by every scenario.

use hwl_core::errors::Result;
use hwl_core::Real;
use hwl_math::Matrix;
use hwl_models::TreeLayout;

use super::geometry::LatticeShape;

const ONE_SIXTH: Real = 1.0 / 6.0;
const TWO_THIRDS: Real = 2.0 / 3.0;
const SEVEN_SIXTHS: Real = 7.0 / 6.0;
const MINUS_ONE_THIRD: Real = -1.0 / 3.0;

/// Up, middle and down probabilities of a single node.
pub type Branch = (Real, Real, Real);

/// Normal branching: `(J+1, J, J-1)`.
fn symmetric(j: Real, m: Real) -> Branch {
    let jm = j * m;
    let jm2 = jm * jm;
    (
        ONE_SIXTH + (jm2 + jm) / 2.0,
        TWO_THIRDS - jm2,
        ONE_SIXTH + (jm2 - jm) / 2.0,
    )
}

/// Top box row: `(J, J-1, J-2)`.
fn top_reflecting(j: Real, m: Real) -> Branch {
    let jm = j * m;
    let jm2 = jm * jm;
    (
        SEVEN_SIXTHS + (jm2 + 3.0 * jm) / 2.0,
        MINUS_ONE_THIRD - jm2 - 2.0 * jm,
        ONE_SIXTH + (jm2 + jm) / 2.0,
    )
}

/// Bottom box row: `(J+2, J+1, J)`.
fn bottom_reflecting(j: Real, m: Real) -> Branch {
    let jm = j * m;
    let jm2 = jm * jm;
    (
        ONE_SIXTH + (jm2 - jm) / 2.0,
        MINUS_ONE_THIRD - jm2 + 2.0 * jm,
        SEVEN_SIXTHS + (jm2 - 3.0 * jm) / 2.0,
    )
}

/// The `pu`, `pm` and `pd` matrices of a lattice, `(2·jMax+1) × (N+1)`.
///
/// Cells outside the populated band of a tip column are zero and never
/// read.
///
/// Probabilities are only guaranteed non-negative when `|J·M|` stays inside
/// the region implied by the `jMax` threshold; [`min_probability`] reports
/// the worst node so callers can flag a bad layout.
///
/// [`min_probability`]: ProbabilityGrid::min_probability
#[derive(Debug, Clone)]
pub struct ProbabilityGrid {
    shape: LatticeShape,
    drift_scale: Real,
    up: Matrix,
    mid: Matrix,
    down: Matrix,
}

impl ProbabilityGrid {
    /// Build the grid for `shape` and drift-scaling constant `m`.
    pub fn new(shape: LatticeShape, m: Real) -> Self {
        let (rows, cols) = (shape.rows(), shape.columns());
        let mut up = Matrix::zeros(rows, cols);
        let mut mid = Matrix::zeros(rows, cols);
        let mut down = Matrix::zeros(rows, cols);

        for col in 0..cols {
            let tip = shape.is_tip(col);
            for row in shape.populated_rows(col) {
                let j = shape.ladder_index(row) as Real;
                let (pu, pm, pd) = if tip {
                    symmetric(j, m)
                } else if row == 0 {
                    top_reflecting(j, m)
                } else if row == shape.bottom() {
                    bottom_reflecting(j, m)
                } else {
                    symmetric(j, m)
                };
                up[(row, col)] = pu;
                mid[(row, col)] = pm;
                down[(row, col)] = pd;
            }
        }

        Self {
            shape,
            drift_scale: m,
            up,
            mid,
            down,
        }
    }

    /// Build the grid described by a model's tree layout.
    pub fn from_layout(layout: &TreeLayout) -> Result<Self> {
        let shape = LatticeShape::new(layout.j_max, layout.steps)?;
        Ok(Self::new(shape, layout.spacing))
    }

    /// Lattice shape.
    pub fn shape(&self) -> LatticeShape {
        self.shape
    }

    /// Drift-scaling constant `M`.
    pub fn drift_scale(&self) -> Real {
        self.drift_scale
    }

    /// Up probabilities.
    pub fn up(&self) -> &Matrix {
        &self.up
    }

    /// Middle probabilities.
    pub fn mid(&self) -> &Matrix {
        &self.mid
    }

    /// Down probabilities.
    pub fn down(&self) -> &Matrix {
        &self.down
    }

    /// `(pu, pm, pd)` at node `(row, col)`.
    #[inline]
    pub fn branch(&self, row: usize, col: usize) -> Branch {
        (
            self.up[(row, col)],
            self.mid[(row, col)],
            self.down[(row, col)],
        )
    }

    /// Smallest probability over all populated nodes.
    pub fn min_probability(&self) -> Real {
        self.populated_branches()
            .map(|(pu, pm, pd)| pu.min(pm).min(pd))
            .fold(Real::INFINITY, Real::min)
    }

    /// Largest `|pu + pm + pd - 1|` over all populated nodes.
    pub fn max_normalization_error(&self) -> Real {
        self.populated_branches()
            .map(|(pu, pm, pd)| (pu + pm + pd - 1.0).abs())
            .fold(0.0, Real::max)
    }

    fn populated_branches(&self) -> impl Iterator<Item = Branch> + '_ {
        (0..self.shape.columns()).flat_map(move |col| {
            self.shape
                .populated_rows(col)
                .map(move |row| self.branch(row, col))
        })
    }
}

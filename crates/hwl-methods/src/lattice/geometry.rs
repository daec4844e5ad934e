//! Shape of the trinomial short-rate lattice.
//!
//! Rows are numbered top to bottom, `0 ..= 2·jMax`; row `jMax` is the
//! central branch. The ladder index `J(row) = jMax - row` runs from `+jMax`
//! at the top to `-jMax` at the bottom. Columns `0 ..= N` are time steps.
//!
//! The tree grows one row up and one row down per step until it reaches the
//! half-width `jMax` (the *tip*), and from then on keeps all `2·jMax + 1`
//! rows (the *box*), with the boundary rows branching back inwards.

use std::ops::RangeInclusive;

use hwl_core::errors::Result;
use hwl_core::{ensure, Size};

/// The three nodes of column `col + 1` reached from a node of column `col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Successors {
    /// Row reached by the up branch.
    pub up: usize,
    /// Row reached by the middle branch.
    pub mid: usize,
    /// Row reached by the down branch.
    pub down: usize,
}

/// Scenario-invariant dimensions of the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LatticeShape {
    j_max: Size,
    steps: Size,
}

impl LatticeShape {
    /// Create a shape with half-width `j_max` and `steps` time steps.
    ///
    /// # Errors
    /// `Precondition` if `j_max` or `steps` is zero. The reflecting rows
    /// of the box need at least three rows.
    pub fn new(j_max: Size, steps: Size) -> Result<Self> {
        ensure!(j_max >= 1, "j_max must be at least 1, got {j_max}");
        ensure!(steps >= 1, "steps must be at least 1, got {steps}");
        Ok(Self { j_max, steps })
    }

    /// Half-width `jMax`.
    #[inline]
    pub fn j_max(&self) -> Size {
        self.j_max
    }

    /// Number of time steps `N`.
    #[inline]
    pub fn steps(&self) -> Size {
        self.steps
    }

    /// Number of rows, `2·jMax + 1`.
    #[inline]
    pub fn rows(&self) -> usize {
        2 * self.j_max + 1
    }

    /// Number of columns, `N + 1`.
    #[inline]
    pub fn columns(&self) -> usize {
        self.steps + 1
    }

    /// Row of the root node and of the central branch.
    #[inline]
    pub fn center(&self) -> usize {
        self.j_max
    }

    /// Last row, `2·jMax`.
    #[inline]
    pub fn bottom(&self) -> usize {
        2 * self.j_max
    }

    /// `true` while the tree is still widening (`col < jMax`).
    #[inline]
    pub fn is_tip(&self, col: usize) -> bool {
        col < self.j_max
    }

    /// Ladder index `J(row) = jMax - row`.
    #[inline]
    pub fn ladder_index(&self, row: usize) -> i64 {
        self.j_max as i64 - row as i64
    }

    /// Rows that carry nodes in column `col`.
    pub fn populated_rows(&self, col: usize) -> RangeInclusive<usize> {
        if self.is_tip(col) {
            self.j_max - col..=self.j_max + col
        } else {
            0..=self.bottom()
        }
    }

    /// Where the branches of node `(row, col)` land in column `col + 1`.
    ///
    /// Only meaningful for populated nodes of columns `0 .. N`.
    pub fn successors(&self, row: usize, col: usize) -> Successors {
        let bottom = self.bottom();
        if self.is_tip(col) {
            // Widening band: populated rows start at jMax - col >= 1.
            Successors {
                up: row - 1,
                mid: row,
                down: row + 1,
            }
        } else if row == 0 {
            // Top row of the box branches downwards.
            Successors {
                up: 0,
                mid: 1,
                down: 2,
            }
        } else if row == bottom {
            // Bottom row of the box branches upwards.
            Successors {
                up: bottom - 2,
                mid: bottom - 1,
                down: bottom,
            }
        } else {
            Successors {
                up: row - 1,
                mid: row,
                down: row + 1,
            }
        }
    }
}

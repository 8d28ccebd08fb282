//! Temperature field storage for 1D and 2D grids
//!
//! A 1D field is a `DVector` of length `nodes_x`; a 2D field is a `DMatrix`
//! of shape `(nodes_x, nodes_y)` where the row index runs along x and the
//! column index along y. nalgebra stores matrices column-major, so each column
//! (fixed `j`) is a contiguous run of `nodes_x` values.

use crate::grid::Grid;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Temperature at every grid node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Field {
    /// Temperatures along a rod
    Line(DVector<f64>),
    /// Temperatures over a plate, indexed `[(i, j)]`
    Plane(DMatrix<f64>),
}

impl Field {
    /// Evaluate `f(position)` at every node of `grid`
    ///
    /// `position` is `[x]` for a line and `[x, y]` for a plane.
    pub fn from_fn<F>(grid: &Grid, f: F) -> Self
    where
        F: Fn(&[f64]) -> f64,
    {
        match grid {
            Grid::Line(x) => Field::Line(DVector::from_fn(x.nodes(), |i, _| {
                f(&[x.coordinate(i)])
            })),
            Grid::Plane(x, y) => Field::Plane(DMatrix::from_fn(x.nodes(), y.nodes(), |i, j| {
                f(&[x.coordinate(i), y.coordinate(j)])
            })),
        }
    }

    /// Field holding `value` at every node of `grid`
    pub fn uniform(grid: &Grid, value: f64) -> Self {
        let (nx, ny) = grid.shape();
        match grid {
            Grid::Line(_) => Field::Line(DVector::from_element(nx, value)),
            Grid::Plane(..) => Field::Plane(DMatrix::from_element(nx, ny, value)),
        }
    }

    /// Number of spatial dimensions (1 or 2)
    pub fn dimensions(&self) -> usize {
        match self {
            Field::Line(_) => 1,
            Field::Plane(_) => 2,
        }
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the field has no nodes (never true for a validated grid)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Node values; row-major for lines, column-major for planes
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Field::Line(v) => v.as_slice(),
            Field::Plane(m) => m.as_slice(),
        }
    }

    /// The 1D values, if this is a line field
    pub fn as_line(&self) -> Option<&DVector<f64>> {
        match self {
            Field::Line(v) => Some(v),
            Field::Plane(_) => None,
        }
    }

    /// The 2D values, if this is a plane field
    pub fn as_plane(&self) -> Option<&DMatrix<f64>> {
        match self {
            Field::Line(_) => None,
            Field::Plane(m) => Some(m),
        }
    }

    /// Smallest node value
    pub fn min(&self) -> f64 {
        self.as_slice().iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest node value
    pub fn max(&self) -> f64 {
        self.as_slice()
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Whether every node holds a finite value
    ///
    /// A `NaN` left behind by the stepper means an edge was never written.
    pub fn is_finite(&self) -> bool {
        self.as_slice().iter().all(|v| v.is_finite())
    }

    /// Control-volume weighted sum Σ wᵢ·Tᵢ
    ///
    /// Edge nodes own half a cell per axis (a quarter at plate corners). With
    /// zero-flux edges and no loss term this is the quantity the mirror-node
    /// scheme conserves exactly.
    ///
    /// # Panics
    ///
    /// Panics if the field and grid dimensionality differ.
    pub fn weighted_sum(&self, grid: &Grid) -> f64 {
        match (self, grid) {
            (Field::Line(v), Grid::Line(x)) => v
                .iter()
                .enumerate()
                .map(|(i, t)| x.volume_weight(i) * t)
                .sum(),
            (Field::Plane(m), Grid::Plane(x, y)) => {
                let mut sum = 0.0;
                for j in 0..m.ncols() {
                    let wy = y.volume_weight(j);
                    for i in 0..m.nrows() {
                        sum += x.volume_weight(i) * wy * m[(i, j)];
                    }
                }
                sum
            }
            _ => panic!("Field and grid dimensionality mismatch"),
        }
    }
}

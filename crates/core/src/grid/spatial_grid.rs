//! Regular node grids for 1D rods and 2D plates
//!
//! Node counts include both endpoints, so an axis of length `L` with `n` nodes
//! has spacing `L / (n - 1)`. Grids are immutable once built.

use crate::error::{HeatSimError, Result};
use crate::solver::Edge;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// One spatial axis of a grid
///
/// Deserialization goes through the same checks as construction, so an axis
/// read from a config file is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AxisSpec")]
pub struct Axis {
    length: f64,
    nodes: usize,
}

/// Unvalidated wire form of [`Axis`]
#[derive(Deserialize)]
struct AxisSpec {
    length: f64,
    nodes: usize,
}

impl TryFrom<AxisSpec> for Axis {
    type Error = HeatSimError;

    fn try_from(spec: AxisSpec) -> Result<Self> {
        Axis::new(spec.length, spec.nodes, "length", "nodes")
    }
}

impl Axis {
    /// Create an axis, validating length and node count
    ///
    /// # Arguments
    ///
    /// * `length` - Domain length along this axis (must be finite and > 0)
    /// * `nodes` - Number of nodes including both endpoints (must be >= 2)
    /// * `length_name` / `nodes_name` - Parameter names reported on failure
    fn new(
        length: f64,
        nodes: usize,
        length_name: &'static str,
        nodes_name: &'static str,
    ) -> Result<Self> {
        if !length.is_finite() || length <= 0.0 {
            return Err(HeatSimError::invalid_grid(
                length_name,
                length,
                "must be finite and positive",
            ));
        }
        if nodes < 2 {
            return Err(HeatSimError::invalid_grid(
                nodes_name,
                nodes as f64,
                "must be at least 2",
            ));
        }
        Ok(Self { length, nodes })
    }

    /// Domain length along this axis
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Number of nodes, endpoints included
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    /// Distance between adjacent nodes
    pub fn spacing(&self) -> f64 {
        self.length / (self.nodes - 1) as f64
    }

    /// Node coordinate at index `i`
    #[inline]
    pub fn coordinate(&self, i: usize) -> f64 {
        // Pin the last node to the exact length instead of accumulating rounding
        if i + 1 == self.nodes {
            self.length
        } else {
            i as f64 * self.spacing()
        }
    }

    /// All node coordinates, evenly spaced from 0 to `length` inclusive
    pub fn coordinates(&self) -> DVector<f64> {
        DVector::from_fn(self.nodes, |i, _| self.coordinate(i))
    }

    /// Trapezoidal control-volume weight of node `i` (half a cell on the ends)
    #[inline]
    pub(crate) fn volume_weight(&self, i: usize) -> f64 {
        if i == 0 || i + 1 == self.nodes {
            0.5 * self.spacing()
        } else {
            self.spacing()
        }
    }
}

/// Spatial discretization of the domain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Grid {
    /// 1D rod along x
    Line(Axis),
    /// 2D plate with x and y axes
    Plane(Axis, Axis),
}

impl Grid {
    /// Build a 1D grid
    ///
    /// # Errors
    ///
    /// Returns [`HeatSimError::InvalidGrid`] when `length <= 0` or `nodes < 2`.
    pub fn line(length: f64, nodes: usize) -> Result<Self> {
        Ok(Grid::Line(Axis::new(length, nodes, "length", "nodes")?))
    }

    /// Build a 2D grid from `(length, nodes)` pairs for each axis
    ///
    /// # Errors
    ///
    /// Returns [`HeatSimError::InvalidGrid`] naming the first offending axis parameter.
    pub fn plane(x: (f64, usize), y: (f64, usize)) -> Result<Self> {
        let x_axis = Axis::new(x.0, x.1, "length_x", "nodes_x")?;
        let y_axis = Axis::new(y.0, y.1, "length_y", "nodes_y")?;
        Ok(Grid::Plane(x_axis, y_axis))
    }

    /// Number of spatial dimensions (1 or 2)
    pub fn dimensions(&self) -> usize {
        match self {
            Grid::Line(_) => 1,
            Grid::Plane(..) => 2,
        }
    }

    /// The x axis (present for both variants)
    pub fn x_axis(&self) -> &Axis {
        match self {
            Grid::Line(x) | Grid::Plane(x, _) => x,
        }
    }

    /// The y axis, if this is a plane
    pub fn y_axis(&self) -> Option<&Axis> {
        match self {
            Grid::Line(_) => None,
            Grid::Plane(_, y) => Some(y),
        }
    }

    /// Node spacing per axis: `(dx, dy)`, with `dy = None` in 1D
    pub fn spacing(&self) -> (f64, Option<f64>) {
        (self.x_axis().spacing(), self.y_axis().map(Axis::spacing))
    }

    /// Node counts per axis: `(nx, ny)`, with `ny = 1` in 1D
    pub fn shape(&self) -> (usize, usize) {
        (
            self.x_axis().nodes(),
            self.y_axis().map_or(1, Axis::nodes),
        )
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        let (nx, ny) = self.shape();
        nx * ny
    }

    /// Σ 1/h² over every axis, the geometric factor of the stability number
    pub fn inverse_spacing_sq_sum(&self) -> f64 {
        let dx = self.x_axis().spacing();
        let mut sum = 1.0 / (dx * dx);
        if let Some(y) = self.y_axis() {
            let dy = y.spacing();
            sum += 1.0 / (dy * dy);
        }
        sum
    }

    /// Edges that must carry a boundary condition, in application order
    pub fn edges(&self) -> &'static [Edge] {
        match self {
            Grid::Line(_) => &[Edge::Left, Edge::Right],
            Grid::Plane(..) => &[Edge::Left, Edge::Right, Edge::Bottom, Edge::Top],
        }
    }

    /// Whether `edge` exists on this grid
    pub fn has_edge(&self, edge: Edge) -> bool {
        self.edges().contains(&edge)
    }
}

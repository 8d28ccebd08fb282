//! Boundary conditions applied to the next-state field after each interior update
//!
//! Each edge carries exactly one policy:
//!
//! - **Dirichlet**: the edge node is pinned to a fixed value.
//! - **Zero flux** (Neumann): the edge node follows the interior stencil with
//!   the out-of-grid neighbour replaced by its mirror image, which enforces a
//!   zero gradient across the edge. On the right end of a rod this is
//!   `new[N-1] = old[N-1] + 2λ(old[N-2] - old[N-1])`.
//! - **Convective**: the same mirror stencil plus a linear loss
//!   `coefficient·Δt·(old - ambient)` toward the ambient temperature.
//!
//! Conditions read the frozen pre-step field and write only into the freshly
//! allocated next-state field. On a plate the edges are applied in the order
//! Left, Right, Bottom, Top, so a corner takes the value of whichever of its
//! two edges comes last.

use super::fields::Field;
use super::heat_transfer::StepCoefficients;
use crate::error::{HeatSimError, Result};
use crate::grid::Grid;
use nalgebra::{DMatrix, DVector};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A domain edge
///
/// Left/Right bound the x axis (`i = 0` / `i = nx - 1`), Bottom/Top bound
/// the y axis (`j = 0` / `j = ny - 1`). A rod only has Left and Right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    /// x = 0
    Left,
    /// x = length
    Right,
    /// y = 0
    Bottom,
    /// y = length
    Top,
}

impl Edge {
    /// Application order on a plate; corners keep the last write
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Bottom, Edge::Top];

    fn parameter_name(self) -> &'static str {
        match self {
            Edge::Left => "left_edge",
            Edge::Right => "right_edge",
            Edge::Bottom => "bottom_edge",
            Edge::Top => "top_edge",
        }
    }
}

/// Policy bound to one edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundaryCondition {
    /// Edge temperature fixed to `value`
    Dirichlet {
        /// Pinned temperature
        value: f64,
    },
    /// No heat crosses the edge
    ZeroFlux,
    /// Heat exchange with an ambient reservoir
    Convective {
        /// Ambient temperature
        ambient: f64,
        /// Exchange coefficient (1/s), multiplied by Δt in the update
        coefficient: f64,
    },
}

impl BoundaryCondition {
    /// Shorthand for [`BoundaryCondition::Dirichlet`]
    pub const fn fixed(value: f64) -> Self {
        BoundaryCondition::Dirichlet { value }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            BoundaryCondition::Dirichlet { value } => {
                if !value.is_finite() {
                    return Err(HeatSimError::invalid_parameter(
                        "dirichlet_value",
                        value,
                        "must be finite",
                    ));
                }
            }
            BoundaryCondition::ZeroFlux => {}
            BoundaryCondition::Convective {
                ambient,
                coefficient,
            } => {
                if !ambient.is_finite() {
                    return Err(HeatSimError::invalid_parameter(
                        "convective_ambient",
                        ambient,
                        "must be finite",
                    ));
                }
                if !coefficient.is_finite() || coefficient < 0.0 {
                    return Err(HeatSimError::invalid_parameter(
                        "convective_coefficient",
                        coefficient,
                        "must be finite and non-negative",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Write this condition's value for `edge` into a rod's next state
    ///
    /// # Panics
    ///
    /// Panics if `edge` is Bottom or Top, which a rod does not have.
    pub fn apply_line(
        &self,
        edge: Edge,
        old: &DVector<f64>,
        new: &mut DVector<f64>,
        coeffs: &StepCoefficients,
    ) {
        let i = match edge {
            Edge::Left => 0,
            Edge::Right => old.len() - 1,
            Edge::Bottom | Edge::Top => {
                unreachable!("{edge:?} edge does not exist on a line grid")
            }
        };
        new[i] = match *self {
            BoundaryCondition::Dirichlet { value } => value,
            BoundaryCondition::ZeroFlux => mirrored_line(old, i, coeffs),
            BoundaryCondition::Convective {
                ambient,
                coefficient,
            } => mirrored_line(old, i, coeffs) - coefficient * coeffs.dt * (old[i] - ambient),
        };
    }

    /// Write this condition's values for `edge` into a plate's next state
    pub fn apply_plane(
        &self,
        edge: Edge,
        old: &DMatrix<f64>,
        new: &mut DMatrix<f64>,
        coeffs: &StepCoefficients,
    ) {
        let (nx, ny) = old.shape();

        if let BoundaryCondition::Dirichlet { value } = *self {
            match edge {
                Edge::Left => new.row_mut(0).fill(value),
                Edge::Right => new.row_mut(nx - 1).fill(value),
                Edge::Bottom => new.column_mut(0).fill(value),
                Edge::Top => new.column_mut(ny - 1).fill(value),
            }
            return;
        }

        let nodes: Box<dyn Iterator<Item = (usize, usize)>> = match edge {
            Edge::Left => Box::new((0..ny).map(|j| (0, j))),
            Edge::Right => Box::new((0..ny).map(move |j| (nx - 1, j))),
            Edge::Bottom => Box::new((0..nx).map(|i| (i, 0))),
            Edge::Top => Box::new((0..nx).map(move |i| (i, ny - 1))),
        };

        for (i, j) in nodes {
            let mirrored = mirrored_plane(old, i, j, coeffs);
            new[(i, j)] = match *self {
                BoundaryCondition::Convective {
                    ambient,
                    coefficient,
                } => mirrored - coefficient * coeffs.dt * (old[(i, j)] - ambient),
                _ => mirrored,
            };
        }
    }
}

/// Neighbour indices along one axis, reflecting across the ends
#[inline]
fn mirror_neighbours(i: usize, n: usize) -> (usize, usize) {
    let below = if i == 0 { 1 } else { i - 1 };
    let above = if i + 1 == n { n - 2 } else { i + 1 };
    (below, above)
}

#[inline]
fn mirrored_line(old: &DVector<f64>, i: usize, coeffs: &StepCoefficients) -> f64 {
    let (im, ip) = mirror_neighbours(i, old.len());
    let t = old[i];
    t + coeffs.lambda_x * (old[ip] - 2.0 * t + old[im])
}

#[inline]
fn mirrored_plane(old: &DMatrix<f64>, i: usize, j: usize, coeffs: &StepCoefficients) -> f64 {
    let (nx, ny) = old.shape();
    let (im, ip) = mirror_neighbours(i, nx);
    let (jm, jp) = mirror_neighbours(j, ny);
    let t = old[(i, j)];
    t + coeffs.lambda_x * (old[(ip, j)] - 2.0 * t + old[(im, j)])
        + coeffs.lambda_y * (old[(i, jp)] - 2.0 * t + old[(i, jm)])
}

/// Boundary conditions keyed by edge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundarySet {
    conditions: FxHashMap<Edge, BoundaryCondition>,
}

impl BoundarySet {
    /// Empty set; every edge of the grid must be bound before stepping
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the same condition to each of `edges`
    pub fn uniform(edges: &[Edge], condition: BoundaryCondition) -> Self {
        edges
            .iter()
            .fold(Self::new(), |set, &edge| set.with(edge, condition))
    }

    /// Builder form of [`BoundarySet::set`]
    pub fn with(mut self, edge: Edge, condition: BoundaryCondition) -> Self {
        self.set(edge, condition);
        self
    }

    /// Bind `condition` to `edge`, replacing any previous binding
    pub fn set(&mut self, edge: Edge, condition: BoundaryCondition) {
        self.conditions.insert(edge, condition);
    }

    /// Condition bound to `edge`, if any
    pub fn get(&self, edge: Edge) -> Option<&BoundaryCondition> {
        self.conditions.get(&edge)
    }

    /// Check that every edge of `grid` is bound, that no foreign edge is
    /// bound, and that every condition carries sane values
    ///
    /// # Errors
    ///
    /// [`HeatSimError::MissingBoundaryCondition`] for the first unbound edge in
    /// application order, otherwise [`HeatSimError::InvalidParameters`].
    pub fn validate(&self, grid: &Grid) -> Result<()> {
        for &edge in grid.edges() {
            let condition = self
                .get(edge)
                .ok_or(HeatSimError::MissingBoundaryCondition { edge })?;
            condition.validate()?;
            debug!("Boundary {:?}: {:?}", edge, condition);
        }
        for edge in Edge::ALL {
            if self.conditions.contains_key(&edge) && !grid.has_edge(edge) {
                return Err(HeatSimError::invalid_parameter(
                    edge.parameter_name(),
                    grid.dimensions() as f64,
                    "cannot be bound on a grid of this dimensionality",
                ));
            }
        }
        Ok(())
    }

    /// Apply every bound edge to `new`, reading from `old`, in application order
    ///
    /// # Panics
    ///
    /// Panics if `old` and `new` differ in dimensionality.
    pub fn apply(&self, old: &Field, new: &mut Field, coeffs: &StepCoefficients) {
        match (old, new) {
            (Field::Line(old), Field::Line(new)) => {
                for edge in [Edge::Left, Edge::Right] {
                    if let Some(condition) = self.get(edge) {
                        condition.apply_line(edge, old, new, coeffs);
                    }
                }
            }
            (Field::Plane(old), Field::Plane(new)) => {
                for edge in Edge::ALL {
                    if let Some(condition) = self.get(edge) {
                        condition.apply_plane(edge, old, new, coeffs);
                    }
                }
            }
            _ => panic!("Boundary application across fields of different dimensionality"),
        }
    }
}

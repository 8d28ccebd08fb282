//! Error taxonomy for simulation setup
//!
//! Every error here is raised before or at the first step; nothing is
//! recoverable mid-run and the engine never retries internally.

use crate::solver::Edge;
use std::fmt;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, HeatSimError>;

/// Errors that can occur while configuring a heat simulation
#[derive(Debug, Clone, PartialEq)]
pub enum HeatSimError {
    /// Non-positive or non-finite length, or node count below 2
    InvalidGrid {
        /// Name of the offending parameter (e.g. `"length_x"`, `"nodes_y"`)
        parameter: &'static str,
        /// Value that was supplied
        value: f64,
        /// What the value must satisfy
        constraint: &'static str,
    },
    /// Non-positive diffusivity or simulated time, or another bad physical value
    InvalidParameters {
        /// Name of the offending parameter
        parameter: &'static str,
        /// Value that was supplied
        value: f64,
        /// What the value must satisfy
        constraint: &'static str,
    },
    /// A caller-supplied time step violates the explicit stability bound
    UnstableConfiguration {
        /// Time step that was supplied
        dt: f64,
        /// Stability number `α·Δt·Σ(1/h²)` it produces
        stability_number: f64,
    },
    /// An edge has no bound boundary condition when stepping starts
    MissingBoundaryCondition {
        /// Edge without a policy
        edge: Edge,
    },
}

impl HeatSimError {
    pub(crate) fn invalid_grid(parameter: &'static str, value: f64, constraint: &'static str) -> Self {
        HeatSimError::InvalidGrid {
            parameter,
            value,
            constraint,
        }
    }

    pub(crate) fn invalid_parameter(
        parameter: &'static str,
        value: f64,
        constraint: &'static str,
    ) -> Self {
        HeatSimError::InvalidParameters {
            parameter,
            value,
            constraint,
        }
    }
}

impl fmt::Display for HeatSimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeatSimError::InvalidGrid {
                parameter,
                value,
                constraint,
            } => write!(f, "Invalid grid: {parameter} {constraint}, got {value}"),
            HeatSimError::InvalidParameters {
                parameter,
                value,
                constraint,
            } => write!(f, "Invalid parameters: {parameter} {constraint}, got {value}"),
            HeatSimError::UnstableConfiguration {
                dt,
                stability_number,
            } => write!(
                f,
                "Unstable configuration: dt={dt} gives stability number {stability_number:.6} > 0.5"
            ),
            HeatSimError::MissingBoundaryCondition { edge } => {
                write!(f, "Missing boundary condition for {edge:?} edge")
            }
        }
    }
}

impl std::error::Error for HeatSimError {}

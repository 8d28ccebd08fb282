//! Heat Simulation Core Library
//!
//! Explicit finite-difference integration of the heat equation on a regular
//! 1D or 2D grid:
//!
//! ```text
//! ∂T/∂t = α∇²T − h(T − T_amb)
//! ```
//!
//! with a Dirichlet, zero-flux or convective boundary condition on each edge.
//!
//! ## Pipeline
//!
//! - [`Grid`] builds node coordinates and spacing
//! - [`StabilityPlanner`] picks Δt on the stability bound `α·Δt·Σ(1/h²) ≤ 0.5`
//! - [`DiffusionStepper`] updates interior nodes from the frozen previous field
//! - [`BoundarySet`] fills every edge of the new field
//! - [`SimulationDriver`] owns the field and yields [`Snapshot`]s lazily
//!
//! ## Example
//!
//! ```
//! use heat_sim_core::{
//!     BoundaryCondition, BoundarySet, Grid, InitialCondition, SimulationConfig,
//!     SimulationDriver, ThermalParameters,
//! };
//!
//! let grid = Grid::line(1.0, 5)?;
//! let config = SimulationConfig::new(
//!     grid,
//!     ThermalParameters::new(1.0),
//!     0.1,
//!     InitialCondition::Uniform(20.0),
//!     BoundarySet::uniform(grid.edges(), BoundaryCondition::fixed(100.0)),
//! );
//!
//! for snapshot in SimulationDriver::new(config)?.run() {
//!     assert!(snapshot.field.max() <= 100.0);
//! }
//! # Ok::<(), heat_sim_core::HeatSimError>(())
//! ```

pub mod error;
pub mod grid;
pub mod simulation;
pub mod solver;

// Re-export core types
pub use error::{HeatSimError, Result};
pub use grid::{Axis, Grid};
pub use simulation::{
    presets, CancelHandle, InitialCondition, RunSummary, SimulationConfig, SimulationDriver,
    SimulationState, Snapshot, SnapshotSink, SnapshotStream, ThermalParameters,
};
pub use solver::{
    BoundaryCondition, BoundarySet, ConvectiveLoss, DiffusionStepper, Edge, Field,
    StabilityPlanner, StepCoefficients, TimeDiscretization,
};

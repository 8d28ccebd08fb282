//! Simulation orchestration
//!
//! [`SimulationDriver`] owns the temperature field and time counter, calls the
//! stepper and the boundary conditions once per step, and hands out snapshots
//! through a pull-based [`SnapshotStream`].

mod config;
mod driver;
pub mod presets;

pub use config::{InitialCondition, SimulationConfig, ThermalParameters};
pub use driver::{
    CancelHandle, RunSummary, SimulationDriver, SimulationState, Snapshot, SnapshotSink,
    SnapshotStream,
};

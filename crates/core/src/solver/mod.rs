//! Numerical stepping engine
//!
//! Leaf components of the explicit heat-equation solver:
//!
//! - [`StabilityPlanner`] derives a stable time step from the grid spacing
//! - [`DiffusionStepper`] computes interior updates from a frozen field
//! - [`BoundarySet`] fills the edges of the next-state field
//!
//! Old and new states always live in separate buffers; nothing here mutates
//! the field it reads from.

mod boundary;
mod fields;
mod heat_transfer;
mod stability;

// Re-exports
pub use boundary::{BoundaryCondition, BoundarySet, Edge};
pub use fields::Field;
pub use heat_transfer::{
    step_line_cpu, step_plane_cpu, ConvectiveLoss, DiffusionStepper, StepCoefficients,
};
pub use stability::{StabilityPlanner, TimeDiscretization, STABILITY_LIMIT};

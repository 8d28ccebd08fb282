//! Grid-based spatial discretization

pub mod spatial_grid;

// Re-export main types
pub use spatial_grid::*;

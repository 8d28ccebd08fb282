//! Ready-made scenarios
//!
//! Classic rod and plate set-ups: a rod heated from both ends, a decaying
//! sine profile, a rod with one insulated end, a rod losing heat to the air,
//! and a square plate with a hot top edge. Each takes an optional duration
//! override; `None` keeps the scenario's default.

use super::config::{InitialCondition, SimulationConfig, ThermalParameters};
use crate::error::Result;
use crate::grid::Grid;
use crate::solver::{BoundaryCondition, BoundarySet, Edge};

/// Rod length for every rod preset (m)
const ROD_LENGTH: f64 = 1.0;
/// Rod node count, endpoints included
const ROD_NODES: usize = 10;

/// Initial profile holding `interior` everywhere except the two rod ends
fn rod_with_ends(interior: f64, left: f64, right: f64) -> InitialCondition {
    InitialCondition::custom(move |p| {
        if p[0] <= 0.0 {
            left
        } else if p[0] >= ROD_LENGTH {
            right
        } else {
            interior
        }
    })
}

/// Rod at 20 with both ends held at 100
///
/// Default duration 1000 s.
///
/// # Errors
///
/// Only fails on an invalid grid; a bad `total_time` override surfaces when
/// the config is planned.
pub fn rod_dirichlet(total_time: Option<f64>) -> Result<SimulationConfig> {
    let grid = Grid::line(ROD_LENGTH, ROD_NODES)?;
    Ok(SimulationConfig::new(
        grid,
        ThermalParameters::new(1.0),
        total_time.unwrap_or(1000.0),
        rod_with_ends(20.0, 100.0, 100.0),
        BoundarySet::uniform(grid.edges(), BoundaryCondition::fixed(100.0)),
    ))
}

/// `10·sin(πx)` decaying toward ends held at 0
///
/// Default duration 10 s.
///
/// # Errors
///
/// Only fails on an invalid grid.
pub fn rod_sine(total_time: Option<f64>) -> Result<SimulationConfig> {
    let grid = Grid::line(ROD_LENGTH, ROD_NODES)?;
    Ok(SimulationConfig::new(
        grid,
        ThermalParameters::new(1.0),
        total_time.unwrap_or(10.0),
        InitialCondition::Sine { amplitude: 10.0 },
        BoundarySet::uniform(grid.edges(), BoundaryCondition::fixed(0.0)),
    ))
}

/// Rod at 20, left end held at 100, right end insulated
///
/// Default duration 1000 s.
///
/// # Errors
///
/// Only fails on an invalid grid.
pub fn rod_insulated_end(total_time: Option<f64>) -> Result<SimulationConfig> {
    let grid = Grid::line(ROD_LENGTH, ROD_NODES)?;
    let boundaries = BoundarySet::new()
        .with(Edge::Left, BoundaryCondition::fixed(100.0))
        .with(Edge::Right, BoundaryCondition::ZeroFlux);
    Ok(SimulationConfig::new(
        grid,
        ThermalParameters::new(1.0),
        total_time.unwrap_or(1000.0),
        rod_with_ends(20.0, 100.0, 20.0),
        boundaries,
    ))
}

/// Rod with both ends at 100 losing heat along its length to 20 °C air
///
/// Loss coefficient 0.1 1/s. Default duration 1000 s.
///
/// # Errors
///
/// Only fails on an invalid grid.
pub fn rod_convective_loss(total_time: Option<f64>) -> Result<SimulationConfig> {
    let grid = Grid::line(ROD_LENGTH, ROD_NODES)?;
    Ok(SimulationConfig::new(
        grid,
        ThermalParameters::new(1.0).with_convective_loss(0.1, 20.0),
        total_time.unwrap_or(1000.0),
        rod_with_ends(20.0, 100.0, 100.0),
        BoundarySet::uniform(grid.edges(), BoundaryCondition::fixed(100.0)),
    ))
}

/// Unit plate at 50 with its top edge held at 200 and the others at 50
///
/// 50 × 50 intervals (51 × 51 nodes) with a fixed Δt of 1e-4 s, which sits
/// on the stability bound. Default duration 300 steps (0.03 s).
///
/// # Errors
///
/// Only fails on an invalid grid.
pub fn plate_hot_top(total_time: Option<f64>) -> Result<SimulationConfig> {
    const PLATE_LENGTH: f64 = 1.0;
    const PLATE_NODES: usize = 51;
    const PLATE_DT: f64 = 1e-4;

    let grid = Grid::plane((PLATE_LENGTH, PLATE_NODES), (PLATE_LENGTH, PLATE_NODES))?;
    let boundaries = BoundarySet::uniform(
        &[Edge::Left, Edge::Right, Edge::Bottom],
        BoundaryCondition::fixed(50.0),
    )
    .with(Edge::Top, BoundaryCondition::fixed(200.0));

    Ok(SimulationConfig::new(
        grid,
        ThermalParameters::new(1.0),
        total_time.unwrap_or(300.0 * PLATE_DT),
        InitialCondition::custom(|p| if p[1] >= PLATE_LENGTH { 200.0 } else { 50.0 }),
        boundaries,
    )
    .with_time_step(PLATE_DT))
}

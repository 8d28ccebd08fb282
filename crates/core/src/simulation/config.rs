//! In-memory simulation configuration
//!
//! Everything the driver needs is handed over in one [`SimulationConfig`]:
//! grid, thermal parameters, duration, optional fixed time step, initial
//! condition and the per-edge boundary policies. There is no file format;
//! the serde derives exist so host applications can embed the config in
//! their own settings.

use crate::error::{HeatSimError, Result};
use crate::grid::Grid;
use crate::solver::{BoundarySet, ConvectiveLoss, Field, StabilityPlanner, TimeDiscretization};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

/// Material and ambient-exchange parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalParameters {
    /// Thermal diffusivity α (m²/s)
    pub diffusivity: f64,
    /// Optional interior convective loss `h·(T − T_amb)`
    #[serde(default)]
    pub convective: Option<ConvectiveLoss>,
}

impl ThermalParameters {
    /// Pure diffusion with diffusivity `α`
    pub fn new(diffusivity: f64) -> Self {
        Self {
            diffusivity,
            convective: None,
        }
    }

    /// Enable the interior convective sink
    pub fn with_convective_loss(mut self, coefficient: f64, ambient: f64) -> Self {
        self.convective = Some(ConvectiveLoss {
            coefficient,
            ambient,
        });
        self
    }

    fn validate_convective(&self) -> Result<()> {
        if let Some(loss) = self.convective {
            if !loss.coefficient.is_finite() || loss.coefficient < 0.0 {
                return Err(HeatSimError::invalid_parameter(
                    "convective_coefficient",
                    loss.coefficient,
                    "must be finite and non-negative",
                ));
            }
            if !loss.ambient.is_finite() {
                return Err(HeatSimError::invalid_parameter(
                    "convective_ambient",
                    loss.ambient,
                    "must be finite",
                ));
            }
        }
        Ok(())
    }
}

/// Initial temperature `T0(position)`, evaluated once at every node
///
/// `position` is `[x]` on a rod and `[x, y]` on a plate.
#[derive(Clone, Serialize, Deserialize)]
pub enum InitialCondition {
    /// Same temperature everywhere
    Uniform(f64),
    /// `amplitude·sin(πx/Lx)`, times `sin(πy/Ly)` on a plate
    Sine {
        /// Peak temperature
        amplitude: f64,
    },
    /// Arbitrary function of position
    #[serde(skip)]
    Custom(Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>),
}

impl InitialCondition {
    /// Wrap a closure as a custom initial condition
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        InitialCondition::Custom(Arc::new(f))
    }

    /// Evaluate at every node of `grid`
    ///
    /// # Errors
    ///
    /// Returns [`HeatSimError::InvalidParameters`] if any node evaluates to a
    /// non-finite temperature.
    pub fn evaluate(&self, grid: &Grid) -> Result<Field> {
        let field = match self {
            InitialCondition::Uniform(value) => Field::uniform(grid, *value),
            InitialCondition::Sine { amplitude } => {
                let lx = grid.x_axis().length();
                let ly = grid.y_axis().map(|y| y.length());
                Field::from_fn(grid, |p| {
                    let sx = (PI * p[0] / lx).sin();
                    match ly {
                        Some(ly) => amplitude * sx * (PI * p[1] / ly).sin(),
                        None => amplitude * sx,
                    }
                })
            }
            InitialCondition::Custom(f) => Field::from_fn(grid, &**f),
        };

        if let Some(bad) = field.as_slice().iter().find(|v| !v.is_finite()) {
            return Err(HeatSimError::invalid_parameter(
                "initial_condition",
                *bad,
                "must evaluate to finite temperatures",
            ));
        }
        Ok(field)
    }
}

impl fmt::Debug for InitialCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitialCondition::Uniform(value) => f.debug_tuple("Uniform").field(value).finish(),
            InitialCondition::Sine { amplitude } => f
                .debug_struct("Sine")
                .field("amplitude", amplitude)
                .finish(),
            InitialCondition::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

/// Complete description of one simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Spatial discretization
    pub grid: Grid,
    /// Diffusivity and optional convective loss
    pub thermal: ThermalParameters,
    /// Simulated duration in seconds
    pub total_time: f64,
    /// Caller-chosen Δt; `None` lets the stability planner choose
    #[serde(default)]
    pub time_step: Option<f64>,
    /// Temperature at t = 0
    pub initial: InitialCondition,
    /// Policy per edge
    pub boundaries: BoundarySet,
}

impl SimulationConfig {
    /// Config with a planner-chosen time step
    pub fn new(
        grid: Grid,
        thermal: ThermalParameters,
        total_time: f64,
        initial: InitialCondition,
        boundaries: BoundarySet,
    ) -> Self {
        Self {
            grid,
            thermal,
            total_time,
            time_step: None,
            initial,
            boundaries,
        }
    }

    /// Use a fixed Δt instead of the planner's choice
    pub fn with_time_step(mut self, dt: f64) -> Self {
        self.time_step = Some(dt);
        self
    }

    /// Replace the simulated duration
    pub fn with_total_time(mut self, total_time: f64) -> Self {
        self.total_time = total_time;
        self
    }

    /// Validate parameters and derive the time discretization
    ///
    /// # Errors
    ///
    /// Any [`HeatSimError`] except `InvalidGrid`, which is raised when the
    /// [`Grid`] itself is built.
    pub fn plan(&self) -> Result<TimeDiscretization> {
        let plan = match self.time_step {
            Some(dt) => StabilityPlanner::with_step(
                &self.grid,
                self.thermal.diffusivity,
                self.total_time,
                dt,
            )?,
            None => StabilityPlanner::plan(&self.grid, self.thermal.diffusivity, self.total_time)?,
        };
        self.thermal.validate_convective()?;
        self.boundaries.validate(&self.grid)?;
        Ok(plan)
    }
}

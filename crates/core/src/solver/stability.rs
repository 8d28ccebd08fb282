//! Stability-constrained time step selection
//!
//! The explicit scheme is stable when the stability number
//!
//! ```text
//! λ = α·Δt·Σ(1/h²) ≤ 0.5
//! ```
//!
//! summed over every grid axis (in 1D this is `α·Δt/Δx² ≤ 0.5`). The planner
//! picks Δt on the marginal bound itself, not below it.

use crate::error::{HeatSimError, Result};
use crate::grid::Grid;
use serde::{Deserialize, Serialize};

/// Upper bound on the stability number for the explicit scheme
pub const STABILITY_LIMIT: f64 = 0.5;

/// Absolute slack for caller-supplied steps that sit on the bound but pick up
/// representation error (e.g. dt = 1e-4 on a 0.02 mesh)
const STABILITY_SLACK: f64 = 1e-12;

/// Relative tolerance under which `total / dt` counts as an exact multiple
const STEP_COUNT_TOLERANCE: f64 = 1e-9;

/// Shrink attempts before a rounded-up Δt is reported as unstable
const MAX_SHRINKS: usize = 8;

/// Step counts at or above 2^53 are no longer exact in `f64`
const MAX_STEPS: f64 = 9_007_199_254_740_992.0;

/// Time step and step count derived from the grid and diffusivity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeDiscretization {
    /// Time step Δt in seconds
    pub dt: f64,
    /// Steps needed to cover the requested duration (rounded up)
    pub step_count: usize,
    /// Combined stability number α·Δt·Σ(1/h²); at most 0.5 plus the 1e-12
    /// slack [`StabilityPlanner::with_step`] allows
    pub stability_number: f64,
    /// Per-axis ratio α·Δt/Δx²
    pub lambda_x: f64,
    /// Per-axis ratio α·Δt/Δy² (zero in 1D)
    pub lambda_y: f64,
}

impl TimeDiscretization {
    fn new(grid: &Grid, diffusivity: f64, total_time: f64, dt: f64) -> Result<Self> {
        let (dx, dy) = grid.spacing();
        Ok(Self {
            dt,
            step_count: step_count(total_time, dt)?,
            stability_number: StabilityPlanner::stability_number(grid, diffusivity, dt),
            lambda_x: diffusivity * dt / (dx * dx),
            lambda_y: dy.map_or(0.0, |dy| diffusivity * dt / (dy * dy)),
        })
    }

    /// Simulated time covered once every step has run
    ///
    /// Never less than the requested duration.
    pub fn covered_time(&self) -> f64 {
        self.dt * self.step_count as f64
    }
}

/// Derives `(Δt, step_count)` pairs that satisfy the stability bound
pub struct StabilityPlanner;

impl StabilityPlanner {
    /// Choose the largest stable Δt for `grid` and count the steps to reach `total_time`
    ///
    /// # Errors
    ///
    /// Returns [`HeatSimError::InvalidParameters`] when `diffusivity` or
    /// `total_time` is non-positive or non-finite, when the derived Δt is not
    /// a finite positive number, or when the duration needs more steps than
    /// can be counted.
    pub fn plan(grid: &Grid, diffusivity: f64, total_time: f64) -> Result<TimeDiscretization> {
        validate_inputs(diffusivity, total_time)?;

        let mut dt = STABILITY_LIMIT / (diffusivity * grid.inverse_spacing_sq_sum());
        if !dt.is_finite() || dt <= 0.0 {
            return Err(HeatSimError::invalid_parameter(
                "diffusivity",
                diffusivity,
                "gives no representable stable time step on this grid",
            ));
        }

        // Recomputing λ from dt can round to just above the bound
        let mut shrinks = 0;
        loop {
            let stability_number = Self::stability_number(grid, diffusivity, dt);
            if stability_number <= STABILITY_LIMIT {
                break;
            }
            if shrinks == MAX_SHRINKS {
                return Err(HeatSimError::UnstableConfiguration {
                    dt,
                    stability_number,
                });
            }
            dt *= 1.0 - f64::EPSILON;
            shrinks += 1;
        }

        TimeDiscretization::new(grid, diffusivity, total_time, dt)
    }

    /// Validate a caller-chosen Δt instead of deriving one
    ///
    /// A step that lands on the bound up to representation error is accepted,
    /// so the returned `stability_number` may exceed 0.5 by at most 1e-12.
    ///
    /// # Errors
    ///
    /// Returns [`HeatSimError::InvalidParameters`] for bad `diffusivity`,
    /// `total_time` or `dt`, and [`HeatSimError::UnstableConfiguration`] when
    /// `dt` pushes the stability number above 0.5.
    pub fn with_step(
        grid: &Grid,
        diffusivity: f64,
        total_time: f64,
        dt: f64,
    ) -> Result<TimeDiscretization> {
        validate_inputs(diffusivity, total_time)?;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(HeatSimError::invalid_parameter(
                "time_step",
                dt,
                "must be finite and positive",
            ));
        }

        let stability_number = Self::stability_number(grid, diffusivity, dt);
        if stability_number > STABILITY_LIMIT + STABILITY_SLACK {
            return Err(HeatSimError::UnstableConfiguration {
                dt,
                stability_number,
            });
        }

        TimeDiscretization::new(grid, diffusivity, total_time, dt)
    }

    /// Stability number α·Δt·Σ(1/h²) for a given step
    pub fn stability_number(grid: &Grid, diffusivity: f64, dt: f64) -> f64 {
        diffusivity * dt * grid.inverse_spacing_sq_sum()
    }
}

fn validate_inputs(diffusivity: f64, total_time: f64) -> Result<()> {
    if !diffusivity.is_finite() || diffusivity <= 0.0 {
        return Err(HeatSimError::invalid_parameter(
            "diffusivity",
            diffusivity,
            "must be finite and positive",
        ));
    }
    if !total_time.is_finite() || total_time <= 0.0 {
        return Err(HeatSimError::invalid_parameter(
            "total_time",
            total_time,
            "must be finite and positive",
        ));
    }
    Ok(())
}

/// Smallest step count whose covered time reaches `total_time`
fn step_count(total_time: f64, dt: f64) -> Result<usize> {
    let ratio = total_time / dt;
    if !ratio.is_finite() || ratio >= MAX_STEPS {
        return Err(HeatSimError::invalid_parameter(
            "total_time",
            total_time,
            "needs more steps than can be counted at this time step",
        ));
    }

    // Snap rounding noise to an exact multiple, but never below the duration
    let nearest = ratio.round();
    let snapped = (ratio - nearest).abs() <= STEP_COUNT_TOLERANCE * nearest.max(1.0)
        && dt * nearest >= total_time;
    let rounded = if snapped { nearest } else { ratio.ceil() };
    let mut steps = (rounded as usize).max(1);
    while dt * (steps as f64) < total_time {
        steps += 1;
    }
    Ok(steps)
}

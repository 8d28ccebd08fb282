//! Simulation driver: owns the field and advances it step by step
//!
//! Lifecycle:
//!
//! ```text
//! Initialized ──step()──▶ Running ──(iteration == step_count)──▶ Completed
//!      │                     │
//!      └──────cancel()───────┴──────────────────────────────────▶ Cancelled
//! ```
//!
//! Cancellation is cooperative and only observed between steps. A finished
//! driver cannot be restarted; build a new one from the same config.

use super::config::SimulationConfig;
use crate::error::Result;
use crate::grid::Grid;
use crate::solver::{BoundarySet, DiffusionStepper, Field, StepCoefficients, TimeDiscretization};
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, trace, warn};

/// Where the driver is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationState {
    /// Field holds the initial condition, no step taken yet
    Initialized,
    /// At least one step taken, more remain
    Running,
    /// Every planned step has run
    Completed,
    /// Stopped early by the consumer
    Cancelled,
}

impl SimulationState {
    /// Whether no further steps will be produced
    pub fn is_finished(self) -> bool {
        matches!(self, SimulationState::Completed | SimulationState::Cancelled)
    }
}

/// Field state emitted after each step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Simulated time in seconds
    pub time: f64,
    /// Steps taken so far (0 for the initial state)
    pub iteration: usize,
    /// Copy of the temperature field
    pub field: Field,
}

/// Consumer of snapshots, e.g. a renderer
///
/// Implemented for any `FnMut(&Snapshot)` closure.
pub trait SnapshotSink {
    /// Called once per step, in step order
    fn receive(&mut self, snapshot: &Snapshot);
}

impl<F> SnapshotSink for F
where
    F: FnMut(&Snapshot),
{
    fn receive(&mut self, snapshot: &Snapshot) {
        self(snapshot);
    }
}

/// Shared flag used to request cancellation from outside the driver
///
/// Cloning shares the flag. The driver checks it before every step.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Request that stepping stops at the next step boundary
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Outcome of draining a run into a sink
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Steps delivered to the sink
    pub steps: usize,
    /// Simulated time at the last step
    pub final_time: f64,
    /// Terminal state (`Completed` or `Cancelled`)
    pub state: SimulationState,
}

/// Explicit heat-equation simulation with exclusive ownership of its field
pub struct SimulationDriver {
    grid: Grid,
    plan: TimeDiscretization,
    stepper: DiffusionStepper,
    boundaries: BoundarySet,
    field: Field,
    time: f64,
    iteration: usize,
    state: SimulationState,
    cancel: CancelHandle,
}

impl SimulationDriver {
    /// Validate `config`, plan the time step and evaluate the initial field
    ///
    /// # Errors
    ///
    /// Returns the first configuration problem found; see
    /// [`SimulationConfig::plan`] and [`InitialCondition::evaluate`](super::InitialCondition::evaluate).
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let plan = config.plan()?;
        let field = config.initial.evaluate(&config.grid)?;
        let coeffs = StepCoefficients::new(&plan, config.thermal.convective);

        let (nx, ny) = config.grid.shape();
        info!(
            "Heat simulation initialized: {}D grid {}x{}, dt={:.4e}s, steps={}, lambda={:.4}",
            config.grid.dimensions(),
            nx,
            ny,
            plan.dt,
            plan.step_count,
            plan.stability_number
        );
        if config.thermal.convective.is_some() && coeffs.self_weight() < 0.0 {
            warn!(
                "Convective loss makes the update non-convex (self weight {:.4}); \
                 temperatures may overshoot the ambient value",
                coeffs.self_weight()
            );
        }

        Ok(Self {
            grid: config.grid,
            plan,
            stepper: DiffusionStepper::new(coeffs),
            boundaries: config.boundaries,
            field,
            time: 0.0,
            iteration: 0,
            state: SimulationState::Initialized,
            cancel: CancelHandle::default(),
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Simulated time in seconds
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Steps taken so far
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Current temperature field
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Spatial grid
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Time step and step count in use
    pub fn discretization(&self) -> &TimeDiscretization {
        &self.plan
    }

    /// Boundary policies in use
    pub fn boundaries(&self) -> &BoundarySet {
        &self.boundaries
    }

    /// Handle that stops the driver at the next step boundary
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Stop now; further `step()` calls return `None`
    ///
    /// Has no effect once the run has completed.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        if !self.state.is_finished() {
            self.finish(SimulationState::Cancelled);
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time: self.time,
            iteration: self.iteration,
            field: self.field.clone(),
        }
    }

    /// Advance one step and return the new state, or `None` once finished
    ///
    /// Interior update, then boundary conditions in edge order, both reading
    /// the pre-step field and writing a fresh buffer that then replaces it.
    pub fn step(&mut self) -> Option<Snapshot> {
        if self.state.is_finished() {
            return None;
        }
        if self.cancel.is_cancelled() {
            self.finish(SimulationState::Cancelled);
            return None;
        }

        let mut next = self.stepper.step(&self.field);
        self.boundaries
            .apply(&self.field, &mut next, self.stepper.coefficients());
        debug_assert!(
            !next.as_slice().iter().any(|v| v.is_nan()),
            "boundary conditions left a node unset"
        );

        self.field = next;
        self.iteration += 1;
        self.time = self.iteration as f64 * self.plan.dt;
        self.state = SimulationState::Running;

        trace!(
            "Step {}/{}: t={:.6}s, range=[{:.3}, {:.3}]",
            self.iteration,
            self.plan.step_count,
            self.time,
            self.field.min(),
            self.field.max()
        );

        if self.iteration >= self.plan.step_count {
            self.finish(SimulationState::Completed);
        }

        Some(self.snapshot())
    }

    /// Turn the driver into a lazy, finite stream of snapshots
    pub fn run(self) -> SnapshotStream {
        SnapshotStream { driver: self }
    }

    fn finish(&mut self, state: SimulationState) {
        self.state = state;
        info!(
            "Heat simulation {:?} after {} of {} steps (t={:.6}s)",
            state, self.iteration, self.plan.step_count, self.time
        );
    }
}

/// Pull-based sequence of snapshots, one per step
///
/// Consumes its driver, so a stream cannot be restarted.
pub struct SnapshotStream {
    driver: SimulationDriver,
}

impl SnapshotStream {
    /// Handle that stops the stream at the next step boundary
    pub fn cancel_handle(&self) -> CancelHandle {
        self.driver.cancel_handle()
    }

    /// Lifecycle state of the underlying driver
    pub fn state(&self) -> SimulationState {
        self.driver.state()
    }

    /// Read-only access to the underlying driver
    pub fn driver(&self) -> &SimulationDriver {
        &self.driver
    }

    /// Push every remaining snapshot into `sink`
    pub fn drain_into<S>(mut self, sink: &mut S) -> RunSummary
    where
        S: SnapshotSink + ?Sized,
    {
        let mut steps = 0;
        for snapshot in self.by_ref() {
            sink.receive(&snapshot);
            steps += 1;
        }
        RunSummary {
            steps,
            final_time: self.driver.time(),
            state: self.driver.state(),
        }
    }
}

impl Iterator for SnapshotStream {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Snapshot> {
        self.driver.step()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.driver.state.is_finished() {
            return (0, Some(0));
        }
        // Cancellation can cut the run short at any step
        let remaining = self.driver.plan.step_count - self.driver.iteration;
        (0, Some(remaining))
    }
}

impl FusedIterator for SnapshotStream {}

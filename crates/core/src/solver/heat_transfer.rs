//! Explicit finite-difference diffusion step
//!
//! Implements one forward-Euler step of the heat equation with an optional
//! linear convective sink:
//!
//! ```text
//! ∂T/∂t = α∇²T − h(T − T_amb)
//! ```
//!
//! Discretized on interior nodes only:
//!
//! ```text
//! new[i]    = old[i] + λx·(old[i+1] − 2·old[i] + old[i−1]) − h·Δt·(old[i] − T_amb)
//! new[i, j] = old[i, j] + λx·δ²x + λy·δ²y − h·Δt·(old[i, j] − T_amb)
//! ```
//!
//! with `λx = α·Δt/Δx²` and `λy = α·Δt/Δy²`. Every update reads the frozen
//! `old` field and writes into a freshly allocated result; edge entries of the
//! result are left as `NaN` for the boundary conditions to fill.

use super::fields::Field;
use super::stability::TimeDiscretization;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Linear heat loss toward an ambient temperature, applied at interior nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvectiveLoss {
    /// Loss coefficient h (1/s)
    pub coefficient: f64,
    /// Ambient temperature T_amb
    pub ambient: f64,
}

/// Coefficients shared by the interior stencil and the boundary conditions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepCoefficients {
    /// Time step Δt in seconds
    pub dt: f64,
    /// α·Δt/Δx²
    pub lambda_x: f64,
    /// α·Δt/Δy² (zero for a rod)
    pub lambda_y: f64,
    /// Optional interior convective sink
    pub convective: Option<ConvectiveLoss>,
}

impl StepCoefficients {
    /// Build from a planned time discretization
    pub fn new(plan: &TimeDiscretization, convective: Option<ConvectiveLoss>) -> Self {
        Self {
            dt: plan.dt,
            lambda_x: plan.lambda_x,
            lambda_y: plan.lambda_y,
            convective,
        }
    }

    /// Weight the update leaves on a node's own previous value: `1 − 2Σλ − hΔt`
    ///
    /// When negative the update is no longer a convex combination of old
    /// values and the maximum principle can fail.
    pub fn self_weight(&self) -> f64 {
        let loss = self.convective.map_or(0.0, |c| c.coefficient * self.dt);
        1.0 - 2.0 * (self.lambda_x + self.lambda_y) - loss
    }

    #[inline]
    fn sink(&self, t: f64) -> f64 {
        self.convective
            .map_or(0.0, |c| c.coefficient * self.dt * (t - c.ambient))
    }
}

/// One explicit interior step over a rod
///
/// Returns a new vector; entries `0` and `N-1` are `NaN`.
pub fn step_line_cpu(old: &DVector<f64>, coeffs: &StepCoefficients) -> DVector<f64> {
    let n = old.len();
    let mut new = DVector::from_element(n, f64::NAN);

    for i in 1..n.saturating_sub(1) {
        let t = old[i];
        new[i] = t + coeffs.lambda_x * (old[i + 1] - 2.0 * t + old[i - 1]) - coeffs.sink(t);
    }

    new
}

/// One explicit interior step over a plate
///
/// Columns (fixed `j`) are contiguous in nalgebra's column-major storage and
/// are updated in parallel. Rows `0`, `nx-1` and columns `0`, `ny-1` are `NaN`.
pub fn step_plane_cpu(old: &DMatrix<f64>, coeffs: &StepCoefficients) -> DMatrix<f64> {
    let (nx, ny) = old.shape();
    let mut data = vec![f64::NAN; nx * ny];

    data.par_chunks_mut(nx)
        .enumerate()
        .for_each(|(j, column)| {
            if j == 0 || j + 1 == ny {
                return;
            }
            for i in 1..nx - 1 {
                let t = old[(i, j)];
                let d2x = old[(i + 1, j)] - 2.0 * t + old[(i - 1, j)];
                let d2y = old[(i, j + 1)] - 2.0 * t + old[(i, j - 1)];
                column[i] = t + coeffs.lambda_x * d2x + coeffs.lambda_y * d2y - coeffs.sink(t);
            }
        });

    DMatrix::from_vec(nx, ny, data)
}

/// Computes interior updates for either field variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffusionStepper {
    coeffs: StepCoefficients,
}

impl DiffusionStepper {
    /// Create a stepper for fixed coefficients
    pub fn new(coeffs: StepCoefficients) -> Self {
        Self { coeffs }
    }

    /// Coefficients used for every step
    pub fn coefficients(&self) -> &StepCoefficients {
        &self.coeffs
    }

    /// Interior update of `old` into a new field; `old` is never modified
    pub fn step(&self, old: &Field) -> Field {
        match old {
            Field::Line(v) => Field::Line(step_line_cpu(v, &self.coeffs)),
            Field::Plane(m) => Field::Plane(step_plane_cpu(m, &self.coeffs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn coeffs(lambda_x: f64, lambda_y: f64) -> StepCoefficients {
        StepCoefficients {
            dt: 0.1,
            lambda_x,
            lambda_y,
            convective: None,
        }
    }

    #[test]
    fn test_line_interior_stencil() {
        let old = DVector::from_vec(vec![100.0, 20.0, 20.0, 20.0, 100.0]);
        let new = step_line_cpu(&old, &coeffs(0.5, 0.0));

        assert!(new[0].is_nan(), "left edge must be left unset");
        assert!(new[4].is_nan(), "right edge must be left unset");
        assert_relative_eq!(new[1], 60.0);
        assert_relative_eq!(new[2], 20.0);
        assert_relative_eq!(new[3], 60.0);
    }

    #[test]
    fn test_line_convective_sink() {
        let old = DVector::from_vec(vec![50.0, 50.0, 50.0]);
        let mut c = coeffs(0.25, 0.0);
        c.convective = Some(ConvectiveLoss {
            coefficient: 0.5,
            ambient: 10.0,
        });
        let new = step_line_cpu(&old, &c);
        // Flat profile: only the sink acts, 0.5 * 0.1 * (50 - 10) = 2
        assert_relative_eq!(new[1], 48.0);
    }

    #[test]
    fn test_two_node_line_has_no_interior() {
        let old = DVector::from_vec(vec![1.0, 2.0]);
        let new = step_line_cpu(&old, &coeffs(0.5, 0.0));
        assert!(new.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_plane_matches_sequential_reference() {
        let (nx, ny) = (7, 5);
        let old = DMatrix::from_fn(nx, ny, |i, j| ((i * 13 + j * 7) % 11) as f64);
        let c = StepCoefficients {
            dt: 0.01,
            lambda_x: 0.2,
            lambda_y: 0.15,
            convective: Some(ConvectiveLoss {
                coefficient: 1.0,
                ambient: 3.0,
            }),
        };
        let new = step_plane_cpu(&old, &c);

        for j in 0..ny {
            for i in 0..nx {
                if i == 0 || j == 0 || i == nx - 1 || j == ny - 1 {
                    assert!(new[(i, j)].is_nan(), "edge ({i}, {j}) must be unset");
                    continue;
                }
                let t = old[(i, j)];
                let expected = t
                    + 0.2 * (old[(i + 1, j)] - 2.0 * t + old[(i - 1, j)])
                    + 0.15 * (old[(i, j + 1)] - 2.0 * t + old[(i, j - 1)])
                    - 0.01 * (t - 3.0);
                assert_relative_eq!(new[(i, j)], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_stepper_does_not_mutate_input() {
        let old = Field::Plane(DMatrix::from_fn(6, 6, |i, j| (i as f64).sin() + j as f64));
        let snapshot = old.clone();
        let stepper = DiffusionStepper::new(coeffs(0.1, 0.1));

        let first = stepper.step(&old);
        let second = stepper.step(&old);

        assert_eq!(old, snapshot);
        let (a, b) = (first.as_plane().unwrap(), second.as_plane().unwrap());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!(x == y || (x.is_nan() && y.is_nan()));
        }
    }

    #[test]
    fn test_self_weight() {
        let mut c = coeffs(0.2, 0.2);
        assert_relative_eq!(c.self_weight(), 0.2);
        c.convective = Some(ConvectiveLoss {
            coefficient: 5.0,
            ambient: 0.0,
        });
        assert_relative_eq!(c.self_weight(), -0.3);
    }
}

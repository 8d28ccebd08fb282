//! Driver lifecycle, cancellation and configuration error tests
//!
//! Run tests with: `cargo test --test driver_lifecycle`

use approx::assert_relative_eq;
use heat_sim_core::{
    presets, BoundaryCondition, BoundarySet, Edge, Grid, HeatSimError, InitialCondition,
    SimulationConfig, SimulationDriver, SimulationState, Snapshot, SnapshotSink,
    ThermalParameters,
};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Rod of 5 nodes at 20 with both ends held at 100
fn hot_ended_rod(total_time: f64) -> SimulationConfig {
    let grid = Grid::line(1.0, 5).unwrap();
    SimulationConfig::new(
        grid,
        ThermalParameters::new(1.0),
        total_time,
        InitialCondition::Uniform(20.0),
        BoundarySet::uniform(grid.edges(), BoundaryCondition::fixed(100.0)),
    )
}

#[test]
fn test_hot_ended_rod_first_step() {
    let mut driver = SimulationDriver::new(hot_ended_rod(1.0)).unwrap();
    assert_eq!(driver.discretization().dt, 0.03125);
    assert_relative_eq!(driver.discretization().stability_number, 0.5);

    let snapshot = driver.step().unwrap();
    let v = snapshot.field.as_line().unwrap();
    assert_eq!(v[0], 100.0);
    assert_eq!(v[4], 100.0);
    assert_relative_eq!(v[1], 60.0, epsilon = 1e-12);
    assert_relative_eq!(v[2], 20.0, epsilon = 1e-12);
    assert_relative_eq!(v[3], 60.0, epsilon = 1e-12);

    let interior_mean = (v[1] + v[2] + v[3]) / 3.0;
    assert!(interior_mean > 20.0 && interior_mean < 100.0);
}

#[test]
fn test_hot_ended_rod_approaches_end_temperature() {
    let driver = SimulationDriver::new(hot_ended_rod(5.0)).unwrap();
    let last = driver.run().last().unwrap();
    for &t in last.field.as_slice() {
        assert_relative_eq!(t, 100.0, epsilon = 1e-6);
    }
}

#[test]
fn test_snapshots_are_sequential() {
    let driver = SimulationDriver::new(presets::rod_sine(Some(0.1)).unwrap()).unwrap();
    let dt = driver.discretization().dt;
    let expected = driver.discretization().step_count;

    let snapshots: Vec<Snapshot> = driver.run().collect();
    assert_eq!(snapshots.len(), expected);
    for (k, snapshot) in snapshots.iter().enumerate() {
        assert_eq!(snapshot.iteration, k + 1);
        assert_relative_eq!(snapshot.time, (k + 1) as f64 * dt);
    }
    assert!(snapshots.last().unwrap().time >= 0.1);
}

#[test]
fn test_cancel_handle_stops_stream() {
    let config = presets::rod_dirichlet(None).unwrap();
    let mut stream = SimulationDriver::new(config).unwrap().run();
    let handle = stream.cancel_handle();

    let mut received = 0;
    for snapshot in stream.by_ref() {
        received += 1;
        if snapshot.iteration == 3 {
            handle.cancel();
        }
    }

    assert_eq!(received, 3);
    assert!(handle.is_cancelled());
    assert_eq!(stream.state(), SimulationState::Cancelled);
    assert_eq!(stream.driver().iteration(), 3);
    assert!(stream.next().is_none());
}

#[test]
fn test_cancel_from_another_thread() {
    let config = presets::rod_dirichlet(None).unwrap();
    let driver = SimulationDriver::new(config).unwrap();
    let handle = driver.cancel_handle();

    std::thread::spawn(move || handle.cancel()).join().unwrap();

    let summary = driver.run().drain_into(&mut |_: &Snapshot| {});
    assert_eq!(summary.steps, 0);
    assert_eq!(summary.state, SimulationState::Cancelled);
    assert_eq!(summary.final_time, 0.0);
}

#[test]
fn test_fresh_drivers_are_deterministic() {
    for config in [
        presets::rod_convective_loss(Some(0.2)).unwrap(),
        presets::plate_hot_top(Some(0.002)).unwrap(),
    ] {
        let first: Vec<Snapshot> = SimulationDriver::new(config.clone()).unwrap().run().collect();
        let second: Vec<Snapshot> = SimulationDriver::new(config).unwrap().run().collect();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }
}

/// Sink that keeps the running extremes of every snapshot
#[derive(Default)]
struct ExtremesRecorder {
    calls: usize,
    last_iteration: usize,
    lowest: f64,
    highest: f64,
}

impl SnapshotSink for ExtremesRecorder {
    fn receive(&mut self, snapshot: &Snapshot) {
        assert_eq!(snapshot.iteration, self.last_iteration + 1);
        if self.calls == 0 {
            self.lowest = snapshot.field.min();
            self.highest = snapshot.field.max();
        } else {
            self.lowest = self.lowest.min(snapshot.field.min());
            self.highest = self.highest.max(snapshot.field.max());
        }
        self.calls += 1;
        self.last_iteration = snapshot.iteration;
    }
}

#[test]
fn test_custom_sink_receives_every_step() {
    let config = presets::plate_hot_top(Some(0.003)).unwrap();
    let driver = SimulationDriver::new(config).unwrap();
    let steps = driver.discretization().step_count;

    let mut recorder = ExtremesRecorder::default();
    let summary = driver.run().drain_into(&mut recorder);

    assert_eq!(summary.state, SimulationState::Completed);
    assert_eq!(summary.steps, steps);
    assert_eq!(recorder.calls, steps);
    assert_eq!(recorder.lowest, 50.0);
    assert_eq!(recorder.highest, 200.0);
}

#[test]
fn test_boxed_sink() {
    let mut count = 0;
    {
        let mut sink: Box<dyn SnapshotSink + '_> = Box::new(|_: &Snapshot| count += 1);
        let summary = SimulationDriver::new(hot_ended_rod(0.1))
            .unwrap()
            .run()
            .drain_into(sink.as_mut());
        assert_eq!(summary.steps, 4);
    }
    assert_eq!(count, 4);
}

#[test]
fn test_later_edge_wins_at_corner() {
    let grid = Grid::plane((1.0, 6), (1.0, 6)).unwrap();
    let boundaries = BoundarySet::new()
        .with(Edge::Left, BoundaryCondition::fixed(10.0))
        .with(Edge::Right, BoundaryCondition::ZeroFlux)
        .with(Edge::Bottom, BoundaryCondition::fixed(30.0))
        .with(Edge::Top, BoundaryCondition::ZeroFlux);
    let config = SimulationConfig::new(
        grid,
        ThermalParameters::new(1.0),
        0.1,
        InitialCondition::Uniform(20.0),
        boundaries,
    );

    let mut driver = SimulationDriver::new(config).unwrap();
    let snapshot = driver.step().unwrap();
    let m = snapshot.field.as_plane().unwrap();
    assert_eq!(m[(0, 0)], 30.0);
    assert_eq!(m[(0, 2)], 10.0);
    assert_eq!(m[(3, 0)], 30.0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURATION ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_degenerate_grid_is_rejected() {
    assert!(matches!(Grid::line(1.0, 1), Err(HeatSimError::InvalidGrid { .. })));
    assert!(matches!(Grid::line(0.0, 10), Err(HeatSimError::InvalidGrid { .. })));
    assert!(matches!(
        Grid::plane((1.0, 10), (f64::NAN, 10)),
        Err(HeatSimError::InvalidGrid { .. })
    ));
}

#[test]
fn test_missing_plate_edge_is_reported() {
    let grid = Grid::plane((1.0, 11), (1.0, 11)).unwrap();
    let boundaries = BoundarySet::uniform(
        &[Edge::Left, Edge::Right, Edge::Top],
        BoundaryCondition::fixed(0.0),
    );
    let config = SimulationConfig::new(
        grid,
        ThermalParameters::new(1.0),
        1.0,
        InitialCondition::Uniform(0.0),
        boundaries,
    );

    let err = SimulationDriver::new(config).err().unwrap();
    assert_eq!(err, HeatSimError::MissingBoundaryCondition { edge: Edge::Bottom });
}

#[test]
fn test_oversized_time_step_is_unstable() {
    let config = hot_ended_rod(1.0).with_time_step(0.05);
    match SimulationDriver::new(config) {
        Err(HeatSimError::UnstableConfiguration { dt, stability_number }) => {
            assert_eq!(dt, 0.05);
            assert_relative_eq!(stability_number, 0.8);
        }
        other => panic!("expected UnstableConfiguration, got {:?}", other.err()),
    }
}

#[test]
fn test_invalid_parameters_are_rejected() {
    let grid = Grid::line(1.0, 5).unwrap();
    let edges = BoundarySet::uniform(grid.edges(), BoundaryCondition::fixed(0.0));

    let bad = [
        SimulationConfig::new(
            grid,
            ThermalParameters::new(-1.0),
            1.0,
            InitialCondition::Uniform(0.0),
            edges.clone(),
        ),
        SimulationConfig::new(
            grid,
            ThermalParameters::new(1.0),
            0.0,
            InitialCondition::Uniform(0.0),
            edges.clone(),
        ),
        SimulationConfig::new(
            grid,
            ThermalParameters::new(1.0).with_convective_loss(-0.1, 20.0),
            1.0,
            InitialCondition::Uniform(0.0),
            edges,
        ),
    ];

    for config in bad {
        assert!(matches!(
            SimulationDriver::new(config),
            Err(HeatSimError::InvalidParameters { .. })
        ));
    }
}

#[test]
fn test_serialized_config_round_trips_into_a_driver() {
    let value = serde_json::to_value(hot_ended_rod(0.1)).unwrap();
    let config: SimulationConfig = serde_json::from_value(value).unwrap();
    let summary = SimulationDriver::new(config)
        .unwrap()
        .run()
        .drain_into(&mut |_: &Snapshot| {});
    assert_eq!(summary.steps, 4);
}

#[test]
fn test_deserialized_config_with_degenerate_axis_is_rejected() {
    for (field, bad) in [("nodes", 1.0), ("nodes", 0.0), ("length", -1.0)] {
        let mut value = serde_json::to_value(hot_ended_rod(0.1)).unwrap();
        value["grid"]["Line"][field] = if field == "nodes" {
            serde_json::json!(bad as u64)
        } else {
            serde_json::json!(bad)
        };
        let err = serde_json::from_value::<SimulationConfig>(value).unwrap_err();
        assert!(
            err.to_string().starts_with("Invalid grid"),
            "{field}={bad}: {err}"
        );
    }
}

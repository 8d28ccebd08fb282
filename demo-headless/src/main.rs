use clap::{Parser, ValueEnum};
use heat_sim_core::{
    presets, CancelHandle, Field, SimulationConfig, SimulationDriver, Snapshot, SnapshotSink,
};
use tracing_subscriber::EnvFilter;

/// Heat equation demo running one of the built-in scenarios
#[derive(Parser, Debug)]
#[command(name = "heat-sim-demo")]
#[command(about = "Explicit finite-difference heat simulation demo", long_about = None)]
struct Args {
    /// Scenario to run
    #[arg(value_enum, default_value_t = Scenario::RodDirichlet)]
    scenario: Scenario,

    /// Simulated duration in seconds (scenario default when omitted)
    #[arg(short, long)]
    duration: Option<f64>,

    /// Print the field every N steps
    #[arg(short, long, default_value_t = 100)]
    report_every: usize,

    /// Stop after this many steps even if the run is not finished
    #[arg(short, long)]
    max_steps: Option<usize>,

    /// Heat-map width in characters for plate scenarios
    #[arg(long, default_value_t = 40)]
    map_width: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Scenario {
    /// Rod at 20 with both ends held at 100
    RodDirichlet,
    /// Sine profile decaying toward cold ends
    RodSine,
    /// Heated left end, insulated right end
    RodInsulated,
    /// Rod losing heat to 20 °C air
    RodConvective,
    /// Plate with a hot top edge
    PlateHotTop,
}

impl Scenario {
    fn config(self, duration: Option<f64>) -> heat_sim_core::Result<SimulationConfig> {
        match self {
            Scenario::RodDirichlet => presets::rod_dirichlet(duration),
            Scenario::RodSine => presets::rod_sine(duration),
            Scenario::RodInsulated => presets::rod_insulated_end(duration),
            Scenario::RodConvective => presets::rod_convective_loss(duration),
            Scenario::PlateHotTop => presets::plate_hot_top(duration),
        }
    }
}

/// Characters from coldest to hottest
const HEAT_RAMP: &[u8] = b" .:-=+*#%@";

/// Prints rod profiles or plate heat-maps as snapshots arrive
struct TerminalRenderer {
    report_every: usize,
    map_width: usize,
    step_limit: Option<(usize, CancelHandle)>,
}

impl TerminalRenderer {
    /// Stop the run at `iteration` once the step limit is reached
    ///
    /// Called with iteration 0 before the run starts, so a limit of 0 runs
    /// no steps at all.
    fn enforce_limit(&self, iteration: usize) {
        if let Some((limit, handle)) = &self.step_limit {
            if iteration >= *limit {
                handle.cancel();
            }
        }
    }

    fn print_rod(values: &[f64]) {
        let row: Vec<String> = values.iter().map(|t| format!("{t:7.2}")).collect();
        println!("  [{}]", row.join(" "));
    }

    fn print_plate(&self, field: &Field) {
        let Some(m) = field.as_plane() else {
            return;
        };
        let (nx, ny) = m.shape();
        let (lo, hi) = (field.min(), field.max());
        let span = if hi > lo { hi - lo } else { 1.0 };

        let cols = self.map_width.clamp(2, nx);
        // Terminal cells are roughly twice as tall as wide
        let rows = (cols / 2).clamp(2, ny);

        for r in (0..rows).rev() {
            let j = r * (ny - 1) / (rows - 1);
            let line: String = (0..cols)
                .map(|c| {
                    let i = c * (nx - 1) / (cols - 1);
                    let level = ((m[(i, j)] - lo) / span * (HEAT_RAMP.len() - 1) as f64).round();
                    HEAT_RAMP[(level as usize).min(HEAT_RAMP.len() - 1)] as char
                })
                .collect();
            println!("  |{line}|");
        }
        println!("  range [{lo:.2}, {hi:.2}]");
    }
}

impl SnapshotSink for TerminalRenderer {
    fn receive(&mut self, snapshot: &Snapshot) {
        if snapshot.iteration % self.report_every.max(1) == 0 {
            println!("Step {:6} | t = {:.6}s", snapshot.iteration, snapshot.time);
            match &snapshot.field {
                Field::Line(v) => Self::print_rod(v.as_slice()),
                Field::Plane(_) => self.print_plate(&snapshot.field),
            }
        }

        self.enforce_limit(snapshot.iteration);
    }
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Heat Simulation Demo ===\n");

    let driver = match args
        .scenario
        .config(args.duration)
        .and_then(SimulationDriver::new)
    {
        Ok(driver) => driver,
        Err(err) => {
            eprintln!("Failed to set up {:?}: {err}", args.scenario);
            std::process::exit(1);
        }
    };

    let plan = driver.discretization();
    println!("Scenario: {:?}", args.scenario);
    println!(
        "Grid: {}D, {} nodes | dt = {:.4e}s | steps = {} | lambda = {:.4}\n",
        driver.grid().dimensions(),
        driver.grid().node_count(),
        plan.dt,
        plan.step_count,
        plan.stability_number
    );

    println!("Initial state:");
    let mut renderer = TerminalRenderer {
        report_every: args.report_every,
        map_width: args.map_width,
        step_limit: args.max_steps.map(|n| (n, driver.cancel_handle())),
    };
    match driver.field() {
        Field::Line(v) => TerminalRenderer::print_rod(v.as_slice()),
        Field::Plane(_) => renderer.print_plate(driver.field()),
    }
    println!();

    renderer.enforce_limit(driver.iteration());
    let summary = driver.run().drain_into(&mut renderer);

    println!("\n=== Simulation {:?} ===", summary.state);
    println!("Steps run: {}", summary.steps);
    println!("Final time: {:.6}s", summary.final_time);
}

//! CLI command implementations.

use tensa_io::{validate_scene, RelaxationOutput, Scene, StateSnapshot};
use tensa_solver::{
    Controls, LiveSession, SessionState, StepHook, StepResult, TelemetryHook, ZombieSolver,
};
use tensa_telemetry::{EventBus, EventFilter, TracingSink};

/// Bounded runs log every n-th step event.
const RELAX_STEP_STRIDE: u32 = 100;

/// Command-line overrides applied on top of a scene's `[solver]` table.
pub struct RelaxOverrides {
    pub max_iterations: Option<u32>,
    pub threshold: Option<f64>,
    pub parallel: bool,
}

/// Routes solver lifecycle events through an event bus into `tracing`.
struct BusHook {
    telemetry: TelemetryHook,
    bus: EventBus,
}

impl BusHook {
    fn new(filter: EventFilter) -> Self {
        let mut bus = EventBus::new();
        bus.add_filtered_sink(Box::new(TracingSink::new()), filter);
        Self {
            telemetry: TelemetryHook::new(),
            bus,
        }
    }

    fn pump(&mut self) {
        self.telemetry.forward(&self.bus);
        self.bus.flush();
    }
}

impl StepHook for BusHook {
    fn on_reset(&mut self, particle_count: usize, goal_count: usize) {
        self.telemetry.on_reset(particle_count, goal_count);
        self.pump();
    }

    fn on_step(&mut self, result: &StepResult) {
        self.telemetry.on_step(result);
        self.pump();
    }

    fn on_finish(&mut self, iterations: u32, v_sum: f64, converged: bool) {
        self.telemetry.on_finish(iterations, v_sum, converged);
        self.pump();
    }

    fn on_state(&mut self, iteration: u32, state: SessionState) {
        self.telemetry.on_state(iteration, state);
        self.pump();
        if state == SessionState::Paused {
            self.bus.close();
        }
    }

    fn name(&self) -> &str {
        "cli_bus"
    }
}

/// Relax a scene file.
pub fn relax(
    scene_path: &str,
    overrides: RelaxOverrides,
    output_path: Option<&str>,
    snapshot_path: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Tensa Relaxation");
    println!("────────────────");
    println!("Scene: {scene_path}");

    let mut scene = Scene::load(scene_path)?;
    tracing::info!(scene = scene_path, goals = scene.goals.len(), "scene loaded");
    if let Some(n) = overrides.max_iterations {
        scene.solver.max_iterations = n;
    }
    if let Some(t) = overrides.threshold {
        scene.solver.threshold = t;
    }
    scene.solver.parallel |= overrides.parallel;

    let summary = validate_scene(&scene)?;
    tracing::info!(
        goals = summary.goal_count,
        particles = summary.particle_count,
        parallel = scene.solver.parallel,
        "scene validated"
    );
    println!(
        "Goals: {}  Particles: {}",
        summary.goal_count, summary.particle_count
    );
    println!();

    let solver = ZombieSolver::new(scene.solver.clone())?;
    let mut hook = BusHook::new(EventFilter::StepsEvery(RELAX_STEP_STRIDE));
    let relaxed = solver.solve_with_hook(scene.goal_nodes()?, &mut hook)?;

    let report = &relaxed.report;
    println!("  Iterations:  {}", report.iterations);
    println!("  v_sum:       {:.6e}", report.v_sum);
    println!("  Wall time:   {:.3}ms", report.wall_time * 1000.0);
    if report.converged {
        println!("  Converged.");
    } else {
        tracing::warn!(
            iterations = report.iterations,
            v_sum = report.v_sum,
            "iteration cap reached before convergence"
        );
        println!(
            "  Not converged after {} iterations (threshold {:.1e}).",
            report.iterations, scene.solver.threshold
        );
    }
    println!();

    let output = RelaxationOutput::from_relaxation(&relaxed)?;
    match output_path {
        Some(path) => {
            output.write(path)?;
            tracing::info!(path, "output written");
            println!("Output written to: {path}");
        }
        None => println!("{}", output.to_json_pretty()?),
    }

    if let Some(path) = snapshot_path {
        StateSnapshot::from_system(&relaxed.system).write(path)?;
        tracing::info!(path, "snapshot written");
        println!("Snapshot written to: {path}");
    }

    Ok(())
}

/// Run a scene as a live session for a number of ticks.
pub fn live(
    scene_path: &str,
    ticks: u32,
    substeps: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Tensa Live Session");
    println!("══════════════════");
    println!();

    let mut scene = Scene::load(scene_path)?;
    tracing::info!(scene = scene_path, goals = scene.goals.len(), "scene loaded");
    if let Some(k) = substeps {
        scene.solver.substeps = k;
    }

    let mut session = LiveSession::new(scene.solver.clone())?.with_hook(Box::new(BusHook::new(EventFilter::All)));
    let data = session.reset(scene.goal_nodes()?)?;
    println!(
        "Reset: {} goals, {} particles, {} steps per tick",
        data.goal_count, data.particle_count, scene.solver.substeps
    );

    for tick in 1..=ticks {
        let report = session.tick(Controls::running())?;
        println!(
            "  tick {tick:>4}  iter {:>6}  v_sum {:.3e}",
            report.data.iterations, report.data.v_sum
        );
        if !report.reschedule {
            println!();
            println!("Converged after {} iterations.", report.data.iterations);
            break;
        }
    }

    let paused = session.tick(Controls::paused())?;
    println!("State: {}", paused.data.state.as_str());

    Ok(())
}

/// Validate a scene file.
pub fn validate(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Tensa Validator");
    println!("───────────────");
    println!();

    let scene = Scene::load(path)?;
    match validate_scene(&scene) {
        Ok(summary) => {
            println!(
                "✅ Scene is valid ({} goals, {} particles).",
                summary.goal_count, summary.particle_count
            );
            for (name, count) in &summary.by_name {
                println!("  {name:<20} {count}");
            }
            Ok(())
        }
        Err(e) => {
            tracing::warn!(scene = path, error = %e, "scene validation failed");
            println!("❌ Scene validation failed: {e}");
            Err(e.into())
        }
    }
}

/// Inspect a state snapshot.
pub fn inspect(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Tensa Snapshot Inspector");
    println!("────────────────────────");
    println!();

    let snapshot = StateSnapshot::read(path)?;
    tracing::info!(path, particles = snapshot.particle_count(), "snapshot read");

    println!("Iteration:   {}", snapshot.iteration);
    println!("v_sum:       {:.6e}", snapshot.v_sum);
    println!("Particles:   {}", snapshot.particle_count());
    println!("Total mass:  {:.4}", snapshot.masses.iter().sum::<f64>());

    if let Some((lo, hi)) = snapshot.bounds() {
        println!("Bounds min:  [{:.4}, {:.4}, {:.4}]", lo.x, lo.y, lo.z);
        println!("Bounds max:  [{:.4}, {:.4}, {:.4}]", hi.x, hi.y, hi.z);
    }

    Ok(())
}

//! Integration tests for tensa-solver.

use tensa_math::{Plane, Vec3};
use tensa_solver::goal::flatten;
use tensa_solver::goals::{
    Anchor, AxisLocks, FloorPlane, Load, Locator, LocatorShape, Spring, Support,
};
use tensa_solver::{
    Contribution, Controls, ConvergenceMetric, Goal, GoalNode, GoalOutput, GoalTopology,
    LiveSession, NoopHook, ParticleStore, PhysicalSystem, SessionState, SolverConfig, StepHook,
    StepResult, TelemetryHook, ZombieSolver,
};
use tensa_telemetry::EventKind;
use tensa_types::{ParticleId, TensaError};

fn v(x: f64, y: f64, z: f64) -> Vec3 {
    Vec3::new(x, y, z)
}

fn boxed(goal: impl Goal + 'static) -> Box<dyn Goal> {
    Box::new(goal)
}

fn assigned(system: &mut PhysicalSystem, goals: Vec<Box<dyn Goal>>) -> Vec<Box<dyn Goal>> {
    let mut goals = goals;
    system.assign_all(&mut goals, 1e-3).unwrap();
    goals
}

/// A goal with a configurable, possibly malformed contribution.
#[derive(Debug)]
struct ScriptedGoal {
    topology: GoalTopology,
    contribution: Contribution,
}

impl ScriptedGoal {
    fn new(points: &[Vec3], contribution: Contribution) -> Self {
        Self {
            topology: GoalTopology::at(points),
            contribution,
        }
    }
}

impl Goal for ScriptedGoal {
    fn name(&self) -> &str {
        "scripted"
    }

    fn topology(&self) -> &GoalTopology {
        &self.topology
    }

    fn topology_mut(&mut self) -> &mut GoalTopology {
        &mut self.topology
    }

    fn evaluate(&self, _points: &[Vec3]) -> Contribution {
        self.contribution.clone()
    }
}

// ─── Particle Store Tests ─────────────────────────────────────

#[test]
fn register_same_position_twice_merges() {
    let mut store = ParticleStore::new();
    let a = store.register(v(1.0, 2.0, 3.0), 1e-3).unwrap();
    let b = store.register(v(1.0, 2.0, 3.0), 1e-3).unwrap();
    assert_eq!(a, b);
    assert_eq!(store.len(), 1);
}

#[test]
fn register_within_tolerance_keeps_first_position() {
    let mut store = ParticleStore::new();
    let a = store.register(v(0.0, 0.0, 0.0), 1e-3).unwrap();
    let b = store.register(v(0.0005, 0.0, 0.0), 1e-3).unwrap();
    assert_eq!(a, b);
    assert_eq!(store.positions()[0], v(0.0, 0.0, 0.0));
}

#[test]
fn register_beyond_tolerance_is_distinct() {
    let mut store = ParticleStore::new();
    let a = store.register(v(0.0, 0.0, 0.0), 1e-3).unwrap();
    let b = store.register(v(0.002, 0.0, 0.0), 1e-3).unwrap();
    assert_ne!(a, b);
    assert_eq!(store.len(), 2);
}

#[test]
fn register_merges_across_cell_boundaries() {
    let mut store = ParticleStore::new();
    let a = store.register(v(0.9995, 0.0, 0.0), 1e-3).unwrap();
    let b = store.register(v(1.0002, 0.0, 0.0), 1e-3).unwrap();
    assert_eq!(a, b);
}

#[test]
fn register_picks_closest_candidate() {
    let mut store = ParticleStore::new();
    store.register(v(0.0, 0.0, 0.0), 1.0).unwrap();
    let far = store.register(v(1.5, 0.0, 0.0), 1.0).unwrap();
    let hit = store.register(v(0.9, 0.0, 0.0), 1.0).unwrap();
    assert_eq!(hit, far);
}

#[test]
fn register_tie_goes_to_lowest_index() {
    let mut store = ParticleStore::new();
    let first = store.register(v(0.0, 0.0, 0.0), 1.0).unwrap();
    store.register(v(2.0, 0.0, 0.0), 1.0).unwrap();
    let hit = store.register(v(1.0, 0.0, 0.0), 1.0).unwrap();
    assert_eq!(hit, first);
}

#[test]
fn register_rejects_non_finite_position() {
    let mut store = ParticleStore::new();
    let result = store.register(v(f64::NAN, 0.0, 0.0), 1e-3);
    assert!(matches!(result, Err(TensaError::InvalidGoal(_))));
    assert!(store.is_empty());
}

#[test]
fn add_never_merges() {
    let mut store = ParticleStore::new();
    store.add(v(0.0, 0.0, 0.0), 1.0).unwrap();
    store.add(v(0.0, 0.0, 0.0), 2.0).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.masses(), &[1.0, 2.0]);
    assert!(store.add(v(0.0, 0.0, 0.0), 0.0).is_err());
}

#[test]
fn merge_index_follows_moved_particles() {
    let mut system = PhysicalSystem::new();
    let goals = assigned(
        &mut system,
        vec![boxed(Spring::new(v(0.0, 0.0, 0.0), v(10.0, 0.0, 0.0), 5.0, 1.0).unwrap())],
    );
    system.step(&goals, false).unwrap();
    assert!((system.positions()[0].x - 2.5).abs() < 1e-12);

    // A locator at the relaxed position reuses the moved particle.
    let mut locator = Locator::point("relaxed", v(2.5, 0.0, 0.0)).unwrap();
    system.assign_index(&mut locator, 1e-3).unwrap();
    assert_eq!(locator.particle_indices(), Some(&[ParticleId(0)][..]));
    assert_eq!(system.particle_count(), 2);
}

#[test]
fn register_handles_huge_coordinates() {
    let mut store = ParticleStore::new();
    let a = store.register(v(-1.0e16, 0.0, 0.0), 1e-3).unwrap();
    let b = store.register(v(1.0e300, -1.0e300, 1.0e300), 1e-3).unwrap();
    assert_ne!(a, b);
    // Saturated cell keys collide, but distance still decides merges.
    let c = store.register(v(-1.0e17, 0.0, 0.0), 1e-3).unwrap();
    let d = store.register(v(-1.0e17, 0.0, 0.0), 1e-3).unwrap();
    assert_eq!(c, d);
    assert_eq!(store.len(), 3);
}

#[test]
fn zero_tolerance_index_hashes_from_the_first_registration() {
    let mut store = ParticleStore::new();
    store.register(v(0.0, 0.0, 0.0), 0.0).unwrap();
    store.register(v(1.0, 0.0, 0.0), 0.0).unwrap();
    store.register(v(0.0, 1.0, 0.0), 0.0).unwrap();
    assert_eq!(store.merge_cell_count(), 3);
    assert_eq!(store.register(v(1.0, 0.0, 0.0), 0.0).unwrap(), ParticleId(1));
    assert_eq!(store.len(), 3);
}

// ─── Physical System Tests ────────────────────────────────────

#[test]
fn step_rejects_unassigned_goal() {
    let mut system = PhysicalSystem::new();
    let goals = vec![boxed(Spring::new(v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), 1.0, 1.0).unwrap())];
    let result = system.step(&goals, false);
    assert!(matches!(result, Err(TensaError::UnassignedGoal { goal: 0, .. })));
    assert_eq!(system.iterations(), 0);
}

#[test]
fn assign_rejects_dangling_index() {
    let mut system = PhysicalSystem::new();
    system.add_particle(v(0.0, 0.0, 0.0), 1.0).unwrap();
    let mut spring = Spring::between(ParticleId(0), ParticleId(5), 1.0, 1.0).unwrap();
    let result = system.assign_index(&mut spring, 1e-3);
    assert!(matches!(
        result,
        Err(TensaError::ParticleOutOfBounds { index: 5, count: 1 })
    ));
}

#[test]
fn mismatched_contribution_fails_without_moving() {
    let mut system = PhysicalSystem::new();
    let bad = Contribution::uniform(vec![v(1.0, 0.0, 0.0)], 1.0);
    let goals = assigned(
        &mut system,
        vec![
            boxed(Anchor::with_target(v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), 1.0).unwrap()),
            boxed(ScriptedGoal::new(&[v(5.0, 0.0, 0.0), v(6.0, 0.0, 0.0)], bad)),
        ],
    );
    let result = system.step(&goals, false);
    assert!(matches!(
        result,
        Err(TensaError::ContributionMismatch {
            goal: 1,
            expected: 2,
            ..
        })
    ));
    assert_eq!(system.positions()[0], v(0.0, 0.0, 0.0));
}

#[test]
fn nan_contribution_fails_without_moving() {
    let mut system = PhysicalSystem::new();
    let nan = Contribution::uniform(vec![v(f64::NAN, 0.0, 0.0)], 1.0);
    let goals = assigned(&mut system, vec![boxed(ScriptedGoal::new(&[v(1.0, 1.0, 1.0)], nan))]);
    let result = system.step(&goals, false);
    assert!(matches!(
        result,
        Err(TensaError::NonFiniteContribution { goal: 0, point: 0 })
    ));
    assert_eq!(system.positions()[0], v(1.0, 1.0, 1.0));
}

#[test]
fn overflowing_update_fails_without_moving() {
    let mut system = PhysicalSystem::new();
    let goals = assigned(
        &mut system,
        vec![boxed(Load::new(v(0.0, 0.0, 0.0), v(1.0e308, 0.0, 0.0)).unwrap())],
    );
    for _ in 0..2 {
        assert!(matches!(
            system.step(&goals, false),
            Err(TensaError::NonFiniteUpdate { particle: 0 })
        ));
    }
    assert_eq!(system.positions()[0], Vec3::ZERO);
    assert_eq!(system.iterations(), 0);
}

#[test]
fn negative_weight_is_rejected() {
    let mut system = PhysicalSystem::new();
    let negative = Contribution::uniform(vec![v(1.0, 0.0, 0.0)], -1.0);
    let goals = assigned(&mut system, vec![boxed(ScriptedGoal::new(&[v(0.0, 0.0, 0.0)], negative))]);
    assert!(matches!(
        system.step(&goals, false),
        Err(TensaError::NonFiniteContribution { .. })
    ));
}

#[test]
fn infinite_weights_average_and_override_finite() {
    let mut system = PhysicalSystem::new();
    let p = v(0.0, 0.0, 0.0);
    let goals = assigned(
        &mut system,
        vec![
            boxed(Anchor::with_target(p, v(1.0, 0.0, 0.0), f64::INFINITY).unwrap()),
            boxed(Anchor::with_target(p, v(3.0, 0.0, 0.0), f64::INFINITY).unwrap()),
            boxed(Anchor::with_target(p, v(100.0, 0.0, 0.0), 1e6).unwrap()),
        ],
    );
    system.step(&goals, false).unwrap();
    assert_eq!(system.positions()[0], v(2.0, 0.0, 0.0));
}

#[test]
fn weighted_average_of_finite_moves() {
    let mut system = PhysicalSystem::new();
    let p = v(0.0, 0.0, 0.0);
    let goals = assigned(
        &mut system,
        vec![
            boxed(Anchor::with_target(p, v(4.0, 0.0, 0.0), 3.0).unwrap()),
            boxed(Anchor::with_target(p, v(0.0, 4.0, 0.0), 1.0).unwrap()),
        ],
    );
    let result = system.step(&goals, false).unwrap();
    assert!((system.positions()[0] - v(3.0, 1.0, 0.0)).length() < 1e-12);
    assert_eq!(result.moved, 1);
    assert_eq!(result.iteration, 1);
}

#[test]
fn empty_goal_list_steps_to_zero() {
    let mut system = PhysicalSystem::new();
    let result = system.step(&[], false).unwrap();
    assert_eq!(result.v_sum, 0.0);
    assert_eq!(result.moved, 0);
    assert_eq!(system.iterations(), 1);
}

fn net_goals() -> Vec<Box<dyn Goal>> {
    let mut goals: Vec<Box<dyn Goal>> = Vec::new();
    for i in 0..4 {
        for j in 0..4 {
            let p = v(i as f64, j as f64, 0.1 * (i * j) as f64);
            goals.push(boxed(Spring::new(p, p + v(1.0, 0.0, 0.0), 0.8, 1.0 + i as f64).unwrap()));
            goals.push(boxed(Spring::new(p, p + v(0.0, 1.0, 0.0), 0.8, 2.0).unwrap()));
        }
    }
    goals.push(boxed(Anchor::new(v(0.0, 0.0, 0.0), f64::INFINITY).unwrap()));
    goals.push(boxed(Load::new(v(2.0, 2.0, 0.4), v(0.0, 0.0, -0.3)).unwrap()));
    goals
}

#[test]
fn jacobi_step_is_order_independent() {
    let mut forward = PhysicalSystem::new();
    let goals = assigned(&mut forward, net_goals());

    // Register in the same order, then evaluate in reverse.
    let mut reversed = PhysicalSystem::new();
    let mut reversed_goals = assigned(&mut reversed, net_goals());
    reversed_goals.reverse();

    forward.step(&goals, false).unwrap();
    reversed.step(&reversed_goals, false).unwrap();

    for (a, b) in forward.positions().iter().zip(reversed.positions()) {
        assert!((*a - *b).length() < 1e-12, "{a} vs {b}");
    }
}

#[test]
fn parallel_step_matches_serial_exactly() {
    let mut serial = PhysicalSystem::new();
    let serial_goals = assigned(&mut serial, net_goals());
    let mut parallel = PhysicalSystem::new();
    let parallel_goals = assigned(&mut parallel, net_goals());

    for _ in 0..5 {
        let a = serial.step(&serial_goals, false).unwrap();
        let b = parallel.step(&parallel_goals, true).unwrap();
        assert_eq!(a.v_sum, b.v_sum);
    }
    assert_eq!(serial.positions(), parallel.positions());
}

#[test]
fn displacement_metrics() {
    let target = v(3.0, 4.0, 0.0);
    let cases = [
        (ConvergenceMetric::Displacement, 5.0),
        (ConvergenceMetric::SquaredDisplacement, 25.0),
        (ConvergenceMetric::KineticEnergy, 0.5 * 2.0 * 25.0),
    ];
    for (metric, expected) in cases {
        let mut system = PhysicalSystem::with_metric(metric);
        let id = system.add_particle(v(0.0, 0.0, 0.0), 2.0).unwrap();
        let goals = assigned(&mut system, vec![boxed(Anchor::at_particle(id, target, 1.0).unwrap())]);
        let result = system.step(&goals, false).unwrap();
        assert!((result.v_sum - expected).abs() < 1e-12, "{metric:?}");
    }
}

#[test]
fn global_floor_acts_on_every_particle() {
    let mut system = PhysicalSystem::new();
    let points = [v(0.0, 0.0, -2.0), v(1.0, 0.0, 3.0), v(2.0, 0.0, -0.5)];
    let goals = assigned(
        &mut system,
        vec![
            boxed(Locator::new("pts", LocatorShape::Points, &points).unwrap()),
            boxed(FloorPlane::global(Plane::world_xy(), 1.0).unwrap()),
        ],
    );
    system.step(&goals, false).unwrap();
    let z: Vec<f64> = system.positions().iter().map(|p| p.z).collect();
    assert_eq!(z, vec![0.0, 3.0, 0.0]);
}

#[test]
fn outputs_follow_goal_order_and_labels() {
    let mut system = PhysicalSystem::new();
    let goals = assigned(
        &mut system,
        vec![
            boxed(Spring::new(v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), 1.0, 1.0).unwrap()),
            boxed(Load::new(v(1.0, 0.0, 0.0), v(0.0, 0.0, -1.0)).unwrap()),
            boxed(Locator::point("tip", v(1.0, 0.0, 0.0)).unwrap()),
        ],
    );
    let outputs = system.outputs(&goals).unwrap();
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].name, "spring");
    assert!(matches!(outputs[0].output, GoalOutput::Line { .. }));
    assert_eq!(outputs[1].name, "tip");
}

#[test]
fn clear_drops_particles_and_counters() {
    let mut system = PhysicalSystem::new();
    let goals = assigned(
        &mut system,
        vec![boxed(Spring::new(v(0.0, 0.0, 0.0), v(2.0, 0.0, 0.0), 1.0, 1.0).unwrap())],
    );
    system.step(&goals, false).unwrap();
    system.clear();
    assert_eq!(system.particle_count(), 0);
    assert_eq!(system.iterations(), 0);
    assert_eq!(system.v_sum(), 0.0);
}

// ─── Zombie Solver Tests ──────────────────────────────────────

#[test]
fn spring_equilibrium_from_any_start() {
    let solver = ZombieSolver::default();
    for start in [1.0, 10.0, 100.0] {
        let spring = Spring::new(v(0.0, 0.0, 0.0), v(start, 0.0, 0.0), 5.0, 1.0).unwrap();
        let relaxed = solver.solve([GoalNode::new(spring)]).unwrap();
        let p = relaxed.positions();
        assert!(relaxed.report.converged, "start {start}");
        assert!((p[0].distance(p[1]) - 5.0).abs() < 1e-9, "start {start}");
    }
}

#[test]
fn hard_anchor_does_not_move() {
    let solver = ZombieSolver::default();
    let anchored = v(1.0, 1.0, 1.0);
    let relaxed = solver
        .solve([
            GoalNode::new(Anchor::new(anchored, f64::INFINITY).unwrap()),
            GoalNode::new(Spring::new(anchored, v(9.0, 1.0, 1.0), 0.0, 100.0).unwrap()),
            GoalNode::new(Load::new(anchored, v(-5.0, 0.0, 0.0)).unwrap()),
        ])
        .unwrap();
    assert_eq!(relaxed.positions()[0], anchored);
}

#[test]
fn strong_anchor_moves_less_than_epsilon() {
    let solver = ZombieSolver::default();
    let anchored = v(0.0, 0.0, 0.0);
    let relaxed = solver
        .solve([
            GoalNode::new(Anchor::new(anchored, 1e12).unwrap()),
            GoalNode::new(Anchor::new(v(10.0, 0.0, 0.0), 1e12).unwrap()),
            GoalNode::new(Spring::new(anchored, v(10.0, 0.0, 0.0), 2.0, 1.0).unwrap()),
        ])
        .unwrap();
    assert!(relaxed.positions()[0].length() < 1e-9);
}

#[test]
fn support_locks_only_its_axes() {
    let solver = ZombieSolver::default();
    let start = v(0.0, 0.0, 1.0);
    let relaxed = solver
        .solve([
            GoalNode::new(Support::new(start, AxisLocks::vertical(), f64::INFINITY).unwrap()),
            GoalNode::new(Anchor::with_target(start, v(3.0, 4.0, -2.0), 1.0).unwrap()),
        ])
        .unwrap();
    let p = relaxed.positions()[0];
    assert!(relaxed.report.converged);
    assert_eq!(p, v(3.0, 4.0, 1.0));
}

#[test]
fn finite_support_leaves_free_axes_undamped() {
    let solver = ZombieSolver::default();
    let start = v(0.0, 0.0, 1.0);
    let relaxed = solver
        .solve([
            GoalNode::new(Support::new(start, AxisLocks::vertical(), 1e6).unwrap()),
            GoalNode::new(Anchor::with_target(start, v(3.0, 4.0, -2.0), 1.0).unwrap()),
        ])
        .unwrap();
    let p = relaxed.positions()[0];
    assert!((p.x - 3.0).abs() < 1e-12);
    assert!((p.y - 4.0).abs() < 1e-12);
    assert!((p.z - 1.0).abs() < 1e-5);
}

#[test]
fn satisfied_goals_converge_on_first_iteration() {
    let solver = ZombieSolver::default();
    let relaxed = solver
        .solve([
            GoalNode::new(Spring::new(v(0.0, 0.0, 0.0), v(5.0, 0.0, 0.0), 5.0, 1.0).unwrap()),
            GoalNode::new(Spring::new(v(5.0, 0.0, 0.0), v(5.0, 3.0, 0.0), 3.0, 1.0).unwrap()),
        ])
        .unwrap();
    assert!(relaxed.report.converged);
    assert_eq!(relaxed.report.iterations, 1);
    assert_eq!(relaxed.report.particle_count, 3);
    assert_eq!(relaxed.report.goal_count, 2);
}

#[test]
fn contradictory_hard_goals_terminate() {
    let config = SolverConfig {
        max_iterations: 50,
        ..Default::default()
    };
    let solver = ZombieSolver::new(config).unwrap();
    let a = v(0.0, 0.0, 0.0);
    let b = v(10.0, 0.0, 0.0);
    let relaxed = solver
        .solve([
            GoalNode::new(Anchor::new(a, f64::INFINITY).unwrap()),
            GoalNode::new(Anchor::new(b, f64::INFINITY).unwrap()),
            GoalNode::new(Spring::new(a, b, 0.0, f64::INFINITY).unwrap()),
        ])
        .unwrap();
    let report = &relaxed.report;
    assert!(report.iterations <= 50);
    if !report.converged {
        assert_eq!(report.iterations, 50);
    }
    assert!(relaxed.positions().iter().all(|p| p.is_finite()));
}

#[test]
fn zero_iteration_cap_reports_not_converged() {
    let config = SolverConfig {
        max_iterations: 0,
        ..Default::default()
    };
    let solver = ZombieSolver::new(config).unwrap();
    let relaxed = solver
        .solve([GoalNode::new(
            Spring::new(v(0.0, 0.0, 0.0), v(5.0, 0.0, 0.0), 5.0, 1.0).unwrap(),
        )])
        .unwrap();
    assert_eq!(relaxed.report.iterations, 0);
    assert!(!relaxed.report.converged);
    assert_eq!(relaxed.positions()[1], v(5.0, 0.0, 0.0));
}

#[test]
fn hanging_load_settles_at_spring_balance() {
    let config = SolverConfig {
        threshold: 1e-28,
        max_iterations: 10_000,
        ..Default::default()
    };
    let solver = ZombieSolver::new(config).unwrap();
    let top = v(0.0, 0.0, 0.0);
    let bottom = v(0.0, 0.0, -1.0);
    let relaxed = solver
        .solve([
            GoalNode::new(Anchor::new(top, f64::INFINITY).unwrap()),
            GoalNode::new(Spring::new(top, bottom, 1.0, 10.0).unwrap()),
            GoalNode::new(Load::new(bottom, v(0.0, 0.0, -1.0)).unwrap()),
        ])
        .unwrap();
    // 2k·½(L - 1) = 1  =>  L = 1 + 1/k
    assert!((relaxed.positions()[1].z + 1.1).abs() < 1e-8);
}

#[test]
fn relax_explicit_particles() {
    let mut system = PhysicalSystem::new();
    let a = system.add_particle(v(0.0, 0.0, 0.0), 1.0).unwrap();
    let b = system.add_particle(v(4.0, 0.0, 0.0), 1.0).unwrap();
    let goals = assigned(
        &mut system,
        vec![
            boxed(Anchor::at_particle(a, v(0.0, 0.0, 0.0), f64::INFINITY).unwrap()),
            boxed(Spring::between(a, b, 2.0, 1.0).unwrap()),
        ],
    );
    let config = SolverConfig {
        threshold: 1e-20,
        ..Default::default()
    };
    let report = ZombieSolver::new(config)
        .unwrap()
        .relax(&mut system, &goals, &mut NoopHook)
        .unwrap();
    assert!(report.converged);
    assert!((system.positions()[1].x - 2.0).abs() < 1e-9);
}

#[test]
fn zombie_rejects_invalid_config() {
    let config = SolverConfig {
        tolerance: 0.0,
        ..Default::default()
    };
    assert!(matches!(
        ZombieSolver::new(config),
        Err(TensaError::InvalidConfig(_))
    ));
}

#[test]
fn telemetry_hook_records_run() {
    let mut hook = TelemetryHook::new();
    let solver = ZombieSolver::default();
    let relaxed = solver
        .solve_with_hook(
            [GoalNode::new(
                Spring::new(v(0.0, 0.0, 0.0), v(8.0, 0.0, 0.0), 5.0, 1.0).unwrap(),
            )],
            &mut hook,
        )
        .unwrap();
    let events = hook.drain_events();
    let steps = events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::Step { .. }))
        .count();
    assert!(matches!(events[0].kind, EventKind::Reset { particle_count: 2, goal_count: 1 }));
    assert_eq!(steps as u32, relaxed.report.iterations);
    assert!(matches!(
        events.last().map(|e| &e.kind),
        Some(EventKind::Convergence { converged: true, .. })
    ));
}

#[test]
fn nested_groups_flatten_in_order() {
    let nodes = vec![
        GoalNode::new(Locator::point("a", v(0.0, 0.0, 0.0)).unwrap()),
        GoalNode::Group(vec![
            GoalNode::new(Locator::point("b", v(1.0, 0.0, 0.0)).unwrap()),
            GoalNode::Group(vec![GoalNode::new(
                Locator::point("c", v(2.0, 0.0, 0.0)).unwrap(),
            )]),
        ]),
        GoalNode::new(Locator::point("d", v(3.0, 0.0, 0.0)).unwrap()),
    ];
    assert_eq!(GoalNode::Group(Vec::new()).goal_count(), 0);
    let goals = flatten(nodes);
    let names: Vec<&str> = goals.iter().map(|g| g.name()).collect();
    assert_eq!(names, vec!["a", "b", "c", "d"]);
}

// ─── Live Session Tests ───────────────────────────────────────

fn live_goals() -> Vec<GoalNode> {
    vec![
        GoalNode::new(Anchor::new(v(0.0, 0.0, 0.0), f64::INFINITY).unwrap()),
        GoalNode::new(Spring::new(v(0.0, 0.0, 0.0), v(3.0, 0.0, 0.0), 1.0, 1.0).unwrap()),
        GoalNode::new(Spring::new(v(3.0, 0.0, 0.0), v(3.0, 3.0, 0.0), 1.0, 1.0).unwrap()),
    ]
}

#[test]
fn tick_before_reset_fails() {
    let mut session = LiveSession::new(SolverConfig::live()).unwrap();
    assert_eq!(session.state(), SessionState::Uninitialized);
    assert!(matches!(
        session.tick(Controls::running()),
        Err(TensaError::SessionNotInitialized)
    ));
}

#[test]
fn live_state_machine() {
    let config = SolverConfig {
        substeps: 3,
        ..SolverConfig::live()
    };
    let mut session = LiveSession::new(config).unwrap();

    let data = session.reset(live_goals()).unwrap();
    assert_eq!(data.state, SessionState::Reset);
    assert_eq!(data.particle_count, 3);
    assert_eq!(data.goal_count, 3);

    // Neither run nor pause: nothing happens.
    let idle = session.tick(Controls::default()).unwrap();
    assert_eq!(idle.steps, 0);
    assert_eq!(idle.data.state, SessionState::Reset);
    assert!(!idle.reschedule);

    let running = session.tick(Controls::running()).unwrap();
    assert_eq!(running.data.state, SessionState::Running);
    assert_eq!(running.steps, 3);
    assert_eq!(running.data.iterations, 3);
    assert!(running.reschedule);

    let paused = session.tick(Controls::paused()).unwrap();
    assert_eq!(paused.data.state, SessionState::Paused);
    assert_eq!(paused.steps, 0);
    assert_eq!(paused.data.iterations, 3);
    assert!(!paused.reschedule);

    let resumed = session.tick(Controls::running()).unwrap();
    assert_eq!(resumed.data.state, SessionState::Running);
    assert_eq!(resumed.data.iterations, 6);

    let data = session.reset(live_goals()).unwrap();
    assert_eq!(data.state, SessionState::Reset);
    assert_eq!(data.iterations, 0);
    assert_eq!(session.positions()[1], v(3.0, 0.0, 0.0));
}

#[test]
fn live_session_stops_rescheduling_once_converged() {
    let mut session = LiveSession::new(SolverConfig::live()).unwrap();
    session.reset(live_goals()).unwrap();
    let mut report = session.tick(Controls::running()).unwrap();
    let mut ticks = 1;
    while report.reschedule && ticks < 1000 {
        report = session.tick(Controls::running()).unwrap();
        ticks += 1;
    }
    assert!(report.data.converged);
    assert!(!report.reschedule);
    let p = session.positions();
    assert!((p[0].distance(p[1]) - 1.0).abs() < 1e-4);
}

#[test]
fn add_goal_extends_running_session() {
    let mut session = LiveSession::new(SolverConfig::live()).unwrap();
    assert!(matches!(
        session.add_goal(boxed(Load::new(v(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0)).unwrap())),
        Err(TensaError::SessionNotInitialized)
    ));

    session.reset(live_goals()).unwrap();
    session.tick(Controls::running()).unwrap();
    session
        .add_goal(boxed(Load::new(v(3.0, 3.0, 0.0), v(0.0, 0.0, -1.0)).unwrap()))
        .unwrap();
    let report = session.tick(Controls::running()).unwrap();
    assert_eq!(report.data.goal_count, 4);
    assert!(report.data.particle_count >= 3);
}

#[derive(Default)]
struct StateRecorder {
    states: std::sync::Arc<std::sync::Mutex<Vec<SessionState>>>,
    steps: std::sync::Arc<std::sync::Mutex<u32>>,
}

impl StepHook for StateRecorder {
    fn on_step(&mut self, _result: &StepResult) {
        *self.steps.lock().unwrap() += 1;
    }

    fn on_state(&mut self, _iteration: u32, state: SessionState) {
        self.states.lock().unwrap().push(state);
    }

    fn name(&self) -> &str {
        "state_recorder"
    }
}

#[test]
fn live_hook_sees_state_changes() {
    let recorder = StateRecorder::default();
    let states = recorder.states.clone();
    let steps = recorder.steps.clone();
    let mut session = LiveSession::new(SolverConfig::live())
        .unwrap()
        .with_hook(Box::new(recorder));

    session.reset(live_goals()).unwrap();
    session.tick(Controls::running()).unwrap();
    session.tick(Controls::running()).unwrap();
    session.tick(Controls::paused()).unwrap();
    session.reset(live_goals()).unwrap();

    assert_eq!(
        *states.lock().unwrap(),
        vec![
            SessionState::Reset,
            SessionState::Running,
            SessionState::Paused,
            SessionState::Reset
        ]
    );
    assert_eq!(*steps.lock().unwrap(), 20);
}

// ─── Config Tests ─────────────────────────────────────────────

#[test]
fn config_defaults_and_presets() {
    let config = SolverConfig::default();
    assert_eq!(config.tolerance, 1e-3);
    assert_eq!(config.threshold, 1e-13);
    assert_eq!(config.max_iterations, 5000);
    assert_eq!(config.metric, ConvergenceMetric::SquaredDisplacement);
    assert!(config.validate().is_ok());

    let quick = SolverConfig::quick();
    assert_eq!(quick.max_iterations, 100);
    assert_eq!(quick.threshold, 1e-10);
    assert!(quick.validate().is_ok());

    assert_eq!(SolverConfig::live().substeps, 10);
}

#[test]
fn config_validation() {
    let bad = [
        SolverConfig {
            tolerance: -1.0,
            ..Default::default()
        },
        SolverConfig {
            tolerance: f64::INFINITY,
            ..Default::default()
        },
        SolverConfig {
            threshold: f64::NAN,
            ..Default::default()
        },
        SolverConfig {
            substeps: 0,
            ..Default::default()
        },
    ];
    for config in bad {
        assert!(config.validate().is_err(), "{config:?}");
    }
}

#[test]
fn config_from_partial_toml() {
    let config: SolverConfig = toml::from_str(
        r#"
        max_iterations = 200
        metric = "kinetic_energy"
        parallel = true
        "#,
    )
    .unwrap();
    assert_eq!(config.max_iterations, 200);
    assert_eq!(config.metric, ConvergenceMetric::KineticEnergy);
    assert!(config.parallel);
    assert_eq!(config.tolerance, 1e-3);

    let text = toml::to_string(&config).unwrap();
    let back: SolverConfig = toml::from_str(&text).unwrap();
    assert_eq!(back, config);
}

//! Scene validation.
//!
//! Validates a scene before the solver receives it, catching data-level
//! errors early with clear diagnostics: bad solver parameters, goals
//! that cannot be constructed, and particle assignment failures.

use std::collections::BTreeMap;

use tensa_solver::goal::flatten;
use tensa_solver::PhysicalSystem;
use tensa_types::TensaResult;

use crate::contract::Scene;

/// What a valid scene resolves to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneSummary {
    /// Goals after flattening groups.
    pub goal_count: usize,
    /// Particles after merging positions within the tolerance.
    pub particle_count: usize,
    /// Goal count per goal name (locators count under their label).
    pub by_name: BTreeMap<String, usize>,
}

/// Validates a complete scene.
///
/// Checks:
/// - Solver configuration (tolerance, threshold, substeps)
/// - Every goal spec constructs (finite points, valid strengths, shapes)
/// - Every goal's particles resolve in a fresh system
pub fn validate_scene(scene: &Scene) -> TensaResult<SceneSummary> {
    scene.solver.validate()?;

    let mut goals = flatten(scene.goal_nodes()?);
    if goals.is_empty() {
        tracing::warn!("scene has no goals");
    }

    let mut system = PhysicalSystem::with_metric(scene.solver.metric);
    system.assign_all(&mut goals, scene.solver.tolerance)?;

    let mut by_name = BTreeMap::new();
    for goal in &goals {
        *by_name.entry(goal.name().to_string()).or_insert(0) += 1;
    }

    Ok(SceneSummary {
        goal_count: goals.len(),
        particle_count: system.particle_count(),
        by_name,
    })
}

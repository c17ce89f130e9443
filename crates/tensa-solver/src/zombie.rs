//! Bounded offline relaxation.
//!
//! A zombie solve builds a fresh system from the goal list, steps it
//! until the displacement measure drops below the threshold or the
//! iteration cap is reached, and hands back the result. The caller's
//! goals are consumed; nothing is shared between solves.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tensa_math::Vec3;
use tensa_types::TensaResult;

use crate::config::SolverConfig;
use crate::goal::{flatten, Goal, GoalNode, LabeledOutput};
use crate::hooks::{NoopHook, StepHook};
use crate::system::PhysicalSystem;

/// Summary of a bounded run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelaxReport {
    /// Steps performed.
    pub iterations: u32,
    /// Displacement measure of the last step.
    pub v_sum: f64,
    /// Whether `v_sum` dropped below the threshold.
    pub converged: bool,
    /// Wall-clock time for the whole run (seconds).
    pub wall_time: f64,
    /// Particles after index assignment.
    pub particle_count: usize,
    /// Goals after flattening.
    pub goal_count: usize,
}

/// The relaxed system together with the goals that shaped it.
#[derive(Debug)]
pub struct Relaxation {
    pub system: PhysicalSystem,
    pub goals: Vec<Box<dyn Goal>>,
    pub report: RelaxReport,
}

impl Relaxation {
    /// Relaxed particle positions.
    pub fn positions(&self) -> &[Vec3] {
        self.system.positions()
    }

    /// Goal outputs from the relaxed positions.
    pub fn outputs(&self) -> TensaResult<Vec<LabeledOutput>> {
        self.system.outputs(&self.goals)
    }
}

/// Offline relaxation driver.
#[derive(Debug, Clone)]
pub struct ZombieSolver {
    config: SolverConfig,
}

impl ZombieSolver {
    /// Creates a driver after validating `config`.
    pub fn new(config: SolverConfig) -> TensaResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Relaxes the goals in a fresh system.
    pub fn solve<I>(&self, goals: I) -> TensaResult<Relaxation>
    where
        I: IntoIterator<Item = GoalNode>,
    {
        self.solve_with_hook(goals, &mut NoopHook)
    }

    /// Relaxes the goals, reporting each step to `hook`.
    pub fn solve_with_hook<I>(&self, goals: I, hook: &mut dyn StepHook) -> TensaResult<Relaxation>
    where
        I: IntoIterator<Item = GoalNode>,
    {
        let mut goals = flatten(goals);
        let mut system = PhysicalSystem::with_metric(self.config.metric);
        system.assign_all(&mut goals, self.config.tolerance)?;
        let report = self.relax(&mut system, &goals, hook)?;
        Ok(Relaxation {
            system,
            goals,
            report,
        })
    }

    /// Steps an already-assigned system until convergence or the cap.
    ///
    /// Useful when particles were added explicitly before the goals.
    pub fn relax(
        &self,
        system: &mut PhysicalSystem,
        goals: &[Box<dyn Goal>],
        hook: &mut dyn StepHook,
    ) -> TensaResult<RelaxReport> {
        let start = Instant::now();
        hook.on_reset(system.particle_count(), goals.len());
        tracing::info!(
            particles = system.particle_count(),
            goals = goals.len(),
            max_iterations = self.config.max_iterations,
            "zombie solve"
        );

        let mut iterations = 0;
        let mut v_sum = 0.0;
        let mut converged = false;
        while iterations < self.config.max_iterations {
            let result = system.step(goals, self.config.parallel)?;
            hook.on_step(&result);
            iterations += 1;
            v_sum = result.v_sum;
            if self.config.is_converged(v_sum) {
                converged = true;
                break;
            }
        }

        if converged {
            tracing::info!(iterations, v_sum, "converged");
        } else {
            tracing::warn!(iterations, v_sum, "iteration cap reached before convergence");
        }
        hook.on_finish(iterations, v_sum, converged);

        Ok(RelaxReport {
            iterations,
            v_sum,
            converged,
            wall_time: start.elapsed().as_secs_f64(),
            particle_count: system.particle_count(),
            goal_count: goals.len(),
        })
    }
}

impl Default for ZombieSolver {
    fn default() -> Self {
        Self {
            config: SolverConfig::default(),
        }
    }
}

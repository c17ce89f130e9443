//! Physical system: particle store plus the Jacobi relaxation step.
//!
//! One step:
//!
//! ```text
//! snapshot = positions                      // pre-step, shared by all goals
//! for goal in goals:                        // optionally in parallel
//!     contribution = goal.evaluate(gather(snapshot, goal.indices))
//! for goal in goals (in order):             // always sequential
//!     move_sum[i] += w·m;  weight_sum[i] += w
//! positions[i] += move_sum[i] / weight_sum[i]
//! ```
//!
//! Because accumulation is sequential in goal order, serial and parallel
//! steps produce identical positions.

use std::borrow::Cow;
use std::time::Instant;

use rayon::prelude::*;
use tensa_math::Vec3;
use tensa_types::{ParticleId, TensaError, TensaResult};

use crate::config::ConvergenceMetric;
use crate::goal::{Contribution, Goal, LabeledOutput, ParticleRef};
use crate::particles::ParticleStore;

/// Result of one relaxation step.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Iteration counter after this step.
    pub iteration: u32,
    /// Displacement measure of this step.
    pub v_sum: f64,
    /// Particles that received at least one weighted move.
    pub moved: usize,
    /// Wall-clock time for this step (seconds).
    pub wall_time: f64,
}

/// The particle store, iteration counter and last displacement measure.
#[derive(Debug, Clone, Default)]
pub struct PhysicalSystem {
    particles: ParticleStore,
    iterations: u32,
    v_sum: f64,
    metric: ConvergenceMetric,
}

impl PhysicalSystem {
    /// Creates an empty system using the default metric.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty system with the given displacement metric.
    pub fn with_metric(metric: ConvergenceMetric) -> Self {
        Self {
            metric,
            ..Default::default()
        }
    }

    /// Adds a particle explicitly, without merging.
    pub fn add_particle(&mut self, position: Vec3, mass: f64) -> TensaResult<ParticleId> {
        self.particles.add(position, mass)
    }

    /// Resolves the goal's particle references and stores the indices.
    ///
    /// Positions are registered with the merge tolerance; explicit
    /// indices must already exist.
    pub fn assign_index(&mut self, goal: &mut dyn Goal, tolerance: f64) -> TensaResult<()> {
        let refs = goal.topology().refs().to_vec();
        let mut ids = Vec::with_capacity(refs.len());
        for r in refs {
            let id = match r {
                ParticleRef::At(p) => self.particles.register(p, tolerance)?,
                ParticleRef::Index(id) => {
                    if id.index() >= self.particles.len() {
                        return Err(TensaError::ParticleOutOfBounds {
                            index: id.index(),
                            count: self.particles.len(),
                        });
                    }
                    id
                }
            };
            ids.push(id);
        }
        goal.topology_mut().assign(ids)
    }

    /// Assigns every goal of a list, in order.
    pub fn assign_all(&mut self, goals: &mut [Box<dyn Goal>], tolerance: f64) -> TensaResult<()> {
        for goal in goals.iter_mut() {
            self.assign_index(goal.as_mut(), tolerance)?;
        }
        Ok(())
    }

    /// Performs one Jacobi step over `goals`.
    ///
    /// Fails before touching any position if a goal is unassigned,
    /// references a missing particle, returns a malformed contribution,
    /// or the averaged update would leave a non-finite position.
    pub fn step(&mut self, goals: &[Box<dyn Goal>], parallel: bool) -> TensaResult<StepResult> {
        let start = Instant::now();
        let count = self.particles.len();

        let evaluated: Vec<(Cow<'_, [ParticleId]>, Contribution)> = {
            let snapshot = self.particles.positions();
            if parallel {
                goals
                    .par_iter()
                    .enumerate()
                    .map(|(gi, goal)| evaluate_goal(gi, goal.as_ref(), snapshot))
                    .collect::<TensaResult<_>>()?
            } else {
                goals
                    .iter()
                    .enumerate()
                    .map(|(gi, goal)| evaluate_goal(gi, goal.as_ref(), snapshot))
                    .collect::<TensaResult<_>>()?
            }
        };

        self.particles.reset_accumulators();
        for (ids, contribution) in &evaluated {
            for (k, id) in ids.iter().enumerate() {
                self.particles.accumulate(
                    *id,
                    contribution.moves[k],
                    contribution.weights[k],
                    contribution.axes_of(k),
                );
            }
        }

        let (v_sum, moved) = self.particles.apply(self.metric)?;
        self.v_sum = v_sum;
        self.iterations += 1;

        let result = StepResult {
            iteration: self.iterations,
            v_sum,
            moved,
            wall_time: start.elapsed().as_secs_f64(),
        };
        tracing::debug!(
            iteration = result.iteration,
            v_sum,
            moved,
            particles = count,
            "step"
        );
        Ok(result)
    }

    /// Each goal's output from the current positions, in goal order.
    pub fn outputs(&self, goals: &[Box<dyn Goal>]) -> TensaResult<Vec<LabeledOutput>> {
        let snapshot = self.particles.positions();
        let mut out = Vec::new();
        for (gi, goal) in goals.iter().enumerate() {
            let ids = goal_indices(gi, goal.as_ref(), snapshot.len())?;
            let points: Vec<Vec3> = ids.iter().map(|id| snapshot[id.index()]).collect();
            if let Some(output) = goal.output(&points) {
                out.push(LabeledOutput {
                    name: goal.name().to_string(),
                    output,
                });
            }
        }
        Ok(out)
    }

    /// Displacement measure of the last step (0 before any step).
    pub fn v_sum(&self) -> f64 {
        self.v_sum
    }

    /// Steps performed since creation or the last clear.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Number of particles.
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Current particle positions.
    pub fn positions(&self) -> &[Vec3] {
        self.particles.positions()
    }

    /// Position of a single particle.
    pub fn position(&self, id: ParticleId) -> TensaResult<Vec3> {
        self.particles.position(id)
    }

    /// Read access to the particle store.
    pub fn particles(&self) -> &ParticleStore {
        &self.particles
    }

    /// Displacement metric in use.
    pub fn metric(&self) -> ConvergenceMetric {
        self.metric
    }

    /// Drops every particle and resets the counters.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.iterations = 0;
        self.v_sum = 0.0;
    }
}

/// The indices a goal acts on, validated against the particle count.
fn goal_indices(
    gi: usize,
    goal: &dyn Goal,
    count: usize,
) -> TensaResult<Cow<'_, [ParticleId]>> {
    if goal.covers_all_particles() {
        return Ok(Cow::Owned((0..count).map(ParticleId::from).collect()));
    }
    let ids = goal.particle_indices().ok_or_else(|| TensaError::UnassignedGoal {
        goal: gi,
        name: goal.name().to_string(),
    })?;
    if let Some(bad) = ids.iter().find(|id| id.index() >= count) {
        return Err(TensaError::ParticleOutOfBounds {
            index: bad.index(),
            count,
        });
    }
    Ok(Cow::Borrowed(ids))
}

fn evaluate_goal<'g>(
    gi: usize,
    goal: &'g dyn Goal,
    snapshot: &[Vec3],
) -> TensaResult<(Cow<'g, [ParticleId]>, Contribution)> {
    let ids = goal_indices(gi, goal, snapshot.len())?;
    let points: Vec<Vec3> = ids.iter().map(|id| snapshot[id.index()]).collect();
    let contribution = goal.evaluate(&points);

    if contribution.moves.len() != ids.len() || contribution.weights.len() != ids.len() {
        return Err(TensaError::ContributionMismatch {
            goal: gi,
            expected: ids.len(),
            moves: contribution.moves.len(),
            weights: contribution.weights.len(),
        });
    }
    if let Some(axes) = &contribution.axes {
        if axes.len() != ids.len() {
            return Err(TensaError::ContributionMismatch {
                goal: gi,
                expected: ids.len(),
                moves: contribution.moves.len(),
                weights: axes.len(),
            });
        }
    }
    let bad = contribution
        .moves
        .iter()
        .zip(&contribution.weights)
        .position(|(m, &w)| !m.is_finite() || w.is_nan() || w < 0.0);
    if let Some(point) = bad {
        return Err(TensaError::NonFiniteContribution { goal: gi, point });
    }

    Ok((ids, contribution))
}

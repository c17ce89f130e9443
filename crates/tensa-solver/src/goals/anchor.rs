//! Anchors and supports: pull one particle toward a fixed target.

use tensa_math::Vec3;
use tensa_types::{ParticleId, TensaResult};

use super::{check_points, check_strength};
use crate::goal::{AxisLocks, Contribution, Goal, GoalOutput, GoalTopology};

/// Pulls a particle toward a target on all three axes.
#[derive(Debug, Clone)]
pub struct Anchor {
    topology: GoalTopology,
    target: Vec3,
    strength: f64,
}

impl Anchor {
    /// Anchors the particle at `point` to its current position.
    pub fn new(point: Vec3, strength: f64) -> TensaResult<Self> {
        Self::with_target(point, point, strength)
    }

    /// Registers a particle at `point` and pulls it toward `target`.
    pub fn with_target(point: Vec3, target: Vec3, strength: f64) -> TensaResult<Self> {
        check_points("anchor", &[point, target])?;
        check_strength("anchor", "strength", strength)?;
        Ok(Self {
            topology: GoalTopology::at(&[point]),
            target,
            strength,
        })
    }

    /// Anchors an existing particle.
    pub fn at_particle(id: ParticleId, target: Vec3, strength: f64) -> TensaResult<Self> {
        check_points("anchor", &[target])?;
        check_strength("anchor", "strength", strength)?;
        Ok(Self {
            topology: GoalTopology::indexed(&[id]),
            target,
            strength,
        })
    }

    /// Anchor target.
    pub fn target(&self) -> Vec3 {
        self.target
    }
}

impl Goal for Anchor {
    fn name(&self) -> &str {
        "anchor"
    }

    fn topology(&self) -> &GoalTopology {
        &self.topology
    }

    fn topology_mut(&mut self) -> &mut GoalTopology {
        &mut self.topology
    }

    fn evaluate(&self, points: &[Vec3]) -> Contribution {
        Contribution::uniform(vec![self.target - points[0]], self.strength)
    }

    fn output(&self, points: &[Vec3]) -> Option<GoalOutput> {
        Some(GoalOutput::Point {
            position: points[0],
        })
    }
}

/// An anchor that only acts on locked axes.
///
/// The contribution is masked to the locked axes, so free axes get no
/// correction and no weight and the particle slides freely along them.
#[derive(Debug, Clone)]
pub struct Support {
    topology: GoalTopology,
    target: Vec3,
    locks: AxisLocks,
    strength: f64,
}

impl Support {
    /// Supports the particle at `point` in its current position.
    pub fn new(point: Vec3, locks: AxisLocks, strength: f64) -> TensaResult<Self> {
        check_points("support", &[point])?;
        check_strength("support", "strength", strength)?;
        Ok(Self {
            topology: GoalTopology::at(&[point]),
            target: point,
            locks,
            strength,
        })
    }

    /// Locked axes.
    pub fn locks(&self) -> AxisLocks {
        self.locks
    }

    /// Reaction force at the current position, on locked axes only.
    /// A hard (infinite-strength) support reports zero.
    pub fn reaction(&self, current: Vec3) -> Vec3 {
        if self.strength.is_infinite() {
            return Vec3::ZERO;
        }
        self.locks.mask(self.target - current) * self.strength
    }
}

impl Goal for Support {
    fn name(&self) -> &str {
        "support"
    }

    fn topology(&self) -> &GoalTopology {
        &self.topology
    }

    fn topology_mut(&mut self) -> &mut GoalTopology {
        &mut self.topology
    }

    fn evaluate(&self, points: &[Vec3]) -> Contribution {
        if self.locks.is_free() {
            return Contribution::none(1);
        }
        Contribution::uniform(vec![self.target - points[0]], self.strength)
            .with_axes(vec![self.locks])
    }

    fn output(&self, points: &[Vec3]) -> Option<GoalOutput> {
        Some(GoalOutput::Reaction {
            position: points[0],
            force: self.reaction(points[0]),
        })
    }
}

//! Constant point load.

use tensa_math::Vec3;
use tensa_types::{ParticleId, TensaResult};

use super::check_points;
use crate::goal::{Contribution, Goal, GoalTopology};

/// Pushes one particle by a constant vector every step, with weight 1.
///
/// The particle settles where the other goals acting on it balance
/// the load.
#[derive(Debug, Clone)]
pub struct Load {
    topology: GoalTopology,
    force: Vec3,
}

impl Load {
    /// Loads the particle at `point`.
    pub fn new(point: Vec3, force: Vec3) -> TensaResult<Self> {
        check_points("load", &[point, force])?;
        Ok(Self {
            topology: GoalTopology::at(&[point]),
            force,
        })
    }

    /// Loads an existing particle.
    pub fn at_particle(id: ParticleId, force: Vec3) -> TensaResult<Self> {
        check_points("load", &[force])?;
        Ok(Self {
            topology: GoalTopology::indexed(&[id]),
            force,
        })
    }

    /// Load vector.
    pub fn force(&self) -> Vec3 {
        self.force
    }
}

impl Goal for Load {
    fn name(&self) -> &str {
        "load"
    }

    fn topology(&self) -> &GoalTopology {
        &self.topology
    }

    fn topology_mut(&mut self) -> &mut GoalTopology {
        &mut self.topology
    }

    fn evaluate(&self, _points: &[Vec3]) -> Contribution {
        Contribution::uniform(vec![self.force], 1.0)
    }
}

//! Plane goals: two-sided projection and a one-sided floor.

use tensa_math::{Plane, Vec3};
use tensa_types::TensaResult;

use super::{check_points, check_strength};
use crate::goal::{Contribution, Goal, GoalTopology};

/// Pulls every point onto a plane.
#[derive(Debug, Clone)]
pub struct OnPlane {
    topology: GoalTopology,
    plane: Plane,
    strength: f64,
}

impl OnPlane {
    /// Creates an on-plane goal over `points`.
    pub fn new(points: &[Vec3], plane: Plane, strength: f64) -> TensaResult<Self> {
        check_points("on_plane", points)?;
        check_strength("on_plane", "strength", strength)?;
        Ok(Self {
            topology: GoalTopology::at(points),
            plane,
            strength,
        })
    }

    /// Target plane.
    pub fn plane(&self) -> &Plane {
        &self.plane
    }
}

impl Goal for OnPlane {
    fn name(&self) -> &str {
        "on_plane"
    }

    fn topology(&self) -> &GoalTopology {
        &self.topology
    }

    fn topology_mut(&mut self) -> &mut GoalTopology {
        &mut self.topology
    }

    fn evaluate(&self, points: &[Vec3]) -> Contribution {
        let moves = points
            .iter()
            .map(|&p| self.plane.closest_point(p) - p)
            .collect();
        Contribution::uniform(moves, self.strength)
    }
}

/// Keeps points on or above a plane.
///
/// Points below are pushed back onto the plane; points on or above it
/// contribute zero move and zero weight. Built either over explicit
/// points or over every particle in the system.
#[derive(Debug, Clone)]
pub struct FloorPlane {
    topology: GoalTopology,
    plane: Plane,
    strength: f64,
    global: bool,
}

impl FloorPlane {
    /// A floor acting on the given points.
    pub fn new(points: &[Vec3], plane: Plane, strength: f64) -> TensaResult<Self> {
        check_points("floor", points)?;
        check_strength("floor", "strength", strength)?;
        Ok(Self {
            topology: GoalTopology::at(points),
            plane,
            strength,
            global: false,
        })
    }

    /// A floor acting on every particle in the system.
    pub fn global(plane: Plane, strength: f64) -> TensaResult<Self> {
        check_strength("floor", "strength", strength)?;
        Ok(Self {
            topology: GoalTopology::default(),
            plane,
            strength,
            global: true,
        })
    }
}

impl Goal for FloorPlane {
    fn name(&self) -> &str {
        "floor"
    }

    fn topology(&self) -> &GoalTopology {
        &self.topology
    }

    fn topology_mut(&mut self) -> &mut GoalTopology {
        &mut self.topology
    }

    fn evaluate(&self, points: &[Vec3]) -> Contribution {
        let mut out = Contribution::none(points.len());
        for (i, &p) in points.iter().enumerate() {
            let d = self.plane.signed_distance(p);
            if d < 0.0 {
                out.moves[i] = -self.plane.normal * d;
                out.weights[i] = self.strength;
            }
        }
        out
    }

    fn covers_all_particles(&self) -> bool {
        self.global
    }
}

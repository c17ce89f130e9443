//! Host-style custom goals, written against the public [`Goal`] trait
//! exactly as downstream code would.

use std::sync::Arc;

use tensa_math::{Surface, Vec3};
use tensa_types::{TensaError, TensaResult};

use super::{check_points, check_strength};
use crate::goal::{Contribution, Goal, GoalTopology};

/// Keeps `p1` at parameter `t` on the line from `p0` to `p2`.
///
/// With `target = p0 + t·(p2 - p0)` and `v = target - p1`, the outer
/// points move by `-½v` and the middle point by `+½v`.
#[derive(Debug, Clone)]
pub struct AlongVector {
    topology: GoalTopology,
    parameter: f64,
    strength: f64,
}

impl AlongVector {
    /// Creates the goal over `[p0, p1, p2]`.
    pub fn new(points: [Vec3; 3], parameter: f64, strength: f64) -> TensaResult<Self> {
        check_points("along_vector", &points)?;
        if !parameter.is_finite() {
            return Err(TensaError::InvalidGoal(format!(
                "along_vector: parameter must be finite, got {parameter}"
            )));
        }
        check_strength("along_vector", "strength", strength)?;
        Ok(Self {
            topology: GoalTopology::at(&points),
            parameter,
            strength,
        })
    }
}

impl Goal for AlongVector {
    fn name(&self) -> &str {
        "along_vector"
    }

    fn topology(&self) -> &GoalTopology {
        &self.topology
    }

    fn topology_mut(&mut self) -> &mut GoalTopology {
        &mut self.topology
    }

    fn evaluate(&self, points: &[Vec3]) -> Contribution {
        let target = points[0] + self.parameter * (points[2] - points[0]);
        let half = 0.5 * (target - points[1]);
        Contribution::uniform(vec![-half, half, -half], self.strength)
    }
}

/// Pulls points onto any closest-point [`Surface`].
#[derive(Debug, Clone)]
pub struct OnSurface {
    topology: GoalTopology,
    surface: Arc<dyn Surface>,
    strength: f64,
}

impl OnSurface {
    /// Creates the goal over `points`. The surface is shared, so many
    /// goals can target the same geometry.
    pub fn new(points: &[Vec3], surface: Arc<dyn Surface>, strength: f64) -> TensaResult<Self> {
        check_points("on_surface", points)?;
        check_strength("on_surface", "strength", strength)?;
        Ok(Self {
            topology: GoalTopology::at(points),
            surface,
            strength,
        })
    }
}

impl Goal for OnSurface {
    fn name(&self) -> &str {
        "on_surface"
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
            .map(|&p| self.surface.closest_point(p) - p)
            .collect();
        Contribution::uniform(moves, self.strength)
    }
}

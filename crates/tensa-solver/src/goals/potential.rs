//! Pairwise distance potential.

use serde::{Deserialize, Serialize};
use tensa_math::Vec3;
use tensa_types::constants::EPSILON;
use tensa_types::{TensaError, TensaResult};

use super::{check_points, check_strength};
use crate::goal::{Contribution, Goal, GoalTopology};

/// Direction of a [`PairPotential`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Pushes the pair apart.
    #[default]
    Repel,
    /// Pulls the pair together.
    Attract,
}

/// Unit moves along the pair axis weighted by `strength·d^exponent`.
///
/// With `strength = 1` the weight is the plain power law `d^exponent`;
/// other strengths scale it. A negative exponent gives a force that
/// fades with distance. Overflowing weights are capped at `f64::MAX`,
/// so a potential never acts as a hard constraint.
#[derive(Debug, Clone)]
pub struct PairPotential {
    topology: GoalTopology,
    strength: f64,
    exponent: f64,
    polarity: Polarity,
}

impl PairPotential {
    /// Creates a potential between `p0` and `p1`.
    pub fn new(
        p0: Vec3,
        p1: Vec3,
        strength: f64,
        exponent: f64,
        polarity: Polarity,
    ) -> TensaResult<Self> {
        check_points("pair_potential", &[p0, p1])?;
        check_strength("pair_potential", "strength", strength)?;
        if !exponent.is_finite() {
            return Err(TensaError::InvalidGoal(format!(
                "pair_potential: exponent must be finite, got {exponent}"
            )));
        }
        Ok(Self {
            topology: GoalTopology::at(&[p0, p1]),
            strength,
            exponent,
            polarity,
        })
    }
}

impl Goal for PairPotential {
    fn name(&self) -> &str {
        "pair_potential"
    }

    fn topology(&self) -> &GoalTopology {
        &self.topology
    }

    fn topology_mut(&mut self) -> &mut GoalTopology {
        &mut self.topology
    }

    fn evaluate(&self, points: &[Vec3]) -> Contribution {
        let v = points[1] - points[0];
        let d = v.length();
        if d < EPSILON {
            return Contribution::none(2);
        }
        let dir = v / d;
        let dir = match self.polarity {
            Polarity::Repel => dir,
            Polarity::Attract => -dir,
        };
        let weight = self.strength * d.powf(self.exponent);
        if weight.is_nan() {
            return Contribution::none(2);
        }
        let weight = weight.min(f64::MAX);
        Contribution::uniform(vec![-dir, dir], weight)
    }
}

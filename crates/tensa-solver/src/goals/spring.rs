//! Two-point length goals: springs, bars and cables.
//!
//! All three share the same local step. With `c = p1 - p0` and
//! `s = 1 - rest/|c|`, the ends move by `+½·c·s` and `-½·c·s`, which
//! restores the rest length exactly when the pair is alone.

use tensa_math::Vec3;
use tensa_types::constants::EPSILON;
use tensa_types::{ParticleId, TensaError, TensaResult};

use super::{check_points, check_positive, check_strength};
use crate::goal::{Contribution, Goal, GoalOutput, GoalTopology};

/// Half-moves that bring `p0`/`p1` to `rest` apart. `None` if coincident.
fn length_moves(p0: Vec3, p1: Vec3, rest: f64) -> Option<(Vec3, f64)> {
    let c = p1 - p0;
    let len = c.length();
    if len < EPSILON {
        return None;
    }
    let s = 1.0 - rest / len;
    Some((c * (0.5 * s), len))
}

/// A linear spring between two points.
#[derive(Debug, Clone)]
pub struct Spring {
    topology: GoalTopology,
    rest_length: f64,
    stiffness: f64,
}

impl Spring {
    /// Creates a spring registering particles at `p0` and `p1`.
    pub fn new(p0: Vec3, p1: Vec3, rest_length: f64, stiffness: f64) -> TensaResult<Self> {
        check_points("spring", &[p0, p1])?;
        Self::build(GoalTopology::at(&[p0, p1]), rest_length, stiffness)
    }

    /// Creates a spring whose rest length is the current distance.
    pub fn from_current(p0: Vec3, p1: Vec3, stiffness: f64) -> TensaResult<Self> {
        Self::new(p0, p1, p0.distance(p1), stiffness)
    }

    /// Creates a spring between two existing particles.
    pub fn between(
        a: ParticleId,
        b: ParticleId,
        rest_length: f64,
        stiffness: f64,
    ) -> TensaResult<Self> {
        Self::build(GoalTopology::indexed(&[a, b]), rest_length, stiffness)
    }

    fn build(topology: GoalTopology, rest_length: f64, stiffness: f64) -> TensaResult<Self> {
        if !(rest_length >= 0.0) || !rest_length.is_finite() {
            return Err(TensaError::InvalidGoal(format!(
                "spring: rest length must be non-negative and finite, got {rest_length}"
            )));
        }
        check_strength("spring", "stiffness", stiffness)?;
        Ok(Self {
            topology,
            rest_length,
            stiffness,
        })
    }

    /// Target length.
    pub fn rest_length(&self) -> f64 {
        self.rest_length
    }

    /// Spring stiffness.
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }
}

impl Goal for Spring {
    fn name(&self) -> &str {
        "spring"
    }

    fn topology(&self) -> &GoalTopology {
        &self.topology
    }

    fn topology_mut(&mut self) -> &mut GoalTopology {
        &mut self.topology
    }

    fn evaluate(&self, points: &[Vec3]) -> Contribution {
        match length_moves(points[0], points[1], self.rest_length) {
            Some((m, _)) => Contribution::uniform(vec![m, -m], 2.0 * self.stiffness),
            None => Contribution::none(2),
        }
    }

    fn output(&self, points: &[Vec3]) -> Option<GoalOutput> {
        Some(GoalOutput::Line {
            start: points[0],
            end: points[1],
        })
    }
}

/// An axial bar with Young's modulus and cross-section area.
///
/// Behaves as a spring with stiffness `E·A/L0` and reports the axial
/// force `E·A·(L - L0)/L0` (positive in tension).
#[derive(Debug, Clone)]
pub struct Bar {
    topology: GoalTopology,
    rest_length: f64,
    youngs_modulus: f64,
    area: f64,
}

impl Bar {
    /// Creates a bar whose rest length is the current distance.
    pub fn new(p0: Vec3, p1: Vec3, youngs_modulus: f64, area: f64) -> TensaResult<Self> {
        Self::with_rest_length(p0, p1, p0.distance(p1), youngs_modulus, area)
    }

    /// Creates a bar with an explicit rest length.
    pub fn with_rest_length(
        p0: Vec3,
        p1: Vec3,
        rest_length: f64,
        youngs_modulus: f64,
        area: f64,
    ) -> TensaResult<Self> {
        check_points("bar", &[p0, p1])?;
        check_positive("bar", "rest length", rest_length)?;
        check_positive("bar", "Young's modulus", youngs_modulus)?;
        check_positive("bar", "area", area)?;
        Ok(Self {
            topology: GoalTopology::at(&[p0, p1]),
            rest_length,
            youngs_modulus,
            area,
        })
    }

    /// Rest length `L0`.
    pub fn rest_length(&self) -> f64 {
        self.rest_length
    }

    /// Axial stiffness `E·A/L0`.
    pub fn axial_stiffness(&self) -> f64 {
        self.youngs_modulus * self.area / self.rest_length
    }

    /// Axial force at `length` (positive in tension).
    pub fn axial_force(&self, length: f64) -> f64 {
        self.axial_stiffness() * (length - self.rest_length)
    }
}

impl Goal for Bar {
    fn name(&self) -> &str {
        "bar"
    }

    fn topology(&self) -> &GoalTopology {
        &self.topology
    }

    fn topology_mut(&mut self) -> &mut GoalTopology {
        &mut self.topology
    }

    fn evaluate(&self, points: &[Vec3]) -> Contribution {
        match length_moves(points[0], points[1], self.rest_length) {
            Some((m, _)) => Contribution::uniform(vec![m, -m], 2.0 * self.axial_stiffness()),
            None => Contribution::none(2),
        }
    }

    fn output(&self, points: &[Vec3]) -> Option<GoalOutput> {
        let force = self.axial_force(points[0].distance(points[1]));
        Some(GoalOutput::Member {
            start: points[0],
            end: points[1],
            force,
            stress: force / self.area,
        })
    }
}

/// A tension-only bar.
///
/// The rest length is shortened from the initial length so that the
/// initial axial force equals the prestress: `L0 = L·E·A/(E·A + P)`.
/// A slack cable (`L <= L0`) contributes nothing.
#[derive(Debug, Clone)]
pub struct Cable {
    topology: GoalTopology,
    rest_length: f64,
    youngs_modulus: f64,
    area: f64,
}

impl Cable {
    /// Creates a cable between `p0` and `p1` with the given prestress force.
    pub fn new(
        p0: Vec3,
        p1: Vec3,
        youngs_modulus: f64,
        area: f64,
        prestress: f64,
    ) -> TensaResult<Self> {
        check_points("cable", &[p0, p1])?;
        check_positive("cable", "Young's modulus", youngs_modulus)?;
        check_positive("cable", "area", area)?;
        if !(prestress >= 0.0) || !prestress.is_finite() {
            return Err(TensaError::InvalidGoal(format!(
                "cable: prestress must be non-negative and finite, got {prestress}"
            )));
        }
        let length = p0.distance(p1);
        check_positive("cable", "initial length", length)?;

        let ea = youngs_modulus * area;
        Ok(Self {
            topology: GoalTopology::at(&[p0, p1]),
            rest_length: length * ea / (ea + prestress),
            youngs_modulus,
            area,
        })
    }

    /// Rest length `L0` after prestress.
    pub fn rest_length(&self) -> f64 {
        self.rest_length
    }

    /// Axial force at `length`; zero when slack.
    pub fn axial_force(&self, length: f64) -> f64 {
        let ea = self.youngs_modulus * self.area;
        (ea * (length - self.rest_length) / self.rest_length).max(0.0)
    }
}

impl Goal for Cable {
    fn name(&self) -> &str {
        "cable"
    }

    fn topology(&self) -> &GoalTopology {
        &self.topology
    }

    fn topology_mut(&mut self) -> &mut GoalTopology {
        &mut self.topology
    }

    fn evaluate(&self, points: &[Vec3]) -> Contribution {
        match length_moves(points[0], points[1], self.rest_length) {
            Some((m, len)) if len > self.rest_length => {
                let k = self.youngs_modulus * self.area / self.rest_length;
                Contribution::uniform(vec![m, -m], 2.0 * k)
            }
            _ => Contribution::none(2),
        }
    }

    fn output(&self, points: &[Vec3]) -> Option<GoalOutput> {
        let force = self.axial_force(points[0].distance(points[1]));
        Some(GoalOutput::Member {
            start: points[0],
            end: points[1],
            force,
            stress: force / self.area,
        })
    }
}

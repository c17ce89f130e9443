//! Bending goals over two segments `(p0, p1)` and `(p2, p3)`.
//!
//! The angle is measured between the segment directions, so two
//! consecutive segments of a straight line have angle 0. Each segment
//! is rotated about its own midpoint by half the angle error, inside
//! the plane spanned by both directions. Endpoints farther from the
//! pivot receive larger moves.

use std::f64::consts::FRAC_PI_2;

use tensa_math::geometry::{rotate_around_axis, vector_angle};
use tensa_math::Vec3;
use tensa_types::constants::EPSILON;
use tensa_types::{TensaError, TensaResult};

use super::{check_points, check_positive, check_strength};
use crate::goal::{Contribution, Goal, GoalOutput, GoalTopology};

/// Endpoint moves that rotate both segments toward `rest` radians apart.
///
/// `None` for zero-length or parallel segments, where the bending plane
/// is undefined. Anti-parallel segments away from their rest angle
/// rotate about an arbitrary axis perpendicular to the first segment.
fn bend_moves(points: &[Vec3], rest: f64) -> Option<Vec<Vec3>> {
    let (a0, a1, b0, b1) = (points[0], points[1], points[2], points[3]);
    let da = a1 - a0;
    let db = b1 - b0;
    let la = da.length();
    let lb = db.length();
    if la < EPSILON || lb < EPSILON {
        return None;
    }

    let theta = vector_angle(da, db);
    let normal = da.cross(db);
    let n_len = normal.length();
    let axis = if n_len >= EPSILON * la * lb {
        normal / n_len
    } else if theta > FRAC_PI_2 && (theta - rest).abs() > EPSILON {
        (da / la).any_orthonormal_vector()
    } else {
        return None;
    };

    // Positive rotation about `axis` turns `da` toward `db`.
    let half = 0.5 * (theta - rest);
    let ma = 0.5 * (a0 + a1);
    let mb = 0.5 * (b0 + b1);

    Some(vec![
        rotate_around_axis(a0, ma, axis, half) - a0,
        rotate_around_axis(a1, ma, axis, half) - a1,
        rotate_around_axis(b0, mb, axis, -half) - b0,
        rotate_around_axis(b1, mb, axis, -half) - b1,
    ])
}

/// Angle between two segments, driven toward a rest angle.
#[derive(Debug, Clone)]
pub struct Angle {
    topology: GoalTopology,
    rest_angle: f64,
    strength: f64,
}

impl Angle {
    /// Creates an angle goal. `rest_angle` is in radians, `0` = straight.
    pub fn new(
        segment_a: [Vec3; 2],
        segment_b: [Vec3; 2],
        rest_angle: f64,
        strength: f64,
    ) -> TensaResult<Self> {
        let points = [segment_a[0], segment_a[1], segment_b[0], segment_b[1]];
        check_points("angle", &points)?;
        if !rest_angle.is_finite() {
            return Err(TensaError::InvalidGoal(format!(
                "angle: rest angle must be finite, got {rest_angle}"
            )));
        }
        check_strength("angle", "strength", strength)?;
        Ok(Self {
            topology: GoalTopology::at(&points),
            rest_angle,
            strength,
        })
    }

    /// Creates an angle goal that keeps the current angle.
    pub fn from_current(segment_a: [Vec3; 2], segment_b: [Vec3; 2], strength: f64) -> TensaResult<Self> {
        let rest = vector_angle(segment_a[1] - segment_a[0], segment_b[1] - segment_b[0]);
        Self::new(segment_a, segment_b, rest, strength)
    }

    /// Rest angle in radians.
    pub fn rest_angle(&self) -> f64 {
        self.rest_angle
    }
}

impl Goal for Angle {
    fn name(&self) -> &str {
        "angle"
    }

    fn topology(&self) -> &GoalTopology {
        &self.topology
    }

    fn topology_mut(&mut self) -> &mut GoalTopology {
        &mut self.topology
    }

    fn evaluate(&self, points: &[Vec3]) -> Contribution {
        match bend_moves(points, self.rest_angle) {
            Some(moves) => Contribution::uniform(moves, self.strength),
            None => Contribution::none(4),
        }
    }
}

/// A straightening goal with bending stiffness `E·I`.
///
/// The weight is `E·I/L̄` with `L̄` the mean initial segment length.
/// Reports the bending moment `E·I·κ`, where `κ = 2·sin(θ)/|chord|` is
/// the curvature of the circle through the segment ends.
#[derive(Debug, Clone)]
pub struct Rod {
    topology: GoalTopology,
    youngs_modulus: f64,
    inertia: f64,
    extreme_fiber: f64,
    weight: f64,
}

impl Rod {
    /// Creates a rod joint.
    ///
    /// `inertia` is the second moment of area and `extreme_fiber` the
    /// distance from the neutral axis used for the bending stress.
    pub fn new(
        segment_a: [Vec3; 2],
        segment_b: [Vec3; 2],
        youngs_modulus: f64,
        inertia: f64,
        extreme_fiber: f64,
    ) -> TensaResult<Self> {
        let points = [segment_a[0], segment_a[1], segment_b[0], segment_b[1]];
        check_points("rod", &points)?;
        check_positive("rod", "Young's modulus", youngs_modulus)?;
        check_positive("rod", "second moment of area", inertia)?;
        check_strength("rod", "extreme fiber distance", extreme_fiber)?;

        let mean_length =
            0.5 * (segment_a[0].distance(segment_a[1]) + segment_b[0].distance(segment_b[1]));
        check_positive("rod", "mean segment length", mean_length)?;

        Ok(Self {
            topology: GoalTopology::at(&points),
            youngs_modulus,
            inertia,
            extreme_fiber,
            weight: youngs_modulus * inertia / mean_length,
        })
    }

    /// Bending stiffness `E·I`.
    pub fn bending_stiffness(&self) -> f64 {
        self.youngs_modulus * self.inertia
    }

    /// Weight used in the per-particle average.
    pub fn weight(&self) -> f64 {
        self.weight
    }
}

impl Goal for Rod {
    fn name(&self) -> &str {
        "rod"
    }

    fn topology(&self) -> &GoalTopology {
        &self.topology
    }

    fn topology_mut(&mut self) -> &mut GoalTopology {
        &mut self.topology
    }

    fn evaluate(&self, points: &[Vec3]) -> Contribution {
        match bend_moves(points, 0.0) {
            Some(moves) => Contribution::uniform(moves, self.weight),
            None => Contribution::none(4),
        }
    }

    fn output(&self, points: &[Vec3]) -> Option<GoalOutput> {
        let theta = vector_angle(points[1] - points[0], points[3] - points[2]);
        let chord = points[0].distance(points[3]);
        let curvature = if chord < EPSILON {
            0.0
        } else {
            2.0 * theta.sin() / chord
        };
        let moment = self.bending_stiffness() * curvature;
        Some(GoalOutput::Bending {
            joint: 0.5 * (points[1] + points[2]),
            moment,
            stress: moment * self.extreme_fiber / self.inertia,
        })
    }
}

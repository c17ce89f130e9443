//! Infinite planes defined by an origin and a unit normal.

use glam::DVec3 as Vec3;
use serde::{Deserialize, Serialize};
use tensa_types::constants::EPSILON;
use tensa_types::{TensaError, TensaResult};

/// An infinite plane.
///
/// The normal is normalized on construction; the positive half-space is
/// the side the normal points into ("above" the plane).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Any point on the plane.
    pub origin: Vec3,
    /// Unit normal.
    pub normal: Vec3,
}

impl Plane {
    /// Creates a plane, normalizing `normal`.
    pub fn new(origin: Vec3, normal: Vec3) -> TensaResult<Self> {
        let len = normal.length();
        if !(len > EPSILON) || !len.is_finite() {
            return Err(TensaError::InvalidGoal(format!(
                "plane normal must be non-zero and finite, got {normal:?}"
            )));
        }
        if !origin.is_finite() {
            return Err(TensaError::InvalidGoal(format!(
                "plane origin must be finite, got {origin:?}"
            )));
        }
        Ok(Self {
            origin,
            normal: normal / len,
        })
    }

    /// The world XY plane through the origin, normal +Z.
    pub fn world_xy() -> Self {
        Self {
            origin: Vec3::ZERO,
            normal: Vec3::Z,
        }
    }

    /// Signed distance from `p` to the plane (positive above).
    #[inline]
    pub fn signed_distance(&self, p: Vec3) -> f64 {
        (p - self.origin).dot(self.normal)
    }

    /// Orthogonal projection of `p` onto the plane.
    #[inline]
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        p - self.normal * self.signed_distance(p)
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::world_xy()
    }
}

//! Closest-point surfaces.
//!
//! On-surface goals only need one query from the geometry they pull
//! points onto: the closest point. Analytical shapes implement it
//! directly; host applications can plug in their own meshes or NURBS
//! by implementing [`Surface`].

use std::fmt::Debug;

use glam::DVec3 as Vec3;
use serde::{Deserialize, Serialize};
use tensa_types::constants::EPSILON;
use tensa_types::{TensaError, TensaResult};

use crate::plane::Plane;

/// A surface that can answer closest-point queries.
pub trait Surface: Debug + Send + Sync {
    /// The point on the surface closest to `p`.
    fn closest_point(&self, p: Vec3) -> Vec3;

    /// Returns the surface's name for logging.
    fn name(&self) -> &str;
}

impl Surface for Plane {
    fn closest_point(&self, p: Vec3) -> Vec3 {
        Plane::closest_point(self, p)
    }

    fn name(&self) -> &str {
        "plane"
    }
}

/// Sphere surface (the shell, not the solid ball).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// Center of the sphere.
    pub center: Vec3,
    /// Radius of the sphere.
    pub radius: f64,
}

impl Sphere {
    /// Creates a new sphere. The radius must be positive.
    pub fn new(center: Vec3, radius: f64) -> TensaResult<Self> {
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(TensaError::InvalidGoal(format!(
                "sphere radius must be positive, got {radius}"
            )));
        }
        Ok(Self { center, radius })
    }
}

impl Surface for Sphere {
    fn closest_point(&self, p: Vec3) -> Vec3 {
        let d = p - self.center;
        let dist = d.length();
        if dist < EPSILON {
            // Every point of the shell is equidistant from the center.
            return self.center + Vec3::X * self.radius;
        }
        self.center + d * (self.radius / dist)
    }

    fn name(&self) -> &str {
        "sphere"
    }
}

/// Infinite cylinder surface around an axis line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    /// A point on the axis.
    pub origin: Vec3,
    /// Unit axis direction.
    pub axis: Vec3,
    /// Cylinder radius.
    pub radius: f64,
}

impl Cylinder {
    /// Creates a new cylinder, normalizing `axis`.
    pub fn new(origin: Vec3, axis: Vec3, radius: f64) -> TensaResult<Self> {
        let len = axis.length();
        if !(len > EPSILON) {
            return Err(TensaError::InvalidGoal("cylinder axis must be non-zero".into()));
        }
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(TensaError::InvalidGoal(format!(
                "cylinder radius must be positive, got {radius}"
            )));
        }
        Ok(Self {
            origin,
            axis: axis / len,
            radius,
        })
    }
}

impl Surface for Cylinder {
    fn closest_point(&self, p: Vec3) -> Vec3 {
        let rel = p - self.origin;
        let along = self.axis * rel.dot(self.axis);
        let radial = rel - along;
        let dist = radial.length();
        let foot = self.origin + along;
        if dist < EPSILON {
            // On the axis: pick any radial direction perpendicular to it.
            return foot + self.axis.any_orthonormal_vector() * self.radius;
        }
        foot + radial * (self.radius / dist)
    }

    fn name(&self) -> &str {
        "cylinder"
    }
}

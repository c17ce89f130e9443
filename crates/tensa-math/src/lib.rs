//! # tensa-math
//!
//! Geometry primitives for the Tensa relaxation engine.
//!
//! Provides:
//! - Re-export of `glam`'s `DVec3` as `Vec3`
//! - [`Plane`] with projection and signed distance
//! - Vector helpers (angles, axis rotation, safe normalization)
//! - The [`Surface`] closest-point capability used by on-surface goals

pub mod geometry;
pub mod plane;
pub mod surface;

// Re-export glam's double-precision vector as the canonical Tensa vector.
pub use glam::DVec3 as Vec3;

pub use plane::Plane;
pub use surface::{Cylinder, Sphere, Surface};

//! Small vector helpers shared by the goal implementations.

use glam::DVec3 as Vec3;
use tensa_types::constants::EPSILON;

/// Unit vector in the direction of `v`, or zero if `v` is degenerate.
#[inline]
pub fn unit_or_zero(v: Vec3) -> Vec3 {
    let len = v.length();
    if len < EPSILON {
        Vec3::ZERO
    } else {
        v / len
    }
}

/// Angle between two vectors in radians, in `[0, π]`.
///
/// Returns 0.0 when either vector is degenerate.
pub fn vector_angle(a: Vec3, b: Vec3) -> f64 {
    let la = a.length();
    let lb = b.length();
    if la < EPSILON || lb < EPSILON {
        return 0.0;
    }
    // atan2 keeps precision near 0 and π where acos(dot) flattens out.
    let cross = a.cross(b).length();
    let dot = a.dot(b);
    cross.atan2(dot)
}

/// Rotate point `p` around an axis through `center` by `angle` radians.
///
/// `axis` must be unit length. Uses Rodrigues' rotation formula.
pub fn rotate_around_axis(p: Vec3, center: Vec3, axis: Vec3, angle: f64) -> Vec3 {
    let v = p - center;
    let (sin_a, cos_a) = angle.sin_cos();
    let dot = axis.dot(v);

    let rotated = v * cos_a + axis.cross(v) * sin_a + axis * dot * (1.0 - cos_a);
    center + rotated
}

/// Total length of an open polyline.
pub fn polyline_length(points: &[Vec3]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

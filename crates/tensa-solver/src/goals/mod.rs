//! Built-in goal variants.
//!
//! | Goal | Points | Effect |
//! |------|--------|--------|
//! | [`Spring`] | 2 | pulls/pushes toward a rest length |
//! | [`Bar`] | 2 | spring with axial stiffness `E·A/L0`, reports member force |
//! | [`Cable`] | 2 | tension-only bar with prestress |
//! | [`Angle`] | 4 | bends two segments toward a rest angle |
//! | [`Rod`] | 4 | straightening angle with stiffness `E·I/L̄`, reports moment |
//! | [`Anchor`] | 1 | pulls toward a fixed target |
//! | [`Support`] | 1 | anchor restricted to locked axes |
//! | [`OnPlane`] | n | projects onto a plane |
//! | [`FloorPlane`] | n / all | keeps points above a plane |
//! | [`PairPotential`] | 2 | distance-weighted repulsion or attraction |
//! | [`Locator`] | n | no effect, reports solved geometry |
//! | [`Load`] | 1 | constant push |
//! | [`AlongVector`] | 3 | keeps a point on the line through two others |
//! | [`OnSurface`] | n | pulls onto any [`Surface`](tensa_math::Surface) |

pub mod anchor;
pub mod angle;
pub mod custom;
pub mod load;
pub mod locator;
pub mod plane;
pub mod potential;
pub mod spring;

pub use anchor::{Anchor, Support};
pub use angle::{Angle, Rod};
pub use custom::{AlongVector, OnSurface};
pub use load::Load;
pub use locator::{Locator, LocatorShape};
pub use plane::{FloorPlane, OnPlane};
pub use potential::{PairPotential, Polarity};
pub use spring::{Bar, Cable, Spring};

pub use crate::goal::AxisLocks;

use tensa_math::Vec3;
use tensa_types::{TensaError, TensaResult};

/// Fails if any point is NaN or infinite.
pub(crate) fn check_points(goal: &str, points: &[Vec3]) -> TensaResult<()> {
    match points.iter().position(|p| !p.is_finite()) {
        Some(i) => Err(TensaError::InvalidGoal(format!(
            "{goal}: point {i} is not finite ({})",
            points[i]
        ))),
        None => Ok(()),
    }
}

/// Fails unless `value >= 0`. Infinity is accepted (hard constraint).
pub(crate) fn check_strength(goal: &str, what: &str, value: f64) -> TensaResult<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(TensaError::InvalidGoal(format!(
            "{goal}: {what} must be non-negative, got {value}"
        )))
    }
}

/// Fails unless `value` is positive and finite.
pub(crate) fn check_positive(goal: &str, what: &str, value: f64) -> TensaResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TensaError::InvalidGoal(format!(
            "{goal}: {what} must be positive and finite, got {value}"
        )))
    }
}

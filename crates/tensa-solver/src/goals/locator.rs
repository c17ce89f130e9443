//! Locators carry geometry through the solve without affecting it.
//!
//! Element builders attach one so the host can read back the relaxed
//! polyline or point under a user-chosen label.

use serde::{Deserialize, Serialize};
use tensa_math::Vec3;
use tensa_types::{TensaError, TensaResult};

use super::check_points;
use crate::goal::{Contribution, Goal, GoalOutput, GoalTopology};

/// How a locator re-emits its points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorShape {
    Point,
    Line,
    Polyline,
    Points,
}

/// A zero-effect goal that reports its points from solved positions.
#[derive(Debug, Clone)]
pub struct Locator {
    topology: GoalTopology,
    label: String,
    shape: LocatorShape,
}

impl Locator {
    /// Creates a locator. `Point` needs one point, `Line` two, the
    /// other shapes at least one.
    pub fn new(label: impl Into<String>, shape: LocatorShape, points: &[Vec3]) -> TensaResult<Self> {
        check_points("locator", points)?;
        let ok = match shape {
            LocatorShape::Point => points.len() == 1,
            LocatorShape::Line => points.len() == 2,
            LocatorShape::Polyline | LocatorShape::Points => !points.is_empty(),
        };
        if !ok {
            return Err(TensaError::InvalidGoal(format!(
                "locator: {shape:?} cannot be built from {} points",
                points.len()
            )));
        }
        Ok(Self {
            topology: GoalTopology::at(points),
            label: label.into(),
            shape,
        })
    }

    /// Shorthand for a point locator.
    pub fn point(label: impl Into<String>, point: Vec3) -> TensaResult<Self> {
        Self::new(label, LocatorShape::Point, &[point])
    }

    /// Shorthand for a polyline locator.
    pub fn polyline(label: impl Into<String>, points: &[Vec3]) -> TensaResult<Self> {
        Self::new(label, LocatorShape::Polyline, points)
    }

    /// Output shape.
    pub fn shape(&self) -> LocatorShape {
        self.shape
    }
}

impl Goal for Locator {
    fn name(&self) -> &str {
        &self.label
    }

    fn topology(&self) -> &GoalTopology {
        &self.topology
    }

    fn topology_mut(&mut self) -> &mut GoalTopology {
        &mut self.topology
    }

    fn evaluate(&self, points: &[Vec3]) -> Contribution {
        Contribution::none(points.len())
    }

    fn output(&self, points: &[Vec3]) -> Option<GoalOutput> {
        Some(match self.shape {
            LocatorShape::Point => GoalOutput::Point {
                position: points[0],
            },
            LocatorShape::Line => GoalOutput::Line {
                start: points[0],
                end: points[1],
            },
            LocatorShape::Polyline => GoalOutput::Polyline {
                points: points.to_vec(),
            },
            LocatorShape::Points => GoalOutput::Points {
                points: points.to_vec(),
            },
        })
    }
}

//! Element builders: goal groups assembled from one polyline or point.
//!
//! Each builder returns a [`GoalNode::Group`] ending with a [`Locator`]
//! so the relaxed geometry can be read back from the outputs.

use serde::{Deserialize, Serialize};
use tensa_math::geometry::{polyline_length, vector_angle};
use tensa_math::Vec3;
use tensa_types::constants::EPSILON;
use tensa_types::{TensaError, TensaResult};

use crate::goal::GoalNode;
use crate::goals::{
    check_positive, check_strength, Anchor, Angle, AxisLocks, Bar, Cable, Locator, Rod, Spring,
    Support,
};

/// Solid circular cross section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircularSection {
    /// Young's modulus.
    pub youngs_modulus: f64,
    /// Section diameter.
    pub diameter: f64,
}

impl CircularSection {
    /// Creates a section; both values must be positive.
    pub fn new(youngs_modulus: f64, diameter: f64) -> TensaResult<Self> {
        check_positive("section", "Young's modulus", youngs_modulus)?;
        check_positive("section", "diameter", diameter)?;
        Ok(Self {
            youngs_modulus,
            diameter,
        })
    }

    /// `π·d²/4`
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.diameter.powi(2) / 4.0
    }

    /// `π·d⁴/64`
    pub fn inertia(&self) -> f64 {
        std::f64::consts::PI * self.diameter.powi(4) / 64.0
    }

    /// `d/2`
    pub fn extreme_fiber(&self) -> f64 {
        0.5 * self.diameter
    }
}

/// Options for [`beam_element`] and [`calibrated_beam`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamOptions {
    /// Total target length; `None` keeps the current length.
    pub target_length: Option<f64>,
    /// Axial strength, scaled by the segment count.
    pub spring_strength: f64,
    /// Bending strength of each joint.
    pub bend_strength: f64,
    /// Joints whose arm angle does not exceed this (degrees, plus one)
    /// get no bending goal.
    pub bend_angle_min: f64,
    /// Segments shorter than this are dropped.
    pub min_segment_length: f64,
}

impl Default for BeamOptions {
    fn default() -> Self {
        Self {
            target_length: None,
            spring_strength: 1.0,
            bend_strength: 1.0,
            bend_angle_min: 0.0,
            min_segment_length: 0.0,
        }
    }
}

type Segment = (Vec3, Vec3);

fn segments(polyline: &[Vec3], min_length: f64) -> TensaResult<Vec<Segment>> {
    if polyline.len() < 2 {
        return Err(TensaError::InvalidGoal(format!(
            "element polyline needs at least 2 points, got {}",
            polyline.len()
        )));
    }
    let segs: Vec<Segment> = polyline
        .windows(2)
        .map(|w| (w[0], w[1]))
        .filter(|(a, b)| a.distance(*b) > min_length.max(EPSILON))
        .collect();
    if segs.is_empty() {
        return Err(TensaError::InvalidGoal(
            "element polyline has no segment above the minimum length".into(),
        ));
    }
    Ok(segs)
}

/// Consecutive segment pairs that share an endpoint, including the
/// closing pair of a closed polyline.
fn joints(segs: &[Segment]) -> Vec<(Segment, Segment)> {
    let n = segs.len();
    let pairs = if n > 2 { n } else { n - 1 };
    (0..pairs)
        .map(|i| (segs[i], segs[(i + 1) % n]))
        .filter(|(a, b)| a.1.distance(b.0) < EPSILON)
        .collect()
}

/// Angle at a joint between the two arms, in degrees (180 = straight).
fn arm_angle_degrees(a: Segment, b: Segment) -> f64 {
    vector_angle(a.1 - a.0, b.0 - b.1).to_degrees()
}

fn check_target(target: Option<f64>) -> TensaResult<()> {
    match target {
        Some(t) => check_positive("element", "target length", t),
        None => Ok(()),
    }
}

/// Springs along a polyline plus a polyline locator.
///
/// With a target length every spring gets `target / segments`;
/// otherwise each keeps its current length. Strength is scaled by the
/// segment count so long cables are not softer than short ones.
pub fn cable_element(
    polyline: &[Vec3],
    target_length: Option<f64>,
    strength: f64,
) -> TensaResult<GoalNode> {
    check_target(target_length)?;
    check_strength("cable_element", "strength", strength)?;
    let segs = segments(polyline, 0.0)?;
    let k = strength * segs.len() as f64;

    let mut nodes = Vec::with_capacity(segs.len() + 1);
    for &(a, b) in &segs {
        let rest = match target_length {
            Some(t) => t / segs.len() as f64,
            None => a.distance(b),
        };
        nodes.push(GoalNode::new(Spring::new(a, b, rest, k)?));
    }
    nodes.push(GoalNode::new(Locator::polyline("cable", polyline)?));
    Ok(GoalNode::Group(nodes))
}

/// Springs plus straightening angles along a polyline, plus a locator.
///
/// Rest lengths are scaled by `target / current total`. Joints whose
/// arm angle exceeds `bend_angle_min + 1°` get an [`Angle`] with rest 0,
/// so sharp kinks are left alone.
pub fn beam_element(polyline: &[Vec3], options: &BeamOptions) -> TensaResult<GoalNode> {
    check_target(options.target_length)?;
    check_strength("beam_element", "spring strength", options.spring_strength)?;
    check_strength("beam_element", "bend strength", options.bend_strength)?;
    let segs = segments(polyline, options.min_segment_length)?;

    let total = polyline_length(polyline);
    let scale = match options.target_length {
        Some(t) => t / total,
        None => 1.0,
    };
    let k = options.spring_strength * segs.len() as f64;

    let mut nodes = Vec::new();
    for &(a, b) in &segs {
        nodes.push(GoalNode::new(Spring::new(a, b, a.distance(b) * scale, k)?));
    }
    for (a, b) in joints(&segs) {
        if arm_angle_degrees(a, b) > options.bend_angle_min + 1.0 {
            nodes.push(GoalNode::new(Angle::new(
                [a.0, a.1],
                [b.0, b.1],
                0.0,
                options.bend_strength,
            )?));
        }
    }
    nodes.push(GoalNode::new(Locator::polyline("beam", polyline)?));
    Ok(GoalNode::Group(nodes))
}

/// An anchor plus a point locator.
pub fn anchor_element(point: Vec3, strength: f64) -> TensaResult<GoalNode> {
    Ok(GoalNode::Group(vec![
        GoalNode::new(Anchor::new(point, strength)?),
        GoalNode::new(Locator::point("anchor", point)?),
    ]))
}

/// A support plus a point locator.
pub fn support_element(point: Vec3, locks: AxisLocks, strength: f64) -> TensaResult<GoalNode> {
    Ok(GoalNode::Group(vec![
        GoalNode::new(Support::new(point, locks, strength)?),
        GoalNode::new(Locator::point("support", point)?),
    ]))
}

/// Prestressed cables with a circular section along a polyline.
pub fn calibrated_cable(
    polyline: &[Vec3],
    section: &CircularSection,
    prestress: f64,
) -> TensaResult<GoalNode> {
    let segs = segments(polyline, 0.0)?;
    let mut nodes = Vec::with_capacity(segs.len() + 1);
    for &(a, b) in &segs {
        nodes.push(GoalNode::new(Cable::new(
            a,
            b,
            section.youngs_modulus,
            section.area(),
            prestress,
        )?));
    }
    nodes.push(GoalNode::new(Locator::polyline("calibrated_cable", polyline)?));
    Ok(GoalNode::Group(nodes))
}

/// Bars and rod joints with a circular section along a polyline.
///
/// Uses `bend_angle_min` and `min_segment_length` from `options`; the
/// stiffnesses come from the section.
pub fn calibrated_beam(
    polyline: &[Vec3],
    section: &CircularSection,
    options: &BeamOptions,
) -> TensaResult<GoalNode> {
    let segs = segments(polyline, options.min_segment_length)?;
    let mut nodes = Vec::new();
    for &(a, b) in &segs {
        nodes.push(GoalNode::new(Bar::new(
            a,
            b,
            section.youngs_modulus,
            section.area(),
        )?));
    }
    for (a, b) in joints(&segs) {
        if arm_angle_degrees(a, b) > options.bend_angle_min + 1.0 {
            nodes.push(GoalNode::new(Rod::new(
                [a.0, a.1],
                [b.0, b.1],
                section.youngs_modulus,
                section.inertia(),
                section.extreme_fiber(),
            )?));
        }
    }
    nodes.push(GoalNode::new(Locator::polyline("calibrated_beam", polyline)?));
    Ok(GoalNode::Group(nodes))
}

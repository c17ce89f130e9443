//! Scene contract types.
//!
//! A scene is a solver configuration plus a list of tagged goal specs.
//! It is the file-level description of a relaxation and can be written
//! in TOML or JSON:
//!
//! ```toml
//! [solver]
//! threshold = 1e-13
//!
//! [[goals]]
//! type = "anchor"
//! point = [0.0, 0.0, 0.0]
//! strength = inf
//!
//! [[goals]]
//! type = "spring"
//! points = [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]]
//! rest_length = 5.0
//! ```
//!
//! JSON has no literal for infinity, so hard constraints are easiest to
//! express in TOML.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tensa_math::{Cylinder, Plane, Sphere, Surface, Vec3};
use tensa_solver::elements::{
    anchor_element, beam_element, cable_element, calibrated_beam, calibrated_cable,
    support_element, BeamOptions, CircularSection,
};
use tensa_solver::goals::{
    AlongVector, Anchor, Angle, AxisLocks, Bar, Cable, FloorPlane, Load, Locator, LocatorShape,
    OnPlane, OnSurface, PairPotential, Polarity, Rod, Spring, Support,
};
use tensa_solver::{GoalNode, SolverConfig};
use tensa_types::{TensaError, TensaResult};

/// A point as written in scene files.
pub type Point = [f64; 3];

fn default_strength() -> f64 {
    1.0
}

fn default_normal() -> Point {
    [0.0, 0.0, 1.0]
}

fn vec3(p: Point) -> Vec3 {
    Vec3::from_array(p)
}

fn vec3s(points: &[Point]) -> Vec<Vec3> {
    points.iter().copied().map(vec3).collect()
}

/// Complete input for one relaxation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Solver parameters. Missing keys take their defaults.
    #[serde(default)]
    pub solver: SolverConfig,
    /// Goals, possibly nested in groups.
    #[serde(default)]
    pub goals: Vec<GoalSpec>,
}

/// A plane given by origin and (not necessarily unit) normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneSpec {
    #[serde(default)]
    pub origin: Point,
    #[serde(default = "default_normal")]
    pub normal: Point,
}

impl Default for PlaneSpec {
    fn default() -> Self {
        Self {
            origin: [0.0; 3],
            normal: default_normal(),
        }
    }
}

impl PlaneSpec {
    fn build(&self) -> TensaResult<Plane> {
        Plane::new(vec3(self.origin), vec3(self.normal))
    }
}

/// Target geometry for `on_surface` goals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SurfaceSpec {
    Plane {
        #[serde(default)]
        origin: Point,
        #[serde(default = "default_normal")]
        normal: Point,
    },
    Sphere {
        #[serde(default)]
        center: Point,
        radius: f64,
    },
    Cylinder {
        #[serde(default)]
        origin: Point,
        axis: Point,
        radius: f64,
    },
}

impl SurfaceSpec {
    fn build(&self) -> TensaResult<Arc<dyn Surface>> {
        let surface: Arc<dyn Surface> = match *self {
            SurfaceSpec::Plane { origin, normal } => Arc::new(Plane::new(vec3(origin), vec3(normal))?),
            SurfaceSpec::Sphere { center, radius } => Arc::new(Sphere::new(vec3(center), radius)?),
            SurfaceSpec::Cylinder {
                origin,
                axis,
                radius,
            } => Arc::new(Cylinder::new(vec3(origin), vec3(axis), radius)?),
        };
        Ok(surface)
    }
}

/// Circular cross-section for calibrated elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub youngs_modulus: f64,
    pub diameter: f64,
}

impl SectionSpec {
    fn build(&self) -> TensaResult<CircularSection> {
        CircularSection::new(self.youngs_modulus, self.diameter)
    }
}

/// One entry of a scene's goal list.
///
/// Optional rest values (`rest_length`, `rest_angle`) default to the
/// geometry as written; angles are in radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GoalSpec {
    Spring {
        points: [Point; 2],
        rest_length: Option<f64>,
        #[serde(default = "default_strength")]
        strength: f64,
    },
    Bar {
        points: [Point; 2],
        youngs_modulus: f64,
        area: f64,
        rest_length: Option<f64>,
    },
    Cable {
        points: [Point; 2],
        youngs_modulus: f64,
        area: f64,
        #[serde(default)]
        prestress: f64,
    },
    Angle {
        segment_a: [Point; 2],
        segment_b: [Point; 2],
        rest_angle: Option<f64>,
        #[serde(default = "default_strength")]
        strength: f64,
    },
    Rod {
        segment_a: [Point; 2],
        segment_b: [Point; 2],
        youngs_modulus: f64,
        inertia: f64,
        #[serde(default)]
        extreme_fiber: f64,
    },
    Anchor {
        point: Point,
        target: Option<Point>,
        #[serde(default = "default_strength")]
        strength: f64,
    },
    Support {
        point: Point,
        #[serde(default)]
        locks: AxisLocks,
        #[serde(default = "default_strength")]
        strength: f64,
    },
    OnPlane {
        points: Vec<Point>,
        #[serde(default)]
        plane: PlaneSpec,
        #[serde(default = "default_strength")]
        strength: f64,
    },
    /// Without `points` the floor acts on every particle.
    Floor {
        points: Option<Vec<Point>>,
        #[serde(default)]
        plane: PlaneSpec,
        #[serde(default = "default_strength")]
        strength: f64,
    },
    Locator {
        label: String,
        shape: LocatorShape,
        points: Vec<Point>,
    },
    Load {
        point: Point,
        force: Point,
    },
    PairPotential {
        points: [Point; 2],
        #[serde(default = "default_strength")]
        strength: f64,
        exponent: f64,
        #[serde(default)]
        polarity: Polarity,
    },
    AlongVector {
        points: [Point; 3],
        parameter: f64,
        #[serde(default = "default_strength")]
        strength: f64,
    },
    OnSurface {
        points: Vec<Point>,
        surface: SurfaceSpec,
        #[serde(default = "default_strength")]
        strength: f64,
    },
    CableElement {
        polyline: Vec<Point>,
        target_length: Option<f64>,
        #[serde(default = "default_strength")]
        strength: f64,
    },
    BeamElement {
        polyline: Vec<Point>,
        #[serde(default)]
        options: BeamOptions,
    },
    AnchorElement {
        point: Point,
        #[serde(default = "default_strength")]
        strength: f64,
    },
    SupportElement {
        point: Point,
        #[serde(default)]
        locks: AxisLocks,
        #[serde(default = "default_strength")]
        strength: f64,
    },
    CalibratedCable {
        polyline: Vec<Point>,
        section: SectionSpec,
        #[serde(default)]
        prestress: f64,
    },
    CalibratedBeam {
        polyline: Vec<Point>,
        section: SectionSpec,
        #[serde(default)]
        options: BeamOptions,
    },
    Group {
        goals: Vec<GoalSpec>,
    },
}

impl GoalSpec {
    /// Short type tag, as written in scene files.
    pub fn kind(&self) -> &'static str {
        match self {
            GoalSpec::Spring { .. } => "spring",
            GoalSpec::Bar { .. } => "bar",
            GoalSpec::Cable { .. } => "cable",
            GoalSpec::Angle { .. } => "angle",
            GoalSpec::Rod { .. } => "rod",
            GoalSpec::Anchor { .. } => "anchor",
            GoalSpec::Support { .. } => "support",
            GoalSpec::OnPlane { .. } => "on_plane",
            GoalSpec::Floor { .. } => "floor",
            GoalSpec::Locator { .. } => "locator",
            GoalSpec::Load { .. } => "load",
            GoalSpec::PairPotential { .. } => "pair_potential",
            GoalSpec::AlongVector { .. } => "along_vector",
            GoalSpec::OnSurface { .. } => "on_surface",
            GoalSpec::CableElement { .. } => "cable_element",
            GoalSpec::BeamElement { .. } => "beam_element",
            GoalSpec::AnchorElement { .. } => "anchor_element",
            GoalSpec::SupportElement { .. } => "support_element",
            GoalSpec::CalibratedCable { .. } => "calibrated_cable",
            GoalSpec::CalibratedBeam { .. } => "calibrated_beam",
            GoalSpec::Group { .. } => "group",
        }
    }

    /// Constructs the goal (or goal tree) this spec describes.
    pub fn build(&self) -> TensaResult<GoalNode> {
        let node = match self {
            GoalSpec::Spring {
                points: [a, b],
                rest_length,
                strength,
            } => match rest_length {
                Some(rest) => GoalNode::new(Spring::new(vec3(*a), vec3(*b), *rest, *strength)?),
                None => GoalNode::new(Spring::from_current(vec3(*a), vec3(*b), *strength)?),
            },
            GoalSpec::Bar {
                points: [a, b],
                youngs_modulus,
                area,
                rest_length,
            } => match rest_length {
                Some(rest) => GoalNode::new(Bar::with_rest_length(
                    vec3(*a),
                    vec3(*b),
                    *rest,
                    *youngs_modulus,
                    *area,
                )?),
                None => GoalNode::new(Bar::new(vec3(*a), vec3(*b), *youngs_modulus, *area)?),
            },
            GoalSpec::Cable {
                points: [a, b],
                youngs_modulus,
                area,
                prestress,
            } => GoalNode::new(Cable::new(
                vec3(*a),
                vec3(*b),
                *youngs_modulus,
                *area,
                *prestress,
            )?),
            GoalSpec::Angle {
                segment_a,
                segment_b,
                rest_angle,
                strength,
            } => {
                let sa = [vec3(segment_a[0]), vec3(segment_a[1])];
                let sb = [vec3(segment_b[0]), vec3(segment_b[1])];
                match rest_angle {
                    Some(rest) => GoalNode::new(Angle::new(sa, sb, *rest, *strength)?),
                    None => GoalNode::new(Angle::from_current(sa, sb, *strength)?),
                }
            }
            GoalSpec::Rod {
                segment_a,
                segment_b,
                youngs_modulus,
                inertia,
                extreme_fiber,
            } => GoalNode::new(Rod::new(
                [vec3(segment_a[0]), vec3(segment_a[1])],
                [vec3(segment_b[0]), vec3(segment_b[1])],
                *youngs_modulus,
                *inertia,
                *extreme_fiber,
            )?),
            GoalSpec::Anchor {
                point,
                target,
                strength,
            } => match target {
                Some(t) => GoalNode::new(Anchor::with_target(vec3(*point), vec3(*t), *strength)?),
                None => GoalNode::new(Anchor::new(vec3(*point), *strength)?),
            },
            GoalSpec::Support {
                point,
                locks,
                strength,
            } => GoalNode::new(Support::new(vec3(*point), *locks, *strength)?),
            GoalSpec::OnPlane {
                points,
                plane,
                strength,
            } => GoalNode::new(OnPlane::new(&vec3s(points), plane.build()?, *strength)?),
            GoalSpec::Floor {
                points,
                plane,
                strength,
            } => match points {
                Some(points) => {
                    GoalNode::new(FloorPlane::new(&vec3s(points), plane.build()?, *strength)?)
                }
                None => GoalNode::new(FloorPlane::global(plane.build()?, *strength)?),
            },
            GoalSpec::Locator {
                label,
                shape,
                points,
            } => GoalNode::new(Locator::new(label.clone(), *shape, &vec3s(points))?),
            GoalSpec::Load { point, force } => {
                GoalNode::new(Load::new(vec3(*point), vec3(*force))?)
            }
            GoalSpec::PairPotential {
                points: [a, b],
                strength,
                exponent,
                polarity,
            } => GoalNode::new(PairPotential::new(
                vec3(*a),
                vec3(*b),
                *strength,
                *exponent,
                *polarity,
            )?),
            GoalSpec::AlongVector {
                points,
                parameter,
                strength,
            } => GoalNode::new(AlongVector::new(
                (*points).map(vec3),
                *parameter,
                *strength,
            )?),
            GoalSpec::OnSurface {
                points,
                surface,
                strength,
            } => GoalNode::new(OnSurface::new(&vec3s(points), surface.build()?, *strength)?),
            GoalSpec::CableElement {
                polyline,
                target_length,
                strength,
            } => cable_element(&vec3s(polyline), *target_length, *strength)?,
            GoalSpec::BeamElement { polyline, options } => {
                beam_element(&vec3s(polyline), options)?
            }
            GoalSpec::AnchorElement { point, strength } => anchor_element(vec3(*point), *strength)?,
            GoalSpec::SupportElement {
                point,
                locks,
                strength,
            } => support_element(vec3(*point), *locks, *strength)?,
            GoalSpec::CalibratedCable {
                polyline,
                section,
                prestress,
            } => calibrated_cable(&vec3s(polyline), &section.build()?, *prestress)?,
            GoalSpec::CalibratedBeam {
                polyline,
                section,
                options,
            } => calibrated_beam(&vec3s(polyline), &section.build()?, options)?,
            GoalSpec::Group { goals } => GoalNode::Group(
                goals
                    .iter()
                    .map(GoalSpec::build)
                    .collect::<TensaResult<Vec<_>>>()?,
            ),
        };
        Ok(node)
    }
}

/// Prefixes construction errors with the goal's position in the scene.
fn in_goal(index: usize, kind: &str, err: TensaError) -> TensaError {
    match err {
        TensaError::InvalidGoal(msg) => TensaError::InvalidGoal(format!("goals[{index}] ({kind}): {msg}")),
        other => other,
    }
}

impl Scene {
    /// Parses a scene from TOML text.
    pub fn from_toml_str(text: &str) -> TensaResult<Self> {
        toml::from_str(text).map_err(|e| TensaError::Serialization(format!("scene TOML: {e}")))
    }

    /// Parses a scene from JSON text.
    pub fn from_json_str(text: &str) -> TensaResult<Self> {
        serde_json::from_str(text).map_err(|e| TensaError::Serialization(format!("scene JSON: {e}")))
    }

    /// Loads a scene file, choosing the format by extension
    /// (`.toml` or `.json`).
    pub fn load(path: impl AsRef<Path>) -> TensaResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            Some("json") => Self::from_json_str(&text),
            _ => Err(TensaError::InvalidConfig(format!(
                "unsupported scene format: {} (expected .toml or .json)",
                path.display()
            ))),
        }
    }

    /// Serializes the scene as pretty JSON.
    pub fn to_json_pretty(&self) -> TensaResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| TensaError::Serialization(e.to_string()))
    }

    /// Builds every top-level goal, in order.
    pub fn goal_nodes(&self) -> TensaResult<Vec<GoalNode>> {
        self.goals
            .iter()
            .enumerate()
            .map(|(i, spec)| spec.build().map_err(|e| in_goal(i, spec.kind(), e)))
            .collect()
    }
}

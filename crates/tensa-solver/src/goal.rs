//! Goal trait: the core abstraction for local constraints.
//!
//! A goal reads the current positions of the particles it touches and
//! proposes a weighted move for each of them. The physical system
//! averages all proposals per particle and applies the result.
//!
//! ```text
//! system.assign_index(&mut goal, tolerance)?;   // resolve particle refs
//! loop {
//!     let points = gather(goal.particle_indices());
//!     let contribution = goal.evaluate(&points);   // moves + weights
//!     accumulate(contribution);
//! }
//! ```
//!
//! The trait is open: host code adds custom goals by implementing it,
//! without touching the solver.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use tensa_math::Vec3;
use tensa_types::{ParticleId, TensaError, TensaResult};

/// How a goal names one of its points before index assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParticleRef {
    /// Register a particle at this position, merging with any existing
    /// particle within the merge tolerance.
    At(Vec3),
    /// A particle that was added to the system explicitly.
    Index(ParticleId),
}

/// The particles a goal reads and writes.
///
/// Holds the particle references given at construction and, once the
/// physical system has assigned them, the resolved indices ("PIndex").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalTopology {
    refs: Vec<ParticleRef>,
    indices: Option<Vec<ParticleId>>,
}

impl GoalTopology {
    /// Creates a topology from explicit particle references.
    pub fn new(refs: Vec<ParticleRef>) -> Self {
        Self { refs, indices: None }
    }

    /// Creates a topology that registers particles at the given positions.
    pub fn at(points: &[Vec3]) -> Self {
        Self::new(points.iter().copied().map(ParticleRef::At).collect())
    }

    /// Creates a topology over already-existing particles.
    pub fn indexed(ids: &[ParticleId]) -> Self {
        Self::new(ids.iter().copied().map(ParticleRef::Index).collect())
    }

    /// The particle references, in goal point order.
    pub fn refs(&self) -> &[ParticleRef] {
        &self.refs
    }

    /// Number of goal points.
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Returns true if the goal has no points of its own.
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// The resolved particle indices, or `None` before assignment.
    pub fn indices(&self) -> Option<&[ParticleId]> {
        self.indices.as_deref()
    }

    /// Stores resolved indices. The count must match the references.
    pub fn assign(&mut self, ids: Vec<ParticleId>) -> TensaResult<()> {
        if ids.len() != self.refs.len() {
            return Err(TensaError::InvalidGoal(format!(
                "assigned {} indices to a goal with {} points",
                ids.len(),
                self.refs.len()
            )));
        }
        self.indices = Some(ids);
        Ok(())
    }

    /// Forgets the resolved indices (used when a goal is re-registered
    /// into a fresh system).
    pub fn unassign(&mut self) {
        self.indices = None;
    }

    /// Returns true once indices have been assigned.
    pub fn is_assigned(&self) -> bool {
        self.indices.is_some()
    }
}

/// Which axes a contribution acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisLocks {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl AxisLocks {
    /// All three axes.
    pub fn all() -> Self {
        Self {
            x: true,
            y: true,
            z: true,
        }
    }

    /// Only the vertical axis (a roller on the XY plane).
    pub fn vertical() -> Self {
        Self {
            z: true,
            ..Default::default()
        }
    }

    /// 1.0 on locked axes, 0.0 on free ones.
    pub fn as_mask(self) -> Vec3 {
        Vec3::new(
            f64::from(u8::from(self.x)),
            f64::from(u8::from(self.y)),
            f64::from(u8::from(self.z)),
        )
    }

    /// Zeroes the components of `v` on free axes.
    pub fn mask(self, v: Vec3) -> Vec3 {
        v * self.as_mask()
    }

    /// Returns true if no axis is locked.
    pub fn is_free(self) -> bool {
        !(self.x || self.y || self.z)
    }
}

/// Per-point moves and weights proposed by a goal for one step.
///
/// `moves` and `weights` always have one entry per goal point. `axes`,
/// when present, restricts each point's move and weight to some axes;
/// `None` means all three.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contribution {
    /// Target displacement for each point.
    pub moves: Vec<Vec3>,
    /// Weight of each move in the per-particle average.
    /// `f64::INFINITY` marks a hard constraint.
    pub weights: Vec<f64>,
    /// Optional per-point axis restriction.
    pub axes: Option<Vec<AxisLocks>>,
}

impl Contribution {
    /// A contribution that leaves `n` points untouched.
    pub fn none(n: usize) -> Self {
        Self {
            moves: vec![Vec3::ZERO; n],
            weights: vec![0.0; n],
            axes: None,
        }
    }

    /// Moves with one shared weight.
    pub fn uniform(moves: Vec<Vec3>, weight: f64) -> Self {
        let weights = vec![weight; moves.len()];
        Self {
            moves,
            weights,
            axes: None,
        }
    }

    /// Restricts each point to the given axes.
    pub fn with_axes(mut self, axes: Vec<AxisLocks>) -> Self {
        self.axes = Some(axes);
        self
    }

    /// Axes that point `k` acts on.
    pub fn axes_of(&self, k: usize) -> AxisLocks {
        match &self.axes {
            Some(axes) => axes[k],
            None => AxisLocks::all(),
        }
    }

    /// Number of points covered.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Returns true if the contribution covers no points.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Consumer-facing result of a goal, built from solved positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GoalOutput {
    /// A single point.
    Point { position: Vec3 },
    /// A set of unconnected points.
    Points { points: Vec<Vec3> },
    /// A straight line between two points.
    Line { start: Vec3, end: Vec3 },
    /// An open or closed polyline.
    Polyline { points: Vec<Vec3> },
    /// An axial member with its internal force (positive = tension).
    Member {
        start: Vec3,
        end: Vec3,
        force: f64,
        stress: f64,
    },
    /// Bending at a joint between two segments.
    Bending { joint: Vec3, moment: f64, stress: f64 },
    /// Reaction force at a support.
    Reaction { position: Vec3, force: Vec3 },
}

/// A goal output tagged with the name of the goal that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledOutput {
    /// Goal name (user label for locators).
    pub name: String,
    /// The output geometry or values.
    pub output: GoalOutput,
}

/// Trait for relaxation goals.
///
/// # Contract
///
/// - `evaluate` receives the current positions of the goal's particles,
///   in the same order as its particle references, and must return
///   exactly one move and one weight per point.
/// - `evaluate` is a pure function of those positions and the goal's own
///   parameters. It is called on a shared pre-step snapshot, possibly
///   from several threads.
/// - Degenerate geometry (zero-length edges, coincident points) must be
///   guarded locally by returning zero moves/weights, never NaN.
pub trait Goal: Debug + Send + Sync {
    /// Short name used in logs and labeled outputs.
    fn name(&self) -> &str;

    /// The particle references and resolved indices.
    fn topology(&self) -> &GoalTopology;

    /// Mutable access used by the physical system during assignment.
    fn topology_mut(&mut self) -> &mut GoalTopology;

    /// Proposes moves and weights for the current point positions.
    fn evaluate(&self, points: &[Vec3]) -> Contribution;

    /// Builds an output from solved positions. Most goals have none.
    fn output(&self, points: &[Vec3]) -> Option<GoalOutput> {
        let _ = points;
        None
    }

    /// A goal that acts on every particle in the system instead of its
    /// own point list (e.g. a global floor).
    fn covers_all_particles(&self) -> bool {
        false
    }

    /// Resolved particle indices, `None` before assignment.
    fn particle_indices(&self) -> Option<&[ParticleId]> {
        self.topology().indices()
    }
}

/// A goal or a nested group of goals, as produced by element builders
/// and scene files.
#[derive(Debug)]
pub enum GoalNode {
    /// A single goal.
    Goal(Box<dyn Goal>),
    /// A group of nodes, flattened depth-first in order.
    Group(Vec<GoalNode>),
}

impl GoalNode {
    /// Wraps a concrete goal.
    pub fn new(goal: impl Goal + 'static) -> Self {
        Self::Goal(Box::new(goal))
    }

    /// Flattens the node into a goal list, preserving order.
    pub fn flatten(self) -> Vec<Box<dyn Goal>> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<Box<dyn Goal>>) {
        match self {
            GoalNode::Goal(goal) => out.push(goal),
            GoalNode::Group(nodes) => {
                for node in nodes {
                    node.flatten_into(out);
                }
            }
        }
    }

    /// Number of goals after flattening.
    pub fn goal_count(&self) -> usize {
        match self {
            GoalNode::Goal(_) => 1,
            GoalNode::Group(nodes) => nodes.iter().map(GoalNode::goal_count).sum(),
        }
    }
}

impl From<Box<dyn Goal>> for GoalNode {
    fn from(goal: Box<dyn Goal>) -> Self {
        GoalNode::Goal(goal)
    }
}

impl From<Vec<GoalNode>> for GoalNode {
    fn from(nodes: Vec<GoalNode>) -> Self {
        GoalNode::Group(nodes)
    }
}

/// Flattens a sequence of goal nodes into one ordered goal list.
pub fn flatten<I>(nodes: I) -> Vec<Box<dyn Goal>>
where
    I: IntoIterator<Item = GoalNode>,
{
    GoalNode::Group(nodes.into_iter().collect()).flatten()
}

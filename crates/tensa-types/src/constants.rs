//! Numeric constants and solver defaults.

/// Default merge tolerance: particle requests closer than this share an index.
pub const DEFAULT_MERGE_TOLERANCE: f64 = 1.0e-3;

/// Default convergence threshold on the per-step displacement measure.
pub const DEFAULT_THRESHOLD: f64 = 1.0e-13;

/// Default iteration cap for offline (zombie) relaxation.
pub const DEFAULT_MAX_ITERATIONS: u32 = 5000;

/// Default number of steps per live tick.
pub const DEFAULT_SUBSTEPS: u32 = 10;

/// Mass assigned to particles created by goal registration.
pub const DEFAULT_PARTICLE_MASS: f64 = 1.0;

/// Lengths below this are treated as degenerate (zero-length edges,
/// coincident points, parallel segments).
pub const EPSILON: f64 = 1.0e-12;

//! Binary state snapshots.
//!
//! A snapshot captures the particle state of a system at one iteration
//! so a relaxation can be inspected or diffed later without re-running
//! the goals.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tensa_math::Vec3;
use tensa_solver::PhysicalSystem;
use tensa_types::{TensaError, TensaResult};

/// Particle state at one iteration.
///
/// Serialized with `bincode` for compact binary output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Iteration counter when the snapshot was taken.
    pub iteration: u32,
    /// Displacement measure of that iteration.
    pub v_sum: f64,
    /// Positions (flat: [x0, y0, z0, x1, y1, z1, ...]).
    pub positions: Vec<f64>,
    /// Particle masses.
    pub masses: Vec<f64>,
}

impl StateSnapshot {
    /// Captures the current state of `system`.
    pub fn from_system(system: &PhysicalSystem) -> Self {
        let positions = system
            .positions()
            .iter()
            .flat_map(|p| p.to_array())
            .collect();
        Self {
            iteration: system.iterations(),
            v_sum: system.v_sum(),
            positions,
            masses: system.particles().masses().to_vec(),
        }
    }

    /// Number of particles.
    pub fn particle_count(&self) -> usize {
        self.masses.len()
    }

    /// Positions as vectors.
    pub fn positions_vec3(&self) -> Vec<Vec3> {
        self.positions
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
            .collect()
    }

    /// Axis-aligned bounds of all positions, `None` when empty.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let points = self.positions_vec3();
        let first = *points.first()?;
        Some(
            points
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }

    /// Serializes to compact binary format.
    pub fn to_bytes(&self) -> TensaResult<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| TensaError::Serialization(format!("snapshot serialization failed: {e}")))
    }

    /// Deserializes from binary format and checks buffer lengths.
    pub fn from_bytes(data: &[u8]) -> TensaResult<Self> {
        let snapshot: Self = bincode::deserialize(data)
            .map_err(|e| TensaError::Serialization(format!("snapshot deserialization failed: {e}")))?;
        if snapshot.positions.len() != 3 * snapshot.masses.len() {
            return Err(TensaError::Serialization(format!(
                "snapshot has {} position values for {} particles",
                snapshot.positions.len(),
                snapshot.masses.len()
            )));
        }
        Ok(snapshot)
    }

    /// Writes the snapshot to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> TensaResult<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Reads a snapshot from `path`.
    pub fn read(path: impl AsRef<Path>) -> TensaResult<Self> {
        Self::from_bytes(&std::fs::read(path)?)
    }
}

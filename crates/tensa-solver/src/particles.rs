//! Particle store: dense per-particle buffers plus the merge index.
//!
//! This is the primary mutable data structure during relaxation. Goals
//! never own particles; they reference them by [`ParticleId`].
//!
//! # Layout
//!
//! All arrays have length `len()`:
//! ```text
//! positions:   [p0, p1, p2, ...]
//! masses:      [m0, m1, m2, ...]
//! move_sum:    [Σw·m for p0, ...]   reset every step, per axis
//! weight_sum:  [Σw for p0, ...]     reset every step, per axis
//! ```

use std::collections::HashMap;

use tensa_math::Vec3;
use tensa_types::constants::DEFAULT_PARTICLE_MASS;
use tensa_types::{ParticleId, TensaError, TensaResult};

use crate::config::ConvergenceMetric;
use crate::goal::AxisLocks;

/// Smallest cell edge used by the merge index.
const MIN_CELL_SIZE: f64 = 1.0e-9;

type CellKey = (i64, i64, i64);

/// Uniform-grid spatial hash over particle positions.
///
/// Cell size equals the merge tolerance, so every particle within
/// tolerance of a query lies in one of the 27 cells around it.
#[derive(Debug, Clone, Default)]
struct MergeIndex {
    /// Inverse cell size (cached).
    inv_cell_size: f64,
    /// Tolerance the grid was built for.
    tolerance: f64,
    /// Cell key to particle indices.
    grid: HashMap<CellKey, Vec<u32>>,
    /// Positions moved since the last build.
    dirty: bool,
    /// False until the first build.
    built: bool,
}

impl MergeIndex {
    /// Float-to-int casts saturate, so far-away coordinates share the
    /// outermost cells; the distance check still decides merges.
    fn cell_key(&self, p: Vec3) -> CellKey {
        (
            (p.x * self.inv_cell_size).floor() as i64,
            (p.y * self.inv_cell_size).floor() as i64,
            (p.z * self.inv_cell_size).floor() as i64,
        )
    }

    fn needs_rebuild(&self, tolerance: f64) -> bool {
        !self.built || self.dirty || self.tolerance != tolerance
    }

    fn rebuild(&mut self, positions: &[Vec3], tolerance: f64) {
        self.tolerance = tolerance;
        self.inv_cell_size = 1.0 / tolerance.max(MIN_CELL_SIZE);
        self.grid.clear();
        for (i, &p) in positions.iter().enumerate() {
            let key = self.cell_key(p);
            self.grid.entry(key).or_default().push(i as u32);
        }
        self.dirty = false;
        self.built = true;
    }

    fn insert(&mut self, index: u32, p: Vec3) {
        let key = self.cell_key(p);
        self.grid.entry(key).or_default().push(index);
    }

    /// Closest particle within tolerance; ties resolve to the lowest index.
    fn closest(&self, positions: &[Vec3], p: Vec3) -> Option<u32> {
        let tol_sq = self.tolerance * self.tolerance;
        let (cx, cy, cz) = self.cell_key(p);
        let mut best: Option<(u32, f64)> = None;

        for dx in -1..=1_i64 {
            for dy in -1..=1_i64 {
                for dz in -1..=1_i64 {
                    let key = match (cx.checked_add(dx), cy.checked_add(dy), cz.checked_add(dz)) {
                        (Some(x), Some(y), Some(z)) => (x, y, z),
                        _ => continue,
                    };
                    let Some(cell) = self.grid.get(&key) else {
                        continue;
                    };
                    for &i in cell {
                        let d_sq = (positions[i as usize] - p).length_squared();
                        if d_sq > tol_sq {
                            continue;
                        }
                        best = match best {
                            Some((j, best_sq)) if best_sq < d_sq || (best_sq == d_sq && j < i) => {
                                Some((j, best_sq))
                            }
                            _ => Some((i, d_sq)),
                        };
                    }
                }
            }
        }

        best.map(|(i, _)| i)
    }
}

/// Dense particle buffers with tolerance-based registration.
#[derive(Debug, Clone, Default)]
pub struct ParticleStore {
    positions: Vec<Vec3>,
    masses: Vec<f64>,

    // ─── Per-step accumulators ───
    move_sum: Vec<Vec3>,
    weight_sum: Vec<Vec3>,
    hard_sum: Vec<Vec3>,
    hard_count: Vec<Vec3>,

    index: MergeIndex,
}

impl ParticleStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if no particle exists.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Current positions, indexed by particle id.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Particle masses, indexed by particle id.
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// Position of one particle.
    pub fn position(&self, id: ParticleId) -> TensaResult<Vec3> {
        self.positions
            .get(id.index())
            .copied()
            .ok_or(TensaError::ParticleOutOfBounds {
                index: id.index(),
                count: self.len(),
            })
    }

    /// Returns the index of an existing particle within `tolerance` of
    /// `position`, or creates a new one there with the default mass.
    ///
    /// Merging never moves the existing particle.
    pub fn register(&mut self, position: Vec3, tolerance: f64) -> TensaResult<ParticleId> {
        if !position.is_finite() {
            return Err(TensaError::InvalidGoal(format!(
                "particle position must be finite, got {position}"
            )));
        }
        if !(tolerance >= 0.0) || !tolerance.is_finite() {
            return Err(TensaError::InvalidConfig(format!(
                "merge tolerance must be non-negative and finite, got {tolerance}"
            )));
        }

        if self.index.needs_rebuild(tolerance) {
            self.index.rebuild(&self.positions, tolerance);
        }
        if let Some(existing) = self.index.closest(&self.positions, position) {
            return Ok(ParticleId(existing));
        }

        let id = self.push(position, DEFAULT_PARTICLE_MASS);
        self.index.insert(id.0, position);
        Ok(id)
    }

    /// Appends a particle without merging.
    pub fn add(&mut self, position: Vec3, mass: f64) -> TensaResult<ParticleId> {
        if !position.is_finite() {
            return Err(TensaError::InvalidGoal(format!(
                "particle position must be finite, got {position}"
            )));
        }
        if !(mass > 0.0) || !mass.is_finite() {
            return Err(TensaError::InvalidGoal(format!(
                "particle mass must be positive and finite, got {mass}"
            )));
        }
        let id = self.push(position, mass);
        self.index.dirty = true;
        Ok(id)
    }

    fn push(&mut self, position: Vec3, mass: f64) -> ParticleId {
        let id = ParticleId(self.positions.len() as u32);
        self.positions.push(position);
        self.masses.push(mass);
        self.move_sum.push(Vec3::ZERO);
        self.weight_sum.push(Vec3::ZERO);
        self.hard_sum.push(Vec3::ZERO);
        self.hard_count.push(Vec3::ZERO);
        id
    }

    /// Occupied cells of the merge index.
    pub fn merge_cell_count(&self) -> usize {
        self.index.grid.len()
    }

    /// Drops every particle.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Zeroes the per-step accumulators.
    pub fn reset_accumulators(&mut self) {
        self.move_sum.fill(Vec3::ZERO);
        self.weight_sum.fill(Vec3::ZERO);
        self.hard_sum.fill(Vec3::ZERO);
        self.hard_count.fill(Vec3::ZERO);
    }

    /// Adds one weighted move to a particle, on the given axes only.
    ///
    /// Infinite weights are kept apart: on every axis they touch they
    /// override all finite contributions to the same particle.
    pub fn accumulate(&mut self, id: ParticleId, movement: Vec3, weight: f64, axes: AxisLocks) {
        let i = id.index();
        let mask = axes.as_mask();
        if weight.is_infinite() {
            self.hard_sum[i] += movement * mask;
            self.hard_count[i] += mask;
        } else if weight > 0.0 {
            self.move_sum[i] += movement * mask * weight;
            self.weight_sum[i] += mask * weight;
        }
    }

    /// Applies the averaged moves. Returns the displacement measure and
    /// the number of particles that moved.
    ///
    /// All deltas are computed first; if any new position or the running
    /// measure is not finite, nothing is written.
    pub fn apply(&mut self, metric: ConvergenceMetric) -> TensaResult<(f64, usize)> {
        let mut v_sum = 0.0;
        let mut deltas = Vec::new();

        for i in 0..self.positions.len() {
            let mut delta = Vec3::ZERO;
            let mut touched = false;
            for axis in 0..3 {
                if self.hard_count[i][axis] > 0.0 {
                    delta[axis] = self.hard_sum[i][axis] / self.hard_count[i][axis];
                } else if self.weight_sum[i][axis] > 0.0 {
                    delta[axis] = self.move_sum[i][axis] / self.weight_sum[i][axis];
                } else {
                    continue;
                }
                touched = true;
            }
            if !touched {
                continue;
            }
            v_sum += metric.measure(delta.length_squared(), self.masses[i]);
            if !(self.positions[i] + delta).is_finite() || !v_sum.is_finite() {
                return Err(TensaError::NonFiniteUpdate { particle: i });
            }
            deltas.push((i, delta));
        }

        let moved = deltas.len();
        for (i, delta) in deltas {
            self.positions[i] += delta;
        }
        if moved > 0 {
            self.index.dirty = true;
        }
        Ok((v_sum, moved))
    }
}

//! Solver configuration.
//!
//! Parameters that control relaxation: merge tolerance, convergence
//! threshold, iteration caps, live substeps and the displacement metric.

use serde::{Deserialize, Serialize};
use tensa_types::constants::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_MERGE_TOLERANCE, DEFAULT_SUBSTEPS, DEFAULT_THRESHOLD,
};
use tensa_types::{TensaError, TensaResult};

/// How the per-step displacement measure (`v_sum`) is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceMetric {
    /// Σ|Δ|
    Displacement,
    /// Σ|Δ|²
    #[default]
    SquaredDisplacement,
    /// Σ½·m·|Δ|²
    KineticEnergy,
}

impl ConvergenceMetric {
    /// Contribution of one particle's displacement to the measure.
    pub fn measure(self, delta_length_squared: f64, mass: f64) -> f64 {
        match self {
            ConvergenceMetric::Displacement => delta_length_squared.sqrt(),
            ConvergenceMetric::SquaredDisplacement => delta_length_squared,
            ConvergenceMetric::KineticEnergy => 0.5 * mass * delta_length_squared,
        }
    }
}

/// Configuration for the relaxation driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Merge tolerance: registration requests closer than this share a particle.
    pub tolerance: f64,

    /// Convergence threshold. A run stops once `v_sum < threshold`.
    pub threshold: f64,

    /// Iteration cap for bounded relaxation.
    pub max_iterations: u32,

    /// Steps performed per live tick.
    pub substeps: u32,

    /// Evaluate goals in parallel inside each step.
    pub parallel: bool,

    /// Displacement measure used for convergence.
    pub metric: ConvergenceMetric,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_MERGE_TOLERANCE,
            threshold: DEFAULT_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            substeps: DEFAULT_SUBSTEPS,
            parallel: false,
            metric: ConvergenceMetric::default(),
        }
    }
}

impl SolverConfig {
    /// A short, looser run for quick previews.
    pub fn quick() -> Self {
        Self {
            tolerance: 1.0e-4,
            threshold: 1.0e-10,
            max_iterations: 100,
            ..Default::default()
        }
    }

    /// Settings for an interactive live session.
    pub fn live() -> Self {
        Self {
            substeps: DEFAULT_SUBSTEPS,
            threshold: DEFAULT_THRESHOLD,
            ..Default::default()
        }
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> TensaResult<()> {
        if !(self.tolerance > 0.0) || !self.tolerance.is_finite() {
            return Err(TensaError::InvalidConfig(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        if !(self.threshold >= 0.0) {
            return Err(TensaError::InvalidConfig(format!(
                "threshold must be non-negative, got {}",
                self.threshold
            )));
        }
        if self.substeps == 0 {
            return Err(TensaError::InvalidConfig(
                "substeps must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Returns true if `v_sum` is below the threshold.
    pub fn is_converged(&self, v_sum: f64) -> bool {
        v_sum < self.threshold
    }
}

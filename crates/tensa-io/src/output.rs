//! Relaxation output document.
//!
//! The JSON written after a zombie solve: the run report, every
//! particle position, and each goal's labeled output in goal order.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tensa_solver::{LabeledOutput, RelaxReport, Relaxation};
use tensa_types::{TensaError, TensaResult};

/// Everything a caller needs from a finished relaxation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelaxationOutput {
    pub report: RelaxReport,
    /// Final particle positions, indexed by particle id.
    pub positions: Vec<[f64; 3]>,
    pub outputs: Vec<LabeledOutput>,
}

impl RelaxationOutput {
    /// Collects report, positions and goal outputs from a relaxation.
    pub fn from_relaxation(relaxation: &Relaxation) -> TensaResult<Self> {
        Ok(Self {
            report: relaxation.report.clone(),
            positions: relaxation.positions().iter().map(|p| p.to_array()).collect(),
            outputs: relaxation.outputs()?,
        })
    }

    /// Outputs whose goal name matches `name`.
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a LabeledOutput> + 'a {
        self.outputs.iter().filter(move |o| o.name == name)
    }

    /// Serializes to pretty JSON.
    pub fn to_json_pretty(&self) -> TensaResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| TensaError::Serialization(e.to_string()))
    }

    /// Parses a document written by [`to_json_pretty`](Self::to_json_pretty).
    pub fn from_json_str(text: &str) -> TensaResult<Self> {
        serde_json::from_str(text).map_err(|e| TensaError::Serialization(e.to_string()))
    }

    /// Writes the document to `path` as pretty JSON.
    pub fn write(&self, path: impl AsRef<Path>) -> TensaResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

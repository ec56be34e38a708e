// task.rs - Parameters for one maze in a batch

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lattice::{Lattice, LatticeConfig, LatticeKind};
use crate::sampler::AcceptanceCriteria;

fn default_kind() -> LatticeKind {
    LatticeKind::Rectangular
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MazeTask {
    #[serde(default = "default_kind")]
    pub kind: LatticeKind,
    pub width: usize,
    pub height: usize,
    pub desired_ratio: f64,
    pub epsilon: f64,
}

impl MazeTask {
    pub fn rectangular(width: usize, height: usize, desired_ratio: f64, epsilon: f64) -> Self {
        Self {
            kind: LatticeKind::Rectangular,
            width,
            height,
            desired_ratio,
            epsilon,
        }
    }

    pub fn criteria(&self) -> Result<AcceptanceCriteria> {
        AcceptanceCriteria::new(self.desired_ratio, self.epsilon)
    }

    pub fn build_lattice(&self, config: LatticeConfig) -> Result<Arc<Lattice>> {
        Lattice::build(self.kind, self.width, self.height, config).map(Arc::new)
    }

    /// Human-readable caption, e.g. `40x40, 0.25±0.010`.
    pub fn caption(&self) -> String {
        format!(
            "{}x{}, {:.2}\u{b1}{:.3}",
            self.width, self.height, self.desired_ratio, self.epsilon
        )
    }
}

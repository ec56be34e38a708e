// record.rs - One-line persisted record sufficient to rebuild an accepted maze
//
// Line format: `{task_index} {kind_tag} {width} {height} {seed}`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{MazeError, Result};
use crate::lattice::{Lattice, LatticeConfig, LatticeKind};
use crate::topology::Maze;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeRecord {
    pub task_index: usize,
    pub kind: LatticeKind,
    pub width: usize,
    pub height: usize,
    pub seed: u64,
}

impl MazeRecord {
    pub fn from_maze(task_index: usize, maze: &Maze) -> Self {
        let lattice = maze.lattice();
        Self {
            task_index,
            kind: lattice.kind(),
            width: lattice.width(),
            height: lattice.height(),
            seed: maze.seed(),
        }
    }

    /// Rebuild the lattice and replay generation with the recorded seed.
    pub fn regenerate(&self, config: LatticeConfig) -> Result<Maze> {
        let lattice = Lattice::build(self.kind, self.width, self.height, config)?;
        Maze::generate(Arc::new(lattice), self.seed)
    }
}

impl fmt::Display for MazeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.task_index, self.kind, self.width, self.height, self.seed
        )
    }
}

impl FromStr for MazeRecord {
    type Err = MazeError;

    fn from_str(line: &str) -> Result<Self> {
        let invalid = |reason: String| MazeError::InvalidRecord {
            line: line.to_string(),
            reason,
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [index, kind, width, height, seed] = fields.as_slice() else {
            return Err(invalid(format!("expected 5 fields, found {}", fields.len())));
        };

        fn number<T: FromStr>(name: &str, value: &str) -> std::result::Result<T, String> {
            value
                .parse()
                .map_err(|_| format!("{name} '{value}' is not a valid number"))
        }

        Ok(Self {
            task_index: number("task index", index).map_err(invalid)?,
            kind: kind.parse().map_err(invalid)?,
            width: number("width", width).map_err(invalid)?,
            height: number("height", height).map_err(invalid)?,
            seed: number("seed", seed).map_err(invalid)?,
        })
    }
}

/// Parse every non-blank line of a records file.
pub fn parse_records(text: &str) -> Result<Vec<MazeRecord>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::parse)
        .collect()
}

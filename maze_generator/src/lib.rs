// lib.rs - Maze topology generation with path-ratio acceptance sampling
//
// Build a lattice, carve a random spanning tree out of it, extract the
// solution path between the terminal cells and resample until the path
// covers the desired share of cells.

pub mod disjoint_set;
pub mod embedded;
pub mod error;
pub mod graph;
pub mod lattice;
pub mod record;
pub mod sampler;
pub mod task;
pub mod topology;

// Re-export commonly used types
pub use embedded::{EmbeddedGraph, Layout, Point};
pub use error::{MazeError, Result};
pub use graph::{Edge, EdgeId, Graph, VertexId};
pub use lattice::{Cell, Lattice, LatticeConfig, LatticeKind};
pub use record::{parse_records, MazeRecord};
pub use sampler::{
    AcceptanceCriteria, AcceptanceSampler, Accepted, Candidate, RatioStats, SamplerConfig,
};
pub use task::MazeTask;
pub use topology::{Maze, Path, PathStep, SpanningTree};

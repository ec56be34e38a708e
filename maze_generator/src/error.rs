// error.rs - Error type shared by graph construction, generation and sampling

use thiserror::Error;

use crate::graph::VertexId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MazeError {
    #[error("Invalid lattice dimensions {width}x{height}: both sides must be at least 2")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Invalid cell size {width}x{height}: both sides must be positive")]
    InvalidCellSize { width: u32, height: u32 },

    #[error("Canvas for a {width}x{height} lattice does not fit in u32 pixels")]
    CanvasTooLarge { width: usize, height: usize },

    #[error("Vertex {0} does not belong to this graph")]
    UnknownVertex(VertexId),

    #[error("Vertex is already present in the graph")]
    DuplicateVertex,

    #[error("Vertices {a} and {b} are already connected")]
    DuplicateEdge { a: VertexId, b: VertexId },

    #[error("Refusing to connect vertex {0} to itself")]
    SelfLoop(VertexId),

    #[error("Graph is not connected: spanning tree reached {reached} of {total} vertices")]
    Disconnected { reached: usize, total: usize },

    #[error("No tree path between {start} and {end}")]
    NoPath { start: VertexId, end: VertexId },

    #[error("Invalid acceptance criteria: {reason}")]
    InvalidCriteria { reason: String },

    #[error("Target ratio unreachable after {attempts} attempts (seen {lowest:.4}..{highest:.4})")]
    TargetUnreachable {
        attempts: u64,
        lowest: f64,
        highest: f64,
    },

    #[error("Invalid maze record '{line}': {reason}")]
    InvalidRecord { line: String, reason: String },
}

impl MazeError {
    /// Errors confined to a single generation attempt. The sampler discards
    /// the attempt and retries with a fresh seed; everything else propagates.
    pub fn is_attempt_local(&self) -> bool {
        matches!(self, MazeError::NoPath { .. })
    }
}

pub type Result<T> = std::result::Result<T, MazeError>;

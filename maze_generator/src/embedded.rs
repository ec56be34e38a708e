// embedded.rs - Graph whose vertices carry a 2D position for drawing

use std::hash::Hash;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::{EdgeId, Graph, VertexId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Positioning rule for one kind of vertex.
///
/// Positions are a pure function of the vertex payload; they never depend on
/// the rest of the graph and are never consulted by generation.
pub trait Layout<V> {
    fn position(&self, vertex: &V) -> Point;
}

impl<V, F> Layout<V> for F
where
    F: Fn(&V) -> Point,
{
    fn position(&self, vertex: &V) -> Point {
        self(vertex)
    }
}

/// A [`Graph`] plus the position of each of its vertices.
///
/// Read access goes through `Deref<Target = Graph<V>>`; mutation goes through
/// this type so every vertex gets positioned when it is added.
#[derive(Debug, Clone)]
pub struct EmbeddedGraph<V, L> {
    graph: Graph<V>,
    positions: Vec<Point>,
    layout: L,
}

impl<V, L> EmbeddedGraph<V, L>
where
    V: Clone + Eq + Hash,
    L: Layout<V>,
{
    pub fn new(layout: L) -> Self {
        Self {
            graph: Graph::new(),
            positions: Vec::new(),
            layout,
        }
    }

    pub fn with_capacity(layout: L, vertices: usize, edges: usize) -> Self {
        Self {
            graph: Graph::with_capacity(vertices, edges),
            positions: Vec::with_capacity(vertices),
            layout,
        }
    }

    pub fn add_vertex(&mut self, data: V) -> Result<VertexId> {
        let position = self.layout.position(&data);
        let id = self.graph.add_vertex(data)?;
        self.positions.push(position);
        Ok(id)
    }

    pub fn connect(&mut self, a: VertexId, b: VertexId, weight: Option<f64>) -> Result<EdgeId> {
        self.graph.connect(a, b, weight)
    }

    /// # Panics
    /// If `id` was not produced by this graph.
    #[inline]
    pub fn position(&self, id: VertexId) -> Point {
        self.positions[id.index()]
    }
}

impl<V, L> Deref for EmbeddedGraph<V, L> {
    type Target = Graph<V>;

    fn deref(&self) -> &Graph<V> {
        &self.graph
    }
}

// graph.rs - Undirected graph with a shared edge table and per-vertex incidence lists
//
// Every undirected edge is stored once. Each endpoint's incidence list points
// at the same edge record, so an edge is traversed in either direction and
// edge counts never need halving.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::{MazeError, Result};

/// Stable identity of a vertex: its insertion index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(usize);

impl VertexId {
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Index into the graph-wide edge table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(usize);

impl EdgeId {
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Undirected edge between two vertices, with an optional weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: VertexId,
    pub destination: VertexId,
    pub weight: Option<f64>,
}

impl Edge {
    /// The endpoint opposite to `from`, or `None` if `from` is not an endpoint.
    #[inline]
    pub fn other(&self, from: VertexId) -> Option<VertexId> {
        if from == self.source {
            Some(self.destination)
        } else if from == self.destination {
            Some(self.source)
        } else {
            None
        }
    }

    #[inline]
    pub fn joins(&self, a: VertexId, b: VertexId) -> bool {
        (self.source == a && self.destination == b) || (self.source == b && self.destination == a)
    }
}

#[derive(Debug, Clone)]
struct VertexEntry<V> {
    data: V,
    incident: Vec<EdgeId>,
}

/// Graph owning its vertices (in insertion order) and its edges.
#[derive(Debug, Clone)]
pub struct Graph<V> {
    vertices: Vec<VertexEntry<V>>,
    edges: Vec<Edge>,
    lookup: HashMap<V, VertexId>,
}

impl<V> Default for Graph<V> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            lookup: HashMap::new(),
        }
    }
}

impl<V: Clone + Eq + Hash> Graph<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, edges: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            edges: Vec::with_capacity(edges),
            lookup: HashMap::with_capacity(vertices),
        }
    }

    /// Append a vertex. Fails if an equal vertex is already present.
    pub fn add_vertex(&mut self, data: V) -> Result<VertexId> {
        if self.lookup.contains_key(&data) {
            return Err(MazeError::DuplicateVertex);
        }
        let id = VertexId(self.vertices.len());
        self.lookup.insert(data.clone(), id);
        self.vertices.push(VertexEntry {
            data,
            incident: Vec::new(),
        });
        Ok(id)
    }

    /// Find the id assigned to a vertex payload.
    pub fn find(&self, data: &V) -> Option<VertexId> {
        self.lookup.get(data).copied()
    }
}

impl<V> Graph<V> {
    /// Insert an undirected edge between `a` and `b`.
    pub fn connect(&mut self, a: VertexId, b: VertexId, weight: Option<f64>) -> Result<EdgeId> {
        self.check(a)?;
        self.check(b)?;
        if a == b {
            return Err(MazeError::SelfLoop(a));
        }
        if self.edge_between(a, b).is_some() {
            return Err(MazeError::DuplicateEdge { a, b });
        }

        let id = EdgeId(self.edges.len());
        self.edges.push(Edge {
            source: a,
            destination: b,
            weight,
        });
        self.vertices[a.0].incident.push(id);
        self.vertices[b.0].incident.push(id);
        Ok(id)
    }

    /// Edge joining `a` and `b`, if any.
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        let entry = self.vertices.get(a.0)?;
        entry
            .incident
            .iter()
            .copied()
            .find(|&e| self.edges[e.0].joins(a, b))
    }

    #[inline]
    pub fn contains(&self, id: VertexId) -> bool {
        id.0 < self.vertices.len()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Vertex ids in insertion order.
    pub fn vertices(&self) -> impl ExactSizeIterator<Item = VertexId> + Clone {
        (0..self.vertices.len()).map(VertexId)
    }

    pub fn vertex(&self, id: VertexId) -> Result<&V> {
        self.vertices
            .get(id.0)
            .map(|entry| &entry.data)
            .ok_or(MazeError::UnknownVertex(id))
    }

    /// Edges incident to `id`, in the order they were connected.
    pub fn edges(&self, id: VertexId) -> Result<&[EdgeId]> {
        self.vertices
            .get(id.0)
            .map(|entry| entry.incident.as_slice())
            .ok_or(MazeError::UnknownVertex(id))
    }

    /// All edges with their ids, in creation order.
    pub fn all_edges(&self) -> impl ExactSizeIterator<Item = (EdgeId, &Edge)> + Clone {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeId(i), e))
    }

    /// # Panics
    /// If `id` was not produced by this graph.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    pub fn neighbors(&self, id: VertexId) -> Result<impl Iterator<Item = VertexId> + '_> {
        let incident = self.edges(id)?;
        Ok(incident
            .iter()
            .filter_map(move |&e| self.edges[e.0].other(id)))
    }

    fn check(&self, id: VertexId) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(MazeError::UnknownVertex(id))
        }
    }
}

// topology.rs - Random spanning tree ("the maze") and its terminal-to-terminal path
//
// Construction is randomized Kruskal: shuffle every lattice edge with a
// seeded RNG, then keep each edge that joins two different components.
// Everything random flows from the single `StdRng` seeded per attempt, so a
// seed and a lattice fully determine the maze.

use std::collections::VecDeque;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::disjoint_set::DisjointSet;
use crate::error::{MazeError, Result};
use crate::graph::{EdgeId, Graph, VertexId};
use crate::lattice::Lattice;

/// Subset of a graph's edges forming a tree over all of its vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanningTree {
    /// Tree edges in the order they were accepted.
    edges: Vec<EdgeId>,
    /// Tree edges incident to each vertex.
    incident: Vec<Vec<EdgeId>>,
    member: Vec<bool>,
}

impl SpanningTree {
    /// Randomized Kruskal over `graph`.
    ///
    /// Fails with [`MazeError::Disconnected`] when `graph` has no spanning tree.
    pub fn randomized<V, R: Rng + ?Sized>(graph: &Graph<V>, rng: &mut R) -> Result<Self> {
        let vertex_count = graph.vertex_count();
        let mut order: Vec<EdgeId> = graph.all_edges().map(|(id, _)| id).collect();
        order.shuffle(rng);

        let mut sets = DisjointSet::new(vertex_count);
        let mut tree = Self {
            edges: Vec::with_capacity(vertex_count.saturating_sub(1)),
            incident: vec![Vec::new(); vertex_count],
            member: vec![false; graph.edge_count()],
        };

        for id in order {
            if tree.edges.len() + 1 == vertex_count {
                break;
            }
            let edge = graph.edge(id);
            if sets.union(edge.source.index(), edge.destination.index()) {
                tree.edges.push(id);
                tree.member[id.index()] = true;
                tree.incident[edge.source.index()].push(id);
                tree.incident[edge.destination.index()].push(id);
            }
        }

        if vertex_count == 0 || sets.component_count() != 1 {
            let reached = if vertex_count == 0 {
                0
            } else {
                let root = sets.find(0);
                (0..vertex_count).filter(|&v| sets.find(v) == root).count()
            };
            return Err(MazeError::Disconnected {
                reached,
                total: vertex_count,
            });
        }

        Ok(tree)
    }

    #[inline]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn contains(&self, edge: EdgeId) -> bool {
        self.member.get(edge.index()).copied().unwrap_or(false)
    }

    /// Tree edges touching `vertex` (empty for unknown vertices).
    pub fn incident(&self, vertex: VertexId) -> &[EdgeId] {
        self.incident
            .get(vertex.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The unique tree path from `start` to `end`, found breadth-first.
    pub fn path<V>(&self, graph: &Graph<V>, start: VertexId, end: VertexId) -> Result<Path> {
        if !graph.contains(start) {
            return Err(MazeError::UnknownVertex(start));
        }
        if !graph.contains(end) {
            return Err(MazeError::UnknownVertex(end));
        }

        let mut via: Vec<Option<EdgeId>> = vec![None; graph.vertex_count()];
        let mut visited = vec![false; graph.vertex_count()];
        let mut queue = VecDeque::new();
        visited[start.index()] = true;
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if current == end {
                break;
            }
            for &id in self.incident(current) {
                let Some(next) = graph.edge(id).other(current) else {
                    continue;
                };
                if !visited[next.index()] {
                    visited[next.index()] = true;
                    via[next.index()] = Some(id);
                    queue.push_back(next);
                }
            }
        }

        if !visited[end.index()] {
            return Err(MazeError::NoPath { start, end });
        }

        // Walk back from `end` along the recorded edges.
        let mut steps = Vec::new();
        let mut current = end;
        while current != start {
            let id = via[current.index()].ok_or(MazeError::NoPath { start, end })?;
            let previous = graph
                .edge(id)
                .other(current)
                .ok_or(MazeError::NoPath { start, end })?;
            steps.push(PathStep {
                edge: id,
                from: previous,
                to: current,
            });
            current = previous;
        }
        steps.reverse();

        Ok(Path { start, steps })
    }
}

/// One edge of a path, oriented in the direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    pub edge: EdgeId,
    pub from: VertexId,
    pub to: VertexId,
}

/// Ordered edge sequence between two vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    start: VertexId,
    steps: Vec<PathStep>,
}

impl Path {
    #[inline]
    pub fn start(&self) -> VertexId {
        self.start
    }

    pub fn end(&self) -> VertexId {
        self.steps.last().map_or(self.start, |step| step.to)
    }

    #[inline]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.steps.len()
    }

    /// Cells visited, terminals included. Edges are stored once, so this is
    /// simply `edges + 1`.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.steps.len() + 1
    }

    /// Visited vertices from start to end.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        std::iter::once(self.start).chain(self.steps.iter().map(|step| step.to))
    }
}

/// A generated maze: lattice, seed, carved spanning tree and solution path.
#[derive(Debug, Clone)]
pub struct Maze {
    lattice: Arc<Lattice>,
    seed: u64,
    tree: SpanningTree,
    path: Path,
}

impl Maze {
    /// One generation attempt. Pure: the same lattice and seed always give
    /// the same tree and path.
    pub fn generate(lattice: Arc<Lattice>, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let graph = lattice.graph();
        let tree = SpanningTree::randomized(graph, &mut rng)?;
        let path = tree.path(graph, lattice.start(), lattice.end())?;

        Ok(Self {
            lattice,
            seed,
            tree,
            path,
        })
    }

    #[inline]
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn tree(&self) -> &SpanningTree {
        &self.tree
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Passages leaving `vertex`, i.e. its incident edges restricted to the tree.
    pub fn passages(&self, vertex: VertexId) -> &[EdgeId] {
        self.tree.incident(vertex)
    }

    /// Solution length in cells over the total cell count.
    pub fn path_ratio(&self) -> f64 {
        self.path.cell_count() as f64 / self.lattice.cell_count() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::LatticeConfig;

    fn lattice(width: usize, height: usize) -> Arc<Lattice> {
        Arc::new(Lattice::rectangular(width, height, LatticeConfig::default()).unwrap())
    }

    fn assert_spanning(tree: &SpanningTree, graph: &Graph<crate::lattice::Cell>) {
        assert_eq!(tree.edge_count(), graph.vertex_count() - 1);
        let mut sets = DisjointSet::new(graph.vertex_count());
        for &id in tree.edges() {
            let edge = graph.edge(id);
            assert!(sets.union(edge.source.index(), edge.destination.index()), "cycle");
        }
        assert_eq!(sets.component_count(), 1);
    }

    #[test]
    fn test_tree_spans_lattice() {
        let lattice = lattice(7, 5);
        for seed in 0..20 {
            let maze = Maze::generate(Arc::clone(&lattice), seed).unwrap();
            assert_spanning(maze.tree(), lattice.graph());
        }
    }

    #[test]
    fn test_same_seed_same_maze() {
        let lattice = lattice(10, 10);
        let a = Maze::generate(Arc::clone(&lattice), 1234).unwrap();
        let b = Maze::generate(Arc::clone(&lattice), 1234).unwrap();
        assert_eq!(a.tree(), b.tree());
        assert_eq!(a.path(), b.path());

        let differs = (0..10u64)
            .map(|seed| Maze::generate(Arc::clone(&lattice), seed).unwrap())
            .any(|m| m.tree() != a.tree());
        assert!(differs);
    }

    #[test]
    fn test_path_joins_terminals_along_tree() {
        let lattice = lattice(6, 4);
        let maze = Maze::generate(Arc::clone(&lattice), 99).unwrap();
        let path = maze.path();

        assert_eq!(path.start(), lattice.start());
        assert_eq!(path.end(), lattice.end());
        assert_eq!(path.vertices().count(), path.cell_count());

        let mut previous = lattice.start();
        for step in path.steps() {
            assert!(maze.tree().contains(step.edge));
            assert_eq!(step.from, previous);
            assert!(lattice.graph().edge(step.edge).joins(step.from, step.to));
            previous = step.to;
        }

        // A simple path never revisits a cell.
        let mut cells: Vec<_> = path.vertices().collect();
        cells.sort();
        cells.dedup();
        assert_eq!(cells.len(), path.cell_count());
    }

    #[test]
    fn test_repeated_path_queries_agree() {
        let lattice = lattice(5, 5);
        let maze = Maze::generate(Arc::clone(&lattice), 7).unwrap();
        let again = maze
            .tree()
            .path(lattice.graph(), lattice.start(), lattice.end())
            .unwrap();
        assert_eq!(&again, maze.path());

        let reversed = maze
            .tree()
            .path(lattice.graph(), lattice.end(), lattice.start())
            .unwrap();
        assert_eq!(reversed.edge_count(), maze.path().edge_count());
    }

    #[test]
    fn test_two_by_two_maze() {
        let lattice = lattice(2, 2);
        for seed in 0..10 {
            let maze = Maze::generate(Arc::clone(&lattice), seed).unwrap();
            assert_eq!(maze.tree().edge_count(), 3);
            // Opposite corners are always two steps apart in any 3-edge tree.
            assert_eq!(maze.path().edge_count(), 2);
            assert_eq!(maze.path_ratio(), 0.75);
        }
    }

    #[test]
    fn test_path_to_self_is_single_cell() {
        let lattice = lattice(3, 3);
        let maze = Maze::generate(Arc::clone(&lattice), 3).unwrap();
        let path = maze
            .tree()
            .path(lattice.graph(), lattice.start(), lattice.start())
            .unwrap();
        assert_eq!(path.edge_count(), 0);
        assert_eq!(path.cell_count(), 1);
        assert_eq!(path.end(), lattice.start());
    }

    #[test]
    fn test_disconnected_graph_rejected() {
        let mut graph = Graph::new();
        let a = graph.add_vertex(0u8).unwrap();
        let b = graph.add_vertex(1u8).unwrap();
        let c = graph.add_vertex(2u8).unwrap();
        let _d = graph.add_vertex(3u8).unwrap();
        graph.connect(a, b, None).unwrap();
        graph.connect(b, c, None).unwrap();

        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(
            SpanningTree::randomized(&graph, &mut rng),
            Err(MazeError::Disconnected { reached: 3, total: 4 })
        );
    }

    #[test]
    fn test_passages_restricted_to_tree() {
        let lattice = lattice(4, 4);
        let maze = Maze::generate(Arc::clone(&lattice), 11).unwrap();
        let mut total = 0;
        for vertex in lattice.graph().vertices() {
            for &edge in maze.passages(vertex) {
                assert!(maze.tree().contains(edge));
                assert!(lattice.graph().edges(vertex).unwrap().contains(&edge));
                total += 1;
            }
        }
        // Each tree edge is listed at both endpoints.
        assert_eq!(total, 2 * maze.tree().edge_count());
    }
}

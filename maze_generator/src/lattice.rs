// lattice.rs - Lattice kinds and the rectangular lattice builder
//
// The lattice is the "dual graph" of a maze: one vertex per cell, one edge
// per pair of adjacent cells. Generation carves a spanning tree out of it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::embedded::{EmbeddedGraph, Layout, Point};
use crate::error::{MazeError, Result};
use crate::graph::VertexId;

pub const DEFAULT_CELL_SIZE: u32 = 20;

/// Topology of the cell lattice. Only the rectangular grid exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum LatticeKind {
    Rectangular,
}

impl LatticeKind {
    /// Short tag used in maze record files.
    pub const fn tag(self) -> &'static str {
        match self {
            LatticeKind::Rectangular => "rect",
        }
    }
}

impl fmt::Display for LatticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for LatticeKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "rect" | "rectangular" => Ok(LatticeKind::Rectangular),
            other => Err(format!("unknown lattice kind '{other}'")),
        }
    }
}

/// Logical position of a cell in a rectangular lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub column: usize,
}

impl Cell {
    #[inline]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Pixel scale of one lattice cell. Purely cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatticeConfig {
    pub cell_width: u32,
    pub cell_height: u32,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            cell_width: DEFAULT_CELL_SIZE,
            cell_height: DEFAULT_CELL_SIZE,
        }
    }
}

impl LatticeConfig {
    pub fn square(cell_size: u32) -> Self {
        Self {
            cell_width: cell_size,
            cell_height: cell_size,
        }
    }
}

/// Maps a cell to `(column * cell_width, row * cell_height)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangularLayout {
    pub cell_width: f64,
    pub cell_height: f64,
}

impl Layout<Cell> for RectangularLayout {
    #[inline]
    fn position(&self, cell: &Cell) -> Point {
        Point::new(
            cell.column as f64 * self.cell_width,
            cell.row as f64 * self.cell_height,
        )
    }
}

pub type LatticeGraph = EmbeddedGraph<Cell, RectangularLayout>;

/// An immutable lattice together with the two terminal cells a maze must join.
#[derive(Debug, Clone)]
pub struct Lattice {
    kind: LatticeKind,
    width: usize,
    height: usize,
    config: LatticeConfig,
    canvas: (u32, u32),
    graph: LatticeGraph,
    start: VertexId,
    end: VertexId,
}

impl Lattice {
    /// Build the lattice for `kind`.
    pub fn build(
        kind: LatticeKind,
        width: usize,
        height: usize,
        config: LatticeConfig,
    ) -> Result<Self> {
        match kind {
            LatticeKind::Rectangular => Self::rectangular(width, height, config),
        }
    }

    /// `width * height` cells, each joined to its horizontal and vertical
    /// neighbours. Start is the top-left cell, end the bottom-right one.
    pub fn rectangular(width: usize, height: usize, config: LatticeConfig) -> Result<Self> {
        if width < 2 || height < 2 {
            return Err(MazeError::InvalidDimensions { width, height });
        }
        if config.cell_width == 0 || config.cell_height == 0 {
            return Err(MazeError::InvalidCellSize {
                width: config.cell_width,
                height: config.cell_height,
            });
        }
        let canvas = canvas_extent(width, config.cell_width)
            .zip(canvas_extent(height, config.cell_height))
            .ok_or(MazeError::CanvasTooLarge { width, height })?;

        let layout = RectangularLayout {
            cell_width: config.cell_width as f64,
            cell_height: config.cell_height as f64,
        };
        let edge_count = (width - 1) * height + width * (height - 1);
        let mut graph = EmbeddedGraph::with_capacity(layout, width * height, edge_count);

        // Row-major insertion: vertex index == row * width + column.
        for row in 0..height {
            for column in 0..width {
                graph.add_vertex(Cell::new(row, column))?;
            }
        }

        let id = |row: usize, column: usize| VertexId::new(row * width + column);
        for row in 0..height {
            for column in 0..width {
                if column + 1 < width {
                    graph.connect(id(row, column), id(row, column + 1), None)?;
                }
                if row + 1 < height {
                    graph.connect(id(row, column), id(row + 1, column), None)?;
                }
            }
        }

        log::debug!(
            "Built {}x{} rectangular lattice: {} vertices, {} edges",
            width,
            height,
            graph.vertex_count(),
            graph.edge_count()
        );

        Ok(Self {
            kind: LatticeKind::Rectangular,
            width,
            height,
            config,
            canvas,
            graph,
            start: id(0, 0),
            end: id(height - 1, width - 1),
        })
    }

    #[inline]
    pub fn kind(&self) -> LatticeKind {
        self.kind
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn config(&self) -> LatticeConfig {
        self.config
    }

    #[inline]
    pub fn graph(&self) -> &LatticeGraph {
        &self.graph
    }

    #[inline]
    pub fn start(&self) -> VertexId {
        self.start
    }

    #[inline]
    pub fn end(&self) -> VertexId {
        self.end
    }

    pub fn cell_count(&self) -> usize {
        self.graph.vertex_count()
    }

    /// Pixel size of the drawing surface. Checked to fit when the lattice is built.
    #[inline]
    pub fn canvas_size(&self) -> (u32, u32) {
        self.canvas
    }

    /// Vertex for the cell at `(row, column)`, if inside the lattice.
    pub fn vertex_at(&self, row: usize, column: usize) -> Option<VertexId> {
        self.graph.find(&Cell::new(row, column))
    }
}

fn canvas_extent(cells: usize, cell_size: u32) -> Option<u32> {
    u32::try_from(cells).ok()?.checked_mul(cell_size)
}

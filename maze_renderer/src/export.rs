// export.rs - Serializable snapshot of an accepted maze for external renderers
use maze_generator::{LatticeKind, Maze, Point};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportCell {
    pub id: usize,
    pub row: usize,
    pub column: usize,
    pub position: Point,
    /// Neighbouring cell ids reachable through an open passage.
    #[serde(rename = "graph")]
    pub passages: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MazeExport {
    pub kind: LatticeKind,
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub canvas: CanvasSize,
    pub cells: Vec<ExportCell>,
    /// Cell ids along the solution, start to end.
    pub solution: Vec<usize>,
    pub path_ratio: f64,
}

impl MazeExport {
    pub fn from_maze(maze: &Maze) -> maze_generator::Result<Self> {
        let lattice = maze.lattice();
        let graph = lattice.graph();
        let (canvas_width, canvas_height) = lattice.canvas_size();

        let cells = graph
            .vertices()
            .map(|v| -> maze_generator::Result<ExportCell> {
                let cell = graph.vertex(v)?;
                let passages = maze
                    .passages(v)
                    .iter()
                    .filter_map(|&e| graph.edge(e).other(v))
                    .map(|n| n.index())
                    .collect();
                Ok(ExportCell {
                    id: v.index(),
                    row: cell.row,
                    column: cell.column,
                    position: graph.position(v),
                    passages,
                })
            })
            .collect::<maze_generator::Result<Vec<_>>>()?;

        Ok(Self {
            kind: lattice.kind(),
            width: lattice.width(),
            height: lattice.height(),
            seed: maze.seed(),
            canvas: CanvasSize {
                width: canvas_width,
                height: canvas_height,
            },
            cells,
            solution: maze.path().vertices().map(|v| v.index()).collect(),
            path_ratio: maze.path_ratio(),
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

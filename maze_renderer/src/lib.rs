// lib.rs - Library exports for maze-renderer
// Batch driver, PNG rendering and JSON export for generated mazes

pub mod batch;
pub mod error_handling;
pub mod export;
pub mod render;

// Re-export commonly used types
pub use batch::{generate_each, parse_tasks, BatchOptions, BatchOutcome, BatchWriter};
pub use error_handling::{RenderError, Result};
pub use export::MazeExport;
pub use render::{encode_png, render_maze, RenderStyle};

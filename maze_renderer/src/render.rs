// render.rs - CPU rasterizer for a generated maze
//
// Draws the spanning tree (the passages) between cell centres, then the
// solution path on top, then markers on the two terminal cells.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use maze_generator::{Maze, Point};

use crate::error_handling::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub background: Rgba<u8>,
    pub passage: Rgba<u8>,
    pub solution: Rgba<u8>,
    /// Stroke width of passages, in pixels.
    pub passage_width: u32,
    /// Stroke width of the solution path, in pixels.
    pub solution_width: u32,
    /// Side of the square drawn on start and end cells (0 disables).
    pub terminal_size: u32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: Rgba([255, 255, 255, 255]),
            passage: Rgba([0, 0, 0, 255]),
            solution: Rgba([220, 30, 30, 255]),
            passage_width: 2,
            solution_width: 2,
            terminal_size: 6,
        }
    }
}

/// Paint `maze` onto a canvas of `Lattice::canvas_size()`.
pub fn render_maze(maze: &Maze, style: &RenderStyle) -> RgbaImage {
    let lattice = maze.lattice();
    let (width, height) = lattice.canvas_size();
    let config = lattice.config();
    let graph = lattice.graph();
    let half = Point::new(config.cell_width as f64 / 2.0, config.cell_height as f64 / 2.0);
    let centre = |v| {
        let p = graph.position(v);
        Point::new(p.x + half.x, p.y + half.y)
    };

    let mut image = RgbaImage::from_pixel(width, height, style.background);

    for &id in maze.tree().edges() {
        let edge = graph.edge(id);
        draw_segment(
            &mut image,
            centre(edge.source),
            centre(edge.destination),
            style.passage_width,
            style.passage,
        );
    }

    for step in maze.path().steps() {
        draw_segment(
            &mut image,
            centre(step.from),
            centre(step.to),
            style.solution_width,
            style.solution,
        );
    }

    if style.terminal_size > 0 {
        for terminal in [lattice.start(), lattice.end()] {
            stamp(&mut image, centre(terminal), style.terminal_size, style.solution);
        }
    }

    image
}

/// Encode as PNG into memory.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

/// Thick line from `from` to `to`, stamping a square brush at every step.
fn draw_segment(image: &mut RgbaImage, from: Point, to: Point, width: u32, color: Rgba<u8>) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        stamp(image, Point::new(from.x + dx * t, from.y + dy * t), width, color);
    }
}

/// Fill a `size`-pixel square centred on `at`, clipped to the canvas.
fn stamp(image: &mut RgbaImage, at: Point, size: u32, color: Rgba<u8>) {
    let size = size.max(1) as i64;
    let left = at.x.floor() as i64 - size / 2;
    let top = at.y.floor() as i64 - size / 2;
    let (width, height) = (image.width() as i64, image.height() as i64);

    for y in top.max(0)..(top + size).min(height) {
        for x in left.max(0)..(left + size).min(width) {
            image.put_pixel(x as u32, y as u32, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_generator::{Lattice, LatticeConfig};
    use std::sync::Arc;

    fn maze(width: usize, height: usize, seed: u64) -> Maze {
        let lattice = Lattice::rectangular(width, height, LatticeConfig::square(10)).unwrap();
        Maze::generate(Arc::new(lattice), seed).unwrap()
    }

    #[test]
    fn test_canvas_matches_lattice() {
        let maze = maze(6, 4, 1);
        let image = render_maze(&maze, &RenderStyle::default());
        assert_eq!(image.dimensions(), (60, 40));
    }

    #[test]
    fn test_solution_and_terminals_are_painted() {
        let style = RenderStyle::default();
        let maze = maze(5, 5, 8);
        let image = render_maze(&maze, &style);

        // Cell centres are at (col * 10 + 5, row * 10 + 5).
        assert_eq!(*image.get_pixel(5, 5), style.solution);
        assert_eq!(*image.get_pixel(45, 45), style.solution);
        for vertex in maze.path().vertices() {
            let p = maze.lattice().graph().position(vertex);
            assert_eq!(*image.get_pixel(p.x as u32 + 5, p.y as u32 + 5), style.solution);
        }
    }

    #[test]
    fn test_passages_drawn_and_walls_left_blank() {
        let style = RenderStyle {
            terminal_size: 0,
            ..RenderStyle::default()
        };
        let maze = maze(4, 4, 21);
        let image = render_maze(&maze, &style);
        let graph = maze.lattice().graph();

        for (id, edge) in graph.all_edges() {
            let a = graph.position(edge.source);
            let b = graph.position(edge.destination);
            // Midpoint between the two cell centres.
            let x = ((a.x + b.x) / 2.0) as u32 + 5;
            let y = ((a.y + b.y) / 2.0) as u32 + 5;
            let pixel = *image.get_pixel(x, y);
            if maze.tree().contains(id) {
                assert_ne!(pixel, style.background, "missing passage {id:?}");
            } else {
                assert_eq!(pixel, style.background, "wall painted {id:?}");
            }
        }
    }

    #[test]
    fn test_png_signature() {
        let image = render_maze(&maze(3, 3, 2), &RenderStyle::default());
        let png = encode_png(&image).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_stamp_clips_at_border() {
        let mut image = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        stamp(&mut image, Point::new(0.0, 0.0), 4, Rgba([1, 2, 3, 4]));
        assert_eq!(*image.get_pixel(0, 0), Rgba([1, 2, 3, 4]));
        assert_eq!(*image.get_pixel(1, 1), Rgba([1, 2, 3, 4]));
        assert_eq!(*image.get_pixel(2, 2), Rgba([0, 0, 0, 0]));
    }
}

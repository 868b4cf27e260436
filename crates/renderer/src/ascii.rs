//! Terminal rasterizer for the headless demo.
//!
//! Replays a [`DrawList`] onto a character grid so the radar can be
//! inspected in a terminal: icons plot as `*`, rects as shaded fills,
//! text as itself.

use glam::Vec2;

use crate::{DrawCmd, DrawList};

/// A fixed-size character canvas mapping panel pixels to terminal cells.
#[derive(Debug)]
pub struct AsciiCanvas {
    cols: usize,
    rows: usize,
    /// Panel pixels per character cell.
    cell: Vec2,
    cells: Vec<char>,
}

impl AsciiCanvas {
    /// Canvas of `cols` x `rows` characters covering a panel of
    /// `panel_size` pixels. Degenerate sizes are clamped to one cell.
    pub fn new(cols: usize, rows: usize, panel_size: Vec2) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            cell: Vec2::new(
                (panel_size.x / cols as f32).max(1.0),
                (panel_size.y / rows as f32).max(1.0),
            ),
            cells: vec![' '; cols * rows],
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(' ');
    }

    fn plot(&mut self, pos: Vec2, glyph: char) {
        let col = (pos.x / self.cell.x) as isize;
        let row = (pos.y / self.cell.y) as isize;
        if col >= 0 && row >= 0 && (col as usize) < self.cols && (row as usize) < self.rows {
            self.cells[row as usize * self.cols + col as usize] = glyph;
        }
    }

    /// Replay recorded draw commands onto the grid.
    pub fn replay(&mut self, list: &DrawList) {
        for cmd in list.commands() {
            match cmd {
                DrawCmd::TexturedPolygon { points, .. } => {
                    self.plot(DrawList::polygon_center(points), '*');
                }
                DrawCmd::FilledRect { min, max, .. } => {
                    let mut y = min.y;
                    while y <= max.y {
                        let mut x = min.x;
                        while x <= max.x {
                            self.plot(Vec2::new(x, y), '.');
                            x += self.cell.x;
                        }
                        y += self.cell.y;
                    }
                }
                DrawCmd::Text { pos, text, .. } => {
                    for (i, ch) in text.chars().enumerate() {
                        self.plot(*pos + Vec2::new(i as f32 * self.cell.x, 0.0), ch);
                    }
                }
            }
        }
    }

    /// Render the grid as a bordered multi-line string.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.cols + 3) * (self.rows + 2));
        out.push('+');
        out.push_str(&"-".repeat(self.cols));
        out.push_str("+\n");
        for row in 0..self.rows {
            out.push('|');
            for col in 0..self.cols {
                out.push(self.cells[row * self.cols + col]);
            }
            out.push_str("|\n");
        }
        out.push('+');
        out.push_str(&"-".repeat(self.cols));
        out.push('+');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Surface, TextureId, Vertex};

    #[test]
    fn polygon_plots_at_center() {
        let mut list = DrawList::new();
        let quad = [
            Vertex::new(Vec2::new(10.0, 10.0), Vec2::ZERO),
            Vertex::new(Vec2::new(30.0, 10.0), Vec2::ZERO),
            Vertex::new(Vec2::new(30.0, 30.0), Vec2::ZERO),
            Vertex::new(Vec2::new(10.0, 30.0), Vec2::ZERO),
        ];
        list.draw_textured_polygon(TextureId(0), &quad, Color::WHITE);

        let mut canvas = AsciiCanvas::new(10, 10, Vec2::new(100.0, 100.0));
        canvas.replay(&list);
        let rendered = canvas.render();
        assert!(rendered.contains('*'));
    }

    #[test]
    fn out_of_bounds_plot_is_ignored() {
        let mut canvas = AsciiCanvas::new(4, 4, Vec2::new(40.0, 40.0));
        canvas.plot(Vec2::new(-5.0, 200.0), '#');
        assert!(!canvas.render().contains('#'));
    }
}

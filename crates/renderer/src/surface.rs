//! The draw surface trait and a recording implementation.

use glam::Vec2;

/// Opaque handle to a loaded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 64, 64);
    pub const BLUE: Color = Color::rgb(64, 96, 255);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const GREY: Color = Color::rgb(128, 128, 128);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// One corner of a textured polygon: panel position plus 0-1 texture coords.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec2,
    pub tex_coord: Vec2,
}

impl Vertex {
    pub fn new(position: Vec2, tex_coord: Vec2) -> Self {
        Self {
            position,
            tex_coord,
        }
    }
}

/// The narrow draw interface the overview renders through.
///
/// Panel coordinates: origin top-left, +Y down, pixels.
pub trait Surface {
    /// Draw a four-corner textured polygon modulated by `color`.
    fn draw_textured_polygon(&mut self, texture: TextureId, points: &[Vertex; 4], color: Color);

    /// Draw an axis-aligned filled rectangle.
    fn draw_filled_rect(&mut self, min: Vec2, max: Vec2, color: Color);

    /// Measure a single line of text in pixels.
    fn text_size(&self, text: &str) -> Vec2;

    /// Draw a single line of text with its top-left at `pos`.
    fn draw_text(&mut self, pos: Vec2, text: &str, color: Color);
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    TexturedPolygon {
        texture: TextureId,
        points: [Vertex; 4],
        color: Color,
    },
    FilledRect {
        min: Vec2,
        max: Vec2,
        color: Color,
    },
    Text {
        pos: Vec2,
        text: String,
        color: Color,
    },
}

/// A [`Surface`] that records draw calls instead of rasterizing them.
///
/// Tests assert against the recorded commands; the demo replays them onto
/// an [`crate::AsciiCanvas`].
#[derive(Debug, Default)]
pub struct DrawList {
    cmds: Vec<DrawCmd>,
    /// Glyph cell used for text measurement, in pixels.
    glyph: Vec2,
}

impl DrawList {
    pub fn new() -> Self {
        Self {
            cmds: Vec::new(),
            glyph: Vec2::new(7.0, 12.0),
        }
    }

    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.cmds
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Center of a recorded textured polygon (average of its corners).
    pub fn polygon_center(points: &[Vertex; 4]) -> Vec2 {
        points.iter().map(|v| v.position).sum::<Vec2>() / 4.0
    }
}

impl Surface for DrawList {
    fn draw_textured_polygon(&mut self, texture: TextureId, points: &[Vertex; 4], color: Color) {
        self.cmds.push(DrawCmd::TexturedPolygon {
            texture,
            points: *points,
            color,
        });
    }

    fn draw_filled_rect(&mut self, min: Vec2, max: Vec2, color: Color) {
        self.cmds.push(DrawCmd::FilledRect { min, max, color });
    }

    fn text_size(&self, text: &str) -> Vec2 {
        Vec2::new(self.glyph.x * text.chars().count() as f32, self.glyph.y)
    }

    fn draw_text(&mut self, pos: Vec2, text: &str, color: Color) {
        self.cmds.push(DrawCmd::Text {
            pos,
            text: text.to_string(),
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_list_records_in_order() {
        let mut list = DrawList::new();
        list.draw_filled_rect(Vec2::ZERO, Vec2::new(4.0, 4.0), Color::RED);
        list.draw_text(Vec2::ONE, "hi", Color::WHITE);
        assert_eq!(list.len(), 2);
        assert!(matches!(list.commands()[0], DrawCmd::FilledRect { .. }));
        assert!(matches!(list.commands()[1], DrawCmd::Text { .. }));
    }

    #[test]
    fn text_size_scales_with_length() {
        let list = DrawList::new();
        let short = list.text_size("ab");
        let long = list.text_size("abcd");
        assert!(long.x > short.x);
        assert_eq!(short.y, long.y);
    }
}

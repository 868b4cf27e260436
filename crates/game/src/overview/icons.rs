//! Drawing one map icon: quad placement, offscreen redirection, health
//! bar, and shadowed name text.

use engine_core::{yaw_rotate, Vec2, Vec3};
use renderer::{Color, Surface, TextureId, Vertex};

use super::clamp::{clamp_to_panel, redirect_yaw, AngleBasis};
use super::projection::MapProjection;

/// Everything needed to draw one icon.
#[derive(Debug, Clone, Copy)]
pub struct IconParams<'a> {
    pub texture: Option<TextureId>,
    /// Variant drawn at the border when the true position is off-panel.
    /// `None` means the icon is suppressed entirely when off-panel.
    pub offscreen_texture: Option<TextureId>,
    pub world_pos: Vec3,
    /// Half-extent of the quad in world units.
    pub scale: f32,
    pub yaw: f32,
    /// 0-255. Non-positive suppresses the draw.
    pub alpha: f32,
    /// Some icons keep their orientation even when redirected.
    pub allow_rotation: bool,
    pub name: Option<&'a str>,
    pub name_color: Color,
    /// Normalized status ratio for the bar under the icon; outside 0-1
    /// draws no bar.
    pub status: Option<f32>,
    pub status_color: Color,
}

impl<'a> IconParams<'a> {
    /// Bare icon with no text or status bar.
    pub fn plain(
        texture: Option<TextureId>,
        offscreen_texture: Option<TextureId>,
        world_pos: Vec3,
        scale: f32,
        yaw: f32,
        alpha: f32,
    ) -> Self {
        Self {
            texture,
            offscreen_texture,
            world_pos,
            scale,
            yaw,
            alpha,
            allow_rotation: true,
            name: None,
            name_color: Color::WHITE,
            status: None,
            status_color: Color::GREEN,
        }
    }
}

/// Per-frame icon drawing context.
pub struct IconRenderer<'a> {
    pub projection: &'a MapProjection,
    /// Content inset for offscreen clamping, mode dependent.
    pub inset: f32,
    /// How redirect angles lift back into world yaw.
    pub angle_basis: AngleBasis,
}

impl<'a> IconRenderer<'a> {
    /// Draw one icon. Returns whether anything was drawn, so dependent
    /// follow-ups (a facing pip atop a dot) can short-circuit.
    pub fn draw_icon(&self, surface: &mut dyn Surface, params: &IconParams) -> bool {
        if params.alpha <= 0.0 {
            return false;
        }
        let Some(mut texture) = params.texture else {
            return false; // asset failed to resolve; degrade to nothing
        };

        let panel_size = self.projection.panel_size();
        let true_pos = self.projection.world_to_panel(params.world_pos);

        let mut yaw = params.yaw;
        let mut name = params.name;
        let mut adjustment = Vec2::ZERO;

        let clamp = clamp_to_panel(true_pos, panel_size, self.inset);
        let mut anchor = clamp.point;
        if clamp.clamped {
            let Some(offscreen) = params.offscreen_texture else {
                return false; // this icon does not draw out of bounds
            };
            texture = offscreen;
            adjustment = clamp.point - true_pos;
            if params.allow_rotation {
                yaw = redirect_yaw(adjustment, self.angle_basis);
            }
            // Names bunch up illegibly at the border.
            name = None;
        }

        // Quad corners: rotate the four world-space half-extent offsets,
        // project each, then shift by the clamp adjustment.
        let corners = [
            Vec2::new(-params.scale, params.scale),
            Vec2::new(params.scale, params.scale),
            Vec2::new(params.scale, -params.scale),
            Vec2::new(-params.scale, -params.scale),
        ];
        let tex_coords = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let mut points = [Vertex::new(Vec2::ZERO, Vec2::ZERO); 4];
        for (i, corner) in corners.iter().enumerate() {
            let offset = yaw_rotate(*corner, yaw);
            let world = params.world_pos + Vec3::new(offset.x, offset.y, 0.0);
            points[i] = Vertex::new(self.projection.world_to_panel(world) + adjustment, tex_coords[i]);
        }

        let alpha = params.alpha.clamp(0.0, 255.0) as u8;
        surface.draw_textured_polygon(texture, &points, Color::WHITE.with_alpha(alpha));

        let d = self.projection.pixel_offset(params.scale);
        anchor.y += d + 4.0;

        if let Some(status) = params.status {
            if (0.0..=1.0).contains(&status) {
                // Status bar: black underlay, colored fill growing rightward.
                surface.draw_filled_rect(
                    Vec2::new(anchor.x - d, anchor.y - 1.0),
                    Vec2::new(anchor.x + d, anchor.y + 1.0),
                    Color::BLACK,
                );
                let length = d * 2.0 * status;
                surface.draw_filled_rect(
                    Vec2::new(anchor.x - d, anchor.y - 1.0),
                    Vec2::new(anchor.x - d + length, anchor.y + 1.0),
                    params.status_color,
                );
                anchor.y += 3.0;
            }
        }

        if let Some(text) = name {
            let size = surface.text_size(text);
            let top_left = Vec2::new(anchor.x - size.x * 0.5, anchor.y);
            // Shadow first, then the colored pass.
            surface.draw_text(top_left + Vec2::new(1.0, 0.0), text, Color::BLACK);
            surface.draw_text(top_left, text, params.name_color);
        }

        true
    }
}

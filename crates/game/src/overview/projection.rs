//! World / map / panel coordinate transforms for the overview.
//!
//! Three spaces: world (game units, +Y north), map (texels of the
//! overview image, +Y south, so the Y axis flips here), and panel (pixels
//! inside the overview panel, origin top-left). `panel_to_map` is the
//! exact inverse of `map_to_panel`; the background painter relies on the
//! round trip to pick the visible texture region.

use engine_core::{yaw_rotate, Vec2, Vec3};

/// Native edge length of an overview image, in texels.
pub const OVERVIEW_MAP_SIZE: f32 = 1024.0;

/// Smallest zoom the projection will accept. Degenerate zoom is prevented
/// here, at assignment, so the transform math never divides by zero.
const MIN_ZOOM: f32 = 0.01;

/// Current view transform between world, map, and panel space.
#[derive(Debug, Clone)]
pub struct MapProjection {
    /// World position of the map image's top-left texel.
    map_origin: Vec2,
    /// World units per map texel.
    map_scale: f32,
    /// Map-space point drawn at the panel center.
    map_center: Vec2,
    /// View rotation in degrees.
    view_angle: f32,
    /// User zoom factor.
    zoom: f32,
    /// Zoom at which the whole map exactly fits the panel.
    full_zoom: f32,
    /// Panel size in pixels.
    panel_size: Vec2,
}

impl MapProjection {
    /// Create a projection for a map image anchored at `map_origin` with
    /// `map_scale` world units per texel. Scale is clamped positive.
    pub fn new(map_origin: Vec2, map_scale: f32) -> Self {
        Self {
            map_origin,
            map_scale: map_scale.max(f32::MIN_POSITIVE),
            map_center: Vec2::splat(OVERVIEW_MAP_SIZE * 0.5),
            view_angle: 90.0,
            zoom: 1.0,
            full_zoom: 1.0,
            panel_size: Vec2::splat(256.0),
        }
    }

    pub fn map_scale(&self) -> f32 {
        self.map_scale
    }

    pub fn view_angle(&self) -> f32 {
        self.view_angle
    }

    pub fn set_view_angle(&mut self, degrees: f32) {
        self.view_angle = degrees;
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.max(MIN_ZOOM);
    }

    pub fn full_zoom(&self) -> f32 {
        self.full_zoom
    }

    pub fn panel_size(&self) -> Vec2 {
        self.panel_size
    }

    /// Panel dimensions are clamped to at least one pixel.
    pub fn set_panel_size(&mut self, size: Vec2) {
        self.panel_size = size.max(Vec2::ONE);
    }

    pub fn map_center(&self) -> Vec2 {
        self.map_center
    }

    /// Center the view on a world position.
    pub fn follow_world_position(&mut self, world: Vec3) {
        self.map_center = self.world_to_map(world);
    }

    /// Combined map-texel to panel-fraction scale factor.
    fn panel_scale(&self) -> f32 {
        (self.zoom * self.full_zoom) / OVERVIEW_MAP_SIZE
    }

    /// Orthographic projection of a world position onto the map image.
    /// World +Y runs north; map +Y runs south, so Y flips.
    pub fn world_to_map(&self, world: Vec3) -> Vec2 {
        Vec2::new(
            (world.x - self.map_origin.x) / self.map_scale,
            (self.map_origin.y - world.y) / self.map_scale,
        )
    }

    /// Map position to panel pixels under the current pan/zoom/rotation.
    pub fn map_to_panel(&self, map: Vec2) -> Vec2 {
        let offset = yaw_rotate(map - self.map_center, self.view_angle) * self.panel_scale();
        Vec2::new(
            offset.x * self.panel_size.y + self.panel_size.x * 0.5,
            offset.y * self.panel_size.y + self.panel_size.y * 0.5,
        )
    }

    /// Exact inverse of [`map_to_panel`](Self::map_to_panel): undo the
    /// panel-center offset, the zoom/scale, then rotate by the negative
    /// view angle.
    pub fn panel_to_map(&self, panel: Vec2) -> Vec2 {
        let offset = Vec2::new(
            (panel.x - self.panel_size.x * 0.5) / self.panel_size.y,
            (panel.y - self.panel_size.y * 0.5) / self.panel_size.y,
        ) / self.panel_scale();
        yaw_rotate(offset, -self.view_angle) + self.map_center
    }

    /// Convenience: full world-to-panel projection.
    pub fn world_to_panel(&self, world: Vec3) -> Vec2 {
        self.map_to_panel(self.world_to_map(world))
    }

    /// Panel pixel distance covered by `world_units` at the current zoom.
    pub fn pixel_offset(&self, world_units: f32) -> f32 {
        (world_units / self.map_scale) * self.panel_scale() * self.panel_size.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projection() -> MapProjection {
        let mut proj = MapProjection::new(Vec2::new(-2048.0, 2048.0), 4.0);
        proj.set_panel_size(Vec2::new(320.0, 240.0));
        proj.set_zoom(2.0);
        proj
    }

    #[test]
    fn world_to_map_flips_y() {
        let proj = projection();
        // The map origin itself lands on texel (0, 0).
        let at_origin = proj.world_to_map(Vec3::new(-2048.0, 2048.0, 0.0));
        assert!(at_origin.length() < 1e-4);
        // Moving south in the world moves down the map.
        let south = proj.world_to_map(Vec3::new(-2048.0, 2044.0, 0.0));
        assert!((south.y - 1.0).abs() < 1e-4);
        assert!(south.x.abs() < 1e-4);
    }

    #[test]
    fn map_center_projects_to_panel_center() {
        let proj = projection();
        let center = proj.map_to_panel(proj.map_center());
        assert!((center.x - 160.0).abs() < 1e-3);
        assert!((center.y - 120.0).abs() < 1e-3);
    }

    #[test]
    fn panel_round_trip_for_all_view_angles() {
        let mut proj = projection();
        let p = Vec2::new(57.0, 193.0);
        let mut angle = 0.0;
        while angle < 360.0 {
            proj.set_view_angle(angle);
            let back = proj.map_to_panel(proj.panel_to_map(p));
            assert!(
                (back - p).length() < 1e-2,
                "round trip failed at view angle {angle}: {back:?}"
            );
            angle += 15.0;
        }
    }

    #[test]
    fn zoom_clamps_positive() {
        let mut proj = projection();
        proj.set_zoom(0.0);
        assert!(proj.zoom() > 0.0);
        proj.set_zoom(-3.0);
        assert!(proj.zoom() > 0.0);
    }

    #[test]
    fn panel_size_clamps_to_one_pixel() {
        let mut proj = projection();
        proj.set_panel_size(Vec2::ZERO);
        assert_eq!(proj.panel_size(), Vec2::ONE);
    }

    #[test]
    fn pixel_offset_scales_with_zoom() {
        let mut proj = projection();
        let base = proj.pixel_offset(32.0);
        proj.set_zoom(4.0);
        assert!((proj.pixel_offset(32.0) - base * 2.0).abs() < 1e-3);
    }
}

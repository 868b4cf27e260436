//! Display-mode state machine: panel geometry, zoom transitions, borders,
//! and the master alpha for each mode.

use engine_core::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::Prefs;

use super::projection::OVERVIEW_MAP_SIZE;

/// Map pixels the radar zoom tries to keep visible across the panel.
pub const DESIRED_RADAR_RESOLUTION: f32 = 450.0;

/// Seconds a zoom transition takes when entering inset or full mode.
const ZOOM_TRANSITION_TIME: f32 = 0.2;

/// How the overview is presented on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Not drawn at all.
    Off,
    /// Small corner panel following the local player, forced while alive.
    Radar,
    /// Quarter-width inset, freely pannable.
    Inset,
    /// Whole screen.
    Full,
}

/// Background treatment behind the map texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundStyle {
    Square,
    RoundedCorners,
}

/// On-screen placement of the overview panel, with glide targets.
#[derive(Debug, Clone, Copy)]
pub struct PanelGeometry {
    pub pos: Vec2,
    pub size: Vec2,
    target_pos: Vec2,
    target_size: Vec2,
    /// Pixels per second toward the target; non-positive snaps.
    change_speed: f32,
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            size: Vec2::new(256.0, 256.0),
            target_pos: Vec2::ZERO,
            target_size: Vec2::new(256.0, 256.0),
            change_speed: 0.0,
        }
    }
}

impl PanelGeometry {
    fn set_target(&mut self, pos: Vec2, size: Vec2) {
        self.target_pos = pos;
        self.target_size = size;
    }

    fn step(&mut self, dt: f32) {
        let amount = self.change_speed * dt;
        if amount <= 0.0 {
            self.pos = self.target_pos;
            self.size = self.target_size;
            return;
        }
        self.pos.x = approach(self.pos.x, self.target_pos.x, amount);
        self.pos.y = approach(self.pos.y, self.target_pos.y, amount);
        self.size.x = approach(self.size.x, self.target_size.x, amount);
        self.size.y = approach(self.size.y, self.target_size.y, amount);
    }
}

/// Step `current` toward `target` by at most `amount` without overshoot.
fn approach(current: f32, target: f32, amount: f32) -> f32 {
    if current < target {
        (current + amount).min(target)
    } else if current > target {
        (current - amount).max(target)
    } else {
        current
    }
}

/// External placement of the HUD radar element the radar mode docks into.
#[derive(Debug, Clone, Copy)]
pub struct RadarPanel {
    pub pos: Vec2,
    pub size: Vec2,
    pub visible: bool,
}

impl Default for RadarPanel {
    fn default() -> Self {
        Self {
            pos: Vec2::new(16.0, 16.0),
            size: Vec2::new(160.0, 160.0),
            visible: true,
        }
    }
}

/// Owns the current display mode and animates geometry and zoom between
/// mode targets.
#[derive(Debug)]
pub struct LayoutController {
    mode: DisplayMode,
    geometry: PanelGeometry,
    background: BackgroundStyle,
    zoom: f32,
    zoom_target: f32,
    /// Zoom units per second; zero means the zoom is settled.
    zoom_rate: f32,
}

impl Default for LayoutController {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Off,
            geometry: PanelGeometry::default(),
            background: BackgroundStyle::Square,
            zoom: 1.0,
            zoom_target: 1.0,
            zoom_rate: 0.0,
        }
    }
}

impl LayoutController {
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn panel_pos(&self) -> Vec2 {
        self.geometry.pos
    }

    pub fn panel_size(&self) -> Vec2 {
        self.geometry.size
    }

    pub fn background(&self) -> BackgroundStyle {
        self.background
    }

    /// Switch modes, applying each mode's entry actions. `map_scale` and
    /// `full_zoom` translate screen-pixel goals into zoom factors.
    pub fn set_mode(&mut self, mode: DisplayMode, prefs: &Prefs, map_scale: f32, full_zoom: f32) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        match mode {
            DisplayMode::Off => {}
            DisplayMode::Radar => {
                // The radar pops into its dock rather than gliding there,
                // and its zoom is pinned, not animated.
                self.geometry.change_speed = 0.0;
                self.zoom = radar_zoom(map_scale, full_zoom);
                self.zoom_target = self.zoom;
                self.zoom_rate = 0.0;
                self.background = BackgroundStyle::RoundedCorners;
            }
            DisplayMode::Inset => {
                self.geometry.change_speed = 1000.0;
                let target =
                    prefs.preferred_view_size * map_scale / (OVERVIEW_MAP_SIZE * full_zoom);
                self.start_zoom_transition(target);
                self.background = BackgroundStyle::RoundedCorners;
            }
            DisplayMode::Full => {
                self.geometry.change_speed = 1000.0;
                self.start_zoom_transition(1.0);
                self.background = BackgroundStyle::Square;
            }
        }
    }

    fn start_zoom_transition(&mut self, target: f32) {
        self.zoom_target = target;
        self.zoom_rate = (target - self.zoom) / ZOOM_TRANSITION_TIME;
    }

    /// Per-frame geometry and zoom update.
    pub fn update(&mut self, dt: f32, screen: Vec2, radar: &RadarPanel) {
        match self.mode {
            DisplayMode::Off => {}
            DisplayMode::Radar => {
                // Dock into the HUD radar element, forced square.
                self.geometry
                    .set_target(radar.pos, Vec2::new(radar.size.x, radar.size.x));
            }
            DisplayMode::Inset => {
                let w = screen.x / 4.0;
                self.geometry
                    .set_target(Vec2::new(16.0, 16.0), Vec2::new(w, w / 1.333));
            }
            DisplayMode::Full => {
                self.geometry.set_target(Vec2::ZERO, screen);
            }
        }
        self.geometry.step(dt);

        if self.zoom_rate != 0.0 {
            self.zoom = approach(self.zoom, self.zoom_target, self.zoom_rate.abs() * dt);
            if self.zoom == self.zoom_target {
                self.zoom_rate = 0.0;
            }
        }
    }

    /// Border drawn around the panel content in each mode.
    pub fn border_size(&self) -> f32 {
        match self.mode {
            DisplayMode::Full | DisplayMode::Off => 0.0,
            DisplayMode::Radar | DisplayMode::Inset => 4.0,
        }
    }

    /// Master alpha 0-255 for the current mode. Zero suppresses all drawing.
    pub fn master_alpha(&self, prefs: &Prefs) -> f32 {
        match self.mode {
            DisplayMode::Off => 0.0,
            DisplayMode::Radar => prefs.radar_alpha as f32,
            DisplayMode::Inset | DisplayMode::Full => prefs.overview_alpha * 255.0,
        }
    }
}

/// Zoom that keeps [`DESIRED_RADAR_RESOLUTION`] map pixels across the radar.
fn radar_zoom(map_scale: f32, full_zoom: f32) -> f32 {
    DESIRED_RADAR_RESOLUTION * map_scale / (OVERVIEW_MAP_SIZE * full_zoom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radar_entry_is_instant() {
        let mut layout = LayoutController::default();
        let prefs = Prefs::default();
        layout.set_mode(DisplayMode::Radar, &prefs, 2.0, 1.0);
        assert_eq!(layout.zoom(), radar_zoom(2.0, 1.0));
        assert_eq!(layout.background(), BackgroundStyle::RoundedCorners);

        let radar = RadarPanel {
            pos: Vec2::new(20.0, 30.0),
            size: Vec2::new(128.0, 96.0),
            visible: true,
        };
        layout.update(0.001, Vec2::new(1280.0, 720.0), &radar);
        // Snapped straight to the dock, square off the radar width.
        assert_eq!(layout.panel_pos(), Vec2::new(20.0, 30.0));
        assert_eq!(layout.panel_size(), Vec2::new(128.0, 128.0));
    }

    #[test]
    fn full_zoom_transition_is_linear_and_settles() {
        let mut layout = LayoutController::default();
        let prefs = Prefs::default();
        layout.set_mode(DisplayMode::Radar, &prefs, 4.0, 1.0);
        let start = layout.zoom();
        layout.set_mode(DisplayMode::Full, &prefs, 4.0, 1.0);

        let radar = RadarPanel::default();
        let screen = Vec2::new(1280.0, 720.0);
        layout.update(0.1, screen, &radar);
        let halfway = start + (1.0 - start) * 0.5;
        assert!((layout.zoom() - halfway).abs() < 1e-4);

        layout.update(0.1, screen, &radar);
        assert!((layout.zoom() - 1.0).abs() < 1e-3);
        layout.update(0.1, screen, &radar);
        assert_eq!(layout.zoom(), 1.0);
    }

    #[test]
    fn inset_geometry_targets_quarter_width() {
        let mut layout = LayoutController::default();
        let prefs = Prefs::default();
        layout.set_mode(DisplayMode::Inset, &prefs, 1.0, 1.0);
        let screen = Vec2::new(1280.0, 720.0);
        let radar = RadarPanel::default();
        // Long step so the glide reaches its target.
        layout.update(10.0, screen, &radar);
        assert_eq!(layout.panel_pos(), Vec2::new(16.0, 16.0));
        assert_eq!(layout.panel_size().x, 320.0);
        assert!((layout.panel_size().y - 320.0 / 1.333).abs() < 1e-3);
    }

    #[test]
    fn borders_per_mode() {
        let mut layout = LayoutController::default();
        let prefs = Prefs::default();
        assert_eq!(layout.border_size(), 0.0);
        layout.set_mode(DisplayMode::Radar, &prefs, 1.0, 1.0);
        assert_eq!(layout.border_size(), 4.0);
        layout.set_mode(DisplayMode::Full, &prefs, 1.0, 1.0);
        assert_eq!(layout.border_size(), 0.0);
    }

    #[test]
    fn master_alpha_sources_per_mode() {
        let mut layout = LayoutController::default();
        let mut prefs = Prefs::default();
        prefs.radar_alpha = 120;
        prefs.overview_alpha = 0.5;
        assert_eq!(layout.master_alpha(&prefs), 0.0);
        layout.set_mode(DisplayMode::Radar, &prefs, 1.0, 1.0);
        assert_eq!(layout.master_alpha(&prefs), 120.0);
        layout.set_mode(DisplayMode::Inset, &prefs, 1.0, 1.0);
        assert_eq!(layout.master_alpha(&prefs), 127.5);
    }
}

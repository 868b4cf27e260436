//! Overview preferences (names, health, alpha, preferred mode). Loaded from config.ron at startup.

use serde::{Deserialize, Serialize};

use crate::overview::DisplayMode;

/// Persistent overview settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prefs {
    /// Draw player names next to icons.
    #[serde(default = "default_true")]
    pub show_names: bool,
    /// Draw health bars under icons.
    #[serde(default = "default_true")]
    pub show_health: bool,
    /// Draw recent-position trails for teammates.
    #[serde(default)]
    pub show_trails: bool,
    /// Overview mode to restore when not forced into radar.
    #[serde(default = "default_preferred_mode")]
    pub preferred_mode: DisplayMode,
    /// Desired on-screen view size for inset mode, in map pixels.
    #[serde(default = "default_view_size")]
    pub preferred_view_size: f32,
    /// Master alpha for inset/full overview (0.0 - 1.0).
    #[serde(default = "default_overview_alpha")]
    pub overview_alpha: f32,
    /// Master alpha for the radar (0 - 255).
    #[serde(default = "default_radar_alpha")]
    pub radar_alpha: u8,
    /// Lock the radar north-up instead of rotating with the view.
    #[serde(default)]
    pub radar_locked: bool,
}

fn default_true() -> bool {
    true
}
fn default_preferred_mode() -> DisplayMode {
    DisplayMode::Inset
}
fn default_view_size() -> f32 {
    600.0
}
fn default_overview_alpha() -> f32 {
    1.0
}
fn default_radar_alpha() -> u8 {
    200
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            show_names: true,
            show_health: true,
            show_trails: false,
            preferred_mode: default_preferred_mode(),
            preferred_view_size: default_view_size(),
            overview_alpha: default_overview_alpha(),
            radar_alpha: default_radar_alpha(),
            radar_locked: false,
        }
    }
}

impl Prefs {
    /// Load prefs from `config.ron`. If the file is missing or invalid, returns defaults.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match ron::from_str::<Prefs>(&data) {
                Ok(p) => return p.sanitized(),
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// Save current prefs to `config.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(&path, s) {
                log::warn!("Could not write config to {:?}: {}", path, e);
            }
        }
    }

    /// Radar is never a *preferred* mode (the game forces it while alive),
    /// and degenerate view sizes break zoom math.
    fn sanitized(mut self) -> Self {
        if self.preferred_mode == DisplayMode::Radar {
            self.preferred_mode = DisplayMode::Off;
        }
        self.preferred_view_size = self.preferred_view_size.max(1.0);
        self.overview_alpha = self.overview_alpha.clamp(0.0, 1.0);
        self
    }

    /// Record an explicit mode request so it survives the radar forcing it off.
    pub fn set_preferred_mode(&mut self, mode: DisplayMode) {
        if mode != DisplayMode::Radar {
            self.preferred_mode = mode;
        }
    }
}

fn config_path() -> std::path::PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| std::path::PathBuf::from("."))
        .join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let p: Prefs = ron::from_str("(show_names: false)").unwrap();
        assert!(!p.show_names);
        assert!(p.show_health);
        assert_eq!(p.radar_alpha, 200);
    }

    #[test]
    fn radar_is_never_preferred() {
        let p: Prefs = ron::from_str("(preferred_mode: Radar)").unwrap();
        assert_eq!(p.sanitized().preferred_mode, DisplayMode::Off);
    }
}

//! Per-map metadata: overview image, world-to-map placement, goal spots.

use serde::Deserialize;
use thiserror::Error;

/// Errors from parsing a map info file.
#[derive(Debug, Error)]
pub enum MapInfoError {
    #[error("invalid map info: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("map scale must be positive, got {0}")]
    BadScale(f32),
}

/// A static per-map marker (objective, extraction point, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct GoalSpot {
    /// Sprite name for this marker.
    pub icon: String,
    /// World position.
    pub position: [f32; 3],
}

/// Everything the overview needs to know about one map.
#[derive(Debug, Clone, Deserialize)]
pub struct MapInfo {
    pub name: String,
    /// Sprite name of the overview image. The radar prefers a pre-tinted
    /// variant named `<texture>_radar` when the installation provides one.
    pub texture: String,
    /// World coordinates of the map image's top-left corner.
    pub origin: [f32; 2],
    /// World units per map texel.
    pub scale: f32,
    #[serde(default)]
    pub goals: Vec<GoalSpot>,
}

impl MapInfo {
    /// Parse a RON map info string.
    pub fn from_ron(source: &str) -> Result<Self, MapInfoError> {
        let info: MapInfo = ron::from_str(source)?;
        if info.scale <= 0.0 {
            return Err(MapInfoError::BadScale(info.scale));
        }
        Ok(info)
    }

    /// Name of the pre-tinted radar variant of the overview image.
    pub fn radar_texture_name(&self) -> String {
        format!("{}_radar", self.texture)
    }
}

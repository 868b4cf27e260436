//! Transform component and yaw math helpers.
//!
//! Actors in this game only ever rotate around the vertical axis, so the
//! transform carries a yaw in degrees rather than a full quaternion.

use glam::{Vec2, Vec3};

/// Position plus facing for an actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Facing angle in degrees, counter-clockwise, 0 = +X.
    pub yaw: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
        }
    }
}

impl Transform {
    /// Create a transform at the given position, facing +X.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and yaw.
    pub fn from_position_yaw(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }

    /// Horizontal forward direction for the current yaw.
    pub fn forward(&self) -> Vec3 {
        let (sin, cos) = self.yaw.to_radians().sin_cos();
        Vec3::new(cos, sin, 0.0)
    }
}

/// Rotate a 2D vector by `degrees` counter-clockwise.
pub fn yaw_rotate(v: Vec2, degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Yaw in degrees for a 2D direction, in [0, 360).
pub fn vec_to_yaw(v: Vec2) -> f32 {
    if v.x == 0.0 && v.y == 0.0 {
        return 0.0;
    }
    let deg = v.y.atan2(v.x).to_degrees();
    if deg < 0.0 {
        deg + 360.0
    } else {
        deg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaw_rotate_quarter_turn() {
        let v = yaw_rotate(Vec2::new(1.0, 0.0), 90.0);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn vec_to_yaw_quadrants() {
        assert!((vec_to_yaw(Vec2::new(1.0, 0.0)) - 0.0).abs() < 1e-4);
        assert!((vec_to_yaw(Vec2::new(0.0, 1.0)) - 90.0).abs() < 1e-4);
        assert!((vec_to_yaw(Vec2::new(-1.0, 0.0)) - 180.0).abs() < 1e-4);
        assert!((vec_to_yaw(Vec2::new(0.0, -1.0)) - 270.0).abs() < 1e-4);
    }

    #[test]
    fn rotate_then_unrotate_is_identity() {
        let v = Vec2::new(3.5, -2.25);
        let back = yaw_rotate(yaw_rotate(v, 37.0), -37.0);
        assert!((back - v).length() < 1e-4);
    }
}

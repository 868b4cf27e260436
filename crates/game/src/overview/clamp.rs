//! Keeping icons inside the panel border.
//!
//! Points that project outside the visible panel are pulled back to the
//! border, and the icon renderer swaps in an "offscreen" arrow variant
//! pointed back at the true position.

use engine_core::{vec_to_yaw, Vec2};

/// Extra room inside the map edge so offscreen icons have space to live.
const BORDER_WIDTH: f32 = 4.0;

/// Content inset for a panel with the given background border. Full-screen
/// mode has no border and therefore no inset.
pub fn panel_inset(border_size: f32) -> f32 {
    if border_size != 0.0 {
        border_size + BORDER_WIDTH
    } else {
        0.0
    }
}

/// A panel point after clamping, with whether any axis moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampResult {
    pub point: Vec2,
    pub clamped: bool,
}

/// Clamp a panel-space point into `[inset, dimension - inset]` on each
/// axis. Idempotent: clamping an already-clamped point is a no-op.
pub fn clamp_to_panel(point: Vec2, panel_size: Vec2, inset: f32) -> ClampResult {
    let mut p = point;
    let mut clamped = false;

    if p.x < inset {
        p.x = inset;
        clamped = true;
    }
    if p.x > panel_size.x - inset {
        p.x = panel_size.x - inset;
        clamped = true;
    }
    if p.y < inset {
        p.y = inset;
        clamped = true;
    }
    if p.y > panel_size.y - inset {
        p.y = panel_size.y - inset;
        clamped = true;
    }

    ClampResult { point: p, clamped }
}

/// How panel-space redirect angles convert back to world yaw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AngleBasis {
    /// Map rotates with the view; add the current view angle.
    FollowView(f32),
    /// Fixed map rotated 180 degrees.
    Rotated,
    /// Fixed north-up map.
    NorthUp,
}

/// World yaw for an offscreen icon's redirect arrow.
///
/// `displacement` is clamped-minus-true in panel space. Panel Y grows
/// downward while map Y flipped during projection, so Y negates before
/// the angle is taken; the basis then lifts the panel angle into world
/// space.
pub fn redirect_yaw(displacement: Vec2, basis: AngleBasis) -> f32 {
    let panel_yaw = vec_to_yaw(Vec2::new(displacement.x, -displacement.y));
    match basis {
        AngleBasis::FollowView(view_angle) => panel_yaw + view_angle,
        AngleBasis::Rotated => panel_yaw + 180.0,
        AngleBasis::NorthUp => panel_yaw + 90.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: Vec2 = Vec2::new(200.0, 200.0);

    #[test]
    fn in_bounds_point_is_untouched() {
        let r = clamp_to_panel(Vec2::new(100.0, 50.0), SIZE, 8.0);
        assert!(!r.clamped);
        assert_eq!(r.point, Vec2::new(100.0, 50.0));
    }

    #[test]
    fn out_of_bounds_point_lands_on_border() {
        let r = clamp_to_panel(Vec2::new(-30.0, 260.0), SIZE, 8.0);
        assert!(r.clamped);
        assert_eq!(r.point, Vec2::new(8.0, 192.0));
    }

    #[test]
    fn clamp_is_idempotent() {
        let first = clamp_to_panel(Vec2::new(500.0, -500.0), SIZE, 8.0);
        let second = clamp_to_panel(first.point, SIZE, 8.0);
        assert!(!second.clamped);
        assert_eq!(second.point, first.point);
    }

    #[test]
    fn full_mode_has_no_inset() {
        assert_eq!(panel_inset(0.0), 0.0);
        assert_eq!(panel_inset(4.0), 8.0);
    }

    #[test]
    fn redirect_flips_panel_y() {
        // A downward panel displacement negates to 270 panel degrees;
        // the north-up basis adds 90, wrapping to a full turn.
        let yaw = redirect_yaw(Vec2::new(0.0, 10.0), AngleBasis::NorthUp);
        assert!((yaw - 360.0).abs() < 1e-3 || yaw.abs() < 1e-3);
    }

    #[test]
    fn redirect_follows_view_angle() {
        let fixed = redirect_yaw(Vec2::new(5.0, 0.0), AngleBasis::NorthUp);
        let following = redirect_yaw(Vec2::new(5.0, 0.0), AngleBasis::FollowView(135.0));
        assert!((following - fixed - 45.0).abs() < 1e-3);
    }
}

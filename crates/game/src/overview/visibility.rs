//! Per-entity visibility rules for the overview.
//!
//! Radar mode runs the strict seen-recently/dwell rules; the other modes
//! use the simpler alive-or-overridden baseline. Both sit behind the
//! [`OverviewPolicy`] trait so the caller just picks one per mode.

use engine_core::{Team, Vec3};

use super::overlay::{OverlaySlot, TIME_SPOTS_STAY_SEEN, TIME_UNTIL_ENEMY_SEEN};
use super::TrackedEntity;

/// Frame context the policies evaluate against.
#[derive(Debug, Clone, Copy)]
pub struct PolicyCtx {
    pub now: f32,
    pub viewer_team: Team,
}

/// Decides, per entity per frame, whether an icon may be drawn at all.
pub trait OverviewPolicy {
    fn can_be_seen(&self, ctx: &PolicyCtx, entity: &TrackedEntity, overlay: &OverlaySlot) -> bool;
}

/// Radar rules, evaluated in order:
/// 1. sentinel position is never visible;
/// 2. an active override marker always is (it outranks life state);
/// 3. the dead without a marker are not;
/// 4. teammates always are;
/// 5. enemies only when seen within the last half second *and* tracked
///    long enough before that (the dwell requirement kills spot flicker).
#[derive(Debug, Clone, Copy, Default)]
pub struct RadarPolicy;

impl OverviewPolicy for RadarPolicy {
    fn can_be_seen(&self, ctx: &PolicyCtx, entity: &TrackedEntity, overlay: &OverlaySlot) -> bool {
        if entity.position == Vec3::ZERO {
            return false; // never placed in the world
        }

        if overlay.override_active(ctx.now) {
            return true;
        }

        if entity.health <= 0 {
            return false;
        }

        if ctx.viewer_team.is_ally(entity.team) {
            return true;
        }

        match (overlay.last_seen_at, overlay.first_seen_at) {
            (Some(last), Some(first)) => {
                ctx.now - last < TIME_SPOTS_STAY_SEEN && ctx.now - first > TIME_UNTIL_ENEMY_SEEN
            }
            _ => false,
        }
    }
}

/// Baseline rules for inset/full modes: anything placed and either alive
/// or carrying an unexpired override marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselinePolicy;

impl OverviewPolicy for BaselinePolicy {
    fn can_be_seen(&self, ctx: &PolicyCtx, entity: &TrackedEntity, overlay: &OverlaySlot) -> bool {
        if entity.position == Vec3::ZERO {
            return false;
        }

        if entity.health <= 0 {
            return overlay.override_active(ctx.now);
        }

        true
    }
}

/// Whether the entity's name may accompany its icon. Names are personal
/// information for the viewer's own side (spectators see everyone).
pub fn can_name_be_seen(ctx: &PolicyCtx, entity: &TrackedEntity) -> bool {
    ctx.viewer_team == Team::Spectator || ctx.viewer_team.is_ally(entity.team)
}

/// Whether the entity's health bar may accompany its icon. Same gating as
/// names; there is no health intel on enemies.
pub fn can_health_be_seen(ctx: &PolicyCtx, entity: &TrackedEntity) -> bool {
    (ctx.viewer_team == Team::Spectator || ctx.viewer_team.is_ally(entity.team))
        && entity.health > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::Color;

    fn enemy_at(pos: Vec3) -> TrackedEntity {
        let mut e = TrackedEntity::empty();
        e.position = pos;
        e.health = 100;
        e.team = Team::Cobalt;
        e.color = Color::BLUE;
        e
    }

    fn ctx(now: f32) -> PolicyCtx {
        PolicyCtx {
            now,
            viewer_team: Team::Crimson,
        }
    }

    #[test]
    fn sentinel_position_is_never_visible() {
        let mut entity = enemy_at(Vec3::ZERO);
        let mut overlay = OverlaySlot::default();
        // Even with every other signal screaming "visible".
        entity.health = 100;
        overlay.mark_seen(0.0);
        overlay.set_death_marker(0.0, None, Vec3::ZERO, 0.0);
        overlay.is_dead = false;

        assert!(!RadarPolicy.can_be_seen(&ctx(0.1), &entity, &overlay));
        assert!(!BaselinePolicy.can_be_seen(&ctx(0.1), &entity, &overlay));
    }

    #[test]
    fn teammate_is_always_visible_while_alive() {
        let mut entity = enemy_at(Vec3::X);
        entity.team = Team::Crimson;
        let overlay = OverlaySlot::default();
        assert!(RadarPolicy.can_be_seen(&ctx(5.0), &entity, &overlay));
    }

    #[test]
    fn dead_without_marker_is_invisible() {
        let mut entity = enemy_at(Vec3::X);
        entity.health = 0;
        entity.team = Team::Crimson;
        let overlay = OverlaySlot::default();
        assert!(!RadarPolicy.can_be_seen(&ctx(5.0), &entity, &overlay));
        assert!(!BaselinePolicy.can_be_seen(&ctx(5.0), &entity, &overlay));
    }

    #[test]
    fn enemy_dwell_requirement() {
        let entity = enemy_at(Vec3::X);
        let mut overlay = OverlaySlot::default();
        // First detected at t = 0 and continuously spotted after.
        overlay.mark_seen(0.0);
        overlay.mark_seen(0.4);

        // Dwell not yet satisfied at t = 0.4.
        assert!(!RadarPolicy.can_be_seen(&ctx(0.4), &entity, &overlay));

        // At t = 0.6 the dwell has passed and the spot is still fresh.
        overlay.mark_seen(0.6);
        assert!(RadarPolicy.can_be_seen(&ctx(0.6), &entity, &overlay));
    }

    #[test]
    fn stale_spot_goes_dark() {
        let entity = enemy_at(Vec3::X);
        let mut overlay = OverlaySlot::default();
        overlay.mark_seen(0.0);
        overlay.mark_seen(1.0);
        // Fresh enough at 1.3, stale at 1.6.
        assert!(RadarPolicy.can_be_seen(&ctx(1.3), &entity, &overlay));
        assert!(!RadarPolicy.can_be_seen(&ctx(1.6), &entity, &overlay));
    }

    #[test]
    fn override_marker_outranks_death() {
        let mut entity = enemy_at(Vec3::X);
        entity.health = 0;
        let mut overlay = OverlaySlot::default();
        overlay.set_death_marker(10.0, None, Vec3::X, 0.0);

        assert!(RadarPolicy.can_be_seen(&ctx(15.0), &entity, &overlay));
        assert!(BaselinePolicy.can_be_seen(&ctx(15.0), &entity, &overlay));
        // Expired marker no longer rescues the dead.
        assert!(!RadarPolicy.can_be_seen(&ctx(20.01), &entity, &overlay));
        assert!(!BaselinePolicy.can_be_seen(&ctx(20.01), &entity, &overlay));
    }

    #[test]
    fn names_and_health_are_team_gated() {
        let entity = enemy_at(Vec3::X);
        assert!(!can_name_be_seen(&ctx(0.0), &entity));
        assert!(!can_health_be_seen(&ctx(0.0), &entity));

        let spectator = PolicyCtx {
            now: 0.0,
            viewer_team: Team::Spectator,
        };
        assert!(can_name_be_seen(&spectator, &entity));
        assert!(can_health_be_seen(&spectator, &entity));
    }
}

//! Time-stamped per-entity override state: death markers, last-known
//! ghosts, and voice-flash rings.
//!
//! One slot accompanies each tracked entity. A slot holds at most one
//! override marker at a time (last write wins) plus an independent flash
//! envelope. All timestamps compare against the frame's single game-time
//! sample.

use engine_core::Vec3;
use renderer::TextureId;

/// Seconds after death before the death marker starts fading.
pub const DEATH_ICON_FADE: f32 = 7.5;
/// Total lifetime of a death marker.
pub const DEATH_ICON_DURATION: f32 = 10.0;
/// Lifetime of a last-known-position ghost.
pub const LAST_SEEN_ICON_DURATION: f32 = 4.0;
/// How long a spot stays trusted after the enemy drops out of detection.
pub const TIME_SPOTS_STAY_SEEN: f32 = 0.5;
/// Dwell: how long an enemy must stay detected before the radar trusts it.
pub const TIME_UNTIL_ENEMY_SEEN: f32 = 0.5;
/// Grace period before an unseen enemy is considered for a ghost marker.
pub const RESPOT_GRACE: f32 = 0.25;
/// Total lifetime of a voice flash.
pub const VOICE_FLASH_DURATION: f32 = 2.0;
/// Interval between flash re-peaks.
pub const VOICE_FLASH_PEAK_INTERVAL: f32 = 0.5;

const FLASH_PEAK_ALPHA: f32 = 255.0;

/// Timed visual override state for one tracked entity.
#[derive(Debug, Clone, Default)]
pub struct OverlaySlot {
    /// Most recent moment the enemy was detected. `None` = not tracked.
    pub last_seen_at: Option<f32>,
    /// Moment the current unbroken detection streak began.
    pub first_seen_at: Option<f32>,

    /// Active override marker, if any: icon pair, frozen pose, fade window.
    pub override_icon: Option<TextureId>,
    pub override_icon_offscreen: Option<TextureId>,
    pub override_position: Vec3,
    pub override_yaw: f32,
    /// When the marker begins its linear fade. `None` = no fade, full
    /// alpha until expiry.
    pub override_fade_start: Option<f32>,
    pub override_expires_at: Option<f32>,

    /// Voice flash envelope.
    pub flash_expires_at: Option<f32>,
    pub next_flash_peak_at: Option<f32>,
    pub current_flash_alpha: f32,

    pub is_dead: bool,
}

impl OverlaySlot {
    /// Whether an override marker is installed and unexpired.
    pub fn override_active(&self, now: f32) -> bool {
        matches!(self.override_expires_at, Some(t) if t > now)
    }

    /// Remove any override marker. Also ends the detection streak: a
    /// cleared marker means the entity must re-earn its dwell.
    pub fn clear_override(&mut self) {
        self.override_icon = None;
        self.override_icon_offscreen = None;
        self.override_position = Vec3::ZERO;
        self.override_yaw = 0.0;
        self.override_fade_start = None;
        self.override_expires_at = None;
        self.last_seen_at = None;
        self.first_seen_at = None;
    }

    /// Record a detection this frame. The first detection of a streak
    /// stamps `first_seen_at` for the dwell check.
    pub fn mark_seen(&mut self, now: f32) {
        if self.last_seen_at.is_none() {
            self.first_seen_at = Some(now);
        }
        self.last_seen_at = Some(now);
    }

    /// Install the death marker: frozen at the death pose, fades from
    /// `now + 7.5s`, gone at `now + 10s`. Replaces any other marker.
    pub fn set_death_marker(&mut self, now: f32, icon: Option<TextureId>, pos: Vec3, yaw: f32) {
        self.is_dead = true;
        self.override_icon = icon;
        self.override_icon_offscreen = icon;
        self.override_position = pos;
        self.override_yaw = yaw;
        self.override_fade_start = Some(now + DEATH_ICON_FADE);
        self.override_expires_at = Some(now + DEATH_ICON_DURATION);
    }

    /// Install a last-known-position ghost: no fade, 4 second lifetime.
    /// Replaces any other marker.
    pub fn set_last_known_marker(
        &mut self,
        now: f32,
        icon: Option<TextureId>,
        offscreen: Option<TextureId>,
        pos: Vec3,
        yaw: f32,
    ) {
        self.override_icon = icon;
        self.override_icon_offscreen = offscreen;
        self.override_position = pos;
        self.override_yaw = yaw;
        self.override_fade_start = None;
        self.override_expires_at = Some(now + LAST_SEEN_ICON_DURATION);
    }

    /// Marker alpha at `now`, fading linearly from `base` once the fade
    /// window opens.
    pub fn override_alpha(&self, now: f32, base: f32) -> f32 {
        match (self.override_fade_start, self.override_expires_at) {
            (Some(fade), Some(expiry)) if fade <= now && expiry > fade => {
                base * (1.0 - (now - fade) / (expiry - fade))
            }
            _ => base,
        }
    }

    /// Begin a voice flash: immediate full ring, re-peaking every half
    /// second for two seconds.
    pub fn start_flash(&mut self, now: f32) {
        self.flash_expires_at = Some(now + VOICE_FLASH_DURATION);
        self.current_flash_alpha = FLASH_PEAK_ALPHA;
        self.next_flash_peak_at = Some(now + VOICE_FLASH_PEAK_INTERVAL);
    }

    /// Advance the flash envelope one frame. Between peaks the alpha
    /// decays in proportion to the time left before the next peak.
    pub fn update_flash(&mut self, now: f32, dt: f32) {
        let Some(expires) = self.flash_expires_at else {
            self.current_flash_alpha = 0.0;
            return;
        };

        if expires <= now {
            self.current_flash_alpha = 0.0;
            return;
        }

        match self.next_flash_peak_at {
            Some(peak) if peak <= now => {
                self.current_flash_alpha = FLASH_PEAK_ALPHA;
                self.next_flash_peak_at = Some((now + VOICE_FLASH_PEAK_INTERVAL).min(expires));
            }
            Some(peak) => {
                let time_to_peak = peak - now;
                if time_to_peak > 0.0 {
                    self.current_flash_alpha -= self.current_flash_alpha * dt / time_to_peak;
                    self.current_flash_alpha = self.current_flash_alpha.max(0.0);
                }
            }
            None => {}
        }
    }

    /// Round reset: wipe every transient field unconditionally.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn death_marker_lifecycle() {
        let mut slot = OverlaySlot::default();
        let t0 = 100.0;
        slot.set_death_marker(t0, Some(TextureId(3)), Vec3::new(1.0, 2.0, 3.0), 45.0);

        assert!(slot.is_dead);
        assert!(slot.override_active(t0 + 9.99));
        assert!(!slot.override_active(t0 + 10.01));

        // Full alpha before the fade window opens.
        assert_eq!(slot.override_alpha(t0 + 7.0, 255.0), 255.0);
        // Strictly between zero and base while fading.
        let fading = slot.override_alpha(t0 + 8.0, 255.0);
        assert!(fading > 0.0 && fading < 255.0);
    }

    #[test]
    fn last_known_marker_replaces_death_marker() {
        let mut slot = OverlaySlot::default();
        slot.set_death_marker(0.0, Some(TextureId(1)), Vec3::ZERO, 0.0);
        slot.set_last_known_marker(1.0, Some(TextureId(2)), Some(TextureId(3)), Vec3::X, 90.0);

        assert_eq!(slot.override_icon, Some(TextureId(2)));
        assert_eq!(slot.override_fade_start, None);
        assert_eq!(slot.override_expires_at, Some(1.0 + LAST_SEEN_ICON_DURATION));
    }

    #[test]
    fn mark_seen_stamps_first_seen_once() {
        let mut slot = OverlaySlot::default();
        slot.mark_seen(1.0);
        slot.mark_seen(1.5);
        assert_eq!(slot.first_seen_at, Some(1.0));
        assert_eq!(slot.last_seen_at, Some(1.5));
    }

    #[test]
    fn clear_override_ends_detection_streak() {
        let mut slot = OverlaySlot::default();
        slot.mark_seen(1.0);
        slot.set_last_known_marker(2.0, None, None, Vec3::ZERO, 0.0);
        slot.clear_override();
        assert!(slot.first_seen_at.is_none());
        assert!(slot.last_seen_at.is_none());
        assert!(slot.override_expires_at.is_none());
    }

    #[test]
    fn flash_envelope() {
        let mut slot = OverlaySlot::default();
        let t0 = 10.0;
        slot.start_flash(t0);
        assert_eq!(slot.current_flash_alpha, 255.0);

        // Decays between peaks. Two frames cover the half interval; each
        // eats a share of the remaining alpha without flooring it.
        slot.update_flash(t0 + 0.125, 0.125);
        let mid = slot.current_flash_alpha;
        assert!(mid < 255.0 && mid > 0.0);
        slot.update_flash(t0 + 0.25, 0.125);
        assert!(slot.current_flash_alpha < mid);
        assert!(slot.current_flash_alpha > 0.0);

        // Re-peaks on schedule.
        slot.update_flash(t0 + 0.5, 0.25);
        assert_eq!(slot.current_flash_alpha, 255.0);

        // Snaps to zero at expiry.
        slot.update_flash(t0 + 2.0, 0.016);
        assert_eq!(slot.current_flash_alpha, 0.0);
    }

    #[test]
    fn peak_never_scheduled_past_expiry() {
        let mut slot = OverlaySlot::default();
        slot.start_flash(0.0);
        // Trigger the last re-peak near the end of the window.
        slot.update_flash(1.8, 0.016);
        assert_eq!(slot.next_flash_peak_at, Some(2.0));
    }

    #[test]
    fn round_reset_clears_everything() {
        let mut slot = OverlaySlot::default();
        slot.mark_seen(1.0);
        slot.set_death_marker(2.0, Some(TextureId(1)), Vec3::X, 10.0);
        slot.start_flash(3.0);
        slot.clear();

        assert!(slot.last_seen_at.is_none());
        assert!(slot.first_seen_at.is_none());
        assert!(slot.override_expires_at.is_none());
        assert!(slot.flash_expires_at.is_none());
        assert_eq!(slot.current_flash_alpha, 0.0);
        assert!(!slot.is_dead);
    }
}

//! Game time for the frame loop.
//!
//! All gameplay timing (icon fades, seen-recently windows, AI timers)
//! compares against a single monotonic game-time value sampled once per
//! frame, so every system inside one frame agrees on "now".

/// Monotonic game clock advanced once per frame.
#[derive(Debug)]
pub struct GameClock {
    /// Total game time in seconds since the match started.
    now: f32,
    /// Duration of the last frame in seconds.
    delta: f32,
    /// Frame count since start.
    frame_count: u64,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl GameClock {
    /// Create a clock at t = 0.
    pub fn new() -> Self {
        Self {
            now: 0.0,
            delta: 0.0,
            frame_count: 0,
        }
    }

    /// Advance the clock by one frame. Negative deltas are treated as zero.
    pub fn tick(&mut self, dt: f32) {
        self.delta = dt.max(0.0);
        self.now += self.delta;
        self.frame_count += 1;
    }

    /// Current game time in seconds.
    pub fn now(&self) -> f32 {
        self.now
    }

    /// Duration of the last frame in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta
    }

    /// Frames ticked since start.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_accumulates_ticks() {
        let mut clock = GameClock::new();
        clock.tick(0.016);
        clock.tick(0.016);
        assert!((clock.now() - 0.032).abs() < 1e-6);
        assert_eq!(clock.frame_count(), 2);
    }

    #[test]
    fn clock_ignores_negative_delta() {
        let mut clock = GameClock::new();
        clock.tick(0.5);
        clock.tick(-1.0);
        assert!((clock.now() - 0.5).abs() < 1e-6);
        assert_eq!(clock.delta_seconds(), 0.0);
    }
}

//! Common ECS components used across the game.

use glam::Vec3;

/// Velocity component for moving entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct Velocity {
    pub linear: Vec3,
}

/// Health component for damageable entities. Integer hit points, 0 = dead.
#[derive(Debug, Clone, Copy)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.current = (self.current - amount).max(0);
    }

    pub fn heal(&mut self, amount: i32) {
        self.current = (self.current + amount).min(self.max);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Team affiliation for match actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Crimson,
    Cobalt,
    Spectator,
}

impl Team {
    /// Whether two actors fight on the same side.
    pub fn is_ally(self, other: Team) -> bool {
        self == other
    }

    pub fn name(self) -> &'static str {
        match self {
            Team::Crimson => "Crimson",
            Team::Cobalt => "Cobalt",
            Team::Spectator => "Spectator",
        }
    }
}

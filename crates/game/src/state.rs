//! Authoritative game-state snapshot for the HUD.
//!
//! The overview never queries the world directly; once per frame the host
//! captures a [`GameSnapshot`] so every per-entity read inside that frame
//! sees one consistent value.

use engine_core::{Health, Team, Transform, World};

/// Stable identity for a connected player. Survives reconnects and slot
/// reshuffles; never reused within a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub u32);

/// Per-player flags the server replicates outside the ECS components.
#[derive(Debug, Clone)]
pub struct PlayerInfo {
    pub user_id: UserId,
    pub name: String,
    pub connected: bool,
    /// Currently detected by a member of the viewer's team.
    pub spotted: bool,
    /// Voice channel currently open.
    pub speaking: bool,
    /// Outside the viewer's replication range; position is stale.
    pub dormant: bool,
}

impl PlayerInfo {
    pub fn new(user_id: UserId, name: &str) -> Self {
        Self {
            user_id,
            name: name.to_string(),
            connected: true,
            spotted: false,
            speaking: false,
            dormant: false,
        }
    }
}

/// One player's state as read at the top of the frame.
#[derive(Debug, Clone)]
pub struct PlayerSnapshot {
    pub user_id: UserId,
    pub name: String,
    pub connected: bool,
    pub alive: bool,
    pub health: i32,
    pub team: Team,
    pub spotted: bool,
    pub speaking: bool,
    pub dormant: bool,
    pub position: glam::Vec3,
    pub yaw: f32,
}

/// Frame-consistent view of every match actor the HUD cares about.
#[derive(Debug, Default)]
pub struct GameSnapshot {
    pub players: Vec<PlayerSnapshot>,
    pub local: Option<UserId>,
}

impl GameSnapshot {
    /// Capture all connected players from the world. Called exactly once
    /// per frame, before any HUD update runs.
    pub fn capture(world: &World, local: Option<UserId>) -> Self {
        let mut players = Vec::new();
        for (_, (info, transform, health, team)) in
            world.query::<(&PlayerInfo, &Transform, &Health, &Team)>().iter()
        {
            players.push(PlayerSnapshot {
                user_id: info.user_id,
                name: info.name.clone(),
                connected: info.connected,
                alive: !health.is_dead(),
                health: health.current,
                team: *team,
                spotted: info.spotted,
                speaking: info.speaking,
                dormant: info.dormant,
                position: transform.position,
                yaw: transform.yaw,
            });
        }
        Self { players, local }
    }

    pub fn player(&self, id: UserId) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| p.user_id == id)
    }

    pub fn local_player(&self) -> Option<&PlayerSnapshot> {
        self.local.and_then(|id| self.player(id))
    }
}

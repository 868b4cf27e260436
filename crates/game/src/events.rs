//! Discrete game events fed into the HUD.
//!
//! The server pushes these as they happen; the overview consumes them in
//! arrival order at the top of its update. Unknown identities are no-ops
//! at the sink, never errors.

use engine_core::Team;

use crate::state::UserId;

/// One replicated game event.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A player died; the payload identity is the victim.
    PlayerDeath { user_id: UserId },
    /// A player switched teams.
    PlayerTeam { user_id: UserId, team: Team },
    /// A player was detected by a member of the viewer's team.
    PlayerSpotted { user_id: UserId },
    /// A player started transmitting on the voice channel.
    VoiceFlash { user_id: UserId },
    /// A new round began; all transient HUD state resets.
    RoundReset,
}

/// FIFO queue of events awaiting dispatch this frame.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all pending events in arrival order.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_order_and_empties() {
        let mut q = EventQueue::new();
        q.push(GameEvent::PlayerSpotted { user_id: UserId(1) });
        q.push(GameEvent::RoundReset);
        let drained = q.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1], GameEvent::RoundReset);
        assert!(q.is_empty());
    }
}

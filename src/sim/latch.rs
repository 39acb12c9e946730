//! One-shot collision latch
//!
//! The detector runs every frame, but the game-state owner must hear about a
//! crash once per episode. Only the episode restart clears the latch.

use serde::{Deserialize, Serialize};

use crate::game::EpisodeStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionLatch {
    fired: bool,
}

impl CollisionLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame's detector result. Returns true exactly when the
    /// notification should be sent: a collision, a still-running episode, and
    /// a latch that has not fired yet.
    pub fn trip(&mut self, collided: bool, status: EpisodeStatus) -> bool {
        if !collided || self.fired || status.is_over() {
            return false;
        }
        self.fired = true;
        true
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Re-arm for a new episode
    pub fn reset(&mut self) {
        self.fired = false;
    }
}

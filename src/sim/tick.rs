//! Per-frame traffic step
//!
//! One call per display refresh. Within a call the order is fixed:
//! 1. pending restart (reset cars, clock and latch; clear the signal)
//! 2. clock (the first frame of an episode only records its timestamp)
//! 3. advance and wrap cars
//! 4. collision check through the latch

use std::cell::Cell;
use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::clock::{SimClock, advance_cars};
use super::collision::find_collision;
use super::lanes::Lane;
use super::latch::CollisionLatch;
use super::state::{Car, TrafficState};
use crate::game::{EpisodeStatus, GridPos};

/// Level-triggered restart request.
///
/// The UI raises it; the next frame consumes it. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct RestartSignal(Rc<Cell<bool>>);

impl RestartSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.set(true);
    }

    pub fn is_raised(&self) -> bool {
        self.0.get()
    }

    /// Read and clear
    fn take(&self) -> bool {
        self.0.replace(false)
    }
}

/// What the loop reads from the game-state owner each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInput {
    pub player: GridPos,
    pub status: EpisodeStatus,
}

/// What happened during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// A restart was consumed at the top of this frame
    pub restarted: bool,
    /// Cars were moved (false on the first frame of an episode)
    pub advanced: bool,
    /// Car that caused a new crash; set at most once per episode
    pub collision: Option<u32>,
}

/// Traffic simulation for one play session, across episodes
#[derive(Debug, Clone)]
pub struct TrafficLoop {
    lanes: Vec<Lane>,
    cars_per_lane: usize,
    traffic: TrafficState,
    clock: SimClock,
    latch: CollisionLatch,
    restart: RestartSignal,
    rng: Pcg32,
}

impl TrafficLoop {
    /// Build the loop and populate the first episode
    pub fn new(lanes: Vec<Lane>, cars_per_lane: usize, seed: u64, restart: RestartSignal) -> Self {
        let mut sim = Self {
            lanes,
            cars_per_lane,
            traffic: TrafficState::new(),
            clock: SimClock::new(),
            latch: CollisionLatch::new(),
            restart,
            rng: Pcg32::seed_from_u64(seed),
        };
        sim.traffic.populate(&sim.lanes, sim.cars_per_lane, &mut sim.rng);
        log::info!("Traffic ready (seed {}, episode {})", seed, sim.traffic.episode);
        sim
    }

    /// Advance one frame at host timestamp `now_ms`
    pub fn tick(&mut self, now_ms: f64, input: &FrameInput) -> FrameReport {
        let mut report = FrameReport::default();

        if self.restart.take() {
            self.reset_episode();
            report.restarted = true;
        }

        let Some(elapsed_ms) = self.clock.tick(now_ms) else {
            return report;
        };

        advance_cars(&mut self.traffic.cars, &self.lanes, elapsed_ms);
        report.advanced = true;

        let hit = find_collision(input.player, &self.traffic.cars).map(|car| car.id);
        if self.latch.trip(hit.is_some(), input.status) {
            log::info!(
                "Episode {}: car {:?} hit player at ({}, {})",
                self.traffic.episode,
                hit,
                input.player.x,
                input.player.y
            );
            report.collision = hit;
        }

        report
    }

    /// Fresh cars, unset clock, re-armed latch
    fn reset_episode(&mut self) {
        self.traffic.populate(&self.lanes, self.cars_per_lane, &mut self.rng);
        self.clock.reset();
        self.latch.reset();
        log::info!("Episode {} started", self.traffic.episode);
    }

    /// Cars for rendering
    pub fn cars(&self) -> &[Car] {
        &self.traffic.cars
    }

    pub fn traffic(&self) -> &TrafficState {
        &self.traffic
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn episode(&self) -> u32 {
        self.traffic.episode
    }

    pub fn collision_fired(&self) -> bool {
        self.latch.has_fired()
    }

    pub fn restart_signal(&self) -> &RestartSignal {
        &self.restart
    }

    #[cfg(test)]
    pub(crate) fn traffic_mut(&mut self) -> &mut TrafficState {
        &mut self.traffic
    }
}

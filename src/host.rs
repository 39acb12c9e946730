//! Frame host
//!
//! Stand-in for the display refresh scheduler: callbacks are registered once,
//! run once per dispatched frame, and can be revoked at any time. All of it is
//! single-threaded; a frame's callbacks finish before the next frame starts.

use std::cell::RefCell;
use std::collections::HashSet;
use std::mem;
use std::rc::Rc;

use crate::game::{Direction, GameState, MoveOutcome};
use crate::settings::Settings;
use crate::sim::{FrameInput, FrameReport, Lane, RestartSignal, TrafficLoop};

type FrameCallback = Box<dyn FnMut(f64)>;

/// Registration token returned by `FrameScheduler::request`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    /// Live callbacks in registration order
    callbacks: Vec<(u64, FrameCallback)>,
    /// Cancelled while their callback was checked out for dispatch
    cancelled: HashSet<u64>,
    dispatching: bool,
}

/// Per-frame callback scheduler. Clones share the same registry.
#[derive(Clone, Default)]
pub struct FrameScheduler {
    registry: Rc<RefCell<Registry>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` on every frame until cancelled. Registrations made
    /// during a dispatch first run on the following frame.
    pub fn request(&self, callback: impl FnMut(f64) + 'static) -> FrameHandle {
        let mut reg = self.registry.borrow_mut();
        reg.next_id += 1;
        let id = reg.next_id;
        reg.callbacks.push((id, Box::new(callback)));
        FrameHandle(id)
    }

    /// Revoke a registration. Idempotent, and safe to call from inside a
    /// callback: a cancelled callback never runs again.
    pub fn cancel(&self, handle: FrameHandle) {
        let removed = {
            let mut reg = self.registry.borrow_mut();
            if reg.dispatching {
                reg.cancelled.insert(handle.0);
            }
            let pos = reg.callbacks.iter().position(|(id, _)| *id == handle.0);
            pos.map(|i| reg.callbacks.remove(i))
        };
        // Callback dropped outside the borrow; it may own a `Mount`
        drop(removed);
    }

    /// Number of live registrations
    pub fn pending(&self) -> usize {
        let reg = self.registry.borrow();
        reg.callbacks
            .iter()
            .filter(|(id, _)| !reg.cancelled.contains(id))
            .count()
    }

    /// Run one frame at `now_ms`. Returns how many callbacks ran.
    pub fn dispatch(&self, now_ms: f64) -> usize {
        let mut batch = {
            let mut reg = self.registry.borrow_mut();
            if reg.dispatching {
                log::warn!("Nested frame dispatch ignored");
                return 0;
            }
            reg.dispatching = true;
            mem::take(&mut reg.callbacks)
        };

        let mut ran = 0;
        for (id, callback) in batch.iter_mut() {
            let id = *id;
            if self.registry.borrow().cancelled.contains(&id) {
                continue;
            }
            callback(now_ms);
            ran += 1;
        }

        let cancelled = mem::take(&mut self.registry.borrow_mut().cancelled);
        let (keep, removed): (Vec<_>, Vec<_>) = batch
            .into_iter()
            .partition(|(id, _)| !cancelled.contains(id));
        {
            let mut reg = self.registry.borrow_mut();
            let added = mem::replace(&mut reg.callbacks, keep);
            reg.callbacks.extend(added);
            reg.dispatching = false;
        }
        drop(removed);
        ran
    }
}

/// Everything one play session owns. Frame callbacks reach it through a shared
/// cell and read the current player state on every tick.
#[derive(Debug)]
pub struct Session {
    game: GameState,
    traffic: TrafficLoop,
    restart: RestartSignal,
    last_report: FrameReport,
    frames: u64,
    collisions: u32,
}

impl Session {
    pub fn new(settings: &Settings) -> Self {
        Self::with_seed(
            settings.lanes.clone(),
            settings.cars_per_lane,
            settings.effective_seed(),
        )
    }

    pub fn with_seed(lanes: Vec<Lane>, cars_per_lane: usize, seed: u64) -> Self {
        let restart = RestartSignal::new();
        let game = GameState::new(lanes.len());
        let traffic = TrafficLoop::new(lanes, cars_per_lane, seed, restart.clone());
        Self {
            game,
            traffic,
            restart,
            last_report: FrameReport::default(),
            frames: 0,
            collisions: 0,
        }
    }

    /// One frame: traffic step, then forward a new crash to the game state
    pub fn frame(&mut self, now_ms: f64) -> FrameReport {
        let input = FrameInput {
            player: self.game.player,
            status: self.game.status(),
        };
        let report = self.traffic.tick(now_ms, &input);
        if report.collision.is_some() {
            self.collisions += 1;
            self.game.on_collision();
        }
        self.frames += 1;
        self.last_report = report;
        report
    }

    pub fn move_player(&mut self, dir: Direction) -> MoveOutcome {
        self.game.move_player(dir)
    }

    /// Reset the game state now; traffic follows on the next frame
    pub fn restart(&mut self) {
        self.game.restart(&self.restart);
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn traffic(&self) -> &TrafficLoop {
        &self.traffic
    }

    pub fn last_report(&self) -> FrameReport {
        self.last_report
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Crash notifications delivered over the whole session
    pub fn collisions(&self) -> u32 {
        self.collisions
    }
}

/// A session attached to a scheduler. Dropping it detaches.
pub struct Mount {
    scheduler: FrameScheduler,
    handle: FrameHandle,
}

impl Mount {
    /// Detach now rather than at end of scope
    pub fn unmount(self) {}
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.scheduler.cancel(self.handle);
    }
}

/// Drive `session` from every frame of `scheduler`
pub fn mount(scheduler: &FrameScheduler, session: &Rc<RefCell<Session>>) -> Mount {
    let session = Rc::clone(session);
    let handle = scheduler.request(move |now_ms| {
        session.borrow_mut().frame(now_ms);
    });
    Mount {
        scheduler: scheduler.clone(),
        handle,
    }
}

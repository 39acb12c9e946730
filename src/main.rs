//! Fluffle Crossing entry point
//!
//! Headless native driver: mounts a session on a frame scheduler, dispatches
//! frames at the configured refresh rate and lets a simple autopilot play.

#[cfg(not(target_arch = "wasm32"))]
mod driver {
    use std::cell::RefCell;
    use std::rc::Rc;

    use fluffle_crossing::consts::*;
    use fluffle_crossing::sim::{Lane, Span, TrafficLoop, car_span, player_span};
    use fluffle_crossing::{
        ConfigError, Direction, FrameScheduler, GridPos, MoveOutcome, Session, Settings, mount,
    };

    /// Frames between autopilot decisions (one hop)
    const HOP_FRAMES: u64 = 8;
    /// Frames the game-over screen stays up before restarting
    const OVERLAY_FRAMES: u64 = 45;
    /// Reference frames of traffic the autopilot looks ahead
    const LOOKAHEAD_FRAMES: f32 = 24.0;

    #[derive(Debug, Default)]
    struct Summary {
        episodes: u32,
        crashes: u32,
        wins: u32,
        best_score: u32,
        frames: u64,
    }

    /// Would a car sweep through `player` within the lookahead?
    fn lane_is_clear(traffic: &TrafficLoop, player: GridPos) -> bool {
        let Ok(row) = usize::try_from(player.y) else {
            return true;
        };
        let Some(lane) = traffic.lanes().get(row) else {
            return true;
        };
        if !lane.is_corridor() {
            return true;
        }
        let hitbox = widen(player_span(player.x), 1.0);
        traffic
            .traffic()
            .cars_in_lane(row)
            .all(|car| !swept(car_span(car), lane).overlaps(&hitbox))
    }

    /// Span a car covers while driving for the lookahead
    fn swept(span: Span, lane: &Lane) -> Span {
        let travel = lane.speed() * LOOKAHEAD_FRAMES;
        Span {
            left: span.left + travel.min(0.0),
            right: span.right + travel.max(0.0),
        }
    }

    fn widen(span: Span, margin: f32) -> Span {
        Span {
            left: span.left - margin,
            right: span.right + margin,
        }
    }

    fn next_move(session: &Session) -> Option<Direction> {
        let game = session.game();
        let here = game.player;
        let ahead = GridPos::new(here.x, here.y + 1);
        if lane_is_clear(session.traffic(), ahead) {
            return Some(Direction::Forward);
        }
        if !lane_is_clear(session.traffic(), here) {
            // Standing in the way: dodge sideways, else retreat
            for dir in [Direction::Left, Direction::Right] {
                let (dx, _) = dir.delta();
                let side = GridPos::new(here.x + dx, here.y);
                if (0..=PLAYER_X_MAX).contains(&side.x) && lane_is_clear(session.traffic(), side) {
                    return Some(dir);
                }
            }
            return Some(Direction::Backward);
        }
        None
    }

    pub fn run() -> Result<(), ConfigError> {
        let settings = match std::env::args().nth(1) {
            Some(path) => Settings::load(path)?,
            None => {
                let settings = Settings::default();
                settings.validate()?;
                settings
            }
        };

        log::info!(
            "Fluffle Crossing (native) starting: {} lanes, {} cars per road, {} Hz",
            settings.lanes.len(),
            settings.cars_per_lane,
            settings.refresh_hz
        );

        let scheduler = FrameScheduler::new();
        let session = Rc::new(RefCell::new(Session::new(&settings)));
        let mounted = mount(&scheduler, &session);

        let frame_ms = 1000.0 / settings.refresh_hz;
        let mut now_ms = 0.0;
        let mut summary = Summary {
            episodes: 1,
            ..Default::default()
        };
        let mut ended_at: Option<u64> = None;

        for frame in 0..settings.max_frames {
            // Uneven display pacing, same traffic speed
            let jitter = 1.0 + 0.3 * ((frame % 7) as f64 - 3.0) / 3.0;
            now_ms += frame_ms * jitter;
            scheduler.dispatch(now_ms);
            summary.frames = frame + 1;

            let mut s = session.borrow_mut();
            summary.best_score = summary.best_score.max(s.game().score);

            if s.game().status().is_over() {
                let since = *ended_at.get_or_insert(frame);
                if frame - since < OVERLAY_FRAMES {
                    continue;
                }
                if summary.episodes >= settings.max_episodes {
                    break;
                }
                ended_at = None;
                s.restart();
                summary.episodes += 1;
                continue;
            }

            if frame % HOP_FRAMES == 0 {
                if let Some(dir) = next_move(&s) {
                    if let MoveOutcome::Won(pos) = s.move_player(dir) {
                        summary.wins += 1;
                        log::info!("Episode {} won at ({}, {})", summary.episodes, pos.x, pos.y);
                    }
                }
            }
        }

        mounted.unmount();
        log::debug!("Scheduler drained: {} callbacks left", scheduler.pending());

        let s = session.borrow();
        summary.crashes = s.collisions();
        println!("Fluffle Crossing run complete");
        println!("  episodes:   {}", summary.episodes);
        println!("  crashes:    {}", summary.crashes);
        println!("  wins:       {}", summary.wins);
        println!("  best score: {}", summary.best_score);
        println!("  frames:     {} ({:.1} s simulated)", summary.frames, now_ms / 1000.0);
        if let Some(last) = s.game().logs.front() {
            println!("  last log:   {}", last);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = driver::run() {
        log::error!("{}", e);
        eprintln!("fluffle-crossing: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives `Session` directly
}

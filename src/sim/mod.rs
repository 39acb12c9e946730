//! Traffic simulation module
//!
//! The real-time core of the game. Everything here is single-threaded and
//! runs synchronously inside one frame callback:
//! - Lane layout is static data
//! - Car motion is scaled by elapsed time, never by frame count
//! - A crash is reported once per episode
//! - Restart is applied at the top of the next frame, never mid-frame

pub mod clock;
pub mod collision;
pub mod lanes;
pub mod latch;
pub mod state;
pub mod tick;

pub use clock::{SimClock, advance_cars, wrap_position};
pub use collision::{Span, car_span, detect_collision, find_collision, player_span};
pub use lanes::{Lane, LaneKind, default_lanes, goal_row};
pub use latch::CollisionLatch;
pub use state::{Car, CarColor, CarKind, TrafficState};
pub use tick::{FrameInput, FrameReport, RestartSignal, TrafficLoop};

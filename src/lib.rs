//! Fluffle Crossing - A lane-crossing arcade game
//!
//! Core modules:
//! - `sim`: Traffic simulation (lanes, cars, clock, collisions, restart)
//! - `game`: Game-state owner (player position, score, move log)
//! - `host`: Per-frame scheduler and session wiring
//! - `settings`: Data-driven lane layout and driver options

pub mod game;
pub mod host;
pub mod settings;
pub mod sim;

pub use game::{Direction, EpisodeStatus, GameState, GridPos, MoveOutcome};
pub use host::{FrameHandle, FrameScheduler, Mount, Session, mount};
pub use settings::{ConfigError, Settings};

/// Game configuration constants
pub mod consts {
    /// Duration of one frame at the 60 Hz reference rate (ms).
    /// Lane speeds are expressed per reference frame.
    pub const REFERENCE_FRAME_MS: f64 = 16.0;

    /// Extended horizontal window cars wrap within (percent of lane width)
    pub const WRAP_MIN: f32 = -10.0;
    pub const WRAP_MAX: f32 = 110.0;

    /// Rendered lane width in pixels. Hitboxes are fractions of this.
    pub const LANE_WIDTH_PX: f32 = 1200.0;
    /// Rendered player sprite width (px)
    pub const PLAYER_WIDTH_PX: f32 = 40.0;
    /// Rendered car widths (px), must match the sprite sheet
    pub const SEDAN_WIDTH_PX: f32 = 64.0;
    pub const JEEP_WIDTH_PX: f32 = 80.0;
    pub const VAN_WIDTH_PX: f32 = 96.0;

    /// Rightmost player column
    pub const PLAYER_X_MAX: i32 = 10;
    /// Player spawn cell
    pub const PLAYER_START_X: i32 = 5;
    pub const PLAYER_START_Y: i32 = 0;

    /// Cars sampled per road lane at episode start
    pub const CARS_PER_LANE: usize = 3;

    /// Move log capacity (newest first)
    pub const MAX_LOG_ENTRIES: usize = 50;
}

/// Convert a pixel width into a lane-width percentage
#[inline]
pub fn px_to_percent(px: f32) -> f32 {
    px / consts::LANE_WIDTH_PX * 100.0
}

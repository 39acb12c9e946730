//! Game-state owner
//!
//! Holds everything the traffic core only reads: where the player stands,
//! whether the episode is over, plus score and the move log. Mutated by
//! player moves, crash notifications and restarts.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::RestartSignal;

/// Player cell. `x` is the column, `y` the lane row (0 = start).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn start() -> Self {
        Self::new(PLAYER_START_X, PLAYER_START_Y)
    }
}

/// Read-only episode flags handed to the traffic core each frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeStatus {
    pub is_game_over: bool,
    pub is_won: bool,
}

impl EpisodeStatus {
    #[inline]
    pub fn is_over(&self) -> bool {
        self.is_game_over || self.is_won
    }
}

/// One grid step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

impl Direction {
    /// (dx, dy) in grid cells
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Forward => (0, 1),
            Direction::Backward => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "Forward",
            Direction::Backward => "Backward",
            Direction::Left => "Left",
            Direction::Right => "Right",
        }
    }
}

/// Result of a move request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Episode already ended, or the move ran into the grid edge
    Ignored,
    Moved(GridPos),
    /// Reached the goal row
    Won(GridPos),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub player: GridPos,
    /// Furthest row reached this episode
    pub score: u32,
    pub is_game_over: bool,
    pub is_won: bool,
    /// Newest first, capped at `MAX_LOG_ENTRIES`
    pub logs: VecDeque<String>,
    lane_count: usize,
}

impl GameState {
    pub fn new(lane_count: usize) -> Self {
        let mut state = Self {
            player: GridPos::start(),
            score: 0,
            is_game_over: false,
            is_won: false,
            logs: VecDeque::with_capacity(MAX_LOG_ENTRIES),
            lane_count,
        };
        state.log("Welcome to Fluffle Crossing!");
        state.log("Use Arrow Keys to move.");
        state
    }

    pub fn status(&self) -> EpisodeStatus {
        EpisodeStatus {
            is_game_over: self.is_game_over,
            is_won: self.is_won,
        }
    }

    /// Push a message to the front of the log
    pub fn log(&mut self, message: impl Into<String>) {
        self.logs.push_front(message.into());
        self.logs.truncate(MAX_LOG_ENTRIES);
    }

    fn max_row(&self) -> i32 {
        self.lane_count.saturating_sub(1) as i32
    }

    /// Step the player one cell, clamped to the grid
    pub fn move_player(&mut self, dir: Direction) -> MoveOutcome {
        if self.status().is_over() {
            return MoveOutcome::Ignored;
        }

        let (dx, dy) = dir.delta();
        let next = GridPos::new(
            (self.player.x + dx).clamp(0, PLAYER_X_MAX),
            (self.player.y + dy).clamp(0, self.max_row()),
        );
        if next == self.player {
            return MoveOutcome::Ignored;
        }

        self.player = next;
        self.log(format!("Moved {} to ({}, {})", dir.as_str(), next.x, next.y));
        self.score = self.score.max(next.y as u32);

        if next.y >= self.max_row() {
            self.is_won = true;
            self.log("Fluffle made it across!");
            log::info!("Player reached the goal (score {})", self.score);
            return MoveOutcome::Won(next);
        }
        MoveOutcome::Moved(next)
    }

    /// Crash notification from the traffic core
    pub fn on_collision(&mut self) {
        if self.status().is_over() {
            return;
        }
        self.is_game_over = true;
        self.log("CRASH! Oh no, Fluffle!");
        log::info!(
            "Game over at ({}, {}), score {}",
            self.player.x,
            self.player.y,
            self.score
        );
    }

    /// Reset for a new episode and ask the traffic core to follow on its next frame
    pub fn restart(&mut self, signal: &RestartSignal) {
        self.player = GridPos::start();
        self.score = 0;
        self.is_game_over = false;
        self.is_won = false;
        self.logs.clear();
        self.log("Game Restarted!");
        self.log("Good luck Fluffle!");
        signal.raise();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::default_lanes;

    fn new_game() -> GameState {
        GameState::new(default_lanes().len())
    }

    #[test]
    fn test_initial_state() {
        let game = new_game();
        assert_eq!(game.player, GridPos::new(5, 0));
        assert_eq!(game.score, 0);
        assert!(!game.status().is_over());
        assert_eq!(game.logs.len(), 2);
        assert_eq!(game.logs[0], "Use Arrow Keys to move.");
    }

    #[test]
    fn test_move_and_score() {
        let mut game = new_game();
        assert_eq!(game.move_player(Direction::Forward), MoveOutcome::Moved(GridPos::new(5, 1)));
        game.move_player(Direction::Forward);
        game.move_player(Direction::Backward);
        assert_eq!(game.player, GridPos::new(5, 1));
        // Score keeps the furthest row
        assert_eq!(game.score, 2);
        assert_eq!(game.logs[0], "Moved Backward to (5, 1)");
    }

    #[test]
    fn test_edges_clamp_without_log() {
        let mut game = new_game();
        assert_eq!(game.move_player(Direction::Backward), MoveOutcome::Ignored);
        for _ in 0..5 {
            game.move_player(Direction::Right);
        }
        let logs = game.logs.len();
        assert_eq!(game.move_player(Direction::Right), MoveOutcome::Ignored);
        assert_eq!(game.player.x, PLAYER_X_MAX);
        assert_eq!(game.logs.len(), logs);
    }

    #[test]
    fn test_reaching_goal_wins_and_freezes() {
        let mut game = new_game();
        let mut last = MoveOutcome::Ignored;
        for _ in 0..10 {
            last = game.move_player(Direction::Forward);
        }
        assert_eq!(last, MoveOutcome::Won(GridPos::new(5, 10)));
        assert!(game.is_won);
        assert_eq!(game.move_player(Direction::Left), MoveOutcome::Ignored);
    }

    #[test]
    fn test_collision_ends_episode_once() {
        let mut game = new_game();
        game.on_collision();
        game.on_collision();
        assert!(game.is_game_over);
        assert_eq!(game.logs.iter().filter(|l| l.starts_with("CRASH")).count(), 1);
        assert_eq!(game.move_player(Direction::Forward), MoveOutcome::Ignored);
    }

    #[test]
    fn test_restart_raises_signal() {
        let mut game = new_game();
        let signal = RestartSignal::new();
        game.move_player(Direction::Forward);
        game.on_collision();
        game.restart(&signal);

        assert!(signal.is_raised());
        assert_eq!(game.player, GridPos::start());
        assert_eq!(game.score, 0);
        assert!(!game.status().is_over());
        assert_eq!(game.logs.len(), 2);
    }

    #[test]
    fn test_log_is_capped() {
        let mut game = new_game();
        for i in 0..120 {
            game.log(format!("entry {}", i));
        }
        assert_eq!(game.logs.len(), MAX_LOG_ENTRIES);
        assert_eq!(game.logs[0], "entry 119");
    }
}

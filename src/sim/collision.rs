//! Player/car collision detection
//!
//! Axis-aligned overlap in lane-percentage space. Hitbox widths come from the
//! same pixel constants the sprites are drawn with, so what the player sees
//! is what collides.

use super::state::Car;
use crate::consts::*;
use crate::game::GridPos;
use crate::px_to_percent;

/// Horizontal extent in percent of lane width (`left < right`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub left: f32,
    pub right: f32,
}

impl Span {
    /// Strict overlap; touching edges do not collide
    #[inline]
    pub fn overlaps(&self, other: &Span) -> bool {
        self.left < other.right && self.right > other.left
    }
}

/// The player's hitbox for a grid column
pub fn player_span(column: i32) -> Span {
    let left = column as f32 / PLAYER_X_MAX as f32 * 100.0;
    Span {
        left,
        right: left + px_to_percent(PLAYER_WIDTH_PX),
    }
}

/// A car's hitbox
pub fn car_span(car: &Car) -> Span {
    Span {
        left: car.x,
        right: car.x + px_to_percent(car.kind.width_px()),
    }
}

/// First car overlapping the player, if any. Only cars in the player's row count.
pub fn find_collision<'a>(player: GridPos, cars: &'a [Car]) -> Option<&'a Car> {
    let Ok(row) = usize::try_from(player.y) else {
        return None;
    };
    let hitbox = player_span(player.x);
    cars.iter()
        .filter(|car| car.lane_index == row)
        .find(|car| car_span(car).overlaps(&hitbox))
}

/// True if any car overlaps the player
#[inline]
pub fn detect_collision(player: GridPos, cars: &[Car]) -> bool {
    find_collision(player, cars).is_some()
}

//! Traffic entity store
//!
//! Owns every car of the current episode. Cars are created wholesale at
//! episode start and replaced wholesale on restart; nothing is spawned or
//! despawned mid-episode.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::lanes::Lane;
use crate::consts::*;

/// Car sprite kinds. Each maps to a fixed rendered width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarKind {
    #[default]
    Sedan,
    Van,
    Jeep,
}

impl CarKind {
    pub const ALL: [CarKind; 3] = [CarKind::Sedan, CarKind::Van, CarKind::Jeep];

    /// Rendered sprite width in pixels
    pub fn width_px(self) -> f32 {
        match self {
            CarKind::Sedan => SEDAN_WIDTH_PX,
            CarKind::Van => VAN_WIDTH_PX,
            CarKind::Jeep => JEEP_WIDTH_PX,
        }
    }
}

/// Car paint (cosmetic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarColor {
    Red,
    Amber,
    Green,
    Blue,
    Violet,
}

impl CarColor {
    pub const ALL: [CarColor; 5] = [
        CarColor::Red,
        CarColor::Amber,
        CarColor::Green,
        CarColor::Blue,
        CarColor::Violet,
    ];

    pub fn hex(self) -> &'static str {
        match self {
            CarColor::Red => "#ef4444",
            CarColor::Amber => "#f59e0b",
            CarColor::Green => "#22c55e",
            CarColor::Blue => "#3b82f6",
            CarColor::Violet => "#8b5cf6",
        }
    }
}

/// A car entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    /// Unique within one episode
    pub id: u32,
    /// Road lane this car drives in (fixed for its lifetime)
    pub lane_index: usize,
    /// Left edge, percent of lane width. Ranges over [WRAP_MIN, WRAP_MAX].
    pub x: f32,
    pub kind: CarKind,
    pub color: CarColor,
}

/// All cars of the running episode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrafficState {
    /// Cars in creation order (grouped by lane)
    pub cars: Vec<Car>,
    /// Episodes populated so far (1-based once populated)
    pub episode: u32,
    /// Next car ID, restarts every episode
    next_id: u32,
}

impl TrafficState {
    /// Create an empty store. Call `populate` to start an episode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new car ID for this episode
    fn next_car_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Throw away every car and sample a fresh set: `cars_per_lane` cars in
    /// every road lane with random position, kind and color.
    pub fn populate<R: Rng>(&mut self, lanes: &[Lane], cars_per_lane: usize, rng: &mut R) {
        self.cars.clear();
        self.next_id = 1;
        self.episode += 1;

        for (lane_index, lane) in lanes.iter().enumerate() {
            if !lane.is_corridor() {
                continue;
            }
            for _ in 0..cars_per_lane {
                let id = self.next_car_id();
                let x = rng.random_range(0.0..100.0);
                let kind = CarKind::ALL[rng.random_range(0..CarKind::ALL.len())];
                let color = CarColor::ALL[rng.random_range(0..CarColor::ALL.len())];
                self.cars.push(Car {
                    id,
                    lane_index,
                    x,
                    kind,
                    color,
                });
            }
        }

        log::debug!(
            "Episode {}: spawned {} cars ({} per road lane)",
            self.episode,
            self.cars.len(),
            cars_per_lane
        );
    }

    /// Cars driving in the given lane
    pub fn cars_in_lane(&self, lane_index: usize) -> impl Iterator<Item = &Car> {
        self.cars.iter().filter(move |c| c.lane_index == lane_index)
    }

    pub fn count_in_lane(&self, lane_index: usize) -> usize {
        self.cars_in_lane(lane_index).count()
    }
}

//! Static lane layout
//!
//! Lanes are ordered from the start row (index 0) to the goal row (last index).
//! The layout is never mutated while an episode runs.

use serde::{Deserialize, Serialize};

/// Terrain of a lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneKind {
    /// Safe ground, no traffic
    #[serde(rename = "GRASS")]
    Traversable,
    /// Road carrying cars
    #[serde(rename = "ROAD")]
    Corridor,
}

/// One horizontal row of the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    /// Ordinal position from start to goal
    pub id: usize,
    #[serde(rename = "type")]
    pub kind: LaneKind,
    /// Percent of lane width per reference frame. Positive drives right.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    /// Only consulted when spawning cars
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f32>,
}

impl Lane {
    pub fn grass(id: usize) -> Self {
        Self {
            id,
            kind: LaneKind::Traversable,
            speed: None,
            density: None,
        }
    }

    pub fn road(id: usize, speed: f32, density: f32) -> Self {
        Self {
            id,
            kind: LaneKind::Corridor,
            speed: Some(speed),
            density: Some(density),
        }
    }

    #[inline]
    pub fn is_corridor(&self) -> bool {
        self.kind == LaneKind::Corridor
    }

    /// Signed speed, zero for grass
    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed.unwrap_or(0.0)
    }
}

/// The stock 11-row layout: three road pairs separated by grass, goal on top.
pub fn default_lanes() -> Vec<Lane> {
    vec![
        Lane::grass(0),
        Lane::road(1, 0.15, 0.3),
        Lane::road(2, -0.2, 0.4),
        Lane::grass(3),
        Lane::road(4, 0.25, 0.2),
        Lane::road(5, -0.1, 0.5),
        Lane::grass(6),
        Lane::road(7, 0.3, 0.25),
        Lane::road(8, -0.25, 0.35),
        Lane::grass(9),
        Lane::grass(10), // Goal
    ]
}

/// Index of the goal row (reaching it wins the episode)
#[inline]
pub fn goal_row(lanes: &[Lane]) -> usize {
    lanes.len().saturating_sub(1)
}

//! Simulation clock and car advancement
//!
//! Motion is scaled by real elapsed time so traffic moves at the same speed
//! regardless of display refresh rate.

use super::lanes::Lane;
use super::state::Car;
use crate::consts::*;

/// Tracks the timestamp of the previous frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    /// `None` until the first frame of an episode has been seen
    last_frame_ms: Option<f64>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `now_ms` and return the time since the previous frame.
    ///
    /// Returns `None` on the first frame after creation or `reset`, so callers
    /// never advance against a missing timestamp. Timestamps that run
    /// backwards yield zero elapsed time.
    pub fn tick(&mut self, now_ms: f64) -> Option<f64> {
        let elapsed = self.last_frame_ms.map(|last| {
            let dt = now_ms - last;
            if dt < 0.0 {
                log::warn!("Frame timestamp went backwards ({:.3} -> {:.3})", last, now_ms);
                0.0
            } else {
                dt
            }
        });
        self.last_frame_ms = Some(now_ms);
        elapsed
    }

    /// Forget the previous timestamp (episode restart)
    pub fn reset(&mut self) {
        self.last_frame_ms = None;
    }

    pub fn is_unset(&self) -> bool {
        self.last_frame_ms.is_none()
    }
}

/// Wrap a position that left the extended window back in at the far edge
#[inline]
pub fn wrap_position(x: f32) -> f32 {
    if x > WRAP_MAX {
        WRAP_MIN
    } else if x < WRAP_MIN {
        WRAP_MAX
    } else {
        x
    }
}

/// Move every car by its lane speed scaled to `elapsed_ms`, then wrap.
pub fn advance_cars(cars: &mut [Car], lanes: &[Lane], elapsed_ms: f64) {
    let frames = (elapsed_ms / REFERENCE_FRAME_MS) as f32;
    for car in cars.iter_mut() {
        let speed = lanes.get(car.lane_index).map_or(0.0, Lane::speed);
        car.x = wrap_position(car.x + speed * frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::lanes::default_lanes;
    use crate::sim::state::{CarColor, CarKind};
    use proptest::prelude::*;

    fn car_at(lane_index: usize, x: f32) -> Car {
        Car {
            id: 1,
            lane_index,
            x,
            kind: CarKind::Sedan,
            color: CarColor::Red,
        }
    }

    #[test]
    fn test_first_tick_is_skipped() {
        let mut clock = SimClock::new();
        assert!(clock.is_unset());
        assert_eq!(clock.tick(5000.0), None);
        assert_eq!(clock.tick(5016.0), Some(16.0));
        assert_eq!(clock.tick(5048.0), Some(32.0));
    }

    #[test]
    fn test_reset_skips_next_tick() {
        let mut clock = SimClock::new();
        clock.tick(100.0);
        clock.tick(116.0);
        clock.reset();
        // A stale timestamp must not leak into the first frame after reset
        assert_eq!(clock.tick(90_000.0), None);
        assert_eq!(clock.tick(90_016.0), Some(16.0));
    }

    #[test]
    fn test_backwards_time_is_zero() {
        let mut clock = SimClock::new();
        clock.tick(200.0);
        assert_eq!(clock.tick(150.0), Some(0.0));
    }

    #[test]
    fn test_left_lane_ten_ticks() {
        // Lane 2 drives left at 0.2% per reference frame
        let lanes = default_lanes();
        let mut cars = vec![car_at(2, 5.0)];
        for _ in 0..10 {
            advance_cars(&mut cars, &lanes, 16.0);
        }
        assert!((cars[0].x - 3.0).abs() < 1e-4, "x = {}", cars[0].x);
    }

    #[test]
    fn test_wraparound_edges() {
        assert_eq!(wrap_position(110.01), WRAP_MIN);
        assert_eq!(wrap_position(-10.01), WRAP_MAX);
        assert_eq!(wrap_position(110.0), 110.0);
        assert_eq!(wrap_position(-10.0), -10.0);
        assert_eq!(wrap_position(42.0), 42.0);
    }

    #[test]
    fn test_grass_lane_does_not_move() {
        let lanes = default_lanes();
        let mut cars = vec![car_at(0, 50.0)];
        advance_cars(&mut cars, &lanes, 1000.0);
        assert_eq!(cars[0].x, 50.0);
    }

    proptest! {
        #[test]
        fn prop_positions_stay_in_window(
            start in WRAP_MIN..=WRAP_MAX,
            lane in 0usize..11,
            steps in proptest::collection::vec(0.0f64..5000.0, 1..50),
        ) {
            let lanes = default_lanes();
            let mut cars = vec![car_at(lane, start)];
            for dt in steps {
                advance_cars(&mut cars, &lanes, dt);
                prop_assert!(cars[0].x >= WRAP_MIN && cars[0].x <= WRAP_MAX);
            }
        }

        #[test]
        fn prop_frame_rate_invariant(
            start in 30.0f32..70.0,
            frame_ms in 4.0f64..40.0,
        ) {
            // Lane 5 is the slowest road (-0.1), so 8 doubled frames stay in window
            let lanes = default_lanes();
            let mut fast = vec![car_at(5, start)];
            let mut slow = vec![car_at(5, start)];
            for _ in 0..16 {
                advance_cars(&mut fast, &lanes, frame_ms);
            }
            for _ in 0..8 {
                advance_cars(&mut slow, &lanes, frame_ms * 2.0);
            }
            prop_assert!((fast[0].x - slow[0].x).abs() < 1e-3);
        }
    }
}

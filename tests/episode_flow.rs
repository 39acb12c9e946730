use std::cell::RefCell;
use std::rc::Rc;

use fluffle_crossing::consts::*;
use fluffle_crossing::sim::default_lanes;
use fluffle_crossing::{
    Direction, FrameScheduler, GridPos, Mount, MoveOutcome, Session, Settings, mount,
};

const FRAME_MS: f64 = 16.0;

fn mounted_session(seed: u64) -> (FrameScheduler, Rc<RefCell<Session>>, Mount) {
    let scheduler = FrameScheduler::new();
    let session = Rc::new(RefCell::new(Session::with_seed(default_lanes(), CARS_PER_LANE, seed)));
    let mounted = mount(&scheduler, &session);
    (scheduler, session, mounted)
}

/// Dispatch frames until the player is hit; returns the frame count
fn run_until_crash(
    scheduler: &FrameScheduler,
    session: &Rc<RefCell<Session>>,
    start_ms: f64,
) -> u32 {
    for i in 0..2000 {
        scheduler.dispatch(start_ms + i as f64 * FRAME_MS);
        if session.borrow().game().is_game_over {
            return i;
        }
    }
    panic!("player standing on a road was never hit");
}

#[test]
fn standing_on_road_crashes_exactly_once() {
    let (scheduler, session, _mounted) = mounted_session(1234);
    scheduler.dispatch(0.0);
    assert_eq!(
        session.borrow_mut().move_player(Direction::Forward),
        MoveOutcome::Moved(GridPos::new(5, 1))
    );

    run_until_crash(&scheduler, &session, FRAME_MS);

    // Cars keep driving through the player; no second notification
    for i in 0..300 {
        scheduler.dispatch(100_000.0 + i as f64 * FRAME_MS);
    }
    let s = session.borrow();
    assert_eq!(s.collisions(), 1);
    assert!(s.traffic().collision_fired());
    assert_eq!(s.game().logs.front().map(String::as_str), Some("CRASH! Oh no, Fluffle!"));
    assert_eq!(
        s.game().logs.iter().filter(|l| l.starts_with("CRASH")).count(),
        1
    );
}

#[test]
fn restart_starts_a_clean_episode() {
    let (scheduler, session, _mounted) = mounted_session(99);
    scheduler.dispatch(0.0);
    session.borrow_mut().move_player(Direction::Forward);
    let crashed_at = run_until_crash(&scheduler, &session, FRAME_MS);
    let last_ms = (crashed_at as f64 + 1.0) * FRAME_MS;

    session.borrow_mut().restart();
    {
        let s = session.borrow();
        assert!(!s.game().status().is_over());
        assert_eq!(s.game().player, GridPos::start());
        // Traffic is untouched until the next frame
        assert_eq!(s.traffic().episode(), 1);
        assert!(s.traffic().restart_signal().is_raised());
    }

    let before: Vec<_> = session.borrow().traffic().cars().to_vec();
    scheduler.dispatch(last_ms + 30_000.0);
    {
        let s = session.borrow();
        let report = s.last_report();
        assert!(report.restarted);
        assert!(!report.advanced);
        assert_eq!(s.traffic().episode(), 2);
        assert!(!s.traffic().collision_fired());
        assert!(!s.traffic().restart_signal().is_raised());
        assert_ne!(s.traffic().cars(), before.as_slice());
        for (idx, lane) in s.traffic().lanes().iter().enumerate() {
            let expected = if lane.is_corridor() { CARS_PER_LANE } else { 0 };
            assert_eq!(s.traffic().traffic().count_in_lane(idx), expected);
        }
        assert!(
            s.traffic()
                .cars()
                .iter()
                .all(|c| (0.0..100.0).contains(&c.x))
        );
    }

    // The new episode can crash again
    session.borrow_mut().move_player(Direction::Forward);
    run_until_crash(&scheduler, &session, last_ms + 30_000.0 + FRAME_MS);
    assert_eq!(session.borrow().collisions(), 2);
}

#[test]
fn reaching_the_goal_wins_and_ignores_traffic() {
    let settings = Settings::from_json(
        r#"{
            "seed": 5,
            "cars_per_lane": 6,
            "lanes": [
                { "id": 0, "type": "GRASS" },
                { "id": 1, "type": "ROAD", "speed": 0.5, "density": 0.9 },
                { "id": 2, "type": "GRASS" }
            ]
        }"#,
    )
    .unwrap();
    let scheduler = FrameScheduler::new();
    let session = Rc::new(RefCell::new(Session::new(&settings)));
    let _mounted = mount(&scheduler, &session);

    scheduler.dispatch(0.0);
    {
        let mut s = session.borrow_mut();
        // Two hops inside one frame gap: the road row is never sampled
        s.move_player(Direction::Forward);
        assert_eq!(s.move_player(Direction::Forward), MoveOutcome::Won(GridPos::new(5, 2)));
        assert_eq!(s.game().score, 2);
    }
    for i in 1..200 {
        scheduler.dispatch(i as f64 * FRAME_MS);
    }
    let s = session.borrow();
    assert!(s.game().is_won);
    assert!(!s.game().is_game_over);
    assert_eq!(s.collisions(), 0);
}

#[test]
fn traffic_speed_ignores_refresh_rate() {
    // 30 Hz and 120 Hz hosts over the same 960 ms
    let (slow_sched, slow, _slow_mount) = mounted_session(4242);
    let (fast_sched, fast, _fast_mount) = mounted_session(4242);
    for i in 0..=30 {
        slow_sched.dispatch(i as f64 * 32.0);
    }
    for i in 0..=120 {
        fast_sched.dispatch(i as f64 * 8.0);
    }

    let start = Session::with_seed(default_lanes(), CARS_PER_LANE, 4242);
    let slow = slow.borrow();
    let fast = fast.borrow();
    let mut compared = 0;
    for ((a, b), origin) in slow
        .traffic()
        .cars()
        .iter()
        .zip(fast.traffic().cars())
        .zip(start.traffic().cars())
    {
        assert_eq!(a.id, b.id);
        // Wrapped cars snap to the window edge; compare the rest
        if (a.x - origin.x).abs() < 30.0 && (b.x - origin.x).abs() < 30.0 {
            assert!((a.x - b.x).abs() < 2e-3, "car {}: {} vs {}", a.id, a.x, b.x);
            let lane = &default_lanes()[a.lane_index];
            let expected = origin.x + lane.speed() * 60.0;
            assert!((a.x - expected).abs() < 2e-3);
            compared += 1;
        }
    }
    assert!(compared > 0);
}

//! # End-to-End Drive-Movement Integration Test
//!
//! Exercises the full per-axis step-pulse pipeline: pooling a
//! `DriveMovement` per drive, preparing each from a shared `DDA`, and
//! stepping every drive to completion the way the step ISR would, one
//! drive at a time, in lockstep with the others.

use motion::platform::{StaticPlatform, StaticShaper};
use motion::segment::{MoveSegment, DDA};
use motion::{DriveHandle, DrivePool, State};

const X: usize = 0;
const Y: usize = 1;
const E: usize = 3;

#[test]
fn test_full_move_pipeline() {
    // 1. --- Setup: a pool sized for X, Y, and the extruder.
    let mut pool: DrivePool<4> = DrivePool::new();
    pool.initial_allocate(4).expect("seed pool");
    let platform = StaticPlatform {
        steps_per_mm: 100.0,
        min_calc_interval_cartesian: 50,
        min_calc_interval_delta: 50,
        even_steps: false,
    };
    let shaper = StaticShaper {
        extrusion_pending: 0.0,
        k: 0.02,
    };

    // 2. --- Plan a move: X travels 1mm forward, Y 0.5mm backward, both
    // riding a single accel/cruise/decel segment chain; the extruder
    // follows the same chain under pressure advance.
    let segments = [
        MoveSegment::accelerating(10.0, 100.0, 0.0, 0.2, true, false, false, Some(1)),
        MoveSegment::linear(80.0, 400.0, false, Some(2)),
        MoveSegment::accelerating(10.0, 100.0, 2.0, -0.2, false, false, true, None),
    ];
    let dda = DDA {
        axis_segments: &segments,
        extruder_segments: &segments,
        direction_vector: &[1.0, -1.0, 1.0, 1.0, 1.0],
        total_distance: 1.0,
        clocks_needed: 600,
    };

    // 3. --- Allocate and prepare one drive per axis.
    let x = pool.allocate(X, State::CartAccel).expect("allocate x");
    let y = pool.allocate(Y, State::CartAccel).expect("allocate y");
    let e = pool.allocate(E, State::CartAccel).expect("allocate e");

    assert!(pool.get_mut(x).unwrap().prepare_cartesian_axis(&dda, &platform));
    assert!(pool.get_mut(y).unwrap().prepare_cartesian_axis(&dda, &platform));
    assert!(pool.get_mut(e).unwrap().prepare_extruder(&dda, &shaper, &platform));

    assert_eq!(pool.get(x).unwrap().total_steps, 100);
    assert_eq!(pool.get(y).unwrap().total_steps, 100);
    assert!(pool.get(y).unwrap().direction == false, "Y runs in the negative direction");

    // 4. --- Drive every handle to completion, as the ISR would each tick.
    run_to_completion(&mut pool, x, &dda);
    run_to_completion(&mut pool, y, &dda);
    run_to_completion(&mut pool, e, &dda);

    // 5. --- Verify final positions and that drives return to the pool.
    assert_eq!(pool.get(x).unwrap().net_steps_taken(), 100);
    assert_eq!(pool.get(y).unwrap().net_steps_taken(), -100);
    assert_eq!(pool.get(e).unwrap().net_steps_taken(), 100);

    pool.release(x);
    pool.release(y);
    pool.release(e);
}

fn run_to_completion(pool: &mut DrivePool<4>, handle: DriveHandle, dda: &DDA) {
    let platform = StaticPlatform {
        steps_per_mm: 100.0,
        min_calc_interval_cartesian: 50,
        min_calc_interval_delta: 50,
        even_steps: false,
    };
    let dm = pool.get_mut(handle).unwrap();
    while dm.calc_next_step_time(dda, &platform) {}
    assert_eq!(dm.state, State::Idle);
}

//! Cartesian/extruder scenarios from spec.md §8.

use motion::platform::{StaticPlatform, StaticShaper};
use motion::segment::{MoveSegment, DDA};
use motion::{DriveMovement, State};

fn no_multistep_platform() -> StaticPlatform {
    // MIN thresholds of 1 clock mean step_interval (tens of clocks) never
    // drops below them, so shift stays 0 and every step is individually
    // recomputed — exercises the base per-step formula in isolation.
    StaticPlatform {
        steps_per_mm: 1.0,
        min_calc_interval_cartesian: 1,
        min_calc_interval_delta: 1,
        even_steps: false,
    }
}

/// Scenario 1: single-segment linear move, 100 steps, pB=10, pC=0.
#[test]
fn single_segment_linear_move() {
    let segments = [MoveSegment::linear(100.0, 1000.0, true, None)];
    let platform = no_multistep_platform();
    let dda = DDA {
        axis_segments: &segments,
        extruder_segments: &[],
        direction_vector: &[1.0, 1.0, 1.0, 1.0, 1.0],
        total_distance: 100.0,
        clocks_needed: 1000,
    };

    let mut dm = DriveMovement::new_idle(0);
    assert!(dm.prepare_cartesian_axis(&dda, &platform));
    assert_eq!(dm.total_steps, 100);
    assert_eq!(dm.state, State::CartLinear);
    assert!((dm.p_b() - 10.0).abs() < 1e-9);
    assert!(dm.p_c().abs() < 1e-9);

    let mut k = 1;
    loop {
        assert_eq!(dm.next_step, k);
        assert!(
            (dm.next_step_time as f64 - 10.0 * k as f64).abs() <= 1.0,
            "step {k} due at {}, expected ~{}",
            dm.next_step_time,
            10 * k
        );
        if !dm.calc_next_step_time(&dda, &platform) {
            break;
        }
        k += 1;
    }
    assert_eq!(dm.next_step, 101, "final next_step == total_steps + 1");
    assert_eq!(dm.state, State::Idle);
    assert_eq!(dm.next_step_time, 1000);
}

fn build_accel_cruise_decel() -> [MoveSegment; 3] {
    [
        MoveSegment::accelerating(100.0, 100.0, 0.0, 0.02, true, false, false, Some(1)),
        MoveSegment::linear(400.0, 200.0, false, Some(2)),
        MoveSegment::accelerating(100.0, 100.0, 2.0, -0.02, false, false, true, None),
    ]
}

/// Scenario 2: accel + cruise + decel, 600 steps across three segments.
#[test]
fn accel_cruise_decel_transitions() {
    let segments = build_accel_cruise_decel();
    let platform = no_multistep_platform();
    let dda = DDA {
        axis_segments: &segments,
        extruder_segments: &[],
        direction_vector: &[1.0, 1.0, 1.0, 1.0, 1.0],
        total_distance: 600.0,
        clocks_needed: 400,
    };

    let mut dm = DriveMovement::new_idle(0);
    assert!(dm.prepare_cartesian_axis(&dda, &platform));
    assert_eq!(dm.total_steps, 600);
    assert_eq!(dm.state, State::CartAccel);

    let mut seen_states = vec![dm.state];
    let mut prev_time = dm.next_step_time;
    loop {
        if !dm.calc_next_step_time(&dda, &platform) {
            break;
        }
        assert!(dm.next_step_time >= prev_time, "due times must be non-decreasing");
        prev_time = dm.next_step_time;
        if seen_states.last() != Some(&dm.state) {
            seen_states.push(dm.state);
        }
    }

    assert_eq!(
        seen_states,
        vec![State::CartAccel, State::CartLinear, State::CartDecelForwards]
    );
    assert_eq!(dm.next_step, 601);
    assert_eq!(dm.state, State::Idle);
}

/// Scenario 3: extruder with pressure advance K=0.04.
#[test]
fn extruder_with_pressure_advance() {
    let segments = build_accel_cruise_decel();
    let platform = no_multistep_platform();
    let shaper = StaticShaper {
        extrusion_pending: 0.0,
        k: 0.04,
    };
    let dda = DDA {
        axis_segments: &[],
        extruder_segments: &segments,
        direction_vector: &[1.0, 1.0, 1.0, 1.0, 1.0],
        total_distance: 600.0,
        clocks_needed: 400,
    };

    let mut dm = DriveMovement::new_idle(3);
    assert!(dm.prepare_extruder(&dda, &shaper, &platform));
    assert!(dm.is_extruder);
    assert!((dm.cart_pressure_advance_k() - 0.04).abs() < 1e-12);

    let mut prev_time = dm.next_step_time;
    while dm.calc_next_step_time(&dda, &platform) {
        assert!(dm.next_step_time >= prev_time);
        prev_time = dm.next_step_time;
    }
    assert_eq!(dm.state, State::Idle);
    assert_eq!(dm.next_step, 601);
}

/// Scenario 6: a decel segment whose final-step formula overshoots
/// `clocks_needed` by a few clocks must clamp, not error.
#[test]
fn late_final_step_is_clamped_not_errored() {
    // Decel segment that coasts to a full stop exactly at its 100th step
    // (start_speed=2.0, accel=-0.02: stopping distance v^2/(2|a|) = 100mm,
    // natural stopping time v/|a| = 100 clocks). clocks_needed is set a few
    // clocks short of that, so only the final step overshoots and clamps.
    let segments = [MoveSegment::accelerating(
        100.0, 100.0, 2.0, -0.02, false, false, true, None,
    )];
    let platform = no_multistep_platform();
    let dda = DDA {
        axis_segments: &segments,
        extruder_segments: &[],
        direction_vector: &[1.0, 1.0, 1.0, 1.0, 1.0],
        total_distance: 100.0,
        clocks_needed: 95, // intentionally short of the natural stop time
    };

    let mut dm = DriveMovement::new_idle(0);
    assert!(dm.prepare_cartesian_axis(&dda, &platform));
    while dm.calc_next_step_time(&dda, &platform) {}
    assert_eq!(dm.state, State::Idle, "late-step tolerance must not enter step_error");
    assert_eq!(dm.next_step_time, 95, "clamped to clocks_needed");
}

/// Scenario 7: multi-stepping activation once the observed interval drops
/// below MIN_CALC_INTERVAL_CARTESIAN/4 with plenty of steps remaining.
#[test]
fn multi_stepping_activates_and_caches_interval() {
    // A long cruise at a fast, constant rate: once step_interval < MIN/4
    // with > 8 steps_to_limit, shift = 3 and steps_till_recalc = 7.
    let segments = [MoveSegment::linear(1_000.0, 2_000.0, true, None)];
    let platform = StaticPlatform {
        steps_per_mm: 1.0,
        min_calc_interval_cartesian: 16,
        min_calc_interval_delta: 16,
        even_steps: false,
    };
    let dda = DDA {
        axis_segments: &segments,
        extruder_segments: &[],
        direction_vector: &[1.0, 1.0, 1.0, 1.0, 1.0],
        total_distance: 1_000.0,
        clocks_needed: 2_000,
    };

    let mut dm = DriveMovement::new_idle(0);
    assert!(dm.prepare_cartesian_axis(&dda, &platform));
    // Step interval here is 2 clocks/step, well under MIN/4 = 4, and
    // steps_to_limit (~999) is comfortably over 8.
    assert_eq!(dm.steps_till_recalc, 7, "shift 3 batches 8 steps (7 cached)");
    let cached_interval = dm.step_interval;
    for _ in 0..7 {
        let before = dm.next_step_time;
        assert!(dm.calc_next_step_time(&dda, &platform));
        assert_eq!(dm.next_step_time, before + cached_interval);
    }
}

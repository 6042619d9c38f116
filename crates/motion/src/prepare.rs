//! Preparing a move: `prepare_cartesian_axis`, `prepare_extruder`,
//! `prepare_delta_axis` (spec.md §4.2).

use crate::drive::{CartesianParams, DeltaParams, DriveMovement, ModeParams, State};
use crate::platform::{ExtruderShaper, Platform};
use crate::segment::{DDA, DeltaPrepareParams};

const NO_REVERSE_SENTINEL_BIAS: u32 = 1;

impl DriveMovement {
    fn start_motion_loop(&mut self, dda: &DDA, platform: &dyn Platform) -> bool {
        self.next_step = 0;
        self.next_step_time = 0;
        self.step_interval = u32::MAX;
        self.steps_till_recalc = 0;
        self.reverse_start_step = self.total_steps + NO_REVERSE_SENTINEL_BIAS;
        self.calc_next_step_time(dda, platform)
    }

    /// Seeds Cartesian axis state and schedules the first step.
    pub fn prepare_cartesian_axis(&mut self, dda: &DDA, platform: &dyn Platform) -> bool {
        self.distance_so_far = 0.0;
        self.time_so_far = 0.0;
        self.is_delta = false;
        self.is_extruder = false;

        let steps_per_mm = platform.steps_per_mm(self.drive);
        let effective_steps_per_mm = steps_per_mm * dda.direction_vector[self.drive];
        self.effective_mm_per_step = 1.0 / effective_steps_per_mm.abs();
        self.total_steps = (dda.total_distance * effective_steps_per_mm).abs() as u32;
        self.direction = effective_steps_per_mm >= 0.0;
        self.mode = ModeParams::Cartesian(CartesianParams {
            pressure_advance_k: 0.0,
            effective_steps_per_mm,
            ..Default::default()
        });

        self.current_segment = if dda.axis_segments.is_empty() { None } else { Some(0) };
        if !self.advance_segment_cartesian(dda) {
            self.state = State::Idle;
            return false;
        }
        self.start_motion_loop(dda, platform)
    }

    /// As Cartesian, but `distance_so_far`/`pressure_advance_k` are seeded
    /// from the extruder shaper and the chain walked is `extruder_segments`.
    pub fn prepare_extruder(&mut self, dda: &DDA, shaper: &dyn ExtruderShaper, platform: &dyn Platform) -> bool {
        self.distance_so_far = shaper.extrusion_pending();
        self.time_so_far = 0.0;
        self.is_delta = false;
        self.is_extruder = true;

        let steps_per_mm = platform.steps_per_mm(self.drive);
        let effective_steps_per_mm = steps_per_mm * dda.direction_vector[self.drive];
        self.effective_mm_per_step = 1.0 / effective_steps_per_mm.abs();
        self.total_steps = (dda.total_distance * effective_steps_per_mm).abs() as u32;
        self.direction = effective_steps_per_mm >= 0.0;
        self.mode = ModeParams::Cartesian(CartesianParams {
            pressure_advance_k: shaper.k(),
            effective_steps_per_mm,
            ..Default::default()
        });

        self.current_segment = if dda.extruder_segments.is_empty() { None } else { Some(0) };
        if !self.advance_segment_cartesian(dda) {
            self.state = State::Idle;
            return false;
        }
        self.start_motion_loop(dda, platform)
    }

    /// Computes tower-geometry constants and the potential reversal point
    /// (spec.md §4.2 steps 1-4), then seeds the motion loop.
    pub fn prepare_delta_axis(&mut self, dda: &DDA, params: &DeltaPrepareParams, platform: &dyn Platform) -> bool {
        self.distance_so_far = 0.0;
        self.time_so_far = 0.0;
        self.is_delta = true;
        self.is_extruder = false;

        let steps_per_mm = platform.steps_per_mm(self.drive);
        self.effective_mm_per_step = 1.0 / steps_per_mm;

        let a = params.initial_x - params.tower_x;
        let b = params.initial_y - params.tower_y;
        let a_abs_bb = a * params.dx + b * params.dy;
        let d_sq_minus_a_sq_minus_b_sq = params.diagonal_sq - a * a - b * b;
        let h0_minus_z0 = d_sq_minus_a_sq_minus_b_sq.max(0.0).sqrt();

        self.total_steps = params.total_steps;

        if params.a2_plus_b2 <= 0.0 {
            // Pure-Z move: no XY projection, so no reversal is possible.
            self.direction = params.dz >= 0.0;
            self.reverse_start_step = self.total_steps + NO_REVERSE_SENTINEL_BIAS;
        } else {
            let discriminant = params.a2_plus_b2 * params.diagonal_sq - (a * params.dy - b * params.dx).powi(2);
            let d_rev = (params.dz * discriminant.max(0.0).sqrt() - a_abs_bb) / params.a2_plus_b2;

            if d_rev > 0.0 && d_rev < dda.total_distance {
                let h_rev = params.dz * d_rev
                    + (d_sq_minus_a_sq_minus_b_sq - 2.0 * d_rev * a_abs_bb - params.a2_plus_b2 * d_rev * d_rev)
                        .max(0.0)
                        .sqrt();
                let num_steps_up = ((h_rev - h0_minus_z0) * steps_per_mm).floor();

                let already_going_up = params.dz >= 0.0;
                if num_steps_up < 1.0 || (already_going_up && num_steps_up as u32 <= self.total_steps) {
                    self.direction = false;
                    self.reverse_start_step = self.total_steps + NO_REVERSE_SENTINEL_BIAS;
                } else {
                    let num_steps_up = num_steps_up as u32;
                    self.reverse_start_step = num_steps_up + NO_REVERSE_SENTINEL_BIAS;
                    if already_going_up {
                        self.total_steps = 2 * num_steps_up - self.total_steps;
                    } else {
                        self.direction = true;
                        self.total_steps = 2 * num_steps_up + self.total_steps;
                    }
                }
            } else {
                self.direction = d_rev <= 0.0;
                self.reverse_start_step = self.total_steps + NO_REVERSE_SENTINEL_BIAS;
            }
        }

        self.mode = ModeParams::Delta(DeltaParams {
            f_two_a: 2.0 * a,
            f_two_b: 2.0 * b,
            h0_minus_z0,
            f_d_sq_minus_a_sq_minus_b_sq_times_s_sq: d_sq_minus_a_sq_minus_b_sq * steps_per_mm * steps_per_mm,
            f_hmz0s: h0_minus_z0 * steps_per_mm,
            f_minus_aa_plus_bb_times_s: -a_abs_bb * steps_per_mm,
            dx: params.dx,
            dy: params.dy,
            dz: params.dz,
            steps_per_mm,
        });

        self.current_segment = if dda.axis_segments.is_empty() { None } else { Some(0) };
        if !self.advance_segment_delta(dda) {
            self.state = State::Idle;
            return false;
        }

        // start_motion_loop would overwrite reverse_start_step with the
        // "no reversal" sentinel; delta already computed its real value.
        self.next_step = 0;
        self.next_step_time = 0;
        self.step_interval = u32::MAX;
        self.steps_till_recalc = 0;
        self.calc_next_step_time(dda, platform)
    }
}

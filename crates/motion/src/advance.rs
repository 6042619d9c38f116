//! Segment-transition logic (spec.md §4.4, §4.5).

use crate::drive::{DriveMovement, State};
use crate::segment::DDA;

impl DriveMovement {
    pub(crate) fn segments<'a>(&self, dda: &'a DDA) -> &'a [crate::segment::MoveSegment] {
        if self.is_extruder {
            dda.extruder_segments
        } else {
            dda.axis_segments
        }
    }

    /// Walks `current_segment` forward, skipping phases this drive makes
    /// no progress in, until one is accepted or the chain ends.
    pub(crate) fn advance_segment_cartesian(&mut self, dda: &DDA) -> bool {
        loop {
            let Some(idx) = self.current_segment else {
                return false;
            };
            let seg = self.segments(dda)[idx];

            let start_distance = self.distance_so_far;
            let start_time = self.time_so_far;
            self.distance_so_far += seg.segment_length;
            self.time_so_far += seg.segment_time;

            let effective_steps_per_mm = self.cart().effective_steps_per_mm;
            let phase_step_limit = (self.distance_so_far * effective_steps_per_mm).abs() as u32;

            if self.next_step < phase_step_limit {
                self.segment_step_limit = phase_step_limit;
                let eff_mm_per_step = self.effective_mm_per_step;
                let pressure_advance_k = self.cart().pressure_advance_k;
                let b_coeff = seg.calc_c(eff_mm_per_step);

                if seg.is_linear {
                    self.p_b = b_coeff;
                    self.p_c = seg.calc_linear_b(start_distance, start_time);
                    self.state = State::CartLinear;
                } else {
                    self.p_a = seg.calc_nonlinear_a(start_distance);
                    self.p_b = b_coeff;
                    self.p_c = seg.calc_nonlinear_b(start_time, pressure_advance_k);
                    self.state = if seg.is_reverse {
                        State::CartDecelReverse
                    } else if seg.is_accelerating {
                        State::CartAccel
                    } else {
                        State::CartDecelForwards
                    };
                }

                if seg.is_reverse {
                    self.direction = !self.direction;
                    self.direction_changed = true;
                }

                self.current_segment = Some(idx);
                return true;
            }

            match seg.next {
                Some(next_idx) => self.current_segment = Some(next_idx),
                None => return false,
            }
        }
    }

    /// Delta analogue of [`Self::advance_segment_cartesian`]: the carriage
    /// height is a non-linear function of the projected XY distance, so
    /// acceptance is decided by `net_steps_at_end` rather than a simple
    /// distance truncation.
    pub(crate) fn advance_segment_delta(&mut self, dda: &DDA) -> bool {
        loop {
            let Some(idx) = self.current_segment else {
                return false;
            };
            let seg = self.segments(dda)[idx];

            let start_distance = self.distance_so_far;
            let start_time = self.time_so_far;
            self.distance_so_far += seg.segment_length;

            let (dx, dy, dz, steps_per_mm, two_a, two_b, h0_minus_z0, d_sq_term) = {
                let d = self.delta_mut();
                (
                    d.dx,
                    d.dy,
                    d.dz,
                    d.steps_per_mm,
                    d.f_two_a,
                    d.f_two_b,
                    d.h0_minus_z0,
                    d.f_d_sq_minus_a_sq_minus_b_sq_times_s_sq,
                )
            };
            let s_dx = self.distance_so_far * dx;
            let s_dy = self.distance_so_far * dy;
            let radial = d_sq_term - steps_per_mm * steps_per_mm * (s_dx * (s_dx + two_a) + s_dy * (s_dy + two_b));
            let net_steps_at_end =
                radial.max(0.0).sqrt() + (self.distance_so_far * dz - h0_minus_z0) * steps_per_mm;

            // time_so_far is incremented after net_steps_at_end, preserving
            // the source behaviour noted as an open question (spec.md §9).
            self.time_so_far += seg.segment_time;

            if (self.next_step as f64) < net_steps_at_end {
                let eff_mm_per_step = self.effective_mm_per_step;
                let b_coeff = seg.calc_c(eff_mm_per_step);
                if seg.is_linear {
                    self.p_b = b_coeff;
                    self.p_c = seg.calc_linear_b(start_distance, start_time);
                } else {
                    self.p_a = seg.calc_nonlinear_a(start_distance);
                    self.p_b = b_coeff;
                    self.p_c = seg.calc_nonlinear_b(start_time, 0.0);
                }

                self.state = if self.direction {
                    State::DeltaForwards
                } else {
                    State::DeltaReverse
                };
                // Mirrors the Cartesian convention exactly: the limit is the
                // exact last valid step index of this phase, not one past
                // it. Mid-segment reversal is clamped separately in
                // `calc_next_step_time` via `reverse_start_step`, so it
                // plays no part in this value.
                self.segment_step_limit = if seg.is_last {
                    self.total_steps
                } else {
                    net_steps_at_end as u32
                };

                self.current_segment = Some(idx);
                return true;
            }

            match seg.next {
                Some(next_idx) => self.current_segment = Some(next_idx),
                None => return false,
            }
        }
    }
}

//! The step-time kernel: `calc_next_step_time` (spec.md §4.6).

use crate::drive::{DriveMovement, State};
use crate::platform::Platform;
use crate::segment::DDA;

impl DriveMovement {
    /// Outer wrapper: the hot inline path for multi-stepping, falling back
    /// to [`Self::recalc`] when the cached batch is exhausted.
    pub fn calc_next_step_time(&mut self, dda: &DDA, platform: &dyn Platform) -> bool {
        self.direction_changed = false;
        self.next_step += 1;

        if self.steps_till_recalc > 0 {
            self.steps_till_recalc -= 1;
            self.next_step_time += self.step_interval;
            return true;
        }

        if !self.recalc(dda, platform) {
            self.state = State::Idle;
            return false;
        }
        true
    }

    fn recalc(&mut self, dda: &DDA, platform: &dyn Platform) -> bool {
        if !self.state.is_motion() {
            return false;
        }

        let mut steps_to_limit = self.segment_step_limit.saturating_sub(self.next_step);

        // Step 4: delta reversal mid-segment.
        if self.is_delta && self.reverse_start_step <= self.total_steps {
            if self.next_step == self.reverse_start_step {
                self.direction = !self.direction;
                self.direction_changed = true;
                self.state = State::DeltaReverse;
            } else {
                steps_to_limit = steps_to_limit.min(self.reverse_start_step.saturating_sub(self.next_step));
            }
        }

        // Step 2: adaptive shift factor.
        let min_interval = if self.is_delta {
            platform.min_calc_interval_delta()
        } else {
            platform.min_calc_interval_cartesian()
        };
        let mut shift: u32 = 0;
        if steps_to_limit > 1 && self.step_interval < min_interval {
            if self.is_delta && self.step_interval < min_interval / 8 && steps_to_limit > 16 {
                shift = 4;
            } else if self.step_interval < min_interval / 4 && steps_to_limit > 8 {
                shift = 3;
            } else if self.step_interval < min_interval / 2 && steps_to_limit > 4 {
                shift = 2;
            } else if steps_to_limit > 2 {
                shift = 1;
            }
        }
        self.steps_till_recalc = (1u32 << shift) - 1;

        let n = (self.next_step + self.steps_till_recalc) as f64;

        // Step 3: per-state step-time formula. A decelerating phase has
        // negative `accel`, which flips the sign of `p_b`/`p_c` relative to
        // an accelerating one (see `MoveSegment::calc_c` et al.) — forwards
        // and reverse decel share the same segment-local coefficients and
        // so share the same (minus) branch; only `CartAccel`'s positive
        // `accel` takes the plus branch.
        let next_calc_step_time = match self.state {
            State::CartAccel => self.p_c + (self.p_a + self.p_b * n).max(0.0).sqrt(),
            State::CartLinear => self.p_b * n + self.p_c,
            State::CartDecelForwards | State::CartDecelReverse => {
                self.p_c - (self.p_a + self.p_b * n).max(0.0).sqrt()
            }
            State::DeltaForwards | State::DeltaReverse => {
                let sign = if self.direction { 1.0 } else { -1.0 };
                let (t1, radial) = {
                    let d = self.delta_mut();
                    d.f_hmz0s += sign * (1u32 << shift) as f64;
                    let t1 = d.f_minus_aa_plus_bb_times_s + d.f_hmz0s * d.dz;
                    let radial = d.f_d_sq_minus_a_sq_minus_b_sq_times_s_sq - d.f_hmz0s * d.f_hmz0s + t1 * t1;
                    (t1, radial)
                };
                let t2 = radial.max(0.0).sqrt();
                let ds = if self.direction { t1 - t2 } else { t1 + t2 };
                if ds < 0.0 {
                    self.state = State::StepError;
                    self.next_step += 1_000_000;
                    return false;
                }
                let seg_is_linear = self
                    .current_segment
                    .map(|idx| self.segments(dda)[idx].is_linear)
                    .unwrap_or(false);
                if seg_is_linear {
                    self.p_b * ds + self.p_c
                } else {
                    match self.state {
                        State::DeltaForwards => self.p_c + (self.p_a + self.p_b * ds).max(0.0).sqrt(),
                        State::DeltaReverse => self.p_c - (self.p_a + self.p_b * ds).max(0.0).sqrt(),
                        _ => unreachable!(),
                    }
                }
            }
            State::Idle | State::StepError => unreachable!("recalc only runs while in a motion state"),
        };

        // Step 5: interval update.
        self.step_interval = if next_calc_step_time > self.next_step_time as f64 {
            ((next_calc_step_time - self.next_step_time as f64) as u32) >> shift
        } else {
            0
        };
        let mut next_step_time_computed = next_calc_step_time;
        if platform.even_steps() {
            next_step_time_computed -= (self.steps_till_recalc * self.step_interval) as f64;
        }

        // Step 6: late-step tolerance.
        if next_calc_step_time > dda.clocks_needed as f64 {
            if self.next_step + 1 >= self.total_steps {
                next_step_time_computed = dda.clocks_needed as f64;
            } else {
                self.state = State::StepError;
                self.step_interval = 10_000_000 + self.next_step_time;
                return false;
            }
        }
        self.next_step_time = next_step_time_computed as u32;

        // Step 7: end-of-segment rollover.
        if steps_to_limit == 0 {
            self.current_segment = self
                .current_segment
                .and_then(|idx| self.segments(dda)[idx].next);
            let advanced = if self.is_delta {
                self.advance_segment_delta(dda)
            } else {
                self.advance_segment_cartesian(dda)
            };
            if !advanced {
                if self.next_step >= self.total_steps {
                    // The chain is exhausted exactly where the move was
                    // always going to end; this step still completes
                    // normally, the *next* call sees `Idle` and stops.
                    self.state = State::Idle;
                } else {
                    self.state = State::StepError;
                    self.step_interval = 20_000_000 + self.next_step_time;
                    return false;
                }
            }
        }

        true
    }
}

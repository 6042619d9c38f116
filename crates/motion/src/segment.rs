//! `MoveSegment` and `DDA`: the planner's output, read-only from here.
//!
//! The planner that builds these chains is out of scope (spec.md §1); this
//! module only needs a concrete, constructible segment type whose four
//! coefficient builders satisfy the formulas `DriveMovement` evaluates.
//! Segments form a singly-linked chain via `next`, indexing into the same
//! slice rather than using a heap pointer — the arena the `DDA` hands us is
//! itself externally owned for the lifetime of the move.

/// One kinematic phase (accel, cruise, or decel) of a move.
#[derive(Debug, Clone, Copy)]
pub struct MoveSegment {
    pub segment_length: f64,
    pub segment_time: f64,
    pub is_linear: bool,
    pub is_accelerating: bool,
    pub is_reverse: bool,
    pub is_last: bool,
    pub next: Option<usize>,
    start_speed: f64,
    accel: f64,
}

impl MoveSegment {
    /// A constant-velocity (cruise) phase.
    pub fn linear(segment_length: f64, segment_time: f64, is_last: bool, next: Option<usize>) -> Self {
        MoveSegment {
            segment_length,
            segment_time,
            is_linear: true,
            is_accelerating: false,
            is_reverse: false,
            is_last,
            next,
            start_speed: segment_length / segment_time,
            accel: 0.0,
        }
    }

    /// A constant-acceleration phase (accel, decel-forwards, or
    /// decel-reverse, selected by `is_accelerating`/`is_reverse`).
    #[allow(clippy::too_many_arguments)]
    pub fn accelerating(
        segment_length: f64,
        segment_time: f64,
        start_speed: f64,
        accel: f64,
        is_accelerating: bool,
        is_reverse: bool,
        is_last: bool,
        next: Option<usize>,
    ) -> Self {
        MoveSegment {
            segment_length,
            segment_time,
            is_linear: false,
            is_accelerating,
            is_reverse,
            is_last,
            next,
            start_speed,
            accel,
        }
    }

    fn velocity(&self) -> f64 {
        self.segment_length / self.segment_time
    }

    /// Per-step scale factor applied to the step index `n`. Despite the
    /// name, this value always feeds the drive's `pB` (the term
    /// multiplied by `n`), for both the linear and non-linear formulas —
    /// the corpus's own header/`.cpp` field-suffix drift (spec.md §9) is
    /// mirrored here deliberately; see DESIGN.md.
    pub fn calc_c(&self, effective_mm_per_step: f64) -> f64 {
        if self.accel == 0.0 {
            effective_mm_per_step / self.velocity()
        } else {
            2.0 * effective_mm_per_step / self.accel
        }
    }

    /// Linear-segment time intercept; feeds the drive's `pC`.
    pub fn calc_linear_b(&self, start_distance: f64, start_time: f64) -> f64 {
        start_time - start_distance / self.velocity()
    }

    /// Non-linear in-sqrt constant term; feeds the drive's `pA`.
    pub fn calc_nonlinear_a(&self, start_distance: f64) -> f64 {
        let apex = self.start_speed / self.accel;
        apex * apex - 2.0 * start_distance / self.accel
    }

    /// Non-linear time intercept, biased by pressure advance; feeds the
    /// drive's `pC`.
    pub fn calc_nonlinear_b(&self, start_time: f64, pressure_advance_k: f64) -> f64 {
        start_time - self.start_speed / self.accel - pressure_advance_k
    }
}

/// The owning move descriptor: segment chains, direction cosines, and the
/// whole-move time budget.
pub struct DDA<'a> {
    pub axis_segments: &'a [MoveSegment],
    pub extruder_segments: &'a [MoveSegment],
    pub direction_vector: &'a [f64],
    pub total_distance: f64,
    pub clocks_needed: u32,
}

/// Per-drive inputs needed only by `prepare_delta_axis`.
#[derive(Debug, Clone, Copy)]
pub struct DeltaPrepareParams {
    pub initial_x: f64,
    pub initial_y: f64,
    pub tower_x: f64,
    pub tower_y: f64,
    pub diagonal_sq: f64,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub a2_plus_b2: f64,
    /// Naive (non-reversal-adjusted) total step count, as computed by the
    /// planner from the move's net carriage-height change.
    pub total_steps: u32,
}

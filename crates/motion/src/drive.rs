//! `DriveMovement`: the per-drive step-pulse state machine (spec.md §3-§4).

use core::fmt;

/// FSM states (spec.md §4.3). Motion states are chosen inside
/// segment-advance from the segment's own flags; `idle`/`step_error` are
/// the only terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    StepError,
    CartAccel,
    CartLinear,
    CartDecelForwards,
    CartDecelReverse,
    DeltaForwards,
    DeltaReverse,
}

impl State {
    pub fn is_motion(self) -> bool {
        !matches!(self, State::Idle | State::StepError)
    }
}

/// Cartesian/extruder-only parameters (spec.md §3, "Cartesian sub-record").
#[derive(Debug, Clone, Copy, Default)]
pub struct CartesianParams {
    pub pressure_advance_k: f64,
    pub effective_steps_per_mm: f64,
    pub extruder_speed: f64,
    pub extruder_reverse_steps: u32,
    pub extrusion_brought_forwards: f64,
}

/// Delta-only geometry state (spec.md §3, "Delta sub-record").
#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaParams {
    pub f_two_a: f64,
    pub f_two_b: f64,
    pub h0_minus_z0: f64,
    pub f_d_sq_minus_a_sq_minus_b_sq_times_s_sq: f64,
    pub f_hmz0s: f64,
    pub f_minus_aa_plus_bb_times_s: f64,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub steps_per_mm: f64,
}

/// The `mp` field: a discriminated union keyed by `is_delta`/`is_extruder`
/// (spec.md §9 calls out the tagged-variant replacement for the C union
/// directly; this is that replacement).
#[derive(Debug, Clone, Copy)]
pub enum ModeParams {
    Cartesian(CartesianParams),
    Delta(DeltaParams),
}

impl Default for ModeParams {
    fn default() -> Self {
        ModeParams::Cartesian(CartesianParams::default())
    }
}

/// One motor's step-pulse state machine for the currently active move.
///
/// Owned either by exactly one active [`crate::segment::DDA`] or by the
/// pool's free list, never both (spec.md §3 invariants).
#[derive(Debug, Clone, Copy)]
pub struct DriveMovement {
    pub state: State,
    pub drive: usize,
    pub direction: bool,
    pub direction_changed: bool,
    pub is_delta: bool,
    pub is_extruder: bool,

    pub total_steps: u32,
    pub next_step: u32,
    pub segment_step_limit: u32,
    pub reverse_start_step: u32,

    pub next_step_time: u32,
    pub step_interval: u32,
    pub steps_till_recalc: u32,

    pub(crate) current_segment: Option<usize>,
    pub(crate) distance_so_far: f64,
    pub(crate) time_so_far: f64,

    pub(crate) p_a: f64,
    pub(crate) p_b: f64,
    pub(crate) p_c: f64,
    pub(crate) effective_mm_per_step: f64,

    pub(crate) mode: ModeParams,

    /// Intrusive link: free-list next pointer while on the pool's free
    /// list, unused (`None`) while owned by an active move.
    pub(crate) next_dm: Option<usize>,
}

impl DriveMovement {
    /// A freshly-constructed, idle instance — used by the pool when
    /// growing the arena.
    pub fn new_idle(drive: usize) -> Self {
        DriveMovement {
            state: State::Idle,
            drive,
            direction: true,
            direction_changed: false,
            is_delta: false,
            is_extruder: false,
            total_steps: 0,
            next_step: 0,
            segment_step_limit: 0,
            reverse_start_step: 1,
            next_step_time: 0,
            step_interval: u32::MAX,
            steps_till_recalc: 0,
            current_segment: None,
            distance_so_far: 0.0,
            time_so_far: 0.0,
            p_a: 0.0,
            p_b: 0.0,
            p_c: 0.0,
            effective_mm_per_step: 0.0,
            mode: ModeParams::default(),
            next_dm: None,
        }
    }

    /// Re-initialises a pooled instance for a new owner, mirroring
    /// `allocate(drive, state)` (spec.md §4.1).
    pub(crate) fn reset_for(&mut self, drive: usize, state: State) {
        *self = DriveMovement::new_idle(drive);
        self.state = state;
    }

    pub(crate) fn cart(&self) -> &CartesianParams {
        match &self.mode {
            ModeParams::Cartesian(c) => c,
            ModeParams::Delta(_) => unreachable!("cart() called on a delta drive"),
        }
    }

    pub(crate) fn cart_mut(&mut self) -> &mut CartesianParams {
        match &mut self.mode {
            ModeParams::Cartesian(c) => c,
            ModeParams::Delta(_) => unreachable!("cart_mut() called on a delta drive"),
        }
    }

    pub(crate) fn delta_mut(&mut self) -> &mut DeltaParams {
        match &mut self.mode {
            ModeParams::Delta(d) => d,
            ModeParams::Cartesian(_) => unreachable!("delta_mut() called on a cartesian drive"),
        }
    }

    /// The in-sqrt constant term of the currently active segment's
    /// step-time formula.
    pub fn p_a(&self) -> f64 {
        self.p_a
    }

    /// The per-step-index scale factor of the currently active segment's
    /// step-time formula.
    pub fn p_b(&self) -> f64 {
        self.p_b
    }

    /// The time-intercept term of the currently active segment's step-time
    /// formula.
    pub fn p_c(&self) -> f64 {
        self.p_c
    }

    /// The pressure-advance `K` this drive was prepared with. Panics if
    /// called on a delta drive, which has no such concept.
    pub fn cart_pressure_advance_k(&self) -> f64 {
        self.cart().pressure_advance_k
    }

    /// Net signed step count so far (spec.md §4.7), needed for position
    /// reporting while a move is in flight or just after it completes.
    ///
    /// Every step before the reversal point adds 1; every step after it
    /// undoes one of those, so the count folds back down from its peak at
    /// `reverse_start_step - 1` rather than continuing to climb.
    pub fn net_steps_taken(&self) -> i64 {
        let mut net: i64 = if self.next_step <= self.reverse_start_step {
            self.next_step.saturating_sub(1) as i64
        } else {
            2 * self.reverse_start_step as i64 - self.next_step as i64 - 1
        };
        if self.is_extruder {
            net -= 2 * self.cart().extruder_reverse_steps as i64;
        }
        if !self.direction {
            net = -net;
        }
        net
    }
}

impl fmt::Display for DriveMovement {
    /// One human-readable debug line per drive (spec.md §6).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "drive {} dir={} state={:?} next_step={}/{} pA={:.3} pB={:.3} pC={:.3}",
            self.drive,
            if self.direction { "fwd" } else { "rev" },
            self.state,
            self.next_step,
            self.total_steps,
            self.p_a,
            self.p_b,
            self.p_c
        )
    }
}

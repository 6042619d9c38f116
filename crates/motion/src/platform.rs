//! Boundary traits towards the platform layer and the extruder shaper.
//!
//! Neither `steps_per_mm` nor pressure-advance bookkeeping is computed by
//! this crate; both are owned by collaborators out of scope here (spec.md
//! §1). The scheduler only consumes them through these traits, the way
//! `mcu-drivers` consumes hardware facts through `AtomicGpioPort`/`Timer`
//! rather than hard-coding a board.

/// Per-drive facts and tuning parameters supplied by the platform layer.
pub trait Platform {
    /// Steps per millimetre of travel for `drive`, unsigned.
    fn steps_per_mm(&self, drive: usize) -> f64;

    /// Threshold (timer clocks) below which Cartesian multi-stepping
    /// activates.
    fn min_calc_interval_cartesian(&self) -> u32;

    /// Threshold (timer clocks) below which delta multi-stepping activates.
    fn min_calc_interval_delta(&self) -> u32;

    /// When `true`, a multi-step batch is spaced uniformly across its
    /// steps instead of being emitted back-to-back at the end.
    fn even_steps(&self) -> bool;
}

/// Pressure-advance state for a single extruder drive.
pub trait ExtruderShaper {
    /// Extrusion (mm) carried forward from a prior move, seeding
    /// `distance_so_far` for `prepare_extruder`.
    fn extrusion_pending(&self) -> f64;

    /// Pressure-advance coefficient K.
    fn k(&self) -> f64;
}

/// A fixed-value `Platform`, handy for tests and simple host simulation.
#[derive(Debug, Clone, Copy)]
pub struct StaticPlatform {
    pub steps_per_mm: f64,
    pub min_calc_interval_cartesian: u32,
    pub min_calc_interval_delta: u32,
    pub even_steps: bool,
}

impl Platform for StaticPlatform {
    fn steps_per_mm(&self, _drive: usize) -> f64 {
        self.steps_per_mm
    }

    fn min_calc_interval_cartesian(&self) -> u32 {
        self.min_calc_interval_cartesian
    }

    fn min_calc_interval_delta(&self) -> u32 {
        self.min_calc_interval_delta
    }

    fn even_steps(&self) -> bool {
        self.even_steps
    }
}

/// A fixed-value `ExtruderShaper`, handy for tests.
#[derive(Debug, Clone, Copy)]
pub struct StaticShaper {
    pub extrusion_pending: f64,
    pub k: f64,
}

impl ExtruderShaper for StaticShaper {
    fn extrusion_pending(&self) -> f64 {
        self.extrusion_pending
    }

    fn k(&self) -> f64 {
        self.k
    }
}

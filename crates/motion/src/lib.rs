//! # Drive Movement
//!
//! The per-axis step-pulse scheduler of a 3D-printer / CNC motion
//! controller. Given a pre-planned move — a `DDA` owning a chain of
//! `MoveSegment`s — this crate walks, for a single motor ("drive"), the
//! segment-by-segment timing formulae and produces each step pulse's due
//! time, in both Cartesian/extruder and linear-delta kinematic modes.
//!
//! Out of scope (see `spec.md`/`SPEC_FULL.md`): the planner that builds
//! `MoveSegment` chains, kinematics tables, the step ISR itself, and the
//! platform/extruder-shaper layers — this crate only consumes them
//! through the [`platform::Platform`] and [`platform::ExtruderShaper`]
//! boundary traits.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod advance;
pub mod drive;
pub mod error;
mod kernel;
mod prepare;
pub mod platform;
pub mod pool;
pub mod segment;

pub use drive::{CartesianParams, DeltaParams, DriveMovement, ModeParams, State};
pub use error::DriveError;
pub use platform::{ExtruderShaper, Platform, StaticPlatform, StaticShaper};
pub use pool::{DriveHandle, DrivePool};
pub use segment::{DeltaPrepareParams, MoveSegment, DDA};

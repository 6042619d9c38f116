//! Error types for the drive-movement step-pulse scheduler.

/// Failure kinds raised by [`crate::drive::DriveMovement`].
///
/// These are not retried: the planner observes `state == step_error` on the
/// drive and aborts the move.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DriveError {
    /// `ds < 0` in the delta branch after the `max(0, t2a)` guard — only
    /// reachable through accumulated float error beyond the guard.
    DeltaNumericError,
    /// A non-final step's computed due-time exceeded `dda.clocks_needed`.
    LateStep,
    /// The segment chain ended while `next_step <= total_steps`.
    SegmentChainExhausted,
    /// The pool has no free slots and is at its compile-time capacity.
    PoolExhausted,
}

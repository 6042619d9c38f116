//! Allocation-free `DriveMovement` lifecycle (spec.md §4.1).
//!
//! A fixed-capacity arena with an intrusive freelist, the direct
//! translation of a C free-list singly-linked through the object itself.
//! `next_dm` (here, `DriveMovement::next_dm`) threads either the freelist
//! or the ISR's active chain, never both — matching the dual-use link
//! called out in spec.md §9.

use heapless::Vec;

use crate::drive::{DriveMovement, State};
use crate::error::DriveError;

/// Handle into a [`DrivePool`]'s backing storage. Cheap to copy, used in
/// place of a pointer since Rust forbids the obvious alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveHandle(pub usize);

/// A process-wide pool of `N` permanently-allocated `DriveMovement`
/// instances. Never shrinks; `release` only returns a slot to the
/// freelist, it never drops storage.
pub struct DrivePool<const N: usize> {
    slots: Vec<DriveMovement, N>,
    free_head: Option<usize>,
    num_created: usize,
}

impl<const N: usize> Default for DrivePool<N> {
    fn default() -> Self {
        DrivePool {
            slots: Vec::new(),
            free_head: None,
            num_created: 0,
        }
    }
}

impl<const N: usize> DrivePool<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-creates `n` instances at boot, pushing them onto the free list.
    pub fn initial_allocate(&mut self, n: usize) -> Result<(), DriveError> {
        for _ in 0..n {
            self.grow()?;
        }
        Ok(())
    }

    /// Total instances ever constructed. Only grows.
    pub fn num_created(&self) -> usize {
        self.num_created
    }

    fn grow(&mut self) -> Result<usize, DriveError> {
        let idx = self.slots.len();
        self.slots
            .push(DriveMovement::new_idle(idx))
            .map_err(|_| DriveError::PoolExhausted)?;
        self.num_created += 1;
        self.slots[idx].next_dm = self.free_head;
        self.free_head = Some(idx);
        Ok(idx)
    }

    /// Pops a free instance (constructing a new one if the freelist is
    /// empty and capacity remains) and initialises `drive`/`state`.
    pub fn allocate(&mut self, drive: usize, state: State) -> Result<DriveHandle, DriveError> {
        let idx = match self.free_head {
            Some(idx) => {
                self.free_head = self.slots[idx].next_dm;
                idx
            }
            None => self.grow()?,
        };
        let dm = &mut self.slots[idx];
        dm.reset_for(drive, state);
        dm.next_dm = None;
        Ok(DriveHandle(idx))
    }

    /// Returns a `DriveMovement` to the free list.
    pub fn release(&mut self, handle: DriveHandle) {
        let idx = handle.0;
        self.slots[idx].state = State::Idle;
        self.slots[idx].next_dm = self.free_head;
        self.free_head = Some(idx);
    }

    pub fn get(&self, handle: DriveHandle) -> &DriveMovement {
        &self.slots[handle.0]
    }

    pub fn get_mut(&mut self, handle: DriveHandle) -> &mut DriveMovement {
        &mut self.slots[handle.0]
    }
}

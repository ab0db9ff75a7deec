//! Sparse random allocation without replacement.
//!
//! Conceptually the pool is an array `[0, 1, .., capacity - 1]` that is
//! shuffled one element at a time (partial Fisher-Yates). Only the slots that
//! have been swapped are stored; a missing slot `k` holds `k`. Storage grows
//! with the number of draws, never with capacity.
//!
//! Draws are staged in a [`SwapOverlay`] and reach the backing table only when
//! the caller commits, so an aborted request leaves no trace.

use ic_stable_structures::{Memory, StableBTreeMap};
use std::collections::BTreeMap;

use crate::seed::roll;
use crate::types::MintError;

/// Read access to a sparse swap table.
pub trait SlotTable {
    /// Explicit entry for `slot`, if one was ever written.
    fn slot(&self, slot: u64) -> Option<u64>;

    /// Value currently held by `slot`, treating absence as identity.
    fn resolve(&self, slot: u64) -> u64 {
        self.slot(slot).unwrap_or(slot)
    }
}

impl<M: Memory> SlotTable for StableBTreeMap<u64, u64, M> {
    fn slot(&self, slot: u64) -> Option<u64> {
        self.get(&slot)
    }
}

impl SlotTable for BTreeMap<u64, u64> {
    fn slot(&self, slot: u64) -> Option<u64> {
        self.get(&slot).copied()
    }
}

/// Pending draws of one request, layered over the committed table.
pub struct SwapOverlay<'a, T: SlotTable> {
    base: &'a T,
    writes: BTreeMap<u64, u64>,
    remaining: u64,
}

impl<'a, T: SlotTable> SwapOverlay<'a, T> {
    pub fn new(base: &'a T, remaining: u64) -> Self {
        Self {
            base,
            writes: BTreeMap::new(),
            remaining,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Number of distinct slots written by this request.
    pub fn staged_slots(&self) -> usize {
        self.writes.len()
    }

    fn resolve(&self, slot: u64) -> u64 {
        match self.writes.get(&slot) {
            Some(value) => *value,
            None => self.base.resolve(slot),
        }
    }

    /// Draw one unit index in `[0, capacity)` that was never drawn before.
    ///
    /// The tail slot is read before the consumed slot is overwritten, and
    /// `remaining` shrinks only after both reads.
    pub fn draw_one(&mut self, seed: &[u8; 32], draw_index: u64) -> Result<u64, MintError> {
        let r = self.remaining;
        if r == 0 {
            return Err(MintError::SupplyExhausted { remaining: 0, requested: 1 });
        }

        let i = roll(seed, draw_index) % r;
        let value = self.resolve(i);
        let tail = self.resolve(r - 1);
        self.writes.insert(i, tail);
        self.remaining = r - 1;

        Ok(value)
    }

    /// Hand back the staged writes for the caller to apply on commit.
    pub fn into_writes(self) -> BTreeMap<u64, u64> {
        self.writes
    }
}

/// Apply staged writes to the committed table.
pub fn apply_writes<M: Memory>(table: &mut StableBTreeMap<u64, u64, M>, writes: BTreeMap<u64, u64>) {
    for (slot, value) in writes {
        table.insert(slot, value);
    }
}

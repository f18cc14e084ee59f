//! Fixed-capacity ordered slot buffer holding the vessel's contents.
//!
//! Slots `[0, filled)` hold records and the rest are empty. The buffer can
//! be replaced wholesale by a restore, so the guard in [`crate::guard`] runs
//! before every mutation and right after every restore.

use std::mem;

use blend_core::types::{EffectRecord, FillState, Repair};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulator {
    slots: Vec<Option<EffectRecord>>,
    filled: usize,
    capacity: usize,
}

impl Accumulator {
    /// An empty buffer. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![None; capacity],
            filled: 0,
            capacity,
        }
    }

    /// Adopt externally supplied state as-is, without repairing it.
    ///
    /// The next mutation (or an explicit [`repair`](Self::repair)) brings it
    /// back in line. Used to model state injected behind the engine's back.
    pub fn from_parts_unchecked(
        capacity: usize,
        slots: Vec<Option<EffectRecord>>,
        recorded_fill: usize,
    ) -> Self {
        Self {
            slots,
            filled: recorded_fill,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored fill count. Only trustworthy after a repair.
    pub fn filled(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub fn is_full(&self) -> bool {
        self.filled >= self.capacity
    }

    pub fn state(&self) -> FillState {
        FillState::from_counts(self.filled, self.capacity)
    }

    /// Raw slot buffer, for persistence.
    pub fn slots(&self) -> &[Option<EffectRecord>] {
        &self.slots
    }

    /// Held records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &EffectRecord> {
        let end = self.filled.min(self.slots.len());
        self.slots[..end].iter().flatten()
    }

    /// Run the consistency guard.
    pub fn repair(&mut self) -> Option<Repair> {
        crate::guard::repair(&mut self.slots, &mut self.filled, self.capacity)
    }

    /// Append `record`. Returns `false`, leaving the buffer unchanged, when
    /// it is full.
    pub fn try_add(&mut self, record: EffectRecord) -> bool {
        self.repair();
        if self.filled >= self.capacity {
            return false;
        }
        self.slots[self.filled] = Some(record);
        self.filled += 1;
        true
    }

    /// Take every held record in insertion order and reset to empty.
    ///
    /// The whole buffer is swapped out in one step, so no caller can observe
    /// a half-cleared state.
    pub fn drain(&mut self) -> Vec<EffectRecord> {
        self.repair();
        let taken = mem::replace(&mut self.slots, vec![None; self.capacity]);
        self.filled = 0;
        taken.into_iter().flatten().collect()
    }

    /// Replace the buffer with restored slots and repair immediately.
    ///
    /// `recorded_fill` is the fill count stored alongside the slots; it is
    /// only used to report the repair and is otherwise re-derived.
    pub fn replace_all(
        &mut self,
        slots: Vec<Option<EffectRecord>>,
        recorded_fill: usize,
    ) -> Option<Repair> {
        self.slots = slots;
        self.filled = recorded_fill;
        self.repair()
    }
}

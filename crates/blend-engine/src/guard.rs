//! Consistency guard for the slot buffer.
//!
//! The slot buffer and its fill count can disagree after an external
//! restore: the count may be stale, missing or larger than the slots allow,
//! occupied slots may have gaps, the buffer may have the wrong length, and
//! decoded records may carry an out-of-range potency or duration. The guard detects all
//! of these and rewrites the buffer so that:
//!
//! 1. the buffer length equals the capacity,
//! 2. occupied slots form a prefix, in their original relative order,
//! 3. the fill count equals the number of occupied slots,
//! 4. every potency and finite duration is within range.
//!
//! Records that do not fit in the capacity are dropped.

use blend_core::constants::{MAX_DURATION_TICKS, MAX_POTENCY};
use blend_core::types::{EffectDuration, EffectRecord, Repair};
use tracing::warn;

/// What is wrong with a slot buffer, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnosis {
    pub recorded_fill: usize,
    pub occupied: usize,
    pub has_gaps: bool,
    pub wrong_length: bool,
    pub overflow: usize,
    pub bad_potency: usize,
    pub bad_duration: usize,
}

impl Diagnosis {
    pub fn is_consistent(&self) -> bool {
        self.recorded_fill == self.occupied
            && !self.has_gaps
            && !self.wrong_length
            && self.overflow == 0
            && self.bad_potency == 0
            && self.bad_duration == 0
    }
}

/// Inspect a slot buffer without touching it.
pub fn diagnose(slots: &[Option<EffectRecord>], recorded_fill: usize, capacity: usize) -> Diagnosis {
    let occupied = slots.iter().filter(|s| s.is_some()).count();
    // A gap exists when some occupied slot sits at or after the first empty one.
    let has_gaps = match slots.iter().position(Option::is_none) {
        Some(first_empty) => slots[first_empty..].iter().any(Option::is_some),
        None => false,
    };
    let bad_potency = slots
        .iter()
        .flatten()
        .filter(|r| r.potency() > MAX_POTENCY)
        .count();
    let bad_duration = slots.iter().flatten().filter(|r| duration_out_of_range(r)).count();

    Diagnosis {
        recorded_fill,
        occupied,
        has_gaps,
        wrong_length: slots.len() != capacity,
        overflow: occupied.saturating_sub(capacity),
        bad_potency,
        bad_duration,
    }
}

fn duration_out_of_range(record: &EffectRecord) -> bool {
    matches!(record.duration(), EffectDuration::Ticks(t) if t > MAX_DURATION_TICKS)
}

/// Bring `slots`/`filled` back in line with the invariants listed in the
/// module docs. Returns `None` when they already hold.
pub fn repair(
    slots: &mut Vec<Option<EffectRecord>>,
    filled: &mut usize,
    capacity: usize,
) -> Option<Repair> {
    let diagnosis = diagnose(slots, *filled, capacity);
    if diagnosis.is_consistent() {
        return None;
    }

    let mut records: Vec<EffectRecord> = slots
        .iter()
        .flatten()
        .map(|r| {
            let r = if r.potency() > MAX_POTENCY { r.with_potency(MAX_POTENCY) } else { *r };
            // `with_duration` clamps finite durations.
            if duration_out_of_range(&r) { r.with_duration(r.duration()) } else { r }
        })
        .collect();
    records.truncate(capacity);

    let actual = records.len();
    let mut rebuilt: Vec<Option<EffectRecord>> = records.into_iter().map(Some).collect();
    rebuilt.resize(capacity, None);
    *slots = rebuilt;
    *filled = actual;

    let report = Repair {
        recorded_fill: diagnosis.recorded_fill,
        actual_fill: actual,
        compacted: diagnosis.has_gaps,
        truncated: diagnosis.overflow,
        clamped_potency: diagnosis.bad_potency,
        clamped_duration: diagnosis.bad_duration,
    };
    warn!(
        recorded = report.recorded_fill,
        actual = report.actual_fill,
        compacted = report.compacted,
        truncated = report.truncated,
        clamped_potency = report.clamped_potency,
        clamped_duration = report.clamped_duration,
        "guard: repaired inconsistent vessel state"
    );
    Some(report)
}

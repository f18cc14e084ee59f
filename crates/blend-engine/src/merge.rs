//! Duplicate-effect merging.
//!
//! Records with the same kind and potency collapse into one. The first
//! record of a group is the base: its flags survive and its full duration
//! counts. Every further member adds a diminishing share of its own
//! duration: the first duplicate adds 1/2, the second 1/3, and so on, so
//! stacking identical potions gives diminishing returns.
//!
//! Each kind is resolved once, at its first record. Only records sharing
//! that first record's potency join its group; records of the same kind at
//! another potency, and any later record of a resolved kind that did not
//! join the group, pass through unmerged. An infinite duration anywhere in
//! a group makes the merged record infinite.

use std::collections::HashSet;

use blend_core::constants::MERGE_FIRST_DIVISOR;
use blend_core::types::{EffectDuration, EffectKind, EffectRecord};

/// Stateless merge engine. See the module docs for the rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeEngine;

impl MergeEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn merge(&self, effects: &[EffectRecord]) -> Vec<EffectRecord> {
        merge_effects(effects)
    }
}

/// Running total of a merge group's duration.
struct DurationSum {
    ticks: f64,
    infinite: bool,
}

impl DurationSum {
    fn new(base: EffectDuration) -> Self {
        match base {
            EffectDuration::Ticks(t) => Self { ticks: f64::from(t), infinite: false },
            EffectDuration::Infinite => Self { ticks: 0.0, infinite: true },
        }
    }

    fn add_share(&mut self, duration: EffectDuration, divisor: u32) {
        match duration {
            EffectDuration::Ticks(t) => self.ticks += f64::from(t) / f64::from(divisor),
            EffectDuration::Infinite => self.infinite = true,
        }
    }

    fn finish(self) -> EffectDuration {
        if self.infinite {
            EffectDuration::Infinite
        } else {
            EffectDuration::from_f64(self.ticks)
        }
    }
}

/// Merge duplicates of each kind's first record.
///
/// The output keeps the position of each group's base and drops the
/// records folded into it; everything else keeps its place. Running it on
/// its own output changes nothing.
pub fn merge_effects(effects: &[EffectRecord]) -> Vec<EffectRecord> {
    let mut resolved: HashSet<EffectKind> = HashSet::with_capacity(effects.len());
    let mut folded = vec![false; effects.len()];
    let mut merged = Vec::with_capacity(effects.len());

    for (i, base) in effects.iter().enumerate() {
        if folded[i] {
            continue;
        }
        if !resolved.insert(base.kind()) {
            merged.push(*base);
            continue;
        }

        let key = base.merge_key();
        let mut total = DurationSum::new(base.duration());
        let mut divisor = MERGE_FIRST_DIVISOR;
        let mut matched = false;

        // Every earlier record of this kind would have resolved it already.
        for (j, other) in effects.iter().enumerate().skip(i + 1) {
            if other.merge_key() != key {
                continue;
            }
            total.add_share(other.duration(), divisor);
            divisor = divisor.saturating_add(1);
            folded[j] = true;
            matched = true;
        }

        if matched {
            merged.push(base.with_duration(total.finish()));
        } else {
            merged.push(*base);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use blend_core::constants::MAX_DURATION_TICKS;
    use proptest::prelude::*;

    fn poison(ticks: u32) -> EffectRecord {
        EffectRecord::timed(EffectKind::Poison, ticks, 0)
    }

    // --- worked examples ---

    #[test]
    fn three_poisons_diminishing_shares() {
        // 200 + 300/2 + 400/3 = 483.33
        let out = merge_effects(&[poison(200), poison(300), poison(400)]);
        assert_eq!(out, vec![poison(483)]);
    }

    #[test]
    fn two_records_add_half() {
        let out = merge_effects(&[poison(600), poison(400)]);
        assert_eq!(out, vec![poison(800)]);
    }

    #[test]
    fn base_is_first_seen() {
        // Order matters for which duration counts in full.
        let a = merge_effects(&[poison(100), poison(1000)]);
        let b = merge_effects(&[poison(1000), poison(100)]);
        assert_eq!(a[0].duration(), EffectDuration::Ticks(600));
        assert_eq!(b[0].duration(), EffectDuration::Ticks(1050));
    }

    #[test]
    fn base_flags_survive() {
        let ambient = poison(200).with_flags(true, false, false);
        let out = merge_effects(&[ambient, poison(200)]);
        assert_eq!(out.len(), 1);
        assert!(out[0].is_ambient());
        assert!(!out[0].is_visible());
        assert!(!out[0].shows_icon());
    }

    // --- grouping ---

    #[test]
    fn different_potency_does_not_merge() {
        let weak = poison(200);
        let strong = EffectRecord::timed(EffectKind::Poison, 200, 1);
        assert_eq!(merge_effects(&[weak, strong]), vec![weak, strong]);
    }

    #[test]
    fn only_first_potency_of_a_kind_merges() {
        let strong = |t| EffectRecord::timed(EffectKind::Poison, t, 1);
        let out = merge_effects(&[poison(200), strong(100), poison(200), strong(100)]);
        assert_eq!(out, vec![poison(300), strong(100), strong(100)]);
    }

    #[test]
    fn resolved_kind_blocks_later_bases() {
        // Poison is resolved at index 0 with no partner; the later pair of
        // weaker poisons stays apart.
        let strong = EffectRecord::timed(EffectKind::Poison, 200, 1);
        let input = [strong, poison(200), poison(400)];
        assert_eq!(merge_effects(&input), input.to_vec());
    }

    #[test]
    fn unmatched_pass_through_in_order() {
        let speed = EffectRecord::timed(EffectKind::Speed, 3600, 0);
        let heal = EffectRecord::instant(EffectKind::InstantHealth, 1);
        let out = merge_effects(&[speed, poison(200), heal, poison(200)]);
        assert_eq!(out, vec![speed, poison(300), heal]);
    }

    #[test]
    fn empty_and_single() {
        assert!(merge_effects(&[]).is_empty());
        assert_eq!(merge_effects(&[poison(7)]), vec![poison(7)]);
    }

    // --- bounds ---

    #[test]
    fn infinite_member_makes_group_infinite() {
        let forever = EffectRecord::new(EffectKind::Poison, EffectDuration::Infinite, 0);
        let out = merge_effects(&[poison(200), forever]);
        assert_eq!(out[0].duration(), EffectDuration::Infinite);
        let out = merge_effects(&[forever, poison(200)]);
        assert_eq!(out[0].duration(), EffectDuration::Infinite);
    }

    #[test]
    fn clamps_to_max_duration() {
        let out = merge_effects(&[poison(MAX_DURATION_TICKS), poison(MAX_DURATION_TICKS)]);
        assert_eq!(out[0].duration(), EffectDuration::Ticks(MAX_DURATION_TICKS));
    }

    #[test]
    fn engine_delegates() {
        let input = [poison(200), poison(300), poison(400)];
        assert_eq!(MergeEngine::new().merge(&input), merge_effects(&input));
    }

    // --- proptest ---

    fn arb_record() -> impl Strategy<Value = EffectRecord> {
        // A small kind/potency space so duplicates are common.
        (0usize..4, 0u8..3, 0u32..100_000).prop_map(|(k, p, t)| {
            EffectRecord::timed(EffectKind::ALL[k], t, p)
        })
    }

    proptest! {
        #[test]
        fn merge_is_idempotent(records in prop::collection::vec(arb_record(), 0..16)) {
            let once = merge_effects(&records);
            let twice = merge_effects(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn first_key_of_each_kind_collapses(records in prop::collection::vec(arb_record(), 0..16)) {
            let out = merge_effects(&records);
            let mut seen = HashSet::new();
            for first in records.iter().filter(|r| seen.insert(r.kind())) {
                let copies = out.iter().filter(|r| r.merge_key() == first.merge_key()).count();
                prop_assert_eq!(copies, 1);
            }
            // Only records sharing their kind's first key are ever folded.
            let kept = records
                .iter()
                .filter(|r| records.iter().find(|b| b.kind() == r.kind()).map(|b| b.merge_key()) != Some(r.merge_key()))
                .count();
            prop_assert_eq!(out.len(), kept + seen.len());
        }

        #[test]
        fn merged_duration_at_least_base(records in prop::collection::vec(arb_record(), 1..16)) {
            let out = merge_effects(&records);
            let mut seen = HashSet::new();
            for r in out.iter().filter(|r| seen.insert(r.kind())) {
                let base = records.iter().find(|b| b.kind() == r.kind()).unwrap();
                prop_assert_eq!(base.merge_key(), r.merge_key());
                prop_assert!(r.duration().as_ticks() >= base.duration().as_ticks());
            }
        }
    }
}

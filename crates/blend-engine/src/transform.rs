//! Post-merge transforms selected by the triggering reagent.
//!
//! Each transform maps every record to exactly one record; order and
//! cardinality are preserved and an empty input gives an empty output.
//! Rounding follows [`blend_core::rounding`].

use blend_core::constants::{
    AMPLIFY_BONUS_TICKS, AMPLIFY_FACTOR, DILUTION_DURATION_FACTOR, DILUTION_POTENCY_FACTOR,
    MAX_DURATION_TICKS, MAX_POTENCY,
};
use blend_core::recipe::{TransformKind, TransformRequest};
use blend_core::rounding::{round_potency, round_ticks};
use blend_core::traits::EffectTransform;
use blend_core::types::{EffectDuration, EffectRecord};

/// Lingering conversion.
///
/// Instantaneous effects keep half their potency; durative effects keep a
/// quarter of their duration. Infinite durations stay infinite. Strength
/// has no influence.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dilution;

impl EffectTransform for Dilution {
    fn kind(&self) -> TransformKind {
        TransformKind::Dilution
    }

    fn transform_record(&self, record: &EffectRecord, _strength: u32) -> EffectRecord {
        if record.is_instantaneous() {
            let potency = round_potency(f64::from(record.potency()) * DILUTION_POTENCY_FACTOR);
            return record.with_potency(potency);
        }
        match record.duration() {
            EffectDuration::Ticks(t) => record.with_duration(EffectDuration::Ticks(round_ticks(
                f64::from(t) * DILUTION_DURATION_FACTOR,
            ))),
            EffectDuration::Infinite => *record,
        }
    }
}

/// Multiplicative duration extension.
///
/// Each round maps a finite duration `d` to `round(max(1, 1.2 * d + 1))`;
/// `strength` rounds are applied. Once the maximum duration is reached the
/// remaining rounds are skipped. Instantaneous and infinite records pass
/// through.
#[derive(Debug, Clone, Copy, Default)]
pub struct Amplify;

impl Amplify {
    fn extend(ticks: u32, rounds: u32) -> u32 {
        let mut ticks = ticks;
        for _ in 0..rounds {
            let next = (AMPLIFY_FACTOR * f64::from(ticks) + AMPLIFY_BONUS_TICKS).max(1.0);
            ticks = round_ticks(next);
            if ticks == MAX_DURATION_TICKS {
                break;
            }
        }
        ticks
    }
}

impl EffectTransform for Amplify {
    fn kind(&self) -> TransformKind {
        TransformKind::Amplify
    }

    fn transform_record(&self, record: &EffectRecord, strength: u32) -> EffectRecord {
        if record.is_instantaneous() {
            return *record;
        }
        match record.duration() {
            EffectDuration::Ticks(t) => {
                record.with_duration(EffectDuration::Ticks(Self::extend(t, strength)))
            }
            EffectDuration::Infinite => *record,
        }
    }
}

/// Potency increase with duration compression.
///
/// Records already at maximum potency pass through. Otherwise potency rises
/// by `strength` (clamped to the maximum) and a finite durative duration is
/// divided by `2^(127 - strength)` (integer division, so any shift of 32 or
/// more leaves zero ticks). Instantaneous records only gain potency.
#[derive(Debug, Clone, Copy, Default)]
pub struct Boost;

impl EffectTransform for Boost {
    fn kind(&self) -> TransformKind {
        TransformKind::Boost
    }

    fn transform_record(&self, record: &EffectRecord, strength: u32) -> EffectRecord {
        if record.potency() >= MAX_POTENCY {
            return *record;
        }

        let raised = u32::from(record.potency()).saturating_add(strength).min(u32::from(MAX_POTENCY));
        // `raised` is at most 127.
        let boosted = record.with_potency(raised as u8);

        if record.is_instantaneous() {
            return boosted;
        }
        match boosted.duration() {
            EffectDuration::Ticks(t) => {
                let shift = u32::from(MAX_POTENCY).saturating_sub(strength);
                boosted.with_duration(EffectDuration::Ticks(t.checked_shr(shift).unwrap_or(0)))
            }
            EffectDuration::Infinite => boosted,
        }
    }
}

/// Dispatches a [`TransformRequest`] to the matching transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformPipeline;

impl TransformPipeline {
    pub fn new() -> Self {
        Self
    }

    /// The transform implementing `kind`.
    pub fn stage(&self, kind: TransformKind) -> &'static dyn EffectTransform {
        match kind {
            TransformKind::Dilution => &Dilution,
            TransformKind::Amplify => &Amplify,
            TransformKind::Boost => &Boost,
        }
    }

    pub fn apply(&self, request: TransformRequest, effects: &[EffectRecord]) -> Vec<EffectRecord> {
        let strength = request.strength.max(1);
        self.stage(request.transform).apply(effects, strength)
    }
}

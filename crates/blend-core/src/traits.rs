//! Trait interfaces for the vessel.
//!
//! These traits define the seams between the engine and its collaborators:
//! - [`EffectTransform`]: post-merge transforms (blend-engine implements)
//! - [`ColorMixer`]: tint derivation, owned by the host's color rules
//! - [`Persistable`]: save/restore of vessel state to the host's storage

use crate::error::CodecError;
use crate::recipe::TransformKind;
use crate::types::{EffectRecord, Repair, Rgb};

/// A per-record transform applied once after merging.
///
/// Transforms never change cardinality: every input record yields exactly
/// one output record, in the same order.
pub trait EffectTransform: Send + Sync {
    /// Which recipe transform this implements.
    fn kind(&self) -> TransformKind;

    /// Transform a single record at the given strength (at least 1).
    fn transform_record(&self, record: &EffectRecord, strength: u32) -> EffectRecord;

    /// Transform a whole merged sequence.
    ///
    /// Default implementation maps [`transform_record`](Self::transform_record)
    /// over the input; an empty input yields an empty output.
    fn apply(&self, effects: &[EffectRecord], strength: u32) -> Vec<EffectRecord> {
        effects
            .iter()
            .map(|e| self.transform_record(e, strength))
            .collect()
    }
}

/// Pure, order-independent mapping from a set of effects to a tint.
pub trait ColorMixer: Send + Sync {
    fn mix(&self, effects: &[EffectRecord]) -> Rgb;
}

/// Save/restore capability composed into a vessel.
///
/// `load` must leave the vessel consistent: any disagreement between the
/// stored fill count and the stored slots is repaired before it returns.
pub trait Persistable {
    /// Encode the current state.
    fn save(&self) -> Result<Vec<u8>, CodecError>;

    /// Replace the current state with a decoded one. Returns the repair
    /// report when the decoded state was inconsistent.
    fn load(&mut self, bytes: &[u8]) -> Result<Option<Repair>, CodecError>;
}

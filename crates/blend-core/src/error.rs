//! Error types for the Potion Blender vessel.
use thiserror::Error;

use crate::recipe::ReagentKind;
use crate::types::EffectKind;

/// Recoverable rejections reported by the vessel. None of them are fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VesselError {
    #[error("vessel full: capacity {capacity}")] CapacityExceeded { capacity: usize },
    #[error("instantaneous effect {0} already held")] DuplicateInstantEffect(EffectKind),
    #[error("nothing to combine: vessel is empty")] EmptyCombineRequest,
    #[error("no recipe for reagent {reagent}; spilled {spilled} effects")] UnknownRecipe { reagent: ReagentKind, spilled: usize },
    #[error("vessel already mutated during tick {tick}")] TickBudgetSpent { tick: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("encode: {0}")] Encode(String),
    #[error("decode: {0}")] Decode(String),
    #[error("{0} trailing bytes after vessel state")] TrailingBytes(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config io: {0}")] Io(String),
    #[error("config parse: {0}")] Parse(String),
    #[error("invalid config: {0}")] Invalid(String),
}

//! # blend-engine: accumulation, merge and transform engine.
//!
//! All state lives in a single vessel and is mutated from the thread that
//! owns it; nothing here locks or blocks.
//!
//! This crate implements the brewing cauldron's mixing core:
//! - **Accumulator**: fixed-capacity ordered slot buffer with a fill count
//!   that is re-derived whenever it disagrees with the slots.
//! - **Merge**: records sharing kind and potency fold into one, each extra
//!   duplicate adding a diminishing share (1/2, 1/3, ...) of its duration.
//! - **Transforms**: dilution, amplify and boost, selected by the reagent.
//! - **Controller**: add/combine state machine producing the artifact, its
//!   tint and the leftover bottle count.
//! - **Vessel**: the controller plus per-tick mutation gating and binary
//!   persistence.

pub mod accumulator;
pub mod controller;
pub mod guard;
pub mod merge;
pub mod transform;
pub mod vessel;

pub use accumulator::Accumulator;
pub use controller::CombineController;
pub use merge::{merge_effects, MergeEngine};
pub use transform::{Amplify, Boost, Dilution, TransformPipeline};
pub use vessel::Vessel;

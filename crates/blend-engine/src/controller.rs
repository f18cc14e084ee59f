//! Add/combine state machine.
//!
//! ```text
//! Empty --add--> Filling --add--> Full
//!   ^               |               |
//!   +----combine----+-----combine---+
//! ```
//!
//! A combine drains the accumulator before doing any work, so the vessel is
//! empty from that point on whether the combine succeeds or spills.

use blend_core::color::PotionColorMixer;
use blend_core::config::BlendConfig;
use blend_core::error::VesselError;
use blend_core::recipe::{ReagentKind, RecipeBook, TransformRequest};
use blend_core::traits::ColorMixer;
use blend_core::types::{
    AddOutcome, CombineOutput, EffectRecord, FillState, InputOutcome, Repair, Rgb, VesselInput,
};
use tracing::{debug, info, warn};

use crate::accumulator::Accumulator;
use crate::merge::MergeEngine;
use crate::transform::TransformPipeline;

/// Orchestrates adds and combines over one vessel's accumulator.
///
/// The recipe book is fixed at construction. The color rule defaults to the
/// host's potion-color rule and can be swapped with
/// [`with_mixer`](Self::with_mixer).
#[derive(Debug, Clone)]
pub struct CombineController<M = PotionColorMixer> {
    accumulator: Accumulator,
    recipes: RecipeBook,
    merger: MergeEngine,
    pipeline: TransformPipeline,
    mixer: M,
}

impl CombineController<PotionColorMixer> {
    pub fn new(capacity: usize, recipes: RecipeBook) -> Self {
        Self::with_mixer(capacity, recipes, PotionColorMixer::new())
    }

    pub fn from_config(config: &BlendConfig) -> Self {
        Self::new(config.capacity, config.recipes.clone())
    }
}

impl<M: ColorMixer> CombineController<M> {
    pub fn with_mixer(capacity: usize, recipes: RecipeBook, mixer: M) -> Self {
        Self {
            accumulator: Accumulator::new(capacity),
            recipes,
            merger: MergeEngine::new(),
            pipeline: TransformPipeline::new(),
            mixer,
        }
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    pub fn capacity(&self) -> usize {
        self.accumulator.capacity()
    }

    pub fn filled(&self) -> usize {
        self.accumulator.filled()
    }

    pub fn state(&self) -> FillState {
        self.accumulator.state()
    }

    /// The host shows liquid exactly when this is true.
    pub fn has_fluid(&self) -> bool {
        !self.accumulator.is_empty()
    }

    /// Held records in insertion order.
    pub fn held_effects(&self) -> Vec<EffectRecord> {
        self.accumulator.records().copied().collect()
    }

    /// Tint of the liquid currently in the vessel.
    pub fn contents_color(&self) -> Rgb {
        self.mixer.mix(&self.held_effects())
    }

    /// Adopt restored slots. Runs the guard immediately.
    pub fn restore(&mut self, slots: Vec<Option<EffectRecord>>, recorded_fill: usize) -> Option<Repair> {
        self.accumulator.replace_all(slots, recorded_fill)
    }

    /// Store one effect.
    ///
    /// Rejected when the vessel is full, or when `record` is instantaneous
    /// and an instantaneous record of the same kind is already held.
    pub fn try_add(&mut self, record: EffectRecord) -> Result<AddOutcome, VesselError> {
        self.accumulator.repair();

        if self.accumulator.is_full() {
            debug!(capacity = self.capacity(), "controller: add rejected, vessel full");
            return Err(VesselError::CapacityExceeded { capacity: self.capacity() });
        }

        if record.is_instantaneous()
            && self
                .accumulator
                .records()
                .any(|held| held.is_instantaneous() && held.kind() == record.kind())
        {
            debug!(kind = %record.kind(), "controller: duplicate instant effect ignored");
            return Err(VesselError::DuplicateInstantEffect(record.kind()));
        }

        let became_non_empty = self.accumulator.is_empty();
        if !self.accumulator.try_add(record) {
            return Err(VesselError::CapacityExceeded { capacity: self.capacity() });
        }

        let filled = self.accumulator.filled();
        debug!(kind = %record.kind(), filled, capacity = self.capacity(), "controller: effect added");
        Ok(AddOutcome { filled, became_non_empty })
    }

    /// Combine everything held using the recipe for `reagent`.
    ///
    /// `count` is the reagent stack size and becomes the transform strength.
    /// On an empty vessel nothing changes. When `reagent` has no recipe the
    /// contents are spilled and the vessel is left empty.
    pub fn try_combine(&mut self, reagent: ReagentKind, count: u32) -> Result<CombineOutput, VesselError> {
        self.accumulator.repair();

        if self.accumulator.is_empty() {
            debug!(%reagent, "controller: nothing to combine");
            return Err(VesselError::EmptyCombineRequest);
        }

        let filled = self.accumulator.filled();
        let records = self.accumulator.drain();

        let Some(recipe) = self.recipes.get(reagent).copied() else {
            warn!(%reagent, spilled = filled, "controller: no recipe, contents spilled");
            return Err(VesselError::UnknownRecipe { reagent, spilled: filled });
        };

        let merged = self.merger.merge(&records);
        let merged_effects = match recipe.transform {
            Some(transform) => self.pipeline.apply(TransformRequest::new(transform, count), &merged),
            None => merged,
        };
        let color_summary = self.mixer.mix(&merged_effects);

        info!(
            %reagent,
            inputs = filled,
            effects = merged_effects.len(),
            color = %color_summary,
            "controller: combined"
        );

        Ok(CombineOutput {
            artifact: recipe.artifact,
            merged_effects,
            color_summary,
            byproduct_count: filled - 1,
        })
    }

    /// Empty the vessel, returning what it held. A no-op on an empty vessel.
    pub fn spill(&mut self) -> Vec<EffectRecord> {
        let spilled = self.accumulator.drain();
        if !spilled.is_empty() {
            debug!(count = spilled.len(), "controller: contents dumped");
        }
        spilled
    }

    /// Route one qualified input.
    pub fn handle(&mut self, input: VesselInput) -> Result<InputOutcome, VesselError> {
        match input {
            VesselInput::Effect(record) => self.try_add(record).map(InputOutcome::Added),
            VesselInput::Reagent { kind, count } => {
                self.try_combine(kind, count).map(InputOutcome::Combined)
            }
            VesselInput::CombinedArtifact => {
                warn!(filled = self.filled(), "controller: combined artifact re-inserted, overload");
                Ok(InputOutcome::Overload)
            }
        }
    }
}

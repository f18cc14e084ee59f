//! The world-facing vessel.
//!
//! Composes a [`CombineController`] with two things the controller does not
//! know about: the game tick (at most one mutating input completes per tick)
//! and persistence of the slot buffer in the binary layout.

use blend_core::color::PotionColorMixer;
use blend_core::config::BlendConfig;
use blend_core::error::{CodecError, VesselError};
use blend_core::traits::{ColorMixer, Persistable};
use blend_core::types::{
    EffectRecord, FillState, InputOutcome, PersistedVessel, Repair, Rgb, VesselInput,
};
use tracing::{debug, info};

use crate::controller::CombineController;

/// Upper bound on bytes a persisted vessel may claim while decoding.
const PERSISTED_LIMIT: usize = 64 * 1024;

fn codec_config() -> impl bincode::config::Config {
    bincode::config::standard().with_limit::<PERSISTED_LIMIT>()
}

/// A brewing cauldron's engine state.
#[derive(Debug, Clone)]
pub struct Vessel<M = PotionColorMixer> {
    controller: CombineController<M>,
    /// Tick during which the last mutation completed.
    last_mutation: Option<u64>,
}

impl Vessel<PotionColorMixer> {
    pub fn new(config: &BlendConfig) -> Self {
        Self::from_controller(CombineController::from_config(config))
    }
}

impl<M: ColorMixer> Vessel<M> {
    pub fn from_controller(controller: CombineController<M>) -> Self {
        Self {
            controller,
            last_mutation: None,
        }
    }

    pub fn controller(&self) -> &CombineController<M> {
        &self.controller
    }

    pub fn state(&self) -> FillState {
        self.controller.state()
    }

    pub fn has_fluid(&self) -> bool {
        self.controller.has_fluid()
    }

    pub fn contents_color(&self) -> Rgb {
        self.controller.contents_color()
    }

    pub fn held_effects(&self) -> Vec<EffectRecord> {
        self.controller.held_effects()
    }

    fn check_tick(&self, tick: u64) -> Result<(), VesselError> {
        if self.last_mutation == Some(tick) {
            debug!(tick, "vessel: mutation budget for tick already spent");
            return Err(VesselError::TickBudgetSpent { tick });
        }
        Ok(())
    }

    /// Handle one qualified input during `tick`.
    ///
    /// Inputs that would mutate the vessel are refused with
    /// [`VesselError::TickBudgetSpent`] once a mutation has completed in the
    /// same tick. A spill caused by a missing recipe counts as a mutation.
    /// A reagent dropped into an empty vessel is always reported as
    /// [`VesselError::EmptyCombineRequest`], whatever the tick budget.
    pub fn on_input(&mut self, tick: u64, input: VesselInput) -> Result<InputOutcome, VesselError> {
        if matches!(input, VesselInput::Reagent { .. }) && self.controller.filled() == 0 {
            debug!(tick, "vessel: reagent into empty vessel");
            return Err(VesselError::EmptyCombineRequest);
        }
        if input.mutates() {
            self.check_tick(tick)?;
        }

        let result = self.controller.handle(input);
        let mutated = match &result {
            Ok(InputOutcome::Added(_)) | Ok(InputOutcome::Combined(_)) => true,
            Err(VesselError::UnknownRecipe { .. }) => true,
            _ => false,
        };
        if mutated {
            self.last_mutation = Some(tick);
        }
        result
    }

    /// The host's "use" interaction: dump the contents.
    pub fn use_vessel(&mut self, tick: u64) -> Result<Vec<EffectRecord>, VesselError> {
        if self.controller.filled() == 0 {
            return Ok(Vec::new());
        }
        self.check_tick(tick)?;
        let spilled = self.controller.spill();
        self.last_mutation = Some(tick);
        Ok(spilled)
    }
}

impl<M: ColorMixer> Persistable for Vessel<M> {
    fn save(&self) -> Result<Vec<u8>, CodecError> {
        let acc = self.controller.accumulator();
        let state = PersistedVessel {
            slots: acc.slots().to_vec(),
            fill_count: u32::try_from(acc.filled()).unwrap_or(u32::MAX),
        };
        bincode::encode_to_vec(&state, codec_config())
            .map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn load(&mut self, bytes: &[u8]) -> Result<Option<Repair>, CodecError> {
        let (state, read): (PersistedVessel, usize) =
            bincode::decode_from_slice(bytes, codec_config())
                .map_err(|e| CodecError::Decode(e.to_string()))?;
        if read != bytes.len() {
            return Err(CodecError::TrailingBytes(bytes.len() - read));
        }

        let recorded = state.fill_count as usize;
        let repair = self.controller.restore(state.slots, recorded);
        info!(
            filled = self.controller.filled(),
            repaired = repair.is_some(),
            "vessel: state restored"
        );
        Ok(repair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blend_core::constants::MAX_DURATION_TICKS;
    use blend_core::recipe::{ReagentKind, RecipeBook};
    use blend_core::types::{EffectDuration, EffectKind};

    fn vessel(capacity: usize) -> Vessel {
        Vessel::new(&BlendConfig { capacity, ..BlendConfig::default() })
    }

    fn effect(ticks: u32) -> VesselInput {
        VesselInput::Effect(EffectRecord::timed(EffectKind::Speed, ticks, 0))
    }

    // --- tick gating ---

    #[test]
    fn one_mutation_per_tick() {
        let mut v = vessel(4);
        v.on_input(1, effect(10)).unwrap();
        assert_eq!(v.on_input(1, effect(20)), Err(VesselError::TickBudgetSpent { tick: 1 }));
        assert_eq!(v.controller().filled(), 1);
        v.on_input(2, effect(20)).unwrap();
        assert_eq!(v.controller().filled(), 2);
    }

    #[test]
    fn rejected_add_does_not_spend_tick() {
        let mut v = vessel(1);
        v.on_input(1, effect(10)).unwrap();
        assert!(matches!(
            v.on_input(2, effect(20)),
            Err(VesselError::CapacityExceeded { .. })
        ));
        let out = v.on_input(2, VesselInput::Reagent { kind: ReagentKind::Plain, count: 1 });
        assert!(matches!(out, Ok(InputOutcome::Combined(_))));
    }

    #[test]
    fn overload_ignores_tick_budget() {
        let mut v = vessel(4);
        v.on_input(5, effect(10)).unwrap();
        assert_eq!(v.on_input(5, VesselInput::CombinedArtifact), Ok(InputOutcome::Overload));
        assert_eq!(v.controller().filled(), 1);
    }

    #[test]
    fn spill_on_missing_recipe_spends_tick() {
        let ctrl = CombineController::new(4, RecipeBook::empty());
        let mut v = Vessel::from_controller(ctrl);
        v.on_input(1, effect(10)).unwrap();
        let spilled = v.on_input(2, VesselInput::Reagent { kind: ReagentKind::Plain, count: 1 });
        assert!(matches!(spilled, Err(VesselError::UnknownRecipe { spilled: 1, .. })));
        assert_eq!(v.on_input(2, effect(10)), Err(VesselError::TickBudgetSpent { tick: 2 }));
        assert_eq!(v.state(), FillState::Empty);
    }

    #[test]
    fn empty_combine_reported_after_spent_tick() {
        let mut v = vessel(4);
        v.on_input(3, effect(10)).unwrap();
        v.use_vessel(4).unwrap();
        let reagent = VesselInput::Reagent { kind: ReagentKind::Plain, count: 1 };
        assert_eq!(v.on_input(4, reagent.clone()), Err(VesselError::EmptyCombineRequest));
        // Still gated for inputs that would change something.
        assert_eq!(v.on_input(4, effect(10)), Err(VesselError::TickBudgetSpent { tick: 4 }));
        assert_eq!(v.on_input(5, reagent), Err(VesselError::EmptyCombineRequest));
    }

    #[test]
    fn use_vessel_dumps_contents() {
        let mut v = vessel(4);
        v.on_input(1, effect(10)).unwrap();
        assert!(v.has_fluid());
        let dumped = v.use_vessel(2).unwrap();
        assert_eq!(dumped.len(), 1);
        assert!(!v.has_fluid());
        assert!(v.use_vessel(2).unwrap().is_empty());
    }

    // --- persistence ---

    #[test]
    fn save_then_load_restores_contents() {
        let mut v = vessel(4);
        v.on_input(1, effect(10)).unwrap();
        v.on_input(2, effect(20)).unwrap();
        let bytes = v.save().unwrap();

        let mut restored = vessel(4);
        assert_eq!(restored.load(&bytes).unwrap(), None);
        assert_eq!(restored.held_effects(), v.held_effects());
        assert_eq!(restored.state(), FillState::Filling);
    }

    #[test]
    fn load_repairs_stale_fill_count() {
        let record = EffectRecord::timed(EffectKind::Speed, 10, 0);
        let mut slots = vec![Some(record); 3];
        slots.resize(8, None);
        let state = PersistedVessel { slots, fill_count: 99 };
        let bytes = bincode::encode_to_vec(&state, bincode::config::standard()).unwrap();

        let mut v = vessel(8);
        let repair = v.load(&bytes).unwrap().unwrap();
        assert_eq!(repair.recorded_fill, 99);
        assert_eq!(repair.actual_fill, 3);
        assert_eq!(v.controller().filled(), 3);
    }

    #[test]
    fn load_clamps_overlong_duration() {
        // Field order of a persisted record: kind, duration, potency, flags.
        let raw = (EffectKind::Speed, EffectDuration::Ticks(u32::MAX), 0u8, false, true, true);
        let bytes = bincode::encode_to_vec((vec![Some(raw)], 1u32), bincode::config::standard()).unwrap();

        let mut v = vessel(1);
        let repair = v.load(&bytes).unwrap().unwrap();
        assert_eq!(repair.clamped_duration, 1);

        let out = v.on_input(0, VesselInput::Reagent { kind: ReagentKind::Splash, count: 1 });
        match out {
            Ok(InputOutcome::Combined(c)) => {
                assert_eq!(c.merged_effects[0].duration(), EffectDuration::Ticks(MAX_DURATION_TICKS));
            }
            other => panic!("expected a combine, got {other:?}"),
        }
    }

    #[test]
    fn load_resizes_to_own_capacity() {
        let mut big = vessel(8);
        for tick in 0..6 {
            big.on_input(tick, effect(tick as u32)).unwrap();
        }
        let bytes = big.save().unwrap();

        let mut small = vessel(4);
        let repair = small.load(&bytes).unwrap().unwrap();
        assert_eq!(repair.truncated, 2);
        assert_eq!(small.state(), FillState::Full);
    }

    #[test]
    fn load_rejects_garbage_and_trailing_bytes() {
        let mut v = vessel(4);
        assert!(matches!(v.load(&[0xFF, 0xFF, 0xFF]), Err(CodecError::Decode(_))));

        let mut bytes = vessel(4).save().unwrap();
        bytes.push(0);
        assert_eq!(v.load(&bytes), Err(CodecError::TrailingBytes(1)));
    }

    #[test]
    fn load_rejects_oversized_slot_claim() {
        // A varint length prefix claiming u64::MAX slots.
        let bytes = [0xFD, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut v = vessel(4);
        assert!(matches!(v.load(&bytes), Err(CodecError::Decode(_))));
        assert_eq!(v.state(), FillState::Empty);
    }
}

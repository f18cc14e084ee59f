//! Shared test helpers for scenario and adversarial tests.

use blend_core::config::BlendConfig;
use blend_core::recipe::ReagentKind;
use blend_core::types::{EffectKind, EffectRecord, PersistedVessel, VesselInput};
use blend_engine::Vessel;

/// A vessel with the standard recipes and the given capacity.
pub fn vessel(capacity: usize) -> Vessel {
    Vessel::new(&BlendConfig {
        capacity,
        ..BlendConfig::default()
    })
}

/// A timed effect input.
pub fn effect(kind: EffectKind, ticks: u32, potency: u8) -> VesselInput {
    VesselInput::Effect(EffectRecord::timed(kind, ticks, potency))
}

/// A single-item reagent input.
pub fn reagent(kind: ReagentKind) -> VesselInput {
    VesselInput::Reagent { kind, count: 1 }
}

/// Feed `inputs` one per tick starting at `first_tick`, panicking on refusal.
///
/// Returns the tick after the last one used.
pub fn feed(vessel: &mut Vessel, first_tick: u64, inputs: impl IntoIterator<Item = VesselInput>) -> u64 {
    let mut tick = first_tick;
    for input in inputs {
        if let Err(e) = vessel.on_input(tick, input) {
            panic!("input at tick {tick} refused: {e}");
        }
        tick += 1;
    }
    tick
}

/// Persisted state with `occupied` copies of `record` packed at the front of
/// a `capacity`-slot buffer and an arbitrary stored fill count.
pub fn persisted(record: EffectRecord, occupied: usize, capacity: usize, fill_count: u32) -> PersistedVessel {
    let mut slots = vec![Some(record); occupied];
    slots.resize(capacity.max(occupied), None);
    PersistedVessel { slots, fill_count }
}

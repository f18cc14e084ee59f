//! Core vessel types: effect records, colors, inputs and outcomes.
//!
//! Durations are in game ticks. Potency follows the host's "amplifier"
//! convention: potency 0 is level I, potency 1 is level II, and so on.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{MAX_DURATION_TICKS, MAX_POTENCY};
use crate::recipe::{ArtifactKind, ReagentKind};
use crate::rounding::round_ticks;

/// Category of a status effect.
///
/// Each kind carries the host's reference color (used for tinting) and
/// whether it is applied once rather than over a duration.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    bincode::Encode, bincode::Decode,
)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Speed,
    Slowness,
    Haste,
    MiningFatigue,
    Strength,
    InstantHealth,
    InstantDamage,
    JumpBoost,
    Nausea,
    Regeneration,
    Resistance,
    FireResistance,
    WaterBreathing,
    Invisibility,
    Blindness,
    NightVision,
    Hunger,
    Weakness,
    Poison,
    Wither,
    HealthBoost,
    Absorption,
    Saturation,
    Glowing,
    Levitation,
    Luck,
    Unluck,
    SlowFalling,
    ConduitPower,
    DolphinsGrace,
    BadOmen,
    HeroOfTheVillage,
    Darkness,
}

impl EffectKind {
    /// Every kind, in declaration order.
    pub const ALL: [EffectKind; 33] = [
        Self::Speed,
        Self::Slowness,
        Self::Haste,
        Self::MiningFatigue,
        Self::Strength,
        Self::InstantHealth,
        Self::InstantDamage,
        Self::JumpBoost,
        Self::Nausea,
        Self::Regeneration,
        Self::Resistance,
        Self::FireResistance,
        Self::WaterBreathing,
        Self::Invisibility,
        Self::Blindness,
        Self::NightVision,
        Self::Hunger,
        Self::Weakness,
        Self::Poison,
        Self::Wither,
        Self::HealthBoost,
        Self::Absorption,
        Self::Saturation,
        Self::Glowing,
        Self::Levitation,
        Self::Luck,
        Self::Unluck,
        Self::SlowFalling,
        Self::ConduitPower,
        Self::DolphinsGrace,
        Self::BadOmen,
        Self::HeroOfTheVillage,
        Self::Darkness,
    ];

    /// Whether the effect is applied once instead of over a duration.
    pub fn is_instantaneous(&self) -> bool {
        matches!(self, Self::InstantHealth | Self::InstantDamage | Self::Saturation)
    }

    /// Reference color used when mixing the tint of a set of effects.
    pub fn color(&self) -> Rgb {
        Rgb::from_packed(match self {
            Self::Speed => 0x7CAF_C6,
            Self::Slowness => 0x5A6C_81,
            Self::Haste => 0xD9C0_43,
            Self::MiningFatigue => 0x4A42_17,
            Self::Strength => 0x9324_23,
            Self::InstantHealth => 0xF824_23,
            Self::InstantDamage => 0x430A_09,
            Self::JumpBoost => 0x22FF_4C,
            Self::Nausea => 0x551D_4A,
            Self::Regeneration => 0xCD5C_AB,
            Self::Resistance => 0x9945_3A,
            Self::FireResistance => 0xE49A_3A,
            Self::WaterBreathing => 0x2E52_99,
            Self::Invisibility => 0x7F83_92,
            Self::Blindness => 0x1F1F_23,
            Self::NightVision => 0x1F1F_A1,
            Self::Hunger => 0x5876_53,
            Self::Weakness => 0x484D_48,
            Self::Poison => 0x4E93_31,
            Self::Wither => 0x352A_27,
            Self::HealthBoost => 0xF87D_23,
            Self::Absorption => 0x2552_A5,
            Self::Saturation => 0xF824_23,
            Self::Glowing => 0x94A0_61,
            Self::Levitation => 0xCEFF_FF,
            Self::Luck => 0x3399_00,
            Self::Unluck => 0xC0A4_4D,
            Self::SlowFalling => 0xFFEF_D1,
            Self::ConduitPower => 0x1DC2_D1,
            Self::DolphinsGrace => 0x88A3_BE,
            Self::BadOmen => 0x0B61_38,
            Self::HeroOfTheVillage => 0x44FF_44,
            Self::Darkness => 0x2927_21,
        })
    }

    /// Lowercase identifier, matching the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Slowness => "slowness",
            Self::Haste => "haste",
            Self::MiningFatigue => "mining_fatigue",
            Self::Strength => "strength",
            Self::InstantHealth => "instant_health",
            Self::InstantDamage => "instant_damage",
            Self::JumpBoost => "jump_boost",
            Self::Nausea => "nausea",
            Self::Regeneration => "regeneration",
            Self::Resistance => "resistance",
            Self::FireResistance => "fire_resistance",
            Self::WaterBreathing => "water_breathing",
            Self::Invisibility => "invisibility",
            Self::Blindness => "blindness",
            Self::NightVision => "night_vision",
            Self::Hunger => "hunger",
            Self::Weakness => "weakness",
            Self::Poison => "poison",
            Self::Wither => "wither",
            Self::HealthBoost => "health_boost",
            Self::Absorption => "absorption",
            Self::Saturation => "saturation",
            Self::Glowing => "glowing",
            Self::Levitation => "levitation",
            Self::Luck => "luck",
            Self::Unluck => "unluck",
            Self::SlowFalling => "slow_falling",
            Self::ConduitPower => "conduit_power",
            Self::DolphinsGrace => "dolphins_grace",
            Self::BadOmen => "bad_omen",
            Self::HeroOfTheVillage => "hero_of_the_village",
            Self::Darkness => "darkness",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How long an effect lasts.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash,
    bincode::Encode, bincode::Decode,
)]
#[serde(rename_all = "snake_case")]
pub enum EffectDuration {
    /// A finite number of ticks, at most [`MAX_DURATION_TICKS`].
    Ticks(u32),
    /// Never expires.
    Infinite,
}

impl EffectDuration {
    /// A finite duration, clamped to [`MAX_DURATION_TICKS`].
    pub fn ticks(ticks: u32) -> Self {
        Self::Ticks(ticks.min(MAX_DURATION_TICKS))
    }

    /// A finite duration from a fractional tick count, using the crate-wide
    /// rounding rule.
    pub fn from_f64(ticks: f64) -> Self {
        Self::Ticks(round_ticks(ticks))
    }

    /// Finite tick count, or `None` for an infinite duration.
    pub fn as_ticks(&self) -> Option<u32> {
        match self {
            Self::Ticks(t) => Some(*t),
            Self::Infinite => None,
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Self::Infinite)
    }
}

impl fmt::Display for EffectDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ticks(t) => write!(f, "{t}t"),
            Self::Infinite => f.write_str("infinite"),
        }
    }
}

/// One status effect held by the vessel.
///
/// Immutable: the `with_*` methods return new values. Potency is clamped to
/// [`MAX_POTENCY`] on construction and on deserialization. Records decoded
/// from the binary layout are not clamped until the consistency guard sees
/// them.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash,
    bincode::Encode, bincode::Decode,
)]
#[serde(from = "RecordFields")]
pub struct EffectRecord {
    kind: EffectKind,
    duration: EffectDuration,
    potency: u8,
    ambient: bool,
    visible: bool,
    show_icon: bool,
}

/// Deserialization shape of [`EffectRecord`]; flags default to a plain
/// brewed potion (not ambient, visible, icon shown).
#[derive(Deserialize)]
struct RecordFields {
    kind: EffectKind,
    duration: EffectDuration,
    #[serde(default)]
    potency: u8,
    #[serde(default)]
    ambient: bool,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default = "default_true")]
    show_icon: bool,
}

fn default_true() -> bool {
    true
}

impl From<RecordFields> for EffectRecord {
    fn from(f: RecordFields) -> Self {
        Self::new(f.kind, f.duration, f.potency).with_flags(f.ambient, f.visible, f.show_icon)
    }
}

impl EffectRecord {
    /// A visible, non-ambient record with its icon shown.
    pub fn new(kind: EffectKind, duration: EffectDuration, potency: u8) -> Self {
        let duration = match duration {
            EffectDuration::Ticks(t) => EffectDuration::ticks(t),
            EffectDuration::Infinite => EffectDuration::Infinite,
        };
        Self {
            kind,
            duration,
            potency: potency.min(MAX_POTENCY),
            ambient: false,
            visible: true,
            show_icon: true,
        }
    }

    /// Shorthand for a finite record.
    pub fn timed(kind: EffectKind, ticks: u32, potency: u8) -> Self {
        Self::new(kind, EffectDuration::ticks(ticks), potency)
    }

    /// Shorthand for an instantaneous record. Instant effects still carry
    /// the host's one-tick duration.
    pub fn instant(kind: EffectKind, potency: u8) -> Self {
        Self::new(kind, EffectDuration::Ticks(1), potency)
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn duration(&self) -> EffectDuration {
        self.duration
    }

    pub fn potency(&self) -> u8 {
        self.potency
    }

    pub fn is_ambient(&self) -> bool {
        self.ambient
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn shows_icon(&self) -> bool {
        self.show_icon
    }

    /// Derived from the kind.
    pub fn is_instantaneous(&self) -> bool {
        self.kind.is_instantaneous()
    }

    /// Identity used when merging: records merge only when both kind and
    /// potency match.
    pub fn merge_key(&self) -> (EffectKind, u8) {
        (self.kind, self.potency)
    }

    pub fn with_duration(&self, duration: EffectDuration) -> Self {
        let mut next = *self;
        next.duration = match duration {
            EffectDuration::Ticks(t) => EffectDuration::ticks(t),
            EffectDuration::Infinite => EffectDuration::Infinite,
        };
        next
    }

    pub fn with_potency(&self, potency: u8) -> Self {
        let mut next = *self;
        next.potency = potency.min(MAX_POTENCY);
        next
    }

    pub fn with_flags(&self, ambient: bool, visible: bool, show_icon: bool) -> Self {
        let mut next = *self;
        next.ambient = ambient;
        next.visible = visible;
        next.show_icon = show_icon;
        next
    }
}

impl fmt::Display for EffectRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} for {}", self.kind, u16::from(self.potency) + 1, self.duration)
    }
}

/// A 24-bit color.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpack a `0xRRGGBB` value. The top byte is ignored.
    pub const fn from_packed(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xFF) as u8,
            g: ((packed >> 8) & 0xFF) as u8,
            b: (packed & 0xFF) as u8,
        }
    }

    /// Pack into `0xRRGGBB`.
    pub const fn packed(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Observable fill state of a vessel.
///
/// A combine passes through a transient combining phase that is never
/// observable from outside: the vessel goes straight from `Filling`/`Full`
/// to `Empty`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FillState {
    Empty,
    Filling,
    Full,
}

impl FillState {
    pub fn from_counts(filled: usize, capacity: usize) -> Self {
        if filled == 0 {
            Self::Empty
        } else if filled >= capacity {
            Self::Full
        } else {
            Self::Filling
        }
    }
}

/// Result of a successful add.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddOutcome {
    /// Records held after the add.
    pub filled: usize,
    /// The vessel was empty before this add; the host should show liquid.
    pub became_non_empty: bool,
}

/// Everything a combine produces.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CombineOutput {
    /// The item the host should spawn.
    pub artifact: ArtifactKind,
    /// Effects carried by the artifact.
    pub merged_effects: Vec<EffectRecord>,
    /// Tint of the artifact.
    pub color_summary: Rgb,
    /// Leftover empty containers: one per input record except the one
    /// reused for the artifact.
    pub byproduct_count: usize,
}

/// An input event already qualified by the host.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VesselInput {
    /// A potion carrying one effect entered the vessel.
    Effect(EffectRecord),
    /// A stack of a combining reagent entered the vessel.
    Reagent { kind: ReagentKind, count: u32 },
    /// A previously combined artifact was thrown back in.
    CombinedArtifact,
}

impl VesselInput {
    /// Whether handling this input can change vessel contents.
    pub fn mutates(&self) -> bool {
        !matches!(self, Self::CombinedArtifact)
    }
}

/// What the host should do in response to an input.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputOutcome {
    /// The record was stored; consume the input item.
    Added(AddOutcome),
    /// Spawn the artifact and byproducts; consume the reagent.
    Combined(CombineOutput),
    /// Explode the vessel and discard the input. Contents are untouched.
    Overload,
}

/// Report from the consistency guard after it rewrote inconsistent state.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Repair {
    /// Fill count before the repair.
    pub recorded_fill: usize,
    /// Fill count after the repair (occupied slots).
    pub actual_fill: usize,
    /// Occupied slots were moved to close gaps.
    pub compacted: bool,
    /// Records dropped because they sat beyond capacity.
    pub truncated: usize,
    /// Records whose potency was above [`MAX_POTENCY`].
    pub clamped_potency: usize,
    /// Records whose finite duration was above [`MAX_DURATION_TICKS`].
    pub clamped_duration: usize,
}

/// Binary layout of a persisted vessel: the slot buffer plus the stored
/// fill count, which may be stale.
#[derive(Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct PersistedVessel {
    pub slots: Vec<Option<EffectRecord>>,
    pub fill_count: u32,
}

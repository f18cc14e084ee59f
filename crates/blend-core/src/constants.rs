//! Vessel constants. All durations are in game ticks (20 ticks = 1 second).

/// Highest potency (amplifier) an effect may carry.
pub const MAX_POTENCY: u8 = 127;

/// Largest finite effect duration, in ticks.
///
/// The host stores durations in a signed 32-bit tick counter, so anything
/// above `i32::MAX` cannot be materialised and is clamped here.
pub const MAX_DURATION_TICKS: u32 = i32::MAX as u32;

/// Default number of slots in a vessel (`max_effects` in host configs).
pub const DEFAULT_CAPACITY: usize = 8;

/// Packed RGB of plain water, reported for an empty vessel.
pub const WATER_COLOR: u32 = 0x385D_C6;

/// Packed RGB reported when every held effect is hidden.
pub const HIDDEN_EFFECTS_COLOR: u32 = 0x00_0000;

/// Divisor applied to the first duplicate folded into a merge.
///
/// Each further duplicate uses the next integer: 1/2, 1/3, 1/4, ...
pub const MERGE_FIRST_DIVISOR: u32 = 2;

/// Dilution keeps a quarter of a durative effect's duration.
pub const DILUTION_DURATION_FACTOR: f64 = 0.25;

/// Dilution keeps half of an instantaneous effect's potency.
pub const DILUTION_POTENCY_FACTOR: f64 = 0.5;

/// Per-round multiplier of the amplify transform.
pub const AMPLIFY_FACTOR: f64 = 1.2;

/// Flat bonus (in ticks) added by each amplify round.
pub const AMPLIFY_BONUS_TICKS: f64 = 1.0;

/// File name of the JSON configuration.
pub const CONFIG_FILE_NAME: &str = "potion_blender_config.json";

/// Directory (under the platform config dir) holding the configuration.
pub const CONFIG_DIR_NAME: &str = "potion_blender";

//! Potion tint derivation.
//!
//! Follows the host's potion-color rule: every visible effect contributes
//! its kind's reference color weighted by `potency + 1`; the channels are
//! averaged by total weight. Hidden effects contribute nothing. An empty set
//! is tinted like water; a set with only hidden effects is black.
//!
//! The host averages in floating point. Here the weighted sums are
//! accumulated as integers so the result does not depend on input order;
//! it matches the host's value except where the host's float error would
//! push a channel across an integer boundary.

use crate::constants::{HIDDEN_EFFECTS_COLOR, WATER_COLOR};
use crate::traits::ColorMixer;
use crate::types::{EffectRecord, Rgb};

/// The host's potion-color rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct PotionColorMixer;

impl PotionColorMixer {
    pub fn new() -> Self {
        Self
    }
}

impl ColorMixer for PotionColorMixer {
    fn mix(&self, effects: &[EffectRecord]) -> Rgb {
        if effects.is_empty() {
            return Rgb::from_packed(WATER_COLOR);
        }

        let mut r: u64 = 0;
        let mut g: u64 = 0;
        let mut b: u64 = 0;
        let mut weight: u64 = 0;

        for effect in effects.iter().filter(|e| e.is_visible()) {
            let color = effect.kind().color();
            let w = u64::from(effect.potency()) + 1;
            r += w * u64::from(color.r);
            g += w * u64::from(color.g);
            b += w * u64::from(color.b);
            weight += w;
        }

        if weight == 0 {
            return Rgb::from_packed(HIDDEN_EFFECTS_COLOR);
        }

        // Each channel average is at most 255.
        Rgb::new((r / weight) as u8, (g / weight) as u8, (b / weight) as u8)
    }
}

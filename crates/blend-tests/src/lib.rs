//! End-to-end and adversarial test suite for the Potion Blender engine.
//!
//! The integration tests in `tests/` drive a [`blend_engine::Vessel`] the way
//! a host would and check that every vessel invariant survives hostile
//! input sequences and corrupted persisted state.

pub mod helpers;

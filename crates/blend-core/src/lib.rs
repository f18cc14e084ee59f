//! # blend-core
//! Foundation types and traits for the Potion Blender brewing cauldron.

pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod recipe;
pub mod rounding;
pub mod traits;
pub mod types;

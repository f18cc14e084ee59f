//! Reagents, artifacts and the recipe book that links them.
//!
//! The recipe book is plain configuration: the controller receives it at
//! construction and never mutates it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A combining reagent. Dropping one into a non-empty vessel triggers a
/// combine.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ReagentKind {
    /// Nether wart: plain combine.
    Plain,
    /// Gunpowder: splash combine.
    Splash,
    /// Dragon's breath: lingering combine, dilutes effects.
    Dilution,
    /// Redstone: extends durations.
    Amplify,
    /// Glowstone: raises potency.
    Boost,
}

impl ReagentKind {
    pub const ALL: [ReagentKind; 5] =
        [Self::Plain, Self::Splash, Self::Dilution, Self::Amplify, Self::Boost];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Splash => "splash",
            Self::Dilution => "dilution",
            Self::Amplify => "amplify",
            Self::Boost => "boost",
        }
    }
}

impl fmt::Display for ReagentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Item produced by a combine.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    CombinedPotion,
    CombinedSplashPotion,
    CombinedLingeringPotion,
}

/// The transforms a recipe can apply after merging.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    /// Lingering conversion: shorter durations, weaker instant effects.
    Dilution,
    /// Multiplicative duration extension.
    Amplify,
    /// Potency increase with duration compression.
    Boost,
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dilution => "dilution",
            Self::Amplify => "amplify",
            Self::Boost => "boost",
        })
    }
}

/// A transform together with its strength (the reagent stack size).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransformRequest {
    pub transform: TransformKind,
    /// Always at least 1.
    pub strength: u32,
}

impl TransformRequest {
    /// A zero strength is raised to 1: a reagent that arrived at all counts
    /// once.
    pub fn new(transform: TransformKind, strength: u32) -> Self {
        Self {
            transform,
            strength: strength.max(1),
        }
    }
}

/// What a reagent produces.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Recipe {
    pub artifact: ArtifactKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformKind>,
}

impl Recipe {
    pub fn new(artifact: ArtifactKind, transform: Option<TransformKind>) -> Self {
        Self { artifact, transform }
    }
}

/// Immutable mapping from reagent to recipe.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct RecipeBook {
    recipes: BTreeMap<ReagentKind, Recipe>,
}

impl RecipeBook {
    /// A book with no recipes. Every combine against it spills.
    pub fn empty() -> Self {
        Self {
            recipes: BTreeMap::new(),
        }
    }

    /// The shipped recipes.
    ///
    /// ```
    /// use blend_core::recipe::{ArtifactKind, ReagentKind, RecipeBook, TransformKind};
    /// let book = RecipeBook::standard();
    /// let lingering = book.get(ReagentKind::Dilution).unwrap();
    /// assert_eq!(lingering.artifact, ArtifactKind::CombinedLingeringPotion);
    /// assert_eq!(lingering.transform, Some(TransformKind::Dilution));
    /// ```
    pub fn standard() -> Self {
        Self::empty()
            .with(ReagentKind::Plain, Recipe::new(ArtifactKind::CombinedPotion, None))
            .with(ReagentKind::Splash, Recipe::new(ArtifactKind::CombinedSplashPotion, None))
            .with(
                ReagentKind::Dilution,
                Recipe::new(ArtifactKind::CombinedLingeringPotion, Some(TransformKind::Dilution)),
            )
            .with(
                ReagentKind::Amplify,
                Recipe::new(ArtifactKind::CombinedPotion, Some(TransformKind::Amplify)),
            )
            .with(
                ReagentKind::Boost,
                Recipe::new(ArtifactKind::CombinedPotion, Some(TransformKind::Boost)),
            )
    }

    /// Builder-style insert, replacing any previous recipe for `reagent`.
    pub fn with(mut self, reagent: ReagentKind, recipe: Recipe) -> Self {
        self.recipes.insert(reagent, recipe);
        self
    }

    /// Builder-style removal.
    pub fn without(mut self, reagent: ReagentKind) -> Self {
        self.recipes.remove(&reagent);
        self
    }

    pub fn get(&self, reagent: ReagentKind) -> Option<&Recipe> {
        self.recipes.get(&reagent)
    }

    pub fn contains(&self, reagent: ReagentKind) -> bool {
        self.recipes.contains_key(&reagent)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ReagentKind, &Recipe)> {
        self.recipes.iter()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl Default for RecipeBook {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_book_covers_every_reagent() {
        let book = RecipeBook::standard();
        for reagent in ReagentKind::ALL {
            assert!(book.contains(reagent), "missing recipe for {reagent}");
        }
        assert_eq!(book.len(), ReagentKind::ALL.len());
    }

    #[test]
    fn plain_and_splash_have_no_transform() {
        let book = RecipeBook::standard();
        assert_eq!(book.get(ReagentKind::Plain).unwrap().transform, None);
        assert_eq!(
            book.get(ReagentKind::Splash).unwrap().artifact,
            ArtifactKind::CombinedSplashPotion
        );
    }

    #[test]
    fn without_removes_recipe() {
        let book = RecipeBook::standard().without(ReagentKind::Boost);
        assert!(!book.contains(ReagentKind::Boost));
        assert_eq!(book.len(), 4);
    }

    #[test]
    fn json_uses_reagent_names_as_keys() {
        let book = RecipeBook::empty().with(
            ReagentKind::Amplify,
            Recipe::new(ArtifactKind::CombinedPotion, Some(TransformKind::Amplify)),
        );
        let json = serde_json::to_string(&book).unwrap();
        assert_eq!(
            json,
            r#"{"amplify":{"artifact":"combined_potion","transform":"amplify"}}"#
        );
        let back: RecipeBook = serde_json::from_str(&json).unwrap();
        assert_eq!(back, book);
    }

    #[test]
    fn zero_strength_counts_once() {
        assert_eq!(TransformRequest::new(TransformKind::Amplify, 0).strength, 1);
        assert_eq!(TransformRequest::new(TransformKind::Amplify, 5).strength, 5);
    }
}

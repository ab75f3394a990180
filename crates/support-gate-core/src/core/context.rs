// crates/support-gate-core/src/core/context.rs
// ============================================================================
// Module: Context Model
// Description: Tagged union describing where a visibility check happens.
// Purpose: Carry the minimum content data needed to answer relevance
//          questions at each delivery level.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ContextModel`] names the content level at which a visibility check is
//! being performed and carries exactly the payload that level needs. The
//! level tag and the variant payload are inseparable by construction: there
//! is no way to build a passage-tagged context without a passage payload.
//!
//! Content payloads are raw authoring markup plus open model data; the
//! relevance heuristics in [`crate::runtime::relevance`] flatten and
//! classify them. The context model itself performs no classification.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Context Levels
// ============================================================================

/// Content level at which a visibility check is performed.
///
/// # Invariants
/// - Variants are stable for serialization and catalog matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextLevel {
    /// Assessment-wide scope with no specific content.
    Global,
    /// A titled section grouping items.
    Section,
    /// A single assessment item.
    Item,
    /// A shared reading passage.
    Passage,
    /// A scoring rubric attached to an item.
    Rubric,
    /// A specific interaction element within an item.
    Element,
}

// ============================================================================
// SECTION: Item Content
// ============================================================================

/// Content snapshot for a single assessment item.
///
/// # Invariants
/// - `markup` is the raw authoring markup; no stripping or normalization is
///   applied by this type.
/// - `model` is open model data; some content appears only in model fields
///   and never in the markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemContent {
    /// Item identifier.
    pub item_id: String,
    /// Raw item markup.
    pub markup: String,
    /// Open item model data.
    pub model: Value,
}

impl ItemContent {
    /// Creates item content with the provided identifier and markup and an
    /// empty model.
    #[must_use]
    pub fn new(item_id: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            markup: markup.into(),
            model: Value::Null,
        }
    }

    /// Attaches open model data to the item content.
    #[must_use]
    pub fn with_model(mut self, model: Value) -> Self {
        self.model = model;
        self
    }
}

// ============================================================================
// SECTION: Context Model
// ============================================================================

/// Tagged union describing where a visibility check is happening.
///
/// # Invariants
/// - The `level` discriminant and the variant payload always agree; the sum
///   type makes a mismatched combination unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum ContextModel {
    /// Assessment-wide scope with no content payload.
    Global,
    /// Section scope.
    Section {
        /// Section identifier.
        section_id: String,
        /// Section title as shown to the student.
        title: String,
    },
    /// Item scope.
    Item {
        /// Item content under inspection.
        item: ItemContent,
    },
    /// Passage scope.
    Passage {
        /// Passage identifier.
        passage_id: String,
        /// Raw passage markup.
        markup: String,
    },
    /// Rubric scope.
    Rubric {
        /// Rubric identifier.
        rubric_id: String,
        /// Raw rubric markup.
        markup: String,
    },
    /// Element scope within an owning item.
    Element {
        /// Owning item content.
        item: ItemContent,
        /// Interaction element identifier within the item.
        element_id: String,
        /// Raw element markup.
        markup: String,
    },
}

impl ContextModel {
    /// Returns the content level tag for this context.
    #[must_use]
    pub const fn level(&self) -> ContextLevel {
        match self {
            Self::Global => ContextLevel::Global,
            Self::Section { .. } => ContextLevel::Section,
            Self::Item { .. } => ContextLevel::Item,
            Self::Passage { .. } => ContextLevel::Passage,
            Self::Rubric { .. } => ContextLevel::Rubric,
            Self::Element { .. } => ContextLevel::Element,
        }
    }
}

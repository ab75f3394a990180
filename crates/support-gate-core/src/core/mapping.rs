// crates/support-gate-core/src/core/mapping.rs
// ============================================================================
// Module: Accommodation Mapper
// Description: Bidirectional dictionary between accommodation and tool
//              identifiers.
// Purpose: Translate standardized accommodation identifiers to internal tool
//          identifiers, with runtime extension.
// Dependencies: crate::core::identifiers
// ============================================================================

//! ## Overview
//! The accommodation mapper is a pure dictionary: a forward map from
//! accommodation identifier to tool identifier and its derived reverse map,
//! kept mutually consistent on every registration. Multiple accommodation
//! identifiers may map to the same tool (many-to-one); the reverse map keeps
//! the most recently registered accommodation per tool.
//!
//! The mapper is read-only during resolution. Extending it is expected to
//! happen during application setup, before resolution is exercised
//! concurrently.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::identifiers::AccommodationId;
use crate::core::identifiers::ToolId;

// ============================================================================
// SECTION: Accommodation Map
// ============================================================================

/// Bidirectional accommodation-to-tool dictionary.
///
/// # Invariants
/// - For every reverse entry `(tool, accommodation)`, the forward map
///   contains `(accommodation, tool)`.
/// - The reverse map holds the most recently registered accommodation per
///   tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccommodationMap {
    /// Forward dictionary: accommodation identifier to tool identifier.
    forward: BTreeMap<AccommodationId, ToolId>,
    /// Derived reverse dictionary: tool identifier to the most recently
    /// registered accommodation identifier.
    reverse: BTreeMap<ToolId, AccommodationId>,
}

impl AccommodationMap {
    /// Creates an empty mapper.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            forward: BTreeMap::new(),
            reverse: BTreeMap::new(),
        }
    }

    /// Creates a mapper preloaded with the standard accommodation
    /// vocabulary.
    #[must_use]
    pub fn with_standard_vocabulary() -> Self {
        let mut map = Self::new();
        for (accommodation, tool) in [
            ("text-to-speech", "textToSpeech"),
            ("read-aloud", "textToSpeech"),
            ("on-screen-calculator", "calculator"),
            ("answer-masking", "answerMasking"),
            ("highlighter", "highlighter"),
            ("magnification", "magnifier"),
            ("line-reader", "lineReader"),
            ("color-contrast", "contrast"),
        ] {
            map.register(AccommodationId::new(accommodation), ToolId::new(tool));
        }
        map
    }

    /// Registers a mapping, updating both directions atomically.
    ///
    /// Re-registering an accommodation replaces its forward entry and drops
    /// the stale reverse entry it previously derived.
    pub fn register(&mut self, accommodation: AccommodationId, tool: ToolId) {
        if let Some(previous_tool) = self.forward.insert(accommodation.clone(), tool.clone())
            && self.reverse.get(&previous_tool) == Some(&accommodation)
        {
            self.reverse.remove(&previous_tool);
        }
        self.reverse.insert(tool, accommodation);
    }

    /// Looks up the tool identifier for an accommodation identifier.
    #[must_use]
    pub fn tool_for(&self, accommodation: &AccommodationId) -> Option<&ToolId> {
        self.forward.get(accommodation)
    }

    /// Looks up the most recently registered accommodation identifier for a
    /// tool identifier.
    #[must_use]
    pub fn accommodation_for(&self, tool: &ToolId) -> Option<&AccommodationId> {
        self.reverse.get(tool)
    }

    /// Resolves an accommodation identifier to a tool identifier, falling
    /// back to the raw accommodation identifier verbatim when unmapped.
    #[must_use]
    pub fn resolve_tool_id(&self, accommodation: &AccommodationId) -> ToolId {
        self.forward
            .get(accommodation)
            .cloned()
            .unwrap_or_else(|| accommodation.clone().into_tool_id())
    }

    /// Returns the number of registered forward mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Reports whether the mapper has no registered mappings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

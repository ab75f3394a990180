// crates/support-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Support Gate Identifiers
// Description: Canonical opaque identifiers for accommodations and tools.
// Purpose: Provide strongly typed, serializable identifiers with stable wire
//          forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the two identifier namespaces used throughout Support
//! Gate. Accommodation identifiers come from an external interoperability
//! vocabulary and name an accessibility need; tool identifiers name a
//! concrete implementable feature. Both are opaque UTF-8 strings and
//! serialize transparently on the wire. The resolver may convert an unmapped
//! accommodation identifier into a tool identifier verbatim, so both types
//! support lossless conversion.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Standardized accommodation identifier from the interoperability
/// vocabulary (for example `text-to-speech` or `answer-masking`).
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this
///   type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccommodationId(String);

impl AccommodationId {
    /// Creates a new accommodation identifier from the provided string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the accommodation identifier into a tool identifier with the
    /// same raw value. Used by the resolver's unmapped-identifier fallback.
    #[must_use]
    pub fn into_tool_id(self) -> ToolId {
        ToolId(self.0)
    }
}

impl fmt::Display for AccommodationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Internal tool identifier for a concrete implementable feature.
///
/// # Invariants
/// - Opaque UTF-8 string; unique within a capability catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolId(String);

impl ToolId {
    /// Creates a new tool identifier from the provided string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

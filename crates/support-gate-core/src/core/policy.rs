// crates/support-gate-core/src/core/policy.rs
// ============================================================================
// Module: Policy Inputs
// Description: Configuration sources assembled per resolution call.
// Purpose: Model the four independent authorities consumed by the resolver.
// Dependencies: serde, serde_json, crate::core::identifiers
// ============================================================================

//! ## Overview
//! A [`PolicyInput`] gathers up to four independent configuration sources:
//! institutional policy, session-level proctor overrides, item authoring
//! settings, and the student accommodation profile. None is required to be
//! present; an absent source holds no opinion at its precedence level and is
//! never treated as a block.
//!
//! All list and map fields default to empty on deserialization so partial
//! upstream payloads round-trip without errors. Malformed upstream data is
//! reported by serde, not corrected here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::AccommodationId;
use crate::core::identifiers::ToolId;

// ============================================================================
// SECTION: Institutional Policy
// ============================================================================

/// Assessment-wide institutional policy.
///
/// # Invariants
/// - `blocked` entries are absolute vetoes; no lower-precedence source can
///   re-enable them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionPolicy {
    /// Accommodation identifiers blocked for the whole assessment.
    #[serde(default)]
    pub blocked: Vec<AccommodationId>,
    /// Accommodation identifiers required for the whole assessment.
    #[serde(default)]
    pub required: Vec<AccommodationId>,
    /// Assessment-level per-tool settings, merged beneath item-level
    /// settings.
    #[serde(default)]
    pub tool_settings: BTreeMap<ToolId, Value>,
}

// ============================================================================
// SECTION: Session Override
// ============================================================================

/// Session-level proctor overrides.
///
/// # Invariants
/// - Only an explicit `false` entry carries precedence weight; an explicit
///   `true` entry does not by itself place an identifier under
///   consideration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOverride {
    /// Explicit per-identifier enable/disable decisions for this session.
    #[serde(default)]
    pub overrides: BTreeMap<AccommodationId, bool>,
}

impl SessionOverride {
    /// Reports whether the identifier is explicitly disabled for this
    /// session.
    #[must_use]
    pub fn is_disabled(&self, id: &AccommodationId) -> bool {
        self.overrides.get(id) == Some(&false)
    }
}

// ============================================================================
// SECTION: Item Settings
// ============================================================================

/// Item-level authoring settings.
///
/// # Invariants
/// - `restricted` names tools whose presence would invalidate the item (for
///   example a calculator on a mental-math item).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSettings {
    /// Accommodation identifiers the item requires.
    #[serde(default)]
    pub required: Vec<AccommodationId>,
    /// Accommodation identifiers the item restricts.
    #[serde(default)]
    pub restricted: Vec<AccommodationId>,
    /// Item-level per-tool settings, overriding assessment-level settings.
    #[serde(default)]
    pub tool_settings: BTreeMap<ToolId, Value>,
}

// ============================================================================
// SECTION: Accommodation Profile
// ============================================================================

/// Student accommodation profile.
///
/// # Invariants
/// - `prohibited` lists the student's own opt-outs; a granted identifier
///   that is also prohibited resolves to a block at profile rank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccommodationProfile {
    /// Accommodation identifiers granted to the student.
    #[serde(default)]
    pub granted: Vec<AccommodationId>,
    /// Accommodation identifiers the student has explicitly opted out of.
    #[serde(default)]
    pub prohibited: Vec<AccommodationId>,
    /// Accommodation identifiers to activate automatically at start.
    #[serde(default)]
    pub auto_activate: Vec<AccommodationId>,
}

// ============================================================================
// SECTION: Policy Input
// ============================================================================

/// Configuration sources assembled for one resolution call.
///
/// # Invariants
/// - Every source is optional; `None` means "no opinion", never "blocked".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyInput {
    /// Institutional policy, when present.
    #[serde(default)]
    pub institution: Option<InstitutionPolicy>,
    /// Session-level overrides, when present.
    #[serde(default)]
    pub session: Option<SessionOverride>,
    /// Item-level authoring settings, when present.
    #[serde(default)]
    pub item: Option<ItemSettings>,
    /// Student accommodation profile, when present.
    #[serde(default)]
    pub profile: Option<AccommodationProfile>,
}

impl PolicyInput {
    /// Returns a copy of this input with the profile replaced wholesale.
    ///
    /// Used by simulation entry points; the original input is untouched.
    #[must_use]
    pub fn with_profile(&self, profile: AccommodationProfile) -> Self {
        Self {
            profile: Some(profile),
            ..self.clone()
        }
    }
}

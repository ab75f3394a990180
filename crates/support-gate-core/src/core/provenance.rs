// crates/support-gate-core/src/core/provenance.rs
// ============================================================================
// Module: Provenance Records
// Description: Append-only decision trail for policy resolution.
// Purpose: Explain which rule, at which rank, produced each tool's final
//          state.
// Dependencies: serde, serde_json, crate::core::{identifiers, resolution}
// ============================================================================

//! ## Overview
//! Every resolution call produces one terminal decision record (enable or
//! block) per accommodation identifier considered, in consideration order;
//! identifiers that matched no rule are recorded as skips. The
//! [`ProvenanceBuilder`] accumulates these records append-only and derives a
//! queryable [`ProvenanceSummary`].
//!
//! Provenance exists for audit and debugging; disabling it must not change
//! resolution behavior, only leave the summary structurally valid and empty.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::context::ContextLevel;
use crate::core::identifiers::AccommodationId;
use crate::core::identifiers::ToolId;
use crate::core::resolution::DecisionSource;

// ============================================================================
// SECTION: Decision Actions
// ============================================================================

/// Terminal action taken for an accommodation identifier.
///
/// # Invariants
/// - Variants are stable for serialization and audit grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    /// The tool is enabled.
    Enable,
    /// The tool is blocked.
    Block,
    /// No rule matched; the identifier was collected but not configured.
    Skip,
}

// ============================================================================
// SECTION: Policy Rules
// ============================================================================

/// Named rule in the precedence chain that produced a decision.
///
/// # Invariants
/// - `rank` values 1 through 6 mirror the precedence chain; rank 1 is an
///   absolute veto. `NotConfigured` carries no rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyRule {
    /// Rank 1: institutional block list.
    InstitutionBlock,
    /// Rank 2: session override explicitly disabled.
    SessionDisable,
    /// Rank 3: item-level restriction list.
    ItemRestriction,
    /// Rank 4: item-level requirement list.
    ItemRequirement,
    /// Rank 5: institutional requirement list.
    InstitutionRequirement,
    /// Rank 6: profile grant without a prohibition.
    ProfileGrant,
    /// Rank 6: profile grant cancelled by the student's own prohibition.
    ProfileProhibited,
    /// No rule matched; recorded as a skip.
    NotConfigured,
}

impl PolicyRule {
    /// Returns the precedence rank for this rule (1 strongest, 6 weakest),
    /// or `None` for skip records.
    #[must_use]
    pub const fn rank(self) -> Option<u8> {
        match self {
            Self::InstitutionBlock => Some(1),
            Self::SessionDisable => Some(2),
            Self::ItemRestriction => Some(3),
            Self::ItemRequirement => Some(4),
            Self::InstitutionRequirement => Some(5),
            Self::ProfileGrant | Self::ProfileProhibited => Some(6),
            Self::NotConfigured => None,
        }
    }
}

// ============================================================================
// SECTION: Decision Records
// ============================================================================

/// One provenance entry for one accommodation identifier.
///
/// # Invariants
/// - `rank` equals `rule.rank()`.
/// - Exactly one record exists per accommodation identifier per resolution
///   call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Accommodation identifier considered.
    pub accommodation_id: AccommodationId,
    /// Tool identifier the accommodation resolved to.
    pub tool_id: ToolId,
    /// Precedence rank of the matching rule, absent for skips.
    pub rank: Option<u8>,
    /// Rule that matched.
    pub rule: PolicyRule,
    /// Terminal action taken.
    pub action: DecisionAction,
    /// Configuration source that produced the decision.
    pub source: DecisionSource,
    /// Human-readable reason for audit display.
    pub reason: String,
    /// Raw configuration value that triggered the rule.
    pub value: Value,
}

/// Record of a configuration source that was present for a resolution call.
///
/// # Invariants
/// - One record per source actually supplied; absent sources are not
///   recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Source kind.
    pub kind: DecisionSource,
    /// Human-readable source descriptor for audit display.
    pub descriptor: String,
}

// ============================================================================
// SECTION: Provenance Builder
// ============================================================================

/// Append-only accumulator for provenance records.
///
/// # Invariants
/// - When tracking is disabled, all appends are no-ops and [`Self::build`]
///   returns a structurally valid empty summary.
#[derive(Debug)]
pub struct ProvenanceBuilder {
    /// Whether tracking is enabled.
    enabled: bool,
    /// Content level the resolution ran at, when supplied.
    context_level: Option<ContextLevel>,
    /// Sources recorded as present, in registration order.
    sources: Vec<SourceRecord>,
    /// Decision records in consideration order.
    decisions: Vec<DecisionRecord>,
}

impl ProvenanceBuilder {
    /// Creates a builder with tracking enabled or disabled.
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self {
            enabled,
            context_level: None,
            sources: Vec::new(),
            decisions: Vec::new(),
        }
    }

    /// Records the content level the resolution ran at.
    pub const fn set_context_level(&mut self, level: ContextLevel) {
        if self.enabled {
            self.context_level = Some(level);
        }
    }

    /// Records that a configuration source was present.
    pub fn add_source(&mut self, kind: DecisionSource, descriptor: impl Into<String>) {
        if self.enabled {
            self.sources.push(SourceRecord {
                kind,
                descriptor: descriptor.into(),
            });
        }
    }

    /// Appends one decision record in consideration order.
    pub fn add_decision(&mut self, record: DecisionRecord) {
        if self.enabled {
            self.decisions.push(record);
        }
    }

    /// Produces the immutable summary.
    #[must_use]
    pub fn build(self) -> ProvenanceSummary {
        let mut action_counts = BTreeMap::new();
        let mut source_counts = BTreeMap::new();
        let mut rule_counts = BTreeMap::new();
        for record in &self.decisions {
            *action_counts.entry(record.action).or_insert(0_u64) += 1;
            *source_counts.entry(record.source).or_insert(0_u64) += 1;
            *rule_counts.entry(record.rule).or_insert(0_u64) += 1;
        }
        ProvenanceSummary {
            context_level: self.context_level,
            sources: self.sources,
            decisions: self.decisions,
            action_counts,
            source_counts,
            rule_counts,
        }
    }
}

// ============================================================================
// SECTION: Provenance Summary
// ============================================================================

/// Immutable provenance summary for one resolution call.
///
/// # Invariants
/// - `decisions` preserves consideration order.
/// - Count maps are derived from `decisions` and never diverge from them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceSummary {
    /// Content level the resolution ran at, when supplied.
    pub context_level: Option<ContextLevel>,
    /// Sources recorded as present.
    pub sources: Vec<SourceRecord>,
    /// Ordered decision log.
    pub decisions: Vec<DecisionRecord>,
    /// Decision counts grouped by action.
    pub action_counts: BTreeMap<DecisionAction, u64>,
    /// Decision counts grouped by source.
    pub source_counts: BTreeMap<DecisionSource, u64>,
    /// Decision counts grouped by rule.
    pub rule_counts: BTreeMap<PolicyRule, u64>,
}

impl ProvenanceSummary {
    /// Looks up the decision record for an accommodation identifier.
    #[must_use]
    pub fn decision_for(&self, id: &AccommodationId) -> Option<&DecisionRecord> {
        self.decisions
            .iter()
            .find(|record| &record.accommodation_id == id)
    }
}

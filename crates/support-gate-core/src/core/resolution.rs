// crates/support-gate-core/src/core/resolution.rs
// ============================================================================
// Module: Resolution Outputs
// Description: Resolved per-tool configurations and result queries.
// Purpose: Carry pass-1 decisions to the registry filter and rendering
//          layers.
// Dependencies: serde, serde_json, crate::core::{identifiers, provenance}
// ============================================================================

//! ## Overview
//! A [`Resolution`] is the immutable output of one resolver call: one
//! [`ResolvedToolConfig`] per accommodation identifier that reached a
//! terminal decision, the provenance summary explaining each decision, and
//! the auto-activation list. Resolved configs are created fresh per call and
//! never mutated afterwards.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::ToolId;
use crate::core::provenance::ProvenanceSummary;

// ============================================================================
// SECTION: Decision Sources
// ============================================================================

/// Configuration source that produced a decision.
///
/// # Invariants
/// - Variants are stable for serialization and audit grouping.
/// - `Unconfigured` appears only on skip provenance records, never on a
///   resolved config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// Institutional policy.
    Institution,
    /// Session-level proctor override.
    Session,
    /// Item-level authoring settings.
    Item,
    /// Student accommodation profile.
    Profile,
    /// No source held an opinion.
    Unconfigured,
}

// ============================================================================
// SECTION: Resolved Tool Configuration
// ============================================================================

/// Final configuration for one tool after pass-1 resolution.
///
/// # Invariants
/// - Never mutated after construction.
/// - `always_available` implies the tool was granted by accommodation and
///   cannot be toggled off in the UI, without being a hard requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedToolConfig {
    /// Tool identifier.
    pub tool_id: ToolId,
    /// Whether the tool is enabled.
    pub enabled: bool,
    /// Whether the tool must be present and cannot be hidden.
    pub required: bool,
    /// Whether the tool is always available via accommodation grant.
    pub always_available: bool,
    /// Merged tool-specific settings.
    pub settings: Value,
    /// Precedence source that produced this decision.
    pub source: DecisionSource,
}

// ============================================================================
// SECTION: Resolution Result
// ============================================================================

/// Immutable result of one resolution call.
///
/// # Invariants
/// - `tools` holds at most one entry per tool identifier.
/// - `auto_activate` contains only tools that are enabled in `tools`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Resolved per-tool configurations.
    pub tools: Vec<ResolvedToolConfig>,
    /// Provenance summary for the call.
    pub provenance: ProvenanceSummary,
    /// Tools to activate automatically at start.
    pub auto_activate: Vec<ToolId>,
}

impl Resolution {
    /// Looks up the resolved configuration for a tool.
    #[must_use]
    pub fn config_for(&self, tool_id: &ToolId) -> Option<&ResolvedToolConfig> {
        self.tools.iter().find(|tool| &tool.tool_id == tool_id)
    }

    /// Reports whether the tool resolved as enabled.
    #[must_use]
    pub fn is_enabled(&self, tool_id: &ToolId) -> bool {
        self.config_for(tool_id).is_some_and(|tool| tool.enabled)
    }

    /// Reports whether the tool is required or always available.
    #[must_use]
    pub fn is_required(&self, tool_id: &ToolId) -> bool {
        self.config_for(tool_id)
            .is_some_and(|tool| tool.required || tool.always_available)
    }

    /// Returns the enabled tool configurations.
    #[must_use]
    pub fn enabled_tools(&self) -> Vec<&ResolvedToolConfig> {
        self.tools.iter().filter(|tool| tool.enabled).collect()
    }

    /// Returns the enabled tool identifiers, for pass-2 filtering.
    #[must_use]
    pub fn enabled_tool_ids(&self) -> Vec<ToolId> {
        self.tools
            .iter()
            .filter(|tool| tool.enabled)
            .map(|tool| tool.tool_id.clone())
            .collect()
    }

    /// Returns the configurations that are required or always available.
    #[must_use]
    pub fn required_tools(&self) -> Vec<&ResolvedToolConfig> {
        self.tools
            .iter()
            .filter(|tool| tool.required || tool.always_available)
            .collect()
    }

    /// Returns the merged settings for a tool, when resolved.
    #[must_use]
    pub fn settings_for(&self, tool_id: &ToolId) -> Option<&Value> {
        self.config_for(tool_id).map(|tool| &tool.settings)
    }

    /// Returns the tools to activate automatically at start.
    #[must_use]
    pub fn auto_activate_tools(&self) -> &[ToolId] {
        &self.auto_activate
    }
}

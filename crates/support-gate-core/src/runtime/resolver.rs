// crates/support-gate-core/src/runtime/resolver.rs
// ============================================================================
// Module: Policy Resolver
// Description: Six-rank precedence engine over policy inputs.
// Purpose: Turn heterogeneous configuration sources into per-tool decisions
//          with provenance.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! The resolver applies a fixed precedence chain to every accommodation
//! identifier mentioned by any configuration source. Rank 1 is an absolute
//! veto and rank 6 the weakest signal; only the first matching rank wins and
//! lower ranks are never evaluated once a rank matches. This ordering is a
//! compliance-sensitive behavior (legal policy must dominate individual
//! preference) and is preserved exactly.
//!
//! | Rank | Rule                        | Action                     |
//! |------|-----------------------------|----------------------------|
//! | 1    | institution blocked list    | block                      |
//! | 2    | session override disabled   | block                      |
//! | 3    | item restricted list        | block                      |
//! | 4    | item required list          | enable, required           |
//! | 5    | institution required list   | enable, required           |
//! | 6    | profile granted/prohibited  | enable always-available,   |
//! |      |                             | or block when prohibited   |
//!
//! Resolution is a pure function of its inputs: identical inputs yield an
//! identical [`Resolution`] including provenance order. Absent sources are
//! "no opinion", never errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde_json::Map;
use serde_json::Value;

use crate::core::context::ContextModel;
use crate::core::identifiers::AccommodationId;
use crate::core::identifiers::ToolId;
use crate::core::mapping::AccommodationMap;
use crate::core::policy::AccommodationProfile;
use crate::core::policy::PolicyInput;
use crate::core::provenance::DecisionAction;
use crate::core::provenance::DecisionRecord;
use crate::core::provenance::PolicyRule;
use crate::core::provenance::ProvenanceBuilder;
use crate::core::resolution::DecisionSource;
use crate::core::resolution::Resolution;
use crate::core::resolution::ResolvedToolConfig;

// ============================================================================
// SECTION: Rule Matches
// ============================================================================

/// Outcome of evaluating the precedence chain for one accommodation
/// identifier.
#[derive(Debug)]
struct RuleMatch {
    /// Rule that matched.
    rule: PolicyRule,
    /// Terminal action.
    action: DecisionAction,
    /// Source that produced the decision.
    source: DecisionSource,
    /// Whether the tool must be present and cannot be hidden.
    required: bool,
    /// Whether the tool is always available via accommodation grant.
    always_available: bool,
    /// Human-readable reason.
    reason: &'static str,
    /// Raw configuration value that triggered the rule.
    value: Value,
}

impl RuleMatch {
    /// Builds a block match for the given rule and source.
    const fn block(
        rule: PolicyRule,
        source: DecisionSource,
        reason: &'static str,
        value: Value,
    ) -> Self {
        Self {
            rule,
            action: DecisionAction::Block,
            source,
            required: false,
            always_available: false,
            reason,
            value,
        }
    }

    /// Builds an enable match for the given rule and source.
    const fn enable(
        rule: PolicyRule,
        source: DecisionSource,
        required: bool,
        always_available: bool,
        reason: &'static str,
        value: Value,
    ) -> Self {
        Self {
            rule,
            action: DecisionAction::Enable,
            source,
            required,
            always_available,
            reason,
            value,
        }
    }
}

// ============================================================================
// SECTION: Policy Resolver
// ============================================================================

/// Deterministic precedence engine over policy inputs.
///
/// # Invariants
/// - The mapper is read-only during resolution; the resolver holds no other
///   state between calls.
#[derive(Debug, Clone)]
pub struct PolicyResolver {
    /// Accommodation-to-tool mapper consulted for identifier translation.
    mapping: AccommodationMap,
    /// Whether provenance tracking is enabled.
    provenance_enabled: bool,
}

impl PolicyResolver {
    /// Creates a resolver over the provided mapper, with provenance
    /// tracking enabled.
    #[must_use]
    pub const fn new(mapping: AccommodationMap) -> Self {
        Self {
            mapping,
            provenance_enabled: true,
        }
    }

    /// Enables or disables provenance tracking. Disabling changes nothing
    /// about resolution; the summary is returned structurally valid but
    /// empty.
    #[must_use]
    pub const fn with_provenance(mut self, enabled: bool) -> Self {
        self.provenance_enabled = enabled;
        self
    }

    /// Returns the mapper this resolver consults.
    #[must_use]
    pub const fn mapping(&self) -> &AccommodationMap {
        &self.mapping
    }

    /// Resolves the policy input into per-tool decisions with provenance.
    ///
    /// Accommodation identifiers without a registered mapping resolve to a
    /// tool identifier with the same raw value; they are never silently
    /// dropped. The optional context contributes only its level tag, for
    /// audit display.
    #[must_use]
    pub fn resolve(&self, input: &PolicyInput, context: Option<&ContextModel>) -> Resolution {
        let mut provenance = ProvenanceBuilder::new(self.provenance_enabled);
        if let Some(context) = context {
            provenance.set_context_level(context.level());
        }
        self.record_sources(input, &mut provenance);

        let mut tools: Vec<ResolvedToolConfig> = Vec::new();
        for accommodation_id in collect_mentioned(input) {
            let tool_id = self.mapping.resolve_tool_id(&accommodation_id);
            let Some(matched) = evaluate_chain(&accommodation_id, input) else {
                provenance.add_decision(DecisionRecord {
                    accommodation_id,
                    tool_id,
                    rank: None,
                    rule: PolicyRule::NotConfigured,
                    action: DecisionAction::Skip,
                    source: DecisionSource::Unconfigured,
                    reason: "collected but not configured by any source".to_string(),
                    value: Value::Null,
                });
                continue;
            };

            provenance.add_decision(DecisionRecord {
                accommodation_id,
                tool_id: tool_id.clone(),
                rank: matched.rule.rank(),
                rule: matched.rule,
                action: matched.action,
                source: matched.source,
                reason: matched.reason.to_string(),
                value: matched.value,
            });

            let settings = if matched.action == DecisionAction::Enable {
                merge_settings(&tool_id, input)
            } else {
                Value::Null
            };
            upsert_config(
                &mut tools,
                ResolvedToolConfig {
                    tool_id,
                    enabled: matched.action == DecisionAction::Enable,
                    required: matched.required,
                    always_available: matched.always_available,
                    settings,
                    source: matched.source,
                },
            );
        }

        let auto_activate = self.auto_activate_list(input, &tools);
        Resolution {
            tools,
            provenance: provenance.build(),
            auto_activate,
        }
    }

    /// Simulation entry point: replaces the student profile wholesale and
    /// re-runs the same deterministic algorithm. The caller's input is
    /// never mutated.
    #[must_use]
    pub fn resolve_with_override(
        &self,
        input: &PolicyInput,
        profile: &AccommodationProfile,
    ) -> Resolution {
        self.resolve(&input.with_profile(profile.clone()), None)
    }

    /// Records which configuration sources were present for audit display.
    fn record_sources(&self, input: &PolicyInput, provenance: &mut ProvenanceBuilder) {
        if let Some(institution) = &input.institution {
            provenance.add_source(
                DecisionSource::Institution,
                format!(
                    "institutional policy ({} blocked, {} required)",
                    institution.blocked.len(),
                    institution.required.len()
                ),
            );
        }
        if let Some(session) = &input.session {
            provenance.add_source(
                DecisionSource::Session,
                format!("session overrides ({} entries)", session.overrides.len()),
            );
        }
        if let Some(item) = &input.item {
            provenance.add_source(
                DecisionSource::Item,
                format!(
                    "item settings ({} required, {} restricted)",
                    item.required.len(),
                    item.restricted.len()
                ),
            );
        }
        if let Some(profile) = &input.profile {
            provenance.add_source(
                DecisionSource::Profile,
                format!("accommodation profile ({} granted)", profile.granted.len()),
            );
        }
    }

    /// Maps the profile's auto-activate list through the same mapping,
    /// restricted to tools this resolution enabled.
    fn auto_activate_list(&self, input: &PolicyInput, tools: &[ResolvedToolConfig]) -> Vec<ToolId> {
        let Some(profile) = &input.profile else {
            return Vec::new();
        };
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for accommodation_id in &profile.auto_activate {
            let tool_id = self.mapping.resolve_tool_id(accommodation_id);
            let enabled = tools
                .iter()
                .any(|tool| tool.tool_id == tool_id && tool.enabled);
            if enabled && seen.insert(tool_id.clone()) {
                out.push(tool_id);
            }
        }
        out
    }
}

// ============================================================================
// SECTION: Union Collection
// ============================================================================

/// Collects the union of every accommodation identifier mentioned by any
/// source, in sorted order.
///
/// Session-override keys are deliberately excluded: an override for an
/// identifier no other source mentions has no effect. Auto-activate
/// identifiers are collected; one that is not also granted matches no rule
/// and is recorded as a skip.
fn collect_mentioned(input: &PolicyInput) -> BTreeSet<AccommodationId> {
    let mut mentioned = BTreeSet::new();
    if let Some(institution) = &input.institution {
        mentioned.extend(institution.blocked.iter().cloned());
        mentioned.extend(institution.required.iter().cloned());
    }
    if let Some(item) = &input.item {
        mentioned.extend(item.required.iter().cloned());
        mentioned.extend(item.restricted.iter().cloned());
    }
    if let Some(profile) = &input.profile {
        mentioned.extend(profile.granted.iter().cloned());
        mentioned.extend(profile.auto_activate.iter().cloned());
    }
    mentioned
}

// ============================================================================
// SECTION: Precedence Chain
// ============================================================================

/// Evaluates the six-rank precedence chain for one accommodation
/// identifier, short-circuiting at the first matching rank.
fn evaluate_chain(id: &AccommodationId, input: &PolicyInput) -> Option<RuleMatch> {
    // Rank 1: institutional block list. Unconditional veto.
    if let Some(institution) = &input.institution
        && institution.blocked.contains(id)
    {
        return Some(RuleMatch::block(
            PolicyRule::InstitutionBlock,
            DecisionSource::Institution,
            "blocked by institutional policy",
            Value::String(id.as_str().to_string()),
        ));
    }

    // Rank 2: session override explicitly disabled.
    if let Some(session) = &input.session
        && session.is_disabled(id)
    {
        return Some(RuleMatch::block(
            PolicyRule::SessionDisable,
            DecisionSource::Session,
            "explicitly disabled for this session",
            Value::Bool(false),
        ));
    }

    // Rank 3: item-level restriction list.
    if let Some(item) = &input.item
        && item.restricted.contains(id)
    {
        return Some(RuleMatch::block(
            PolicyRule::ItemRestriction,
            DecisionSource::Item,
            "restricted by the item author",
            Value::String(id.as_str().to_string()),
        ));
    }

    // Rank 4: item-level requirement list.
    if let Some(item) = &input.item
        && item.required.contains(id)
    {
        return Some(RuleMatch::enable(
            PolicyRule::ItemRequirement,
            DecisionSource::Item,
            true,
            false,
            "required by item settings",
            Value::String(id.as_str().to_string()),
        ));
    }

    // Rank 5: institutional requirement list.
    if let Some(institution) = &input.institution
        && institution.required.contains(id)
    {
        return Some(RuleMatch::enable(
            PolicyRule::InstitutionRequirement,
            DecisionSource::Institution,
            true,
            false,
            "required by institutional policy",
            Value::String(id.as_str().to_string()),
        ));
    }

    // Rank 6: accommodation profile grant, unless the student opted out.
    if let Some(profile) = &input.profile
        && profile.granted.contains(id)
    {
        if profile.prohibited.contains(id) {
            return Some(RuleMatch::block(
                PolicyRule::ProfileProhibited,
                DecisionSource::Profile,
                "granted but prohibited by student override",
                Value::String(id.as_str().to_string()),
            ));
        }
        return Some(RuleMatch::enable(
            PolicyRule::ProfileGrant,
            DecisionSource::Profile,
            false,
            true,
            "granted by accommodation profile",
            Value::String(id.as_str().to_string()),
        ));
    }

    None
}

// ============================================================================
// SECTION: Settings Merge
// ============================================================================

/// Merges per-tool settings, item-level over assessment-level.
///
/// When both levels supply JSON objects the keys are shallow-merged with
/// item-level keys winning; any other shape is replaced wholesale by the
/// item-level value.
fn merge_settings(tool_id: &ToolId, input: &PolicyInput) -> Value {
    let assessment = input
        .institution
        .as_ref()
        .and_then(|institution| institution.tool_settings.get(tool_id));
    let item = input
        .item
        .as_ref()
        .and_then(|item| item.tool_settings.get(tool_id));

    match (assessment, item) {
        (Some(Value::Object(base)), Some(Value::Object(overlay))) => {
            let mut merged: Map<String, Value> = base.clone();
            for (key, value) in overlay {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        (_, Some(item)) => item.clone(),
        (Some(assessment), None) => assessment.clone(),
        (None, None) => Value::Null,
    }
}

// ============================================================================
// SECTION: Config Merging
// ============================================================================

/// Inserts a resolved config, merging when several accommodation
/// identifiers resolve to the same tool.
///
/// A block always dominates an enable for the shared tool; two enables
/// merge their `required` and `always_available` flags.
fn upsert_config(tools: &mut Vec<ResolvedToolConfig>, config: ResolvedToolConfig) {
    let Some(existing) = tools.iter_mut().find(|tool| tool.tool_id == config.tool_id) else {
        tools.push(config);
        return;
    };
    if !config.enabled {
        if existing.enabled {
            *existing = config;
        }
    } else if existing.enabled {
        existing.required |= config.required;
        existing.always_available |= config.always_available;
    }
}

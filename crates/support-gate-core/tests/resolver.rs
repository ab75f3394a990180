// crates/support-gate-core/tests/resolver.rs
// ============================================================================
// Module: Resolver Tests
// Description: Validate the six-rank precedence chain and result queries.
// Purpose: Ensure precedence, provenance, and determinism behave exactly as
//          specified.
// ============================================================================

//! Precedence-chain behavior tests for policy resolution.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use serde_json::Value;
use serde_json::json;
use support_gate_core::AccommodationId;
use support_gate_core::AccommodationMap;
use support_gate_core::AccommodationProfile;
use support_gate_core::DecisionAction;
use support_gate_core::DecisionSource;
use support_gate_core::InstitutionPolicy;
use support_gate_core::ItemSettings;
use support_gate_core::PolicyInput;
use support_gate_core::PolicyResolver;
use support_gate_core::PolicyRule;
use support_gate_core::SessionOverride;
use support_gate_core::ToolId;

fn acc(id: &str) -> AccommodationId {
    AccommodationId::new(id)
}

fn tool(id: &str) -> ToolId {
    ToolId::new(id)
}

fn resolver() -> PolicyResolver {
    PolicyResolver::new(AccommodationMap::with_standard_vocabulary())
}

fn granted_profile(ids: &[&str]) -> AccommodationProfile {
    AccommodationProfile {
        granted: ids.iter().map(|id| acc(id)).collect(),
        ..AccommodationProfile::default()
    }
}

#[test]
fn institutional_block_beats_profile_grant() {
    // Policy blocks the calculator accommodation while the profile grants
    // it.
    let input = PolicyInput {
        institution: Some(InstitutionPolicy {
            blocked: vec![acc("on-screen-calculator")],
            ..InstitutionPolicy::default()
        }),
        profile: Some(granted_profile(&["on-screen-calculator"])),
        ..PolicyInput::default()
    };

    let resolution = resolver().resolve(&input, None);
    assert!(!resolution.is_enabled(&tool("calculator")));
    assert!(resolution.enabled_tools().is_empty());

    let record = resolution
        .provenance
        .decision_for(&acc("on-screen-calculator"))
        .expect("decision record");
    assert_eq!(record.rank, Some(1));
    assert_eq!(record.rule, PolicyRule::InstitutionBlock);
    assert_eq!(record.action, DecisionAction::Block);
}

#[test]
fn item_requirement_enables_required_tool() {
    // The item requires text-to-speech and no other source mentions it.
    let input = PolicyInput {
        item: Some(ItemSettings {
            required: vec![acc("text-to-speech")],
            ..ItemSettings::default()
        }),
        ..PolicyInput::default()
    };

    let resolution = resolver().resolve(&input, None);
    let config = resolution
        .config_for(&tool("textToSpeech"))
        .expect("resolved config");
    assert!(config.enabled);
    assert!(config.required);
    assert!(!config.always_available);
    assert_eq!(config.source, DecisionSource::Item);
}

#[test]
fn granted_but_prohibited_is_blocked() {
    // The profile grants the highlighter but also prohibits it.
    let input = PolicyInput {
        profile: Some(AccommodationProfile {
            granted: vec![acc("highlighter")],
            prohibited: vec![acc("highlighter")],
            ..AccommodationProfile::default()
        }),
        ..PolicyInput::default()
    };

    let resolution = resolver().resolve(&input, None);
    assert!(!resolution.is_enabled(&tool("highlighter")));

    let record = resolution
        .provenance
        .decision_for(&acc("highlighter"))
        .expect("decision record");
    assert_eq!(record.rank, Some(6));
    assert_eq!(record.rule, PolicyRule::ProfileProhibited);
    assert_eq!(record.action, DecisionAction::Block);
}

#[test]
fn unmapped_accommodation_falls_back_to_raw_id() {
    // No mapping exists for the custom accommodation.
    let input = PolicyInput {
        profile: Some(granted_profile(&["x-custom-tool"])),
        ..PolicyInput::default()
    };

    let resolution = resolver().resolve(&input, None);
    let config = resolution
        .config_for(&tool("x-custom-tool"))
        .expect("fallback config");
    assert!(config.enabled);
    assert!(config.always_available);
}

#[test]
fn session_disable_blocks_granted_accommodation() {
    let input = PolicyInput {
        session: Some(SessionOverride {
            overrides: [(acc("highlighter"), false)].into_iter().collect(),
        }),
        profile: Some(granted_profile(&["highlighter"])),
        ..PolicyInput::default()
    };

    let resolution = resolver().resolve(&input, None);
    assert!(!resolution.is_enabled(&tool("highlighter")));

    let record = resolution
        .provenance
        .decision_for(&acc("highlighter"))
        .expect("decision record");
    assert_eq!(record.rank, Some(2));
    assert_eq!(record.rule, PolicyRule::SessionDisable);
}

#[test]
fn session_enable_alone_places_nothing_under_consideration() {
    // An explicit enable for an id no other source mentions has no effect.
    let input = PolicyInput {
        session: Some(SessionOverride {
            overrides: [(acc("highlighter"), true)].into_iter().collect(),
        }),
        ..PolicyInput::default()
    };

    let resolution = resolver().resolve(&input, None);
    assert!(resolution.tools.is_empty());
    assert!(resolution.provenance.decisions.is_empty());
}

#[test]
fn item_restriction_beats_item_requirement() {
    // Rank 3 short-circuits before rank 4 even within the same source.
    let input = PolicyInput {
        item: Some(ItemSettings {
            required: vec![acc("on-screen-calculator")],
            restricted: vec![acc("on-screen-calculator")],
            ..ItemSettings::default()
        }),
        ..PolicyInput::default()
    };

    let resolution = resolver().resolve(&input, None);
    assert!(!resolution.is_enabled(&tool("calculator")));

    let record = resolution
        .provenance
        .decision_for(&acc("on-screen-calculator"))
        .expect("decision record");
    assert_eq!(record.rank, Some(3));
    assert_eq!(record.rule, PolicyRule::ItemRestriction);
}

#[test]
fn institution_requirement_applies_when_item_is_silent() {
    let input = PolicyInput {
        institution: Some(InstitutionPolicy {
            required: vec![acc("line-reader")],
            ..InstitutionPolicy::default()
        }),
        ..PolicyInput::default()
    };

    let resolution = resolver().resolve(&input, None);
    let config = resolution
        .config_for(&tool("lineReader"))
        .expect("resolved config");
    assert!(config.enabled);
    assert!(config.required);
    assert_eq!(config.source, DecisionSource::Institution);

    let record = resolution
        .provenance
        .decision_for(&acc("line-reader"))
        .expect("decision record");
    assert_eq!(record.rank, Some(5));
    assert_eq!(record.rule, PolicyRule::InstitutionRequirement);
}

#[test]
fn profile_grant_is_always_available_not_required() {
    let input = PolicyInput {
        profile: Some(granted_profile(&["magnification"])),
        ..PolicyInput::default()
    };

    let resolution = resolver().resolve(&input, None);
    let config = resolution
        .config_for(&tool("magnifier"))
        .expect("resolved config");
    assert!(config.enabled);
    assert!(!config.required);
    assert!(config.always_available);
    // Required queries treat always-available as required for UI purposes.
    assert!(resolution.is_required(&tool("magnifier")));
}

#[test]
fn precedence_emits_exactly_one_decision_per_id() {
    // The id appears in every list; only rank 1 may produce a record.
    let id = acc("text-to-speech");
    let input = PolicyInput {
        institution: Some(InstitutionPolicy {
            blocked: vec![id.clone()],
            required: vec![id.clone()],
            ..InstitutionPolicy::default()
        }),
        session: Some(SessionOverride {
            overrides: [(id.clone(), false)].into_iter().collect(),
        }),
        item: Some(ItemSettings {
            required: vec![id.clone()],
            restricted: vec![id.clone()],
            ..ItemSettings::default()
        }),
        profile: Some(granted_profile(&["text-to-speech"])),
        ..PolicyInput::default()
    };

    let resolution = resolver().resolve(&input, None);
    let records: Vec<_> = resolution
        .provenance
        .decisions
        .iter()
        .filter(|record| record.accommodation_id == id)
        .collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].rank, Some(1));
}

#[test]
fn resolution_is_deterministic() {
    let input = PolicyInput {
        institution: Some(InstitutionPolicy {
            blocked: vec![acc("on-screen-calculator")],
            required: vec![acc("line-reader")],
            ..InstitutionPolicy::default()
        }),
        item: Some(ItemSettings {
            required: vec![acc("text-to-speech")],
            ..ItemSettings::default()
        }),
        profile: Some(granted_profile(&["highlighter", "magnification"])),
        ..PolicyInput::default()
    };

    let resolver = resolver();
    let first = resolver.resolve(&input, None);
    let second = resolver.resolve(&input, None);
    assert_eq!(first, second);
}

#[test]
fn item_settings_override_assessment_settings() {
    let input = PolicyInput {
        institution: Some(InstitutionPolicy {
            required: vec![acc("text-to-speech")],
            tool_settings: [(
                tool("textToSpeech"),
                json!({"rate": 1.0, "voice": "standard"}),
            )]
            .into_iter()
            .collect(),
            ..InstitutionPolicy::default()
        }),
        item: Some(ItemSettings {
            tool_settings: [(tool("textToSpeech"), json!({"rate": 0.75}))]
                .into_iter()
                .collect(),
            ..ItemSettings::default()
        }),
        ..PolicyInput::default()
    };

    let resolution = resolver().resolve(&input, None);
    let settings = resolution
        .settings_for(&tool("textToSpeech"))
        .expect("merged settings");
    assert_eq!(settings, &json!({"rate": 0.75, "voice": "standard"}));
}

#[test]
fn override_profile_does_not_mutate_input() {
    let input = PolicyInput {
        profile: Some(granted_profile(&["highlighter"])),
        ..PolicyInput::default()
    };
    let snapshot = input.clone();

    let simulated = granted_profile(&["magnification"]);
    let resolution = resolver().resolve_with_override(&input, &simulated);

    assert_eq!(input, snapshot);
    assert!(resolution.is_enabled(&tool("magnifier")));
    assert!(!resolution.is_enabled(&tool("highlighter")));
}

#[test]
fn disabled_provenance_keeps_resolution_identical() {
    let input = PolicyInput {
        institution: Some(InstitutionPolicy {
            blocked: vec![acc("on-screen-calculator")],
            ..InstitutionPolicy::default()
        }),
        profile: Some(granted_profile(&["highlighter", "on-screen-calculator"])),
        ..PolicyInput::default()
    };

    let tracked = resolver().resolve(&input, None);
    let untracked = resolver().with_provenance(false).resolve(&input, None);

    assert_eq!(tracked.tools, untracked.tools);
    assert_eq!(tracked.auto_activate, untracked.auto_activate);
    assert!(untracked.provenance.decisions.is_empty());
    assert!(untracked.provenance.sources.is_empty());
    assert!(untracked.provenance.action_counts.is_empty());
}

#[test]
fn auto_activate_maps_through_mapping_and_respects_veto() {
    let input = PolicyInput {
        institution: Some(InstitutionPolicy {
            blocked: vec![acc("on-screen-calculator")],
            ..InstitutionPolicy::default()
        }),
        profile: Some(AccommodationProfile {
            granted: vec![acc("text-to-speech"), acc("on-screen-calculator")],
            auto_activate: vec![acc("text-to-speech"), acc("on-screen-calculator")],
            ..AccommodationProfile::default()
        }),
        ..PolicyInput::default()
    };

    let resolution = resolver().resolve(&input, None);
    assert_eq!(resolution.auto_activate_tools(), &[tool("textToSpeech")]);
}

#[test]
fn auto_activate_only_id_is_recorded_as_skip() {
    let input = PolicyInput {
        profile: Some(AccommodationProfile {
            auto_activate: vec![acc("line-reader")],
            ..AccommodationProfile::default()
        }),
        ..PolicyInput::default()
    };

    let resolution = resolver().resolve(&input, None);
    assert!(resolution.tools.is_empty());

    let record = resolution
        .provenance
        .decision_for(&acc("line-reader"))
        .expect("skip record");
    assert_eq!(record.action, DecisionAction::Skip);
    assert_eq!(record.rule, PolicyRule::NotConfigured);
    assert_eq!(record.rank, None);
    assert_eq!(record.source, DecisionSource::Unconfigured);
}

#[test]
fn many_to_one_grants_merge_into_one_config() {
    // Both accommodations map to the textToSpeech tool.
    let input = PolicyInput {
        item: Some(ItemSettings {
            required: vec![acc("read-aloud")],
            ..ItemSettings::default()
        }),
        profile: Some(granted_profile(&["text-to-speech"])),
        ..PolicyInput::default()
    };

    let resolution = resolver().resolve(&input, None);
    let configs: Vec<_> = resolution
        .tools
        .iter()
        .filter(|config| config.tool_id == tool("textToSpeech"))
        .collect();
    assert_eq!(configs.len(), 1);
    assert!(configs[0].enabled);
    assert!(configs[0].required);
    assert!(configs[0].always_available);
    // Provenance still explains both accommodations separately.
    assert_eq!(resolution.provenance.decisions.len(), 2);
}

#[test]
fn shared_tool_block_dominates_enable() {
    // read-aloud is institutionally blocked; text-to-speech is granted.
    // Both resolve to the same tool, which must not surface as enabled.
    let input = PolicyInput {
        institution: Some(InstitutionPolicy {
            blocked: vec![acc("read-aloud")],
            ..InstitutionPolicy::default()
        }),
        profile: Some(granted_profile(&["text-to-speech"])),
        ..PolicyInput::default()
    };

    let resolution = resolver().resolve(&input, None);
    assert!(!resolution.is_enabled(&tool("textToSpeech")));
    assert_eq!(resolution.tools.len(), 1);
}

#[test]
fn absent_sources_hold_no_opinion() {
    let resolution = resolver().resolve(&PolicyInput::default(), None);
    assert!(resolution.tools.is_empty());
    assert!(resolution.provenance.decisions.is_empty());
    assert!(resolution.provenance.sources.is_empty());
}

#[test]
fn provenance_records_present_sources_and_counts() {
    let input = PolicyInput {
        institution: Some(InstitutionPolicy {
            blocked: vec![acc("on-screen-calculator")],
            ..InstitutionPolicy::default()
        }),
        profile: Some(granted_profile(&["highlighter"])),
        ..PolicyInput::default()
    };

    let resolution = resolver().resolve(&input, None);
    let kinds: Vec<_> = resolution
        .provenance
        .sources
        .iter()
        .map(|source| source.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![DecisionSource::Institution, DecisionSource::Profile]
    );
    assert_eq!(
        resolution.provenance.action_counts.get(&DecisionAction::Block),
        Some(&1)
    );
    assert_eq!(
        resolution
            .provenance
            .action_counts
            .get(&DecisionAction::Enable),
        Some(&1)
    );
}

#[test]
fn blocked_config_carries_no_settings() {
    let input = PolicyInput {
        institution: Some(InstitutionPolicy {
            blocked: vec![acc("on-screen-calculator")],
            tool_settings: [(tool("calculator"), json!({"mode": "scientific"}))]
                .into_iter()
                .collect(),
            ..InstitutionPolicy::default()
        }),
        ..PolicyInput::default()
    };

    let resolution = resolver().resolve(&input, None);
    let config = resolution
        .config_for(&tool("calculator"))
        .expect("blocked config");
    assert!(!config.enabled);
    assert_eq!(config.settings, Value::Null);
}

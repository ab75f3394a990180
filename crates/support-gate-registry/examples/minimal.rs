// crates/support-gate-registry/examples/minimal.rs
// ============================================================================
// Module: Support Gate Minimal Example
// Description: Minimal end-to-end two-pass visibility run.
// Purpose: Demonstrate policy resolution followed by context filtering.
// Dependencies: support-gate-core, support-gate-registry, serde_json
// ============================================================================

//! ## Overview
//! Resolves a small policy input (pass 1) and filters the enabled tools
//! against an item context (pass 2) using an in-memory catalog.

use serde_json::json;
use support_gate_core::AccommodationId;
use support_gate_core::AccommodationMap;
use support_gate_core::AccommodationProfile;
use support_gate_core::ContextModel;
use support_gate_core::InstitutionPolicy;
use support_gate_core::ItemContent;
use support_gate_core::PolicyInput;
use support_gate_core::PolicyResolver;
use support_gate_core::ToolId;
use support_gate_core::runtime::relevance::has_minimum_readable_text;
use support_gate_registry::ToolDescriptor;
use support_gate_registry::ToolRegistry;

/// Error type for example preconditions.
#[derive(Debug)]
struct ExampleError(&'static str);

impl std::fmt::Display for ExampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ExampleError {}

/// Builds the catalog used by the example run.
fn build_registry() -> Result<ToolRegistry, Box<dyn std::error::Error>> {
    let mut registry = ToolRegistry::new();
    registry.register(
        ToolDescriptor::new(ToolId::new("textToSpeech"), "Text to Speech")
            .with_accommodations([AccommodationId::new("text-to-speech")])
            .with_relevance(|context: &ContextModel| Ok(has_minimum_readable_text(context))),
    )?;
    registry.register(
        ToolDescriptor::new(ToolId::new("calculator"), "Calculator")
            .with_accommodations([AccommodationId::new("on-screen-calculator")]),
    )?;
    Ok(registry)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let registry = build_registry()?;
    let resolver = PolicyResolver::new(AccommodationMap::with_standard_vocabulary());

    // The institution blocks the calculator; the profile grants both tools.
    let input = PolicyInput {
        institution: Some(InstitutionPolicy {
            blocked: vec![AccommodationId::new("on-screen-calculator")],
            tool_settings: [(ToolId::new("textToSpeech"), json!({"rate": 1.0}))]
                .into_iter()
                .collect(),
            ..InstitutionPolicy::default()
        }),
        profile: Some(AccommodationProfile {
            granted: vec![
                AccommodationId::new("text-to-speech"),
                AccommodationId::new("on-screen-calculator"),
            ],
            ..AccommodationProfile::default()
        }),
        ..PolicyInput::default()
    };

    let context = ContextModel::Item {
        item: ItemContent::new(
            "item-1",
            "<p>Read the passage and summarize the main idea.</p>",
        ),
    };

    // Pass 1: policy decisions with provenance.
    let resolution = resolver.resolve(&input, Some(&context));
    if resolution.is_enabled(&ToolId::new("calculator")) {
        return Err(Box::new(ExampleError("vetoed tool resolved as enabled")));
    }

    // Pass 2: context relevance against the catalog.
    let visible = registry.filter_visible_in_context(&resolution.enabled_tool_ids(), &context);
    if visible.len() != 1 {
        return Err(Box::new(ExampleError("expected exactly one visible tool")));
    }

    let _ = (&resolution.provenance, visible);
    Ok(())
}

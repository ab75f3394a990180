// crates/support-gate-core/tests/relevance.rs
// ============================================================================
// Module: Relevance Heuristic Tests
// Description: Validate markup flattening and content classifiers.
// Purpose: Ensure pass-2 heuristics classify representative content.
// ============================================================================

//! Content-classification tests for the relevance heuristics.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use serde_json::json;
use support_gate_core::ContextModel;
use support_gate_core::ItemContent;
use support_gate_core::runtime::relevance::contains_choice_interaction;
use support_gate_core::runtime::relevance::contains_math;
use support_gate_core::runtime::relevance::contains_science;
use support_gate_core::runtime::relevance::has_minimum_readable_text;
use support_gate_core::runtime::relevance::strip_markup;

fn item_context(markup: &str) -> ContextModel {
    ContextModel::Item {
        item: ItemContent::new("item-1", markup),
    }
}

#[test]
fn strip_markup_removes_tags_and_decodes_entities() {
    let text = strip_markup("<p>Tom&nbsp;&amp;&nbsp;Jerry <b>ran</b>   fast</p>");
    assert_eq!(text, "Tom & Jerry ran fast");
}

#[test]
fn strip_markup_keeps_plain_text_unchanged() {
    assert_eq!(strip_markup("already plain"), "already plain");
}

#[test]
fn mathml_markup_counts_as_math() {
    let context = item_context("<math><mi>x</mi><mo>+</mo><mn>2</mn></math>");
    assert!(contains_math(&context));
}

#[test]
fn inline_arithmetic_counts_as_math() {
    let context = item_context("<p>What is 12 + 30?</p>");
    assert!(contains_math(&context));
}

#[test]
fn math_keyword_counts_as_math() {
    let context = item_context("<p>Write the fraction in lowest terms.</p>");
    assert!(contains_math(&context));
}

#[test]
fn prose_is_not_math() {
    let context = item_context("<p>The fox jumped over the fence.</p>");
    assert!(!contains_math(&context));
}

#[test]
fn chemical_formula_counts_as_science() {
    let context = item_context("<p>Water is H2O and carbon dioxide is CO2.</p>");
    assert!(contains_science(&context));
}

#[test]
fn science_keyword_counts_as_science() {
    let context = item_context("<p>State your hypothesis before the experiment.</p>");
    assert!(contains_science(&context));
}

#[test]
fn choice_interaction_markup_is_detected() {
    let context = item_context("<choiceInteraction responseIdentifier=\"RESPONSE\"/>");
    assert!(contains_choice_interaction(&context));
}

#[test]
fn radio_inputs_count_as_choice_interaction() {
    let context = item_context("<input type=\"radio\" name=\"q1\"/>");
    assert!(contains_choice_interaction(&context));
}

#[test]
fn stripped_text_does_not_trigger_choice_detection() {
    // Choice markers live in markup; flattened prose must not match.
    let context = item_context("<p>Pick the best choice below.</p>");
    assert!(!contains_choice_interaction(&context));
}

#[test]
fn short_content_lacks_readable_text() {
    let context = item_context("<p>7 + 7</p>");
    assert!(!has_minimum_readable_text(&context));
}

#[test]
fn passage_with_prose_has_readable_text() {
    let context = ContextModel::Passage {
        passage_id: "passage-1".to_string(),
        markup: "<p>The migration of monarch butterflies spans generations.</p>".to_string(),
    };
    assert!(has_minimum_readable_text(&context));
}

#[test]
fn element_context_merges_item_model_text() {
    // The science keyword appears only in the owning item's model data,
    // never in the element markup.
    let item = ItemContent::new("item-1", "<div/>").with_model(json!({
        "prompt": {"text": "Describe the experiment you observed."}
    }));
    let context = ContextModel::Element {
        item,
        element_id: "interaction-1".to_string(),
        markup: "<gap/>".to_string(),
    };
    assert!(contains_science(&context));
    assert!(has_minimum_readable_text(&context));
}

#[test]
fn global_context_flattens_to_empty_text() {
    assert_eq!(ContextModel::Global.flattened_text(), "");
    assert!(!has_minimum_readable_text(&ContextModel::Global));
}

#[test]
fn section_title_is_searched() {
    let context = ContextModel::Section {
        section_id: "section-1".to_string(),
        title: "Photosynthesis and plant biology".to_string(),
    };
    assert!(contains_science(&context));
}

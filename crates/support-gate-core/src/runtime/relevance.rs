// crates/support-gate-core/src/runtime/relevance.rs
// ============================================================================
// Module: Content Relevance Heuristics
// Description: Markup flattening and keyword/regex content classifiers.
// Purpose: Gate pass-2 tool visibility against the current content.
// Dependencies: crate::core::context, regex, serde_json
// ============================================================================

//! ## Overview
//! These heuristics answer content-relevance questions for pass 2 of the
//! two-pass visibility model: does this context contain math, science
//! content, a choice-based interaction, or enough readable text to be worth
//! reading aloud? They are deliberately keyword/regex based and are not
//! required to be fully accurate; they gate a soft UX filter, not a
//! compliance decision.
//!
//! Element-level contexts search both the raw element markup and the owning
//! item's model data, since some content appears only in model fields.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::core::context::ContextModel;

// ============================================================================
// SECTION: Compiled Patterns
// ============================================================================

/// Minimum count of alphabetic characters for a context to count as having
/// readable text.
pub const MIN_READABLE_CHARS: usize = 10;

/// Compiles a static pattern known to be valid.
#[allow(
    clippy::expect_used,
    reason = "Patterns are compile-time literals exercised by the relevance tests."
)]
fn static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid static pattern")
}

/// Matches markup tags for stripping.
static TAG: LazyLock<Regex> = LazyLock::new(|| static_regex(r"<[^>]*>"));

/// Matches runs of whitespace for collapsing.
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| static_regex(r"\s+"));

/// Matches inline arithmetic such as `3 + 4` or `12/4 = 3`.
static ARITHMETIC: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"[0-9]\s*[+\-*/×÷=<>]\s*[0-9]"));

/// Matches runs of element-symbol groups such as `H2O` or `CO2`. A match
/// only counts as a formula when it also contains a digit; see
/// [`has_chemical_formula`].
static CHEMICAL_FORMULA: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"\b(?:[A-Z][a-z]?[0-9]*){2,}\b"));

/// Keywords that suggest mathematical content.
const MATH_KEYWORDS: [&str; 8] = [
    "equation",
    "fraction",
    "numerator",
    "denominator",
    "integer",
    "quotient",
    "polynomial",
    "theorem",
];

/// Keywords that suggest science content.
const SCIENCE_KEYWORDS: [&str; 8] = [
    "hypothesis",
    "experiment",
    "molecule",
    "organism",
    "photosynthesis",
    "velocity",
    "chemical",
    "laboratory",
];

/// Markup fragments that indicate a choice-based interaction.
const CHOICE_MARKERS: [&str; 5] = [
    "choiceinteraction",
    "inlinechoiceinteraction",
    "type=\"radio\"",
    "type=\"checkbox\"",
    "<select",
];

// ============================================================================
// SECTION: Markup Flattening
// ============================================================================

/// Strips markup tags, decodes common entities, and collapses whitespace.
#[must_use]
pub fn strip_markup(markup: &str) -> String {
    let stripped = TAG.replace_all(markup, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
}

/// Collects every string leaf in an open model value.
fn collect_model_text(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(text) => out.push(text.clone()),
        Value::Array(values) => {
            for value in values {
                collect_model_text(value, out);
            }
        }
        Value::Object(map) => {
            for value in map.values() {
                collect_model_text(value, out);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Returns the raw markup fragments for a context, before stripping.
fn markup_sources(context: &ContextModel) -> Vec<&str> {
    match context {
        ContextModel::Global => Vec::new(),
        ContextModel::Section { title, .. } => vec![title.as_str()],
        ContextModel::Item { item } => vec![item.markup.as_str()],
        ContextModel::Passage { markup, .. } | ContextModel::Rubric { markup, .. } => {
            vec![markup.as_str()]
        }
        ContextModel::Element { markup, .. } => vec![markup.as_str()],
    }
}

/// Returns the open model data searched alongside the markup, when the
/// context level carries any.
fn model_source(context: &ContextModel) -> Option<&Value> {
    match context {
        ContextModel::Item { item } | ContextModel::Element { item, .. } => Some(&item.model),
        ContextModel::Global
        | ContextModel::Section { .. }
        | ContextModel::Passage { .. }
        | ContextModel::Rubric { .. } => None,
    }
}

impl ContextModel {
    /// Flattens this context to plain text: markup stripped, entities
    /// decoded, model-field strings merged in.
    #[must_use]
    pub fn flattened_text(&self) -> String {
        let mut parts: Vec<String> = markup_sources(self)
            .into_iter()
            .map(strip_markup)
            .filter(|part| !part.is_empty())
            .collect();
        if let Some(model) = model_source(self) {
            let mut model_parts = Vec::new();
            collect_model_text(model, &mut model_parts);
            parts.extend(
                model_parts
                    .iter()
                    .map(|part| strip_markup(part))
                    .filter(|part| !part.is_empty()),
            );
        }
        parts.join(" ")
    }
}

// ============================================================================
// SECTION: Classifiers
// ============================================================================

/// Reports whether the context appears to contain mathematical content.
#[must_use]
pub fn contains_math(context: &ContextModel) -> bool {
    let raw_has_mathml = markup_sources(context)
        .iter()
        .any(|markup| markup.to_ascii_lowercase().contains("<math"));
    if raw_has_mathml {
        return true;
    }
    let text = context.flattened_text().to_ascii_lowercase();
    ARITHMETIC.is_match(&text) || MATH_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

/// Reports whether the text contains a chemical-formula token. The token
/// pattern alone also matches plain acronyms, so a digit is required.
fn has_chemical_formula(text: &str) -> bool {
    CHEMICAL_FORMULA
        .find_iter(text)
        .any(|token| token.as_str().chars().any(|ch| ch.is_ascii_digit()))
}

/// Reports whether the context appears to contain science content.
#[must_use]
pub fn contains_science(context: &ContextModel) -> bool {
    let text = context.flattened_text();
    if has_chemical_formula(&text) {
        return true;
    }
    let lowered = text.to_ascii_lowercase();
    SCIENCE_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

/// Reports whether the context contains a choice-based interaction.
#[must_use]
pub fn contains_choice_interaction(context: &ContextModel) -> bool {
    markup_sources(context).iter().any(|markup| {
        let lowered = markup.to_ascii_lowercase();
        CHOICE_MARKERS.iter().any(|marker| lowered.contains(marker))
    })
}

/// Reports whether the context carries enough readable text to be worth
/// presenting text-oriented tools.
#[must_use]
pub fn has_minimum_readable_text(context: &ContextModel) -> bool {
    let text = context.flattened_text();
    text.chars().filter(|ch| ch.is_alphabetic()).count() >= MIN_READABLE_CHARS
}

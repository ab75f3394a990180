// crates/support-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Runtime Logic
// Description: Precedence resolution and content-relevance heuristics.
// Purpose: Evaluate policy inputs deterministically and classify content.
// Dependencies: crate::core, regex, serde_json
// ============================================================================

//! ## Overview
//! Runtime logic is pure and deterministic: the resolver evaluates the fixed
//! precedence chain over immutable inputs, and the relevance heuristics
//! classify flattened content text. Neither holds state between calls.

pub mod relevance;
pub mod resolver;

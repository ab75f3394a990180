// crates/support-gate-core/src/core/mod.rs
// ============================================================================
// Module: Core Data Model
// Description: Identifiers, context model, policy inputs, resolution outputs,
//              provenance records, and the accommodation mapper.
// Purpose: Define the immutable data shapes consumed and produced by the
//          policy resolver.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The core data model is serialization-stable and free of behavior beyond
//! construction, lookup, and invariant enforcement. All policy logic lives in
//! [`crate::runtime`].

pub mod context;
pub mod identifiers;
pub mod mapping;
pub mod policy;
pub mod provenance;
pub mod resolution;

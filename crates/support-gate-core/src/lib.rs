// crates/support-gate-core/src/lib.rs
// ============================================================================
// Module: Support Gate Core
// Description: Policy resolution engine for assessment support tools.
// Purpose: Resolve heterogeneous accessibility configuration into per-tool
//          decisions with a provenance trail.
// Dependencies: serde, serde_json, regex
// ============================================================================

//! ## Overview
//! Support Gate Core decides, for every accessibility support tool, whether
//! it is available to a given student viewing a given piece of content, and
//! why. Independent configuration authorities (institutional policy, session
//! overrides, item authoring constraints, and the student accommodation
//! profile) are combined through a fixed six-rank precedence chain; every
//! decision is explained by a provenance record.
//!
//! The crate covers pass 1 of the two-pass visibility model: the policy-level
//! allow/block decision. Pass 2 (context relevance against a capability
//! catalog) lives in `support-gate-registry` and consumes the [`Resolution`]
//! produced here together with the [`ContextModel`].
//!
//! Resolution is synchronous, deterministic, and side-effect-free over
//! immutable inputs; it is safe to call concurrently without coordination.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::context::ContextLevel;
pub use core::context::ContextModel;
pub use core::context::ItemContent;
pub use core::identifiers::AccommodationId;
pub use core::identifiers::ToolId;
pub use core::mapping::AccommodationMap;
pub use core::policy::AccommodationProfile;
pub use core::policy::InstitutionPolicy;
pub use core::policy::ItemSettings;
pub use core::policy::PolicyInput;
pub use core::policy::SessionOverride;
pub use core::provenance::DecisionAction;
pub use core::provenance::DecisionRecord;
pub use core::provenance::PolicyRule;
pub use core::provenance::ProvenanceBuilder;
pub use core::provenance::ProvenanceSummary;
pub use core::provenance::SourceRecord;
pub use core::resolution::DecisionSource;
pub use core::resolution::Resolution;
pub use core::resolution::ResolvedToolConfig;
pub use runtime::resolver::PolicyResolver;

// crates/support-gate-registry/src/lib.rs
// ============================================================================
// Module: Support Gate Registry
// Description: Capability catalog with context filtering and lazy loading.
// Purpose: Hold tool descriptors, answer reverse accommodation lookups, and
//          apply pass 2 of the two-pass visibility model.
// Dependencies: support-gate-core, async-trait, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! The registry is the capability catalog: a store of [`ToolDescriptor`]
//! values indexed by tool identifier and, in reverse, by the accommodation
//! identifiers each tool satisfies. It holds no policy knowledge. Pass 1
//! (policy allow/block) happens in `support-gate-core`; the registry applies
//! pass 2, filtering the allowed set against the current content context via
//! each tool's own relevance predicate.
//!
//! Heavyweight tool implementations are loaded lazily through a
//! single-flight loader: concurrent requests for the same tool share one
//! underlying load operation, and a completed load is never re-invoked.
//!
//! Registration and removal are expected to happen during application setup;
//! mutating the catalog while resolution or filtering runs concurrently is
//! caller responsibility and is not lock-protected.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod loader;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::RegistryError;
pub use catalog::RelevanceError;
pub use catalog::RelevancePredicate;
pub use catalog::SettingsError;
pub use catalog::SettingsShape;
pub use catalog::ToolDescriptor;
pub use catalog::ToolRegistry;
pub use loader::LoadError;
pub use loader::ToolModuleLoader;

// crates/support-gate-registry/src/catalog.rs
// ============================================================================
// Module: Capability Catalog
// Description: Tool descriptors, reverse accommodation index, and the
//              pass-2 context filter.
// Purpose: Answer which tools exist, which accommodations they satisfy, and
//          which are relevant to the current content.
// Dependencies: support-gate-core, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! A [`ToolDescriptor`] declares a tool's identity, display metadata, the
//! content levels it supports, the accommodation identifiers it satisfies,
//! its relevance predicate, and an optional settings-shape validator
//! (schema-on-read: settings travel as open JSON and each tool validates its
//! own shape).
//!
//! The [`ToolRegistry`] enforces identifier uniqueness at registration time
//! and maintains a set-valued reverse index from accommodation identifier to
//! tool identifiers. [`ToolRegistry::filter_visible_in_context`] is pass 2
//! of the two-pass model: a relevance predicate failure excludes that tool
//! only and is logged, never propagated, so one broken tool cannot blank the
//! whole toolbar.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use support_gate_core::AccommodationId;
use support_gate_core::ContextLevel;
use support_gate_core::ContextModel;
use support_gate_core::ToolId;
use thiserror::Error;

use crate::loader::LoadError;
use crate::loader::ModuleLoadMap;
use crate::loader::ToolModuleLoader;

// ============================================================================
// SECTION: Registry Errors
// ============================================================================

/// Errors raised by catalog operations.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Structural errors surface at registration time; filtering never raises
///   them.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A descriptor with this tool identifier is already registered.
    #[error("duplicate tool id: {0}")]
    DuplicateTool(ToolId),
    /// No descriptor with this tool identifier is registered.
    #[error("unknown tool id: {0}")]
    UnknownTool(ToolId),
    /// Settings failed the tool's own shape validation.
    #[error("invalid settings for {tool_id}: {message}")]
    InvalidSettings {
        /// Tool whose validator rejected the settings.
        tool_id: ToolId,
        /// Validator message.
        message: String,
    },
}

// ============================================================================
// SECTION: Relevance Predicate
// ============================================================================

/// Error raised by a relevance predicate.
///
/// # Invariants
/// - Treated as "not relevant" by the pass-2 filter; logged, never fatal.
#[derive(Debug, Error)]
pub enum RelevanceError {
    /// The relevance check failed.
    #[error("relevance check failed: {0}")]
    Check(String),
}

/// Per-tool content-relevance predicate for pass 2.
pub trait RelevancePredicate: Send + Sync {
    /// Reports whether the tool is worth rendering in this context.
    ///
    /// # Errors
    ///
    /// Returns [`RelevanceError`] when the check cannot be evaluated; the
    /// filter treats this as "not relevant".
    fn is_visible(&self, context: &ContextModel) -> Result<bool, RelevanceError>;
}

impl<F> RelevancePredicate for F
where
    F: Fn(&ContextModel) -> Result<bool, RelevanceError> + Send + Sync,
{
    fn is_visible(&self, context: &ContextModel) -> Result<bool, RelevanceError> {
        self(context)
    }
}

// ============================================================================
// SECTION: Settings Shape
// ============================================================================

/// Error raised by a settings-shape validator.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings value does not match the tool's declared shape.
    #[error("settings shape mismatch: {0}")]
    Shape(String),
}

/// Schema-on-read validator for a tool's open settings payload.
pub trait SettingsShape: Send + Sync {
    /// Validates the settings value against the tool's declared shape.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the value does not fit the shape.
    fn validate(&self, settings: &Value) -> Result<(), SettingsError>;
}

// ============================================================================
// SECTION: Tool Descriptor
// ============================================================================

/// Catalog entry for one support tool.
///
/// # Invariants
/// - `tool_id` is unique within a registry; registration enforces this.
/// - `supported_levels` gates pass-2 filtering before the predicate runs.
#[derive(Clone)]
pub struct ToolDescriptor {
    /// Tool identifier.
    pub tool_id: ToolId,
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Content levels the tool supports.
    pub supported_levels: BTreeSet<ContextLevel>,
    /// Accommodation identifiers the tool satisfies.
    pub accommodations: Vec<AccommodationId>,
    /// Relevance predicate for pass 2.
    relevance: Arc<dyn RelevancePredicate>,
    /// Optional settings-shape validator.
    settings_shape: Option<Arc<dyn SettingsShape>>,
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("tool_id", &self.tool_id)
            .field("title", &self.title)
            .field("supported_levels", &self.supported_levels)
            .field("accommodations", &self.accommodations)
            .finish_non_exhaustive()
    }
}

/// Default relevance predicate: always relevant.
fn always_relevant(_: &ContextModel) -> Result<bool, RelevanceError> {
    Ok(true)
}

impl ToolDescriptor {
    /// Creates a descriptor that supports every content level and is always
    /// relevant. Narrow it with the builder methods.
    #[must_use]
    pub fn new(tool_id: ToolId, title: impl Into<String>) -> Self {
        Self {
            tool_id,
            title: title.into(),
            description: String::new(),
            supported_levels: BTreeSet::from([
                ContextLevel::Global,
                ContextLevel::Section,
                ContextLevel::Item,
                ContextLevel::Passage,
                ContextLevel::Rubric,
                ContextLevel::Element,
            ]),
            accommodations: Vec::new(),
            relevance: Arc::new(always_relevant),
            settings_shape: None,
        }
    }

    /// Sets the display description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Restricts the content levels the tool supports.
    #[must_use]
    pub fn with_levels(mut self, levels: impl IntoIterator<Item = ContextLevel>) -> Self {
        self.supported_levels = levels.into_iter().collect();
        self
    }

    /// Declares the accommodation identifiers the tool satisfies.
    #[must_use]
    pub fn with_accommodations(
        mut self,
        accommodations: impl IntoIterator<Item = AccommodationId>,
    ) -> Self {
        self.accommodations = accommodations.into_iter().collect();
        self
    }

    /// Sets the relevance predicate.
    #[must_use]
    pub fn with_relevance(mut self, relevance: impl RelevancePredicate + 'static) -> Self {
        self.relevance = Arc::new(relevance);
        self
    }

    /// Sets the settings-shape validator.
    #[must_use]
    pub fn with_settings_shape(mut self, shape: impl SettingsShape + 'static) -> Self {
        self.settings_shape = Some(Arc::new(shape));
        self
    }

    /// Reports whether the tool supports the given content level.
    #[must_use]
    pub fn supports_level(&self, level: ContextLevel) -> bool {
        self.supported_levels.contains(&level)
    }

    /// Runs the relevance predicate against the context.
    ///
    /// # Errors
    ///
    /// Returns [`RelevanceError`] when the predicate cannot be evaluated.
    pub fn is_visible_in_context(&self, context: &ContextModel) -> Result<bool, RelevanceError> {
        self.relevance.is_visible(context)
    }

    /// Validates a settings value against the tool's declared shape.
    /// Descriptors without a validator accept any value.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the value does not fit the shape.
    pub fn validate_settings(&self, settings: &Value) -> Result<(), SettingsError> {
        match &self.settings_shape {
            Some(shape) => shape.validate(settings),
            None => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Tool Registry
// ============================================================================

/// Capability catalog with reverse accommodation index and lazy loading.
///
/// # Invariants
/// - At most one descriptor per tool identifier.
/// - The reverse index contains exactly the associations declared by the
///   registered descriptors.
#[derive(Default)]
pub struct ToolRegistry {
    /// Descriptors indexed by tool identifier.
    tools: BTreeMap<ToolId, ToolDescriptor>,
    /// Reverse index from accommodation identifier to tool identifiers.
    by_accommodation: BTreeMap<AccommodationId, BTreeSet<ToolId>>,
    /// Optional module loader for heavyweight tool implementations.
    loader: Option<Arc<dyn ToolModuleLoader>>,
    /// Single-flight load state keyed by tool identifier.
    modules: ModuleLoadMap,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools)
            .field("by_accommodation", &self.by_accommodation)
            .field("has_loader", &self.loader.is_some())
            .finish_non_exhaustive()
    }
}

impl ToolRegistry {
    /// Creates an empty registry with no module loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a module loader for lazy implementation loading.
    #[must_use]
    pub fn with_module_loader(mut self, loader: Arc<dyn ToolModuleLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Registers a descriptor, indexing its accommodation associations.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTool`] when the identifier is
    /// already registered; never a silent overwrite.
    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<(), RegistryError> {
        if self.tools.contains_key(&descriptor.tool_id) {
            return Err(RegistryError::DuplicateTool(descriptor.tool_id));
        }
        self.index_accommodations(&descriptor);
        self.tools.insert(descriptor.tool_id.clone(), descriptor);
        Ok(())
    }

    /// Removes a descriptor and its accommodation associations, returning
    /// it when present. Removal is idempotent.
    pub fn unregister(&mut self, tool_id: &ToolId) -> Option<ToolDescriptor> {
        let descriptor = self.tools.remove(tool_id)?;
        self.unindex_accommodations(&descriptor);
        Some(descriptor)
    }

    /// Atomically replaces an existing descriptor, re-indexing its
    /// accommodation associations.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownTool`] when no descriptor with this
    /// identifier is registered.
    pub fn replace(&mut self, descriptor: ToolDescriptor) -> Result<(), RegistryError> {
        let Some(previous) = self.tools.remove(&descriptor.tool_id) else {
            return Err(RegistryError::UnknownTool(descriptor.tool_id));
        };
        self.unindex_accommodations(&previous);
        self.index_accommodations(&descriptor);
        self.tools.insert(descriptor.tool_id.clone(), descriptor);
        Ok(())
    }

    /// Looks up a descriptor by tool identifier.
    #[must_use]
    pub fn descriptor(&self, tool_id: &ToolId) -> Option<&ToolDescriptor> {
        self.tools.get(tool_id)
    }

    /// Returns the tool identifiers satisfying an accommodation identifier.
    /// Unknown accommodations yield an empty set, not an error.
    #[must_use]
    pub fn tools_for_accommodation(&self, accommodation: &AccommodationId) -> BTreeSet<ToolId> {
        self.by_accommodation
            .get(accommodation)
            .cloned()
            .unwrap_or_default()
    }

    /// Validates a settings value against the named tool's declared shape.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownTool`] when the tool is not
    /// registered and [`RegistryError::InvalidSettings`] when the tool's
    /// validator rejects the value.
    pub fn validate_settings(
        &self,
        tool_id: &ToolId,
        settings: &Value,
    ) -> Result<(), RegistryError> {
        let Some(descriptor) = self.tools.get(tool_id) else {
            return Err(RegistryError::UnknownTool(tool_id.clone()));
        };
        descriptor
            .validate_settings(settings)
            .map_err(|err| RegistryError::InvalidSettings {
                tool_id: tool_id.clone(),
                message: err.to_string(),
            })
    }

    /// Pass 2 of the two-pass model: filters the policy-allowed tools
    /// against the current content context.
    ///
    /// Unregistered identifiers are skipped with a debug log. Descriptors
    /// whose supported levels exclude the context level are skipped. A
    /// predicate error excludes that tool only; the batch continues.
    #[must_use]
    pub fn filter_visible_in_context(
        &self,
        allowed: &[ToolId],
        context: &ContextModel,
    ) -> Vec<&ToolDescriptor> {
        let level = context.level();
        let mut visible = Vec::new();
        for tool_id in allowed {
            let Some(descriptor) = self.tools.get(tool_id) else {
                tracing::debug!(tool_id = %tool_id, "skipping unregistered tool");
                continue;
            };
            if !descriptor.supports_level(level) {
                continue;
            }
            match descriptor.is_visible_in_context(context) {
                Ok(true) => visible.push(descriptor),
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(
                        tool_id = %tool_id,
                        error = %err,
                        "relevance check failed; excluding tool"
                    );
                }
            }
        }
        visible
    }

    /// Loads the tool's heavyweight implementation at most once.
    ///
    /// Concurrent callers for the same identifier share a single in-flight
    /// load; once complete, later calls return immediately. A failed load
    /// clears the in-flight state so a future call can retry. Without a
    /// registered loader this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the underlying loader fails.
    pub async fn ensure_module_loaded(&self, tool_id: &ToolId) -> Result<(), LoadError> {
        let Some(loader) = &self.loader else {
            return Ok(());
        };
        self.modules.ensure_loaded(loader.as_ref(), tool_id).await
    }

    /// Reports whether the tool's implementation has finished loading.
    #[must_use]
    pub fn is_module_loaded(&self, tool_id: &ToolId) -> bool {
        self.modules.is_loaded(tool_id)
    }

    /// Adds the descriptor's tool identifier to each declared accommodation
    /// set.
    fn index_accommodations(&mut self, descriptor: &ToolDescriptor) {
        for accommodation in &descriptor.accommodations {
            self.by_accommodation
                .entry(accommodation.clone())
                .or_default()
                .insert(descriptor.tool_id.clone());
        }
    }

    /// Removes the descriptor's tool identifier from each declared
    /// accommodation set, dropping sets that become empty.
    fn unindex_accommodations(&mut self, descriptor: &ToolDescriptor) {
        for accommodation in &descriptor.accommodations {
            if let Some(tools) = self.by_accommodation.get_mut(accommodation) {
                tools.remove(&descriptor.tool_id);
                if tools.is_empty() {
                    self.by_accommodation.remove(accommodation);
                }
            }
        }
    }
}

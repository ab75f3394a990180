// crates/support-gate-registry/src/loader.rs
// ============================================================================
// Module: Lazy Module Loader
// Description: Single-flight loading of heavyweight tool implementations.
// Purpose: Guarantee at-most-once loading per tool under concurrent callers.
// Dependencies: support-gate-core, async-trait, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! Tool implementations can be heavy (audio pipelines, rendering bundles)
//! and are loaded on demand. The load map collapses concurrent requests for
//! the same tool into one underlying load operation: the first caller
//! initiates the load, later concurrent callers await the same in-flight
//! operation, and a completed load marks the tool loaded so subsequent calls
//! return immediately without re-invoking the loader.
//!
//! A failed load clears the in-flight entry so a future call can retry.
//! Loads for different tool identifiers proceed independently; there is no
//! timeout or cancellation here, and a hung loader for one tool never blocks
//! loads for other tools.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use async_trait::async_trait;
use support_gate_core::ToolId;
use thiserror::Error;
use tokio::sync::OnceCell;

// ============================================================================
// SECTION: Load Errors
// ============================================================================

/// Errors raised by module loading.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// The underlying loader failed for this tool.
    #[error("module load failed for {tool_id}: {message}")]
    Failed {
        /// Tool whose load failed.
        tool_id: ToolId,
        /// Loader failure message.
        message: String,
    },
}

// ============================================================================
// SECTION: Loader Trait
// ============================================================================

/// Loads a tool's heavyweight implementation.
#[async_trait]
pub trait ToolModuleLoader: Send + Sync {
    /// Loads the implementation for the named tool.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when loading fails; the load map will allow a
    /// later retry.
    async fn load(&self, tool_id: &ToolId) -> Result<(), LoadError>;
}

// ============================================================================
// SECTION: Single-Flight Load Map
// ============================================================================

/// Single-flight load state keyed by tool identifier.
///
/// # Invariants
/// - Each cell initializes at most once; an initialized cell means the tool
///   is loaded.
/// - Entries for failed loads are removed once the failure settles.
#[derive(Debug, Default)]
pub(crate) struct ModuleLoadMap {
    /// Per-tool load cells. An initialized cell marks the tool loaded; an
    /// uninitialized cell marks an in-flight load.
    cells: Mutex<HashMap<ToolId, Arc<OnceCell<()>>>>,
}

impl ModuleLoadMap {
    /// Reports whether the tool's load has completed successfully.
    pub(crate) fn is_loaded(&self, tool_id: &ToolId) -> bool {
        self.lock_cells()
            .get(tool_id)
            .is_some_and(|cell| cell.initialized())
    }

    /// Loads the tool at most once, sharing the in-flight operation with
    /// concurrent callers.
    pub(crate) async fn ensure_loaded(
        &self,
        loader: &dyn ToolModuleLoader,
        tool_id: &ToolId,
    ) -> Result<(), LoadError> {
        let cell = self
            .lock_cells()
            .entry(tool_id.clone())
            .or_default()
            .clone();

        match cell.get_or_try_init(|| loader.load(tool_id)).await {
            Ok(_loaded) => Ok(()),
            Err(err) => {
                tracing::warn!(tool_id = %tool_id, error = %err, "module load failed");
                let mut cells = self.lock_cells();
                // Clear the failed entry so a later call can retry, unless a
                // concurrent retry already succeeded on the same cell.
                if let Some(existing) = cells.get(tool_id)
                    && !existing.initialized()
                {
                    cells.remove(tool_id);
                }
                Err(err)
            }
        }
    }

    /// Locks the cell map, recovering from a poisoned lock.
    fn lock_cells(&self) -> std::sync::MutexGuard<'_, HashMap<ToolId, Arc<OnceCell<()>>>> {
        self.cells.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

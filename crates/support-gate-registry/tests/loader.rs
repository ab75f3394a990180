// crates/support-gate-registry/tests/loader.rs
// ============================================================================
// Module: Loader Tests
// Description: Validate single-flight module loading under concurrency.
// Purpose: Ensure at-most-once loading, retry after failure, and loaderless
//          no-op behavior.
// ============================================================================

//! Single-flight loading tests for the registry.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use support_gate_core::ToolId;
use support_gate_registry::LoadError;
use support_gate_registry::ToolDescriptor;
use support_gate_registry::ToolModuleLoader;
use support_gate_registry::ToolRegistry;

fn tool(id: &str) -> ToolId {
    ToolId::new(id)
}

/// Loader that counts invocations and optionally fails the first call.
struct CountingLoader {
    /// Number of times `load` has been invoked.
    calls: AtomicUsize,
    /// Whether the next call should fail.
    fail_next: AtomicBool,
}

impl CountingLoader {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
        }
    }

    fn failing_once() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_next: AtomicBool::new(true),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolModuleLoader for CountingLoader {
    async fn load(&self, tool_id: &ToolId) -> Result<(), LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Hold the load in flight long enough for callers to pile up.
        tokio::time::sleep(Duration::from_millis(20)).await;
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(LoadError::Failed {
                tool_id: tool_id.clone(),
                message: "bundle fetch failed".to_string(),
            });
        }
        Ok(())
    }
}

fn registry_with(loader: Arc<CountingLoader>) -> ToolRegistry {
    let mut registry = ToolRegistry::new().with_module_loader(loader);
    registry
        .register(ToolDescriptor::new(tool("textToSpeech"), "Text to Speech"))
        .expect("register");
    registry
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_loads_share_one_invocation() {
    let loader = Arc::new(CountingLoader::new());
    let registry = Arc::new(registry_with(Arc::clone(&loader)));

    let mut handles = Vec::new();
    for _ in 0 .. 16 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            registry.ensure_module_loaded(&tool("textToSpeech")).await
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("load");
    }

    assert_eq!(loader.calls(), 1);
    assert!(registry.is_module_loaded(&tool("textToSpeech")));
}

#[tokio::test]
async fn completed_load_is_never_reinvoked() {
    let loader = Arc::new(CountingLoader::new());
    let registry = registry_with(Arc::clone(&loader));

    registry
        .ensure_module_loaded(&tool("textToSpeech"))
        .await
        .expect("first load");
    registry
        .ensure_module_loaded(&tool("textToSpeech"))
        .await
        .expect("second call");

    assert_eq!(loader.calls(), 1);
}

#[tokio::test]
async fn failed_load_allows_retry() {
    let loader = Arc::new(CountingLoader::failing_once());
    let registry = registry_with(Arc::clone(&loader));

    let err = registry
        .ensure_module_loaded(&tool("textToSpeech"))
        .await
        .expect_err("first load fails");
    assert!(matches!(err, LoadError::Failed { .. }));
    assert!(!registry.is_module_loaded(&tool("textToSpeech")));

    registry
        .ensure_module_loaded(&tool("textToSpeech"))
        .await
        .expect("retry succeeds");
    assert_eq!(loader.calls(), 2);
    assert!(registry.is_module_loaded(&tool("textToSpeech")));
}

#[tokio::test]
async fn different_tools_load_independently() {
    let loader = Arc::new(CountingLoader::new());
    let mut registry =
        ToolRegistry::new().with_module_loader(Arc::clone(&loader) as Arc<dyn ToolModuleLoader>);
    registry
        .register(ToolDescriptor::new(tool("textToSpeech"), "Text to Speech"))
        .expect("register tts");
    registry
        .register(ToolDescriptor::new(tool("calculator"), "Calculator"))
        .expect("register calculator");
    let registry = Arc::new(registry);

    let first = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move { registry.ensure_module_loaded(&tool("textToSpeech")).await })
    };
    let second = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move { registry.ensure_module_loaded(&tool("calculator")).await })
    };
    first.await.expect("join").expect("load tts");
    second.await.expect("join").expect("load calculator");

    assert_eq!(loader.calls(), 2);
    assert!(registry.is_module_loaded(&tool("textToSpeech")));
    assert!(registry.is_module_loaded(&tool("calculator")));
}

#[tokio::test]
async fn missing_loader_is_a_noop() {
    let mut registry = ToolRegistry::new();
    registry
        .register(ToolDescriptor::new(tool("highlighter"), "Highlighter"))
        .expect("register");

    registry
        .ensure_module_loaded(&tool("highlighter"))
        .await
        .expect("no-op");
    assert!(!registry.is_module_loaded(&tool("highlighter")));
}

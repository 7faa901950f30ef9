use std::sync::Arc;

use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::backend::InferenceBackend;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("inference engine is not initialized")]
    NotInitialized,
    #[error("engine initialization failed: {0}")]
    Initialization(String),
    #[error("inference backend failed: {0}")]
    Backend(String),
}

/// Process-wide inference engine with an explicit initialize/ready
/// lifecycle. The readiness transition happens exactly once: concurrent
/// first callers block until the single setup execution completes, later
/// callers observe ready without re-entering setup.
pub struct InferenceEngine {
    backend: Arc<dyn InferenceBackend>,
    ready: OnceCell<()>,
}

impl InferenceEngine {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self { backend, ready: OnceCell::new() }
    }

    /// Acquire backend resources. Idempotent and safe under concurrent
    /// invocation; a failed attempt leaves the engine uninitialized so a
    /// later call may retry.
    pub async fn initialize(&self) -> Result<(), EngineError> {
        self.ready
            .get_or_try_init(|| async {
                self.backend
                    .load()
                    .await
                    .map_err(|error| EngineError::Initialization(error.to_string()))?;
                info!(event_name = "system.engine.initialized", "inference engine initialized");
                Ok(())
            })
            .await
            .map(|_| ())
    }

    pub fn ready(&self) -> bool {
        self.ready.initialized()
    }

    /// Run one inference pass.
    ///
    /// Empty prompts short-circuit to an informational response without
    /// touching the backend. Output for non-empty prompts is whatever the
    /// backend produces; callers must not depend on exact bytes.
    pub async fn run_inference(&self, prompt: &str) -> Result<String, EngineError> {
        if !self.ready() {
            return Err(EngineError::NotInitialized);
        }

        if prompt.is_empty() {
            debug!(event_name = "system.engine.empty_prompt", "skipping backend for empty prompt");
            return Ok("[info] No input provided.".to_string());
        }

        self.backend
            .complete(prompt)
            .await
            .map_err(|error| EngineError::Backend(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use anyhow::Result;
    use async_trait::async_trait;

    use super::{EngineError, InferenceEngine};
    use crate::backend::{InferenceBackend, StubBackend};

    #[derive(Default)]
    struct CountingBackend {
        loads: AtomicUsize,
    }

    #[async_trait]
    impl InferenceBackend for CountingBackend {
        async fn load(&self) -> Result<()> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok(())
        }

        async fn complete(&self, prompt: &str) -> Result<String> {
            Ok(prompt.to_string())
        }
    }

    #[tokio::test]
    async fn run_inference_before_initialize_is_rejected() {
        let engine = InferenceEngine::new(Arc::new(StubBackend));

        let error = engine.run_inference("hello").await.expect_err("engine is not ready");
        assert!(matches!(error, EngineError::NotInitialized));
        assert!(!engine.ready());
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let backend = Arc::new(CountingBackend::default());
        let engine = InferenceEngine::new(backend.clone());

        engine.initialize().await.expect("first initialize succeeds");
        engine.initialize().await.expect("second initialize succeeds");

        assert!(engine.ready());
        assert_eq!(backend.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_first_initializers_run_setup_exactly_once() {
        let backend = Arc::new(CountingBackend::default());
        let engine = Arc::new(InferenceEngine::new(backend.clone()));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let engine = engine.clone();
                tokio::spawn(async move { engine.initialize().await })
            })
            .collect();

        for task in tasks {
            task.await.expect("task completes").expect("initialize succeeds");
        }

        assert!(engine.ready());
        assert_eq!(backend.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_prompt_short_circuits_backend() {
        let engine = InferenceEngine::new(Arc::new(StubBackend));
        engine.initialize().await.expect("initialize succeeds");

        let output = engine.run_inference("").await.expect("empty prompt is not an error");
        assert_eq!(output, "[info] No input provided.");
    }

    #[tokio::test]
    async fn non_empty_prompt_reaches_backend() {
        let engine = InferenceEngine::new(Arc::new(StubBackend));
        engine.initialize().await.expect("initialize succeeds");

        let output = engine.run_inference("schedule it").await.expect("inference succeeds");
        assert_eq!(output, "[stubbed inference] SCHEDULE IT");
    }
}

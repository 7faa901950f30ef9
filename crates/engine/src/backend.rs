use anyhow::Result;
use async_trait::async_trait;

/// Boundary to the model runtime.
///
/// `load` acquires model resources and is called exactly once by the
/// engine's initialization guard. `complete` maps a prompt to model output.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn load(&self) -> Result<()> {
        Ok(())
    }

    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Deterministic placeholder backend: echoes the prompt uppercased under a
/// stub marker. Stands in until a real model runtime is wired up.
#[derive(Clone, Copy, Debug, Default)]
pub struct StubBackend;

#[async_trait]
impl InferenceBackend for StubBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        Ok(format!("[stubbed inference] {}", prompt.to_uppercase()))
    }
}

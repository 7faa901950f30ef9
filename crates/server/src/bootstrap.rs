use std::sync::Arc;

use parley_calendar::LocalCalendarProvider;
use parley_core::config::{AppConfig, ConfigError, LoadOptions};
use parley_engine::{EngineError, InferenceEngine, StubBackend};
use thiserror::Error;
use tracing::info;

use crate::pipeline::RequestPipeline;

pub struct Application {
    pub config: AppConfig,
    pub engine: Arc<InferenceEngine>,
    pub pipeline: Arc<RequestPipeline>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("engine initialization failed: {0}")]
    EngineInitialization(#[source] EngineError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        model = %config.engine.model,
        "starting application bootstrap"
    );

    let engine = Arc::new(InferenceEngine::new(Arc::new(StubBackend)));
    engine.initialize().await.map_err(BootstrapError::EngineInitialization)?;
    info!(
        event_name = "system.bootstrap.engine_ready",
        correlation_id = "bootstrap",
        "inference engine ready"
    );

    let pipeline = Arc::new(RequestPipeline::new(
        engine.clone(),
        Arc::new(LocalCalendarProvider),
        config.calendar.default_duration_minutes,
    ));

    Ok(Application { config, engine, pipeline })
}

#[cfg(test)]
mod tests {
    use parley_core::config::LoadOptions;
    use parley_core::IntentKind;

    use crate::bootstrap::bootstrap;

    #[tokio::test]
    async fn bootstrap_produces_a_ready_pipeline() {
        let app = bootstrap(LoadOptions::default()).await.expect("bootstrap succeeds");

        assert!(app.engine.ready());

        let outcome = app
            .pipeline
            .handle("What's the weather", "bootstrap-test")
            .await
            .expect("pipeline handles a request after bootstrap");
        assert_eq!(outcome.result.intent, IntentKind::GenericQuery);
    }
}

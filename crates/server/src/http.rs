use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use parley_core::InterfaceError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::pipeline::{InterpretOutcome, RequestPipeline};

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<RequestPipeline>,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(pipeline: Arc<RequestPipeline>, request_timeout: Duration) -> Self {
        Self { pipeline, request_timeout }
    }
}

#[derive(Debug, Deserialize)]
pub struct InterpretRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub correlation_id: String,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/v1/interpret", post(interpret)).with_state(state)
}

/// The service's single operation: free-text prompt in, structured intent
/// payload (plus optional calendar outcome) out. The pipeline call is
/// bounded by the configured per-request timeout.
pub async fn interpret(
    State(state): State<AppState>,
    Json(request): Json<InterpretRequest>,
) -> Result<Json<InterpretOutcome>, (StatusCode, Json<ErrorBody>)> {
    let correlation_id = Uuid::new_v4().to_string();

    info!(
        event_name = "ingress.http.request_received",
        correlation_id = %correlation_id,
        prompt_chars = request.prompt.chars().count(),
        "interpret request received"
    );

    let pipeline_call = state.pipeline.handle(&request.prompt, &correlation_id);
    let handled = tokio::time::timeout(state.request_timeout, pipeline_call).await;

    match handled {
        Ok(Ok(outcome)) => {
            info!(
                event_name = "ingress.http.request_completed",
                correlation_id = %correlation_id,
                calendar_attached = outcome.calendar.is_some(),
                "interpret request completed"
            );
            Ok(Json(outcome))
        }
        Ok(Err(error)) => {
            warn!(
                event_name = "ingress.http.request_failed",
                correlation_id = %correlation_id,
                error = %error,
                "interpret request failed"
            );
            let class = error.class();
            let interface = error.into_interface(correlation_id.clone());
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorBody {
                    error: class,
                    message: interface.user_message().to_string(),
                    correlation_id,
                }),
            ))
        }
        Err(_elapsed) => {
            let interface = InterfaceError::Timeout {
                message: "request exceeded the configured timeout".to_string(),
                correlation_id: correlation_id.clone(),
            };
            warn!(
                event_name = "ingress.http.request_timeout",
                correlation_id = %correlation_id,
                timeout_secs = state.request_timeout.as_secs(),
                error = %interface,
                "interpret request exceeded the per-request timeout"
            );
            Err((
                StatusCode::GATEWAY_TIMEOUT,
                Json(ErrorBody {
                    error: "timeout",
                    message: interface.user_message().to_string(),
                    correlation_id,
                }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{extract::State, http::StatusCode, Json};
    use parley_calendar::LocalCalendarProvider;
    use parley_core::IntentKind;
    use parley_engine::{InferenceEngine, StubBackend};

    use super::{interpret, AppState, InterpretRequest};
    use crate::pipeline::RequestPipeline;

    fn state_with(engine: Arc<InferenceEngine>) -> AppState {
        let pipeline =
            Arc::new(RequestPipeline::new(engine, Arc::new(LocalCalendarProvider), 30));
        AppState::new(pipeline, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn interpret_returns_payload_for_ready_engine() {
        let engine = Arc::new(InferenceEngine::new(Arc::new(StubBackend)));
        engine.initialize().await.expect("initialize succeeds");

        let response = interpret(
            State(state_with(engine)),
            Json(InterpretRequest { prompt: "What's the weather".to_string() }),
        )
        .await;

        let Json(outcome) = response.expect("request succeeds");
        assert_eq!(outcome.result.intent, IntentKind::GenericQuery);
        assert!(outcome.calendar.is_none());
    }

    #[tokio::test]
    async fn interpret_surfaces_engine_not_ready_as_labeled_503() {
        let engine = Arc::new(InferenceEngine::new(Arc::new(StubBackend)));

        let response = interpret(
            State(state_with(engine)),
            Json(InterpretRequest { prompt: "schedule a meeting".to_string() }),
        )
        .await;

        let (status, Json(body)) = response.expect_err("engine is not ready");
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.error, "engine_not_ready");
        assert!(!body.correlation_id.is_empty());
    }

    #[tokio::test]
    async fn interpret_attaches_calendar_outcome_for_complete_schedule_intent() {
        let engine = Arc::new(InferenceEngine::new(Arc::new(StubBackend)));
        engine.initialize().await.expect("initialize succeeds");

        let response = interpret(
            State(state_with(engine)),
            Json(InterpretRequest {
                prompt: "Schedule a meeting with Alice next Friday at 3pm".to_string(),
            }),
        )
        .await;

        let Json(outcome) = response.expect("request succeeds");
        assert_eq!(outcome.result.intent, IntentKind::ScheduleEvent);
        let calendar = outcome.calendar.expect("calendar outcome attached");
        assert!(calendar.success);
        assert!(calendar.event_id.is_some());
    }
}

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use parley_engine::InferenceEngine;
use serde::Serialize;
use tracing::{error, info};

#[derive(Clone)]
pub struct HealthState {
    engine: Arc<InferenceEngine>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub engine: HealthCheck,
    pub checked_at: String,
}

pub fn router(engine: Arc<InferenceEngine>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { engine })
}

pub async fn spawn(host: &str, port: u16, engine: Arc<InferenceEngine>) -> std::io::Result<()> {
    let address = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.health.start",
        correlation_id = "bootstrap",
        bind_address = %address,
        "health endpoint started"
    );

    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router(engine)).await {
            error!(
                event_name = "system.health.error",
                correlation_id = "bootstrap",
                error = %err,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let engine = engine_check(&state.engine);
    let ready = engine.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "parley-server runtime initialized".to_string(),
        },
        engine,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn engine_check(engine: &InferenceEngine) -> HealthCheck {
    if engine.ready() {
        HealthCheck { status: "ready", detail: "inference engine initialized".to_string() }
    } else {
        HealthCheck {
            status: "degraded",
            detail: "inference engine has not completed initialization".to_string(),
        }
    }
}

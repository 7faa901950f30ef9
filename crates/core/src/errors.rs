use thiserror::Error;

/// Failures that terminate a single request inside the pipeline.
///
/// Extraction itself never fails; only the inference stage can abort a
/// request. Calendar failures are carried in the response body instead, so
/// the extraction result is still delivered.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("inference engine is not initialized")]
    EngineNotReady,
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Service-boundary errors as reported to the transport caller.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("request timed out: {message}")]
    Timeout { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Timeout { .. } => "The request took too long and was cancelled.",
        }
    }
}

impl PipelineError {
    /// Stable machine-readable label for error responses.
    pub fn class(&self) -> &'static str {
        match self {
            Self::EngineNotReady => "engine_not_ready",
            Self::Inference(_) => "inference_failed",
        }
    }

    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        match self {
            Self::EngineNotReady => InterfaceError::ServiceUnavailable {
                message: "inference engine is not initialized".to_owned(),
                correlation_id,
            },
            Self::Inference(message) => {
                InterfaceError::ServiceUnavailable { message, correlation_id }
            }
        }
    }
}

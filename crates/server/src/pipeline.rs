use std::sync::Arc;

use chrono::Utc;
use parley_calendar::{resolve_start_time, CalendarProvider, EventOutcome, EventRequest};
use parley_core::{IntentExtractor, IntentKind, IntentPayload, PipelineError};
use parley_engine::{EngineError, InferenceEngine};
use serde::Serialize;
use tracing::{debug, info, warn};

/// One request's worth of output: the extraction payload, plus the calendar
/// outcome when a complete schedule intent triggered the action.
#[derive(Clone, Debug, Serialize)]
pub struct InterpretOutcome {
    pub result: IntentPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar: Option<EventOutcome>,
}

/// Couples inference output to intent extraction and, conditionally, the
/// calendar action. Stateless per request; safe to share across tasks.
pub struct RequestPipeline {
    extractor: IntentExtractor,
    engine: Arc<InferenceEngine>,
    provider: Arc<dyn CalendarProvider>,
    default_duration_minutes: u32,
}

impl RequestPipeline {
    pub fn new(
        engine: Arc<InferenceEngine>,
        provider: Arc<dyn CalendarProvider>,
        default_duration_minutes: u32,
    ) -> Self {
        Self { extractor: IntentExtractor::new(), engine, provider, default_duration_minutes }
    }

    pub async fn handle(
        &self,
        prompt: &str,
        correlation_id: &str,
    ) -> Result<InterpretOutcome, PipelineError> {
        let inference_text =
            self.engine.run_inference(prompt).await.map_err(|error| match error {
                EngineError::NotInitialized => PipelineError::EngineNotReady,
                other => PipelineError::Inference(other.to_string()),
            })?;

        let extraction = self.extractor.extract(&inference_text);
        info!(
            event_name = "pipeline.intent_extracted",
            correlation_id = %correlation_id,
            intent = ?extraction.intent,
            has_person = extraction.person.is_some(),
            has_date_hint = extraction.date_hint.is_some(),
            has_time_hint = extraction.time_hint.is_some(),
            "intent extracted from inference output"
        );

        let calendar = if extraction.intent == IntentKind::ScheduleEvent {
            self.try_schedule(&extraction, correlation_id).await
        } else {
            None
        };

        Ok(InterpretOutcome { result: extraction.into(), calendar })
    }

    /// Invoke the calendar action when the schedule intent carries enough
    /// slots. Missing person or unresolvable hints skip the action; the
    /// extraction result still goes back to the caller.
    async fn try_schedule(
        &self,
        extraction: &parley_core::ExtractionResult,
        correlation_id: &str,
    ) -> Option<EventOutcome> {
        let Some(person) = extraction.person.as_deref().filter(|name| !name.is_empty()) else {
            debug!(
                event_name = "pipeline.calendar_skipped",
                correlation_id = %correlation_id,
                reason = "missing_person",
                "schedule intent without a person slot"
            );
            return None;
        };

        let Some(start_time) = resolve_start_time(
            extraction.date_hint.as_deref(),
            extraction.time_hint.as_deref(),
            Utc::now(),
        ) else {
            debug!(
                event_name = "pipeline.calendar_skipped",
                correlation_id = %correlation_id,
                reason = "unresolvable_start_time",
                "schedule intent without a usable date/time hint"
            );
            return None;
        };

        let request = EventRequest {
            person: person.to_string(),
            start_time,
            duration_minutes: self.default_duration_minutes,
        };

        // One attempt only; a provider-side failure is reported, not retried.
        let outcome = self.provider.create_event(&request).await;
        if !outcome.success {
            warn!(
                event_name = "pipeline.calendar_failed",
                correlation_id = %correlation_id,
                message = %outcome.message,
                "calendar provider rejected the event"
            );
        }
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use parley_calendar::{CalendarProvider, EventOutcome, EventRequest, LocalCalendarProvider};
    use parley_core::{IntentKind, PipelineError};
    use parley_engine::{InferenceEngine, StubBackend};

    use super::RequestPipeline;

    #[derive(Default)]
    struct ScriptedProvider {
        fail_with: Option<String>,
        calls: AtomicUsize,
        last_request: std::sync::Mutex<Option<EventRequest>>,
    }

    #[async_trait]
    impl CalendarProvider for ScriptedProvider {
        async fn create_event(&self, request: &EventRequest) -> EventOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().expect("lock") = Some(request.clone());
            match &self.fail_with {
                Some(message) => EventOutcome::failed(message.clone()),
                None => EventOutcome::created("evt-1".to_string(), "created"),
            }
        }
    }

    async fn ready_engine() -> Arc<InferenceEngine> {
        let engine = Arc::new(InferenceEngine::new(Arc::new(StubBackend)));
        engine.initialize().await.expect("initialize succeeds");
        engine
    }

    #[tokio::test]
    async fn uninitialized_engine_aborts_before_extraction() {
        let engine = Arc::new(InferenceEngine::new(Arc::new(StubBackend)));
        let provider = Arc::new(ScriptedProvider::default());
        let pipeline = RequestPipeline::new(engine, provider.clone(), 30);

        let error = pipeline.handle("schedule with alice", "req-1").await.expect_err("not ready");
        assert_eq!(error, PipelineError::EngineNotReady);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn complete_schedule_intent_triggers_calendar_action() {
        let provider = Arc::new(ScriptedProvider::default());
        let pipeline = RequestPipeline::new(ready_engine().await, provider.clone(), 45);

        let outcome = pipeline
            .handle("Schedule a meeting with Alice next Friday at 3pm", "req-2")
            .await
            .expect("pipeline succeeds");

        assert_eq!(outcome.result.intent, IntentKind::ScheduleEvent);
        assert_eq!(outcome.result.person.as_deref(), Some("alice"));
        let calendar = outcome.calendar.expect("calendar action ran");
        assert!(calendar.success);
        assert_eq!(calendar.event_id.as_deref(), Some("evt-1"));

        let request = provider.last_request.lock().expect("lock").clone().expect("request");
        assert_eq!(request.person, "alice");
        assert_eq!(request.duration_minutes, 45);
    }

    #[tokio::test]
    async fn schedule_intent_without_slots_skips_the_action() {
        let provider = Arc::new(ScriptedProvider::default());
        let pipeline = RequestPipeline::new(ready_engine().await, provider.clone(), 30);

        let outcome =
            pipeline.handle("schedule something soon", "req-3").await.expect("pipeline succeeds");

        assert_eq!(outcome.result.intent, IntentKind::ScheduleEvent);
        assert!(outcome.calendar.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn provider_failure_is_reported_not_fatal_and_not_retried() {
        let provider = Arc::new(ScriptedProvider {
            fail_with: Some("provider unavailable".to_string()),
            ..ScriptedProvider::default()
        });
        let pipeline = RequestPipeline::new(ready_engine().await, provider.clone(), 30);

        let outcome = pipeline
            .handle("schedule a meeting with Bob tomorrow at 9am", "req-4")
            .await
            .expect("extraction output still delivered");

        let calendar = outcome.calendar.expect("failure is attached");
        assert!(!calendar.success);
        assert_eq!(calendar.message, "provider unavailable");
        assert!(calendar.event_id.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_schedule_intents_never_touch_the_provider() {
        let provider = Arc::new(ScriptedProvider::default());
        let pipeline = RequestPipeline::new(ready_engine().await, provider.clone(), 30);

        let outcome = pipeline
            .handle("I spent money at the grocery store with Carol today", "req-5")
            .await
            .expect("pipeline succeeds");

        assert_eq!(outcome.result.intent, IntentKind::FinancialSummary);
        assert!(outcome.calendar.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_prompt_flows_through_as_informational_text() {
        let pipeline =
            RequestPipeline::new(ready_engine().await, Arc::new(LocalCalendarProvider), 30);

        let outcome = pipeline.handle("", "req-6").await.expect("pipeline succeeds");

        assert_eq!(outcome.result.intent, IntentKind::GenericQuery);
        assert_eq!(outcome.result.raw, "[info] No input provided.");
        assert!(outcome.calendar.is_none());
    }
}

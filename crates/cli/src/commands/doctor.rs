use std::sync::Arc;

use parley_core::config::{AppConfig, LoadOptions};
use parley_core::{IntentExtractor, IntentKind};
use parley_engine::{InferenceEngine, StubBackend};
use serde::Serialize;

use super::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(_config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_engine_readiness());
            checks.push(check_extraction_smoke());
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "engine_readiness",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "extraction_smoke",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_engine_readiness() -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "engine_readiness",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = runtime.block_on(async {
        let engine = InferenceEngine::new(Arc::new(StubBackend));
        engine
            .initialize()
            .await
            .map_err(|error| format!("engine initialization failed: {error}"))?;
        let output = engine
            .run_inference("doctor probe")
            .await
            .map_err(|error| format!("inference probe failed: {error}"))?;
        if output.is_empty() {
            return Err("inference probe returned empty output".to_string());
        }
        Ok::<(), String>(())
    });

    match result {
        Ok(()) => DoctorCheck {
            name: "engine_readiness",
            status: CheckStatus::Pass,
            details: "engine initialized and answered an inference probe".to_string(),
        },
        Err(details) => DoctorCheck { name: "engine_readiness", status: CheckStatus::Fail, details },
    }
}

fn check_extraction_smoke() -> DoctorCheck {
    let result = IntentExtractor::new().extract("Schedule a meeting with Alice next Friday at 3pm");

    let complete = result.intent == IntentKind::ScheduleEvent
        && result.person.is_some()
        && result.date_hint.is_some()
        && result.time_hint.is_some();

    if complete {
        DoctorCheck {
            name: "extraction_smoke",
            status: CheckStatus::Pass,
            details: "reference phrase produced a complete schedule intent".to_string(),
        }
    } else {
        DoctorCheck {
            name: "extraction_smoke",
            status: CheckStatus::Fail,
            details: format!("reference phrase produced unexpected result: {result:?}"),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];
    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("  [{marker}] {}: {}", check.name, check.details));
    }
    lines.join("\n")
}

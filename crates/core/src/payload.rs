//! External serialization of extraction results.
//!
//! Every payload leaves the process through [`IntentPayload::render`], so
//! escaping happens in exactly one place. Key order is insertion order:
//! `intent`, `person`, `datetime_hint`, `time_hint`, `raw`; optional keys
//! are present exactly when the corresponding slot matched.

use serde::{Deserialize, Serialize};

use crate::intent::{ExtractionResult, IntentKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentPayload {
    pub intent: IntentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime_hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_hint: Option<String>,
    pub raw: String,
}

impl From<ExtractionResult> for IntentPayload {
    fn from(result: ExtractionResult) -> Self {
        Self {
            intent: result.intent,
            person: result.person,
            datetime_hint: result.date_hint,
            time_hint: result.time_hint,
            raw: result.raw_text,
        }
    }
}

impl IntentPayload {
    /// Serialize to the wire form. Quote and newline escaping in `raw` is
    /// handled by the JSON serializer.
    pub fn render(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|error| {
            format!(
                "{{\"intent\":\"generic_query\",\"raw\":\"{}\"}}",
                error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
            )
        })
    }
}

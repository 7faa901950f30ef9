//! Intent extraction from language-model output.
//!
//! Turns loosely-formatted free text into a structured [`ExtractionResult`]:
//! a classified intent plus optional person/date/time slots. Extraction is a
//! total function over arbitrary text; absence of structure degrades to
//! [`IntentKind::GenericQuery`] with no slots filled.

use serde::{Deserialize, Serialize};

/// Classified purpose of an utterance.
///
/// Classification is an ordered keyword test, first match wins:
/// schedule cues before financial cues before the generic fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    ScheduleEvent,
    FinancialSummary,
    GenericQuery,
}

/// Structured result of one extraction pass.
///
/// Optional slots are `None` when no match was found, never empty strings.
/// `raw_text` always carries the original (unlowered) input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractionResult {
    pub intent: IntentKind,
    pub person: Option<String>,
    pub date_hint: Option<String>,
    pub time_hint: Option<String>,
    pub raw_text: String,
}

#[derive(Clone, Debug, Default)]
pub struct IntentExtractor;

impl IntentExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract a structured intent from free text. Never fails.
    ///
    /// Slot extraction runs independently of classification: a financial or
    /// generic utterance still reports a person or date slot if one matches.
    pub fn extract(&self, text: &str) -> ExtractionResult {
        let normalized_text = normalize_text(text);

        ExtractionResult {
            intent: classify_intent(&normalized_text),
            person: extract_person(&normalized_text),
            date_hint: extract_date_hint(&normalized_text),
            time_hint: extract_time_hint(&normalized_text),
            raw_text: text.to_string(),
        }
    }
}

fn normalize_text(text: &str) -> String {
    text.to_lowercase()
}

fn classify_intent(normalized_text: &str) -> IntentKind {
    let spend_cue = normalized_text.contains("spend") || normalized_text.contains("spent");
    if normalized_text.contains("schedule") || normalized_text.contains("meeting") {
        IntentKind::ScheduleEvent
    } else if spend_cue && normalized_text.contains("grocer") {
        IntentKind::FinancialSummary
    } else {
        IntentKind::GenericQuery
    }
}

/// Person slot: the alphabetic run following the first standalone "with".
fn extract_person(normalized_text: &str) -> Option<String> {
    let mut tokens = normalized_text.split_whitespace();
    while let Some(token) = tokens.next() {
        if token != "with" {
            continue;
        }
        let candidate = tokens.next()?;
        let name: String = candidate.chars().take_while(char::is_ascii_alphabetic).collect();
        if name.is_empty() {
            return None;
        }
        return Some(name);
    }
    None
}

/// Date slot: earliest-starting match of the alternatives below wins; at
/// equal start positions the listed order decides. This precedence is
/// load-bearing: reordering the matchers changes observable output.
fn extract_date_hint(normalized_text: &str) -> Option<String> {
    let matchers: [fn(&str, usize) -> Option<String>; 4] =
        [match_next_word, match_tomorrow, match_today, match_month_day];

    for start in word_starts(normalized_text) {
        for matcher in matchers {
            if let Some(hint) = matcher(normalized_text, start) {
                return Some(hint);
            }
        }
    }
    None
}

/// `next <word>`, e.g. "next friday" or "next week".
fn match_next_word(text: &str, start: usize) -> Option<String> {
    let rest = &text[start..];
    let after_keyword = rest.strip_prefix("next")?;
    let trimmed = after_keyword.trim_start();
    if trimmed.len() == after_keyword.len() {
        return None;
    }
    let word_len = trimmed.chars().take_while(|ch| ch.is_ascii_alphabetic()).count();
    if word_len == 0 {
        return None;
    }
    let matched_len = rest.len() - trimmed.len() + word_len;
    Some(rest[..matched_len].to_string())
}

fn match_tomorrow(text: &str, start: usize) -> Option<String> {
    text[start..].starts_with("tomorrow").then(|| "tomorrow".to_string())
}

fn match_today(text: &str, start: usize) -> Option<String> {
    text[start..].starts_with("today").then(|| "today".to_string())
}

/// `<word> <1-2 digit number>`, month-day style, e.g. "march 5".
fn match_month_day(text: &str, start: usize) -> Option<String> {
    let rest = &text[start..];
    let word_len = rest.chars().take_while(|ch| ch.is_ascii_alphabetic()).count();
    if word_len == 0 {
        return None;
    }
    let word: String = rest.chars().take(word_len).collect();
    let after = rest[word_len..].strip_prefix(' ')?;
    let digits: String = after.chars().take_while(|ch| ch.is_ascii_digit()).collect();
    if digits.is_empty() || digits.len() > 2 {
        return None;
    }
    Some(format!("{word} {digits}"))
}

/// Time slot: 1-2 digit hour, optional `:MM`, optional space, optional
/// am/pm. First occurrence in scan order wins.
fn extract_time_hint(normalized_text: &str) -> Option<String> {
    let bytes = normalized_text.as_bytes();
    let mut index = 0;

    while index < bytes.len() {
        if !bytes[index].is_ascii_digit() {
            index += 1;
            continue;
        }

        let digit_count = bytes[index..].iter().take_while(|byte| byte.is_ascii_digit()).count();
        if digit_count > 2 {
            index += digit_count;
            continue;
        }

        let mut end = index + digit_count;
        if bytes.get(end) == Some(&b':') {
            let minute_count =
                bytes[end + 1..].iter().take_while(|byte| byte.is_ascii_digit()).count();
            if minute_count == 2 {
                end += 1 + minute_count;
            }
        }

        let mut meridiem_end = end;
        if bytes.get(meridiem_end) == Some(&b' ') {
            meridiem_end += 1;
        }
        if matches!(normalized_text.get(meridiem_end..meridiem_end + 2), Some("am" | "pm")) {
            end = meridiem_end + 2;
        }

        return Some(normalized_text[index..end].to_string());
    }
    None
}

/// Byte offsets where a word begins: offset 0 plus every position following
/// a non-alphanumeric byte. Drives the left-to-right date scan.
fn word_starts(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut starts = Vec::new();
    for index in 0..bytes.len() {
        let boundary = index == 0 || !bytes[index - 1].is_ascii_alphanumeric();
        if boundary && bytes[index].is_ascii_alphanumeric() {
            starts.push(index);
        }
    }
    starts
}

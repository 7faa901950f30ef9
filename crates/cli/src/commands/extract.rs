use parley_core::{IntentExtractor, IntentPayload};

use super::CommandResult;

/// Run the extractor directly on operator-supplied text, bypassing the
/// engine. Useful for checking what the service would make of a phrase.
pub fn run(text: &str) -> CommandResult {
    let payload = IntentPayload::from(IntentExtractor::new().extract(text));
    CommandResult { exit_code: 0, output: payload.render() }
}

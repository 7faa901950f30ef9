use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use parley_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

use super::CommandResult;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("config", "config_validation", error.to_string(), 1)
        }
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    let fields: [(&str, String, Option<&str>); 8] = [
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            Some("PARLEY_SERVER_BIND_ADDR"),
        ),
        (
            "server.request_timeout_secs",
            config.server.request_timeout_secs.to_string(),
            Some("PARLEY_SERVER_REQUEST_TIMEOUT_SECS"),
        ),
        (
            "server.health_check_port",
            config.server.health_check_port.to_string(),
            Some("PARLEY_SERVER_HEALTH_CHECK_PORT"),
        ),
        ("engine.model", config.engine.model.clone(), Some("PARLEY_ENGINE_MODEL")),
        (
            "engine.api_key",
            redact_secret(config.engine.api_key.as_ref().map(|key| key.expose_secret())),
            Some("PARLEY_ENGINE_API_KEY"),
        ),
        (
            "calendar.default_duration_minutes",
            config.calendar.default_duration_minutes.to_string(),
            Some("PARLEY_CALENDAR_DEFAULT_DURATION_MINUTES"),
        ),
        ("logging.level", config.logging.level.clone(), Some("PARLEY_LOGGING_LEVEL")),
        ("logging.format", format!("{:?}", config.logging.format), Some("PARLEY_LOGGING_FORMAT")),
    ];

    for (key, value, env_var) in fields {
        lines.push(render_line(
            key,
            &value,
            field_source(key, env_var, config_file_doc.as_ref(), config_file_path.as_deref()),
        ));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("  {key} = {value}  ({source})")
}

fn field_source(
    key: &str,
    env_var: Option<&str>,
    file_doc: Option<&Value>,
    file_path: Option<&Path>,
) -> String {
    if let Some(var) = env_var {
        let set = env::var(var).map(|value| !value.trim().is_empty()).unwrap_or(false);
        if set {
            return format!("env: {var}");
        }
    }

    if let (Some(doc), Some(path)) = (file_doc, file_path) {
        if file_doc_has_key(doc, key) {
            return format!("file: {}", path.display());
        }
    }

    "default".to_string()
}

fn file_doc_has_key(doc: &Value, dotted_key: &str) -> bool {
    let mut current = doc;
    for segment in dotted_key.split('.') {
        match current.get(segment) {
            Some(next) => current = next,
            None => return false,
        }
    }
    true
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("parley.toml"), PathBuf::from("config/parley.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn redact_secret(secret: Option<&str>) -> String {
    match secret {
        Some(value) if !value.is_empty() => {
            let visible: String = value.chars().take(4).collect();
            format!("{visible}****")
        }
        _ => "(unset)".to_string(),
    }
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:50061";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub calendar: CalendarConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub request_timeout_secs: u64,
    pub health_check_port: u16,
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub model: String,
    pub api_key: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct CalendarConfig {
    pub default_duration_minutes: u32,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: DEFAULT_BIND_ADDRESS.to_string(),
                request_timeout_secs: 30,
                health_check_port: 8080,
            },
            engine: EngineConfig { model: "stub".to_string(), api_key: None, timeout_secs: 30 },
            calendar: CalendarConfig { default_duration_minutes: 30 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("parley.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(request_timeout_secs) = server.request_timeout_secs {
                self.server.request_timeout_secs = request_timeout_secs;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = health_check_port;
            }
        }

        if let Some(engine) = patch.engine {
            if let Some(model) = engine.model {
                self.engine.model = model;
            }
            if let Some(api_key) = engine.api_key {
                self.engine.api_key = Some(api_key.into());
            }
            if let Some(timeout_secs) = engine.timeout_secs {
                self.engine.timeout_secs = timeout_secs;
            }
        }

        if let Some(calendar) = patch.calendar {
            if let Some(default_duration_minutes) = calendar.default_duration_minutes {
                self.calendar.default_duration_minutes = default_duration_minutes;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PARLEY_SERVER_BIND_ADDR") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("PARLEY_SERVER_REQUEST_TIMEOUT_SECS") {
            self.server.request_timeout_secs =
                parse_u64("PARLEY_SERVER_REQUEST_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("PARLEY_SERVER_HEALTH_CHECK_PORT") {
            self.server.health_check_port = parse_u16("PARLEY_SERVER_HEALTH_CHECK_PORT", &value)?;
        }

        if let Some(value) = read_env("PARLEY_ENGINE_MODEL") {
            self.engine.model = value;
        }
        if let Some(value) = read_env("PARLEY_ENGINE_API_KEY") {
            self.engine.api_key = Some(value.into());
        }
        if let Some(value) = read_env("PARLEY_ENGINE_TIMEOUT_SECS") {
            self.engine.timeout_secs = parse_u64("PARLEY_ENGINE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("PARLEY_CALENDAR_DEFAULT_DURATION_MINUTES") {
            self.calendar.default_duration_minutes =
                parse_u32("PARLEY_CALENDAR_DEFAULT_DURATION_MINUTES", &value)?;
        }

        let log_level = read_env("PARLEY_LOGGING_LEVEL").or_else(|| read_env("PARLEY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PARLEY_LOGGING_FORMAT").or_else(|| read_env("PARLEY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_engine(&self.engine)?;
        validate_calendar(&self.calendar)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("parley.toml"), PathBuf::from("config/parley.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    let (host, port) = server.bind_address.rsplit_once(':').ok_or_else(|| {
        ConfigError::Validation("server.bind_address must be `host:port`".to_string())
    })?;

    if host.trim().is_empty() {
        return Err(ConfigError::Validation(
            "server.bind_address host must not be empty".to_string(),
        ));
    }
    if port.parse::<u16>().map(|value| value == 0).unwrap_or(true) {
        return Err(ConfigError::Validation(
            "server.bind_address port must be a nonzero u16".to_string(),
        ));
    }

    if server.request_timeout_secs == 0 || server.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "server.request_timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if server.health_check_port == 0 {
        return Err(ConfigError::Validation(
            "server.health_check_port must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_engine(engine: &EngineConfig) -> Result<(), ConfigError> {
    if engine.model.trim().is_empty() {
        return Err(ConfigError::Validation("engine.model must not be empty".to_string()));
    }

    if engine.timeout_secs == 0 || engine.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "engine.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_calendar(calendar: &CalendarConfig) -> Result<(), ConfigError> {
    if calendar.default_duration_minutes == 0 {
        return Err(ConfigError::Validation(
            "calendar.default_duration_minutes must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    engine: Option<EnginePatch>,
    calendar: Option<CalendarPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    request_timeout_secs: Option<u64>,
    health_check_port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct EnginePatch {
    model: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct CalendarPatch {
    default_duration_minutes: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

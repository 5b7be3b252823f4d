use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub notion: NotionConfig,
    pub client: ClientConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
    /// Pass record-store diagnostics through to clients in error responses.
    pub expose_error_details: bool,
}

#[derive(Clone, Debug)]
pub struct NotionConfig {
    pub api_key: Option<SecretString>,
    pub database_id: Option<String>,
    pub base_url: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub endpoint_url: String,
    pub confirm_on_failure: bool,
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
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub notion_api_key: Option<String>,
    pub notion_database_id: Option<String>,
    pub notion_base_url: Option<String>,
    pub client_endpoint_url: Option<String>,
    pub confirm_on_failure: Option<bool>,
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

pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["cove.toml", "config/cove.toml"];

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 3000,
                graceful_shutdown_secs: 15,
                expose_error_details: true,
            },
            notion: NotionConfig {
                api_key: None,
                database_id: None,
                base_url: "https://api.notion.com".to_string(),
                api_version: "2022-06-28".to_string(),
                timeout_secs: 30,
            },
            client: ClientConfig {
                endpoint_url: "http://127.0.0.1:3000/api/notion".to_string(),
                confirm_on_failure: true,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
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

impl NotionConfig {
    /// The API key, which the server cannot start without.
    pub fn require_api_key(&self) -> Result<&SecretString, ConfigError> {
        self.api_key.as_ref().filter(|key| !key.expose_secret().trim().is_empty()).ok_or_else(
            || {
                ConfigError::Validation(
                    "notion.api_key is required. Create an internal integration at https://www.notion.so/my-integrations and set NOTION_API_KEY".to_string(),
                )
            },
        )
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
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILES[0]));
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
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
            if let Some(expose_error_details) = server.expose_error_details {
                self.server.expose_error_details = expose_error_details;
            }
        }

        if let Some(notion) = patch.notion {
            if let Some(api_key) = notion.api_key {
                self.notion.api_key = Some(secret_value(api_key));
            }
            if let Some(database_id) = notion.database_id {
                self.notion.database_id = Some(database_id);
            }
            if let Some(base_url) = notion.base_url {
                self.notion.base_url = base_url;
            }
            if let Some(api_version) = notion.api_version {
                self.notion.api_version = api_version;
            }
            if let Some(timeout_secs) = notion.timeout_secs {
                self.notion.timeout_secs = timeout_secs;
            }
        }

        if let Some(client) = patch.client {
            if let Some(endpoint_url) = client.endpoint_url {
                self.client.endpoint_url = endpoint_url;
            }
            if let Some(confirm_on_failure) = client.confirm_on_failure {
                self.client.confirm_on_failure = confirm_on_failure;
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
        if let Some(value) = read_env("COVE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("COVE_SERVER_PORT") {
            self.server.port = parse_u16("COVE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("COVE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("COVE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }
        if let Some(value) = read_env("COVE_SERVER_EXPOSE_ERROR_DETAILS") {
            self.server.expose_error_details =
                parse_bool("COVE_SERVER_EXPOSE_ERROR_DETAILS", &value)?;
        }

        let api_key = read_env("COVE_NOTION_API_KEY").or_else(|| read_env("NOTION_API_KEY"));
        if let Some(value) = api_key {
            self.notion.api_key = Some(secret_value(value));
        }
        let database_id =
            read_env("COVE_NOTION_DATABASE_ID").or_else(|| read_env("NOTION_DATABASE_ID"));
        if let Some(value) = database_id {
            self.notion.database_id = Some(value);
        }
        if let Some(value) = read_env("COVE_NOTION_BASE_URL") {
            self.notion.base_url = value;
        }
        if let Some(value) = read_env("COVE_NOTION_API_VERSION") {
            self.notion.api_version = value;
        }
        if let Some(value) = read_env("COVE_NOTION_TIMEOUT_SECS") {
            self.notion.timeout_secs = parse_u64("COVE_NOTION_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("COVE_CLIENT_ENDPOINT_URL") {
            self.client.endpoint_url = value;
        }
        if let Some(value) = read_env("COVE_CLIENT_CONFIRM_ON_FAILURE") {
            self.client.confirm_on_failure = parse_bool("COVE_CLIENT_CONFIRM_ON_FAILURE", &value)?;
        }

        let log_level = read_env("COVE_LOGGING_LEVEL").or_else(|| read_env("COVE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("COVE_LOGGING_FORMAT").or_else(|| read_env("COVE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(api_key) = overrides.notion_api_key {
            self.notion.api_key = Some(secret_value(api_key));
        }
        if let Some(database_id) = overrides.notion_database_id {
            self.notion.database_id = Some(database_id);
        }
        if let Some(base_url) = overrides.notion_base_url {
            self.notion.base_url = base_url;
        }
        if let Some(endpoint_url) = overrides.client_endpoint_url {
            self.client.endpoint_url = endpoint_url;
        }
        if let Some(confirm_on_failure) = overrides.confirm_on_failure {
            self.client.confirm_on_failure = confirm_on_failure;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_notion(&self.notion)?;
        validate_client(&self.client)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    DEFAULT_CONFIG_FILES.into_iter().map(PathBuf::from).find(|path| path.exists())
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
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_notion(notion: &NotionConfig) -> Result<(), ConfigError> {
    if let Some(api_key) = &notion.api_key {
        let api_key = api_key.expose_secret().trim();
        if !api_key.is_empty() && !(api_key.starts_with("secret_") || api_key.starts_with("ntn_")) {
            return Err(ConfigError::Validation(
                "notion.api_key must start with `secret_` or `ntn_`. Copy the Internal Integration Secret from https://www.notion.so/my-integrations".to_string(),
            ));
        }
    }

    if let Some(database_id) = &notion.database_id {
        if database_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "notion.database_id must not be blank when set".to_string(),
            ));
        }
    }

    if !is_http_url(&notion.base_url) {
        return Err(ConfigError::Validation(
            "notion.base_url must start with http:// or https://".to_string(),
        ));
    }

    if notion.api_version.trim().is_empty() {
        return Err(ConfigError::Validation("notion.api_version must not be empty".to_string()));
    }

    if notion.timeout_secs == 0 || notion.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "notion.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_client(client: &ClientConfig) -> Result<(), ConfigError> {
    if !is_http_url(&client.endpoint_url) {
        return Err(ConfigError::Validation(
            "client.endpoint_url must start with http:// or https://".to_string(),
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

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
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

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    notion: Option<NotionPatch>,
    client: Option<ClientPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
    expose_error_details: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct NotionPatch {
    api_key: Option<String>,
    database_id: Option<String>,
    base_url: Option<String>,
    api_version: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ClientPatch {
    endpoint_url: Option<String>,
    confirm_on_failure: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

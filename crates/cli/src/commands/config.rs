use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use cove_core::config::{AppConfig, LoadOptions, DEFAULT_CONFIG_FILES};
use secrecy::ExposeSecret;
use toml::Value;

/// One reported config key, with every env var that can set it.
struct Entry<'a> {
    key: &'static str,
    value: String,
    env_keys: &'a [&'static str],
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    render(&config, config_file_doc.as_ref(), config_file_path.as_deref())
}

pub fn render(config: &AppConfig, file_doc: Option<&Value>, file_path: Option<&Path>) -> String {
    let api_key = config
        .notion
        .api_key
        .as_ref()
        .map(|key| redact_token(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    let entries = [
        Entry {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_keys: &["COVE_SERVER_BIND_ADDRESS"],
        },
        Entry {
            key: "server.port",
            value: config.server.port.to_string(),
            env_keys: &["COVE_SERVER_PORT"],
        },
        Entry {
            key: "server.graceful_shutdown_secs",
            value: config.server.graceful_shutdown_secs.to_string(),
            env_keys: &["COVE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        },
        Entry {
            key: "server.expose_error_details",
            value: config.server.expose_error_details.to_string(),
            env_keys: &["COVE_SERVER_EXPOSE_ERROR_DETAILS"],
        },
        Entry {
            key: "notion.api_key",
            value: api_key,
            env_keys: &["COVE_NOTION_API_KEY", "NOTION_API_KEY"],
        },
        Entry {
            key: "notion.database_id",
            value: config.notion.database_id.clone().unwrap_or_else(|| "<unset>".to_string()),
            env_keys: &["COVE_NOTION_DATABASE_ID", "NOTION_DATABASE_ID"],
        },
        Entry {
            key: "notion.base_url",
            value: config.notion.base_url.clone(),
            env_keys: &["COVE_NOTION_BASE_URL"],
        },
        Entry {
            key: "notion.api_version",
            value: config.notion.api_version.clone(),
            env_keys: &["COVE_NOTION_API_VERSION"],
        },
        Entry {
            key: "notion.timeout_secs",
            value: config.notion.timeout_secs.to_string(),
            env_keys: &["COVE_NOTION_TIMEOUT_SECS"],
        },
        Entry {
            key: "client.endpoint_url",
            value: config.client.endpoint_url.clone(),
            env_keys: &["COVE_CLIENT_ENDPOINT_URL"],
        },
        Entry {
            key: "client.confirm_on_failure",
            value: config.client.confirm_on_failure.to_string(),
            env_keys: &["COVE_CLIENT_CONFIRM_ON_FAILURE"],
        },
        Entry {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["COVE_LOGGING_LEVEL", "COVE_LOG_LEVEL"],
        },
        Entry {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["COVE_LOGGING_FORMAT", "COVE_LOG_FORMAT"],
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for entry in &entries {
        let source = field_source(entry.key, entry.env_keys, file_doc, file_path);
        lines.push(render_line(entry.key, &entry.value, source));
    }
    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    DEFAULT_CONFIG_FILES.iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env_is_set(key)) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

// Blank values are skipped by the loader, so they are not a source either.
fn env_is_set(key: &str) -> bool {
    env::var(key).is_ok_and(|value| !value.trim().is_empty())
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps the `secret_` / `ntn_` prefix and hides the rest.
pub fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('_') {
        return format!("{prefix}_***");
    }

    "<redacted>".to_string()
}

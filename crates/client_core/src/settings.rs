use std::{path::Path, time::Duration};

use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_NOTICE_TTL_MS: u64 = 3000;
const SETTINGS_FILE_STEM: &str = "algotrack";
const ENV_PREFIX: &str = "ALGOTRACK";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub notice_ttl_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            notice_ttl_ms: DEFAULT_NOTICE_TTL_MS,
        }
    }
}

impl ClientSettings {
    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }
}

/// Defaults, then the optional settings file (`algotrack.toml` in the working
/// directory unless `path` is given), then `ALGOTRACK__*` environment variables.
pub fn load_client_settings(path: Option<&Path>) -> Result<ClientSettings, ConfigError> {
    load_client_settings_from(path, None)
}

fn load_client_settings_from(
    path: Option<&Path>,
    env: Option<Map<String, String>>,
) -> Result<ClientSettings, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(SETTINGS_FILE_STEM).required(false),
    };

    Config::builder()
        .set_default("api_base_url", DEFAULT_API_BASE_URL)?
        .set_default("notice_ttl_ms", DEFAULT_NOTICE_TTL_MS as i64)?
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .source(env),
        )
        .build()?
        .try_deserialize()
}

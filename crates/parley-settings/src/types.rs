//! Settings types and their compiled defaults.

use std::path::PathBuf;

use secrecy::SecretString;

pub const DEFAULT_MODEL_ID: &str = "us.amazon.nova-micro-v1:0";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_TABLE_NAME: &str = "sessions";

/// Root settings object.
#[derive(Clone, Debug, Default)]
pub struct Settings {
    pub server: ServerSettings,
    pub inference: InferenceSettings,
    pub store: StoreSettings,
    pub logging: LoggingSettings,
}

/// HTTP listener and response policy.
#[derive(Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Include raw error text in 500 bodies. When off, callers get a generic
    /// message and the detail is only logged.
    pub expose_internal_errors: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            expose_internal_errors: true,
        }
    }
}

/// Inference collaborator connection settings.
#[derive(Clone, Debug)]
pub struct InferenceSettings {
    pub model_id: String,
    pub region: String,
    /// Explicit endpoint; derived from `region` when unset.
    pub endpoint: Option<String>,
    pub api_token: Option<SecretString>,
    pub timeout_secs: u64,
}

impl InferenceSettings {
    pub fn endpoint(&self) -> String {
        match &self.endpoint {
            Some(e) => e.trim_end_matches('/').to_string(),
            None => format!("https://bedrock-runtime.{}.amazonaws.com", self.region),
        }
    }
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.into(),
            region: DEFAULT_REGION.into(),
            endpoint: None,
            api_token: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(other.to_string()),
        }
    }
}

/// Session store settings.
#[derive(Clone, Debug)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub table_name: String,
    pub db_path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            table_name: DEFAULT_TABLE_NAME.into(),
            db_path: parley_home().join("database").join("sessions.db"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: true,
        }
    }
}

/// `~/.parley`, or `/tmp/.parley` without a home directory.
pub fn parley_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
        .join(".parley")
}

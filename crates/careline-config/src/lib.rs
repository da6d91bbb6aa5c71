//! Server configuration and the assistant short-name registry.
//!
//! - [`ServerConfig`] — Port, credential, CORS origins, polling and checklist settings
//! - [`AssistantRegistry`] — Read-only map from short names to assistant IDs
//!
//! # Loading from the environment
//!
//! ```rust,ignore
//! use careline_config::{AssistantRegistry, ServerConfig};
//!
//! let config = ServerConfig::from_env()?;
//! let assistants = AssistantRegistry::load_from_file(&config.assistants_file)?;
//! ```
//!
//! # Building a registry in code
//!
//! ```rust
//! use careline_config::AssistantRegistry;
//!
//! let registry = AssistantRegistry::from_pairs([
//!     ("clinica", "asst_clinic"),
//!     ("pediatria", "asst_peds"),
//! ]);
//!
//! assert_eq!(registry.resolve("clinica"), Some("asst_clinic"));
//! assert_eq!(registry.resolve("unknown"), None);
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse JSON configuration.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// An environment variable held an unusable value.
    #[error("Invalid value for {name}: '{value}' ({reason})")]
    InvalidVar {
        name: String,
        value: String,
        reason: String,
    },

    /// A registry entry had an empty name or assistant ID.
    #[error("Invalid assistant entry '{0}': name and ID must be non-empty")]
    InvalidAssistant(String),
}

impl ConfigError {
    /// Creates an IO error with path context.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// Origins allowed when `ALLOWED_ORIGINS` is not set.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://telesaudemissionaria.github.io",
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://localhost",
    "http://127.0.0.1",
];

pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_ASSISTANTS_FILE: &str = "config/assistants.json";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CHECKLIST_LOCALE: &str = "pt-BR";
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Provider credential; requests fail with a configuration error while unset.
    pub api_key: Option<String>,
    /// Alternative provider base URL.
    pub api_base: Option<String>,
    pub allowed_origins: Vec<String>,
    pub assistants_file: PathBuf,
    pub poll_interval: Duration,
    /// `None` disables the polling ceiling.
    pub poll_timeout: Option<Duration>,
    pub checklist_locale: String,
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_key: None,
            api_base: None,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
            assistants_file: PathBuf::from(DEFAULT_ASSISTANTS_FILE),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            poll_timeout: Some(Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS)),
            checklist_locale: DEFAULT_CHECKLIST_LOCALE.to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(v) => parse_var("PORT", &v)?,
            None => defaults.port,
        };

        let allowed_origins = match get("ALLOWED_ORIGINS") {
            Some(v) => v
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect(),
            None => defaults.allowed_origins,
        };

        let poll_interval = match get("POLL_INTERVAL_MS") {
            Some(v) => {
                let ms: u64 = parse_var("POLL_INTERVAL_MS", &v)?;
                if ms == 0 {
                    return Err(ConfigError::InvalidVar {
                        name: "POLL_INTERVAL_MS".into(),
                        value: v,
                        reason: "must be greater than zero".into(),
                    });
                }
                Duration::from_millis(ms)
            }
            None => defaults.poll_interval,
        };

        let poll_timeout = match get("POLL_TIMEOUT_SECS") {
            Some(v) => match parse_var::<u64>("POLL_TIMEOUT_SECS", &v)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => defaults.poll_timeout,
        };

        Ok(Self {
            port,
            api_key: get("OPENAI_API_KEY"),
            api_base: get("OPENAI_API_BASE"),
            allowed_origins,
            assistants_file: get("ASSISTANTS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.assistants_file),
            poll_interval,
            poll_timeout,
            checklist_locale: get("CHECKLIST_LOCALE").unwrap_or(defaults.checklist_locale),
            body_limit: defaults.body_limit,
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
        name: name.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Read-only mapping from short names (e.g. `clinica`) to provider assistant IDs.
///
/// Built once at startup; callers only ever see the short names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct AssistantRegistry {
    assistants: HashMap<String, String>,
}

impl AssistantRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from `(short_name, assistant_id)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            assistants: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Loads a JSON object of `{"short_name": "assistant_id"}` pairs.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::io(path.display().to_string(), e))?;
        let registry: Self = serde_json::from_str(&content)?;
        registry.validate()?;
        Ok(registry)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self
            .assistants
            .iter()
            .find(|(name, id)| name.trim().is_empty() || id.trim().is_empty())
        {
            Some((name, _)) => Err(ConfigError::InvalidAssistant(name.clone())),
            None => Ok(()),
        }
    }

    /// Resolves a short name to its assistant ID.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.assistants.get(name).map(String::as_str)
    }

    /// Returns all short names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.assistants.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.assistants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assistants.is_empty()
    }
}

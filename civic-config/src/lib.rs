//! Loader for service configuration with YAML + environment overlays.
//!
//! Sources are merged lowest to highest precedence: built-in defaults, any
//! attached YAML/TOML/JSON files or inline snippets, then `CIVIC__`-prefixed
//! environment variables (`CIVIC__SERVER__PORT=8080`). String values may
//! reference other environment variables as `${VAR}`; they are expanded after
//! merging.
use civic_common::observability::{LogConfig, LogFormat};
use civic_common::CivicError;
use config::{Config, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "CIVIC";

/// Environment variable consulted when `llm.api_key` is not configured.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CivicConfig {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.into(),
            timeout_secs: 60,
            connect_timeout_secs: 10,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

// Never print the key itself.
impl fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSettings")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

impl LlmSettings {
    /// Return the provider credential, or [`CivicError::MissingCredential`].
    ///
    /// A configured key wins; otherwise `GEMINI_API_KEY` is read from the
    /// process environment. Empty values and unexpanded `${...}` placeholders
    /// count as missing.
    pub fn resolve_api_key(&self) -> Result<String, CivicError> {
        self.api_key
            .as_deref()
            .and_then(usable_key)
            .or_else(|| std::env::var(API_KEY_ENV).ok().as_deref().and_then(usable_key))
            .ok_or_else(|| CivicError::MissingCredential(API_KEY_ENV.into()))
    }
}

fn usable_key(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains("${") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    pub dir: Option<PathBuf>,
    pub stderr: bool,
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            dir: None,
            stderr: true,
            filter: "info".into(),
        }
    }
}

impl LoggingSettings {
    pub fn to_log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.dir.clone(),
            emit_stderr: self.stderr,
            format: self.format,
            default_filter: self.filter.clone(),
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring.
pub struct CivicConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for CivicConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CivicConfigLoader {
    /// Start from defaults only; environment overrides are applied in [`load`](Self::load).
    ///
    /// ```
    /// use civic_config::CivicConfigLoader;
    ///
    /// let config = CivicConfigLoader::new()
    ///     .with_yaml_str("server:\n  port: 8081")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.server.port, 8081);
    /// assert_eq!(config.llm.model, "gemini-2.0-flash");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a file that must exist; the format is inferred from its suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when absent, so deployments can rely
    /// purely on environment variables.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge all sources, apply `CIVIC__` environment overrides, expand
    /// `${VAR}` placeholders and deserialize into [`CivicConfig`].
    ///
    /// ```
    /// use civic_config::CivicConfigLoader;
    ///
    /// let config = CivicConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// llm:
    ///   api_key: "literal-key"
    ///   model: "gemini-1.5-pro"
    ///   temperature: 0.2
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.llm.model, "gemini-1.5-pro");
    /// assert_eq!(config.llm.resolve_api_key().unwrap(), "literal-key");
    /// assert_eq!(config.llm.temperature, Some(0.2));
    /// ```
    pub fn load(self) -> civic_common::Result<CivicConfig> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CivicError::Config(e.to_string()))?;

        let mut v: Value = cfg
            .try_deserialize()
            .map_err(|e| CivicError::Config(e.to_string()))?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| CivicError::Config(e.to_string()))
    }
}

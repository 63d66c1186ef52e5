//! Loader for gabvid configuration with YAML + environment overlays.
//!
//! Every field has a default, so the file is optional. Environment variables
//! prefixed with `GABVID__` override file values, using `__` between path
//! segments (`GABVID__LOGGING__DIR=/tmp/logs`). String values may reference
//! other variables as `${VAR}`.
use config::{Config, ConfigError, Environment, File};
use gabvid_common::observability::{LogConfig, LogFormat};
use gabvid_extract::DEFAULT_PROPERTIES;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GabvidConfig {
    pub extract: ExtractConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Ordered list of `<meta property=...>` values; first match wins.
    pub properties: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            properties: DEFAULT_PROPERTIES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub file: String,
    pub format: LogFormat,
    #[serde(deserialize_with = "bool_or_text")]
    pub stderr: bool,
    pub filter: String,
}

/// Environment overrides arrive as text, so accept `"true"`/`"false"` too.
fn bool_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected true or false, got `{s}`"))),
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let defaults = LogConfig::default();
        Self {
            dir: defaults.log_dir,
            file: defaults.file_name,
            format: defaults.format,
            stderr: defaults.emit_stderr,
            filter: defaults.default_filter,
        }
    }
}

impl LoggingConfig {
    /// Translate into the observability layer's settings.
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            log_dir: self.dir.clone(),
            file_name: self.file.clone(),
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

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct GabvidConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for GabvidConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl GabvidConfigLoader {
    /// Start from the built-in defaults; `GABVID__` env overrides apply on [`load`](Self::load).
    ///
    /// ```
    /// use gabvid_config::GabvidConfigLoader;
    ///
    /// let config = GabvidConfigLoader::new().load().expect("defaults load");
    /// assert_eq!(config.extract.properties, vec!["og:video", "video"]);
    /// assert_eq!(config.logging.file, "extract.log");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    /// A missing file is skipped.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use gabvid_common::observability::LogFormat;
    /// use gabvid_config::GabvidConfigLoader;
    ///
    /// let cfg = GabvidConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// extract:
    ///   properties: ["twitter:player:stream", "og:video"]
    /// logging:
    ///   format: json
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.extract.properties[0], "twitter:player:stream");
    /// assert_eq!(cfg.logging.format, LogFormat::Json);
    /// assert!(cfg.logging.stderr);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// The `GABVID__` environment overlay is applied last so it wins over
    /// files and snippets. `${VAR}` placeholders are expanded before the
    /// typed structs are built.
    pub fn load(self) -> Result<GabvidConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(Environment::with_prefix("GABVID").separator("__"))
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: GabvidConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

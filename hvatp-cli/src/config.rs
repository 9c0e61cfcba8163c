//! CLI-specific configuration structures for TOML-based configuration.

use color_eyre::eyre::{Context, Result};
use hvatp_core::config::{AudioConfig, VisualConfig};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

/// Deep merge JSON values - override takes precedence over base.
/// For objects, recursively merge; for arrays and primitives, override replaces base.
fn merge_json_values(base: &mut JsonValue, override_val: JsonValue) {
    match (base, override_val) {
        (JsonValue::Object(base_map), JsonValue::Object(override_map)) => {
            for (key, value) in override_map {
                if let Some(base_value) = base_map.get_mut(&key) {
                    merge_json_values(base_value, value);
                } else {
                    base_map.insert(key, value);
                }
            }
        }
        (base_val, override_val) => {
            *base_val = override_val;
        }
    }
}

/// Custom deserializer to handle both single string and array of strings for include.
fn deserialize_include_optional<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrVec {
        String(String),
        Vec(Vec<String>),
    }

    let opt: Option<StringOrVec> = Option::deserialize(deserializer)?;
    match opt {
        None => Ok(Vec::new()),
        Some(StringOrVec::String(s)) => Ok(vec![s]),
        Some(StringOrVec::Vec(v)) => Ok(v),
    }
}

/// Complete CLI configuration bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Optional path(s) to other config file(s) to include (relative to this
    /// config's directory). Supports single string or array of strings.
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_include_optional")]
    pub include: Vec<String>,

    /// Visual symbol carrier configuration.
    #[serde(default)]
    pub visual: VisualConfig,

    /// Acoustic OFDM configuration.
    #[serde(default)]
    pub audio: AudioConfig,

    /// Terminal interface configuration.
    #[serde(default)]
    pub terminal: TerminalConfig,
}

/// Terminal interface configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Directory to write per-frame PPM rasters to (visual encode output).
    #[serde(default)]
    pub raster_dir: Option<PathBuf>,

    /// Output WAV filename for the acoustic control-plane demo (optional).
    #[serde(default)]
    pub wav_output: Option<PathBuf>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            raster_dir: None,
            wav_output: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_target")]
    pub target: LogTarget,

    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    #[serde(default = "default_log_level")]
    pub level: LogLevel,
}

fn default_log_target() -> LogTarget {
    LogTarget::Stdout
}

fn default_log_format() -> LogFormat {
    LogFormat::Json
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            target: default_log_target(),
            file_path: None,
            format: default_log_format(),
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// Convert CLI logging config to the core `SignalLogger`'s config.
    pub fn to_core_log_config(&self) -> hvatp_core::logging::LogConfig {
        use hvatp_core::logging::{LogConfig as CoreLogConfig, LogLevel as CoreLogLevel};

        let level = match self.level {
            LogLevel::Debug => CoreLogLevel::Debug,
            LogLevel::Info => CoreLogLevel::Info,
            LogLevel::Warn => CoreLogLevel::Warn,
            LogLevel::Error => CoreLogLevel::Error,
        };

        CoreLogConfig {
            level,
            enable_visual: true,
            enable_audio: true,
            enable_sequencing: true,
            enable_fec: true,
            max_entries: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    Stdout,
    Stderr,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Logfmt,
    Pretty,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            visual: VisualConfig::default(),
            audio: AudioConfig::default(),
            terminal: TerminalConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file, recursively merging any `include`d files.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let config_toml: toml::Value =
            toml::from_str(&content).wrap_err("Failed to parse TOML configuration")?;

        let mut config_json =
            serde_json::to_value(&config_toml).wrap_err("Failed to convert TOML to JSON")?;

        let includes = match config_json.get("include") {
            Some(JsonValue::String(s)) => vec![s.clone()],
            Some(JsonValue::Array(arr)) => arr.iter().filter_map(|v| v.as_str().map(String::from)).collect(),
            _ => Vec::new(),
        };

        if let JsonValue::Object(ref mut map) = config_json {
            map.remove("include");
        }

        let mut base_json =
            serde_json::to_value(Self::default()).wrap_err("Failed to create default config")?;

        for include_path in &includes {
            let include_full_path = if Path::new(include_path).is_absolute() {
                PathBuf::from(include_path)
            } else {
                path.parent().unwrap_or_else(|| Path::new(".")).join(include_path)
            };

            let included_config = Self::from_file(&include_full_path)
                .wrap_err_with(|| format!("Failed to load included config: {}", include_full_path.display()))?;
            let included_json =
                serde_json::to_value(&included_config).wrap_err("Failed to convert included config to JSON")?;

            merge_json_values(&mut base_json, included_json);
        }

        merge_json_values(&mut base_json, config_json);

        let config: CliConfig =
            serde_json::from_value(base_json).wrap_err("Failed to parse final configuration")?;

        Ok(config)
    }
}

use std::{env, fmt, fs, path, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Shortest and longest accepted check interval, in seconds
const MIN_INTERVAL: u64 = 1;
const MAX_INTERVAL: u64 = 86_400;

/// Accepted probe timeout range, in seconds
const MIN_TIMEOUT: u64 = 1;
const MAX_TIMEOUT: u64 = 300;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {0}: {1}")]
    ReadFailed(path::PathBuf, #[source] std::io::Error),

    #[error("Failed to write config {0}: {1}")]
    WriteFailed(path::PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),

    #[error("Neither XDG_CONFIG_HOME nor HOME is set")]
    ConfigPathUnavailable,

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub probe: ProbeConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

/// What to check and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub target_url: String,
    pub interval_seconds: u64,
    pub timeout_seconds: u64,
    /// `0` disables redirect following, so 3xx responses count as offline
    pub max_redirects: usize,
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: path::PathBuf,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            target_url: "https://example.com".into(),
            interval_seconds: 600,
            timeout_seconds: 10,
            max_redirects: 10,
            accept_invalid_certs: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0".into(), port: 8080 }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "site_status.db".into() }
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/sitewatch/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("sitewatch/config.toml"))
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue { key, reason: e.to_string() })
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Configuration State:")?;
        write_title_1(f, "Probe")?;
        write_1(f, "Target URL", &self.probe.target_url)?;
        write_1(f, "Interval (s)", &self.probe.interval_seconds)?;
        write_1(f, "Timeout (s)", &self.probe.timeout_seconds)?;
        write_1(f, "Max Redirects", &self.probe.max_redirects)?;
        write_1(f, "Accept Invalid Certs", &self.probe.accept_invalid_certs)?;
        write_title_1(f, "Server")?;
        write_1(f, "Bind Address", &self.server.bind)?;
        write_1(f, "Port", &self.server.port)?;
        write_title_1(f, "Database")?;
        write_1(f, "Path", &self.database.path.display())?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/sitewatch/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    ///
    /// ```ignore
    /// let cfg = config::Config::from_config(None::<&path::Path>)?;
    /// println!("{}", cfg);
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path)
                .map_err(|err| ConfigError::ReadFailed(config_path.clone(), err))?;
            Ok(toml::from_str(raw_string.as_str())?)
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| ConfigError::WriteFailed(path.to_path_buf(), err))?;
        }

        fs::write(path, config_str).map_err(|err| ConfigError::WriteFailed(path.to_path_buf(), err))
    }

    /// Apply `SITEWATCH_*` environment variables on top of the file values
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by environment variable name
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup("SITEWATCH_TARGET_URL") {
            self.probe.target_url = url;
        }
        if let Some(raw) = lookup("SITEWATCH_INTERVAL_SECONDS") {
            self.probe.interval_seconds = parse_value("SITEWATCH_INTERVAL_SECONDS", &raw)?;
        }
        if let Some(raw) = lookup("SITEWATCH_TIMEOUT_SECONDS") {
            self.probe.timeout_seconds = parse_value("SITEWATCH_TIMEOUT_SECONDS", &raw)?;
        }
        if let Some(raw) = lookup("SITEWATCH_MAX_REDIRECTS") {
            self.probe.max_redirects = parse_value("SITEWATCH_MAX_REDIRECTS", &raw)?;
        }
        if let Some(bind) = lookup("SITEWATCH_BIND") {
            self.server.bind = bind;
        }
        if let Some(raw) = lookup("SITEWATCH_PORT") {
            self.server.port = parse_value("SITEWATCH_PORT", &raw)?;
        }
        if let Some(db_path) = lookup("SITEWATCH_DATABASE_PATH") {
            self.database.path = db_path.into();
        }
        Ok(self)
    }

    /// Reject settings the monitor cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.probe.target_url).map_err(|e| ConfigError::InvalidValue {
            key: "probe.target_url",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                key: "probe.target_url",
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }

        let interval = self.probe.interval_seconds;
        if !(MIN_INTERVAL..=MAX_INTERVAL).contains(&interval) {
            return Err(ConfigError::InvalidValue {
                key: "probe.interval_seconds",
                reason: format!("{interval} not in {MIN_INTERVAL}..={MAX_INTERVAL}"),
            });
        }

        let timeout = self.probe.timeout_seconds;
        if !(MIN_TIMEOUT..=MAX_TIMEOUT).contains(&timeout) {
            return Err(ConfigError::InvalidValue {
                key: "probe.timeout_seconds",
                reason: format!("{timeout} not in {MIN_TIMEOUT}..={MAX_TIMEOUT}"),
            });
        }
        if timeout > interval {
            return Err(ConfigError::InvalidValue {
                key: "probe.timeout_seconds",
                reason: format!("{timeout} exceeds the check interval of {interval}"),
            });
        }

        Ok(())
    }
}

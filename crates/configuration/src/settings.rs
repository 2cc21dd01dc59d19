use crate::error::ConfigError;
use core_types::{Timeframe, calendar};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiConfig,
    pub defaults: Defaults,
    pub logging: LoggingConfig,
}

/// Connection details for the Swarmia Export API.
#[derive(Clone, Deserialize)]
pub struct ApiConfig {
    /// The export API token. Sent as the `token` query parameter on every request.
    #[serde(default)]
    pub token: String,
    /// Base URL including the `/api/v0` prefix. Overridable for non-production hosts.
    pub base_url: String,
    /// Upper bound for a single export request, in seconds.
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Values applied when a caller leaves a parameter out.
#[derive(Debug, Clone, Deserialize)]
pub struct Defaults {
    pub timezone: String,
    /// Named timeframe used by the metrics tools when no range is given.
    /// An empty string disables the fallback.
    pub timeframe: String,
}

impl Defaults {
    pub fn default_timeframe(&self) -> Option<Timeframe> {
        if self.timeframe.trim().is_empty() {
            None
        } else {
            self.timeframe.trim().parse().ok()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive, e.g. `info` or `info,api_client=debug`.
    pub level: String,
    /// When set, logs go to a daily rolling file in this directory instead of stderr.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Settings {
    /// Checks the invariants the rest of the application relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if !(self.api.base_url.starts_with("https://") || self.api.base_url.starts_with("http://")) {
            return Err(ConfigError::ValidationError(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if calendar::parse_timezone(&self.defaults.timezone).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "defaults.timezone '{}' is not a valid zone name",
                self.defaults.timezone
            )));
        }
        let timeframe = self.defaults.timeframe.trim();
        if !timeframe.is_empty() && timeframe.parse::<Timeframe>().is_err() {
            return Err(ConfigError::ValidationError(format!(
                "defaults.timeframe must be one of [{}] or empty, got '{}'",
                Timeframe::NAMES.join(", "),
                timeframe
            )));
        }
        Ok(())
    }
}

/// Command-line overrides, applied on top of the file and environment.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct CliOverrides {
    /// Override the export API base URL (e.g. a staging host).
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub base_url: Option<String>,

    /// Default timezone for requests that do not specify one.
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub timezone: Option<String>,

    /// Request timeout in seconds.
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub timeout_secs: Option<u64>,

    /// Log filter directive (RUST_LOG still takes precedence).
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub log_level: Option<String>,
}

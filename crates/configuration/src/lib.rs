use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{ApiConfig, CliOverrides, Defaults, LoggingConfig, Settings};

pub const DEFAULT_BASE_URL: &str = "https://app.swarmia.com/api/v0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TIMEFRAME: &str = "last_7_days";

/// Environment variables recognised on top of the config file, and the keys they set.
/// `config::Environment::with_prefix` cannot express these names: `SWARMIA_TIMEZONE`
/// has no section for `defaults.timezone`, and splitting on `_` would also split `timeout_secs`.
const ENV_KEYS: &[(&str, &str)] = &[
    ("SWARMIA_API_TOKEN", "api.token"),
    ("SWARMIA_BASE_URL", "api.base_url"),
    ("SWARMIA_TIMEOUT_SECS", "api.timeout_secs"),
    ("SWARMIA_TIMEZONE", "defaults.timezone"),
    ("SWARMIA_DEFAULT_TIMEFRAME", "defaults.timeframe"),
    ("SWARMIA_LOG_LEVEL", "logging.level"),
    ("SWARMIA_LOG_DIR", "logging.directory"),
];

/// Loads the application settings.
///
/// Sources, lowest precedence first: built-in defaults, the config file
/// (`path`, or an optional `swarmia.toml` in the working directory), the
/// `SWARMIA_*` environment variables, then command-line overrides. A missing
/// API token is reported as [`ConfigError::MissingToken`].
pub fn load_config(path: Option<&Path>, overrides: &CliOverrides) -> Result<Settings, ConfigError> {
    let env: HashMap<String, String> = std::env::vars()
        .filter(|(key, _)| key.starts_with("SWARMIA_"))
        .collect();
    load_config_from(path, &env, overrides)
}

/// Same as [`load_config`] but with an explicit environment map.
pub fn load_config_from(
    path: Option<&Path>,
    env: &HashMap<String, String>,
    overrides: &CliOverrides,
) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder()
        .set_default("api.token", "")?
        .set_default("api.base_url", DEFAULT_BASE_URL)?
        .set_default("api.timeout_secs", DEFAULT_TIMEOUT_SECS)?
        .set_default("defaults.timezone", core_types::DEFAULT_TIMEZONE)?
        .set_default("defaults.timeframe", DEFAULT_TIMEFRAME)?
        .set_default("logging.level", "info")?;

    builder = match path {
        Some(path) => builder.add_source(config::File::from(path)),
        None => builder.add_source(config::File::with_name("swarmia").required(false)),
    };

    for (var, key) in ENV_KEYS {
        if let Some(value) = env.get(*var) {
            builder = builder.set_override(*key, value.as_str())?;
        }
    }

    if let Some(base_url) = &overrides.base_url {
        builder = builder.set_override("api.base_url", base_url.as_str())?;
    }
    if let Some(timezone) = &overrides.timezone {
        builder = builder.set_override("defaults.timezone", timezone.as_str())?;
    }
    if let Some(timeout) = overrides.timeout_secs {
        builder = builder.set_override("api.timeout_secs", timeout)?;
    }
    if let Some(level) = &overrides.log_level {
        builder = builder.set_override("logging.level", level.as_str())?;
    }

    let settings = builder.build()?.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}

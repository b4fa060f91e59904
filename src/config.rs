use anyhow::Result;
use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Default location of the runtime settings file
pub const DEFAULT_SETTINGS_PATH: &str = "config/overload.toml";

/// Circuit overload simulator
#[derive(Parser, Debug)]
#[command(name = "overload", version, about, long_about = None)]
pub struct Cli {
    /// Circuit file describing sources, breakers, outlets and appliances
    pub circuit: PathBuf,

    /// Runtime settings file
    #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
    pub settings: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub logging: LoggingConfig,
    #[validate(nested)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[validate(length(min = 1))]
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionConfig {
    pub prompt: String,
    /// Print circuit notifications after each command
    pub echo_events: bool,
    /// Capacity of the timestamped event journal
    #[validate(range(min = 1, max = 100_000))]
    pub event_history: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prompt: "? -> ".to_string(),
            echo_events: true,
            event_history: 256,
        }
    }
}

impl Settings {
    /// Defaults, then the settings file (if present), then `OVERLOAD__*` env vars
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("OVERLOAD__").split("__"));
        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Settings = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }
}

//! Handles settings for the application. Configuration is written in
//! `settings.toml` next to the binary (or the file named by
//! `MURMUR_CONFIG`).

use config::{Config, ConfigError, File};
use serde::Deserialize;

/// Where the server keeps its data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    /// In-memory sqlite; everything is lost on shutdown. Development only.
    Memory,
    /// Sqlite database file at the given path.
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level filter (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub database: Database,
    pub bind: Option<String>,
    pub port: u16,
    /// Reject `follow(actor, {actor})` instead of allowing it.
    #[serde(default)]
    pub reject_self_follow: bool,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let path = std::env::var("MURMUR_CONFIG").unwrap_or_else(|_| "settings".to_string());
        let settings = Config::builder()
            .add_source(File::with_name(&path))
            .build()?;

        settings.try_deserialize()
    }
}

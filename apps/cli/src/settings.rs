use keyroute_crypto::CryptoConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Contents of the `keyroute` config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) log: LogSettings,
    pub(crate) crypto: CryptoConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct LogSettings {
    pub(crate) level: String,
    /// Enables rolling file logs in this directory.
    pub(crate) dir: Option<PathBuf>,
    pub(crate) json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { level: "warn".to_owned(), dir: None, json: false }
    }
}

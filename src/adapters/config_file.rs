//! JSON configuration file adapter.
//!
//! Implements [`ConfigPort`] over a filesystem path (`/spiffs/config.json`
//! on the device, any path on the host).  A missing file is not an error:
//! it is reported as "no configuration present" and the caller decides.

use std::io::ErrorKind;
use std::path::PathBuf;

use log::info;

use crate::app::ports::ConfigPort;
use crate::config::TelemetryConfig;
use crate::error::ConfigError;

pub struct FileConfigLoader {
    path: PathBuf,
}

impl FileConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigPort for FileConfigLoader {
    fn load(&self) -> Result<Option<TelemetryConfig>, ConfigError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Config: {} not found", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(ConfigError::Io(e.kind())),
        };
        let config = TelemetryConfig::from_json(&text)?;
        info!("Config: loaded {}", self.path.display());
        Ok(Some(config))
    }
}

pub mod keep_alive;
pub mod node_config;
pub mod seed;

use crate::config::ConfigError;
use crate::store::{default_store_path, StoreConfig};
use std::path::PathBuf;

/// Store location and key as given on the command line or in the environment
#[derive(Debug, Clone, Default)]
pub struct StoreArgs {
    pub path: Option<PathBuf>,
    pub app_key: Option<String>,
}

impl StoreArgs {
    pub fn resolve(&self) -> Result<StoreConfig, ConfigError> {
        let app_key = self
            .app_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::Missing("APP_KEY".to_string()))?;

        Ok(StoreConfig {
            path: self.path.clone().unwrap_or_else(default_store_path),
            app_key: app_key.to_string(),
        })
    }
}

//! YAML persistence for [`GridConfig`]

use std::path::{Path, PathBuf};

use super::plan_store::write_atomic;
use crate::config::GridConfig;
use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate; writes the defaults first if the file is missing
    pub fn load_or_init(&self) -> Result<GridConfig, StoreError> {
        if !self.path.exists() {
            let config = GridConfig::default();
            self.save(&config)?;
            tracing::info!(path = %self.path.display(), "Wrote default config");
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let config: GridConfig =
            serde_yaml::from_str(&contents).map_err(|e| StoreError::yaml(&self.path, e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &GridConfig) -> Result<(), StoreError> {
        config.validate()?;
        let yaml = serde_yaml::to_string(config).map_err(|e| StoreError::yaml(&self.path, e))?;
        write_atomic(&self.path, yaml.as_bytes())
    }
}

//! YAML persistence for the ladder plan

use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::{Plan, Symbol};

/// Plan file on disk
#[derive(Debug, Clone)]
pub struct PlanStore {
    path: PathBuf,
}

impl PlanStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the plan; a missing file yields an empty plan for `default_symbol`
    pub fn load_or_empty(&self, default_symbol: &Symbol) -> Result<Plan, StoreError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No plan file, starting empty");
            return Ok(Plan::empty(default_symbol.clone()));
        }
        self.load()
    }

    pub fn load(&self) -> Result<Plan, StoreError> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        serde_yaml::from_str(&contents).map_err(|e| StoreError::yaml(&self.path, e))
    }

    /// Write to a temp file, then rename over the plan
    pub fn save(&self, plan: &Plan) -> Result<(), StoreError> {
        let yaml = serde_yaml::to_string(plan).map_err(|e| StoreError::yaml(&self.path, e))?;
        write_atomic(&self.path, yaml.as_bytes())
    }
}

/// Replace `path` with `contents` atomically
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, contents).map_err(|e| StoreError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::plan::generate;
    use crate::{LevelStatus, Money};

    #[test]
    fn test_missing_file_is_empty_plan() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlanStore::new(dir.path().join("plan.yaml"));

        let plan = store.load_or_empty(&Symbol::new("BTCUSDT")).unwrap();
        assert!(plan.levels().is_empty());
        assert_eq!(plan.symbol.as_str(), "BTCUSDT");
        assert!(!store.exists());
    }

    #[test]
    fn test_save_and_reload_keeps_statuses() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlanStore::new(dir.path().join("nested").join("plan.yaml"));

        let mut plan = generate(
            &Symbol::new("BTCUSDT"),
            Money::from_i64(90000),
            Money::from_i64(100000),
            Money::from_i64(110000),
            10,
            0.6,
        )
        .unwrap();
        plan.level_mut(4).unwrap().mark_placed("123456");
        store.save(&plan).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, plan);
        assert_eq!(loaded.levels()[4].status(), LevelStatus::Placed);
        assert!(!dir.path().join("nested").join("plan.yaml.tmp").exists());
    }

    #[test]
    fn test_legacy_plan_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.yaml");
        std::fs::write(
            &path,
            "symbol: BTCUSDT\nlevels:\n- side: BUY\n  price: 90000.0\n  status: FILLED\n  orderId: '77'\n- side: SELL\n  price: 100000.0\n  status: PENDING\n  orderId: null\nmeta:\n  created: 1700000000\n",
        )
        .unwrap();

        let plan = PlanStore::new(&path).load().unwrap();
        assert_eq!(plan.levels().len(), 2);
        assert_eq!(plan.levels()[0].status(), LevelStatus::Filled);
        assert_eq!(plan.levels()[0].order_id(), Some("77"));
        assert_eq!(plan.levels()[1].order_id(), None);
        assert_eq!(plan.meta.created, 1_700_000_000);
    }

    #[test]
    fn test_corrupt_file_is_yaml_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.yaml");
        std::fs::write(&path, "levels: [[[").unwrap();
        assert!(matches!(
            PlanStore::new(&path).load(),
            Err(StoreError::Yaml { .. })
        ));
    }
}

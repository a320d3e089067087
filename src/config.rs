use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::fence::TUKEY_MULTIPLIER;
use crate::pipeline::{FilterMode, Pipeline, UndefinedPolicy};

/// Columns filtered when nothing else is configured, in filtering order.
pub const DEFAULT_COLUMNS: [&str; 3] = ["minutes", "n_steps", "n_ingredients"];

/// Pipeline settings, loadable from a JSON file.
///
/// ```json
/// { "columns": ["minutes", "n_steps"], "multiplier": 3.0, "on_undefined": "skip" }
/// ```
///
/// Absent keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FenceConfig {
    pub columns: Vec<String>,
    pub multiplier: f64,
    pub on_undefined: UndefinedPolicy,
    pub mode: FilterMode,
}

impl Default for FenceConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            multiplier: TUKEY_MULTIPLIER,
            on_undefined: UndefinedPolicy::default(),
            mode: FilterMode::default(),
        }
    }
}

impl FenceConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.columns.iter().cloned())
            .multiplier(self.multiplier)
            .on_undefined(self.on_undefined)
            .mode(self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = FenceConfig::default();
        assert_eq!(cfg.columns, vec!["minutes", "n_steps", "n_ingredients"]);
        assert_eq!(cfg.multiplier, 1.5);
        assert_eq!(cfg.on_undefined, UndefinedPolicy::Abort);
        assert_eq!(cfg.mode, FilterMode::Sequential);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = FenceConfig::from_json(r#"{"multiplier": 3.0, "on_undefined": "skip"}"#).unwrap();
        assert_eq!(cfg.multiplier, 3.0);
        assert_eq!(cfg.on_undefined, UndefinedPolicy::Skip);
        assert_eq!(cfg.columns.len(), 3);
    }

    #[test]
    fn test_mode_and_columns() {
        let cfg =
            FenceConfig::from_json(r#"{"columns": ["n_steps"], "mode": "independent"}"#).unwrap();
        let p = cfg.pipeline();
        assert_eq!(p.columns(), ["n_steps".to_string()]);
        assert_eq!(cfg.mode, FilterMode::Independent);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(FenceConfig::from_json(r#"{"multiplyer": 3.0}"#).is_err());
    }
}

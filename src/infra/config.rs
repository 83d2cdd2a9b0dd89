// ============================================================
// Infrastructure — Toolkit Configuration
// ============================================================
// Settings shared by the helpers, persisted as pretty JSON:
//
//   {
//     "checkpoint_extension": "pt",
//     "smi_binary": "nvidia-smi",
//     "seed": 42
//   }
//
// Missing keys fall back to the defaults below, so a config
// file only needs the values it changes.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::infra::{checkpoint::DEFAULT_CHECKPOINT_EXT, gpu::DEFAULT_SMI_BINARY};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// File extension (without the dot) that marks a checkpoint
    pub checkpoint_extension: String,

    /// Accelerator management tool used for GPU memory queries
    pub smi_binary: String,

    /// Seed applied by the binary before running a command
    pub seed: Option<u64>,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            checkpoint_extension: DEFAULT_CHECKPOINT_EXT.to_string(),
            smi_binary:           DEFAULT_SMI_BINARY.to_string(),
            seed:                 None,
        }
    }
}

impl ToolkitConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::debug!("Saved toolkit config to '{}'", path.display());
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir  = TempDir::new().unwrap();
        let path = dir.path().join("toolkit.json");
        fs::write(&path, r#"{ "seed": 7 }"#).unwrap();

        let cfg = ToolkitConfig::load(&path).unwrap();
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.checkpoint_extension, "pt");
        assert_eq!(cfg.smi_binary, "nvidia-smi");
    }

    #[test]
    fn test_save_then_load() {
        let dir  = TempDir::new().unwrap();
        let path = dir.path().join("toolkit.json");
        let cfg  = ToolkitConfig {
            checkpoint_extension: "ckpt".into(),
            seed: Some(123),
            ..Default::default()
        };
        cfg.save(&path).unwrap();
        assert_eq!(ToolkitConfig::load(&path).unwrap(), cfg);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(ToolkitConfig::load(dir.path().join("absent.json")).is_err());
    }
}

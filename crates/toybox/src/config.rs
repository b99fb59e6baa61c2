use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub include_builtins: bool,
    pub extra_roots: Vec<PathBuf>,
    #[serde(rename = "move")]
    pub mover: MoverConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            include_builtins: true,
            extra_roots: Vec::new(),
            mover: MoverConfig::default(),
        }
    }
}

/// Overrides for `toybox move`; CLI flags win over these.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MoverConfig {
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl AppConfig {
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file at {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.include_builtins);
    }

    #[test]
    fn parses_partial_config() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "include_builtins = false\nextra_roots = [\"/srv/subs\"]\n\n[move]\nmin = 100\n",
        )
        .unwrap();

        let config = AppConfig::load_or_default(&path).unwrap();
        assert!(!config.include_builtins);
        assert_eq!(config.extra_roots, vec![PathBuf::from("/srv/subs")]);
        assert_eq!(config.mover.min, Some(100));
        assert!(config.mover.max.is_none());
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "include_builtins = \"maybe\"").unwrap();

        let err = AppConfig::load_or_default(&path).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
    }
}

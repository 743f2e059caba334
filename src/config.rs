//! `uce.toml` configuration
//!
//! Every section is optional; missing keys fall back to their defaults.

use crate::language::SupportedLanguage;
use crate::transform::TransformOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct UceConfig {
    pub parser: ParserConfig,
    pub transform: TransformOptions,
    pub scan: ScanConfig,
}

/// Directory scan settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    /// Gitignore-style patterns skipped in addition to the built-in noise list
    pub exclude: Vec<String>,
    /// Worker threads; `None` uses the available parallelism
    pub jobs: Option<usize>,
}

/// Parser manager settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ParserConfig {
    /// Grammars loaded eagerly by `initialize()`. `None` loads all of them;
    /// languages left out are loaded on first use.
    pub languages: Option<Vec<SupportedLanguage>>,
}

impl ParserConfig {
    pub fn only(languages: impl IntoIterator<Item = SupportedLanguage>) -> Self {
        Self {
            languages: Some(languages.into_iter().collect()),
        }
    }

    pub fn loads_eagerly(&self, language: SupportedLanguage) -> bool {
        self.languages
            .as_ref()
            .is_none_or(|langs| langs.contains(&language))
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("uce.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<UceConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: UceConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &UceConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("uce.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("uce.toml");

        let mut config = UceConfig::default();
        config.parser = ParserConfig::only([SupportedLanguage::Go, SupportedLanguage::Python]);
        config.transform.max_body_bytes = Some(512);
        config.scan.exclude = vec!["fixtures/".to_string()];
        write_config(&path, &config, false).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded, config);

        // Refuses to clobber without force
        assert!(write_config(&path, &config, false).is_err());
        assert!(write_config(&path, &config, true).is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("uce.toml");
        std::fs::write(&path, "[parser]\nlanguages = [\"rust\"]\n").unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert!(loaded.parser.loads_eagerly(SupportedLanguage::Rust));
        assert!(!loaded.parser.loads_eagerly(SupportedLanguage::Go));
        assert_eq!(loaded.transform, TransformOptions::default());
        assert_eq!(loaded.scan, ScanConfig::default());
    }
}

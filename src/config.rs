use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::DevToClient;
use crate::scraper::{DEFAULT_DELAY, ScrapeOptions};

/// Optional settings read from `devscrape.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DevscrapeConfig {
    pub database: Option<String>,
    pub base_url: Option<String>,
    pub delay_ms: Option<u64>,
    pub max_pages: Option<u32>,
}

impl DevscrapeConfig {
    /// The settings a bare run uses, spelled out
    pub fn defaults() -> Self {
        Self {
            database: Some(default_database_path().display().to_string()),
            base_url: Some(DevToClient::DEFAULT_BASE_URL.to_string()),
            delay_ms: Some(DEFAULT_DELAY.as_millis() as u64),
            max_pages: None,
        }
    }

    /// Values set in `overrides` win over values set here
    pub fn merge(self, overrides: DevscrapeConfig) -> Self {
        Self {
            database: overrides.database.or(self.database),
            base_url: overrides.base_url.or(self.base_url),
            delay_ms: overrides.delay_ms.or(self.delay_ms),
            max_pages: overrides.max_pages.or(self.max_pages),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.database
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DevToClient::DEFAULT_BASE_URL)
    }

    pub fn scrape_options(&self) -> ScrapeOptions {
        ScrapeOptions {
            delay: self.delay_ms.map(Duration::from_millis).unwrap_or(DEFAULT_DELAY),
            max_pages: self.max_pages,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("devscrape.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("devscrape.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<DevscrapeConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: DevscrapeConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &DevscrapeConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("devscrape.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devscrape.toml");
        let config = DevscrapeConfig {
            database: Some("data/articles.db".into()),
            delay_ms: Some(500),
            ..Default::default()
        };

        write_config(&path, &config, false).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), Some(config.clone()));

        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &DevscrapeConfig::defaults(), true).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), Some(DevscrapeConfig::defaults()));
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let file = DevscrapeConfig {
            database: Some("file.db".into()),
            delay_ms: Some(1000),
            ..Default::default()
        };
        let flags = DevscrapeConfig {
            delay_ms: Some(0),
            max_pages: Some(3),
            ..Default::default()
        };

        let merged = DevscrapeConfig::defaults().merge(file).merge(flags);

        assert_eq!(merged.database_path(), PathBuf::from("file.db"));
        assert_eq!(merged.base_url(), DevToClient::DEFAULT_BASE_URL);
        let options = merged.scrape_options();
        assert_eq!(options.delay, Duration::ZERO);
        assert_eq!(options.max_pages, Some(3));
    }

    #[test]
    fn test_empty_config_falls_back_to_defaults() {
        let config = DevscrapeConfig::default();
        assert_eq!(config.database_path(), default_database_path());
        assert_eq!(config.scrape_options().delay, DEFAULT_DELAY);
    }

    #[test]
    fn test_ensure_db_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("devscrape.db");
        ensure_db_dir(&db_path).unwrap();
        assert!(db_path.parent().unwrap().is_dir());
    }
}

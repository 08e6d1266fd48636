use crate::matching::ScoringConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_auto_refresh_hours() -> u32 {
    24
}

fn default_user_agent() -> String {
    "IPTV Smarters Pro".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Guide published by the IPTV provider (xmltv.php or similar)
    #[serde(default)]
    pub provider_epg_url: Option<String>,
    /// Extra XMLTV URLs merged after the provider guide
    #[serde(default)]
    pub epg_urls: Vec<String>,
    /// 0 disables automatic refresh
    #[serde(default = "default_auto_refresh_hours")]
    pub auto_refresh_hours: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// JSON channel list used by the match commands
    #[serde(default)]
    pub channels_path: Option<PathBuf>,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider_epg_url: None,
            epg_urls: Vec::new(),
            auto_refresh_hours: default_auto_refresh_hours(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            channels_path: None,
            scoring: ScoringConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "iptvguide", "iptv-guide")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load from the platform config dir, falling back to defaults
    pub fn load() -> Result<Self, anyhow::Error> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(AppConfig::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), anyhow::Error> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Cannot determine config directory"))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), anyhow::Error> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Add an external guide. Returns false for blanks and duplicates.
    pub fn add_epg_url(&mut self, url: &str) -> bool {
        let url = url.trim();
        if url.is_empty() || self.guide_urls().iter().any(|u| u == url) {
            return false;
        }
        self.epg_urls.push(url.to_string());
        true
    }

    pub fn remove_epg_url(&mut self, index: usize) {
        if index < self.epg_urls.len() {
            self.epg_urls.remove(index);
        }
    }

    /// Every guide to ingest, provider first
    pub fn guide_urls(&self) -> Vec<String> {
        self.provider_epg_url
            .iter()
            .chain(self.epg_urls.iter())
            .filter(|u| !u.trim().is_empty())
            .cloned()
            .collect()
    }

    pub fn set_preferred_language(&mut self, code: &str) {
        self.scoring.preferred_language = code.trim().to_uppercase();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_old_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"provider_epg_url": "http://p/xmltv.php"}"#).unwrap();
        assert_eq!(config.auto_refresh_hours, 24);
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.scoring, ScoringConfig::default());
    }

    #[test]
    fn test_partial_scoring_section() {
        let config: AppConfig =
            serde_json::from_str(r#"{"scoring": {"premium_bonus": 5000}}"#).unwrap();
        assert_eq!(config.scoring.premium_bonus, 5000);
        assert_eq!(config.scoring.region_bonus, ScoringConfig::default().region_bonus);
    }

    #[test]
    fn test_guide_urls_order_and_dedupe() {
        let mut config = AppConfig {
            provider_epg_url: Some("http://p/xmltv.php".to_string()),
            ..Default::default()
        };
        assert!(config.add_epg_url("http://ext/guide.xml.gz"));
        assert!(!config.add_epg_url("http://p/xmltv.php"));
        assert!(!config.add_epg_url("   "));
        assert_eq!(
            config.guide_urls(),
            vec!["http://p/xmltv.php".to_string(), "http://ext/guide.xml.gz".to_string()]
        );

        config.remove_epg_url(0);
        config.remove_epg_url(9);
        assert_eq!(config.guide_urls(), vec!["http://p/xmltv.php".to_string()]);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("iptv-guide-config-{}", std::process::id()));
        let path = dir.join("config.json");

        let mut config = AppConfig::default();
        config.set_preferred_language(" fr ");
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.scoring.preferred_language, "FR");
        let _ = fs::remove_dir_all(dir);
    }
}

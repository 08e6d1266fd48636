//! Local guide cache for instant cold starts.
//!
//! The last committed schedule is written with bincode so the app can show
//! program titles before the next refresh finishes.

use crate::epg::ScheduleTable;
use crate::errors::GuideError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Bump when CachedSchedule changes so older caches are discarded
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct CachedSchedule {
    pub version: u32,
    pub cached_at: u64, // Unix timestamp (seconds)
    /// Guide URLs the table was built from, to detect a changed source list
    pub source_urls: Vec<String>,
    pub table: ScheduleTable,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl CachedSchedule {
    pub fn new(source_urls: Vec<String>, table: ScheduleTable) -> Self {
        Self {
            version: CACHE_VERSION,
            cached_at: now_secs(),
            source_urls,
            table,
        }
    }

    /// Path: <cache_dir>/schedule.bin
    pub fn cache_path() -> Option<PathBuf> {
        use directories::ProjectDirs;
        let proj = ProjectDirs::from("com", "iptvguide", "iptv-guide")?;
        Some(proj.cache_dir().join("schedule.bin"))
    }

    pub fn save(&self) -> Result<(), GuideError> {
        let path = Self::cache_path()
            .ok_or_else(|| GuideError::Cache("Cannot determine cache directory".to_string()))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), GuideError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let encoded = bincode::serialize(self).map_err(|e| GuideError::Cache(e.to_string()))?;
        std::fs::write(path, encoded)?;
        debug!(path = %path.display(), programs = self.table.program_count(), "Saved guide cache");
        Ok(())
    }

    /// Returns None if the cache doesn't exist, is corrupt, or is from an older format
    pub fn load() -> Option<CachedSchedule> {
        Self::load_from(&Self::cache_path()?)
    }

    pub fn load_from(path: &Path) -> Option<CachedSchedule> {
        let data = std::fs::read(path).ok()?;
        let cached: CachedSchedule = bincode::deserialize(&data).ok()?;

        if cached.version != CACHE_VERSION {
            let _ = std::fs::remove_file(path); // Clean up stale cache
            return None;
        }

        Some(cached)
    }

    /// True when older than `auto_refresh_hours`. Zero disables expiry.
    pub fn is_stale(&self, auto_refresh_hours: u32) -> bool {
        if auto_refresh_hours == 0 {
            return false;
        }
        let age_hours = now_secs().saturating_sub(self.cached_at) / 3600;
        age_hours >= auto_refresh_hours as u64
    }

    pub fn sources_changed(&self, current_urls: &[String]) -> bool {
        self.source_urls != current_urls
    }

    pub fn invalidate() {
        if let Some(path) = Self::cache_path() {
            Self::invalidate_at(&path);
        }
    }

    pub fn invalidate_at(path: &Path) {
        if std::fs::remove_file(path).is_ok() {
            debug!(path = %path.display(), "Removed guide cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epg::parse_document;

    fn sample_table() -> ScheduleTable {
        let xml = r#"<tv><programme start="20250115180000 +0000" stop="20250115190000 +0000" channel="espn.us"><title>SportsCenter</title></programme></tv>"#;
        parse_document(xml.as_bytes(), None, &|_| {}).unwrap()
    }

    #[test]
    fn test_roundtrip() {
        let path = std::env::temp_dir().join(format!("iptv-guide-cache-{}.bin", std::process::id()));
        let cached = CachedSchedule::new(vec!["http://p/xmltv.php".to_string()], sample_table());
        cached.save_to(&path).unwrap();

        let loaded = CachedSchedule::load_from(&path).unwrap();
        assert_eq!(loaded.table, sample_table());
        assert!(!loaded.sources_changed(&["http://p/xmltv.php".to_string()]));
        assert!(loaded.sources_changed(&[]));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_corrupt_cache_is_ignored() {
        let path = std::env::temp_dir().join(format!("iptv-guide-corrupt-{}.bin", std::process::id()));
        std::fs::write(&path, b"not bincode").unwrap();
        assert!(CachedSchedule::load_from(&path).is_none());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_invalidate_removes_file() {
        let path = std::env::temp_dir().join(format!("iptv-guide-drop-{}.bin", std::process::id()));
        CachedSchedule::new(Vec::new(), sample_table()).save_to(&path).unwrap();
        assert!(CachedSchedule::load_from(&path).is_some());

        CachedSchedule::invalidate_at(&path);
        assert!(CachedSchedule::load_from(&path).is_none());
        // Missing file is fine
        CachedSchedule::invalidate_at(&path);
    }

    #[test]
    fn test_staleness() {
        let mut cached = CachedSchedule::new(Vec::new(), ScheduleTable::new());
        assert!(!cached.is_stale(24));
        cached.cached_at -= 25 * 3600;
        assert!(cached.is_stale(24));
        assert!(!cached.is_stale(0));
    }
}

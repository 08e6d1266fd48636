use serde::{Deserialize, Serialize};
use std::path::Path;

/// A playable channel as the surrounding app knows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub url: String,
    /// Key of this channel in the guide, when the provider supplies one
    #[serde(default, alias = "tvg_id")]
    pub epg_channel_id: Option<String>,
}

/// Load a JSON array of channels
pub fn load_channels(path: &Path) -> Result<Vec<Channel>, anyhow::Error> {
    let content = std::fs::read_to_string(path)?;
    let channels: Vec<Channel> = serde_json::from_str(&content)?;
    Ok(channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_json() {
        let json = r#"[
            {"name": "ESPN", "url": "http://x/1.ts", "epg_channel_id": "espn.us"},
            {"name": "Fox", "url": "http://x/2.ts", "tvg_id": "fox.us"},
            {"name": "Local", "url": "http://x/3.ts"}
        ]"#;
        let channels: Vec<Channel> = serde_json::from_str(json).unwrap();
        assert_eq!(channels[0].epg_channel_id.as_deref(), Some("espn.us"));
        assert_eq!(channels[1].epg_channel_id.as_deref(), Some("fox.us"));
        assert_eq!(channels[2].epg_channel_id, None);
    }
}

//! Rendition ladder: the ordered set of variants a job produces.

use super::params::parse_bitrate_kbps;
use crate::error::PackagerError;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

/// One row of the ladder. Its identity is its position in the ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenditionSpec {
    pub name: String,
    /// `WxH`, passed verbatim to the encoder and the master playlist
    pub resolution: String,
    pub video_bitrate_kbps: u32,
    pub audio_bitrate_kbps: u32,
    /// H.264 level, e.g. `4.2`
    pub level: String,
}

impl RenditionSpec {
    pub fn playlist_file_name(&self) -> String {
        format!("{}.m3u8", self.name)
    }

    /// ffmpeg segment filename template, e.g. `720p_%03d.ts`.
    pub fn segment_template(&self) -> String {
        format!("{}_%03d.ts", self.name)
    }
}

/// Ladder row as written in a ladder file, bitrates as `"6000k"` strings.
#[derive(Debug, Deserialize)]
struct LadderEntry {
    name: String,
    resolution: String,
    video_bitrate: String,
    audio_bitrate: String,
    level: String,
}

impl From<LadderEntry> for RenditionSpec {
    fn from(entry: LadderEntry) -> Self {
        Self {
            name: entry.name,
            resolution: entry.resolution,
            video_bitrate_kbps: parse_bitrate_kbps(&entry.video_bitrate),
            audio_bitrate_kbps: parse_bitrate_kbps(&entry.audio_bitrate),
            level: entry.level,
        }
    }
}

/// 1080p and 720p, the ladder used when no ladder file is given.
pub fn default_ladder() -> Vec<RenditionSpec> {
    vec![
        RenditionSpec {
            name: "1080p".to_string(),
            resolution: "1920x1080".to_string(),
            video_bitrate_kbps: parse_bitrate_kbps("16000k"),
            audio_bitrate_kbps: parse_bitrate_kbps("128k"),
            level: "4.2".to_string(),
        },
        RenditionSpec {
            name: "720p".to_string(),
            resolution: "1280x720".to_string(),
            video_bitrate_kbps: parse_bitrate_kbps("6000k"),
            audio_bitrate_kbps: parse_bitrate_kbps("96k"),
            level: "3.1".to_string(),
        },
    ]
}

/// Parse a JSON ladder (an array of entries) and validate it.
pub fn parse_ladder(json: &str) -> Result<Vec<RenditionSpec>, PackagerError> {
    let entries: Vec<LadderEntry> = serde_json::from_str(json)
        .map_err(|e| PackagerError::Config(format!("malformed ladder: {}", e)))?;
    let ladder: Vec<RenditionSpec> = entries.into_iter().map(RenditionSpec::from).collect();
    validate_ladder(&ladder)?;
    Ok(ladder)
}

pub async fn load_ladder(path: &Path) -> Result<Vec<RenditionSpec>, PackagerError> {
    let json = tokio::fs::read_to_string(path).await.map_err(|e| {
        PackagerError::Config(format!("cannot read ladder {}: {}", path.display(), e))
    })?;
    parse_ladder(&json)
}

fn resolution_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[1-9]\d*x[1-9]\d*$").expect("static regex"))
}

/// Names must be unique since they key the playlist and segment files, and
/// must not contain `%`, which ffmpeg expands in the segment template.
pub fn validate_ladder(ladder: &[RenditionSpec]) -> Result<(), PackagerError> {
    if ladder.is_empty() {
        return Err(PackagerError::Config("ladder has no renditions".to_string()));
    }

    let mut seen = HashSet::new();
    for rendition in ladder {
        if rendition.name.is_empty() || rendition.name.contains(['/', '\\', '%']) {
            return Err(PackagerError::Config(format!(
                "invalid rendition name {:?}",
                rendition.name
            )));
        }
        if !seen.insert(rendition.name.as_str()) {
            return Err(PackagerError::Config(format!(
                "duplicate rendition name {}",
                rendition.name
            )));
        }
        if !resolution_pattern().is_match(&rendition.resolution) {
            return Err(PackagerError::Config(format!(
                "rendition {} has invalid resolution {:?}, expected WxH",
                rendition.name, rendition.resolution
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ladder() {
        let ladder = default_ladder();
        assert_eq!(ladder.len(), 2);
        assert_eq!(ladder[0].name, "1080p");
        assert_eq!(ladder[0].video_bitrate_kbps, 16000);
        assert_eq!(ladder[1].audio_bitrate_kbps, 96);
        assert_eq!(ladder[1].level, "3.1");
        assert!(validate_ladder(&ladder).is_ok());
    }

    #[test]
    fn test_parse_ladder_keeps_order() {
        let json = r#"[
            {"name": "480p", "resolution": "854x480", "video_bitrate": "2500k", "audio_bitrate": "96k", "level": "3.0"},
            {"name": "360p", "resolution": "640x360", "video_bitrate": "1200k", "audio_bitrate": "64k", "level": "3.0"}
        ]"#;
        let ladder = parse_ladder(json).unwrap();
        let names: Vec<&str> = ladder.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["480p", "360p"]);
        assert_eq!(ladder[1].video_bitrate_kbps, 1200);
    }

    #[test]
    fn test_malformed_bitrate_falls_back() {
        let json = r#"[{"name": "x", "resolution": "640x360", "video_bitrate": "fast", "audio_bitrate": "64", "level": "3.0"}]"#;
        let ladder = parse_ladder(json).unwrap();
        assert_eq!(ladder[0].video_bitrate_kbps, 1000);
        assert_eq!(ladder[0].audio_bitrate_kbps, 1000);
    }

    #[test]
    fn test_rejects_duplicates_and_bad_resolution() {
        let mut ladder = default_ladder();
        ladder[1].name = "1080p".to_string();
        assert!(matches!(validate_ladder(&ladder), Err(PackagerError::Config(_))));

        let mut ladder = default_ladder();
        ladder[0].resolution = "1920*1080".to_string();
        assert!(matches!(validate_ladder(&ladder), Err(PackagerError::Config(_))));

        assert!(validate_ladder(&[]).is_err());
        assert!(parse_ladder("{not json").is_err());
    }

    #[test]
    fn test_file_names() {
        let r = &default_ladder()[1];
        assert_eq!(r.playlist_file_name(), "720p.m3u8");
        assert_eq!(r.segment_template(), "720p_%03d.ts");
    }

    #[test]
    fn test_rejects_names_unsafe_for_file_names() {
        for name in ["", "hls/720p", "hls\\720p", "720p%d"] {
            let mut ladder = default_ladder();
            ladder[0].name = name.to_string();
            assert!(
                matches!(validate_ladder(&ladder), Err(PackagerError::Config(_))),
                "name {:?}",
                name
            );
        }
    }
}

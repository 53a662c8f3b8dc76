use super::jobs::TranscodeResult;
use super::params::advertised_bandwidth_bps;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

pub struct VariantStream {
    /// Advertised bandwidth in bits per second
    pub bandwidth: u64,
    pub resolution: String,
    /// Rendition playlist, relative to the master playlist
    pub uri: String,
}

/// Multi-variant playlist listing every rendition of a job.
pub struct MasterPlaylist {
    pub version: u8,
    pub variants: Vec<VariantStream>,
}

impl MasterPlaylist {
    pub fn new() -> Self {
        Self {
            version: 3,
            variants: Vec::new(),
        }
    }

    /// Build from results already in ladder order. Only the playlist file name
    /// is referenced, never the full path.
    pub fn from_results(results: &[TranscodeResult]) -> Self {
        let mut playlist = Self::new();
        for result in results {
            let uri = result
                .playlist_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| result.rendition.playlist_file_name());
            playlist.add_variant(
                advertised_bandwidth_bps(result.rendition.video_bitrate_kbps),
                result.rendition.resolution.clone(),
                uri,
            );
        }
        playlist
    }

    pub fn add_variant(&mut self, bandwidth: u64, resolution: String, uri: String) {
        self.variants.push(VariantStream {
            bandwidth,
            resolution,
            uri,
        });
    }

    pub fn render(&self) -> String {
        let mut out = String::from("#EXTM3U\n");
        out.push_str(&format!("#EXT-X-VERSION:{}\n", self.version));
        for variant in &self.variants {
            out.push_str(&format!(
                "#EXT-X-STREAM-INF:BANDWIDTH={},RESOLUTION={}\n",
                variant.bandwidth, variant.resolution
            ));
            out.push_str(&variant.uri);
            out.push('\n');
        }
        out
    }

    pub async fn write_to(&self, path: &Path) -> Result<(), std::io::Error> {
        let mut file = File::create(path).await?;
        file.write_all(self.render().as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

impl Default for MasterPlaylist {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ladder::RenditionSpec;
    use std::path::PathBuf;
    use tokio::fs;

    fn rendition(name: &str, resolution: &str, video: u32, audio: u32) -> RenditionSpec {
        RenditionSpec {
            name: name.to_string(),
            resolution: resolution.to_string(),
            video_bitrate_kbps: video,
            audio_bitrate_kbps: audio,
            level: "4.0".to_string(),
        }
    }

    fn results() -> Vec<TranscodeResult> {
        [
            rendition("1080p", "1920x1080", 16000, 128),
            rendition("720p", "1280x720", 6000, 96),
        ]
        .into_iter()
        .map(|r| TranscodeResult {
            playlist_path: PathBuf::from("/srv/out").join(r.playlist_file_name()),
            rendition: r,
            error: None,
        })
        .collect()
    }

    #[test]
    fn test_master_playlist_contents() {
        let content = MasterPlaylist::from_results(&results()).render();

        assert_eq!(
            content,
            "#EXTM3U\n\
             #EXT-X-VERSION:3\n\
             #EXT-X-STREAM-INF:BANDWIDTH=16128000,RESOLUTION=1920x1080\n\
             1080p.m3u8\n\
             #EXT-X-STREAM-INF:BANDWIDTH=6128000,RESOLUTION=1280x720\n\
             720p.m3u8\n"
        );
        assert_eq!(content.matches("#EXT-X-STREAM-INF").count(), 2);
    }

    #[tokio::test]
    async fn test_write_master_playlist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("playlist.m3u8");

        MasterPlaylist::from_results(&results())
            .write_to(&path)
            .await
            .unwrap();

        let content = fs::read_to_string(&path).await.unwrap();
        assert!(content.starts_with("#EXTM3U\n#EXT-X-VERSION:3\n"));
        assert!(content.contains("BANDWIDTH=6128000,RESOLUTION=1280x720\n720p.m3u8\n"));
        assert!(!content.contains("/srv/out"));
    }
}

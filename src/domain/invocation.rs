//! Encoder command line for one rendition.

use super::jobs::TranscodeJob;
use super::ladder::RenditionSpec;
use super::params::{derive_encode_parameters, EncodeParameters};
use std::ffi::OsString;
use std::path::PathBuf;

/// Arguments for one ffmpeg run, without the program name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderInvocation {
    pub rendition: String,
    pub params: EncodeParameters,
    pub playlist_path: PathBuf,
    pub args: Vec<OsString>,
}

impl EncoderInvocation {
    /// GOP and minimum keyframe interval are both pinned to the GOP size and
    /// scene-cut detection is off, so every segment starts on a keyframe.
    pub fn for_rendition(job: &TranscodeJob, rendition: &RenditionSpec) -> Self {
        let params = derive_encode_parameters(
            rendition.video_bitrate_kbps,
            job.frame_rate,
            job.segment_seconds,
        );
        let playlist_path = job.playlist_path(rendition);
        let segment_path = job.output_dir.join(rendition.segment_template());
        let gop = params.gop_size.to_string();

        let mut args: Vec<OsString> = Vec::with_capacity(48);
        push_args(&mut args, &["-y", "-i"]);
        args.push(job.input_path.clone().into_os_string());
        push_args(&mut args, &["-c:v", "libx264", "-preset", &job.encoder.preset]);
        push_args(&mut args, &["-crf", &job.encoder.crf.to_string()]);
        push_args(&mut args, &["-profile:v", "high", "-level:v", &rendition.level]);
        push_args(&mut args, &["-s", &rendition.resolution]);
        push_args(&mut args, &["-b:v", &format!("{}k", rendition.video_bitrate_kbps)]);
        push_args(&mut args, &["-maxrate", &format!("{}k", params.maxrate_kbps)]);
        push_args(&mut args, &["-bufsize", &format!("{}k", params.bufsize_kbps)]);
        push_args(&mut args, &["-c:a", "aac"]);
        push_args(&mut args, &["-b:a", &format!("{}k", rendition.audio_bitrate_kbps)]);
        push_args(&mut args, &["-ac", "2"]);
        push_args(&mut args, &["-g", &gop, "-keyint_min", &gop, "-sc_threshold", "0"]);
        push_args(&mut args, &["-hls_time", &job.segment_seconds.to_string()]);
        push_args(&mut args, &["-hls_list_size", "0", "-hls_flags", "independent_segments"]);
        args.push(OsString::from("-hls_segment_filename"));
        args.push(segment_path.into_os_string());
        args.push(playlist_path.clone().into_os_string());

        Self {
            rendition: rendition.name.clone(),
            params,
            playlist_path,
            args,
        }
    }

    /// Value following `flag`, if present.
    pub fn arg_value(&self, flag: &str) -> Option<&OsString> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|index| self.args.get(index + 1))
    }
}

fn push_args(args: &mut Vec<OsString>, values: &[&str]) {
    args.extend(values.iter().map(OsString::from));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::jobs::{EncoderSettings, JobSettings};
    use crate::domain::ladder::default_ladder;

    fn job() -> TranscodeJob {
        TranscodeJob::new(
            JobSettings {
                input_path: PathBuf::from("/media/source.mp4"),
                output_dir: PathBuf::from("/tmp/out"),
                renditions: default_ladder(),
                encoder: EncoderSettings::default(),
                segment_seconds: 4,
            },
            30,
        )
    }

    fn value(invocation: &EncoderInvocation, flag: &str) -> String {
        invocation
            .arg_value(flag)
            .map(|v| v.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    #[test]
    fn test_rendition_arguments() {
        let job = job();
        let invocation = EncoderInvocation::for_rendition(&job, &job.renditions[1]);

        assert_eq!(invocation.rendition, "720p");
        assert_eq!(value(&invocation, "-i"), "/media/source.mp4");
        assert_eq!(value(&invocation, "-s"), "1280x720");
        assert_eq!(value(&invocation, "-level:v"), "3.1");
        assert_eq!(value(&invocation, "-b:v"), "6000k");
        assert_eq!(value(&invocation, "-maxrate"), "7200k");
        assert_eq!(value(&invocation, "-bufsize"), "12000k");
        assert_eq!(value(&invocation, "-b:a"), "96k");
        assert_eq!(value(&invocation, "-preset"), "slow");
        assert_eq!(value(&invocation, "-crf"), "12");
    }

    #[test]
    fn test_fixed_gop_and_segmenting() {
        let job = job();
        let invocation = EncoderInvocation::for_rendition(&job, &job.renditions[0]);

        assert_eq!(value(&invocation, "-g"), "120");
        assert_eq!(value(&invocation, "-keyint_min"), "120");
        assert_eq!(value(&invocation, "-sc_threshold"), "0");
        assert_eq!(value(&invocation, "-hls_time"), "4");
        assert_eq!(value(&invocation, "-hls_flags"), "independent_segments");
        assert_eq!(
            value(&invocation, "-hls_segment_filename"),
            "/tmp/out/1080p_%03d.ts"
        );
        assert_eq!(
            invocation.args.last(),
            Some(&OsString::from("/tmp/out/1080p.m3u8"))
        );
        assert_eq!(invocation.playlist_path, PathBuf::from("/tmp/out/1080p.m3u8"));
    }
}

//! Subprocess adapters for the ffmpeg toolchain.

pub mod ffmpeg;
pub mod ffprobe;
pub mod process;

pub use ffmpeg::FfmpegAdapter;
pub use ffprobe::FfprobeAdapter;

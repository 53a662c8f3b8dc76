//! Numeric encoder parameters derived from the ladder and the probed source.
//!
//! Malformed numbers degrade to fixed defaults instead of failing the job.

/// Used when a bitrate string is not of the form `<digits>k`.
pub const DEFAULT_BITRATE_KBPS: u32 = 1000;

/// Used when the prober output is not of the form `<num>/<den>`.
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// Allowance added to the video bitrate when advertising a variant's bandwidth,
/// approximating audio plus container overhead.
pub const BANDWIDTH_OVERHEAD_KBPS: u64 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParameters {
    pub maxrate_kbps: u32,
    pub bufsize_kbps: u32,
    pub gop_size: u32,
}

/// `"6000k"` -> 6000. Anything else -> [`DEFAULT_BITRATE_KBPS`].
pub fn parse_bitrate_kbps(bitrate: &str) -> u32 {
    match bitrate.strip_suffix('k') {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            digits.parse().unwrap_or(DEFAULT_BITRATE_KBPS)
        }
        _ => DEFAULT_BITRATE_KBPS,
    }
}

/// Parse an ffprobe rational such as `30000/1001` into whole frames per second.
///
/// A zero denominator is treated as 1. Output that is not exactly two integers
/// separated by `/` yields [`DEFAULT_FRAME_RATE`].
pub fn parse_frame_rate(raw: &str) -> u32 {
    let parts: Vec<&str> = raw.trim().split('/').collect();
    if let [numerator, denominator] = parts.as_slice() {
        if let (Ok(numerator), Ok(denominator)) =
            (numerator.parse::<u32>(), denominator.parse::<u32>())
        {
            return numerator / denominator.max(1);
        }
    }
    DEFAULT_FRAME_RATE
}

pub fn gop_size(frame_rate: u32, segment_seconds: u32) -> u32 {
    frame_rate.saturating_mul(segment_seconds)
}

pub fn derive_encode_parameters(
    bitrate_kbps: u32,
    frame_rate: u32,
    segment_seconds: u32,
) -> EncodeParameters {
    let bitrate = u64::from(bitrate_kbps);
    // ceil(bitrate * 1.2) in integers
    let maxrate = (bitrate * 6 + 4) / 5;
    EncodeParameters {
        maxrate_kbps: u32::try_from(maxrate).unwrap_or(u32::MAX),
        bufsize_kbps: bitrate_kbps.saturating_mul(2),
        gop_size: gop_size(frame_rate, segment_seconds),
    }
}

/// Bandwidth advertised in the master playlist, in bits per second.
pub fn advertised_bandwidth_bps(video_bitrate_kbps: u32) -> u64 {
    (u64::from(video_bitrate_kbps) + BANDWIDTH_OVERHEAD_KBPS) * 1000
}

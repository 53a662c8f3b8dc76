//! Domain layer - Pure business logic.

pub mod hls;
pub mod invocation;
pub mod jobs;
pub mod ladder;
pub mod params;

//! abr-packager - Adaptive bitrate HLS packaging
//!
//! Hexagonal Architecture:
//! - domain/: Pure business logic (ladder, encoder parameters, jobs, hls)
//! - ports/: Trait definitions (frame rate probe, encoder, storage)
//! - adapters/: Concrete implementations (ffmpeg tools, S3, local fs)
//! - application/: Services (preflight, transcode pool, orchestrator, uploader)
//! - config: Environment configuration
//! - cli: Command line

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

// Re-exports for convenience
pub use application::{JobContext, OrchestratorService, PackagedJob, TranscodePool};
pub use domain::hls;
pub use error::{PackagerError, ToolError};

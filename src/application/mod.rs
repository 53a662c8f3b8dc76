//! Application layer - Services that drive the ports.

pub mod context;
pub mod orchestrator;
pub mod preflight;
pub mod uploader;
pub mod worker;

pub use context::JobContext;
pub use orchestrator::{OrchestratorService, PackagedJob};
pub use worker::TranscodePool;

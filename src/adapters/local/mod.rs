//! Local adapters for publishing without object storage.

pub mod fs;

pub use fs::FsAdapter;

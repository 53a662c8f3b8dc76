//! Ports - Trait definitions for the external collaborators.

pub mod encoder;
pub mod probe;
pub mod storage;

//! # brdoc-runtime
//!
//! The orchestration layer: configuration and the top-level controller
//! driving generate → validate → refine → render → commit for one
//! request at a time.

pub mod config;
pub mod orchestrator;

pub use config::BrConfig;
pub use orchestrator::{
    GenerationOptions, GenerationReport, GenerationStatus, Orchestrator, ProjectData,
};

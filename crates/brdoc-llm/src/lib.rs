//! # brdoc-llm
//!
//! Language-model access for document generation:
//! - provider wire protocols (OpenAI-compatible chat, Anthropic messages,
//!   Ollama generate) behind one client type
//! - an ordered fallback chain with per-config retries and memoised
//!   clients
//! - latency and token accounting on every call
//! - the Polish prompt library for generation, refinement, and review
//!
//! Transport failures never escape as errors: an exhausted chain returns
//! an explicit failure response carrying the last observed error.

pub mod chain;
pub mod client;
pub mod config;
pub mod prompts;

pub use chain::*;
pub use client::*;
pub use config::*;

//! # brdoc-sources
//!
//! Uniform pull abstraction over named data sources and per-request
//! variable tracking:
//! - SQL sources with a named-placeholder template dialect
//! - REST sources with `{name}`-templated URLs
//! - cURL subprocess sources with hard-kill timeouts
//! - a closed registry with concurrent fan-out
//! - the variable tracker synthesising verification URLs and footnotes
//!
//! Transport failures are values: every fetch returns a result envelope
//! whose `error` field is populated instead of raising.

pub mod curl;
pub mod descriptor;
pub mod registry;
pub mod rest;
pub mod source;
pub mod sql;
pub mod tracker;

pub use curl::*;
pub use descriptor::*;
pub use registry::*;
pub use rest::*;
pub use source::*;
pub use sql::*;
pub use tracker::*;

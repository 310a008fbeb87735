//! # brdoc-core
//!
//! Core domain values and models for B+R / IP Box documentation:
//! - Polish-locale formatting (money, dates, NIP, hours, Nexus)
//! - Validation primitives (NIP/REGON checksums, fiscal-year bounds)
//! - The Nexus indicator calculation
//! - Project input, expense/revenue/time-entry read models
//! - Validation issue and result types shared by the pipeline
//! - Pure roll-up functions feeding the document generator

pub mod check;
pub mod enums;
pub mod error;
pub mod format;
pub mod models;
pub mod nexus;
pub mod summary;

pub use enums::*;
pub use error::*;
pub use models::*;
pub use nexus::*;

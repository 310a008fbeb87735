//! Data model of the B+R documentation domain.
//!
//! - Project input (identity, timeline, innovation profile, methodology,
//!   costs), immutable for the duration of a generation request
//! - Read-model rows (expenses, revenues, time entries)
//! - Validation issue and result types shared by the whole pipeline
//! - The extracted-invoice shape consumed from OCR ingestion

mod expense;
mod issue;
mod project;
mod time_entry;

pub use expense::*;
pub use issue::*;
pub use project::*;
pub use time_entry::*;

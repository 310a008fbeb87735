//! # brdoc-validators
//!
//! Staged, composable validation of generated B+R documents:
//! - structure (required sections, fields, table formatting)
//! - legal (NIP checksums, B+R categories, legal references, dates,
//!   related-party disclosure)
//! - financial (amounts, totals, percentages, currencies, Nexus)
//! - optional model review via the LLM fallback chain
//!
//! Stages run in registered order over a shared context; issues are
//! aggregated monotonically and the overall score is the mean over
//! executed stages. The issue-code taxonomy is public and stable.

pub mod context;
pub mod financial;
pub mod legal;
pub mod model_review;
pub mod pipeline;
pub mod structure;

pub use context::*;
pub use financial::FinancialValidator;
pub use legal::LegalValidator;
pub use model_review::ModelReviewValidator;
pub use pipeline::*;
pub use structure::StructureValidator;

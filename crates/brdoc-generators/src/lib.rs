//! # brdoc-generators
//!
//! Document generation for the B+R dossier:
//! - substitution-context assembly from fetched payloads, aggregates,
//!   and literal parameters
//! - the template-driven generator with a model path and a guaranteed
//!   deterministic fallback
//! - single-expense and project-summary document builders
//! - the iterative refinement loop with the numeric-preservation
//!   post-condition

pub mod context;
pub mod expense_doc;
pub mod generator;
pub mod refine;
pub mod summary_doc;

pub use context::build_context;
pub use expense_doc::{build_expense_prompt, expense_document, iteration_number};
pub use generator::{annotate_first_occurrence, DocumentGenerator, GeneratedDocument};
pub use refine::{
    format_issues, numeric_literals, preserves_numerics, refine, RefinementEntry,
    RefinementOutcome, RefinementStatus,
};
pub use summary_doc::summary_document;

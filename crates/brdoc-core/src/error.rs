//! Error types for the B+R documentation system.

use thiserror::Error;

/// Main error type for documentation operations.
#[derive(Error, Debug)]
pub enum BrError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Domain validation error (invalid project input, NIP, amounts)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Document generation error
    #[error("Generation error: {0}")]
    GenerationError(String),

    /// Template parse or expansion error
    #[error("Template error: {0}")]
    TemplateError(String),

    /// Transport error (SQL, HTTP, subprocess)
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Rendering error (Markdown/HTML/PDF)
    #[error("Render error: {0}")]
    RenderError(String),

    /// Version store error
    #[error("Version store error: {0}")]
    StoreError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Unknown template, source, or artifact
    #[error("Not found: {0}")]
    NotFound(String),
}

impl BrError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a generation error.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::GenerationError(msg.into())
    }

    /// Create a template error.
    pub fn template(msg: impl Into<String>) -> Self {
        Self::TemplateError(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    /// Create a render error.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::RenderError(msg.into())
    }

    /// Create a version store error.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    /// Create a not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Check whether the error is a contained transport failure.
    ///
    /// Transport failures are values in this system: the registry and the
    /// model chain report them inside their result types, and only wrap
    /// them in `BrError` at the outermost edge.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TransportError(_))
    }
}

impl From<serde_json::Error> for BrError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Result type alias for documentation operations.
pub type BrResult<T> = Result<T, BrError>;

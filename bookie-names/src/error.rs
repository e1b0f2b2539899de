//! Error types for bookie-names.

use bookie_core::ValidationError;
use thiserror::Error;

/// All errors that can arise while resolving a name template.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A referenced parameter is absent (`TemplateParameterMissing`).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Tera template engine error for one language's pattern.
    #[error("template engine error for language '{language}': {source}")]
    Engine {
        language: String,
        #[source]
        source: tera::Error,
    },
}

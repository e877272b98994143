//! Error types for the generation engine.
//!
//! A single taxonomy covers the whole build: registry lookups, extension
//! instantiation, description/configuration loading, and artifact writes.
//! None of these are recovered locally; the first fatal error aborts the
//! build as a whole.

use thiserror::Error;

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Fatal error raised during a generation run.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Lookup of a description-type name that was never registered.
    ///
    /// Always a programming or configuration error upstream: something
    /// referenced a type that discovery never produced.
    #[error("no such type {0}")]
    NoSuchType(String),

    /// A configured extension identifier could not be constructed.
    #[error("failed to instantiate extension `{id}`")]
    ExtensionInstantiation {
        /// The extension identifier that failed to resolve or construct.
        id: String,
        /// Underlying constructor failure, if the identifier resolved.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Writing an artifact to the destination tree failed.
    #[error("artifact write failed: {0}")]
    Io(#[from] std::io::Error),

    /// The API description could not be parsed or is structurally invalid.
    #[error("invalid api description: {0}")]
    Model(String),

    /// The configuration file could not be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GenerationError {
    /// Shorthand for an instantiation failure with no underlying cause
    /// (the identifier resolved to nothing at all).
    pub fn unknown_extension(id: &str) -> Self {
        GenerationError::ExtensionInstantiation {
            id: id.to_string(),
            source: None,
        }
    }
}

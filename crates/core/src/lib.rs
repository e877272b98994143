//! Orchestration core of an API-description-to-TypeScript code generator.
//!
//! Given a parsed, read-only API description, the engine discovers the
//! types and operations it must emit, resolves pluggable extension points
//! that let callers customize each generated unit, assembles units
//! (including nested sub-units) through one or two construction phases,
//! and writes the resulting artifacts to a destination tree.
//!
//! The pipeline is two sequential passes:
//!
//! 1. Construction: a type finder discovers candidates, each candidate
//!    registers generator units in the [`engine::ModelIndex`].
//! 2. Emission: the [`engine::Emitter`] renders every registered unit and
//!    writes it through an output sink, with the schema staging directory
//!    guaranteed to be released afterwards.
//!
//! The easiest entry point is [`engine::generate`]; the pieces compose
//! individually for callers replacing the finder, the extension discovery
//! mechanism or the output sink.

pub mod config;
pub mod engine;
pub mod error;
pub mod extensions;
pub mod generators;
pub mod model;
pub mod ts;

pub use config::Configuration;
pub use engine::{generate, generate_with_sink, GenerationContext};
pub use error::{GenerationError, Result};
pub use model::ApiModel;

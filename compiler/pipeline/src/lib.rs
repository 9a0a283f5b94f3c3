#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! High-level pipeline that turns a configuration module into generated code.
//!
//! A run evaluates the configured module through a [`provider::SchemaProvider`],
//! decodes the wire dump, narrows it to the selected sub-tree and hands the
//! result to the code generator (or re-encodes it as JSON).
//!
//! ## Module Organization
//!
//! - `orchestration` - Entry points (`run`, `run_to_dir`) and request building
//! - `output` - Writing generated files and optional `rustfmt` formatting

use thiserror::Error;

/// Convenient result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while running the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The selected path does not exist in the decoded module.
    #[error("selected path `{0}` not found in module")]
    SelectNotFound(String),
    /// The selected path names an option instead of a module.
    #[error("selected path `{0}` is an option, not a module")]
    SelectNotModule(String),
    /// Error from the evaluator.
    #[error(transparent)]
    Evaluation(#[from] provider::EvaluationError),
    /// Error decoding or encoding the wire format.
    #[error(transparent)]
    Codec(#[from] options::CodecError),
    /// Error propagated from the codegen crate.
    #[error(transparent)]
    Codegen(#[from] codegen::CodegenError),
    /// Error loading configuration.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// Error installing the log subscriber.
    #[error(transparent)]
    Logging(#[from] logging::LoggingError),
    /// I/O error while creating or writing files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub mod orchestration;
pub mod output;

pub use orchestration::{eval_request, naming_rules, provider_from_config, run, run_to_dir};
pub use output::{write_output, Output};

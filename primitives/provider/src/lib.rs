#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `modgen-provider`: schema evaluation contract
//!
//! Module schemas are produced by an external evaluator. This crate defines
//! the request that is handed to it ([`EvalRequest`]), the trait every
//! evaluator backend implements ([`SchemaProvider`]), and the failure modes a
//! caller can observe ([`EvaluationError`]).
//!
//! Two backends ship with the crate:
//! - [`CommandProvider`] runs an evaluator program as a subprocess and reads
//!   the wire bytes from its standard output.
//! - [`StaticProvider`] serves a fixed, pre-evaluated dump.
//!
//! ## Example
//! ```no_run
//! use provider::{CommandProvider, EvalRequest, SchemaProvider};
//!
//! let evaluator = CommandProvider::new("nix-instantiate")
//!     .with_args(["--eval", "--strict", "--json", "dump.nix"]);
//! let request = EvalRequest::path("./module.nix").with_options_path(["services"]);
//! let bytes = evaluator.evaluate(&request)?;
//! println!("{} bytes", bytes.len());
//! # Ok::<(), provider::EvaluationError>(())
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod command;

pub use command::CommandProvider;

/// Type alias for evaluation results.
pub type Result<T> = std::result::Result<T, EvaluationError>;

/// Failures surfaced by a [`SchemaProvider`].
#[derive(thiserror::Error, Debug)]
pub enum EvaluationError {
    /// The evaluator ran and reported an error; the message is passed through verbatim.
    #[error("evaluation failed: {0}")]
    Diagnostic(String),

    /// The evaluator program could not be started.
    #[error("failed to start evaluator `{program}`: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// An expression in the request failed the syntax check.
    #[error("parse {what}: nix expression error: {message}")]
    Syntax {
        /// Which part of the request was rejected
        what: String,
        /// The parser's own message
        message: String,
    },

    /// The evaluator did not finish before its deadline and was killed.
    #[error("evaluation timed out after {0:?}")]
    TimedOut(std::time::Duration),

    /// The caller cancelled the request.
    #[error("evaluation cancelled")]
    Cancelled,

    /// I/O failure while talking to the evaluator.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The request could not be expressed for this backend.
    #[error("invalid evaluation request: {0}")]
    InvalidRequest(String),
}

/// Where the module to evaluate comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleLocator {
    /// A module file on disk
    Path(PathBuf),
    /// A source expression evaluating to a module
    Expr(String),
}

/// Everything the evaluator needs to produce a wire dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalRequest {
    /// The module to evaluate
    pub locator: ModuleLocator,
    /// Package-set expression, if the module needs one
    pub pkgs: Option<String>,
    /// Extra named arguments, each an expression
    pub special_args: BTreeMap<String, String>,
    /// Restrict evaluation to this option subtree
    pub options_path: Vec<String>,
}

impl EvalRequest {
    /// A request for the module at `path`.
    pub fn path(path: impl Into<PathBuf>) -> Self { Self::new(ModuleLocator::Path(path.into())) }

    /// A request for the module produced by `expr`.
    pub fn expr(expr: impl Into<String>) -> Self { Self::new(ModuleLocator::Expr(expr.into())) }

    fn new(locator: ModuleLocator) -> Self {
        Self { locator, pkgs: None, special_args: BTreeMap::new(), options_path: Vec::new() }
    }

    /// Set the package-set expression.
    pub fn with_pkgs(mut self, pkgs: impl Into<String>) -> Self {
        self.pkgs = Some(pkgs.into());
        self
    }

    /// Add one extra named argument.
    pub fn with_special_arg(mut self, name: impl Into<String>, expr: impl Into<String>) -> Self {
        self.special_args.insert(name.into(), expr.into());
        self
    }

    /// Restrict evaluation to one subtree.
    pub fn with_options_path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options_path = path.into_iter().map(Into::into).collect();
        self
    }
}

/// Shared flag used to abort an in-flight evaluation.
///
/// Clones observe the same flag, so one clone can be handed to the provider
/// while another stays with whoever may cancel.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self { Self::default() }

    /// Request cancellation.
    pub fn cancel(&self) { self.0.store(true, Ordering::SeqCst) }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

/// A backend able to turn an [`EvalRequest`] into raw wire bytes.
pub trait SchemaProvider: Send + Sync {
    /// Evaluate `request`, returning the wire bytes unmodified.
    fn evaluate(&self, request: &EvalRequest) -> Result<Vec<u8>>;

    /// Short description of the backend, used in logs.
    fn describe(&self) -> String;
}

/// Shared, dynamically dispatched provider.
pub type DynProvider = Arc<dyn SchemaProvider>;

/// Serves a fixed, already evaluated dump regardless of the request.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    bytes: Vec<u8>,
}

impl StaticProvider {
    /// Serve `bytes` for every request.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self { Self { bytes: bytes.into() } }

    /// Serve the contents of the file at `path`.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::new(std::fs::read(path)?))
    }
}

impl SchemaProvider for StaticProvider {
    fn evaluate(&self, _request: &EvalRequest) -> Result<Vec<u8>> { Ok(self.bytes.clone()) }

    fn describe(&self) -> String { format!("static dump ({} bytes)", self.bytes.len()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn test_request_builders() {
        let request = EvalRequest::expr("{ ... }: { }")
            .with_pkgs("import <nixpkgs> { }")
            .with_special_arg("hostName", "\"box\"")
            .with_options_path(["services", "magics"]);
        assert_eq!(request.locator, ModuleLocator::Expr("{ ... }: { }".to_string()));
        assert_eq!(request.pkgs.as_deref(), Some("import <nixpkgs> { }"));
        assert_eq!(request.special_args.get("hostName").map(String::as_str), Some("\"box\""));
        assert_eq!(request.options_path, vec!["services", "magics"]);
    }

    #[test]
    fn test_static_provider_ignores_request() {
        let provider = StaticProvider::new(b"{}".to_vec());
        let bytes = provider.evaluate(&EvalRequest::path("/dev/null")).expect("static bytes");
        assert_eq!(bytes, b"{}");
        assert_eq!(provider.describe(), "static dump (2 bytes)");
    }
}

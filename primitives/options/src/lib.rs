#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Option model and wire codec
//!
//! This crate holds the in-memory tree produced by evaluating a configuration
//! module, the codec that maps it to and from its self-describing JSON wire
//! form, and the read-only passes every consumer needs: dotted-path lookup and
//! canonical member ordering.

pub mod codec;
pub mod model;
pub mod path;
pub mod registry;
pub mod sort;

use thiserror::Error;

pub use codec::{decode, decode_node, encode, encode_node, encode_pretty, WirePath};
pub use model::{Module, Node, OptionDoc, OptionType, RawJson, SchemaOption};
pub use path::{parse_path, NodeRef};
pub use sort::sort_module;

/// Errors raised while decoding or encoding the wire format.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The input is not well-formed JSON, or serialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// A module or option position held something other than an object.
    #[error("expected a JSON object at {path}")]
    NotAnObject {
        /// Dotted location of the value
        path: String,
    },
    /// A value had the wrong JSON shape for its position.
    #[error("unexpected wire shape at {path}: {source}")]
    Shape {
        /// Dotted location of the value
        path: String,
        /// Underlying parse failure
        source: serde_json::Error,
    },
    /// A registered option kind lacked one of its payload fields.
    #[error("`{tag}` option at {path} is missing its `{field}` field")]
    MissingField {
        /// Dotted location of the option
        path: String,
        /// Wire tag of the option
        tag: String,
        /// Name of the missing field
        field: &'static str,
    },
    /// The registry and the model disagree about a tag.
    #[error("unreachable option variant `{tag}`: registry and model disagree")]
    UnreachableVariant {
        /// The offending tag
        tag: String,
    },
}

/// Convenient result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

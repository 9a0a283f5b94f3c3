#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Rust type generation for configuration modules.
//!
//! This crate turns a decoded option [`Module`] into one self-contained Rust
//! source file: a struct per module and submodule, a string newtype with
//! constants per `enum`, and an untagged sum type per `either`. Every field
//! keeps its wire name through `#[serde(rename = "...")]`, so the generated
//! types deserialize the configuration values the module describes.
//!
//! Evaluating modules and writing files live in companion crates.

pub mod generators;
pub mod naming;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use options::Module;
use thiserror::Error;

pub use crate::generators::generate;
pub use crate::naming::{parse_name, NamingConfig, OptionName};

/// Error type for code generation operations in this crate.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Two distinct source names render to the same identifier in one scope.
    #[error("naming collision in {scope}: `{first}` and `{second}` both render as `{target}`")]
    NamingCollision {
        /// The namespace the identifiers share
        scope: String,
        /// The colliding identifier
        target: String,
        /// Source that claimed the identifier first
        first: String,
        /// Source that tried to claim it again
        second: String,
    },
    /// The option model holds a kind the wire registry does not know.
    #[error("unreachable option variant `{tag}`: registry and model disagree")]
    UnreachableVariant {
        /// The offending tag
        tag: String,
    },
    /// Formatting error when building generated source.
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
}

/// Convenient result type for codegen functions in this crate.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Inputs that shape the generated file, besides the module itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Name of the struct generated for the root module
    pub root_type: String,
    /// Package the generated file belongs to
    pub package: String,
}

impl Default for GenerateOptions {
    fn default() -> Self { Self { root_type: "Config".to_string(), package: "config".to_string() } }
}

/// Crates the generated source needs, with the features it relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies(BTreeMap<&'static str, BTreeSet<&'static str>>);

impl Dependencies {
    /// Require `krate` with at least `features`.
    pub fn require(&mut self, krate: &'static str, features: &[&'static str]) {
        self.0.entry(krate).or_default().extend(features.iter().copied());
    }

    /// Whether `krate` is required.
    pub fn contains(&self, krate: &str) -> bool { self.0.contains_key(krate) }

    /// Features required for `krate`, sorted.
    pub fn features(&self, krate: &str) -> Vec<&'static str> {
        self.0.get(krate).map(|features| features.iter().copied().collect()).unwrap_or_default()
    }

    /// Required crates and their features, sorted by crate name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &BTreeSet<&'static str>)> {
        self.0.iter().map(|(krate, features)| (*krate, features))
    }

    /// Render as `[dependencies]` lines for a Cargo manifest.
    pub fn to_manifest(&self) -> String {
        let mut out = String::new();
        for (krate, features) in self.iter() {
            let _ = if features.is_empty() {
                writeln!(out, "{krate} = \"1\"")
            } else {
                let features: Vec<String> = features.iter().map(|f| format!("{f:?}")).collect();
                writeln!(out, "{krate} = {{ version = \"1\", features = [{}] }}", features.join(", "))
            };
        }
        out
    }
}

/// One generated compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// Package the unit was generated for
    pub package: String,
    /// Rust source text
    pub source: String,
    /// Crates the source depends on
    pub dependencies: Dependencies,
}

/// Generate Rust types for `module` with default options and naming rules.
pub fn generate_default(module: &Module) -> Result<GeneratedUnit> {
    generate(module, &GenerateOptions::default(), &NamingConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependencies_manifest() {
        let mut deps = Dependencies::default();
        deps.require("serde_json", &[]);
        deps.require("serde", &["derive"]);
        deps.require("serde_json", &["raw_value"]);
        assert_eq!(
            deps.to_manifest(),
            "serde = { version = \"1\", features = [\"derive\"] }\n\
             serde_json = { version = \"1\", features = [\"raw_value\"] }\n"
        );
        assert_eq!(deps.features("serde_json"), vec!["raw_value"]);
        assert!(!deps.contains("regex"));
    }
}

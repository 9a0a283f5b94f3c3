//! Generators that turn an option tree into Rust source.
//!
//! [`generate`] drives one run. The emitter walks the sorted tree once,
//! reserving an output slot for each struct before visiting its members, so
//! every parent type appears ahead of the types its fields introduce.

/// Sub-crate generates: **`doc_comment`**
///
/// Reflows option descriptions into triple-slash doc comments.
pub mod doc_comment;

mod either;
mod module_types;

use options::Module;
use tracing::debug;

use crate::naming::{NamingConfig, OptionName};
use crate::{GenerateOptions, GeneratedUnit, Result};
use module_types::{Emitter, SourcePath};

/// Source name recorded for the root module.
const ROOT_SOURCE: &str = "<root>";

/// Generate one Rust compilation unit for `module`.
///
/// The output is only assembled once the whole tree has been walked, so an
/// error anywhere leaves nothing behind.
pub fn generate(
    module: &Module,
    options: &GenerateOptions,
    rules: &NamingConfig,
) -> Result<GeneratedUnit> {
    debug!(
        package = %options.package,
        root = %options.root_type,
        members = module.len(),
        "generating Rust types from module"
    );

    let mut emitter = Emitter::new(rules);
    let root = OptionName::derived(ROOT_SOURCE, options.root_type.clone());
    emitter.module_type(&root, &SourcePath::root(), module)?;
    emitter.finish(&options.package)
}

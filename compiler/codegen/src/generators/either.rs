//! Sum types for `either` options.
//!
//! Every alternative gets a wrapper type named after the sum type and the
//! alternative's tag (`ListenStr`, `ListenListOf`). A module or enum
//! alternative is itself a named type and simply takes that name. Any other
//! alternative becomes a transparent newtype over its mapped type, and a
//! module or enum nested inside it is named `<Wrapper>Item`.
//!
//! Deserialization tries the alternatives in declaration order and keeps the
//! first one that accepts the value.

use std::fmt::Write as _;

use options::{Node, OptionType};
use tracing::debug;

use super::module_types::{Emitter, SourcePath};
use crate::naming::{parse_name, OptionName};
use crate::Result;

struct Alternative {
    variant: String,
    ty: String,
    tag: &'static str,
}

/// Whether `node` generates a named type that can stand in for its wrapper.
fn claims_name(node: &Node) -> bool {
    match node {
        Node::Module(_) => true,
        Node::Option(option) => match &option.kind {
            OptionType::Submodule(_) | OptionType::Enum(_) => true,
            OptionType::Either(_) => !option.kind.is_number(),
            OptionType::Unique(inner) => claims_name(inner),
            _ => false,
        },
    }
}

impl Emitter<'_> {
    pub(super) fn either_type(
        &mut self,
        name: &OptionName,
        path: &SourcePath,
        alternatives: &[Node],
    ) -> Result<String> {
        let ident = name.type_ident();
        debug!(path = %path, name = %name.source, alternatives = alternatives.len(), "generating either type");
        self.types.claim(&ident, path.to_string())?;
        self.deps.require("serde_json", &["raw_value"]);
        let slot = self.reserve();

        let mut resolved = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            let tag = match alternative.tag() {
                "" => "submodule",
                tag => tag,
            };
            let variant = parse_name(tag, self.rules).type_ident();
            let wrapper = OptionName::derived(tag, format!("{ident}{variant}"));

            let ty = if claims_name(alternative) {
                self.node_type(&wrapper, path, alternative)?
            } else {
                let wrapper_ident = wrapper.type_ident();
                self.types.claim(&wrapper_ident, format!("{path} ({tag} alternative)"))?;
                let item = OptionName::derived(tag, format!("{}Item", wrapper.target));
                let inner = self.node_type(&item, path, alternative)?;

                let mut out = String::new();
                writeln!(out, "/// `{wrapper_ident}` is one of the types that satisfy [`{ident}`].")?;
                writeln!(out, "#[derive(Debug, Clone, Serialize, Deserialize)]")?;
                writeln!(out, "#[serde(transparent)]")?;
                writeln!(out, "pub struct {wrapper_ident}(pub {inner});")?;
                self.push(out);
                wrapper_ident
            };
            resolved.push(Alternative { variant, ty, tag });
        }

        let mut out = String::new();
        writeln!(out, "/// `{ident}` describes the `either` type for {}.", path.describe())?;
        writeln!(out, "///")?;
        writeln!(out, "/// Deserialization tries each alternative in declaration order.")?;
        writeln!(out, "#[derive(Debug, Clone, Serialize)]")?;
        writeln!(out, "#[serde(untagged)]")?;
        writeln!(out, "pub enum {ident} {{")?;
        for alternative in &resolved {
            writeln!(out, "    /// A `{}` value.", alternative.tag)?;
            writeln!(out, "    {}({}),", alternative.variant, alternative.ty)?;
        }
        writeln!(out, "}}")?;

        // Prelude names are spelled out in full: a member named `from`, `ok`
        // or `d` generates a type that would otherwise shadow them.
        for alternative in &resolved {
            writeln!(out)?;
            writeln!(out, "impl ::core::convert::From<{}> for {ident} {{", alternative.ty)?;
            writeln!(out, "    fn from(value: {}) -> Self {{", alternative.ty)?;
            writeln!(out, "        Self::{}(value)", alternative.variant)?;
            writeln!(out, "    }}")?;
            writeln!(out, "}}")?;
        }

        writeln!(out)?;
        writeln!(out, "impl<'de> Deserialize<'de> for {ident} {{")?;
        writeln!(
            out,
            "    fn deserialize<__D>(deserializer: __D) -> ::core::result::Result<Self, __D::Error>"
        )?;
        writeln!(out, "    where")?;
        writeln!(out, "        __D: serde::Deserializer<'de>,")?;
        writeln!(out, "    {{")?;
        writeln!(
            out,
            "        let raw = ::std::boxed::Box::<serde_json::value::RawValue>::deserialize(deserializer)?;"
        )?;
        for alternative in &resolved {
            writeln!(
                out,
                "        if let ::core::result::Result::Ok(value) = serde_json::from_str::<{}>(raw.get()) {{",
                alternative.ty
            )?;
            writeln!(
                out,
                "            return ::core::result::Result::Ok(Self::{}(value));",
                alternative.variant
            )?;
            writeln!(out, "        }}")?;
        }
        writeln!(
            out,
            "        ::core::result::Result::Err(serde::de::Error::custom(\"no alternative matched `{ident}`\"))"
        )?;
        writeln!(out, "    }}")?;
        writeln!(out, "}}")?;

        self.fill(slot, out);
        Ok(ident)
    }
}

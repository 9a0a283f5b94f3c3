//! Structs, enums and scalar mappings.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use options::{registry, sort_module, Module, Node, OptionType, SchemaOption};
use tracing::{debug, trace};

use super::doc_comment::write_doc_comment;
use crate::naming::{parse_name, NamingConfig, OptionName};
use crate::{CodegenError, Dependencies, GeneratedUnit, Result};

/// Dotted source location of the option being generated.
#[derive(Debug, Clone, Default)]
pub(super) struct SourcePath(Vec<String>);

impl SourcePath {
    pub(super) fn root() -> Self { Self::default() }

    pub(super) fn child(&self, member: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(member.to_string());
        Self(segments)
    }

    /// Phrase used in generated type comments.
    pub(super) fn describe(&self) -> String {
        if self.0.is_empty() {
            "the root module".to_string()
        } else {
            format!("`{}`", self.0.join("."))
        }
    }
}

impl fmt::Display for SourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0.join("."))
        }
    }
}

/// Identifiers claimed within one namespace, mapped to who claimed them.
pub(super) struct Scope {
    name: String,
    claimed: BTreeMap<String, String>,
}

impl Scope {
    pub(super) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), claimed: BTreeMap::new() }
    }

    pub(super) fn claim(&mut self, target: &str, source: String) -> Result<()> {
        if let Some(first) = self.claimed.get(target) {
            return Err(CodegenError::NamingCollision {
                scope: self.name.clone(),
                target: target.to_string(),
                first: first.clone(),
                second: source,
            });
        }
        self.claimed.insert(target.to_string(), source);
        Ok(())
    }
}

#[derive(Default)]
struct Imports {
    btree_map: bool,
    cow: bool,
}

/// Accumulates the declarations of one generated file.
pub(super) struct Emitter<'a> {
    pub(super) rules: &'a NamingConfig,
    items: Vec<String>,
    pub(super) types: Scope,
    imports: Imports,
    pub(super) deps: Dependencies,
}

impl<'a> Emitter<'a> {
    pub(super) fn new(rules: &'a NamingConfig) -> Self {
        let mut deps = Dependencies::default();
        deps.require("serde", &["derive"]);
        Self {
            rules,
            items: Vec::new(),
            types: Scope::new("the type namespace"),
            imports: Imports::default(),
            deps,
        }
    }

    /// Reserve the position of a declaration whose text is not known yet.
    pub(super) fn reserve(&mut self) -> usize {
        self.items.push(String::new());
        self.items.len() - 1
    }

    pub(super) fn fill(&mut self, slot: usize, item: String) { self.items[slot] = item; }

    pub(super) fn push(&mut self, item: String) { self.items.push(item); }

    pub(super) fn finish(self, package: &str) -> Result<GeneratedUnit> {
        let mut source = String::new();
        writeln!(source, "// Code generated by modgen. DO NOT EDIT.")?;
        writeln!(source, "// Package `{package}`.")?;
        writeln!(source)?;
        if self.imports.cow {
            writeln!(source, "use std::borrow::Cow;")?;
        }
        if self.imports.btree_map {
            writeln!(source, "use std::collections::BTreeMap;")?;
        }
        if self.imports.cow || self.imports.btree_map {
            writeln!(source)?;
        }
        writeln!(source, "use serde::{{Deserialize, Serialize}};")?;
        for item in &self.items {
            writeln!(source)?;
            source.push_str(item);
        }

        Ok(GeneratedUnit { package: package.to_string(), source, dependencies: self.deps })
    }

    pub(super) fn node_type(
        &mut self,
        name: &OptionName,
        path: &SourcePath,
        node: &Node,
    ) -> Result<String> {
        match node {
            Node::Module(module) => self.module_type(name, path, module),
            Node::Option(option) => self.option_type(name, path, option),
        }
    }

    /// A struct with one field per member, in sorted order.
    pub(super) fn module_type(
        &mut self,
        name: &OptionName,
        path: &SourcePath,
        module: &Module,
    ) -> Result<String> {
        let ident = name.type_ident();
        debug!(path = %path, name = %name.source, members = module.len(), "generating module type");
        self.types.claim(&ident, path.to_string())?;
        let slot = self.reserve();

        let mut fields = Scope::new(format!("the fields of `{ident}`"));
        let mut body = String::new();
        for (member, node) in sort_module(module) {
            let field_name = parse_name(member, self.rules);
            let field = field_name.field_ident();
            fields.claim(&field, member.to_string())?;

            let field_path = path.child(member);
            let field_type = self.node_type(&field_name, &field_path, node)?;

            write_doc_comment(&mut body, &node.doc().description, "    ")?;
            writeln!(body, "    #[serde(rename = {member:?})]")?;
            writeln!(body, "    pub {field}: {field_type},")?;
        }

        let mut out = String::new();
        writeln!(out, "/// `{ident}` is the struct type for {}.", path.describe())?;
        writeln!(out, "#[derive(Debug, Clone, Serialize, Deserialize)]")?;
        if body.is_empty() {
            writeln!(out, "pub struct {ident} {{}}")?;
        } else {
            writeln!(out, "pub struct {ident} {{")?;
            out.push_str(&body);
            writeln!(out, "}}")?;
        }
        self.fill(slot, out);
        Ok(ident)
    }

    pub(super) fn option_type(
        &mut self,
        name: &OptionName,
        path: &SourcePath,
        option: &SchemaOption,
    ) -> Result<String> {
        let tag = option.kind.tag();
        trace!(path = %path, name = %name.source, tag, "generating option type");
        if !registry::is_registered(tag) {
            return Err(CodegenError::UnreachableVariant { tag: tag.to_string() });
        }

        let ty = match &option.kind {
            OptionType::Str
            | OptionType::Path
            | OptionType::Package
            | OptionType::SeparatedString { .. } => "String".to_string(),
            OptionType::Int | OptionType::IntBetween => "i64".to_string(),
            OptionType::PositiveInt | OptionType::UnsignedInt => "u64".to_string(),
            OptionType::SignedInt8 => "i8".to_string(),
            OptionType::SignedInt16 => "i16".to_string(),
            OptionType::SignedInt32 => "i32".to_string(),
            OptionType::UnsignedInt8 => "u8".to_string(),
            OptionType::UnsignedInt16 => "u16".to_string(),
            OptionType::UnsignedInt32 => "u32".to_string(),
            OptionType::Bool => "bool".to_string(),
            OptionType::Float => "f64".to_string(),
            OptionType::Attrs => {
                self.deps.require("serde_json", &[]);
                "serde_json::Map<String, serde_json::Value>".to_string()
            }
            OptionType::Anything => {
                self.deps.require("serde_json", &[]);
                "serde_json::Value".to_string()
            }
            OptionType::Unspecified(_) => {
                self.deps.require("serde_json", &["raw_value"]);
                "Box<serde_json::value::RawValue>".to_string()
            }
            OptionType::Enum(values) => self.enum_type(name, path, values)?,
            OptionType::Unique(inner) => self.node_type(name, path, inner)?,
            OptionType::Either(_) if option.kind.is_number() => {
                self.deps.require("serde_json", &[]);
                "serde_json::Number".to_string()
            }
            OptionType::Either(alternatives) => self.either_type(name, path, alternatives)?,
            OptionType::NullOr(inner) => format!("Option<{}>", self.node_type(name, path, inner)?),
            OptionType::ListOf(inner) => format!("Vec<{}>", self.node_type(name, path, inner)?),
            OptionType::AttrsOf(inner) => {
                self.imports.btree_map = true;
                format!("BTreeMap<String, {}>", self.node_type(name, path, inner)?)
            }
            OptionType::Submodule(module) => self.module_type(name, path, module)?,
        };
        Ok(ty)
    }

    /// A string newtype plus one constant per allowed value.
    fn enum_type(&mut self, name: &OptionName, path: &SourcePath, values: &[String]) -> Result<String> {
        let ident = name.type_ident();
        debug!(path = %path, name = %name.source, values = values.len(), "generating enum type");
        self.types.claim(&ident, path.to_string())?;
        self.imports.cow = true;

        let mut out = String::new();
        writeln!(out, "/// `{ident}` is the enum type for {}.", path.describe())?;
        writeln!(out, "#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]")?;
        writeln!(out, "#[serde(transparent)]")?;
        writeln!(out, "pub struct {ident}(pub Cow<'static, str>);")?;
        for value in values {
            let constant = format!("{ident}{}", parse_name(value, self.rules).target);
            self.types.claim(&constant, format!("{path} = {value:?}"))?;
            writeln!(out)?;
            writeln!(out, "#[allow(non_upper_case_globals)]")?;
            writeln!(out, "pub const {constant}: {ident} = {ident}(Cow::Borrowed({value:?}));")?;
        }
        self.push(out);
        Ok(ident)
    }
}

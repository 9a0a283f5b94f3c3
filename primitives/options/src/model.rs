//! Option data model
//!
//! A decoded module is a tree of [`Node`]s. Each node is either a nested
//! [`Module`] (a plain attribute set of members) or a tagged [`SchemaOption`]
//! leaf carrying its [`OptionDoc`] and an [`OptionType`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;

/// Documentation extracted from an option declaration.
///
/// Every field is optional on the wire; absent fields decode to their zero
/// value and zero values are omitted again on encode.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptionDoc {
    /// Example value
    pub example: Option<Value>,
    /// Default value
    pub default: Option<Value>,
    /// Human-readable override for the rendered default
    pub default_text: String,
    /// Free-form description
    pub description: String,
    /// Description class hint
    pub description_class: String,
    /// Whether the option is shown in documentation
    pub visible: bool,
    /// Whether the option is internal
    pub internal: bool,
    /// Whether the option is read-only
    pub read_only: bool,
}

static EMPTY_DOC: OptionDoc = OptionDoc {
    example: None,
    default: None,
    default_text: String::new(),
    description: String::new(),
    description_class: String::new(),
    visible: false,
    internal: false,
    read_only: false,
};

impl OptionDoc {
    /// Documentation with only a description set.
    pub fn described(description: impl Into<String>) -> Self {
        Self { description: description.into(), ..Self::default() }
    }

    /// Returns true when every field holds its zero value.
    pub fn is_empty(&self) -> bool { self == &EMPTY_DOC }
}

/// Verbatim JSON bytes captured from the wire.
///
/// Used by [`OptionType::Unspecified`] so that unknown option kinds are
/// re-emitted byte for byte.
#[derive(Debug, Clone)]
pub struct RawJson(Box<RawValue>);

impl RawJson {
    /// Capture `json` after checking that it is well-formed.
    pub fn from_string(json: String) -> Result<Self, serde_json::Error> {
        RawValue::from_string(json).map(Self)
    }

    /// The captured bytes.
    pub fn get(&self) -> &str { self.0.get() }
}

impl From<Box<RawValue>> for RawJson {
    fn from(raw: Box<RawValue>) -> Self { Self(raw) }
}

impl PartialEq for RawJson {
    fn eq(&self, other: &Self) -> bool { self.get() == other.get() }
}

impl Serialize for RawJson {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// The closed set of option kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionType {
    /// `types.str`
    Str,
    /// `types.int`
    Int,
    /// `types.ints.between`
    IntBetween,
    /// `types.ints.positive`
    PositiveInt,
    /// `types.ints.s8`
    SignedInt8,
    /// `types.ints.s16`
    SignedInt16,
    /// `types.ints.s32`
    SignedInt32,
    /// `types.ints.u8`
    UnsignedInt8,
    /// `types.ints.u16`
    UnsignedInt16,
    /// `types.ints.u32`
    UnsignedInt32,
    /// `types.ints.unsigned`
    UnsignedInt,
    /// `types.path`
    Path,
    /// `types.package`, a derivation reference rendered as a string
    Package,
    /// `types.bool`
    Bool,
    /// `types.float`
    Float,
    /// `types.attrs`, an attribute set without a declared value type
    Attrs,
    /// `types.anything`
    Anything,
    /// Any kind missing from the registry, kept as the original wire object.
    Unspecified(RawJson),
    /// `types.enum`: the closed list of allowed strings
    Enum(Vec<String>),
    /// `types.separatedString` and friends (`lines`, `commas`, ...)
    SeparatedString {
        /// Separator placed between merged definitions
        separator: String,
    },
    /// `types.unique`: semantically the wrapped type
    Unique(Box<Node>),
    /// `types.either` / `types.oneOf`, alternatives in declaration order
    Either(Vec<Node>),
    /// `types.nullOr`
    NullOr(Box<Node>),
    /// `types.listOf`
    ListOf(Box<Node>),
    /// `types.attrsOf`
    AttrsOf(Box<Node>),
    /// `types.submodule`
    Submodule(Module),
}

impl OptionType {
    /// The wire tag (`_type`) for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            OptionType::Str => "str",
            OptionType::Int => "int",
            OptionType::IntBetween => "intBetween",
            OptionType::PositiveInt => "positiveInt",
            OptionType::SignedInt8 => "signedInt8",
            OptionType::SignedInt16 => "signedInt16",
            OptionType::SignedInt32 => "signedInt32",
            OptionType::UnsignedInt8 => "unsignedInt8",
            OptionType::UnsignedInt16 => "unsignedInt16",
            OptionType::UnsignedInt32 => "unsignedInt32",
            OptionType::UnsignedInt => "unsignedInt",
            OptionType::Path => "path",
            OptionType::Package => "package",
            OptionType::Bool => "bool",
            OptionType::Float => "float",
            OptionType::Attrs => "attrs",
            OptionType::Anything => "anything",
            OptionType::Unspecified(_) => "unspecified",
            OptionType::Enum(_) => "enum",
            OptionType::SeparatedString { .. } => "separatedString",
            OptionType::Unique(_) => "unique",
            OptionType::Either(_) => "either",
            OptionType::NullOr(_) => "nullOr",
            OptionType::ListOf(_) => "listOf",
            OptionType::AttrsOf(_) => "attrsOf",
            OptionType::Submodule(_) => "submodule",
        }
    }

    /// `unique(inner)`
    pub fn unique(inner: impl Into<Node>) -> Self { OptionType::Unique(Box::new(inner.into())) }

    /// `nullOr(inner)`
    pub fn null_or(inner: impl Into<Node>) -> Self { OptionType::NullOr(Box::new(inner.into())) }

    /// `listOf(inner)`
    pub fn list_of(inner: impl Into<Node>) -> Self { OptionType::ListOf(Box::new(inner.into())) }

    /// `attrsOf(inner)`
    pub fn attrs_of(inner: impl Into<Node>) -> Self { OptionType::AttrsOf(Box::new(inner.into())) }

    /// `either(alternatives...)`
    pub fn either<I, N>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        OptionType::Either(alternatives.into_iter().map(Into::into).collect())
    }

    /// `enum [values...]`
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OptionType::Enum(values.into_iter().map(Into::into).collect())
    }

    /// True for the `either [int float]` shape produced by `types.number`.
    pub fn is_number(&self) -> bool {
        match self {
            OptionType::Either(alternatives) => matches!(
                alternatives.as_slice(),
                [Node::Option(a), Node::Option(b)]
                    if a.kind == OptionType::Int && b.kind == OptionType::Float
            ),
            _ => false,
        }
    }
}

/// A tagged option leaf: documentation plus kind.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaOption {
    /// Documentation fields
    pub doc: OptionDoc,
    /// Kind and kind-specific payload
    pub kind: OptionType,
}

impl SchemaOption {
    /// An undocumented option of `kind`.
    pub fn new(kind: OptionType) -> Self { Self { doc: OptionDoc::default(), kind } }

    /// Replace the documentation.
    pub fn with_doc(mut self, doc: OptionDoc) -> Self {
        self.doc = doc;
        self
    }

    /// Set the description.
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.doc.description = description.into();
        self
    }
}

impl From<OptionType> for SchemaOption {
    fn from(kind: OptionType) -> Self { SchemaOption::new(kind) }
}

/// Anything that may appear where an option is expected.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An untagged attribute set of further members
    Module(Module),
    /// A tagged option
    Option(SchemaOption),
}

impl Node {
    /// The wire tag, empty for modules.
    pub fn tag(&self) -> &'static str {
        match self {
            Node::Module(_) => "",
            Node::Option(option) => option.kind.tag(),
        }
    }

    /// The documentation, empty for modules.
    pub fn doc(&self) -> &OptionDoc {
        match self {
            Node::Module(_) => &EMPTY_DOC,
            Node::Option(option) => &option.doc,
        }
    }

    /// The option, if this node is one.
    pub fn as_option(&self) -> Option<&SchemaOption> {
        match self {
            Node::Option(option) => Some(option),
            Node::Module(_) => None,
        }
    }
}

impl From<Module> for Node {
    fn from(module: Module) -> Self { Node::Module(module) }
}

impl From<SchemaOption> for Node {
    fn from(option: SchemaOption) -> Self { Node::Option(option) }
}

impl From<OptionType> for Node {
    fn from(kind: OptionType) -> Self { Node::Option(SchemaOption::new(kind)) }
}

/// A module: member name to node, names unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    members: BTreeMap<String, Node>,
}

impl Module {
    /// An empty module.
    pub fn new() -> Self { Self::default() }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, node: impl Into<Node>) -> Self {
        self.insert(name, node);
        self
    }

    /// Insert or replace a member, returning the previous node.
    pub fn insert(&mut self, name: impl Into<String>, node: impl Into<Node>) -> Option<Node> {
        self.members.insert(name.into(), node.into())
    }

    /// Look up a direct member.
    pub fn get(&self, name: &str) -> Option<&Node> { self.members.get(name) }

    /// Members in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.members.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Member names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> { self.members.keys().map(String::as_str) }

    /// Number of members.
    pub fn len(&self) -> usize { self.members.len() }

    /// True when there are no members.
    pub fn is_empty(&self) -> bool { self.members.is_empty() }
}

impl<K: Into<String>, N: Into<Node>> FromIterator<(K, N)> for Module {
    fn from_iter<I: IntoIterator<Item = (K, N)>>(iter: I) -> Self {
        Self { members: iter.into_iter().map(|(k, n)| (k.into(), n.into())).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_doc_is_empty() {
        let node = Node::Module(Module::new());
        assert!(node.doc().is_empty());
        assert_eq!(node.tag(), "");
    }

    #[test]
    fn test_is_number() {
        assert!(OptionType::either([OptionType::Int, OptionType::Float]).is_number());
        assert!(!OptionType::either([OptionType::Float, OptionType::Int]).is_number());
        assert!(!OptionType::either([OptionType::Int, OptionType::Float, OptionType::Str])
            .is_number());
        assert!(!OptionType::Int.is_number());
    }

    #[test]
    fn test_raw_json_compares_bytes() {
        let a = RawJson::from_string(r#"{"a": 1}"#.to_string()).expect("valid json");
        let b = RawJson::from_string(r#"{"a":1}"#.to_string()).expect("valid json");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}

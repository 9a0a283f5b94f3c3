//! Wire codec
//!
//! Decoding walks the raw JSON lazily: every value is first captured as a
//! [`RawValue`] so that unknown option kinds can keep their exact bytes.
//!
//! Encoding is split in two layers. [`payload_fields`] renders the
//! kind-specific fields of an option without any tag, and the
//! [`Serialize`] impl of [`SchemaOption`] adds `_option`/`_type` exactly once.
//! Nested options inside a payload go back through that impl, so the generic
//! entry point can be re-entered at any depth.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::Value;
use tracing::{debug, trace};

use crate::model::{Module, Node, OptionDoc, OptionType, RawJson, SchemaOption};
use crate::{registry, CodecError, Result};

/// Dotted location of a value inside the wire document, used in errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WirePath(Vec<String>);

impl WirePath {
    /// The document root.
    pub fn root() -> Self { Self::default() }

    /// This path extended by one segment.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }
}

impl fmt::Display for WirePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0.join("."))
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "_option", default)]
    option: bool,
    #[serde(rename = "_type", default)]
    tag: Option<String>,
}

/// Decode a full module dump.
pub fn decode(bytes: &[u8]) -> Result<Module> {
    let raw: Box<RawValue> = serde_json::from_slice(bytes)?;
    read_module(&raw, &WirePath::root())
}

/// Decode any single node: a tagged option or an untagged module.
pub fn decode_node(bytes: &[u8]) -> Result<Node> {
    let raw: Box<RawValue> = serde_json::from_slice(bytes)?;
    read_node(&raw, &WirePath::root())
}

/// Encode a module in compact form.
pub fn encode(module: &Module) -> Result<Vec<u8>> { Ok(serde_json::to_vec(module)?) }

/// Encode a module with two-space indentation.
pub fn encode_pretty(module: &Module) -> Result<Vec<u8>> { Ok(serde_json::to_vec_pretty(module)?) }

/// Encode any single node.
pub fn encode_node(node: &Node) -> Result<Vec<u8>> { Ok(serde_json::to_vec(node)?) }

fn ensure_object(raw: &RawValue, path: &WirePath) -> Result<()> {
    if raw.get().trim_start().starts_with('{') {
        Ok(())
    } else {
        Err(CodecError::NotAnObject { path: path.to_string() })
    }
}

fn parse_at<'a, T: Deserialize<'a>>(raw: &'a RawValue, path: &WirePath) -> Result<T> {
    serde_json::from_str(raw.get())
        .map_err(|source| CodecError::Shape { path: path.to_string(), source })
}

fn read_module(raw: &RawValue, path: &WirePath) -> Result<Module> {
    ensure_object(raw, path)?;
    let members: BTreeMap<String, &RawValue> = parse_at(raw, path)?;
    members
        .into_iter()
        .map(|(name, value)| {
            let node = read_node(value, &path.child(&name))?;
            Ok((name, node))
        })
        .collect()
}

fn read_node(raw: &RawValue, path: &WirePath) -> Result<Node> {
    ensure_object(raw, path)?;
    let envelope: Envelope = parse_at(raw, path)?;
    if !envelope.option {
        return read_module(raw, path).map(Node::Module);
    }

    let tag = envelope.tag.unwrap_or_default();
    trace!(path = %path, tag = %tag, "decoding option");

    let Some(decode) = registry::decoder(&tag) else {
        debug!(path = %path, tag = %tag, "unregistered option kind kept as unspecified");
        let doc: OptionDoc = serde_json::from_str(raw.get()).unwrap_or_default();
        let kind = OptionType::Unspecified(RawJson::from(raw.to_owned()));
        return Ok(Node::Option(SchemaOption { doc, kind }));
    };

    let wire = WireObject::parse(raw, &tag, path)?;
    let kind = decode(&wire)?;
    if kind.tag() != tag {
        return Err(CodecError::UnreachableVariant { tag });
    }
    let doc: OptionDoc = parse_at(raw, path)?;
    Ok(Node::Option(SchemaOption { doc, kind }))
}

/// A tagged wire object, split into its top-level fields.
pub(crate) struct WireObject<'a> {
    raw: &'a RawValue,
    tag: &'a str,
    path: &'a WirePath,
    fields: BTreeMap<String, &'a RawValue>,
}

impl<'a> WireObject<'a> {
    fn parse(raw: &'a RawValue, tag: &'a str, path: &'a WirePath) -> Result<Self> {
        let fields = parse_at(raw, path)?;
        Ok(Self { raw, tag, path, fields })
    }

    /// The whole object, byte for byte.
    pub(crate) fn capture(&self) -> RawJson { RawJson::from(self.raw.to_owned()) }

    fn required(&self, field: &'static str) -> Result<&'a RawValue> {
        self.fields.get(field).copied().ok_or_else(|| CodecError::MissingField {
            path: self.path.to_string(),
            tag: self.tag.to_string(),
            field,
        })
    }

    /// A plain payload field.
    pub(crate) fn field<T: DeserializeOwned>(&self, field: &'static str) -> Result<T> {
        let raw = self.required(field)?;
        parse_at(raw, &self.path.child(field))
    }

    /// A payload field holding one nested node.
    pub(crate) fn node(&self, field: &'static str) -> Result<Node> {
        read_node(self.required(field)?, &self.path.child(field))
    }

    /// A payload field holding an ordered list of nested nodes.
    pub(crate) fn nodes(&self, field: &'static str) -> Result<Vec<Node>> {
        let path = self.path.child(field);
        let items: Vec<&RawValue> = parse_at(self.required(field)?, &path)?;
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| read_node(item, &path.child(&index.to_string())))
            .collect()
    }

    /// A payload field holding a nested module.
    pub(crate) fn module(&self, field: &'static str) -> Result<Module> {
        read_module(self.required(field)?, &self.path.child(field))
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Field<'a> {
    Json(&'a Value),
    Text(&'a str),
    Flag(bool),
    Texts(&'a [String]),
    Node(&'a Node),
    Nodes(&'a [Node]),
    Module(&'a Module),
}

fn doc_fields(doc: &OptionDoc) -> Vec<(&'static str, Field<'_>)> {
    let mut fields = Vec::new();
    if let Some(example) = doc.example.as_ref().filter(|v| !v.is_null()) {
        fields.push(("example", Field::Json(example)));
    }
    if let Some(default) = doc.default.as_ref().filter(|v| !v.is_null()) {
        fields.push(("default", Field::Json(default)));
    }
    for (key, text) in [
        ("defaultText", &doc.default_text),
        ("description", &doc.description),
        ("descriptionClass", &doc.description_class),
    ] {
        if !text.is_empty() {
            fields.push((key, Field::Text(text)));
        }
    }
    for (key, flag) in [("visible", doc.visible), ("internal", doc.internal), ("readOnly", doc.read_only)]
    {
        if flag {
            fields.push((key, Field::Flag(flag)));
        }
    }
    fields
}

/// Kind-specific fields of an option, without the tag.
fn payload_fields(kind: &OptionType) -> Vec<(&'static str, Field<'_>)> {
    match kind {
        OptionType::Enum(values) => vec![("enum", Field::Texts(values))],
        OptionType::SeparatedString { separator } => vec![("separator", Field::Text(separator))],
        OptionType::Unique(inner) => vec![("unique", Field::Node(inner))],
        OptionType::Either(alternatives) => vec![("either", Field::Nodes(alternatives))],
        OptionType::NullOr(inner) => vec![("nullOr", Field::Node(inner))],
        OptionType::ListOf(inner) => vec![("listOf", Field::Node(inner))],
        OptionType::AttrsOf(inner) => vec![("attrsOf", Field::Node(inner))],
        OptionType::Submodule(module) => vec![("submodule", Field::Module(module))],
        _ => Vec::new(),
    }
}

impl Serialize for SchemaOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        // The captured object already holds its own tag and doc.
        if let OptionType::Unspecified(raw) = &self.kind {
            return raw.serialize(serializer);
        }

        let tag = self.kind.tag();
        if !registry::is_registered(tag) {
            return Err(S::Error::custom(CodecError::UnreachableVariant { tag: tag.to_string() }));
        }

        let mut fields = doc_fields(&self.doc);
        fields.extend(payload_fields(&self.kind));
        fields.sort_by_key(|(key, _)| *key);

        let mut map = serializer.serialize_map(Some(fields.len() + 2))?;
        map.serialize_entry("_option", &true)?;
        map.serialize_entry("_type", tag)?;
        for (key, value) in &fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Node::Module(module) => module.serialize(serializer),
            Node::Option(option) => option.serialize(serializer),
        }
    }
}

impl Serialize for Module {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, node) in self.iter() {
            map.serialize_entry(name, node)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_path_display() {
        assert_eq!(WirePath::root().to_string(), "<root>");
        assert_eq!(WirePath::root().child("services").child("nginx").to_string(), "services.nginx");
    }

    #[test]
    fn test_tagged_keys_come_first_then_sorted() {
        let option = SchemaOption::new(OptionType::list_of(OptionType::Str))
            .with_doc(OptionDoc { read_only: true, ..OptionDoc::described("Items.") });
        let json = String::from_utf8(encode_node(&Node::Option(option)).expect("encodes"))
            .expect("utf-8");
        assert_eq!(
            json,
            r#"{"_option":true,"_type":"listOf","description":"Items.","listOf":{"_option":true,"_type":"str"},"readOnly":true}"#
        );
    }

    #[test]
    fn test_missing_payload_field_is_an_error() {
        let err = decode(br#"{"mode":{"_option":true,"_type":"enum"}}"#)
            .expect_err("enum without values must fail");
        match err {
            CodecError::MissingField { path, tag, field } => {
                assert_eq!(path, "mode");
                assert_eq!(tag, "enum");
                assert_eq!(field, "enum");
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
    }
}

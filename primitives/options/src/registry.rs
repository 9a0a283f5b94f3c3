//! Wire vocabulary
//!
//! The registry is the single source of truth for which `_type` tags the
//! codec understands. Each entry maps a tag to the function that builds the
//! matching [`OptionType`] from a tagged wire object. Tags missing from this
//! table decode as [`OptionType::Unspecified`].

use crate::codec::WireObject;
use crate::model::OptionType;
use crate::Result;

/// Builds one variant from its wire object.
pub(crate) type DecodeFn = fn(&WireObject<'_>) -> Result<OptionType>;

static REGISTRY: &[(&str, DecodeFn)] = &[
    ("str", |_| Ok(OptionType::Str)),
    ("int", |_| Ok(OptionType::Int)),
    ("intBetween", |_| Ok(OptionType::IntBetween)),
    ("positiveInt", |_| Ok(OptionType::PositiveInt)),
    ("signedInt8", |_| Ok(OptionType::SignedInt8)),
    ("signedInt16", |_| Ok(OptionType::SignedInt16)),
    ("signedInt32", |_| Ok(OptionType::SignedInt32)),
    ("unsignedInt8", |_| Ok(OptionType::UnsignedInt8)),
    ("unsignedInt16", |_| Ok(OptionType::UnsignedInt16)),
    ("unsignedInt32", |_| Ok(OptionType::UnsignedInt32)),
    ("unsignedInt", |_| Ok(OptionType::UnsignedInt)),
    ("path", |_| Ok(OptionType::Path)),
    ("package", |_| Ok(OptionType::Package)),
    ("bool", |_| Ok(OptionType::Bool)),
    ("float", |_| Ok(OptionType::Float)),
    ("attrs", |_| Ok(OptionType::Attrs)),
    ("anything", |_| Ok(OptionType::Anything)),
    ("unspecified", |wire| Ok(OptionType::Unspecified(wire.capture()))),
    ("enum", |wire| Ok(OptionType::Enum(wire.field("enum")?))),
    ("separatedString", |wire| {
        Ok(OptionType::SeparatedString { separator: wire.field("separator")? })
    }),
    ("unique", |wire| Ok(OptionType::Unique(Box::new(wire.node("unique")?)))),
    ("either", |wire| Ok(OptionType::Either(wire.nodes("either")?))),
    ("nullOr", |wire| Ok(OptionType::NullOr(Box::new(wire.node("nullOr")?)))),
    ("listOf", |wire| Ok(OptionType::ListOf(Box::new(wire.node("listOf")?)))),
    ("attrsOf", |wire| Ok(OptionType::AttrsOf(Box::new(wire.node("attrsOf")?)))),
    ("submodule", |wire| Ok(OptionType::Submodule(wire.module("submodule")?))),
];

/// The decoder registered for `tag`.
pub(crate) fn decoder(tag: &str) -> Option<DecodeFn> {
    REGISTRY.iter().find(|(known, _)| *known == tag).map(|(_, decode)| *decode)
}

/// Returns true if `tag` is part of the closed vocabulary.
pub fn is_registered(tag: &str) -> bool { decoder(tag).is_some() }

/// All registered tags, in registry order.
pub fn tags() -> impl Iterator<Item = &'static str> { REGISTRY.iter().map(|(tag, _)| *tag) }

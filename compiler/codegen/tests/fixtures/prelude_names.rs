// Code generated by modgen. DO NOT EDIT.
// Package `config`.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// `Config` is the struct type for the root module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "d")]
    pub d: D,
    #[serde(rename = "from")]
    pub from: From,
    #[serde(rename = "ok")]
    pub ok: Ok,
}

/// `D` describes the `either` type for `d`.
///
/// Deserialization tries each alternative in declaration order.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum D {
    /// A `str` value.
    Str(DStr),
    /// A `int` value.
    Int(DInt),
}

impl ::core::convert::From<DStr> for D {
    fn from(value: DStr) -> Self {
        Self::Str(value)
    }
}

impl ::core::convert::From<DInt> for D {
    fn from(value: DInt) -> Self {
        Self::Int(value)
    }
}

impl<'de> Deserialize<'de> for D {
    fn deserialize<__D>(deserializer: __D) -> ::core::result::Result<Self, __D::Error>
    where
        __D: serde::Deserializer<'de>,
    {
        let raw = ::std::boxed::Box::<serde_json::value::RawValue>::deserialize(deserializer)?;
        if let ::core::result::Result::Ok(value) = serde_json::from_str::<DStr>(raw.get()) {
            return ::core::result::Result::Ok(Self::Str(value));
        }
        if let ::core::result::Result::Ok(value) = serde_json::from_str::<DInt>(raw.get()) {
            return ::core::result::Result::Ok(Self::Int(value));
        }
        ::core::result::Result::Err(serde::de::Error::custom("no alternative matched `D`"))
    }
}

/// `DStr` is one of the types that satisfy [`D`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DStr(pub String);

/// `DInt` is one of the types that satisfy [`D`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DInt(pub i64);

/// `From` is the struct type for `from`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct From {
    #[serde(rename = "x")]
    pub x: String,
}

/// `Ok` is the enum type for `ok`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ok(pub Cow<'static, str>);

#[allow(non_upper_case_globals)]
pub const OkYes: Ok = Ok(Cow::Borrowed("yes"));

#[allow(non_upper_case_globals)]
pub const OkNo: Ok = Ok(Cow::Borrowed("no"));

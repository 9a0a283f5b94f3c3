//! Identifier conversion for generated code.
//!
//! Option names arrive in whatever convention the module author picked
//! (`enable`, `listen-address`, `extra_config`, `openFirewall`). Everything
//! is first rendered as an exported PascalCase name ([`parse_name`]); the
//! Rust field and type identifiers are derived from that rendering.

use std::collections::{BTreeMap, BTreeSet};

/// Caller-supplied naming rules for one generation run.
///
/// The configuration is read-only during generation, so independent runs can
/// each hold their own copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingConfig {
    /// Words rendered fully upper-case, matched case-insensitively
    pub initialisms: BTreeSet<String>,
    /// Substring replacements applied to every rendered name, in key order
    pub overrides: BTreeMap<String, String>,
}

impl NamingConfig {
    /// Rules with the given initialisms and no overrides.
    pub fn with_initialisms<I, S>(initialisms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            initialisms: initialisms.into_iter().map(|s| s.as_ref().to_lowercase()).collect(),
            overrides: BTreeMap::new(),
        }
    }

    /// Add one override.
    pub fn with_override(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.overrides.insert(from.into(), to.into());
        self
    }

    fn is_initialism(&self, word: &str) -> bool {
        self.initialisms.iter().any(|known| known.eq_ignore_ascii_case(word))
    }
}

/// A source name paired with its exported rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionName {
    /// Name as written in the module
    pub source: String,
    /// Exported PascalCase identifier
    pub target: String,
}

impl OptionName {
    /// A name whose rendering was computed elsewhere.
    pub fn derived(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self { source: source.into(), target: target.into() }
    }

    /// The same name with an unexported rendering.
    pub fn unexport(&self) -> Self {
        Self { source: self.source.clone(), target: unexport(&self.target) }
    }

    /// The rendering as a Rust field identifier.
    pub fn field_ident(&self) -> String { field_ident(&self.target) }

    /// The rendering as a Rust type identifier.
    pub fn type_ident(&self) -> String { type_ident(&self.target) }
}

/// Render `source` as an exported identifier.
///
/// Names containing `-` are read as kebab-case, all others as snake_case.
/// Words are further split at lower-to-upper camel humps and at any other
/// character that is not alphanumeric.
///
/// ```
/// use codegen::naming::{parse_name, NamingConfig};
///
/// let rules = NamingConfig::default();
/// assert_eq!(parse_name("listen-address", &rules).target, "ListenAddress");
/// assert_eq!(parse_name("openFirewall", &rules).target, "OpenFirewall");
/// ```
pub fn parse_name(source: &str, rules: &NamingConfig) -> OptionName {
    let separator = if source.contains('-') { '-' } else { '_' };

    let mut target = String::new();
    for part in source.split(separator) {
        for word in split_words(part) {
            if rules.is_initialism(&word) {
                target.push_str(&word.to_uppercase());
            } else {
                target.push_str(&capitalize(&word));
            }
        }
    }

    for (from, to) in &rules.overrides {
        if !from.is_empty() {
            target = target.replace(from.as_str(), to);
        }
    }

    if target.is_empty() {
        target.push_str("Unnamed");
    } else if target.starts_with(|c: char| c.is_ascii_digit()) {
        target.insert(0, '_');
    }

    OptionName { source: source.to_string(), target }
}

fn split_words(part: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for c in part.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev = None;
            continue;
        }
        if c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase()) && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
        prev = Some(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Capitalize the first letter of a string
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Lower the leading letter, or the whole leading acronym, of `identifier`.
///
/// `FooBar` becomes `fooBar` and `HTTPServer` becomes `httpServer`.
pub fn unexport(identifier: &str) -> String {
    let chars: Vec<char> = identifier.chars().collect();
    let run = chars.iter().take_while(|c| c.is_uppercase()).count();
    // Keep the last capital of an acronym when it starts the next word.
    let lower = if run > 1 && chars.get(run).is_some_and(|c| c.is_lowercase()) {
        run - 1
    } else {
        run.max(1).min(chars.len())
    };

    let mut out = String::with_capacity(identifier.len());
    for (i, c) in chars.iter().enumerate() {
        if i < lower {
            out.extend(c.to_lowercase());
        } else {
            out.push(*c);
        }
    }
    out
}

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be written as raw identifiers.
const NON_RAW_KEYWORDS: &[&str] = &["self", "super", "crate", "Self"];

/// Type names the generated code itself refers to.
const RESERVED_TYPES: &[&str] =
    &["Self", "Option", "Vec", "String", "Box", "BTreeMap", "Cow", "Result", "Serialize", "Deserialize"];

/// Convert an exported rendering to a snake_case field identifier.
///
/// Acronyms stay together (`FooBAR` becomes `foo_bar`, `HTTPServer` becomes
/// `http_server`) and keywords are escaped.
pub fn field_ident(target: &str) -> String {
    let chars: Vec<char> = target.chars().collect();
    let mut out = String::with_capacity(target.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    sanitize_keyword(out)
}

fn sanitize_keyword(ident: String) -> String {
    if NON_RAW_KEYWORDS.contains(&ident.as_str()) {
        format!("{ident}_")
    } else if RUST_KEYWORDS.contains(&ident.as_str()) {
        format!("r#{ident}")
    } else {
        ident
    }
}

/// Guard an exported rendering against names the generated file relies on.
pub fn type_ident(target: &str) -> String {
    if RESERVED_TYPES.contains(&target) {
        format!("{target}_")
    } else {
        target.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("openFirewall"), vec!["open", "Firewall"]);
        assert_eq!(split_words("a.b c"), vec!["a", "b", "c"]);
        assert_eq!(split_words("HTTPServer"), vec!["HTTPServer"]);
        assert!(split_words("").is_empty());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("hello"), "Hello");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_sanitize_keyword() {
        assert_eq!(sanitize_keyword("type".into()), "r#type");
        assert_eq!(sanitize_keyword("self".into()), "self_");
        assert_eq!(sanitize_keyword("port".into()), "port");
    }
}

//! Dotted-path lookup into a decoded module.

use crate::model::{Module, Node, OptionType, SchemaOption};

/// A borrowed view of whatever a path resolved to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    /// A plain module
    Module(&'a Module),
    /// A tagged option, possibly a submodule
    Option(&'a SchemaOption),
}

impl<'a> NodeRef<'a> {
    /// The members reachable below this node, for modules and submodules.
    pub fn as_module(&self) -> Option<&'a Module> {
        match *self {
            NodeRef::Module(module) => Some(module),
            NodeRef::Option(SchemaOption { kind: OptionType::Submodule(module), .. }) =>
                Some(module),
            NodeRef::Option(_) => None,
        }
    }

    /// The option, if this is one.
    pub fn as_option(&self) -> Option<&'a SchemaOption> {
        match *self {
            NodeRef::Option(option) => Some(option),
            NodeRef::Module(_) => None,
        }
    }
}

impl<'a> From<&'a Node> for NodeRef<'a> {
    fn from(node: &'a Node) -> Self {
        match node {
            Node::Module(module) => NodeRef::Module(module),
            Node::Option(option) => NodeRef::Option(option),
        }
    }
}

impl Module {
    /// Resolve `path` one member at a time.
    ///
    /// Nested modules and submodule options are descended into; any other
    /// option ends the walk, so a path continuing past it resolves to `None`.
    /// An empty path resolves to `self`.
    pub fn by_path<S: AsRef<str>>(&self, path: &[S]) -> Option<NodeRef<'_>> {
        let Some((first, rest)) = path.split_first() else {
            return Some(NodeRef::Module(self));
        };
        let node = self.get(first.as_ref())?;
        if rest.is_empty() {
            return Some(node.into());
        }
        match node {
            Node::Module(module) => module.by_path(rest),
            Node::Option(SchemaOption { kind: OptionType::Submodule(module), .. }) =>
                module.by_path(rest),
            Node::Option(_) => None,
        }
    }
}

/// Split a dotted path such as `services.nginx.enable`; `""` is the empty path.
pub fn parse_path(dotted: &str) -> Vec<&str> {
    if dotted.is_empty() {
        Vec::new()
    } else {
        dotted.split('.').collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path() {
        assert!(parse_path("").is_empty());
        assert_eq!(parse_path("services.nginx.enable"), vec!["services", "nginx", "enable"]);
    }
}

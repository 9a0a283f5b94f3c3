//! Canonical member ordering.
//!
//! `enable` comes first, then `package`, then everything else by name. The
//! code generator applies this at every module level it visits, so nested
//! types come out in the same order.

use std::cmp::Ordering;

use crate::model::{Module, Node};

/// The members of `module` in canonical order.
pub fn sort_module(module: &Module) -> Vec<(&str, &Node)> {
    let mut sorted: Vec<(&str, &Node)> = module.iter().collect();
    sorted.sort_by(|(a, _), (b, _)| {
        sort_first(a, b, "enable")
            .then_with(|| sort_first(a, b, "package"))
            .then_with(|| a.cmp(b))
    });
    sorted
}

fn sort_first(a: &str, b: &str, value: &str) -> Ordering {
    match (a == value, b == value) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

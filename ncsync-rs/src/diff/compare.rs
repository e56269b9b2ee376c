//! Shallow node comparison.
//!
//! [`compare`] is the matching primitive the whole engine is built on. It
//! looks at a pair of nodes without descending into non-key content, and
//! answers one of three things:
//!
//! - [`Comparison::Different`]: the nodes do not denote the same object at
//!   all (name, namespace, kind, or list keys disagree),
//! - [`Comparison::Equal`]: same object, and nothing shallow distinguishes
//!   the two sides,
//! - [`Comparison::Changed`]: same object, but the two sides disagree in a
//!   way visible at this level (leaf value, or the set of child identities).
//!
//! Differences buried deeper than one level are intentionally not detected
//! here; the diff engine finds those by recursing through `Equal` pairs and
//! reports them at the depth where they actually occur.

use rustc_hash::FxHashMap;

use crate::node::{Node, NodeKind};

/// Result of a shallow comparison of two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Not the same object; never match these two.
    Different,
    /// Same object, no shallow difference.
    Equal,
    /// Same object, shallow difference present.
    Changed,
}

/// Shallowly compares two nodes. See the module docs for the contract.
pub fn compare(a: &Node, b: &Node) -> Comparison {
    if !a.identity_eq(b) {
        return Comparison::Different;
    }
    match (a.kind(), b.kind()) {
        (NodeKind::Leaf, NodeKind::Leaf) => {
            if a.value() == b.value() {
                Comparison::Equal
            } else {
                Comparison::Changed
            }
        }
        (NodeKind::Container(_), NodeKind::Container(_)) => child_identity_scan(a, b),
        (NodeKind::ListEntry(_), NodeKind::ListEntry(_)) => {
            if !keys_match(a, b) {
                return Comparison::Different;
            }
            child_identity_scan(a, b)
        }
        // Same name but different kinds: trees built against incompatible
        // schemas. Treat as distinct objects rather than guessing.
        _ => Comparison::Different,
    }
}

/// True when both nodes are list entries naming the same entry: same
/// identity and equal values on every key child.
pub fn key_compare(a: &Node, b: &Node) -> bool {
    a.identity_eq(b) && a.is_list_entry() && b.is_list_entry() && keys_match(a, b)
}

/// Equal values on every key child declared by `a`'s schema. A key child
/// missing on either side fails the match.
fn keys_match(a: &Node, b: &Node) -> bool {
    let keys = a.key_names().unwrap_or(&[]);
    keys.iter().all(|k| match (a.child(k), b.child(k)) {
        (Some(x), Some(y)) => x.value() == y.value(),
        _ => false,
    })
}

/// Compares the two child sequences as multisets of (namespace, name)
/// identities. Values and deeper structure are ignored.
fn child_identity_scan(a: &Node, b: &Node) -> Comparison {
    let mut counts: FxHashMap<(&str, &str), i64> = FxHashMap::default();
    if let Some(children) = a.children() {
        for c in children {
            *counts.entry((c.namespace(), c.name())).or_default() += 1;
        }
    }
    if let Some(children) = b.children() {
        for c in children {
            *counts.entry((c.namespace(), c.name())).or_default() -= 1;
        }
    }
    if counts.values().all(|&n| n == 0) {
        Comparison::Equal
    } else {
        Comparison::Changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ContainerSchema, ListSchema, Value};
    use std::rc::Rc;

    const NS: &str = "urn:test";

    fn leaf(name: &str, value: &str) -> Node {
        Node::leaf(NS, name, Value::Str(value.to_string()))
    }

    fn container(name: &str) -> Node {
        Node::container(NS, name, Rc::new(ContainerSchema::new(vec![])))
    }

    fn host(name: &str) -> Node {
        let schema = Rc::new(ListSchema::new(vec!["name".into(), "addr".into()], 1));
        Node::list_entry(NS, "host", schema).with_child(leaf("name", name))
    }

    #[test]
    fn test_leaf_compare() {
        assert_eq!(compare(&leaf("a", "1"), &leaf("a", "1")), Comparison::Equal);
        assert_eq!(
            compare(&leaf("a", "1"), &leaf("a", "2")),
            Comparison::Changed
        );
        assert_eq!(
            compare(&leaf("a", "1"), &leaf("b", "1")),
            Comparison::Different
        );
    }

    #[test]
    fn test_namespace_mismatch_is_different() {
        let a = Node::leaf(NS, "mtu", Value::UInt64(1500));
        let b = Node::leaf("urn:other", "mtu", Value::UInt64(1500));
        assert_eq!(compare(&a, &b), Comparison::Different);
    }

    #[test]
    fn test_kind_mismatch_is_different() {
        assert_eq!(
            compare(&leaf("x", "1"), &container("x")),
            Comparison::Different
        );
    }

    #[test]
    fn test_container_child_identity_scan() {
        let a = container("ifc").with_child(leaf("mtu", "1500"));
        let b = container("ifc").with_child(leaf("mtu", "9000"));
        // Value differences below this level are not shallow differences.
        assert_eq!(compare(&a, &b), Comparison::Equal);

        let c = container("ifc")
            .with_child(leaf("mtu", "1500"))
            .with_child(leaf("speed", "10g"));
        assert_eq!(compare(&a, &c), Comparison::Changed);
    }

    #[test]
    fn test_absent_and_empty_children_equal() {
        let a = container("ifc");
        let mut b = container("ifc");
        b.ensure_children();
        assert_eq!(compare(&a, &b), Comparison::Equal);
    }

    #[test]
    fn test_list_entry_keys() {
        assert_eq!(compare(&host("alpha"), &host("alpha")), Comparison::Equal);
        assert_eq!(
            compare(&host("alpha"), &host("beta")),
            Comparison::Different
        );

        // Same key, extra non-key child: still the same entry.
        let b = host("alpha").with_child(leaf("addr", "10.0.0.1"));
        assert_eq!(compare(&host("alpha"), &b), Comparison::Changed);
    }

    #[test]
    fn test_missing_key_is_different() {
        let schema = Rc::new(ListSchema::new(vec!["name".into()], 1));
        let no_key = Node::list_entry(NS, "host", schema);
        assert_eq!(compare(&host("alpha"), &no_key), Comparison::Different);
    }

    #[test]
    fn test_key_compare() {
        assert!(key_compare(&host("alpha"), &host("alpha")));
        assert!(!key_compare(&host("alpha"), &host("beta")));
        assert!(!key_compare(&container("host"), &container("host")));
    }
}

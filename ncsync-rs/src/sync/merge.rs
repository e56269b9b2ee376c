//! Merge-based patch construction.
//!
//! [`sync_merge`] starts from a full copy of the desired state B and prunes
//! away everything the device state A already has, leaving the minimal tree
//! that merges cleanly. Content present in A but absent from B is appended
//! as `delete` marks: leaves are carried with their value, containers and
//! list entries as shallow clones so a delete names its target by keys
//! alone.

use crate::diff::{compare, key_compare, Comparison};
use crate::node::{Node, NodeKind, NodeSeq, Operation};

use super::wrap_forest;

/// Builds the merge-based patch that takes a device from state `a` to
/// state `b`. A patch with no children and no operation mark means the
/// trees are in sync.
///
/// If the roots do not match at all, the whole of `b` marked `replace` is
/// the patch. Leaf roots with differing values come back marked `merge`.
pub fn sync_merge(a: &Node, b: &Node) -> Node {
    let mut patch = b.clone();
    match compare(a, b) {
        Comparison::Different => {
            patch.set_operation(Operation::Replace);
            return patch;
        }
        Comparison::Changed if b.is_leaf() => {
            patch.set_operation(Operation::Merge);
            return patch;
        }
        _ => {}
    }
    let mut pool = a.clone();
    reconcile(&mut pool, &mut patch);
    patch
}

/// [`sync_merge`] over two forests, as if each were rooted under a common
/// synthetic parent. Returns the patch subtrees; empty means in sync.
pub fn sync_merge_many(a: &[Node], b: &[Node]) -> Vec<Node> {
    let wrapped_a = wrap_forest(a.to_vec());
    let wrapped_b = wrap_forest(b.to_vec());
    let mut patch = sync_merge(&wrapped_a, &wrapped_b);
    patch
        .take_children()
        .map(NodeSeq::into_vec)
        .unwrap_or_default()
}

/// Prunes `b`'s children against `a`'s and appends deletes for what only
/// `a` has. Returns the number of differences found in this subtree.
///
/// `a` is scratch space: its children are consumed as they are matched.
fn reconcile(a: &mut Node, b: &mut Node) -> usize {
    let mut diffs = 0;
    let keys: Vec<String> = b.key_names().map(<[String]>::to_vec).unwrap_or_default();
    let is_key = |n: &Node| n.is_leaf() && keys.iter().any(|k| k == n.name());

    let mut pool: Vec<Node> = a.take_children().map(NodeSeq::into_vec).unwrap_or_default();
    let b_children: Vec<Node> = b.take_children().map(NodeSeq::into_vec).unwrap_or_default();
    let mut kept: Vec<Node> = Vec::with_capacity(b_children.len());

    for mut b_child in b_children {
        // Keys always stay in the patch; they name the entry being edited.
        if is_key(&b_child) {
            kept.push(b_child);
            continue;
        }
        match take_counterpart(&b_child, &mut pool) {
            None => {
                diffs += 1;
                kept.push(b_child);
            }
            Some(mut a_child) => {
                if b_child.is_leaf() {
                    if a_child.value() != b_child.value() {
                        diffs += 1;
                        kept.push(b_child);
                    }
                } else {
                    let d = reconcile(&mut a_child, &mut b_child);
                    diffs += d;
                    if d != 0 {
                        kept.push(b_child);
                    }
                }
            }
        }
    }

    // Whatever A still holds has no counterpart in B and must go.
    for mut leftover in pool {
        if is_key(&leftover) {
            continue;
        }
        diffs += 1;
        if !leftover.is_leaf() {
            leftover = leftover.clone_shallow();
        }
        leftover.set_operation(Operation::Delete);
        kept.push(leftover);
    }

    b.set_children(if kept.is_empty() {
        None
    } else {
        Some(NodeSeq::from(kept))
    });
    diffs
}

/// Removes and returns the pool node that `b_child` edits: leaves and plain
/// containers match by identity, list entries by key. First match wins.
fn take_counterpart(b_child: &Node, pool: &mut Vec<Node>) -> Option<Node> {
    let pos = match b_child.kind() {
        NodeKind::Leaf => pool
            .iter()
            .position(|x| x.is_leaf() && x.identity_eq(b_child)),
        NodeKind::Container(_) => pool
            .iter()
            .position(|x| x.is_container() && x.identity_eq(b_child)),
        NodeKind::ListEntry(_) => pool.iter().position(|x| key_compare(x, b_child)),
    }?;
    Some(pool.remove(pos))
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

    fn host(name: &str, addr: &str, enabled: bool) -> Node {
        let schema = Rc::new(ListSchema::new(
            vec!["name".into(), "addr".into(), "enabled".into()],
            1,
        ));
        Node::list_entry(NS, "host", schema)
            .with_child(leaf("name", name))
            .with_child(leaf("addr", addr))
            .with_child(Node::leaf(NS, "enabled", Value::Bool(enabled)))
    }

    #[test]
    fn test_in_sync_yields_empty_patch() {
        let a = container("hosts").with_child(host("h1", "10.0.0.1", true));
        let b = container("hosts").with_child(host("h1", "10.0.0.1", true));

        let patch = sync_merge(&a, &b);
        assert_eq!(patch.child_count(), 0);
        assert_eq!(patch.operation(), Operation::None);
    }

    #[test]
    fn test_unchanged_entry_pruned_changed_entry_minimal() {
        let a = container("hosts")
            .with_child(host("h1", "10.0.0.1", true))
            .with_child(host("h2", "10.0.0.2", true));
        let b = container("hosts")
            .with_child(host("h1", "10.0.0.1", true))
            .with_child(host("h2", "10.0.0.2", false));

        let patch = sync_merge(&a, &b);
        // h1 is identical and pruned away entirely.
        assert_eq!(patch.child_count(), 1);
        let entry = &patch.children().unwrap()[0];
        assert_eq!(
            entry.child("name").unwrap().value(),
            Some(&Value::Str("h2".into()))
        );
        // Only the key and the changed leaf survive.
        assert_eq!(entry.child_count(), 2);
        assert_eq!(
            entry.child("enabled").unwrap().value(),
            Some(&Value::Bool(false))
        );
        assert!(entry.child("addr").is_none());
    }

    #[test]
    fn test_deleted_entry_is_shallow_with_keys() {
        let a = container("hosts")
            .with_child(host("h1", "10.0.0.1", true))
            .with_child(host("h2", "10.0.0.2", true));
        let b = container("hosts").with_child(host("h1", "10.0.0.1", true));

        let patch = sync_merge(&a, &b);
        assert_eq!(patch.child_count(), 1);
        let entry = &patch.children().unwrap()[0];
        assert_eq!(entry.operation(), Operation::Delete);
        assert_eq!(entry.child_count(), 1);
        assert_eq!(
            entry.child("name").unwrap().value(),
            Some(&Value::Str("h2".into()))
        );
    }

    #[test]
    fn test_deleted_leaf_carries_value() {
        let a = container("ifc")
            .with_child(leaf("mtu", "1500"))
            .with_child(leaf("speed", "10g"));
        let b = container("ifc").with_child(leaf("mtu", "1500"));

        let patch = sync_merge(&a, &b);
        assert_eq!(patch.child_count(), 1);
        let gone = &patch.children().unwrap()[0];
        assert_eq!(gone.name(), "speed");
        assert_eq!(gone.operation(), Operation::Delete);
        assert_eq!(gone.value(), Some(&Value::Str("10g".into())));
    }

    #[test]
    fn test_new_entry_kept_whole() {
        let a = container("hosts");
        let b = container("hosts").with_child(host("h1", "10.0.0.1", true));

        let patch = sync_merge(&a, &b);
        let entry = &patch.children().unwrap()[0];
        assert_eq!(entry.child_count(), 3);
        assert_eq!(entry.operation(), Operation::None);
    }

    #[test]
    fn test_no_common_root_replaces_everything() {
        let a = container("old");
        let b = container("new").with_child(leaf("x", "1"));

        let patch = sync_merge(&a, &b);
        assert_eq!(patch.name(), "new");
        assert_eq!(patch.operation(), Operation::Replace);
        assert_eq!(patch.child_count(), 1);
    }

    #[test]
    fn test_leaf_roots_merge_value() {
        let a = leaf("version", "17");

        let patch = sync_merge(&a, &leaf("version", "18"));
        assert_eq!(patch.operation(), Operation::Merge);
        assert_eq!(patch.value(), Some(&Value::Str("18".into())));

        // Equal leaf roots come back unmarked.
        let same = sync_merge(&a, &leaf("version", "17"));
        assert_eq!(same.operation(), Operation::None);
        assert_eq!(same.child_count(), 0);
    }

    #[test]
    fn test_sync_merge_many() {
        let a = [container("hosts").with_child(host("h1", "10.0.0.1", true))];
        let b = [container("hosts").with_child(host("h1", "10.0.0.1", false))];

        let patch = sync_merge_many(&a, &b);
        assert_eq!(patch.len(), 1);
        let entry = &patch[0].children().unwrap()[0];
        assert_eq!(entry.child_count(), 2);

        let same = [container("hosts")];
        assert!(sync_merge_many(&same, &same).is_empty());
    }
}

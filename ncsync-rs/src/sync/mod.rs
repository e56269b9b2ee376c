//! Patch construction.
//!
//! Two independent strategies turn a diff between a known device state A
//! and a desired state B into an edit-config payload:
//!
//! - [`sync`] builds a replace-based patch: explicit `delete`, `create`,
//!   and `replace` marks on the smallest subtrees that cover the diff.
//! - [`sync_merge`] builds a merge-based patch: a pruned copy of B where
//!   everything unmarked merges in and removed parts carry `delete` marks.

pub mod merge;
pub mod replace;

pub use merge::{sync_merge, sync_merge_many};
pub use replace::{sync, sync_many};

use std::rc::Rc;

use crate::node::{ContainerSchema, Node};

/// Wraps a forest under a synthetic root so the tree algorithms can run on
/// it. Both sides of a comparison must be wrapped the same way.
pub(crate) fn wrap_forest(subtrees: Vec<Node>) -> Node {
    let mut order: Vec<String> = Vec::new();
    for n in &subtrees {
        if !order.iter().any(|o| o == n.name()) {
            order.push(n.name().to_string());
        }
    }
    let mut root = Node::container("", "config", Rc::new(ContainerSchema::new(order)));
    for n in subtrees {
        root.add_child(n);
    }
    root
}

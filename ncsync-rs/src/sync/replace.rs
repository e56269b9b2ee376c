//! Replace-based patch construction.
//!
//! [`sync`] computes the diff between the device state A and the desired
//! state B, then folds every divergence into one patch tree: subtrees only
//! in A become `delete` marks (shallow, keys only), subtrees only in B are
//! moved in whole and marked `create`, and changed nodes are moved in and
//! marked `replace`. Ancestor paths are shared, so edits under the same
//! parent coalesce into one branch.

use crate::diff::{compare, get_diff, Comparison, TreePath};
use crate::node::{Node, NodeSeq, Operation};

use super::wrap_forest;

/// Builds the replace-based patch that takes a device from state `a` to
/// state `b`. Returns `None` when the trees are already in sync.
///
/// `b` is consumed: divergent subtrees are moved out of it into the patch
/// rather than copied.
///
/// If the roots do not match at all, the whole of `b` marked `replace` is
/// the patch.
pub fn sync(a: &Node, mut b: Node) -> Option<Node> {
    match compare(a, &b) {
        Comparison::Different => {
            b.set_operation(Operation::Replace);
            return Some(b);
        }
        // Leaf roots: the value change is the whole diff.
        Comparison::Changed if b.is_leaf() => {
            b.set_operation(Operation::Replace);
            return Some(b);
        }
        _ => {}
    }

    let (deletes, edits) = {
        let diff = get_diff(a, &b);
        if diff.is_empty() {
            return None;
        }
        let deletes: Vec<TreePath> = diff.unique_a.iter().map(|e| e.path.clone()).collect();
        let mut edits: Vec<(TreePath, Operation)> =
            Vec::with_capacity(diff.unique_b.len() + diff.changed_b.len());
        for e in &diff.unique_b {
            edits.push((e.path.clone(), Operation::Create));
        }
        for e in &diff.changed_b {
            edits.push((e.path.clone(), Operation::Replace));
        }
        (deletes, edits)
    };

    let mut patch: Option<Node> = None;

    for path in &deletes {
        if let Some((chain, mut node)) = shallow_chain(a, path) {
            node.set_operation(Operation::Delete);
            patch = Some(graft(patch, chain, node));
        }
    }

    // Extract the edited subtrees from b deepest-path-first so removals do
    // not shift sibling indices still to be visited, then graft in the
    // original create/replace order.
    let mut order: Vec<usize> = (0..edits.len()).collect();
    order.sort_by(|&x, &y| edits[y].0.indices().cmp(edits[x].0.indices()));

    let mut extracted: Vec<Option<(Vec<Node>, Node)>> = Vec::new();
    extracted.resize_with(edits.len(), || None);
    for i in order {
        extracted[i] = extract(&mut b, &edits[i].0);
    }
    for (i, (_, op)) in edits.iter().enumerate() {
        if let Some((chain, mut node)) = extracted[i].take() {
            node.set_operation(*op);
            patch = Some(graft(patch, chain, node));
        }
    }
    patch
}

/// [`sync`] over two forests, as if each were rooted under a common
/// synthetic parent. Returns the patch subtrees, or `None` when in sync.
pub fn sync_many(a: &[Node], b: Vec<Node>) -> Option<Vec<Node>> {
    let wrapped_a = wrap_forest(a.to_vec());
    let wrapped_b = wrap_forest(b);
    let mut patch = sync(&wrapped_a, wrapped_b)?;
    Some(
        patch
            .take_children()
            .map(NodeSeq::into_vec)
            .unwrap_or_default(),
    )
}

/// Shallow clones of every node on `path` from `root` down to the parent,
/// plus a shallow clone of the target node itself.
fn shallow_chain(root: &Node, path: &TreePath) -> Option<(Vec<Node>, Node)> {
    let (&last, parents) = path.indices().split_last()?;
    let mut chain = Vec::with_capacity(parents.len() + 1);
    let mut cur = root;
    for &i in parents {
        chain.push(cur.clone_shallow());
        cur = cur.children()?.get(i)?;
    }
    chain.push(cur.clone_shallow());
    let node = cur.children()?.get(last)?.clone_shallow();
    Some((chain, node))
}

/// Like [`shallow_chain`], but removes and returns the target node itself.
fn extract(root: &mut Node, path: &TreePath) -> Option<(Vec<Node>, Node)> {
    let (&last, parents) = path.indices().split_last()?;
    let mut chain = Vec::with_capacity(parents.len() + 1);
    let mut cur = root;
    for &i in parents {
        chain.push(cur.clone_shallow());
        cur = cur.children_mut()?.get_mut(i)?;
    }
    chain.push(cur.clone_shallow());
    let children = cur.children_mut()?;
    if last >= children.len() {
        return None;
    }
    Some((chain, children.remove(last)))
}

/// Grafts `node` into the patch under the given ancestor chain, reusing
/// existing patch branches where the identities already match.
fn graft(patch: Option<Node>, chain: Vec<Node>, node: Node) -> Node {
    let mut ancestors = chain.into_iter();
    let mut patch = match (patch, ancestors.next()) {
        (Some(p), _) => p,
        (None, Some(root)) => root,
        (None, None) => return node,
    };

    let mut cur = &mut patch;
    for anc in ancestors {
        let seq = cur.ensure_children();
        let idx = match seq
            .iter()
            .position(|c| compare(&anc, c) != Comparison::Different)
        {
            Some(i) => i,
            None => {
                seq.push(anc);
                seq.len() - 1
            }
        };
        cur = &mut seq[idx];
    }
    cur.add_child(node);
    patch
}

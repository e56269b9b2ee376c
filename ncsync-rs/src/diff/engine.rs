//! Tree diffing and sync checking.
//!
//! [`get_diff`] walks two trees in lockstep and classifies every divergence
//! into four sets: nodes only in A, nodes only in B, and changed node pairs
//! seen from each side. Matching inside a sibling group is first-match-wins
//! in document order, with list entries matched by key.
//!
//! [`check_sync`] answers the same question as a boolean and short-circuits
//! on the first divergence.

use std::fmt;

use super::compare::{compare, Comparison};
use crate::node::Node;

/// A location in a tree given as child indices from the root.
///
/// Paths stay valid as long as the tree they were taken from is not
/// mutated, which the borrow on [`TreeDiff`] guarantees.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreePath(Vec<usize>);

impl TreePath {
    /// The path of the root itself.
    pub fn root() -> Self {
        TreePath(Vec::new())
    }

    /// The path of the `index`-th child of this path.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        TreePath(indices)
    }

    /// Child indices from the root, outermost first.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// How many levels below the root this path points.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Follows the path from `root`. Returns `None` if any index is out of
    /// range, which means the path was taken from a different tree.
    pub fn resolve<'t>(&self, root: &'t Node) -> Option<&'t Node> {
        let mut cur = root;
        for &i in &self.0 {
            cur = cur.children()?.get(i)?;
        }
        Some(cur)
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for i in &self.0 {
            write!(f, "/{i}")?;
        }
        Ok(())
    }
}

/// One node recorded in a diff, with its location in the source tree.
#[derive(Debug)]
pub struct DiffEntry<'t> {
    /// Where the node sits in its own tree.
    pub path: TreePath,
    /// The node itself.
    pub node: &'t Node,
}

/// The four-way classification produced by [`get_diff`].
///
/// Entries are subtree roots: once a node lands in a set, the walk does not
/// descend into it, so no entry is an ancestor of another.
#[derive(Debug, Default)]
pub struct TreeDiff<'t> {
    /// Subtrees present in A with no counterpart in B.
    pub unique_a: Vec<DiffEntry<'t>>,
    /// Subtrees present in B with no counterpart in A.
    pub unique_b: Vec<DiffEntry<'t>>,
    /// A-side nodes whose counterpart in B differs shallowly.
    pub changed_a: Vec<DiffEntry<'t>>,
    /// B-side counterparts of `changed_a`, in the same order.
    pub changed_b: Vec<DiffEntry<'t>>,
}

impl TreeDiff<'_> {
    /// True when the trees are in sync.
    pub fn is_empty(&self) -> bool {
        self.unique_a.is_empty()
            && self.unique_b.is_empty()
            && self.changed_a.is_empty()
            && self.changed_b.is_empty()
    }
}

/// Computes the full diff of two trees.
///
/// If the roots themselves do not match, each whole tree is reported as
/// unique to its side. Roots that are leaves with differing values are a
/// changed pair at the root path.
pub fn get_diff<'t>(a: &'t Node, b: &'t Node) -> TreeDiff<'t> {
    let mut diff = TreeDiff::default();
    match compare(a, b) {
        Comparison::Different => {
            diff.unique_a.push(DiffEntry {
                path: TreePath::root(),
                node: a,
            });
            diff.unique_b.push(DiffEntry {
                path: TreePath::root(),
                node: b,
            });
            return diff;
        }
        Comparison::Changed if a.is_leaf() => {
            diff.changed_a.push(DiffEntry {
                path: TreePath::root(),
                node: a,
            });
            diff.changed_b.push(DiffEntry {
                path: TreePath::root(),
                node: b,
            });
            return diff;
        }
        _ => {}
    }
    diff_children(a, b, &TreePath::root(), &TreePath::root(), &mut diff);
    diff
}

fn diff_children<'t>(
    a: &'t Node,
    b: &'t Node,
    path_a: &TreePath,
    path_b: &TreePath,
    out: &mut TreeDiff<'t>,
) {
    let a_children = a.children().map_or(&[][..], |c| c.as_slice());
    let b_children = b.children().map_or(&[][..], |c| c.as_slice());

    // Unmatched B children, with their original positions.
    let mut pool: Vec<(usize, &'t Node)> = b_children.iter().enumerate().collect();

    'next_a: for (i, a_child) in a_children.iter().enumerate() {
        for slot in 0..pool.len() {
            let (j, b_child) = pool[slot];
            match compare(a_child, b_child) {
                Comparison::Different => continue,
                Comparison::Changed => {
                    pool.remove(slot);
                    out.changed_a.push(DiffEntry {
                        path: path_a.child(i),
                        node: a_child,
                    });
                    out.changed_b.push(DiffEntry {
                        path: path_b.child(j),
                        node: b_child,
                    });
                    continue 'next_a;
                }
                Comparison::Equal => {
                    pool.remove(slot);
                    if !a_child.is_leaf() {
                        diff_children(a_child, b_child, &path_a.child(i), &path_b.child(j), out);
                    }
                    continue 'next_a;
                }
            }
        }
        out.unique_a.push(DiffEntry {
            path: path_a.child(i),
            node: a_child,
        });
    }

    for (j, b_child) in pool {
        out.unique_b.push(DiffEntry {
            path: path_b.child(j),
            node: b_child,
        });
    }
}

/// True when the two trees are in sync. Short-circuits on the first
/// divergence, so this is cheaper than checking [`TreeDiff::is_empty`].
pub fn check_sync(a: &Node, b: &Node) -> bool {
    if compare(a, b) != Comparison::Equal {
        return false;
    }
    let a_children = a.children().map_or(&[][..], |c| c.as_slice());
    let b_children = b.children().map_or(&[][..], |c| c.as_slice());
    children_in_sync(a_children, b_children)
}

/// [`check_sync`] over two forests, as if each were rooted under a common
/// synthetic parent.
pub fn check_sync_many(a: &[Node], b: &[Node]) -> bool {
    children_in_sync(a, b)
}

fn children_in_sync(a_children: &[Node], b_children: &[Node]) -> bool {
    let mut pool: Vec<&Node> = b_children.iter().collect();

    'next_a: for a_child in a_children {
        for slot in 0..pool.len() {
            match compare(a_child, pool[slot]) {
                Comparison::Different => continue,
                Comparison::Changed => return false,
                Comparison::Equal => {
                    let b_child = pool.remove(slot);
                    if !a_child.is_leaf() {
                        let aa = a_child.children().map_or(&[][..], |c| c.as_slice());
                        let bb = b_child.children().map_or(&[][..], |c| c.as_slice());
                        if !children_in_sync(aa, bb) {
                            return false;
                        }
                    }
                    continue 'next_a;
                }
            }
        }
        return false;
    }
    pool.is_empty()
}

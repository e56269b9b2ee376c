//! Ordered child sequences.

use std::ops::{Index, IndexMut};

use super::Node;

/// An ordered sequence of sibling nodes.
///
/// Document order is preserved; all positional operations are by index.
#[derive(Debug, Clone, Default)]
pub struct NodeSeq {
    nodes: Vec<Node>,
}

impl NodeSeq {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a node at the end.
    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Removes and returns the node at `index`, shifting later siblings.
    pub fn remove(&mut self, index: usize) -> Node {
        self.nodes.remove(index)
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Node> {
        self.nodes.iter_mut()
    }

    /// First child with the given local name.
    pub fn first_named(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name() == name)
    }

    /// All children with the given local name, in document order.
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> {
        self.nodes.iter().filter(move |n| n.name() == name)
    }

    pub fn into_vec(self) -> Vec<Node> {
        self.nodes
    }

    pub fn as_slice(&self) -> &[Node] {
        &self.nodes
    }
}

impl From<Vec<Node>> for NodeSeq {
    fn from(nodes: Vec<Node>) -> Self {
        NodeSeq { nodes }
    }
}

impl FromIterator<Node> for NodeSeq {
    fn from_iter<T: IntoIterator<Item = Node>>(iter: T) -> Self {
        NodeSeq {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl Index<usize> for NodeSeq {
    type Output = Node;

    fn index(&self, index: usize) -> &Node {
        &self.nodes[index]
    }
}

impl IndexMut<usize> for NodeSeq {
    fn index_mut(&mut self, index: usize) -> &mut Node {
        &mut self.nodes[index]
    }
}

impl IntoIterator for NodeSeq {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> IntoIterator for &'a NodeSeq {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

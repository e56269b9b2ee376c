//! The configuration tree model.
//!
//! A tree is built from owned [`Node`] values: each node holds its children
//! directly and there are no parent links, so subtrees can be moved between
//! trees freely. A node is one of three kinds, fixed at construction:
//!
//! - a leaf with a typed [`Value`],
//! - a container holding an ordered child sequence,
//! - a list entry, a container whose identity includes its key children.

use std::rc::Rc;

pub mod node_seq;
pub mod schema;
pub mod value;

pub use node_seq::NodeSeq;
pub use schema::{ContainerSchema, ListSchema, SchemaRegistry, SchemaSpec};
pub use value::{Decimal64, LeafType, Value};

/// The NETCONF base namespace, home of the `operation` attribute.
pub const NETCONF_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// A NETCONF edit-config operation mark carried by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    /// No mark; the node is plain configuration data.
    #[default]
    None,
    /// Remove this subtree from the target.
    Delete,
    /// Create this subtree; it must not already exist.
    Create,
    /// Replace the target subtree with this one.
    Replace,
    /// Merge this subtree into the target.
    Merge,
}

impl Operation {
    /// Wire token for the `nc:operation` attribute, if any.
    pub fn token(&self) -> Option<&'static str> {
        match self {
            Operation::None => None,
            Operation::Delete => Some("delete"),
            Operation::Create => Some("create"),
            Operation::Replace => Some("replace"),
            Operation::Merge => Some("merge"),
        }
    }

    /// Parses a wire token.
    pub fn from_token(token: &str) -> Option<Operation> {
        match token {
            "delete" => Some(Operation::Delete),
            "create" => Some(Operation::Create),
            "replace" => Some(Operation::Replace),
            "merge" => Some(Operation::Merge),
            _ => None,
        }
    }
}

/// An XML attribute carried through parse and print.
///
/// `nc:operation` is not stored here; it is lifted into [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Resolved attribute namespace, `None` for unprefixed attributes.
    pub namespace: Option<Rc<str>>,
    /// Attribute name as written, prefix included.
    pub name: String,
    /// Attribute value.
    pub value: String,
}

/// What kind of node this is, fixed at construction.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A leaf; carries a value and never children.
    Leaf,
    /// An interior container.
    Container(Rc<ContainerSchema>),
    /// A keyed list entry.
    ListEntry(Rc<ListSchema>),
}

/// A single node of a configuration tree.
#[derive(Debug, Clone)]
pub struct Node {
    namespace: Rc<str>,
    name: String,
    value: Option<Value>,
    attributes: Vec<Attribute>,
    children: Option<NodeSeq>,
    operation: Operation,
    kind: NodeKind,
}

impl Node {
    /// Creates a leaf carrying a value.
    pub fn leaf(namespace: impl Into<Rc<str>>, name: impl Into<String>, value: Value) -> Self {
        Node {
            namespace: namespace.into(),
            name: name.into(),
            value: Some(value),
            attributes: Vec::new(),
            children: None,
            operation: Operation::None,
            kind: NodeKind::Leaf,
        }
    }

    /// Creates an empty container. An absent child sequence and an empty one
    /// are equivalent to the engine.
    pub fn container(
        namespace: impl Into<Rc<str>>,
        name: impl Into<String>,
        schema: Rc<ContainerSchema>,
    ) -> Self {
        Node {
            namespace: namespace.into(),
            name: name.into(),
            value: None,
            attributes: Vec::new(),
            children: None,
            operation: Operation::None,
            kind: NodeKind::Container(schema),
        }
    }

    /// Creates an empty list entry.
    pub fn list_entry(
        namespace: impl Into<Rc<str>>,
        name: impl Into<String>,
        schema: Rc<ListSchema>,
    ) -> Self {
        Node {
            namespace: namespace.into(),
            name: name.into(),
            value: None,
            attributes: Vec::new(),
            children: None,
            operation: Operation::None,
            kind: NodeKind::ListEntry(schema),
        }
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: Node) -> Self {
        self.add_child(child);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Replaces the leaf value. Setting a value on a non-leaf is a caller
    /// bug; the engine never does it.
    pub fn set_value(&mut self, value: Value) {
        self.value = Some(value);
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container(_))
    }

    pub fn is_list_entry(&self) -> bool {
        matches!(self.kind, NodeKind::ListEntry(_))
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn set_operation(&mut self, op: Operation) {
        self.operation = op;
    }

    /// Clears operation marks from this node and its whole subtree.
    pub fn remove_marks(&mut self) {
        self.operation = Operation::None;
        if let Some(children) = &mut self.children {
            for child in children.iter_mut() {
                child.remove_marks();
            }
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn add_attribute(&mut self, attr: Attribute) {
        self.attributes.push(attr);
    }

    pub fn children(&self) -> Option<&NodeSeq> {
        self.children.as_ref()
    }

    pub fn children_mut(&mut self) -> Option<&mut NodeSeq> {
        self.children.as_mut()
    }

    /// The child sequence, created empty if absent.
    pub fn ensure_children(&mut self) -> &mut NodeSeq {
        self.children.get_or_insert_with(NodeSeq::new)
    }

    /// Detaches the child sequence, leaving it absent.
    pub fn take_children(&mut self) -> Option<NodeSeq> {
        self.children.take()
    }

    pub fn set_children(&mut self, children: Option<NodeSeq>) {
        self.children = children;
    }

    pub fn add_child(&mut self, child: Node) {
        self.ensure_children().push(child);
    }

    pub fn child_count(&self) -> usize {
        self.children.as_ref().map_or(0, NodeSeq::len)
    }

    /// First child with the given local name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.as_ref().and_then(|c| c.first_named(name))
    }

    /// All children with the given local name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> {
        self.children.iter().flat_map(move |c| c.named(name))
    }

    /// Canonical child order from the schema; empty for leaves.
    pub fn schema_child_order(&self) -> &[String] {
        match &self.kind {
            NodeKind::Leaf => &[],
            NodeKind::Container(s) => s.child_order(),
            NodeKind::ListEntry(s) => s.child_order(),
        }
    }

    /// Key child names for a list entry, `None` otherwise.
    pub fn key_names(&self) -> Option<&[String]> {
        match &self.kind {
            NodeKind::ListEntry(s) => Some(s.keys()),
            _ => None,
        }
    }

    /// Same namespace and local name.
    pub fn identity_eq(&self, other: &Node) -> bool {
        self.name == other.name && self.namespace == other.namespace
    }

    /// Same identity and same value, children ignored.
    pub fn shallow_eq(&self, other: &Node) -> bool {
        self.identity_eq(other) && self.value == other.value
    }

    /// Deep structural equality: identity, value, and children pairwise in
    /// document order. Attributes and operation marks are ignored.
    pub fn subtree_eq(&self, other: &Node) -> bool {
        if !self.shallow_eq(other) {
            return false;
        }
        if self.child_count() != other.child_count() {
            return false;
        }
        match (&self.children, &other.children) {
            (Some(a), Some(b)) => a.iter().zip(b.iter()).all(|(x, y)| x.subtree_eq(y)),
            _ => true,
        }
    }

    /// Clones identity, value, attributes, and operation mark, but not
    /// children. A list entry keeps deep copies of its key children so the
    /// clone still names the same entry.
    pub fn clone_shallow(&self) -> Node {
        let mut copy = Node {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            value: self.value.clone(),
            attributes: self.attributes.clone(),
            children: None,
            operation: self.operation,
            kind: self.kind.clone(),
        };
        if let (Some(keys), Some(children)) = (self.key_names(), &self.children) {
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            for child in children.iter() {
                if child.is_leaf() && keys.contains(&child.name()) {
                    copy.add_child(child.clone());
                }
            }
        }
        copy
    }
}

//! Schema descriptors for containers and keyed lists.
//!
//! Schemas are deliberately small: the engine only needs a child ordering
//! and, for list entries, which children are keys. Descriptors are shared
//! between nodes via `Rc`, typically handed out by a [`SchemaRegistry`].

use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::value::LeafType;

/// Schema for an interior container node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSchema {
    child_order: Vec<String>,
}

impl ContainerSchema {
    /// Creates a container schema with the given canonical child order.
    pub fn new(child_order: Vec<String>) -> Self {
        ContainerSchema { child_order }
    }

    /// Canonical child names in schema order.
    pub fn child_order(&self) -> &[String] {
        &self.child_order
    }
}

/// Schema for a list entry: a container whose first `key_count` children
/// in schema order are the entry's keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSchema {
    child_order: Vec<String>,
    key_count: usize,
}

impl ListSchema {
    /// Creates a list schema. `key_count` is clamped to the number of
    /// declared children.
    pub fn new(child_order: Vec<String>, key_count: usize) -> Self {
        let key_count = key_count.min(child_order.len());
        ListSchema {
            child_order,
            key_count,
        }
    }

    /// Canonical child names in schema order, keys first.
    pub fn child_order(&self) -> &[String] {
        &self.child_order
    }

    /// The key child names, a prefix of the child order.
    pub fn keys(&self) -> &[String] {
        &self.child_order[..self.key_count]
    }
}

/// How the parser should treat an element with a given name.
#[derive(Debug, Clone)]
pub enum SchemaSpec {
    /// A typed leaf.
    Leaf(LeafType),
    /// An interior container.
    Container(Rc<ContainerSchema>),
    /// A keyed list entry.
    List(Rc<ListSchema>),
}

/// Maps element names to their schema descriptors.
///
/// Lookups try the namespace-qualified name first and fall back to the bare
/// local name, so callers that only know names (a command line, say) can
/// still declare list keys. Unregistered elements are inferred from shape
/// by the parser.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    by_qname: FxHashMap<(String, String), SchemaSpec>,
    by_name: FxHashMap<String, SchemaSpec>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a typed leaf under a namespace-qualified name.
    pub fn register_leaf(&mut self, namespace: &str, name: &str, ty: LeafType) {
        self.by_qname
            .insert((namespace.to_string(), name.to_string()), SchemaSpec::Leaf(ty));
    }

    /// Registers a container under a namespace-qualified name.
    pub fn register_container(&mut self, namespace: &str, name: &str, child_order: Vec<String>) {
        let schema = Rc::new(ContainerSchema::new(child_order));
        self.by_qname.insert(
            (namespace.to_string(), name.to_string()),
            SchemaSpec::Container(schema),
        );
    }

    /// Registers a keyed list under a namespace-qualified name. The keys
    /// must be the first `key_count` names of `child_order`.
    pub fn register_list(
        &mut self,
        namespace: &str,
        name: &str,
        child_order: Vec<String>,
        key_count: usize,
    ) {
        let schema = Rc::new(ListSchema::new(child_order, key_count));
        self.by_qname.insert(
            (namespace.to_string(), name.to_string()),
            SchemaSpec::List(schema),
        );
    }

    /// Registers a keyed list by bare name, matching any namespace.
    /// The declared children are exactly the keys.
    pub fn register_list_keys(&mut self, name: &str, keys: Vec<String>) {
        let key_count = keys.len();
        let schema = Rc::new(ListSchema::new(keys, key_count));
        self.by_name
            .insert(name.to_string(), SchemaSpec::List(schema));
    }

    /// Looks up the schema for an element, qualified name first, then bare
    /// local name.
    pub fn lookup(&self, namespace: &str, name: &str) -> Option<&SchemaSpec> {
        self.by_qname
            .get(&(namespace.to_string(), name.to_string()))
            .or_else(|| self.by_name.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_keys_are_order_prefix() {
        let schema = ListSchema::new(
            vec!["name".into(), "domain".into(), "enabled".into()],
            2,
        );
        assert_eq!(schema.keys(), ["name".to_string(), "domain".to_string()]);
        assert_eq!(schema.child_order().len(), 3);
    }

    #[test]
    fn test_key_count_clamped() {
        let schema = ListSchema::new(vec!["name".into()], 5);
        assert_eq!(schema.keys().len(), 1);
    }

    #[test]
    fn test_registry_qualified_lookup_wins() {
        let mut reg = SchemaRegistry::new();
        reg.register_list_keys("host", vec!["name".into()]);
        reg.register_container("urn:example:srv", "host", vec!["addr".into()]);

        match reg.lookup("urn:example:srv", "host") {
            Some(SchemaSpec::Container(_)) => {}
            other => panic!("expected qualified container, got {other:?}"),
        }
        match reg.lookup("urn:other", "host") {
            Some(SchemaSpec::List(s)) => assert_eq!(s.keys(), ["name".to_string()]),
            other => panic!("expected bare-name list, got {other:?}"),
        }
    }

    #[test]
    fn test_unregistered_name() {
        let reg = SchemaRegistry::new();
        assert!(reg.lookup("urn:example", "nothing").is_none());
    }
}

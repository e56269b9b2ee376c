//! XML parser that builds configuration trees.
//!
//! The parser streams events from quick-xml and classifies each element
//! through a [`SchemaRegistry`]: registered names become typed leaves,
//! containers, or list entries. Unregistered elements are inferred from
//! shape, with child elements becoming an untyped container and text
//! content becoming a string leaf.
//!
//! `nc:operation` attributes in the NETCONF base namespace are lifted onto
//! the node as an [`Operation`] mark rather than stored as attributes.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::rc::Rc;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::namespace::{is_xmlns_attr, split_qname, NamespaceContext};
use crate::error::{Error, Result};
use crate::node::{
    Attribute, ContainerSchema, Node, Operation, SchemaRegistry, SchemaSpec, Value,
    NETCONF_NAMESPACE,
};

/// XML parser that builds configuration trees.
pub struct XmlParser<'s> {
    registry: &'s SchemaRegistry,
}

/// An element still being read: everything needed to build the node once
/// its end tag arrives.
struct Frame {
    namespace: Rc<str>,
    name: String,
    attributes: Vec<Attribute>,
    operation: Operation,
    children: Vec<Node>,
    text: String,
}

impl<'s> XmlParser<'s> {
    /// Creates a parser resolving element names through `registry`.
    pub fn new(registry: &'s SchemaRegistry) -> Self {
        XmlParser { registry }
    }

    /// Parses a tree from a string.
    pub fn parse_str(&self, xml: &str) -> Result<Node> {
        let mut reader = Reader::from_str(xml);
        self.parse_reader(&mut reader)
    }

    /// Parses a tree from a file.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Node> {
        let file = File::open(path)?;
        let mut reader = Reader::from_reader(BufReader::new(file));
        self.parse_reader(&mut reader)
    }

    fn parse_reader<R: BufRead>(&self, reader: &mut Reader<R>) -> Result<Node> {
        let mut ctx = NamespaceContext::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut root: Option<Node> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let frame = self.open_frame(e, reader, &mut ctx)?;
                    stack.push(frame);
                }
                Ok(Event::End(_)) => {
                    let frame = stack
                        .pop()
                        .ok_or_else(|| Error::Parse("unbalanced end tag".to_string()))?;
                    let node = self.close_frame(frame)?;
                    ctx.pop_scope();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => attach_root(&mut root, node)?,
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    let frame = self.open_frame(e, reader, &mut ctx)?;
                    let node = self.close_frame(frame)?;
                    ctx.pop_scope();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => attach_root(&mut root, node)?,
                    }
                }
                Ok(Event::Text(e)) => {
                    let raw = std::str::from_utf8(e.as_ref())
                        .map_err(|e| Error::Parse(e.to_string()))?;
                    let text = unescape(raw).map_err(|e| Error::Parse(e.to_string()))?;
                    match stack.last_mut() {
                        Some(frame) => frame.text.push_str(&text),
                        None if text.trim().is_empty() => {}
                        None => {
                            return Err(Error::Parse(
                                "text content outside the root element".to_string(),
                            ))
                        }
                    }
                }
                Ok(Event::CData(ref e)) => {
                    let text = std::str::from_utf8(e.as_ref())
                        .map_err(|e| Error::Parse(e.to_string()))?;
                    if let Some(frame) = stack.last_mut() {
                        frame.text.push_str(text);
                    }
                }
                Ok(Event::Comment(_))
                | Ok(Event::Decl(_))
                | Ok(Event::PI(_))
                | Ok(Event::DocType(_))
                | Ok(Event::GeneralRef(_)) => {}
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(e)),
            }
            buf.clear();
        }

        root.ok_or_else(|| Error::Parse("no root element".to_string()))
    }

    /// Reads an element's name and attributes, resolving namespaces.
    /// Pushes a namespace scope; the caller pops it when the element ends.
    fn open_frame<R: BufRead>(
        &self,
        e: &BytesStart,
        reader: &Reader<R>,
        ctx: &mut NamespaceContext,
    ) -> Result<Frame> {
        ctx.push_scope();

        let mut raw_attrs: Vec<(String, String)> = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|e| Error::Parse(format!("attribute error: {e}")))?;
            let key = reader
                .decoder()
                .decode(attr.key.as_ref())
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();
            // Bindings must be in scope before anything is resolved.
            if is_xmlns_attr(&key) {
                let prefix = key.strip_prefix("xmlns:").unwrap_or("");
                ctx.bind(prefix, &value);
            } else {
                raw_attrs.push((key, value));
            }
        }

        let qname = reader
            .decoder()
            .decode(e.name().as_ref())
            .map_err(|e| Error::Parse(e.to_string()))?
            .to_string();
        let (prefix, local) = split_qname(&qname);
        let namespace = match prefix {
            Some(p) => ctx
                .resolve(p)
                .ok_or_else(|| Error::Parse(format!("unbound namespace prefix '{p}'")))?,
            None => ctx.default_namespace(),
        };

        let mut frame = Frame {
            namespace,
            name: local.to_string(),
            attributes: Vec::new(),
            operation: Operation::None,
            children: Vec::new(),
            text: String::new(),
        };

        for (key, value) in raw_attrs {
            let (prefix, local) = split_qname(&key);
            let attr_ns = match prefix {
                Some(p) => Some(ctx.resolve(p).ok_or_else(|| {
                    Error::Parse(format!("unbound namespace prefix '{p}'"))
                })?),
                None => None,
            };
            if attr_ns.as_deref() == Some(NETCONF_NAMESPACE) && local == "operation" {
                frame.operation = Operation::from_token(&value).ok_or_else(|| {
                    Error::Parse(format!("unknown operation '{value}' on <{}>", frame.name))
                })?;
            } else {
                frame.attributes.push(Attribute {
                    namespace: attr_ns,
                    name: key,
                    value,
                });
            }
        }
        Ok(frame)
    }

    /// Turns a finished frame into a node, classifying it through the
    /// registry or inferring its kind from shape.
    fn close_frame(&self, frame: Frame) -> Result<Node> {
        let text = frame.text.trim();

        let mut node = match self.registry.lookup(&frame.namespace, &frame.name) {
            Some(SchemaSpec::Leaf(ty)) => {
                if !frame.children.is_empty() {
                    return Err(Error::Parse(format!(
                        "leaf <{}> has child elements",
                        frame.name
                    )));
                }
                let value = Value::parse(text, *ty)?;
                Node::leaf(frame.namespace, frame.name, value)
            }
            Some(SchemaSpec::Container(schema)) => {
                if !text.is_empty() {
                    return Err(mixed_content(&frame.name));
                }
                let mut node = Node::container(frame.namespace, frame.name, schema.clone());
                for child in frame.children {
                    node.add_child(child);
                }
                node
            }
            Some(SchemaSpec::List(schema)) => {
                if !text.is_empty() {
                    return Err(mixed_content(&frame.name));
                }
                let mut node = Node::list_entry(frame.namespace, frame.name, schema.clone());
                for child in frame.children {
                    node.add_child(child);
                }
                node
            }
            None if !frame.children.is_empty() => {
                if !text.is_empty() {
                    return Err(mixed_content(&frame.name));
                }
                // Infer a container; its child order is the observed one.
                let mut order: Vec<String> = Vec::new();
                for c in &frame.children {
                    if !order.iter().any(|o| o == c.name()) {
                        order.push(c.name().to_string());
                    }
                }
                let schema = Rc::new(ContainerSchema::new(order));
                let mut node = Node::container(frame.namespace, frame.name, schema);
                for child in frame.children {
                    node.add_child(child);
                }
                node
            }
            // No children, not registered: a string leaf.
            None => Node::leaf(frame.namespace, frame.name, Value::Str(text.to_string())),
        };

        for attr in frame.attributes {
            node.add_attribute(attr);
        }
        node.set_operation(frame.operation);
        Ok(node)
    }
}

fn attach_root(root: &mut Option<Node>, node: Node) -> Result<()> {
    if root.is_some() {
        return Err(Error::Parse("multiple root elements".to_string()));
    }
    *root = Some(node);
    Ok(())
}

fn mixed_content(name: &str) -> Error {
    Error::Parse(format!("element <{name}> mixes text and child elements"))
}

/// Parses a tree from a string.
pub fn parse_str(xml: &str, registry: &SchemaRegistry) -> Result<Node> {
    XmlParser::new(registry).parse_str(xml)
}

/// Parses a tree from a file.
pub fn parse_file<P: AsRef<Path>>(path: P, registry: &SchemaRegistry) -> Result<Node> {
    XmlParser::new(registry).parse_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::LeafType;

    const NS: &str = "urn:example:hosts";

    fn registry() -> SchemaRegistry {
        let mut reg = SchemaRegistry::new();
        reg.register_container(NS, "hosts", vec!["host".into()]);
        reg.register_list(
            NS,
            "host",
            vec!["name".into(), "mtu".into(), "enabled".into()],
            1,
        );
        reg.register_leaf(NS, "name", LeafType::Str);
        reg.register_leaf(NS, "mtu", LeafType::UInt64);
        reg.register_leaf(NS, "enabled", LeafType::Bool);
        reg
    }

    #[test]
    fn test_parse_registered_tree() {
        let xml = r#"
            <hosts xmlns="urn:example:hosts">
              <host>
                <name>h1</name>
                <mtu>1500</mtu>
                <enabled>true</enabled>
              </host>
            </hosts>"#;
        let reg = registry();
        let tree = parse_str(xml, &reg).unwrap();

        assert!(tree.is_container());
        assert_eq!(tree.namespace(), NS);
        let host = &tree.children().unwrap()[0];
        assert!(host.is_list_entry());
        assert_eq!(host.key_names(), Some(&["name".to_string()][..]));
        assert_eq!(host.child("mtu").unwrap().value(), Some(&Value::UInt64(1500)));
        assert_eq!(
            host.child("enabled").unwrap().value(),
            Some(&Value::Bool(true))
        );
    }

    #[test]
    fn test_operation_attribute_lifted() {
        let xml = r#"
            <hosts xmlns="urn:example:hosts"
                   xmlns:nc="urn:ietf:params:xml:ns:netconf:base:1.0">
              <host nc:operation="delete"><name>h1</name></host>
            </hosts>"#;
        let reg = registry();
        let tree = parse_str(xml, &reg).unwrap();

        let host = &tree.children().unwrap()[0];
        assert_eq!(host.operation(), Operation::Delete);
        // The mark is not kept as a plain attribute.
        assert!(host.attributes().is_empty());
    }

    #[test]
    fn test_unknown_operation_rejected() {
        let xml = r#"
            <hosts xmlns="urn:example:hosts"
                   xmlns:nc="urn:ietf:params:xml:ns:netconf:base:1.0">
              <host nc:operation="destroy"><name>h1</name></host>
            </hosts>"#;
        assert!(parse_str(xml, &registry()).is_err());
    }

    #[test]
    fn test_unregistered_elements_inferred() {
        let xml = r#"<config><box><item>x</item></box><note/></config>"#;
        let reg = SchemaRegistry::new();
        let tree = parse_str(xml, &reg).unwrap();

        assert!(tree.is_container());
        let rack = tree.child("box").unwrap();
        assert!(rack.is_container());
        assert_eq!(
            rack.child("item").unwrap().value(),
            Some(&Value::Str("x".into()))
        );
        // An empty unregistered element is an empty string leaf.
        let note = tree.child("note").unwrap();
        assert!(note.is_leaf());
        assert_eq!(note.value(), Some(&Value::Str("".into())));
    }

    #[test]
    fn test_prefixed_elements_resolve() {
        let xml = r#"<h:hosts xmlns:h="urn:example:hosts"><h:host><h:name>h1</h:name></h:host></h:hosts>"#;
        let tree = parse_str(xml, &registry()).unwrap();
        assert_eq!(tree.namespace(), NS);
        assert_eq!(tree.name(), "hosts");
        assert!(tree.children().unwrap()[0].is_list_entry());
    }

    #[test]
    fn test_bad_leaf_value() {
        let xml = r#"<hosts xmlns="urn:example:hosts"><host><name>h1</name><mtu>big</mtu></host></hosts>"#;
        assert!(matches!(
            parse_str(xml, &registry()),
            Err(Error::Value(_))
        ));
    }

    #[test]
    fn test_leaf_with_children_rejected() {
        let xml = r#"<hosts xmlns="urn:example:hosts"><host><name><sub/></name></host></hosts>"#;
        assert!(parse_str(xml, &registry()).is_err());
    }

    #[test]
    fn test_mixed_content_rejected() {
        let xml = r#"<hosts xmlns="urn:example:hosts">stray<host><name>h1</name></host></hosts>"#;
        assert!(parse_str(xml, &registry()).is_err());
    }

    #[test]
    fn test_unbound_prefix_rejected() {
        assert!(parse_str("<x:root/>", &SchemaRegistry::new()).is_err());
    }

    #[test]
    fn test_no_root() {
        assert!(parse_str("  ", &SchemaRegistry::new()).is_err());
    }

    #[test]
    fn test_cdata_becomes_leaf_text() {
        let xml = "<config><motd><![CDATA[a <b> & c]]></motd></config>";
        let tree = parse_str(xml, &SchemaRegistry::new()).unwrap();
        assert_eq!(
            tree.child("motd").unwrap().value(),
            Some(&Value::Str("a <b> & c".into()))
        );
    }

    #[test]
    fn test_plain_attributes_kept() {
        let xml = r#"<config note="keep"><a>1</a></config>"#;
        let tree = parse_str(xml, &SchemaRegistry::new()).unwrap();
        assert_eq!(tree.attributes().len(), 1);
        assert_eq!(tree.attributes()[0].name, "note");
        assert_eq!(tree.attributes()[0].value, "keep");
        assert!(tree.attributes()[0].namespace.is_none());
    }
}

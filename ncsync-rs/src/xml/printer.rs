//! XML printer for configuration trees.
//!
//! Output is indented two spaces per level, one element per line, the shape
//! NETCONF payloads conventionally take. `xmlns` is emitted wherever a
//! node's namespace differs from its parent's, and operation marks come out
//! as `nc:operation` attributes with the NETCONF base namespace declared on
//! first use.

use std::io::Write;

use crate::node::{Node, NETCONF_NAMESPACE};

/// XML printer for configuration trees.
pub struct XmlPrinter<W: Write> {
    writer: W,
}

impl<W: Write> XmlPrinter<W> {
    pub fn new(writer: W) -> Self {
        XmlPrinter { writer }
    }

    /// Prints an XML declaration followed by the tree.
    pub fn print(&mut self, root: &Node) -> std::io::Result<()> {
        writeln!(self.writer, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        self.print_fragment(root)
    }

    /// Prints the tree without an XML declaration.
    pub fn print_fragment(&mut self, root: &Node) -> std::io::Result<()> {
        self.print_node(root, None, 0, false)?;
        self.writer.flush()
    }

    fn print_node(
        &mut self,
        node: &Node,
        parent_ns: Option<&str>,
        level: usize,
        nc_declared: bool,
    ) -> std::io::Result<()> {
        let indent = "  ".repeat(level);
        write!(self.writer, "{indent}<{}", node.name())?;

        if parent_ns != Some(node.namespace()) && !node.namespace().is_empty() {
            write!(self.writer, " xmlns=\"{}\"", to_entities(node.namespace()))?;
        }
        let mut nc_declared = nc_declared;
        if let Some(token) = node.operation().token() {
            if !nc_declared {
                write!(self.writer, " xmlns:nc=\"{NETCONF_NAMESPACE}\"")?;
                nc_declared = true;
            }
            write!(self.writer, " nc:operation=\"{token}\"")?;
        }
        for attr in node.attributes() {
            write!(
                self.writer,
                " {}=\"{}\"",
                attr.name,
                to_entities(&attr.value)
            )?;
        }

        if node.is_leaf() {
            let value = node.value().map(ToString::to_string).unwrap_or_default();
            if value.is_empty() {
                writeln!(self.writer, "/>")?;
            } else {
                writeln!(self.writer, ">{}</{}>", to_entities(&value), node.name())?;
            }
            return Ok(());
        }

        match node.children() {
            Some(children) if !children.is_empty() => {
                writeln!(self.writer, ">")?;
                for child in children {
                    self.print_node(child, Some(node.namespace()), level + 1, nc_declared)?;
                }
                writeln!(self.writer, "{indent}</{}>", node.name())?;
            }
            _ => writeln!(self.writer, "/>")?,
        }
        Ok(())
    }
}

/// Converts special characters to XML entities.
fn to_entities(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '\'' => result.push_str("&apos;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Prints a tree to a string, declaration included.
pub fn print_to_string(root: &Node) -> std::io::Result<String> {
    let mut output = Vec::new();
    XmlPrinter::new(&mut output).print(root)?;
    Ok(String::from_utf8_lossy(&output).to_string())
}

/// Prints a tree to a string without a declaration.
pub fn fragment_to_string(root: &Node) -> std::io::Result<String> {
    let mut output = Vec::new();
    XmlPrinter::new(&mut output).print_fragment(root)?;
    Ok(String::from_utf8_lossy(&output).to_string())
}

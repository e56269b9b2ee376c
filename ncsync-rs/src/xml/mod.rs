//! XML parsing and output.

mod namespace;
mod parser;
mod printer;

pub use namespace::{is_xmlns_attr, split_qname, NamespaceContext};
pub use parser::{parse_file, parse_str, XmlParser};
pub use printer::{fragment_to_string, print_to_string, XmlPrinter};

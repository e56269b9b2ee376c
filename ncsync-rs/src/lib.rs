//! ncsync - Configuration tree comparison and synchronization
//!
//! This library compares NETCONF-style configuration trees and builds the
//! edit-config payloads that bring a device from one state to another.
//!
//! # Overview
//!
//! Trees are ordered, namespaced nodes: leaves with typed values, interior
//! containers, and keyed list entries whose identity is their key leaves
//! rather than their position. On top of that model the library offers:
//!
//! - [`diff::compare`]: shallow classification of a node pair,
//! - [`diff::get_diff`] / [`diff::check_sync`]: full tree diffing,
//! - [`sync::sync`]: a replace-based patch with explicit `create`,
//!   `delete`, and `replace` operation marks,
//! - [`sync::sync_merge`]: a minimal merge-based patch,
//! - [`path::Path`]: keyed path expressions such as
//!   `hosts/host[name='h1']/enabled`,
//! - [`xml`]: schema-aware XML parsing and printing.
//!
//! # Example
//!
//! ```
//! use ncsync::node::SchemaRegistry;
//! use ncsync::{check_sync, parse_str, sync_merge};
//!
//! let mut reg = SchemaRegistry::new();
//! reg.register_list_keys("host", vec!["name".to_string()]);
//!
//! let device = parse_str(
//!     "<hosts><host><name>h1</name><mtu>1500</mtu></host></hosts>",
//!     &reg,
//! )?;
//! let desired = parse_str(
//!     "<hosts><host><name>h1</name><mtu>9000</mtu></host></hosts>",
//!     &reg,
//! )?;
//!
//! assert!(!check_sync(&device, &desired));
//! let patch = sync_merge(&device, &desired);
//! assert_eq!(patch.child_count(), 1);
//! # Ok::<(), ncsync::Error>(())
//! ```

pub mod diff;
pub mod error;
pub mod node;
pub mod path;
pub mod sync;
pub mod xml;

// Re-export commonly used types
pub use diff::{check_sync, check_sync_many, compare, get_diff, Comparison, TreeDiff, TreePath};
pub use error::{Error, Result};
pub use node::{
    Attribute, ContainerSchema, ListSchema, Node, NodeKind, NodeSeq, Operation, SchemaRegistry,
    Value, NETCONF_NAMESPACE,
};
pub use path::Path;
pub use sync::{sync, sync_many, sync_merge, sync_merge_many};
pub use xml::{parse_file, parse_str, XmlParser, XmlPrinter};

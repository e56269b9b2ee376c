//! Example: build a merge-based edit-config payload
//!
//! Parses a device snapshot and a desired configuration, then prints the
//! minimal payload that merges the difference in.
//!
//! Usage: cargo run --example merge

use std::io;

use ncsync::{parse_str, sync_merge, SchemaRegistry, XmlPrinter};

const DEVICE: &str = r#"
<hosts xmlns="urn:example:hosts">
  <host><name>alpha</name><mtu>1500</mtu><enabled>true</enabled></host>
  <host><name>beta</name><mtu>1500</mtu><enabled>true</enabled></host>
</hosts>"#;

const DESIRED: &str = r#"
<hosts xmlns="urn:example:hosts">
  <host><name>alpha</name><mtu>9000</mtu><enabled>true</enabled></host>
</hosts>"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = SchemaRegistry::new();
    registry.register_list_keys("host", vec!["name".to_string()]);

    let device = parse_str(DEVICE, &registry)?;
    let desired = parse_str(DESIRED, &registry)?;

    let patch = sync_merge(&device, &desired);
    if patch.child_count() == 0 {
        println!("already in sync");
        return Ok(());
    }

    // alpha keeps its key and the changed mtu; beta becomes a keyed delete.
    XmlPrinter::new(io::stdout()).print(&patch)?;
    Ok(())
}

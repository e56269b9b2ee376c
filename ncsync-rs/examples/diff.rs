//! Example: report differences between two configuration files
//!
//! Usage: cargo run --example diff <device.xml> <desired.xml>

use std::env;

use ncsync::{get_diff, parse_file, SchemaRegistry};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 3 {
        eprintln!("Usage: {} <device.xml> <desired.xml>", args[0]);
        std::process::exit(1);
    }

    // Without list declarations every element is inferred from shape.
    let registry = SchemaRegistry::new();

    eprintln!("Parsing device state: {}", args[1]);
    let device = parse_file(&args[1], &registry)?;

    eprintln!("Parsing desired state: {}", args[2]);
    let desired = parse_file(&args[2], &registry)?;

    let diff = get_diff(&device, &desired);
    if diff.is_empty() {
        println!("in sync");
        return Ok(());
    }

    for entry in &diff.unique_a {
        println!("only on device: {} <{}>", entry.path, entry.node.name());
    }
    for entry in &diff.unique_b {
        println!("only in target: {} <{}>", entry.path, entry.node.name());
    }
    for (a, b) in diff.changed_a.iter().zip(diff.changed_b.iter()) {
        match (a.node.value(), b.node.value()) {
            (Some(va), Some(vb)) => {
                println!("changed: {} <{}> {} -> {}", a.path, a.node.name(), va, vb)
            }
            _ => println!("changed: {} <{}>", a.path, a.node.name()),
        }
    }
    Ok(())
}

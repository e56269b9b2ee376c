//! Configuration tree comparison and synchronization tool.
//!
//! Compares two NETCONF-style configuration snapshots and builds the
//! edit-config payload that takes a device from one to the other.

use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use ncsync::diff::DiffEntry;
use ncsync::{
    check_sync, get_diff, parse_file, sync, sync_merge, Node, Operation, Path, SchemaRegistry,
    TreePath, XmlPrinter,
};

/// Configuration tree comparison and synchronization tool
#[derive(Parser)]
#[command(name = "ncsync")]
#[command(version)]
#[command(about = "Compare and synchronize NETCONF-style configuration trees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SchemaOpts {
    /// Declare a keyed list as NAME=KEY[,KEY...]; repeatable
    #[arg(long = "list", value_name = "NAME=KEYS")]
    lists: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether two configuration files are in sync
    #[command(visible_alias = "c")]
    Check {
        /// Device state file
        a: String,
        /// Desired state file
        b: String,
        #[command(flatten)]
        schema: SchemaOpts,
    },

    /// Report every difference between two configuration files
    #[command(visible_alias = "d")]
    Diff {
        /// Device state file
        a: String,
        /// Desired state file
        b: String,
        #[command(flatten)]
        schema: SchemaOpts,
    },

    /// Build a replace-based edit-config payload
    #[command(visible_alias = "s")]
    Sync {
        /// Device state file
        a: String,
        /// Desired state file
        b: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
        #[command(flatten)]
        schema: SchemaOpts,
    },

    /// Build a merge-based edit-config payload
    #[command(visible_alias = "m")]
    Merge {
        /// Device state file
        a: String,
        /// Desired state file
        b: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
        #[command(flatten)]
        schema: SchemaOpts,
    },

    /// Select nodes from a configuration file by path expression
    #[command(visible_alias = "g")]
    Get {
        /// Configuration file
        file: String,
        /// Path expression, e.g. "hosts/host[name='h1']/mtu"
        path: String,
        #[command(flatten)]
        schema: SchemaOpts,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { a, b, schema } => run_check(&a, &b, &schema),
        Commands::Diff { a, b, schema } => run_diff(&a, &b, &schema),
        Commands::Sync {
            a,
            b,
            output,
            schema,
        } => run_sync(&a, &b, output.as_deref(), &schema),
        Commands::Merge {
            a,
            b,
            output,
            schema,
        } => run_merge(&a, &b, output.as_deref(), &schema),
        Commands::Get { file, path, schema } => run_get(&file, &path, &schema),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

/// Builds a registry from repeated `--list NAME=KEY[,KEY...]` options.
fn build_registry(schema: &SchemaOpts) -> Result<SchemaRegistry, Box<dyn Error>> {
    let mut registry = SchemaRegistry::new();
    for decl in &schema.lists {
        let (name, keys) = decl
            .split_once('=')
            .ok_or_else(|| format!("bad list declaration '{decl}', expected NAME=KEY[,KEY...]"))?;
        let keys: Vec<String> = keys
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
        if name.trim().is_empty() || keys.is_empty() {
            return Err(format!("bad list declaration '{decl}'").into());
        }
        registry.register_list_keys(name.trim(), keys);
    }
    Ok(registry)
}

fn load(path: &str, registry: &SchemaRegistry) -> Result<Node, Box<dyn Error>> {
    eprintln!("Parsing: {path}");
    Ok(parse_file(path, registry)?)
}

fn open_output(path: Option<&str>) -> Result<Box<dyn Write>, Box<dyn Error>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    })
}

/// Checks sync state. Exits 0 when in sync, 1 when not.
fn run_check(a_path: &str, b_path: &str, schema: &SchemaOpts) -> Result<ExitCode, Box<dyn Error>> {
    let registry = build_registry(schema)?;
    let a = load(a_path, &registry)?;
    let b = load(b_path, &registry)?;

    if check_sync(&a, &b) {
        println!("in sync");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("out of sync");
        Ok(ExitCode::from(1))
    }
}

/// Prints the full diff report.
fn run_diff(a_path: &str, b_path: &str, schema: &SchemaOpts) -> Result<ExitCode, Box<dyn Error>> {
    let registry = build_registry(schema)?;
    let a = load(a_path, &registry)?;
    let b = load(b_path, &registry)?;

    let diff = get_diff(&a, &b);
    if diff.is_empty() {
        println!("in sync");
        return Ok(ExitCode::SUCCESS);
    }

    print_section("only in A", &a, &diff.unique_a);
    print_section("only in B", &b, &diff.unique_b);

    if !diff.changed_a.is_empty() {
        println!("changed:");
        for (ea, eb) in diff.changed_a.iter().zip(diff.changed_b.iter()) {
            match (ea.node.value(), eb.node.value()) {
                (Some(va), Some(vb)) => {
                    println!("  {}: {} -> {}", describe(&a, &ea.path), va, vb)
                }
                _ => println!("  {}", describe(&a, &ea.path)),
            }
        }
    }
    Ok(ExitCode::from(1))
}

fn print_section(title: &str, root: &Node, entries: &[DiffEntry<'_>]) {
    if entries.is_empty() {
        return;
    }
    println!("{title}:");
    for entry in entries {
        println!("  {}", describe(root, &entry.path));
    }
}

/// Renders a tree path as a readable /name/host[key=value]/... string.
fn describe(root: &Node, path: &TreePath) -> String {
    let mut out = String::new();
    let mut cur = root;
    let mut nodes = vec![root];
    for &i in path.indices() {
        match cur.children().and_then(|c| c.get(i)) {
            Some(child) => {
                nodes.push(child);
                cur = child;
            }
            None => return path.to_string(),
        }
    }
    for node in nodes {
        out.push('/');
        out.push_str(node.name());
        if let Some(keys) = node.key_names() {
            for key in keys {
                if let Some(v) = node.child(key).and_then(Node::value) {
                    out.push_str(&format!("[{key}={v}]"));
                }
            }
        }
    }
    out
}

/// Builds and prints the replace-based patch.
fn run_sync(
    a_path: &str,
    b_path: &str,
    output: Option<&str>,
    schema: &SchemaOpts,
) -> Result<ExitCode, Box<dyn Error>> {
    let registry = build_registry(schema)?;
    let a = load(a_path, &registry)?;
    let b = load(b_path, &registry)?;

    match sync(&a, b) {
        None => {
            eprintln!("Already in sync.");
            Ok(ExitCode::SUCCESS)
        }
        Some(patch) => {
            let mut out = open_output(output)?;
            XmlPrinter::new(&mut out).print(&patch)?;
            eprintln!("Sync payload written.");
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Builds and prints the merge-based patch.
fn run_merge(
    a_path: &str,
    b_path: &str,
    output: Option<&str>,
    schema: &SchemaOpts,
) -> Result<ExitCode, Box<dyn Error>> {
    let registry = build_registry(schema)?;
    let a = load(a_path, &registry)?;
    let b = load(b_path, &registry)?;

    let patch = sync_merge(&a, &b);
    if patch.child_count() == 0 && patch.operation() == Operation::None {
        eprintln!("Already in sync.");
        return Ok(ExitCode::SUCCESS);
    }
    let mut out = open_output(output)?;
    XmlPrinter::new(&mut out).print(&patch)?;
    eprintln!("Merge payload written.");
    Ok(ExitCode::SUCCESS)
}

/// Evaluates a path expression against a configuration file.
fn run_get(
    file_path: &str,
    path_expr: &str,
    schema: &SchemaOpts,
) -> Result<ExitCode, Box<dyn Error>> {
    let registry = build_registry(schema)?;
    let tree = load(file_path, &registry)?;
    let path = Path::parse(path_expr)?;

    let found = path.eval(&tree);
    if found.is_empty() {
        eprintln!("No match.");
        return Ok(ExitCode::from(1));
    }
    let mut out = io::stdout();
    for node in found {
        XmlPrinter::new(&mut out).print_fragment(node)?;
    }
    Ok(ExitCode::SUCCESS)
}

//! dfql — compile dataframe plans to ODPS SQL
//!
//! # Usage
//!
//! ```bash
//! # Compile a serialized plan
//! dfql compile plan.json
//!
//! # One select field per line, 4-space indent
//! dfql compile plan.json --beautify --indent 4
//!
//! # Show the node tree next to the SQL
//! dfql explain plan.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dfql::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dfql")]
#[command(version)]
#[command(about = "Compile dataframe expression plans to ODPS SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    dfql compile plan.json
    dfql compile plan.json --beautify --limit 500
    dfql explain plan.json
    dfql types")]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON plan to SQL
    Compile {
        /// Plan file ({"dag": .., "root": ..})
        plan: PathBuf,

        /// One select field per line
        #[arg(long)]
        beautify: bool,

        /// Spaces per indentation level
        #[arg(long)]
        indent: Option<usize>,

        /// LIMIT added to ORDER BY without an explicit limit
        #[arg(long)]
        limit: Option<u64>,

        /// Config file (defaults to ./dfql.toml, then the user config dir)
        #[arg(short, long, env = "DFQL_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the node tree of a plan, then its SQL
    Explain {
        plan: PathBuf,

        #[arg(short, long, env = "DFQL_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Show the type lattice
    Types,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Compile {
            plan,
            beautify,
            indent,
            limit,
            config,
        } => load_options(config.as_deref()).and_then(|mut options| {
            options.beautify |= *beautify;
            if let Some(n) = indent {
                options.indent_size = *n;
            }
            if let Some(n) = limit {
                options.default_sort_limit = *n;
            }
            compile_plan(plan, options)
        }),
        Commands::Explain { plan, config } => {
            load_options(config.as_deref()).and_then(|options| explain_plan(plan, options))
        }
        Commands::Types => {
            show_types();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("dfql=debug")
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_options(config: Option<&Path>) -> Result<CompilerOptions> {
    CompilerOptions::discover(config).context("Failed to load compiler options")
}

fn read_plan(path: &Path) -> Result<Plan> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan '{}'", path.display()))?;
    let plan = Plan::from_json(&json)
        .with_context(|| format!("Invalid plan '{}'", path.display()))?;
    tracing::info!(nodes = plan.dag.len(), root = %plan.root, "loaded plan");
    Ok(plan)
}

fn compile_plan(path: &Path, options: CompilerOptions) -> Result<()> {
    let plan = read_plan(path)?;
    let mut compiler = Compiler::new(options);
    let sql = compiler
        .compile(&plan.dag, plan.root)
        .with_context(|| format!("Failed to compile '{}'", path.display()))?;
    println!("{}", sql);
    print_udfs(&compiler);
    Ok(())
}

fn print_udfs(compiler: &Compiler) {
    let udfs: Vec<(&str, &str)> = compiler.context().udfs().collect();
    if udfs.is_empty() {
        return;
    }
    eprintln!();
    eprintln!("{}", "Functions to deploy:".cyan().bold());
    for (function, name) in udfs {
        eprintln!("  {} {} {}", name.yellow(), "<-".dimmed(), function.white());
    }
}

fn explain_plan(path: &Path, options: CompilerOptions) -> Result<()> {
    let plan = read_plan(path)?;
    println!("{}", "Plan:".green().bold());
    let mut seen = HashSet::new();
    print_node(&plan.dag, plan.root, 1, &mut seen)?;

    println!();
    println!("{}", "Generated SQL:".green().bold());
    let mut compiler = Compiler::new(options);
    let sql = compiler.compile(&plan.dag, plan.root)?;
    for line in sql.lines() {
        println!("  {}", line.white());
    }
    print_udfs(&compiler);
    Ok(())
}

fn describe_shape(node: &Node) -> String {
    match &node.shape {
        Shape::Collection { schema } => {
            let fields: Vec<String> = schema
                .fields()
                .iter()
                .map(|f| format!("{}: {}", f.name, f.dtype))
                .collect();
            format!("collection [{}]", fields.join(", "))
        }
        Shape::Sequence(t) | Shape::Scalar(t) => {
            let kind = if matches!(node.shape, Shape::Sequence(_)) {
                "sequence"
            } else {
                "scalar"
            };
            match &t.name {
                Some(name) => format!("{} {}: {}", kind, name, t.dtype),
                None => format!("{} {}", kind, t.dtype),
            }
        }
    }
}

fn print_node(dag: &Dag, id: NodeId, depth: usize, seen: &mut HashSet<NodeId>) -> Result<()> {
    let node = dag.get(id)?;
    let pad = "  ".repeat(depth);
    if !seen.insert(id) {
        println!("{}{} {}", pad, id.to_string().dimmed(), "(shared)".dimmed());
        return Ok(());
    }
    let label = match &node.kind {
        NodeKind::Source { table } => format!("{} {}.{}", node.kind.name(), table.namespace, table.name),
        kind => kind.name().to_string(),
    };
    println!(
        "{}{} {} {}",
        pad,
        id.to_string().dimmed(),
        label.cyan(),
        describe_shape(node).white()
    );
    for (slot, child) in node.kind.args() {
        if slot == "collection" {
            println!("{}  {} {}", pad, "of".dimmed(), child.to_string().dimmed());
            continue;
        }
        print_node(dag, child, depth + 1, seen)?;
    }
    Ok(())
}

fn show_types() {
    println!("{}", "Type lattice (lowest precedence first)".cyan().bold());
    println!();
    println!(
        "{:10} {:10} {}",
        "Type".white().bold(),
        "SQL".white().bold(),
        "Implicitly accepts".white().bold()
    );
    println!("{}", "─".repeat(60).dimmed());
    for dtype in PRECEDENCE {
        let accepts: Vec<String> = PRECEDENCE
            .iter()
            .filter(|from| **from != dtype && dtype.can_implicit_cast(**from))
            .map(|from| from.to_string())
            .collect();
        println!(
            "{:10} {:10} {}",
            dtype.to_string().yellow(),
            dtype.sql_name(),
            accepts.join(", ").dimmed()
        );
    }
}

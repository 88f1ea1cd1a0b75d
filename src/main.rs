use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use elimtree::graph::io::{parse_factor_graph, parse_ordering};
use elimtree::graph::{symbol_formatter, Factor, FactorGraph, Ordering, VariableIndex};
use elimtree::symbolic::{SymbolicFactor, SymbolicPolicy};
use elimtree::{EliminationConfig, EliminationForest, Eliminator};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "elimtree", about = "Elimination trees and symbolic elimination for factor graphs")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the elimination forest.
    Tree(GraphArgs),
    /// Eliminate symbolically and print the Bayes net and reduced factors.
    Eliminate {
        #[command(flatten)]
        graph: GraphArgs,
        /// Eliminate independent subtrees in parallel.
        #[arg(long)]
        parallel: bool,
    },
    /// Print forest shape statistics.
    Stats(GraphArgs),
}

#[derive(Args, Debug)]
struct GraphArgs {
    /// Factor graph file (one factor per line, whitespace-separated keys).
    graph: PathBuf,
    /// Elimination ordering (comma-separated keys); defaults to ascending keys.
    #[arg(long)]
    ordering: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Tree(args) => run_tree(&args)?,
        Commands::Eliminate { graph, parallel } => run_eliminate(&graph, parallel)?,
        Commands::Stats(args) => run_stats(&args)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_tree(args: &GraphArgs) -> Result<()> {
    let forest = load_forest(args)?;
    print!("{}", forest.render("", &symbol_formatter));
    println!("fingerprint\t{}", forest.fingerprint().to_hex());
    Ok(())
}

fn run_stats(args: &GraphArgs) -> Result<()> {
    let forest = load_forest(args)?;
    println!("{}", forest.stats().report());
    Ok(())
}

fn run_eliminate(args: &GraphArgs, parallel: bool) -> Result<()> {
    let forest = load_forest(args)?;
    let config = if parallel {
        EliminationConfig::parallel()
    } else {
        EliminationConfig::sequential()
    };

    let result = Eliminator::new(SymbolicPolicy, config)
        .run(&forest)
        .context("symbolic elimination failed")?;

    for conditional in &result.bayes_net {
        println!("{}", conditional.describe(&symbol_formatter));
    }
    if result.remaining.is_empty() {
        println!("No factors remain.");
    } else {
        for factor in result.remaining.iter() {
            println!("remaining\t{}", factor.describe(&symbol_formatter));
        }
    }

    Ok(())
}

fn load_forest(args: &GraphArgs) -> Result<EliminationForest<SymbolicFactor>> {
    let graph = read_graph(&args.graph)?;
    let index = VariableIndex::from_graph(&graph);
    let ordering = match &args.ordering {
        Some(text) => parse_ordering(text).context("invalid --ordering")?,
        None => Ordering::natural(&index),
    };

    EliminationForest::build(&graph, &index, &ordering).with_context(|| {
        format!(
            "failed to build elimination forest for {}",
            args.graph.display()
        )
    })
}

fn read_graph(path: &Path) -> Result<FactorGraph<SymbolicFactor>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read factor graph from {}", path.display()))?;
    parse_factor_graph(&contents)
        .with_context(|| format!("failed to parse factor graph {}", path.display()))
}

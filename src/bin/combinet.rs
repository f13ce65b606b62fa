//! Command-line driver for the factorization search.
//!
//! `combinet N [max_nodes] [gas_limit]` searches enumerator indices for a
//! net whose normal form factors `N`. Exits 0 when a solution is found and
//! 1 otherwise. The library core stays logging-free; this binary owns the
//! tracing setup and all output.

use clap::Parser;
use combinet::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Search for an interaction-combinator net that factors a number.
#[derive(Parser, Debug)]
#[command(name = "combinet", version, about, long_about = None)]
struct Cli {
    /// Number to factor.
    #[arg(value_parser = clap::value_parser!(u64).range(2..))]
    number: u64,

    /// Node capacity of each candidate net.
    #[arg(default_value_t = 100)]
    max_nodes: usize,

    /// Rewrite budget per reduction.
    #[arg(default_value_t = 100_000)]
    gas_limit: usize,

    /// Exclusive upper bound on candidate indices.
    #[arg(long, default_value_t = 1_000_000)]
    limit: usize,

    /// Fan the search out over a rayon worker pool.
    #[arg(short, long)]
    parallel: bool,

    /// Write the solution net as Graphviz DOT to this path.
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Print a JSON summary of the solution net to stdout.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = SearchConfig {
        max_nodes: cli.max_nodes,
        gas_limit: cli.gas_limit,
        index_ceiling: cli.limit,
        ..SearchConfig::default()
    };

    info!(
        n = cli.number,
        max_nodes = config.max_nodes,
        gas_limit = config.gas_limit,
        limit = config.index_ceiling,
        parallel = cli.parallel,
        "searching for a factorization"
    );

    let report = |index: usize, found: bool| {
        if found {
            info!(index, "solution found");
        } else {
            info!(index, "indices searched");
        }
    };

    let started = Instant::now();
    let solution = if cli.parallel {
        search_factor_parallel(cli.number, &config, Some(&report))
    } else {
        search_factor(cli.number, &config, Some(&report))
    };
    let elapsed = started.elapsed();

    let Some(solution) = solution else {
        info!(elapsed_ms = elapsed.as_millis() as u64, "search exhausted");
        println!("no factorization of {} found", cli.number);
        return ExitCode::FAILURE;
    };

    info!(
        index = solution.index,
        elapsed_ms = elapsed.as_millis() as u64,
        "search succeeded"
    );
    println!(
        "{} = {} x {} (index {})",
        cli.number, solution.factor_a, solution.factor_b, solution.index
    );

    if cli.dot.is_some() || cli.json {
        if let Err(code) = dump_solution(&cli, &config, solution.index) {
            return code;
        }
    }
    ExitCode::SUCCESS
}

/// Rebuilds and reduces the solution net for the DOT and JSON outputs.
fn dump_solution(cli: &Cli, config: &SearchConfig, index: usize) -> Result<(), ExitCode> {
    let mut net = Net::new(config.max_nodes, config.gas_limit);
    net.channel.input = cli.number;
    if let Err(err) = build_net(index, &mut net) {
        error!(index, %err, "failed to rebuild solution net");
        return Err(ExitCode::FAILURE);
    }
    reduce(&mut net);

    if cli.json {
        match serde_json::to_string_pretty(&summarize(&net)) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                error!(%err, "failed to serialize summary");
                return Err(ExitCode::FAILURE);
            }
        }
    }
    if let Some(path) = &cli.dot {
        if let Err(err) = std::fs::write(path, render_dot(&net)) {
            error!(path = %path.display(), %err, "failed to write DOT file");
            return Err(ExitCode::FAILURE);
        }
        info!(path = %path.display(), "solution graph written");
    }
    Ok(())
}

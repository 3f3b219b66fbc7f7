//! godep CLI - package dependency node graph of a Go module.
//!
//! Usage:
//!   godep                         # DOT for the module in the current directory
//!   godep --format svg > deps.svg # Render with Graphviz
//!   godep --report text           # Also dump the symbol trees to stderr
//!   godep --root $(go env GOROOT)/src  # The whole standard library

use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

use godep::cli::{Cli, OutputFormat, ReportFormat};
use godep::{analyze, render, GodepConfig};

fn main() {
    let cli = Cli::parse();

    // stdout carries the graph
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let root = cli.root.canonicalize().unwrap_or(cli.root);

    let config = GodepConfig::load(cli.config.as_deref(), &cwd)?.with_platform(cli.goos, cli.goarch);
    info!(
        std = %config.std_root.display(),
        imports = %config.import_root.display(),
        goos = %config.goos,
        goarch = %config.goarch,
        "configuration"
    );

    let analysis = analyze(&root, &config)?;
    info!("{}", analysis.load);

    match cli.report {
        Some(ReportFormat::Text) => analysis.tables.report(&mut io::stderr().lock())?,
        Some(ReportFormat::Json) => analysis.tables.report_json(&mut io::stderr().lock())?,
        None => {}
    }

    let dot = analysis.graph.to_dot();
    let mut stdout = io::stdout().lock();
    match cli.format {
        OutputFormat::Dot => stdout.write_all(dot.as_bytes())?,
        OutputFormat::Svg => {
            if let Some(svg) = render::render_or_dump(&config.renderer, &dot, &mut io::stderr()) {
                stdout.write_all(&svg)?;
            }
        }
    }
    stdout.flush()?;

    Ok(())
}

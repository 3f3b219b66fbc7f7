//! Command-line interface for godep.
//!
//! ```text
//! godep [--root DIR] [--config FILE] [--format dot|svg] [--report text|json]
//!       [--goos OS] [--goarch ARCH] [--verbose]
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "godep")]
#[command(about = "Package dependency node graph of a Go module", long_about = None)]
pub struct Cli {
    /// Directory inside the module to analyze (default: current directory)
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Config file (default: godep.toml in the current directory, if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format written to stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Dot)]
    pub format: OutputFormat,

    /// Dump the symbol trees to stderr
    #[arg(long, value_enum)]
    pub report: Option<ReportFormat>,

    /// Target operating system for build constraints (overrides GOOS)
    #[arg(long)]
    pub goos: Option<String>,

    /// Target architecture for build constraints (overrides GOARCH)
    #[arg(long)]
    pub goarch: Option<String>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Graphviz DOT text
    Dot,
    /// SVG rendered by the configured renderer
    Svg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// One indented block per tree
    Text,
    /// All trees as one JSON object
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["godep"]);
        assert_eq!(cli.root, PathBuf::from("."));
        assert_eq!(cli.format, OutputFormat::Dot);
        assert!(cli.report.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::parse_from([
            "godep", "--root", "/src/m", "--config", "g.toml", "--format", "svg", "--report",
            "json", "--goos", "darwin", "--goarch", "arm64", "-v",
        ]);
        assert_eq!(cli.root, PathBuf::from("/src/m"));
        assert_eq!(cli.config, Some(PathBuf::from("g.toml")));
        assert_eq!(cli.format, OutputFormat::Svg);
        assert_eq!(cli.report, Some(ReportFormat::Json));
        assert_eq!(cli.goos.as_deref(), Some("darwin"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["godep", "--format", "png"]).is_err());
    }
}

//! Seatscope CLI
//!
//! Command-line interface for Copilot seat association reporting.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod commands;
mod config;
mod report;
mod store;

use commands::{run_fetch, run_report, ReportArgs};
use config::AppConfig;
use report::ReportFormat;

#[derive(Parser)]
#[command(name = "seatscope")]
#[command(version)]
#[command(about = "Copilot seat association reporting for GitHub organizations", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", default_value = "seatscope.yaml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch organization snapshots and cache them
    Fetch,

    /// Generate the associations report
    Report {
        /// Per-member counts instead of one row per association
        #[arg(long)]
        summary: bool,

        /// Re-fetch snapshots even when cached ones exist
        #[arg(long)]
        refresh: bool,

        /// Output format (csv, json, jsonl)
        #[arg(long, default_value = "csv")]
        format: ReportFormat,

        /// Report members of contexts with no seat holder as "Unknown" rows
        #[arg(long)]
        permissive: bool,

        /// Also report seat holders themselves, as "Self" rows
        #[arg(long)]
        include_seat_holders: bool,
    },

    /// Show the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load(&cli.config).unwrap_or_else(|_| {
        if cli.verbose {
            eprintln!("Using default configuration (no config file found)");
        }
        AppConfig::default()
    });

    // Initialize logging
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        config
            .logging
            .level
            .parse()
            .unwrap_or(tracing::Level::INFO)
    };

    seatscope_observability::init_logging_with_config(seatscope_observability::LoggingConfig {
        level: log_level,
        json_format: config.logging.json_format,
        ..Default::default()
    });

    // Execute command
    match cli.command {
        Commands::Fetch => run_fetch(&config).await?,

        Commands::Report {
            summary,
            refresh,
            format,
            permissive,
            include_seat_holders,
        } => {
            let args = ReportArgs {
                summary,
                refresh,
                format,
                permissive,
                include_seat_holders,
            };
            let path = run_report(&config, &args).await?;
            println!("{} {}", "Report written to".green(), path.display());
        }

        Commands::Config => {
            let yaml = serde_yaml::to_string(&config)?;
            println!("{}", yaml);
        }
    }

    Ok(())
}

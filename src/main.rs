//! Route Compass - Command-line tool for extracting route metadata.
//!
//! # Usage
//!
//! ```bash
//! route-compass [OPTIONS] <INPUT>
//! ```
//!
//! # Examples
//!
//! Print the routes of a Rust project:
//! ```bash
//! route-compass ./my-service
//! ```
//!
//! Merge the routes of a declaration model into `generated/routes`:
//! ```bash
//! route-compass ./declarations.yaml -o generated
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! route-compass ./my-service -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use route_compass::cli;

fn main() -> Result<()> {
    // The verbose flag decides the log level, so parse before the logger exists and
    // validate after
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Route Compass starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Route extraction completed successfully");

    Ok(())
}

//! Map Annotation MCP Server - Main Entry Point
//!
//! This is the main entry point for the map annotation MCP server application.
//! The actual implementation is in the `mymap_mcp` library.

use anyhow::Result;
use clap::{CommandFactory, Parser};
use mcp_attr::server::serve_stdio;
use mymap_mcp::{Config, MapServerHandler};
use std::path::PathBuf;

/// Map Annotation MCP Server - area-grouped markers on a tile map via Model Context Protocol
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the store file holding the saved markers
    file: String,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Check if no arguments were provided (except the program name)
    if std::env::args().len() == 1 {
        // No arguments provided, show help and exit with error code
        let mut cmd = Args::command();
        cmd.print_help().ok();
        println!(); // Add a newline after help
        std::process::exit(2);
    }

    // stdout carries the MCP stream; env_logger writes to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match args.config {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    log::info!("mymap-mcp v{} starting", env!("CARGO_PKG_VERSION"));
    let handler = MapServerHandler::new(&args.file, config)?;
    serve_stdio(handler).await?;
    Ok(())
}

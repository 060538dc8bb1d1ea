//! CLI commands and argument parsing

use crate::types::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Paging mediator CLI
#[derive(Parser, Debug)]
#[command(name = "paging-mediator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Verbose output (same as --log-level debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective log level after applying `--verbose`
    pub fn level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a config file
    Validate,

    /// Scroll through the configured source, printing one JSON item per line
    Scroll {
        /// Rows visible at once; warns when larger than the page size
        #[arg(long)]
        viewport: Option<usize>,

        /// Stop after rendering this many items
        #[arg(long)]
        max_items: Option<usize>,

        /// Override the configured page size
        #[arg(long)]
        page_size: Option<u32>,

        /// Override the configured load offset
        #[arg(long)]
        load_offset: Option<usize>,

        /// Extra query parameter (key=value), repeatable
        #[arg(short, long = "query", value_parser = parse_key_val)]
        query: Vec<(String, String)>,
    },
}

/// Parse a `key=value` argument
pub fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

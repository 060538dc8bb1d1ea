//! CLI module
//!
//! Command-line interface for exercising a mediator against an HTTP
//! source.
//!
//! # Commands
//!
//! - `validate` - Load a config file and print the effective settings
//! - `scroll` - Simulate a scrolling list that pages through the source

mod commands;
mod runner;

pub use commands::{parse_key_val, Cli, Commands};
pub use runner::{scroll, Runner, ScrollOptions};

//! CLI module - Command-line interface for the weather API
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Weather API - current weather by city, with scheduled lookups
#[derive(Parser)]
#[command(name = "weather-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server and the scheduled query worker
    #[command(alias = "daemon")]
    Serve,

    /// Resolve the current weather for a city once and print it
    #[command(alias = "f")]
    Fetch {
        /// City name
        #[arg(required = true)]
        city: Vec<String>,
    },

    /// Show the most recent weather queries
    #[command(alias = "h")]
    History {
        /// Number of entries to show
        #[arg(default_value = "10")]
        limit: u64,
    },

    /// Create default config file
    Init,
}

pub use commands::*;

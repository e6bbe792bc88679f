//! CLI argument definitions using clap
//!
//! Commands:
//! - idfkit find <query>
//! - idfkit describe <type>
//! - idfkit check <file>
//! - idfkit format <file> [--output <path>] [--only <type>...]
//! - idfkit build [--version <version>]
//! - idfkit show <file> <name>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// idfkit - EnergyPlus dictionary and IDF model toolkit
#[derive(Parser, Debug)]
#[command(name = "idfkit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List record types whose name contains a query
    Find {
        /// Case-insensitive substring of the type name
        query: String,

        /// Path to configuration file
        #[arg(long, default_value = "./idfkit.json")]
        config: PathBuf,

        /// Dictionary version (defaults to the configured one)
        #[arg(long = "version", value_name = "VERSION")]
        idd_version: Option<String>,
    },

    /// Print the fields of a record type
    Describe {
        /// Record type name
        record_type: String,

        /// Path to configuration file
        #[arg(long, default_value = "./idfkit.json")]
        config: PathBuf,

        /// Dictionary version (defaults to the configured one)
        #[arg(long = "version", value_name = "VERSION")]
        idd_version: Option<String>,
    },

    /// Validate an IDF file against its dictionary
    Check {
        /// IDF file
        file: PathBuf,

        /// Path to configuration file
        #[arg(long, default_value = "./idfkit.json")]
        config: PathBuf,
    },

    /// Re-render an IDF file in canonical form
    Format {
        /// IDF file
        file: PathBuf,

        /// Write here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Keep only these record types
        #[arg(long = "only", value_name = "TYPE")]
        only: Vec<String>,

        /// Path to configuration file
        #[arg(long, default_value = "./idfkit.json")]
        config: PathBuf,
    },

    /// Build an IDF model from JSON lines on stdin
    Build {
        /// Dictionary version (defaults to the configured one)
        #[arg(long = "version", value_name = "VERSION")]
        idd_version: Option<String>,

        /// Path to configuration file
        #[arg(long, default_value = "./idfkit.json")]
        config: PathBuf,
    },

    /// Print one named record of an IDF file as JSON
    Show {
        /// IDF file
        file: PathBuf,

        /// Record name
        name: String,

        /// Path to configuration file
        #[arg(long, default_value = "./idfkit.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

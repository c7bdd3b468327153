pub mod app;
pub mod demo;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "flatdb", version, about = "Flat-file table store")]
pub struct Cli {
    /// Directory holding the table files
    #[arg(long, short = 'd', env = "FLATDB_DIR", default_value = "data")]
    pub dir: PathBuf,

    /// Create the directory if it does not exist
    #[arg(long)]
    pub create_dir: bool,

    /// Rewrite tables in place instead of through a temporary file
    #[arg(long)]
    pub in_place: bool,

    /// fsync after every write
    #[arg(long)]
    pub sync: bool,

    /// Log store operations to stderr
    #[arg(long, short = 'v')]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a table with the given columns
    Create {
        table: String,
        columns: Vec<String>,
    },
    /// Delete a table file
    Drop { table: String },
    /// Remove every row, keep the schema
    Truncate { table: String },
    /// Print the column names of a table
    Schema { table: String },
    /// Append a row given as a JSON object
    Insert { table: String, row: String },
    /// Print matching rows as JSON lines
    Select {
        table: String,
        /// Comma-separated projection
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Overlay a JSON object onto matching rows
    Update {
        table: String,
        row: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Delete matching rows
    Delete {
        table: String,
        /// Delete every row (subject to --limit)
        #[arg(long, conflicts_with = "filters")]
        all: bool,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Run the sample `users` scenario
    Demo,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// `column=value` equality test; repeat to AND several. Values are read
    /// as JSON when they parse, as plain text otherwise.
    #[arg(long = "where", value_name = "COLUMN=VALUE", id = "filters")]
    pub filters: Vec<String>,

    /// Maximum number of rows to touch; negative means no limit
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub limit: i64,
}

pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

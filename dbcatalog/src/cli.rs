//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use dbcatalog_core::{OutputMode, TypeTarget};

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    /// JSON snapshot of the catalog
    Json,
    /// Single XML document
    Xml,
    /// Per-object file tree (.sql, .info.md, type definitions)
    Files,
    /// Pretty-printed dump to stdout
    Debug,
}

impl From<OutputArg> for OutputMode {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Json => OutputMode::Json,
            OutputArg::Xml => OutputMode::Xml,
            OutputArg::Files => OutputMode::Files,
            OutputArg::Debug => OutputMode::Debug,
        }
    }
}

/// Language of generated type definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TypeTargetArg {
    Go,
    Rust,
}

impl From<TypeTargetArg> for TypeTarget {
    fn from(arg: TypeTargetArg) -> Self {
        match arg {
            TypeTargetArg::Go => TypeTarget::Go,
            TypeTargetArg::Rust => TypeTarget::Rust,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "dbcatalog")]
#[command(about = "Database schema catalog and documentation export tool")]
#[command(version)]
#[command(long_about = "
dbcatalog - catalog tables, views, functions and procedures

Connects read-only to every database listed in the configuration file,
introspects all objects concurrently and exports the catalog.

OUTPUT MODES:
  json    Snapshot file (re-usable with --cached)
  xml     Single XML document
  files   <out-dir>/<database>/<schema>/<object>.{sql,info.md,go|rs}
  debug   Dump to stdout

EXAMPLES:
  dbcatalog --config config.yaml --output files --out-dir docs
  dbcatalog --output json --snapshot data.json
  dbcatalog --cached --snapshot data.json --output files
")]
pub struct Cli {
    /// YAML configuration file
    #[arg(long, value_name = "FILE", default_value = "config.yaml")]
    pub config: PathBuf,

    /// Output mode
    #[arg(long, value_enum, default_value_t = OutputArg::Debug)]
    pub output: OutputArg,

    /// Read the catalog from the snapshot instead of the live databases
    #[arg(long)]
    pub cached: bool,

    /// User template for info documents (overrides the config file)
    #[arg(long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Snapshot file written in json mode and read with --cached
    #[arg(long, value_name = "FILE", default_value = "data.json")]
    pub snapshot: PathBuf,

    /// XML document written in xml mode
    #[arg(long, value_name = "FILE", default_value = "data.xml")]
    pub xml: PathBuf,

    /// Root directory of the file tree
    #[arg(long, value_name = "DIR", default_value = "vcs")]
    pub out_dir: PathBuf,

    /// Language of generated type definitions
    #[arg(long, value_enum, default_value_t = TypeTargetArg::Go)]
    pub type_target: TypeTargetArg,

    /// Database password (overrides the config file)
    #[arg(long, env = "DBCATALOG_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all output except errors")]
    pub quiet: bool,
}

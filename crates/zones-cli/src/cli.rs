//! CLI argument definitions for the zone pipeline.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

use zones_model::SourceSpec;

#[derive(Parser)]
#[command(
    name = "zones",
    version,
    about = "Multi-zone tabular data pipeline",
    long_about = "Load csv, dta and xlsx files into a relational store, integrate\n\
                  versioned relations into canonical ones and resolve entity labels\n\
                  between sources."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store connection URL (sqlite://<path> or sqlite::memory:).
    #[arg(long = "database-url", value_name = "URL", global = true)]
    pub database_url: Option<String>,

    /// TOML pipeline configuration file.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load csv, dta and xlsx files (or whole directories) as relations.
    Load(LoadArgs),

    /// Merge the version relations of each source into its canonical relation.
    Integrate(IntegrateArgs),

    /// Match the labels of one column against another relation's column.
    Resolve(ResolveArgs),

    /// List relations with their size and duplication share.
    Relations,

    /// Run landing promotion, loading and integration from the config file.
    Run(RunArgs),
}

#[derive(Args)]
pub struct LoadArgs {
    /// Files or directories to load.
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Skip files whose relation already exists instead of replacing it.
    #[arg(long = "keep-existing")]
    pub keep_existing: bool,
}

#[derive(Args)]
pub struct IntegrateArgs {
    /// Sources as `name` or `name=canonical` (default: the config's sources).
    #[arg(value_name = "SOURCE")]
    pub sources: Vec<SourceSpec>,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Column whose labels are resolved, as RELATION.COLUMN.
    #[arg(long = "left", value_name = "REL.COL")]
    pub left: ColumnRef,

    /// Column holding the reference labels, as RELATION.COLUMN.
    #[arg(long = "right", value_name = "REL.COL")]
    pub right: ColumnRef,

    /// Rewrite the left column with the resolved labels and store the relation.
    #[arg(long = "apply")]
    pub apply: bool,
}

#[derive(Args)]
pub struct RunArgs {
    /// Zone root directory (overrides `root` in the config file).
    #[arg(long = "root", value_name = "DIR")]
    pub root: Option<PathBuf>,
}

/// A column of a stored relation, written `relation.column`.
///
/// The relation ends at the first dot; the column may contain dots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub relation: String,
    pub column: String,
}

impl FromStr for ColumnRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((relation, column)) if !relation.is_empty() && !column.is_empty() => Ok(Self {
                relation: relation.to_string(),
                column: column.to_string(),
            }),
            _ => Err(format!("expected RELATION.COLUMN, got {s:?}")),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.relation, self.column)
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

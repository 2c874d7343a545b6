use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bkl",
    about = "Bucketline: concurrent-safe appends and dated listings over an object store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the store's buckets
    #[arg(long, global = true, env = "BKL_ROOT")]
    pub root: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Append a payload to an object, creating it if needed
    Append(AppendArgs),
    /// Print an object's content
    Cat(CatArgs),
    /// Check whether an object exists (exit status 1 if not)
    Exists(ExistsArgs),
    /// List objects whose names embed a date
    Ls(LsArgs),
    /// Delete an object
    Rm(RmArgs),
}

#[derive(Args)]
pub struct AppendArgs {
    /// Destination, e.g. `file://bucket/prefix/name`
    pub url: String,
    /// Read the payload from this file instead of stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,
    /// Gzip the payload; the object gets a `.gz` suffix
    #[arg(long)]
    pub gzip: bool,
    /// Give up on contended composes after this many seconds
    #[arg(long)]
    pub max_backoff_secs: Option<u64>,
    /// Overall deadline for the append
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Args)]
pub struct CatArgs {
    pub url: String,
    /// Gunzip the content before printing
    #[arg(short, long)]
    pub decompress: bool,
}

#[derive(Args)]
pub struct ExistsArgs {
    pub url: String,
}

#[derive(Args)]
pub struct LsArgs {
    pub bucket: String,
    #[arg(long, default_value = "")]
    pub prefix: String,
    /// Regular expression with one capture group around a YYYYMMDD date
    #[arg(long)]
    pub pattern: String,
    /// Objects dated on or after YYYYMMDD
    #[arg(long, conflicts_with = "before", required_unless_present = "before")]
    pub since: Option<String>,
    /// Objects dated strictly before YYYYMMDD
    #[arg(long)]
    pub before: Option<String>,
}

#[derive(Args)]
pub struct RmArgs {
    pub url: String,
}

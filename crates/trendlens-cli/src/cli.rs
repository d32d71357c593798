//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trendlens_domain::Platform;

/// Trendlens - hot-search ingestion, LLM scoring and static reports.
#[derive(Debug, Parser)]
#[command(name = "trendlens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Platform to operate on
    #[arg(short, long, value_enum, global = true, default_value = "weibo")]
    pub source: SourceArg,

    /// Configuration file path (default: config/config.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// TianAPI key (highest-precedence override)
    #[arg(long, global = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Copy the generated HTML report to this path as well
    #[arg(short, long, global = true, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Data directory override
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<String>,

    /// How many topics from the top of the ranking to analyze
    #[arg(long, global = true, value_name = "N")]
    pub topic_count: Option<usize>,

    /// Log level override (error | warn | info | debug | trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Platform argument values.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SourceArg {
    /// Weibo trending search
    Weibo,
    /// Douyin trending search
    Douyin,
    /// WeChat trending topics
    Wechat,
}

impl From<SourceArg> for Platform {
    fn from(value: SourceArg) -> Self {
        match value {
            SourceArg::Weibo => Platform::Weibo,
            SourceArg::Douyin => Platform::Douyin,
            SourceArg::Wechat => Platform::Wechat,
        }
    }
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full fetch → analyze → report pipeline (the default)
    Run,

    /// Fetch the ranking and persist the raw snapshot only
    Fetch,

    /// Analyze the newest raw snapshot and write the JSON + HTML report
    Analyze,

    /// Regenerate the aggregate index page from reports on disk
    Index,

    /// Prune old raw snapshots and debug artifacts
    Cleanup(CleanupArgs),
}

/// Arguments for the cleanup command.
#[derive(Debug, Parser)]
pub struct CleanupArgs {
    /// Keep this many files of each managed class (default from config)
    #[arg(long, value_name = "N")]
    pub keep: Option<usize>,

    /// Log what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,
}

//! Command-line argument parsing for sockaudit
use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(name = "sockaudit")]
#[command(about = "Flag blacklisted network connections and the processes behind them", long_about = None)]
pub struct Cli {
    /// Path to JSON rule file (default: built-in rules)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<std::path::PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormatArg,

    /// Shorthand for --format json
    #[arg(short, long)]
    pub json: bool,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<std::path::PathBuf>,

    /// Number of workers used to map sockets to processes
    #[arg(short, long, default_value_t = default_workers(), value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: u16,

    /// Root of the proc filesystem to audit
    #[arg(long, value_name = "DIR", default_value = "/proc")]
    pub proc_root: std::path::PathBuf,

    /// Warn instead of failing when a connection table cannot be read
    #[arg(long)]
    pub skip_unreadable_tables: bool,

    /// Print the effective rule set and exit
    #[arg(short, long)]
    pub list_rules: bool,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,

    /// Enable verbose output (warnings, status messages)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Format after applying the `--json` shorthand
    pub fn output_format(&self) -> OutputFormatArg {
        if self.json {
            OutputFormatArg::Json
        } else {
            self.format
        }
    }
}

fn default_workers() -> u16 {
    crate::scan::DEFAULT_WORKERS as u16
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormatArg {
    Text,
    Csv,
    Json,
    Jsonl,
}

//! Main entry point for sockaudit
use anyhow::Context;
use clap::Parser;

use sockaudit::cli::args::{Cli, OutputFormatArg};
use sockaudit::formats::traits::{OutputDestination, OutputFormat, OutputWriter};
use sockaudit::progress::owner_spinner;
use sockaudit::rules::config::load_rules;
use sockaudit::rules::RuleSet;
use sockaudit::scan::{ScanContext, Scanner};

fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();
    init_logging(&cli);

    let rules = match &cli.config {
        Some(path) => load_rules(path)
            .with_context(|| format!("cannot load rules from {}", path.display()))?,
        None => RuleSet::builtin(),
    };

    // Determine output format and destination
    let output_format = match cli.output_format() {
        OutputFormatArg::Text => OutputFormat::Text,
        OutputFormatArg::Csv => OutputFormat::Csv,
        OutputFormatArg::Json => OutputFormat::Json,
        OutputFormatArg::Jsonl => OutputFormat::Jsonl,
    };

    let output_dest = if let Some(output_path) = &cli.output {
        OutputDestination::File(output_path.clone())
    } else {
        OutputDestination::Stdout
    };

    let output_writer = OutputWriter::new(output_format, output_dest);

    if cli.list_rules {
        output_writer.write_rules(&rules)?;
        return Ok(());
    }

    let mut context = ScanContext::new(rules);
    context.proc_root = cli.proc_root.clone();
    context.workers = usize::from(cli.workers);
    context.skip_unreadable_tables = cli.skip_unreadable_tables;
    let scanner = Scanner::new(context);

    let mut spinner = None;
    let result = scanner
        .run_with(|_| spinner = Some(owner_spinner(output_format == OutputFormat::Text)));
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let report = result.context("scan failed")?;

    output_writer.write_connections(&report.flagged)?;
    Ok(())
}

/// `RUST_LOG` wins over the command-line flags.
fn init_logging(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

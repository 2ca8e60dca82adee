use anyhow::Result;
use clap::Parser;
use gbench_hypothesis::{run, Cli, JsonReporter, Reporter, TerminalReporter};
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber; `-v` enables debug output.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let comparison = run(&cli)?;

    let reporter: Box<dyn Reporter> = if cli.json {
        Box::new(JsonReporter::new())
    } else if comparison.config.report.colors {
        Box::new(TerminalReporter::new())
    } else {
        Box::new(TerminalReporter::without_colors())
    };
    reporter.report(&comparison.verdicts)?;

    Ok(())
}

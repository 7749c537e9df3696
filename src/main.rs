use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use pyproj_test_discovery::cli;
use pyproj_test_discovery::discovery::{Discoverer, DiscoveryContext, TracingLogger};
use pyproj_test_discovery::logging::{self, Verbosity};
use pyproj_test_discovery::output::{write_output, OutputFormatter};

fn main() -> Result<()> {
    let args = cli::Args::parse();
    logging::init(Verbosity::from_flags(args.verbose, args.quiet));
    args.validate().context("Invalid arguments")?;

    let config = args.discovery_config()?;
    let mut context = DiscoveryContext::new();
    if let Some(filter) = args.test_filter()? {
        context = context.with_filter(filter);
    }

    let discoverer = Discoverer::new(config);
    let mut tests = Vec::new();
    let summary = discoverer
        .discover(&args.projects, &context, &TracingLogger, &mut tests)
        .context("Discovery failed")?;

    let output = OutputFormatter::format(&tests, &summary, args.format)
        .context("Failed to format output")?;
    write_output(args.output_file.as_deref(), &output)?;

    Ok(())
}

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod driver;
mod iterator;
mod link;
mod provider;
mod registry;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("gor_driver=debug,info")
    } else {
        EnvFilter::new("gor_driver=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        cli::Commands::Resolve(args) => {
            cli::resolve::run(args, config, cli.format, cli.verbose)?;
        }
        cli::Commands::Cat(args) => {
            cli::cat::run(args, config, cli.format, cli.verbose)?;
        }
        cli::Commands::Drivers => {
            cli::drivers::run(config, cli.format, cli.verbose)?;
        }
        cli::Commands::Config => {
            cli::config::run(config)?;
        }
    }

    Ok(())
}

use std::path::Path;

use crate::cli::OutputFormat;
use crate::registry::MatchPredicate;

/// Execute drivers subcommand
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub fn run(config: Option<&Path>, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = crate::cli::load_config(config)?;
    let registry = config.build_registry();

    if verbose {
        eprintln!(
            "{} driver(s) configured, max {} link hops",
            registry.len(),
            config.max_link_hops
        );
    }

    match format {
        OutputFormat::Text => {
            if registry.is_empty() {
                println!("No drivers configured");
            }
            for (i, (name, spec)) in registry
                .driver_names()
                .into_iter()
                .zip(&config.drivers)
                .enumerate()
            {
                println!("{:>3}. {:<6} {}", i + 1, name, describe(&spec.predicate));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config.drivers)?);
        }
        OutputFormat::Tsv => {
            println!("order\tdriver\tmatch");
            for (i, (name, spec)) in registry
                .driver_names()
                .into_iter()
                .zip(&config.drivers)
                .enumerate()
            {
                println!("{}\t{}\t{}", i + 1, name, describe(&spec.predicate));
            }
        }
    }

    Ok(())
}

fn describe(predicate: &MatchPredicate) -> String {
    match predicate {
        MatchPredicate::Any => "any".to_string(),
        MatchPredicate::Suffix(suffix) => format!("suffix {suffix}"),
        MatchPredicate::Prefix(prefix) => format!("prefix {prefix}"),
        MatchPredicate::Scheme(scheme) => format!("scheme {scheme}"),
    }
}

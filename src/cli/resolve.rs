use std::path::Path;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::reference::SourceReference;
use crate::core::resolved::ResolvedReference;
use crate::provider::SourceProvider;
use crate::utils::fd::count_open_files;

#[derive(Args)]
pub struct ResolveArgs {
    /// Reference to resolve (path, file:// URI, or .link file)
    #[arg(required = true)]
    pub reference: String,

    /// Resolve and check existence this many times, reporting descriptor growth
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,
}

/// Execute resolve subcommand
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the reference cannot
/// be resolved, or no driver accepts it.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(
    args: ResolveArgs,
    config: Option<&Path>,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let provider = crate::cli::build_provider(config)?;
    let reference = SourceReference::new(&args.reference);

    let before = count_open_files().ok();
    let mut outcome = check(&provider, &reference)?;
    for _ in 1..args.repeat {
        outcome = check(&provider, &reference)?;
    }
    let after = count_open_files().ok();

    if verbose {
        match (before, after) {
            (Some(before), Some(after)) => eprintln!(
                "Open files: {before} before, {after} after {} resolution(s)",
                args.repeat
            ),
            _ => eprintln!("Open file counting is not available on this platform"),
        }
    }

    match format {
        OutputFormat::Text => print_text(&args.reference, &outcome),
        OutputFormat::Json => print_json(&args.reference, &outcome, before, after)?,
        OutputFormat::Tsv => print_tsv(&args.reference, &outcome),
    }

    Ok(())
}

struct Outcome {
    resolved: ResolvedReference,
    driver: String,
    exists: bool,
}

fn check(provider: &SourceProvider, reference: &SourceReference) -> anyhow::Result<Outcome> {
    let mut source = provider.data_source(reference)?;
    let exists = source.exists()?;
    let resolved = source.reference().clone();
    source.close();

    let opened_as = if resolved.is_indirect() {
        resolved.terminal()
    } else {
        reference
    };
    let driver = provider.registry().dispatch(opened_as)?.name().to_string();

    Ok(Outcome {
        resolved,
        driver,
        exists,
    })
}

fn print_text(input: &str, outcome: &Outcome) {
    println!("Resolution");
    println!("{}", "=".repeat(60));
    println!("\nReference: {input}");
    println!("Hops: {}", outcome.resolved.hops());
    for (i, hop) in outcome.resolved.hop_chain().iter().enumerate() {
        println!("  {i}: {hop}");
    }
    println!("\nTerminal: {}", outcome.resolved.terminal());
    println!("Driver: {}", outcome.driver);
    println!("Exists: {}", outcome.exists);
}

fn print_json(
    input: &str,
    outcome: &Outcome,
    before: Option<usize>,
    after: Option<usize>,
) -> anyhow::Result<()> {
    let chain: Vec<&str> = outcome
        .resolved
        .hop_chain()
        .iter()
        .map(SourceReference::normalized)
        .collect();

    let output = serde_json::json!({
        "reference": input,
        "terminal": outcome.resolved.terminal().normalized(),
        "kind": outcome.resolved.terminal().kind(),
        "hop_chain": chain,
        "hops": outcome.resolved.hops(),
        "driver": outcome.driver,
        "exists": outcome.exists,
        "open_files": {
            "before": before,
            "after": after,
        },
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv(input: &str, outcome: &Outcome) {
    println!("reference\tterminal\thops\tdriver\texists");
    println!(
        "{}\t{}\t{}\t{}\t{}",
        input,
        outcome.resolved.terminal(),
        outcome.resolved.hops(),
        outcome.driver,
        outcome.exists,
    );
}

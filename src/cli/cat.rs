use std::io::{BufWriter, Write};
use std::path::Path;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::reference::SourceReference;
use crate::core::row::Row;

#[derive(Args)]
pub struct CatArgs {
    /// Reference to read (path, file:// URI, .link file, or N.mem)
    #[arg(required = true)]
    pub reference: String,

    /// Maximum number of rows to print
    #[arg(short = 'n', long)]
    pub max_rows: Option<usize>,

    /// Print the header line first (text and TSV output)
    #[arg(long)]
    pub header: bool,
}

/// Execute cat subcommand
///
/// # Errors
///
/// Returns an error if the reference cannot be opened for iteration or a
/// row cannot be read.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(
    args: CatArgs,
    config: Option<&Path>,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let provider = crate::cli::build_provider(config)?;
    let reference = SourceReference::new(&args.reference);
    let mut iterator = provider.create_iterator(&reference)?;
    let limit = args.max_rows.unwrap_or(usize::MAX);

    let mut rows: Vec<Row> = Vec::new();
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if args.header && !matches!(format, OutputFormat::Json) && !iterator.header().is_empty() {
        writeln!(out, "#{}", iterator.header().join("\t"))?;
    }

    let mut count = 0;
    while count < limit {
        let Some(row) = iterator.next() else {
            break;
        };
        let row = row?;
        count += 1;

        match format {
            OutputFormat::Json => rows.push(row),
            OutputFormat::Text | OutputFormat::Tsv => writeln!(out, "{}", row.to_line())?,
        }
    }

    let header = iterator.header().to_vec();
    iterator.close();

    if matches!(format, OutputFormat::Json) {
        let output = serde_json::json!({
            "reference": args.reference,
            "header": header,
            "rows": rows,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    }
    out.flush()?;

    if verbose {
        eprintln!("Read {count} row(s) from {}", reference);
    }

    Ok(())
}

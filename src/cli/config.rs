use std::path::Path;

/// Execute config subcommand
///
/// The configuration is always printed as JSON, in the same format that
/// `--config` accepts.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or serialized.
pub fn run(config: Option<&Path>) -> anyhow::Result<()> {
    let config = crate::cli::load_config(config)?;
    println!("{}", config.to_json()?);
    Ok(())
}

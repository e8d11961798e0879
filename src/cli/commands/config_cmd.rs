//! `lockit config` — show the effective configuration.

use crate::cli::output;
use crate::cli::{load_settings, Cli};
use crate::errors::Result;

/// Execute the `config` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;

    if cli.config.exists() {
        output::info(&format!("Loaded from {}", cli.config.display()));
    } else {
        output::info(&format!(
            "{} not found, using defaults",
            cli.config.display()
        ));
    }

    output::print_settings_table(&settings);
    Ok(())
}

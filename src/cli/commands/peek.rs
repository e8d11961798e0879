//! `lockit peek` — check a message without consuming it.

use crate::cli::output;
use crate::cli::{load_settings, server_address, Cli};
use crate::client::{Client, ShareLink};
use crate::errors::Result;

/// Execute the `peek` command.
pub async fn execute(cli: &Cli, link: &str) -> Result<()> {
    let settings = load_settings(cli)?;
    let link = ShareLink::parse(link)?;

    let address = server_address(cli, &settings);
    let mut client = Client::connect(&address).await?;
    let status = client.peek(&link.reference).await?;

    output::success("Message is available.");
    if status.password_required {
        output::info("A password is required to open it.");
    }
    if status.burn_after_reading {
        output::info("It will be destroyed after the first read.");
    }
    match status.expires_at {
        Some(at) => output::info(&format!(
            "Expires at {}",
            at.format("%Y-%m-%d %H:%M:%S UTC")
        )),
        None => output::info("No expiry set."),
    }

    Ok(())
}

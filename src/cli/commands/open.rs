//! `lockit open` — retrieve a message and decrypt it with the link's key.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{load_settings, password_from_env, prompt_password, server_address, Cli};
use crate::client::{Client, ShareLink};
use crate::crypto::decrypt;
use crate::errors::{LockitError, Result};

/// Password prompts offered before giving up.
const MAX_PASSWORD_ATTEMPTS: usize = 3;

/// Execute the `open` command.
pub async fn execute(cli: &Cli, link: &str, output_path: Option<&Path>) -> Result<()> {
    let settings = load_settings(cli)?;
    let link = ShareLink::parse(link)?;

    let address = server_address(cli, &settings);
    let mut client = Client::connect(&address).await?;

    // Failed password attempts never consume the message, so retrying
    // against the same reference is safe.
    let mut password = password_from_env();
    let mut attempts = 0;
    let delivery = loop {
        let result = client
            .retrieve(&link.reference, password.as_deref().map(String::as_str))
            .await;
        match result {
            Ok(delivery) => break delivery,
            Err(e @ (LockitError::PasswordRequired | LockitError::PasswordIncorrect))
                if attempts < MAX_PASSWORD_ATTEMPTS =>
            {
                if matches!(e, LockitError::PasswordIncorrect) {
                    output::warning("Incorrect password, try again.");
                } else {
                    output::notice("This message is password protected.");
                }
                attempts += 1;
                password = Some(prompt_password()?);
            }
            Err(e) => return Err(e),
        }
    };

    let content = match &link.key {
        Some(key) => decrypt(key, &delivery.payload)?,
        None => Zeroizing::new(delivery.payload),
    };

    match output_path {
        Some(path) => {
            std::fs::write(path, &*content)?;
            output::notice(&format!("Message written to {}", path.display()));
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&content)?;
            // Piped output stays byte-exact.
            if stdout.is_terminal() && !content.ends_with(b"\n") {
                stdout.write_all(b"\n")?;
            }
            stdout.flush()?;
        }
    }

    output::tip(&format!("Viewed {} time(s).", delivery.view_count));

    Ok(())
}

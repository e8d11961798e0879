//! `lockit send` — encrypt a message locally and upload the ciphertext.

use std::io::{self, IsTerminal, Read};
use std::path::Path;

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{load_settings, parse_ttl, prompt_new_password, server_address, Cli};
use crate::client::{Client, ShareLink};
use crate::crypto::{encrypt, generate_key};
use crate::errors::{LockitError, Result};

/// Options for `send`, straight from the command line.
pub struct SendArgs<'a> {
    pub file: Option<&'a Path>,
    pub ttl: Option<&'a str>,
    pub burn: bool,
    pub password: bool,
    pub raw: bool,
}

/// Execute the `send` command.
pub async fn execute(cli: &Cli, args: SendArgs<'_>) -> Result<()> {
    let settings = load_settings(cli)?;

    // Validate flags before asking for any input.
    let ttl_seconds = args.ttl.map(parse_ttl).transpose()?;

    let content = read_message(args.file)?;
    if content.iter().all(u8::is_ascii_whitespace) {
        return Err(LockitError::CommandFailed("message cannot be empty".into()));
    }

    let password = if args.password {
        Some(prompt_new_password()?)
    } else {
        None
    };

    // Encrypt locally; the key never leaves this process except in the link.
    let (payload, key) = if args.raw {
        (content.to_vec(), None)
    } else {
        let key = generate_key();
        (encrypt(&key[..], &content)?, Some(key))
    };

    let address = server_address(cli, &settings);
    let mut client = Client::connect(&address).await?;
    let receipt = client
        .create(
            payload,
            ttl_seconds,
            args.burn,
            password.as_deref().map(String::as_str),
        )
        .await?;

    let link = Zeroizing::new(ShareLink::format(
        &receipt.reference,
        key.as_ref().map(|k| &k[..]),
    ));
    println!("{}", link.as_str());

    match receipt.expires_at {
        Some(at) => output::notice(&format!(
            "Expires at {}",
            at.format("%Y-%m-%d %H:%M:%S UTC")
        )),
        None => output::notice("No expiry set"),
    }
    if args.burn {
        output::notice("The message is destroyed after the first read.");
    }
    if password.is_some() {
        output::tip("Share the password separately from the link.");
    }

    Ok(())
}

/// Read the message from a file, from piped stdin, or from a prompt.
fn read_message(file: Option<&Path>) -> Result<Zeroizing<Vec<u8>>> {
    if let Some(path) = file {
        return Ok(Zeroizing::new(std::fs::read(path)?));
    }

    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(Vec::new());
        io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }

    let text: String = dialoguer::Input::new()
        .with_prompt("Message")
        .interact_text()
        .map_err(|e| LockitError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(text.into_bytes()))
}

//! `lockit serve` — run the message server.

use crate::cli::{init_logging, load_settings, Cli};
use crate::errors::Result;
use crate::server::{Server, ServerConfig};
use crate::service::MessageService;

/// Execute the `serve` command.
pub async fn execute(cli: &Cli, bind: Option<&str>, log_level: Option<&str>) -> Result<()> {
    let mut settings = load_settings(cli)?;
    if let Some(bind) = bind {
        settings.bind_address = bind.to_string();
    }
    if let Some(level) = log_level {
        settings.log_level = level.to_string();
    }

    init_logging(&settings.log_level);
    tracing::info!(config = %cli.config.display(), "lockit server starting");

    let service = MessageService::from_settings(&settings)?;
    let server = Server::bind(ServerConfig::from_settings(&settings), service).await?;

    tracing::info!(
        address = %server.local_addr()?,
        max_payload_bytes = settings.max_payload_bytes,
        max_ttl_seconds = settings.max_ttl_seconds,
        "listening"
    );

    server.run().await?;

    tracing::info!("server stopped; all messages discarded");
    Ok(())
}

use clap::Parser;
use lockit::cli::commands::send::SendArgs;
use lockit::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // `serve` configures its own logging from the settings.
    if !matches!(cli.command, Commands::Serve { .. }) {
        lockit::cli::init_logging("warn");
    }

    let result = match cli.command {
        Commands::Serve {
            ref bind,
            ref log_level,
        } => {
            lockit::cli::commands::serve::execute(&cli, bind.as_deref(), log_level.as_deref())
                .await
        }
        Commands::Send {
            ref file,
            ref ttl,
            burn,
            password,
            raw,
        } => {
            let args = SendArgs {
                file: file.as_deref(),
                ttl: ttl.as_deref(),
                burn,
                password,
                raw,
            };
            lockit::cli::commands::send::execute(&cli, args).await
        }
        Commands::Open {
            ref link,
            ref output,
        } => lockit::cli::commands::open::execute(&cli, link, output.as_deref()).await,
        Commands::Peek { ref link } => lockit::cli::commands::peek::execute(&cli, link).await,
        Commands::Config => lockit::cli::commands::config_cmd::execute(&cli),
    };

    if let Err(e) = result {
        lockit::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

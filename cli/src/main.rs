mod commands;
mod config;

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use paylink::PaylinkClient;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub type Error = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(name = "paylink", version, about = "Create payment links and check their status")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Gateway access token, overrides the one in the config file
    #[arg(long, env = "PAYLINK_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a payment link from a JSON request file
    Create {
        /// File holding the request body (camelCase keys)
        request: PathBuf,
    },
    /// Check the status of a payment
    Status {
        reference: String,
        /// Keep polling until the payment is confirmed or failed
        #[arg(short, long)]
        watch: bool,
        /// Seconds between polls, overrides the config file
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,paylink=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", commands::describe(err.as_ref()));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let conf = config::Config::read(&cli.config)?;
    let client_config = conf.client_config(cli.access_token.clone())?;
    debug!(base_url = %client_config.base_url, "using gateway");
    let client = PaylinkClient::with_config(client_config)?;

    match cli.command {
        Command::Create { request } => commands::create(&client, &request).await,
        Command::Status {
            reference,
            watch,
            interval_secs,
        } => {
            if watch {
                let mut polling = conf.polling;
                if let Some(secs) = interval_secs {
                    polling.interval_secs = secs;
                }
                commands::watch(&client, &reference, &polling).await
            } else {
                commands::status(&client, &reference).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn arguments_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn access_token_flag_is_read() {
        let cli = Cli::try_parse_from([
            "paylink",
            "--access-token",
            "tok",
            "status",
            "OCPL-ABC123-XYZ9",
            "--watch",
        ])
        .unwrap();
        assert_eq!(cli.access_token.as_deref(), Some("tok"));
        assert!(matches!(cli.command, Command::Status { watch: true, .. }));
    }
}

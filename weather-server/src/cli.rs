use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::Password;
use weather_core::{Config, ProviderId};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather proxy with provider fallback")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP proxy (default).
    Serve {
        /// Listen address, overriding config and WEATHER_BIND_ADDR.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Store an API key for a provider in the config file.
    Configure {
        /// Provider short name, e.g. "weatherstack" or "openweathermap".
        provider: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Serve { bind: None }) {
            Command::Serve { bind } => {
                let mut config = Config::from_env()?;
                if let Some(bind) = bind {
                    config.server.bind = bind;
                }
                weather_server::serve(config).await
            }
            Command::Configure { provider } => configure(&provider),
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;

    let prompt = format!("API key for {id}:");
    let api_key = Password::new(&prompt)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let mut config = Config::load()?;
    config.upsert_provider_api_key(id, api_key.trim().to_string());
    let path = config.save()?;

    println!("Saved {id} API key to {}", path.display());
    println!("Hint: {} takes precedence when set.", id.api_key_env());
    Ok(())
}

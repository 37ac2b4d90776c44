use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::info;
use weather_core::{Config, WebhookRequest, config::API_KEY_ENV};
use weather_webhook::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-webhook", version, about = "Weather fulfillment webhook")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the webhook HTTP server.
    Serve {
        /// Bind address; overrides `server.host`.
        #[arg(long)]
        host: Option<String>,

        /// Port; overrides `server.port`.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Answer a single request locally and print the reply.
    Show {
        /// City name.
        city: String,

        /// Optional date: `2024-01-15`, an RFC 3339 timestamp, or a JSON object
        /// such as `{"year":2024,"month":1,"day":15}`. If absent, means "now".
        #[arg(long)]
        date: Option<String>,

        /// Print the whole response as JSON instead of the text only.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };

        match self.command {
            Command::Serve { host, port } => {
                let config = Config::load_from(&path)?;
                serve(&config, host, port).await
            }
            Command::Configure => configure(&path),
            Command::Show { city, date, json } => {
                let config = Config::load_from(&path)?;
                show(&config, city, date, json).await
            }
        }
    }
}

async fn serve(config: &Config, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let state = server::build_state(config)?;

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    info!(
        %addr,
        timeout_secs = config.openweather.timeout_secs,
        date_fallback = ?config.forecast.date_fallback,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    server::run(listener, state).await
}

fn configure(path: &Path) -> anyhow::Result<()> {
    // Read without env overrides so an exported key is never written to disk.
    let mut config = Config::read_file(path)?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key.trim().to_string());
    config.save_to(path)?;

    println!("Saved configuration to {}", path.display());
    println!("Tip: {API_KEY_ENV} overrides the stored key at runtime.");
    Ok(())
}

async fn show(config: &Config, city: String, date: Option<String>, json: bool) -> anyhow::Result<()> {
    let state = server::build_state(config)?;
    let request = WebhookRequest::new(city, date.map(parse_date_arg));

    let response = state.service.handle(&request).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.fulfillment_text);
    }
    Ok(())
}

/// JSON objects are passed through as structured dates, anything else as text.
fn parse_date_arg(raw: String) -> Value {
    if raw.trim_start().starts_with('{') {
        serde_json::from_str(&raw).unwrap_or(Value::String(raw))
    } else {
        Value::String(raw)
    }
}

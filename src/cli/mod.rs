pub mod commands;
pub mod utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, ClientConfig};

#[derive(Parser)]
#[command(name = "serves")]
#[command(about = "Serves CLI - diagnostics for the ServesPlatform mock API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Endpoint URL (overrides NEXT_PUBLIC_API_URL)")]
    pub url: Option<String>,

    #[arg(long, global = true, help = "Shared token (overrides NEXT_PUBLIC_API_TOKEN)")]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Request timeout in milliseconds (overrides API_TIMEOUT_MS)")]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run checks against the mock endpoint")]
    Diagnose {
        #[arg(long, help = "Email for authentication checks")]
        email: Option<String>,
        #[arg(long, help = "Password for authentication checks")]
        password: Option<String>,
        #[command(subcommand)]
        cmd: commands::diagnose::DiagnoseCommands,
    },

    #[command(about = "Audit environment variables and client configuration")]
    Env {
        #[command(subcommand)]
        cmd: commands::env::EnvCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

impl Cli {
    /// Environment-derived client settings with command-line overrides applied
    pub fn client_config(&self) -> ClientConfig {
        let mut client = AppConfig::from_env().client;
        if let Some(url) = &self.url {
            client.base_url = url.clone();
        }
        if let Some(token) = &self.token {
            client.token = token.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            client.timeout_ms = timeout_ms;
        }
        client
    }
}

/// Load `.env` from the working directory or its parents. Variables already set win.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client_config = cli.client_config();

    match cli.command {
        Commands::Diagnose { email, password, cmd } => {
            let credentials = commands::diagnose::credentials(email, password);
            commands::diagnose::handle(cmd, &client_config, credentials, output_format).await
        }
        Commands::Env { cmd } => commands::env::handle(cmd, &client_config, output_format).await,
    }
}

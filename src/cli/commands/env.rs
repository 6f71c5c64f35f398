use std::collections::HashMap;
use std::time::Duration;

use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{emit, print_audit, print_config_checks};
use crate::cli::OutputFormat;
use crate::config::ClientConfig;
use crate::diagnostic::env_audit::{self, default_specs, env_template, probe_connectivity, quick_check};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Subcommand)]
pub enum EnvCommands {
    #[command(about = "Audit every expected environment variable")]
    Verify {
        #[arg(long, help = "Also call whoami using the audited URL and token")]
        connect: bool,
    },

    #[command(about = "Quick presence check of critical variables")]
    Quick,

    #[command(about = "Check the configuration this CLI would use")]
    Config,
}

pub async fn handle(cmd: EnvCommands, client_config: &ClientConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let vars: HashMap<String, String> = std::env::vars().collect();

    match cmd {
        EnvCommands::Verify { connect } => {
            let specs = default_specs();
            let mut audit = env_audit::audit(&specs, &vars);
            if connect {
                audit.connectivity = Some(probe_connectivity(&vars, PROBE_TIMEOUT).await);
            }
            let template = env_template(&specs);
            emit(output_format, &audit, || print_audit(&audit, &template))
        }
        EnvCommands::Quick => {
            let report = quick_check(&vars);
            let value = json!(report
                .iter()
                .map(|(name, set)| json!({ "name": name, "set": set }))
                .collect::<Vec<_>>());
            emit(output_format, &value, || {
                println!("⚡ Quick Environment Check...");
                for (name, set) in &report {
                    let icon = if *set { "✅" } else { "❌" };
                    println!("{} {}: {}", icon, name, if *set { "SET" } else { "NOT SET" });
                }
            })
        }
        EnvCommands::Config => {
            let checks = env_audit::verify_client_config(client_config);
            emit(output_format, &checks, || print_config_checks(&checks))
        }
    }
}

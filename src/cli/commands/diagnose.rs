use clap::Subcommand;

use crate::cli::utils::{emit, print_outcome, print_outcomes, print_report};
use crate::cli::OutputFormat;
use crate::config::ClientConfig;
use crate::diagnostic::{Credentials, DiagnosticClient, Diagnostics, Transport};

#[derive(Subcommand)]
pub enum DiagnoseCommands {
    #[command(about = "Run the complete diagnostic suite")]
    Full,

    #[command(about = "Quick connectivity test (whoami)")]
    Quick,

    #[command(about = "Log in with the test credentials")]
    Auth,

    #[command(about = "Exercise list/get/create/update/delete on the materials table")]
    Materials,

    #[command(about = "Check that bad tokens and credentials are rejected")]
    Errors,

    #[command(about = "Send the token via GET, form, multipart and JSON POST")]
    Transports,

    #[command(about = "Call any action with arbitrary parameters")]
    Endpoint {
        #[arg(help = "Action name, e.g. crud, auth, whoami")]
        action: String,
        #[arg(long = "param", value_parser = parse_key_val, help = "Extra parameter as key=value (repeatable)")]
        params: Vec<(String, String)>,
        #[arg(long, value_enum, default_value_t = Transport::Get, help = "How to send parameters")]
        method: Transport,
    },
}

pub fn credentials(email: Option<String>, password: Option<String>) -> Credentials {
    let defaults = Credentials::default();
    Credentials {
        email: email.unwrap_or(defaults.email),
        password: password.unwrap_or(defaults.password),
    }
}

pub async fn handle(
    cmd: DiagnoseCommands,
    client_config: &ClientConfig,
    credentials: Credentials,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let client = DiagnosticClient::new(client_config)?;
    let diagnostics = Diagnostics::new(client, credentials);

    if output_format == OutputFormat::Text {
        println!("🔍 Target: {} (timeout {}ms)", client_config.base_url, client_config.timeout_ms);
    }

    match cmd {
        DiagnoseCommands::Full => {
            let report = diagnostics.run_full_diagnostic(client_config).await;
            emit(output_format, &report, || print_report(&report))
        }
        DiagnoseCommands::Quick => {
            let outcome = diagnostics.quick_test().await;
            emit(output_format, &outcome, || print_outcome(&outcome))
        }
        DiagnoseCommands::Auth => {
            let outcome = diagnostics.test_authentication().await;
            emit(output_format, &outcome, || print_outcome(&outcome))
        }
        DiagnoseCommands::Materials => {
            let outcomes = diagnostics.test_materials_crud().await;
            emit(output_format, &outcomes, || print_outcomes(&outcomes))
        }
        DiagnoseCommands::Errors => {
            let outcomes = diagnostics.test_error_handling().await;
            emit(output_format, &outcomes, || print_outcomes(&outcomes))
        }
        DiagnoseCommands::Transports => {
            let outcomes = diagnostics.test_transports().await;
            emit(output_format, &outcomes, || print_outcomes(&outcomes))
        }
        DiagnoseCommands::Endpoint { action, params, method } => {
            let outcome = diagnostics.test_endpoint(&action, params, method).await;
            emit(output_format, &outcome, || print_outcome(&outcome))
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid key=value: no '=' found in '{}'", s))?;
    if key.is_empty() {
        return Err(format!("invalid key=value: empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::client::{GatewayClient, HttpMethod};
use crate::AuthKind;

/// The main entry point for the `mbgate` binary.
pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let runtime = Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(execute(cli))
}

async fn execute(cli: Cli) -> Result<()> {
    let config = cli.connection.into_config()?;
    let client = GatewayClient::new(config)?;
    debug!(?client, "gateway client ready");

    match cli.command {
        Commands::Auth => {
            println!("{}", describe_auth(client.auth_kind()));
        }
        Commands::Check => {
            let user = client
                .current_user()
                .await
                .context("credential check against /api/user/current failed")?;
            println!("{}", describe_user(&user));
        }
        Commands::Call { method, path, body } => {
            let method: HttpMethod = method.parse()?;
            let body = body
                .map(|raw| serde_json::from_str::<Value>(&raw))
                .transpose()
                .context("--body must be valid JSON")?;
            let response = client.call(method, &path, body).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }
    Ok(())
}

fn describe_auth(kind: AuthKind) -> String {
    match kind {
        AuthKind::Login => format!("{kind} (login deferred until the first request)"),
        _ => format!("{kind} (established)"),
    }
}

fn describe_user(user: &Value) -> String {
    let field = |name: &str| user.get(name).and_then(Value::as_str).unwrap_or("?");
    let superuser = user
        .get("is_superuser")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    format!(
        "authenticated as {} {} <{}>{}",
        field("first_name"),
        field("last_name"),
        field("email"),
        if superuser { " [admin]" } else { "" }
    )
}

//! Console administration for users, roles and permissions.

#![forbid(unsafe_code)]

mod cli_config;
mod cli_services;
mod error;
mod shell;

use std::io;

use tracing::info;
use tracing_subscriber::EnvFilter;

use usermgmt_infrastructure::{connect, initialize};

use crate::cli_config::CliConfig;
use crate::cli_services::build_shell_services;
use crate::error::CliResult;
use crate::shell::Shell;

#[tokio::main(flavor = "current_thread")]
async fn main() -> CliResult<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = CliConfig::load()?;
    let pool = connect(config.database_url.as_str(), config.max_connections).await?;
    initialize(&pool, config.init_mode).await?;

    if config.reset_only {
        info!(database_url = %config.database_url, "database reset with demo data");
        return Ok(());
    }

    info!(
        database_url = %config.database_url,
        init_mode = config.init_mode.as_str(),
        "usermgmt console started"
    );

    let services = build_shell_services(pool.clone());
    let stdin = io::stdin();
    let mut shell = Shell::new(stdin.lock(), io::stdout(), services);
    let outcome = shell.run().await;

    pool.close().await;
    outcome
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

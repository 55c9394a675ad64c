pub(crate) mod cli;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use clap::Parser;

use crate::cli::Cli;
use crate::core::{config::Settings, state::AppState, telemetry};

/// Parses the command line, runs one command against MongoDB and closes the connection.
/// Returns `false` when the command reported a failed workflow outcome.
pub async fn run() -> anyhow::Result<bool> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if let Some(name) = cli.db_name.as_deref() {
        settings = settings.with_database_name(name)?;
    }
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let client = db::init_client(&settings).await?;
    let state = AppState::new(settings, client);

    tracing::debug!(
        database = %state.settings().database().name(),
        environment = %state.settings().runtime().environment.as_str(),
        "EduHub ready"
    );

    let result = cli::dispatch(&state, cli.command).await;
    state.close().await;

    if let Some(rendered) = core::metrics::render() {
        eprintln!("{rendered}");
    }

    result
}

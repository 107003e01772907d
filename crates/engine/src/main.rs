//! Pathwise Engine - Main entry point.
//!
//! Reads one JSON request from stdin and writes one `ResponseResult` JSON
//! document to stdout. Logs go to stderr.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pathwise_engine::infrastructure::{
    clock::SystemClock, config::EngineConfig, json_store::JsonFileStore,
};
use pathwise_engine::{api, App};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    load_dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pathwise_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = EngineConfig::from_env()?;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        max_pathway_items = config.limits.max_pathway_items,
        max_rules = config.limits.max_rules,
        max_template_parameters = config.limits.max_template_parameters,
        "Starting Pathwise Engine"
    );

    let store = JsonFileStore::open(&config.data_dir)
        .await
        .with_context(|| format!("failed to load rule store from {}", config.data_dir.display()))?;
    let app = App::with_store(Arc::new(store), Arc::new(SystemClock::new()), config.limits);

    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("failed to read request from stdin")?;

    let response = api::handle_json(&app, &input).await;
    let mut output = serde_json::to_string_pretty(&response).context("failed to encode response")?;
    output.push('\n');

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(output.as_bytes())
        .await
        .context("failed to write response")?;
    stdout.flush().await.context("failed to flush response")?;

    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Load `.env.local` then `.env` from the working directory or its parents.
fn load_dotenv() {
    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let _ = dotenvy::from_filename(filename);
    }
}

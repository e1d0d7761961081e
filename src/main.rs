//! # Sociostack
//!
//! Social media backend: accounts, posts, follows, notifications and
//! direct messages with a real-time relay.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - The repository backend (PostgreSQL or in-memory)
//! - Optional Redis relay fan-out
//! - HTTP/WebSocket server

use anyhow::Result;
use tracing::info;

use sociostack::config::Settings;
use sociostack::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    sociostack::telemetry::init_tracing();

    info!("Starting Sociostack...");

    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        backend = ?settings.database.backend,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!(addr = %application.local_addr()?, "Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}

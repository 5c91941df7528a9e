//! Headless entry point: restores a session if one exists, loads the
//! collections, and logs a dashboard summary. Rendering surfaces embed the
//! library crate instead of running this binary.

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use volttrack::app::{Action, App, Outcome};
use volttrack::errors::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (non-fatal, env vars can be set externally)
    dotenvy::dotenv().ok();

    // 3. Load the application configuration
    let config = volttrack::config::load_app_configuration()?;
    info!("Configured against {}", config.api_url);

    // 4. Build the application state and restore any persisted session
    let mut app = App::new(&config);
    if !app.startup().await {
        info!("No active session. Log in through a VoltTrack frontend to get started.");
        return Ok(());
    }

    // 5. Show the dashboard for the restored session
    if let Some(Outcome::Dashboard(summary)) = app.dispatch(Action::ShowDashboard).await {
        info!(
            "{} meters, {} readings, {:.1} units total, {:.1} units this month",
            summary.total_meters,
            summary.total_readings,
            summary.total_consumption,
            summary.month_consumption
        );
    }

    for notice in app.take_notices() {
        warn!("{notice}");
    }

    Ok(())
}

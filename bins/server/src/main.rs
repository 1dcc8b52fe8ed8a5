//! Declstat API Server
//!
//! Main entry point for the declaration statistics service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use declstat_api::{AppState, ReportSettings, create_router};
use declstat_db::connect;
use declstat_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "declstat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    let reporting = ReportSettings::from_config(&config.reporting, &config.export)?;
    info!(
        timezone = %reporting.timezone,
        test_prefix = %reporting.test_reference_prefix,
        max_daily_span_days = reporting.max_daily_span_days,
        export_directory = %reporting.export_directory.display(),
        "Report settings loaded"
    );

    let db = connect(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        min_connections = config.database.min_connections,
        "Connected to database"
    );

    let state = AppState {
        db: Arc::new(db),
        reporting: Arc::new(reporting),
    };
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

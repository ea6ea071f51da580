//! mailsink - development SMTP sink entry point

use anyhow::Result;
use mailsink_common::config::{Config, LoggingConfig};
use mailsink_core::SmtpServer;
use mailsink_storage::db::DatabasePool;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting mailsink...");

    // Initialize database and run migrations
    let db_pool = DatabasePool::new(&config.database).await?;
    db_pool.migrate().await?;

    // Start SMTP server
    let smtp_server = SmtpServer::with_database(config.smtp.clone(), db_pool.clone());
    let smtp_handle = tokio::spawn(async move {
        if let Err(e) = smtp_server.run().await {
            error!("SMTP server error: {}", e);
        }
    });

    // Start API server if enabled
    let api_handle = if config.api.enabled {
        let app = mailsink_api::create_router(db_pool.clone(), config.api.admin_token.clone());
        let addr = config.api.bind_address();
        if config.api.admin_token.is_none() {
            info!("No API admin token configured, admin routes are disabled");
        }

        Some(tokio::spawn(async move {
            let listener = match tokio::net::TcpListener::bind(&addr).await {
                Ok(listener) => listener,
                Err(e) => {
                    error!("Failed to bind API server on {}: {}", addr, e);
                    return;
                }
            };
            info!("API server listening on {}", addr);
            if let Err(e) = axum::serve(listener, app).await {
                error!("API server error: {}", e);
            }
        }))
    } else {
        info!("API server disabled");
        None
    };

    info!("mailsink started successfully");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    // Cleanup
    smtp_handle.abort();
    if let Some(handle) = api_handle {
        handle.abort();
    }
    db_pool.close().await;

    info!("mailsink shutdown complete");

    Ok(())
}

/// Set up the global subscriber
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    if config.format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_target(true).with_level(true))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_level(true))
            .init();
    }
}

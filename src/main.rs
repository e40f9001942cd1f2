use std::net::SocketAddr;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};

use triptrac::config::{DatabaseConfig, EnvironmentConfig};
use triptrac::services::trip_scheduler::spawn_auto_start;
use triptrac::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("🚚 TripTrac API ({})", config.environment);
    info!("================================================");

    let pool = match DatabaseConfig::from_env()?.create_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error connecting to the database: {}", e);
            return Err(anyhow::anyhow!("Database error: {}", e));
        }
    };
    info!("✅ Database pool ready");

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("✅ Migrations applied");
    }

    let state = AppState::postgres(pool, config.clone());

    let scheduler = config
        .auto_start_interval()
        .map(|every| spawn_auto_start(state.lifecycle(), every));

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("🌐 Server listening on {}", config.server_url());
    info!("🔍 Endpoints:");
    info!("   GET  /health");
    info!("   POST /api/auth/otp/issue | /api/auth/otp/verify | /api/auth/login");
    info!("   /api/customers, /api/trucks, /api/profiles");
    info!("   /api/trips, /api/trips/:id/status, /api/trips/auto-start, /api/trips/:id/profit");
    info!("   /api/maintenance, /api/reports/:entity");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some(handle) = scheduler {
        handle.abort();
    }

    if let Err(e) = served {
        error!("❌ Server error: {}", e);
        return Err(e.into());
    }

    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received");
}

use cadence::db::StreakStore;
use cadence_streak_core::SystemClock;
use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &cadence::config::CONFIG;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        loglevel = %cfg.basic.loglevel,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
    );

    if cfg.basic.cadence_key.trim().is_empty() {
        return Err("basic.cadence_key must be set and non-empty in config.toml".into());
    }

    let store: Arc<dyn StreakStore> = Arc::new(cadence::db::spawn(&cfg.basic.database_url).await);

    // Startup visibility: surface the tracking configuration the engine will
    // enforce, so a misconfigured opt-in list is obvious in the logs.
    {
        let store = store.clone();
        tokio::spawn(async move {
            match (store.tracking_mode().await, store.tracked_groups().await) {
                (Ok(mode), Ok(groups)) => {
                    info!(
                        mode = mode.as_str(),
                        tracked_groups = groups.len(),
                        "tracking configuration loaded"
                    );
                }
                (mode, groups) => {
                    warn!(
                        mode_err = mode.is_err(),
                        groups_err = groups.is_err(),
                        "failed to read tracking configuration at startup"
                    );
                }
            }
        });
    }

    let state = cadence::server::router::CadenceState::new(
        store,
        Arc::new(SystemClock),
        Arc::from(cfg.basic.cadence_key.as_str()),
    );
    let app = cadence::server::router::cadence_router(state);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { /* ... */ },
        _ = terminate => { /* ... */ },
    }
}

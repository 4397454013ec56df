use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wa_relay::config::{Config, PORT_ENV};
use wa_relay::http::build_router;
use wa_relay::lifecycle::{Lifecycle, RECONNECT_BASE};
use wa_relay::wa::WaClientFactory;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let factory = Arc::new(WaClientFactory::new(config.session_dir.clone()));
    let (lifecycle, events_rx) =
        Lifecycle::new(factory, config.session_dir.clone(), RECONNECT_BASE);
    lifecycle.spawn_event_loop(events_rx);

    // Bring the client up before the listener binds; readiness arrives via
    // the event loop.
    lifecycle.init_client(false).await;

    let app = build_router(Arc::clone(&lifecycle));

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            error!(
                "port {} is already in use; stop the other process or set {PORT_ENV}",
                config.port
            );
            std::process::exit(1);
        }
        Err(e) => {
            error!("failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    info!("wa-relay listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

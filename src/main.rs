// main.rs
// Axum server wiring: builds Config from the environment, initializes the
// MongoDB state and serves the JSON API on the configured port.

use std::{net::SocketAddr, sync::Arc};

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use cobranzas::{config::Config, routes, state};

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    let port = config.listen_port;

    let state = Arc::new(
        state::init_state(config)
            .await
            .expect("failed to initialize MongoDB state"),
    );

    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on http://{addr}");
    let listener = TcpListener::bind(addr).await.expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}

use std::net::SocketAddr;

use dobon::config;
use dobon::http::routes::AppState;
use dobon::room::RoomManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dobon::telemetry::init();

    let options = config::room_options();
    tracing::info!(timing = ?options.timing, test_hooks = options.test_hooks, "room options");
    let state = AppState { rooms: RoomManager::new(options) };

    let addr: SocketAddr = config::server_addr();
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, dobon::app(state)).await?;
    Ok(())
}

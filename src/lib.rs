//! Authoritative room server for Dobon, a UNO-like card game where a player
//! whose hand points equal the field card's points can call "dobon".

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod game;
pub mod http;
pub mod room;
pub mod telemetry;
pub mod util;
pub mod ws;

use crate::http::routes::{self, AppState};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(routes::healthz))
        .route("/rooms", post(routes::create_room))
        .route("/rooms/:id/ws", get(ws::connection::ws_handler))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

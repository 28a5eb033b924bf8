//! HTTP routes: room creation and health.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::room::manager::{CreatedRoom, RoomError, RoomManager};

#[derive(Clone)]
pub struct AppState {
    pub rooms: RoomManager,
}

pub async fn healthz() -> &'static str { "ok" }

pub async fn create_room(State(state): State<AppState>) -> (StatusCode, Json<CreatedRoom>) {
    (StatusCode::CREATED, Json(state.rooms.create_room()))
}

impl IntoResponse for RoomError {
    fn into_response(self) -> Response {
        let status = match self {
            RoomError::NotFound | RoomError::Closed => StatusCode::NOT_FOUND,
            RoomError::Full | RoomError::GameInProgress | RoomError::SessionInUse => StatusCode::CONFLICT,
        };
        (status, self.to_string()).into_response()
    }
}

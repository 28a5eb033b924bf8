//! WebSocket connection lifecycle management.

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, info};

use crate::http::routes::AppState;
use crate::room::{Intent, RoomHandle};
use crate::util::id::new_session_id;

use super::protocol::{view_for, ServerMessage};

#[derive(Deserialize)]
pub struct WsParams {
    pub name: Option<String>,
    /// Known session id to reconnect with.
    pub session: Option<String>,
}

pub async fn ws_handler(
    Path(room_id): Path<String>,
    State(state): State<AppState>,
    Query(WsParams { name, session }): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let room = match state.rooms.get(&room_id) {
        Ok(room) => room,
        Err(err) => return err.into_response(),
    };
    let session_id = session.filter(|s| !s.is_empty()).unwrap_or_else(new_session_id);
    let name = name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| "Player".to_string());
    ws.on_upgrade(move |socket| handle_socket(socket, room, session_id, name))
}

type Sink = SplitSink<WebSocket, Message>;

async fn send_json(sink: &mut Sink, message: &ServerMessage) -> anyhow::Result<()> {
    let text = serde_json::to_string(message)?;
    sink.send(Message::Text(text)).await?;
    Ok(())
}

async fn handle_socket(socket: WebSocket, room: RoomHandle, session_id: String, name: String) {
    let (mut sink, mut stream) = socket.split();

    let seat_id = match room.join(&session_id, &name).await {
        Ok(seat) => seat,
        Err(err) => {
            debug!(room_id = %room.room_id(), %session_id, %err, "join refused");
            let frame = CloseFrame { code: close_code::POLICY, reason: err.to_string().into() };
            let _ = sink.send(Message::Close(Some(frame))).await;
            return;
        }
    };
    info!(room_id = %room.room_id(), %session_id, seat_id, "ws connected");

    let welcome = ServerMessage::Welcome { session_id: session_id.clone(), seat_id };
    if send_json(&mut sink, &welcome).await.is_err() {
        room.leave(&session_id);
        return;
    }

    let mut updates = room.subscribe();
    let viewer = session_id.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            let view = view_for(&updates.borrow_and_update(), &viewer);
            if send_json(&mut sink, &ServerMessage::State { state: view }).await.is_err() {
                break;
            }
            if updates.changed().await.is_err() {
                break;
            }
        }
    });

    let reader = room.clone();
    let sender = session_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = stream.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<Intent>(&text) {
                    Ok(intent) => {
                        let leaving = matches!(intent, Intent::LeaveRoom);
                        if reader.send(&sender, intent).is_err() || leaving {
                            break;
                        }
                    }
                    Err(err) => debug!(session_id = %sender, %err, "unparseable message dropped"),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
    room.leave(&session_id);
    debug!(room_id = %room.room_id(), %session_id, "ws closed");
}

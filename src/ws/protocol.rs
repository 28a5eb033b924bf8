//! Outbound wire messages and per-viewer redaction.

use serde::Serialize;

use crate::game::GameState;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    Welcome {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(rename = "seatId")]
        seat_id: u8,
    },
    State { state: GameState },
}

/// What `viewer` is allowed to see: their own hand, everyone's counts. The
/// face-down first card stays hidden until it is revealed.
pub fn view_for(state: &GameState, viewer: &str) -> GameState {
    let mut view = state.clone();
    view.first_card = None;
    for (id, player) in view.players.iter_mut() {
        if id != viewer {
            player.hand.clear();
            player.playable_cards.clear();
        }
    }
    view
}

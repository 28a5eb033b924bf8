//! `dobon` declarations and the `dobonReturn` window.

use tracing::info;

use crate::game::state::DobonClaim;
use crate::game::{GameState, Rejected, SessionId};
use crate::room::clock::TimerKind;
use crate::room::core::GameRoom;

use super::{in_play, require, round};

pub fn validate_dobon(state: &GameState, session_id: &str) -> Result<SessionId, Rejected> {
    let player = in_play(state, session_id)?;
    require(player.can_dobon, "dobon")?;
    Ok(player.session_id.clone())
}

pub fn validate_return(state: &GameState, session_id: &str) -> Result<SessionId, Rejected> {
    let player = in_play(state, session_id)?;
    require(player.can_dobon_return, "dobonReturn")?;
    Ok(player.session_id.clone())
}

/// Opens a claim against whoever played the field card. If that player can
/// answer with a return the round waits for them; otherwise it settles now.
pub fn declare(room: &mut GameRoom, declarer: SessionId) {
    let state = &room.state;
    let field_points = state.field_card().map_or(0, |c| c.points);
    let target = state.field_card_owner_id.clone().filter(|owner| *owner != declarer);
    let can_answer = target
        .as_deref()
        .and_then(|id| state.player(id))
        .is_some_and(|p| p.hand_points() == field_points);

    info!(room_id = %state.room_id, %declarer, target = ?target, "dobon declared");
    if can_answer {
        room.state.pending_dobon = Some(DobonClaim { declarer, target });
        let window = room.options.timing.dobon_return_window;
        room.schedule(window, TimerKind::DobonReturnExpired);
        room.refresh();
    } else {
        round::settle(room, declarer, target, false);
    }
}

pub fn dobon_return(room: &mut GameRoom, returner: SessionId) {
    let Some(claim) = room.state.pending_dobon.take() else { return };
    info!(room_id = %room.state.room_id, %returner, declarer = %claim.declarer, "dobon returned");
    round::settle(room, returner, Some(claim.declarer), true);
}

/// The target let the window pass; the first declaration stands.
pub(crate) fn close_return_window(room: &mut GameRoom) {
    let Some(claim) = room.state.pending_dobon.take() else { return };
    round::settle(room, claim.declarer, claim.target, false);
}

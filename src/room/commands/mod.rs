//! Player commands. Each one is a validator over `&GameState` that returns a
//! plan, plus an executor that applies the plan to the room.

pub mod color;
pub mod dobon;
pub mod draw;
pub mod play;
pub mod round;
pub mod start;

use crate::game::{GameState, Phase, Player, Rejected};

/// The issuer's seat, provided the room is in play and they have not left.
pub(crate) fn in_play<'a>(state: &'a GameState, session_id: &str) -> Result<&'a Player, Rejected> {
    if state.phase != Phase::Playing {
        return Err(Rejected::WrongPhase(state.phase));
    }
    let player = state.player(session_id).ok_or(Rejected::NotSeated)?;
    if !player.is_connected {
        return Err(Rejected::Departed);
    }
    Ok(player)
}

pub(crate) fn require(flag: bool, action: &'static str) -> Result<(), Rejected> {
    if flag { Ok(()) } else { Err(Rejected::ActionUnavailable(action)) }
}

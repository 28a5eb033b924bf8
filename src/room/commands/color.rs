//! `chooseColor` after a wild or draw4.

use crate::game::{Color, GameState, Rejected, SessionId};
use crate::room::core::GameRoom;

use super::{in_play, require};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPlan {
    pub session_id: SessionId,
    pub color: Color,
}

pub fn validate(state: &GameState, session_id: &str, color: Color) -> Result<ColorPlan, Rejected> {
    let player = in_play(state, session_id)?;
    require(player.can_choose_color, "chooseColor")?;
    if color.is_wild() {
        return Err(Rejected::InvalidColor(color));
    }
    Ok(ColorPlan { session_id: session_id.to_string(), color })
}

/// The chooser keeps the turn only when naming the color of a revealed wild
/// before doing anything else.
pub fn execute(room: &mut GameRoom, plan: ColorPlan) {
    let state = &mut room.state;
    state.current_color = Some(plan.color);
    state.waiting_for_color_choice = false;

    let played_it = state.field_card_owner_id.as_deref() == Some(plan.session_id.as_str());
    if played_it || state.has_drawn_this_turn {
        state.advance_turn();
    }
    room.refresh();
}

//! `playCard`: normal plays, draw-stack counters and cut-ins.

use std::collections::HashSet;

use tracing::debug;

use crate::game::{effects, Card, GameState, Rejected, SessionId};
use crate::room::core::GameRoom;

use super::in_play;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayPlan {
    pub session_id: SessionId,
    pub card_ids: Vec<String>,
    pub cut_in: bool,
}

pub fn validate(state: &GameState, session_id: &str, card_ids: &[String]) -> Result<PlayPlan, Rejected> {
    let player = in_play(state, session_id)?;
    let (first, rest) = card_ids.split_first().ok_or(Rejected::NoCards)?;

    let mut seen = HashSet::new();
    for id in card_ids {
        if !seen.insert(id.as_str()) {
            return Err(Rejected::DuplicateCard(id.clone()));
        }
    }

    let lead = find(&player.hand, first)?;
    for id in rest {
        if find(&player.hand, id)?.value != lead.value {
            return Err(Rejected::MixedValues);
        }
    }
    if !player.can_play(first) {
        return Err(Rejected::NotPlayable(first.clone()));
    }

    Ok(PlayPlan {
        session_id: session_id.to_string(),
        card_ids: card_ids.to_vec(),
        cut_in: !state.is_current_turn(session_id),
    })
}

fn find<'a>(hand: &'a [Card], id: &str) -> Result<&'a Card, Rejected> {
    hand.iter().find(|c| c.id == id).ok_or_else(|| Rejected::NotInHand(id.to_string()))
}

pub fn execute(room: &mut GameRoom, plan: PlayPlan) {
    let state = &mut room.state;
    let Some(player) = state.player_mut(&plan.session_id) else { return };
    let played: Vec<Card> = plan.card_ids.iter().filter_map(|id| player.take_card(id)).collect();

    if plan.cut_in {
        debug!(room_id = %state.room_id, session_id = %plan.session_id, "cut-in");
    }
    state.field_cards.extend(played.iter().cloned());
    state.field_card_owner_id = Some(plan.session_id.clone());
    state.current_turn_player_id = Some(plan.session_id);
    state.has_drawn_this_turn = false;
    state.waiting_for_color_choice = false;
    if let Some(last) = played.last() {
        state.current_color = (!last.color.is_wild()).then_some(last.color);
    }

    for card in &played {
        effects::apply_on_play(state, card);
    }
    if !state.waiting_for_color_choice {
        state.advance_turn();
    }
    room.refresh();
}

//! Turn & legality engine: derives every player's action flags and playable
//! cards from the rest of the state. Run after every mutation.

use super::effects;
use super::state::{GameState, Phase};

/// Recomputes `can_*` flags and `playable_cards` for all players in one pass.
pub fn refresh(state: &mut GameState) {
    let field = state.field_card().cloned();
    let in_play = state.phase == Phase::Playing;
    let claim = state.pending_dobon.clone();
    let current = state.current_turn_player_id.clone();

    let waiting = state.waiting_for_color_choice;
    let draw_stack = state.draw_stack;
    let has_drawn = state.has_drawn_this_turn;
    let current_color = state.current_color;

    // The player who put a wild on the field names its color before anything
    // else happens, draw stack or not.
    let owes_color = waiting
        && current.is_some()
        && current == state.field_card_owner_id;
    let color_block = (waiting && draw_stack == 0) || owes_color;

    for (id, player) in state.players.iter_mut() {
        player.clear_actions();

        let Some(field) = field.as_ref() else { continue };
        if !in_play { continue; }

        let matches_field = player.hand_points() == field.points;

        if let Some(claim) = claim.as_ref() {
            player.can_dobon_return = claim.target.as_deref() == Some(id.as_str())
                && claim.declarer != *id
                && matches_field;
            continue;
        }

        let is_turn = current.as_deref() == Some(id.as_str());
        if is_turn {
            if color_block {
                player.can_choose_color = true;
            } else {
                player.can_draw = !waiting && draw_stack == 0 && !has_drawn;
                player.can_draw_stack = draw_stack > 0;
                player.can_choose_color = waiting;
                player.can_pass = has_drawn && !waiting && draw_stack == 0;
            }
        }

        if !color_block {
            for card in &player.hand {
                let legal = if !is_turn {
                    effects::can_cut_in(card, field)
                } else if draw_stack > 0 {
                    effects::can_play_on_draw_stack(card, field)
                } else {
                    effects::can_play(card, field, current_color)
                };
                if legal {
                    player.playable_cards.insert(card.id.clone(), true);
                }
            }
        }

        player.can_dobon = matches_field;
    }
}

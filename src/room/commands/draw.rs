//! `drawCard`, `drawStack` and `pass`.

use tracing::info;

use crate::game::{GameState, Rejected, SessionId};
use crate::room::core::GameRoom;

use super::{in_play, require, round};

pub fn validate_draw(state: &GameState, session_id: &str) -> Result<SessionId, Rejected> {
    let player = in_play(state, session_id)?;
    require(player.can_draw, "drawCard")?;
    Ok(player.session_id.clone())
}

pub fn validate_draw_stack(state: &GameState, session_id: &str) -> Result<SessionId, Rejected> {
    let player = in_play(state, session_id)?;
    require(player.can_draw_stack, "drawStack")?;
    Ok(player.session_id.clone())
}

pub fn validate_pass(state: &GameState, session_id: &str) -> Result<(), Rejected> {
    let player = in_play(state, session_id)?;
    require(player.can_pass, "pass")
}

/// Moves `count` cards from the deck into `session_id`'s hand. Returns false
/// if the deck ran dry first.
fn deal_to(room: &mut GameRoom, session_id: &str, count: u32) -> bool {
    for _ in 0..count {
        let Some(card) = room.draw_from_deck() else { return false };
        if let Some(player) = room.state.player_mut(session_id) {
            player.receive(card);
        }
    }
    true
}

pub fn draw_card(room: &mut GameRoom, session_id: &str) {
    if !deal_to(room, session_id, 1) {
        round::deck_out(room);
        return;
    }
    room.state.has_drawn_this_turn = true;
    room.refresh();
}

pub fn draw_stack(room: &mut GameRoom, session_id: &str) {
    let count = room.state.draw_stack;
    if !deal_to(room, session_id, count) {
        round::deck_out(room);
        return;
    }
    info!(room_id = %room.state.room_id, %session_id, count, "draw stack taken");

    let state = &mut room.state;
    state.draw_stack = 0;
    state.has_drawn_this_turn = true;
    if !state.waiting_for_color_choice {
        state.advance_turn();
    }
    room.refresh();
}

pub fn pass(room: &mut GameRoom) {
    room.state.advance_turn();
    room.refresh();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{CardValue, Color, Phase, RoundOutcome};
    use crate::room::intent::Intent;
    use crate::room::testing::*;

    #[test]
    fn draw_then_pass() {
        let mut room = playing_room(plain_deck());
        assert!(!room.state().players["a"].can_pass);
        assert_eq!(room.dispatch("a", Intent::Pass), Err(Rejected::ActionUnavailable("pass")));

        room.dispatch("a", Intent::DrawCard).unwrap();
        let a = &room.state().players["a"];
        assert_eq!(a.hand_count, 8);
        assert!(!a.can_draw);
        assert!(a.can_pass);
        assert_eq!(room.state().deck_count, 19);
        assert_eq!(room.dispatch("a", Intent::DrawCard), Err(Rejected::ActionUnavailable("drawCard")));

        room.dispatch("a", Intent::Pass).unwrap();
        assert_eq!(turn(&room), Some("b"));
        assert!(!room.state().has_drawn_this_turn);
        assert!(room.state().players["b"].can_draw);
    }

    #[test]
    fn drawn_card_can_still_be_played() {
        let mut room = playing_room(rigged(n("f", Color::Green, 9), &[vec![], vec![], vec![]], 3));
        assert!(room.state().players["a"].playable_cards.is_empty());

        room.dispatch("a", Intent::DrawCard).unwrap();
        assert!(room.state().players["a"].can_play("stock-2"));
        room.dispatch("a", Intent::PlayCard { card_ids: ids(&["stock-2"]) }).unwrap();
        assert_eq!(turn(&room), Some("b"));
        assert_eq!(room.state().current_color, Some(Color::Yellow));
    }

    #[test]
    fn only_the_turn_player_draws() {
        let mut room = playing_room(plain_deck());
        assert_eq!(room.dispatch("b", Intent::DrawCard), Err(Rejected::ActionUnavailable("drawCard")));
        assert_eq!(room.state().players["b"].hand_count, 7);
    }

    #[test]
    fn draw_stack_takes_everything_and_moves_on() {
        let deck = rigged(card("f", Color::Red, CardValue::Draw2), &[vec![], vec![], vec![]], 10);
        let mut room = playing_room(deck);
        room.dispatch("a", Intent::DrawStack).unwrap();

        let state = room.state();
        assert_eq!(state.players["a"].hand_count, 9);
        assert_eq!(state.draw_stack, 0);
        assert_eq!(turn(&room), Some("b"));
        assert!(state.players["b"].can_draw);
        assert_eq!(room.check_invariants(), Ok(()));
    }

    #[test]
    fn revealed_draw4_needs_both_the_stack_and_a_color() {
        let deck = rigged(card("f", Color::Wild, CardValue::Draw4), &[vec![], vec![], vec![]], 10);
        let mut room = playing_room(deck);
        room.dispatch("a", Intent::DrawStack).unwrap();

        // still owes the color
        assert_eq!(turn(&room), Some("a"));
        let a = &room.state().players["a"];
        assert_eq!(a.hand_count, 11);
        assert!(a.can_choose_color);
        assert!(!a.can_pass && !a.can_draw);

        room.dispatch("a", Intent::ChooseColor { color: Color::Green }).unwrap();
        assert_eq!(room.state().current_color, Some(Color::Green));
        assert_eq!(turn(&room), Some("b"));
    }

    #[test]
    fn empty_deck_ends_the_round_as_a_deck_out() {
        let mut room = playing_room(rigged(n("f", Color::Red, 5), &[vec![], vec![], vec![]], 0));
        assert_eq!(room.state().deck_count, 0);
        room.dispatch("a", Intent::DrawCard).unwrap();

        let state = room.state();
        assert_eq!(state.phase, Phase::Result);
        assert_eq!(state.consecutive_deckouts, 1);
        assert_eq!(state.rate_multiplier, 2);
        let result = state.game_history.last().unwrap();
        assert_eq!(result.outcome, RoundOutcome::DeckOut);
        assert!(result.score_changes.is_empty());
    }

    #[test]
    fn stack_running_dry_is_a_deck_out() {
        let deck = rigged(card("f", Color::Red, CardValue::Draw2), &[vec![], vec![], vec![]], 1);
        let mut room = playing_room(deck);
        room.dispatch("a", Intent::DrawStack).unwrap();
        assert_eq!(room.state().phase, Phase::Result);
        assert_eq!(room.state().players["a"].hand_count, 8);
        assert_eq!(room.check_invariants(), Ok(()));
    }
}

//! End of a round: scoring, deck-outs, the result screen and the way back to
//! the waiting room.

use std::collections::BTreeMap;

use time::OffsetDateTime;
use tracing::info;

use crate::game::{GameResult, Phase, RoundOutcome, SessionId};
use crate::room::clock::TimerKind;
use crate::room::core::GameRoom;

/// Pays out a dobon (or a return, at double rate). With no loser every other
/// player pays the winner.
pub fn settle(room: &mut GameRoom, winner: SessionId, loser: Option<SessionId>, returned: bool) {
    let state = &mut room.state;
    let field_points = state.field_card().map_or(0, |c| c.points).max(1);
    let mut payout = i64::from(field_points) * i64::from(state.rate_multiplier);
    if returned {
        payout *= 2;
    }

    let mut changes: BTreeMap<SessionId, i64> = BTreeMap::new();
    match &loser {
        Some(loser) => {
            changes.insert(loser.clone(), -payout);
            changes.insert(winner.clone(), payout);
        }
        None => {
            let payers: Vec<SessionId> = state.players.keys().filter(|id| **id != winner).cloned().collect();
            changes.insert(winner.clone(), payout * payers.len() as i64);
            for id in payers {
                changes.insert(id, -payout);
            }
        }
    }
    for (id, delta) in &changes {
        if let Some(player) = state.player_mut(id) {
            player.score += delta;
        }
    }

    let result = GameResult {
        game_number: state.game_number,
        outcome: if returned { RoundOutcome::DobonReturn } else { RoundOutcome::Dobon },
        winner_id: Some(winner.clone()),
        loser_id: loser,
        score_changes: changes,
        rate_multiplier: state.rate_multiplier,
        timestamp: now_millis(),
    };
    state.consecutive_deckouts = 0;
    state.rate_multiplier = 1;
    state.next_game_start_player_id = Some(winner);
    finish(room, result);
}

/// The deck ran dry: nobody scores and the next round is worth double.
pub fn deck_out(room: &mut GameRoom) {
    let state = &mut room.state;
    let result = GameResult {
        game_number: state.game_number,
        outcome: RoundOutcome::DeckOut,
        winner_id: None,
        loser_id: None,
        score_changes: BTreeMap::new(),
        rate_multiplier: state.rate_multiplier,
        timestamp: now_millis(),
    };
    state.consecutive_deckouts += 1;
    state.rate_multiplier = 2u32.saturating_pow(state.consecutive_deckouts);
    finish(room, result);
}

fn finish(room: &mut GameRoom, result: GameResult) {
    let state = &mut room.state;
    info!(
        room_id = %state.room_id,
        game_number = result.game_number,
        outcome = ?result.outcome,
        winner = ?result.winner_id,
        next_rate = state.rate_multiplier,
        "round finished"
    );
    state.game_history.push(result);
    state.phase = Phase::Result;
    state.pending_dobon = None;
    room.refresh();
    let delay = room.options.timing.result_delay;
    room.schedule(delay, TimerKind::ReturnToWaiting);
}

/// Back to the lobby. Seats of players who dropped mid-game are freed here.
pub(crate) fn return_to_waiting(room: &mut GameRoom) {
    let state = &mut room.state;
    state.phase = Phase::Waiting;
    state.dealing_round = 0;
    state.countdown = 0;
    for player in state.players.values_mut() {
        player.is_ready = false;
    }

    let gone: Vec<SessionId> = state.players.values().filter(|p| !p.is_connected).map(|p| p.session_id.clone()).collect();
    for id in gone {
        room.remove_player(&id);
    }
    room.refresh();
}

fn now_millis() -> i64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    i64::try_from(nanos / 1_000_000).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Color, DeckProvider};
    use crate::room::intent::Intent;
    use crate::room::testing::*;

    fn deck_out_round(room: &mut GameRoom) {
        room.set_deck_provider(DeckProvider::Fixed(rigged(n("f", Color::Red, 5), &[vec![], vec![], vec![]], 0)));
        room.dispatch("a", Intent::StartGame).unwrap();
        run_until(room, Phase::Playing);
        room.dispatch("a", Intent::DrawCard).unwrap();
        assert_eq!(room.state().phase, Phase::Result);
        assert!(fire(room, TimerKind::ReturnToWaiting));
    }

    #[test]
    fn consecutive_deck_outs_double_the_rate() {
        let mut room = room_with(&["a", "b", "c"]);
        deck_out_round(&mut room);
        assert_eq!(room.state().rate_multiplier, 2);
        deck_out_round(&mut room);
        assert_eq!(room.state().rate_multiplier, 4);
        assert_eq!(room.state().consecutive_deckouts, 2);
        assert_eq!(room.state().game_history.len(), 2);
        assert!(room.state().players.values().all(|p| p.score == 0));
    }

    #[test]
    fn rate_applies_to_the_next_dobon_and_resets() {
        let mut room = room_with(&["a", "b", "c"]);
        deck_out_round(&mut room);

        let deck = rigged(n("f", Color::Red, 5), &[vec![], vec![n("b5", Color::Blue, 5)], vec![]], 10);
        room.set_deck_provider(DeckProvider::Fixed(deck));
        room.dispatch("a", Intent::StartGame).unwrap();
        run_until(&mut room, Phase::Playing);
        room.dispatch("b", Intent::Dobon).unwrap();

        let state = room.state();
        let result = state.game_history.last().unwrap();
        assert_eq!(result.rate_multiplier, 2);
        assert_eq!(result.score_changes["b"], 20);
        assert_eq!(state.rate_multiplier, 1);
        assert_eq!(state.consecutive_deckouts, 0);
    }

    #[test]
    fn result_returns_to_waiting_and_frees_dropped_seats() {
        let mut room = playing_room(rigged(n("f", Color::Red, 5), &[vec![], vec![], vec![]], 0));
        room.dispatch("a", Intent::DrawCard).unwrap();
        assert_eq!(room.state().phase, Phase::Result);
        room.leave("a");
        assert!(room.state().player("a").is_some());

        assert!(fire(&mut room, TimerKind::ReturnToWaiting));
        let state = room.state();
        assert_eq!(state.phase, Phase::Waiting);
        assert!(state.player("a").is_none());
        assert!(state.players["b"].is_owner);
        assert!(state.players.values().all(|p| !p.is_ready));
        assert_eq!(room.check_invariants(), Ok(()));
    }
}

//! The per-room state machine. Synchronous on purpose: the actor feeds it one
//! message at a time and turns whatever it scheduled into real timers.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::RoomOptions;
use crate::game::state::MAX_PLAYERS;
use crate::game::{legality, Card, DeckProvider, GameState, InvariantViolation, Phase, Player, Rejected};

use super::clock::{Scheduled, TimerEvent, TimerKind};
use super::commands::{color, dobon, draw, play, round, start};
use super::intent::Intent;
use super::manager::RoomError;

pub struct GameRoom {
    pub(super) state: GameState,
    /// Server-side deck; only `state.deck_count` is public.
    pub(super) deck: Vec<Card>,
    pub(super) options: RoomOptions,
    /// Bumped at every start so timers from an earlier game are ignored.
    pub(super) epoch: u64,
    /// Cards in play since the last start, for the accounting check.
    pub(super) card_total: usize,
    scheduled: Vec<Scheduled>,
}

impl GameRoom {
    pub fn new(room_id: impl Into<String>, options: RoomOptions) -> Self {
        GameRoom {
            state: GameState::new(room_id),
            deck: Vec::new(),
            options,
            epoch: 0,
            card_total: 0,
            scheduled: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState { &self.state }

    pub fn room_id(&self) -> &str { &self.state.room_id }

    pub fn deck(&self) -> &[Card] { &self.deck }

    pub fn connected_players(&self) -> usize {
        self.state.players.values().filter(|p| p.is_connected).count()
    }

    /// Timers requested since the last call.
    pub fn take_scheduled(&mut self) -> Vec<Scheduled> { std::mem::take(&mut self.scheduled) }

    pub(super) fn schedule(&mut self, after: Duration, kind: TimerKind) {
        self.scheduled.push(Scheduled { after, event: TimerEvent { epoch: self.epoch, kind } });
    }

    /// Pops the tail of the deck and keeps the public mirror in sync.
    pub(super) fn draw_from_deck(&mut self) -> Option<Card> {
        let card = self.deck.pop();
        self.state.deck_count = self.deck.len();
        card
    }

    /// Asks the clock to close the room if it is still empty after the
    /// configured timeout.
    pub(super) fn schedule_empty_check(&mut self) {
        let timeout = self.options.timing.empty_room_timeout;
        self.schedule(timeout, TimerKind::EmptyRoomCheck);
    }

    /// Seats a new session, or reconnects a known one to its old seat.
    pub fn join(&mut self, session_id: &str, name: &str) -> Result<u8, RoomError> {
        if let Some(player) = self.state.player_mut(session_id) {
            if player.is_connected {
                return Err(RoomError::SessionInUse);
            }
            player.is_connected = true;
            let seat = player.seat_id;
            info!(room_id = %self.state.room_id, %session_id, seat, "player reconnected");
            return Ok(seat);
        }
        if self.state.phase != Phase::Waiting {
            return Err(RoomError::GameInProgress);
        }
        if self.state.players.len() >= MAX_PLAYERS {
            return Err(RoomError::Full);
        }
        let seat = self.state.next_free_seat().ok_or(RoomError::Full)?;
        let mut player = Player::new(session_id, name, seat);
        player.is_owner = self.state.players.is_empty();
        self.state.players.insert(session_id.to_string(), player);
        info!(room_id = %self.state.room_id, %session_id, seat, "player joined");
        Ok(seat)
    }

    /// While waiting the seat is freed; mid-game the player is only marked
    /// disconnected so they can come back to the same hand.
    pub fn leave(&mut self, session_id: &str) {
        if self.state.phase == Phase::Waiting {
            self.remove_player(session_id);
        } else if let Some(player) = self.state.player_mut(session_id) {
            player.is_connected = false;
            info!(room_id = %self.state.room_id, %session_id, "player disconnected mid-game");
        }
    }

    pub(super) fn remove_player(&mut self, session_id: &str) {
        let Some(mut player) = self.state.players.remove(session_id) else { return };
        // keep the card accounting whole
        self.state.discard_pile.append(&mut player.hand);
        if player.is_owner {
            if let Some(next) = self.state.players.values_mut().min_by_key(|p| p.seat_id) {
                next.is_owner = true;
                info!(room_id = %self.state.room_id, new_owner = %next.session_id, "ownership passed on");
            }
        }
        info!(room_id = %self.state.room_id, %session_id, "player left");
    }

    /// Validates `intent` against the current state and, only if valid,
    /// executes it. A rejection leaves the room untouched.
    pub fn dispatch(&mut self, session_id: &str, intent: Intent) -> Result<(), Rejected> {
        let name = intent.name();
        let result = match intent {
            Intent::StartGame => start::validate(&self.state, session_id).map(|()| start::start_game(self)),
            Intent::PlayCard { card_ids } => {
                play::validate(&self.state, session_id, &card_ids).map(|plan| play::execute(self, plan))
            }
            Intent::DrawCard => draw::validate_draw(&self.state, session_id).map(|sid| draw::draw_card(self, &sid)),
            Intent::DrawStack => {
                draw::validate_draw_stack(&self.state, session_id).map(|sid| draw::draw_stack(self, &sid))
            }
            Intent::Pass => draw::validate_pass(&self.state, session_id).map(|()| draw::pass(self)),
            Intent::ChooseColor { color } => {
                color::validate(&self.state, session_id, color).map(|plan| color::execute(self, plan))
            }
            Intent::Dobon => dobon::validate_dobon(&self.state, session_id).map(|sid| dobon::declare(self, sid)),
            Intent::DobonReturn => {
                dobon::validate_return(&self.state, session_id).map(|sid| dobon::dobon_return(self, sid))
            }
            Intent::ToggleReady => self.toggle_ready(session_id),
            Intent::LeaveRoom => {
                self.leave(session_id);
                Ok(())
            }
            Intent::SetDeck { cards } => self.set_deck(session_id, cards),
        };

        match &result {
            Ok(()) => debug!(room_id = %self.state.room_id, %session_id, intent = name, "intent applied"),
            Err(reason) => debug!(room_id = %self.state.room_id, %session_id, intent = name, %reason, "intent rejected"),
        }
        debug_assert_eq!(self.check_invariants(), Ok(()));
        result
    }

    /// Runs a timer callback. Stale or out-of-phase timers are dropped.
    pub fn on_timer(&mut self, event: TimerEvent) {
        if event.epoch != self.epoch {
            debug!(room_id = %self.state.room_id, ?event, "stale timer ignored");
            return;
        }
        let phase = self.state.phase;
        match (event.kind, phase) {
            (TimerKind::DealRound, Phase::Dealing) => start::deal_round(self),
            (TimerKind::StartCountdown, Phase::Dealing) => start::start_countdown(self),
            (TimerKind::CountdownTick, Phase::Countdown) => start::countdown_tick(self),
            (TimerKind::BeginPlay, Phase::Revealing) => start::begin_play(self),
            (TimerKind::DobonReturnExpired, Phase::Playing) => dobon::close_return_window(self),
            (TimerKind::ReturnToWaiting, Phase::Result) => round::return_to_waiting(self),
            (kind, phase) => debug!(room_id = %self.state.room_id, ?kind, ?phase, "timer does not apply"),
        }
        debug_assert_eq!(self.check_invariants(), Ok(()));
    }

    fn toggle_ready(&mut self, session_id: &str) -> Result<(), Rejected> {
        if self.state.phase != Phase::Waiting {
            return Err(Rejected::WrongPhase(self.state.phase));
        }
        let player = self.state.player_mut(session_id).ok_or(Rejected::NotSeated)?;
        player.is_ready = !player.is_ready;
        Ok(())
    }

    fn set_deck(&mut self, session_id: &str, cards: Vec<Card>) -> Result<(), Rejected> {
        if !self.options.test_hooks {
            return Err(Rejected::TestHooksDisabled);
        }
        if self.state.phase != Phase::Waiting {
            return Err(Rejected::WrongPhase(self.state.phase));
        }
        if self.state.player(session_id).is_none() {
            return Err(Rejected::NotSeated);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = cards.iter().find(|c| !seen.insert(c.id.as_str())) {
            return Err(Rejected::DuplicateCard(dup.id.clone()));
        }
        self.options.deck = DeckProvider::Fixed(cards);
        Ok(())
    }

    /// Direct deck injection for in-process callers (tests, tooling).
    pub fn set_deck_provider(&mut self, provider: DeckProvider) { self.options.deck = provider; }

    pub(super) fn refresh(&mut self) { legality::refresh(&mut self.state); }

    /// Checks card accounting, seating and the public mirrors.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let state = &self.state;

        if state.deck_count != self.deck.len() {
            return Err(InvariantViolation::DeckMirror { mirror: state.deck_count, actual: self.deck.len() });
        }
        for player in state.players.values() {
            if player.hand_count != player.hand.len() {
                return Err(InvariantViolation::HandMirror(player.session_id.clone()));
            }
        }

        if self.card_total > 0 {
            let found = self.deck.len()
                + state.hands_total()
                + state.field_cards.len()
                + state.discard_pile.len()
                + usize::from(state.first_card.is_some());
            if found != self.card_total {
                return Err(InvariantViolation::CardCount { expected: self.card_total, found });
            }

            let mut seen = HashSet::new();
            let all = self
                .deck
                .iter()
                .chain(state.players.values().flat_map(|p| p.hand.iter()))
                .chain(state.field_cards.iter())
                .chain(state.discard_pile.iter())
                .chain(state.first_card.iter());
            for card in all {
                if !seen.insert(card.id.as_str()) {
                    return Err(InvariantViolation::DuplicateId(card.id.clone()));
                }
            }
        }

        if !state.players.is_empty() {
            let owners = state.players.values().filter(|p| p.is_owner).count();
            if owners != 1 {
                return Err(InvariantViolation::OwnerCount(owners));
            }
        }

        if state.phase == Phase::Playing {
            let seated = state
                .current_turn_player_id
                .as_deref()
                .is_some_and(|id| state.players.contains_key(id));
            if !seated {
                return Err(InvariantViolation::TurnHolderMissing);
            }
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState { &mut self.state }

    #[cfg(test)]
    pub(crate) fn deck_mut(&mut self) -> &mut Vec<Card> { &mut self.deck }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Color;
    use crate::room::testing::*;

    #[test]
    fn first_joiner_owns_the_room() {
        let mut room = room_with(&["a", "b", "c"]);
        assert!(room.state().players["a"].is_owner);
        assert_eq!(room.state().players["b"].seat_id, 3);
        assert_eq!(room.state().players["c"].seat_id, 5);
        assert_eq!(room.join("d", "d"), Ok(2));
        assert_eq!(room.check_invariants(), Ok(()));
    }

    #[test]
    fn seventh_player_is_turned_away() {
        let mut room = room_with(&["a", "b", "c", "d", "e", "f"]);
        assert_eq!(room.join("g", "g"), Err(RoomError::Full));
    }

    #[test]
    fn owner_leaving_while_waiting_passes_ownership() {
        let mut room = room_with(&["a", "b", "c"]);
        room.leave("a");
        assert!(room.state().player("a").is_none());
        assert!(room.state().players["b"].is_owner);
        assert_eq!(room.check_invariants(), Ok(()));

        // freed seat 1 goes to the next newcomer
        assert_eq!(room.join("d", "d"), Ok(1));
    }

    #[test]
    fn leaving_mid_game_keeps_the_seat() {
        let mut room = playing_room(plain_deck());
        room.leave("b");
        let b = &room.state().players["b"];
        assert!(!b.is_connected);
        assert_eq!(b.hand_count, 7);

        assert_eq!(room.join("b", "b"), Ok(3));
        assert!(room.state().players["b"].is_connected);
    }

    #[test]
    fn newcomers_cannot_join_a_running_game() {
        let mut room = playing_room(plain_deck());
        assert_eq!(room.join("z", "z"), Err(RoomError::GameInProgress));
    }

    #[test]
    fn toggle_ready_flips_only_while_waiting() {
        let mut room = room_with(&["a", "b", "c"]);
        room.dispatch("b", Intent::ToggleReady).unwrap();
        assert!(room.state().players["b"].is_ready);
        room.dispatch("b", Intent::ToggleReady).unwrap();
        assert!(!room.state().players["b"].is_ready);
        assert_eq!(room.dispatch("nobody", Intent::ToggleReady), Err(Rejected::NotSeated));
    }

    #[test]
    fn set_deck_needs_test_hooks() {
        let mut room = GameRoom::new("r", RoomOptions::default());
        room.join("a", "a").unwrap();
        assert_eq!(
            room.dispatch("a", Intent::SetDeck { cards: vec![] }),
            Err(Rejected::TestHooksDisabled)
        );
    }

    #[test]
    fn set_deck_refuses_repeated_ids() {
        let mut room = room_with(&["a", "b", "c"]);
        let cards = vec![n("x", Color::Red, 1), n("y", Color::Blue, 2), n("x", Color::Green, 3)];
        assert_eq!(room.dispatch("a", Intent::SetDeck { cards }), Err(Rejected::DuplicateCard("x".into())));

        // the default deck is still in place, so a start deals normally
        room.dispatch("a", Intent::StartGame).unwrap();
        assert_eq!(room.card_total, crate::game::DECK_SIZE);
        assert_eq!(room.check_invariants(), Ok(()));
    }

    #[test]
    fn connected_session_cannot_join_twice() {
        let mut room = room_with(&["a", "b", "c"]);
        assert_eq!(room.join("b", "b"), Err(RoomError::SessionInUse));
        assert_eq!(room.state().players.len(), 3);

        let mut room = playing_room(plain_deck());
        assert_eq!(room.join("b", "b"), Err(RoomError::SessionInUse));
        room.leave("b");
        assert_eq!(room.join("b", "b"), Ok(3));
    }

    #[test]
    fn departed_player_cannot_act_until_reconnecting() {
        let mut room = playing_room(plain_deck());
        room.dispatch("a", Intent::LeaveRoom).unwrap();
        assert!(!room.state().players["a"].is_connected);
        assert_eq!(room.dispatch("a", Intent::DrawCard), Err(Rejected::Departed));
        assert_eq!(room.state().players["a"].hand_count, 7);

        room.join("a", "a").unwrap();
        room.dispatch("a", Intent::DrawCard).unwrap();
        assert_eq!(room.state().players["a"].hand_count, 8);
    }

    #[test]
    fn stale_timers_are_ignored() {
        let mut room = room_with(&["a", "b", "c"]);
        room.dispatch("a", Intent::StartGame).unwrap();
        let round = room.state().dealing_round;
        room.on_timer(TimerEvent { epoch: room.epoch - 1, kind: TimerKind::DealRound });
        assert_eq!(room.state().dealing_round, round);
    }

    #[test]
    fn invariant_check_catches_a_lost_card() {
        let mut room = playing_room(plain_deck());
        room.deck_mut().pop();
        room.state_mut().deck_count -= 1;
        assert!(matches!(room.check_invariants(), Err(InvariantViolation::CardCount { .. })));
    }

    #[test]
    fn invariant_check_catches_duplicate_ids() {
        let mut room = playing_room(plain_deck());
        let dup = room.state().field_cards[0].clone();
        room.deck_mut().pop();
        room.deck_mut().push(dup);
        assert!(matches!(room.check_invariants(), Err(InvariantViolation::DuplicateId(_))));
    }
}

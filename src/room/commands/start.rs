//! `startGame` and the timed run-up to play: dealing, countdown, reveal.

use tracing::info;

use crate::game::state::{COUNTDOWN_FROM, HAND_SIZE, MIN_PLAYERS};
use crate::game::{effects, GameState, Phase, Rejected};
use crate::room::clock::TimerKind;
use crate::room::core::GameRoom;

pub fn validate(state: &GameState, session_id: &str) -> Result<(), Rejected> {
    if state.phase != Phase::Waiting {
        return Err(Rejected::WrongPhase(state.phase));
    }
    let player = state.player(session_id).ok_or(Rejected::NotSeated)?;
    if !player.is_owner {
        return Err(Rejected::NotOwner);
    }
    let seated = state.players.len();
    if seated < MIN_PLAYERS {
        return Err(Rejected::NotEnoughPlayers { needed: MIN_PLAYERS, seated });
    }
    Ok(())
}

pub fn start_game(room: &mut GameRoom) {
    room.epoch += 1;
    room.deck = room.options.deck.provide();
    room.card_total = room.deck.len();

    let state = &mut room.state;
    state.game_number += 1;
    state.phase = Phase::Dealing;
    state.dealing_round = 0;
    state.countdown = 0;
    state.first_card = None;
    state.deck_count = room.deck.len();
    state.discard_pile.clear();
    state.field_cards.clear();
    state.field_card_owner_id = None;
    state.current_color = None;
    state.turn_direction = 1;
    state.draw_stack = 0;
    state.waiting_for_color_choice = false;
    state.has_drawn_this_turn = false;
    state.pending_dobon = None;
    for player in state.players.values_mut() {
        player.clear_hand();
        player.clear_actions();
    }

    let starter = state
        .next_game_start_player_id
        .clone()
        .filter(|id| state.players.contains_key(id))
        .or_else(|| state.owner_id().cloned());
    state.current_turn_player_id = starter.clone();
    state.next_game_start_player_id = starter;

    info!(
        room_id = %state.room_id,
        game_number = state.game_number,
        players = state.players.len(),
        starter = ?state.current_turn_player_id,
        "game started"
    );
    deal_round(room);
}

/// One card to every player in seat order. The seventh round also turns up
/// the first card and hands over to the countdown.
pub(crate) fn deal_round(room: &mut GameRoom) {
    room.state.dealing_round += 1;
    for id in room.state.seat_order() {
        let Some(card) = room.draw_from_deck() else { break };
        if let Some(player) = room.state.player_mut(&id) {
            player.receive(card);
        }
    }

    let timing = room.options.timing;
    if usize::from(room.state.dealing_round) < HAND_SIZE {
        room.schedule(timing.deal_interval, TimerKind::DealRound);
    } else {
        room.state.first_card = room.draw_from_deck();
        room.schedule(timing.deal_complete_delay, TimerKind::StartCountdown);
    }
}

pub(crate) fn start_countdown(room: &mut GameRoom) {
    room.state.phase = Phase::Countdown;
    room.state.countdown = COUNTDOWN_FROM;
    let interval = room.options.timing.countdown_interval;
    room.schedule(interval, TimerKind::CountdownTick);
}

pub(crate) fn countdown_tick(room: &mut GameRoom) {
    room.state.countdown = room.state.countdown.saturating_sub(1);
    if room.state.countdown == 0 {
        reveal(room);
    } else {
        let interval = room.options.timing.countdown_interval;
        room.schedule(interval, TimerKind::CountdownTick);
    }
}

fn reveal(room: &mut GameRoom) {
    let state = &mut room.state;
    state.phase = Phase::Revealing;
    if let Some(card) = state.first_card.take() {
        state.current_color = (!card.color.is_wild()).then_some(card.color);
        state.field_cards.push(card.clone());
        effects::apply_on_reveal(state, &card);
        info!(room_id = %state.room_id, card = %card.id, "first card revealed");
    }
    let delay = room.options.timing.reveal_delay;
    room.schedule(delay, TimerKind::BeginPlay);
}

pub(crate) fn begin_play(room: &mut GameRoom) {
    room.state.phase = Phase::Playing;
    if let Some(card) = room.state.field_card().cloned() {
        effects::apply_on_begin_play(&mut room.state, &card);
    }
    room.refresh();
}

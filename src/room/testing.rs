//! Fixtures for driving a `GameRoom` synchronously in unit tests.

use crate::config::RoomOptions;
use crate::game::state::HAND_SIZE;
use crate::game::{Card, CardValue, Color, DeckProvider, Phase};

use super::clock::TimerKind;
use super::core::GameRoom;
use super::intent::Intent;

pub fn options() -> RoomOptions { RoomOptions { test_hooks: true, ..RoomOptions::default() } }

pub fn n(id: &str, color: Color, v: u8) -> Card { Card::new(id, color, CardValue::Number(v)) }

pub fn card(id: &str, color: Color, value: CardValue) -> Card { Card::new(id, color, value) }

/// Seats `ids` in order; the first becomes owner.
pub fn room_with(ids: &[&str]) -> GameRoom {
    let mut room = GameRoom::new("test-room", options());
    for id in ids {
        room.join(id, id).unwrap();
    }
    room
}

/// A deck that deals `hands` (in seat order) and then turns up `first`.
/// Short hands are padded with zero-point yellow cards; `stock` yellow 9s sit
/// underneath for drawing.
pub fn rigged(first: Card, hands: &[Vec<Card>], stock: usize) -> Vec<Card> {
    let padded: Vec<Vec<Card>> = hands
        .iter()
        .enumerate()
        .map(|(p, hand)| {
            let mut hand = hand.clone();
            for k in hand.len()..HAND_SIZE {
                hand.push(n(&format!("pad-{p}-{k}"), Color::Yellow, 0));
            }
            hand
        })
        .collect();

    // order in which cards come off the tail
    let mut pops = Vec::new();
    for round in 0..HAND_SIZE {
        for hand in &padded {
            pops.push(hand[round].clone());
        }
    }
    pops.push(first);

    let mut deck: Vec<Card> = (0..stock).map(|i| n(&format!("stock-{i}"), Color::Yellow, 9)).collect();
    deck.extend(pops.into_iter().rev());
    deck
}

/// Red 5 on the field, three hands of zero-point padding.
pub fn plain_deck() -> Vec<Card> { rigged(n("field", Color::Red, 5), &[vec![], vec![], vec![]], 20) }

/// Fires scheduled timers in order until `phase` is reached or nothing is left.
pub fn run_until(room: &mut GameRoom, phase: Phase) {
    while room.state().phase != phase {
        let scheduled = room.take_scheduled();
        if scheduled.is_empty() {
            break;
        }
        for s in scheduled {
            room.on_timer(s.event);
        }
    }
}

/// Fires the first pending timer of `kind`, dropping the rest.
pub fn fire(room: &mut GameRoom, kind: TimerKind) -> bool {
    let pending = room.take_scheduled();
    match pending.into_iter().find(|s| s.event.kind == kind) {
        Some(s) => {
            room.on_timer(s.event);
            true
        }
        None => false,
    }
}

/// Three players `a`, `b`, `c` (seats 1, 3, 5) playing on `deck`; `a` starts.
pub fn playing_room(deck: Vec<Card>) -> GameRoom {
    let mut room = room_with(&["a", "b", "c"]);
    room.set_deck_provider(DeckProvider::Fixed(deck));
    room.dispatch("a", Intent::StartGame).unwrap();
    run_until(&mut room, Phase::Playing);
    assert_eq!(room.state().phase, Phase::Playing);
    room
}

pub fn hand_ids(room: &GameRoom, id: &str) -> Vec<String> {
    room.state().players[id].hand.iter().map(|c| c.id.clone()).collect()
}

pub fn turn(room: &GameRoom) -> Option<&str> { room.state().current_turn_player_id.as_deref() }

pub fn ids(list: &[&str]) -> Vec<String> { list.iter().map(|s| s.to_string()).collect() }

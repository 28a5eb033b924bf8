//! Canonical per-room game state. Everything here is what clients get to see
//! (hands are redacted per viewer by the transport).

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::card::{Card, Color};

pub type SessionId = String;

pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 6;
pub const HAND_SIZE: usize = 7;
pub const COUNTDOWN_FROM: u8 = 3;

/// Seats are handed out in this order so that small tables spread around.
pub const SEAT_PRIORITY: [u8; MAX_PLAYERS] = [1, 3, 5, 2, 4, 6];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Waiting,
    Dealing,
    Countdown,
    Revealing,
    Playing,
    Result,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub session_id: SessionId,
    pub name: String,
    pub seat_id: u8,
    pub hand: Vec<Card>,
    pub hand_count: usize,
    pub score: i64,
    pub is_owner: bool,
    pub is_connected: bool,
    pub is_ready: bool,
    pub can_draw: bool,
    pub can_draw_stack: bool,
    pub can_choose_color: bool,
    pub can_pass: bool,
    pub can_dobon: bool,
    pub can_dobon_return: bool,
    pub playable_cards: BTreeMap<String, bool>,
}

impl Player {
    pub fn new(session_id: impl Into<SessionId>, name: impl Into<String>, seat_id: u8) -> Self {
        Player {
            session_id: session_id.into(),
            name: name.into(),
            seat_id,
            is_connected: true,
            ..Default::default()
        }
    }

    pub fn hand_points(&self) -> u32 { self.hand.iter().map(|c| c.points).sum() }

    pub fn holds(&self, card_id: &str) -> bool { self.hand.iter().any(|c| c.id == card_id) }

    pub fn receive(&mut self, card: Card) {
        self.hand.push(card);
        self.hand_count = self.hand.len();
    }

    pub fn take_card(&mut self, card_id: &str) -> Option<Card> {
        let idx = self.hand.iter().position(|c| c.id == card_id)?;
        let card = self.hand.remove(idx);
        self.hand_count = self.hand.len();
        Some(card)
    }

    pub fn clear_hand(&mut self) {
        self.hand.clear();
        self.hand_count = 0;
    }

    pub fn clear_actions(&mut self) {
        self.can_draw = false;
        self.can_draw_stack = false;
        self.can_choose_color = false;
        self.can_pass = false;
        self.can_dobon = false;
        self.can_dobon_return = false;
        self.playable_cards.clear();
    }

    pub fn can_play(&self, card_id: &str) -> bool {
        self.playable_cards.get(card_id).copied().unwrap_or(false)
    }
}

/// An open dobon declaration waiting for a possible return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DobonClaim {
    pub declarer: SessionId,
    /// Whoever played the field card; `None` for the revealed card.
    pub target: Option<SessionId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundOutcome {
    Dobon,
    DobonReturn,
    DeckOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub game_number: u32,
    pub outcome: RoundOutcome,
    pub winner_id: Option<SessionId>,
    pub loser_id: Option<SessionId>,
    pub score_changes: BTreeMap<SessionId, i64>,
    pub rate_multiplier: u32,
    /// Unix milliseconds.
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub room_id: String,
    pub phase: Phase,
    pub players: HashMap<SessionId, Player>,

    pub dealing_round: u8,
    pub countdown: u8,
    pub first_card: Option<Card>,

    pub deck_count: usize,
    pub discard_pile: Vec<Card>,
    pub field_cards: Vec<Card>,
    pub field_card_owner_id: Option<SessionId>,
    pub current_color: Option<Color>,
    pub current_turn_player_id: Option<SessionId>,
    pub turn_direction: i8,

    pub draw_stack: u32,

    pub rate_multiplier: u32,
    pub consecutive_deckouts: u32,
    pub next_game_start_player_id: Option<SessionId>,

    pub waiting_for_color_choice: bool,
    pub has_drawn_this_turn: bool,
    pub pending_dobon: Option<DobonClaim>,

    pub game_number: u32,
    pub game_history: Vec<GameResult>,
}

impl GameState {
    pub fn new(room_id: impl Into<String>) -> Self {
        GameState {
            room_id: room_id.into(),
            phase: Phase::Waiting,
            players: HashMap::new(),
            dealing_round: 0,
            countdown: 0,
            first_card: None,
            deck_count: 0,
            discard_pile: Vec::new(),
            field_cards: Vec::new(),
            field_card_owner_id: None,
            current_color: None,
            current_turn_player_id: None,
            turn_direction: 1,
            draw_stack: 0,
            rate_multiplier: 1,
            consecutive_deckouts: 0,
            next_game_start_player_id: None,
            waiting_for_color_choice: false,
            has_drawn_this_turn: false,
            pending_dobon: None,
            game_number: 0,
            game_history: Vec::new(),
        }
    }

    /// The active field card (last entry of `field_cards`).
    pub fn field_card(&self) -> Option<&Card> { self.field_cards.last() }

    pub fn player(&self, id: &str) -> Option<&Player> { self.players.get(id) }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> { self.players.get_mut(id) }

    pub fn is_current_turn(&self, id: &str) -> bool {
        self.current_turn_player_id.as_deref() == Some(id)
    }

    pub fn owner_id(&self) -> Option<&SessionId> {
        self.players.values().find(|p| p.is_owner).map(|p| &p.session_id)
    }

    pub fn players_by_seat(&self) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.players.values().collect();
        players.sort_by_key(|p| p.seat_id);
        players
    }

    /// Session ids in seat order (ascending seat number).
    pub fn seat_order(&self) -> Vec<SessionId> {
        self.players_by_seat().into_iter().map(|p| p.session_id.clone()).collect()
    }

    pub fn next_free_seat(&self) -> Option<u8> {
        SEAT_PRIORITY
            .into_iter()
            .find(|seat| !self.players.values().any(|p| p.seat_id == *seat))
    }

    /// Moves the turn one seat along `turn_direction`, wrapping around the table.
    pub fn advance_turn(&mut self) {
        let order = self.seat_order();
        if order.is_empty() {
            self.current_turn_player_id = None;
            return;
        }
        let len = order.len() as i64;
        let current = self
            .current_turn_player_id
            .as_ref()
            .and_then(|id| order.iter().position(|s| s == id))
            .unwrap_or(0) as i64;
        let next = (current + i64::from(self.turn_direction)).rem_euclid(len) as usize;
        self.current_turn_player_id = Some(order[next].clone());
        self.has_drawn_this_turn = false;
    }

    pub fn hands_total(&self) -> usize { self.players.values().map(|p| p.hand.len()).sum() }
}

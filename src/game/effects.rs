//! Per-value card behavior.
//!
//! Every card value maps to one static [`CardEffect`] record through an
//! exhaustive `match`, so a rule change for one value stays local to its
//! record and adding a value does not compile until it has one.

use super::card::{Card, CardValue, Color};
use super::state::{GameState, Player};

/// What an effect may touch while it runs.
pub struct EffectContext<'a> {
    pub state: &'a mut GameState,
    pub card: &'a Card,
}

impl<'a> EffectContext<'a> {
    pub fn new(state: &'a mut GameState, card: &'a Card) -> Self { Self { state, card } }

    pub fn players_by_seat(&self) -> Vec<&Player> { self.state.players_by_seat() }

    pub fn advance_turn(&mut self) { self.state.advance_turn(); }
}

type Hook = fn(&mut EffectContext<'_>);

/// Behavior record for one card value.
pub struct CardEffect {
    /// Runs when the card is turned up as the first field card.
    pub on_reveal: Hook,
    /// Runs once when play begins on top of the revealed card.
    pub on_begin_play: Hook,
    /// Runs for each copy of the card a player puts on the field.
    pub on_play: Hook,
    pub can_play: fn(card: &Card, field: &Card, current_color: Option<Color>) -> bool,
    pub can_play_on_draw_stack: fn(card: &Card, field: &Card) -> bool,
    pub can_cut_in: fn(card: &Card, field: &Card) -> bool,
}

fn nothing(_: &mut EffectContext<'_>) {}

fn color_or_value_match(card: &Card, field: &Card, current_color: Option<Color>) -> bool {
    current_color == Some(card.color) || card.value == field.value
}

fn always(_: &Card, _: &Card, _: Option<Color>) -> bool { true }

fn never_on_stack(_: &Card, _: &Card) -> bool { false }

fn exact_match(card: &Card, field: &Card) -> bool {
    card.color == field.color && card.value == field.value
}

fn wild_family_match(card: &Card, field: &Card) -> bool {
    card.color.is_wild() && field.color.is_wild() && card.value == field.value
}

const BASE: CardEffect = CardEffect {
    on_reveal: nothing,
    on_begin_play: nothing,
    on_play: nothing,
    can_play: color_or_value_match,
    can_play_on_draw_stack: never_on_stack,
    can_cut_in: exact_match,
};

static NUMBER: CardEffect = BASE;

static SKIP: CardEffect = CardEffect {
    on_reveal: |ctx| ctx.advance_turn(),
    on_play: |ctx| ctx.advance_turn(),
    ..BASE
};

static REVERSE: CardEffect = CardEffect {
    on_reveal: |ctx| ctx.state.turn_direction = -1,
    on_play: |ctx| ctx.state.turn_direction = -ctx.state.turn_direction,
    ..BASE
};

static DRAW2: CardEffect = CardEffect {
    on_reveal: |ctx| ctx.state.draw_stack = 2,
    on_play: |ctx| ctx.state.draw_stack += 2,
    can_play_on_draw_stack: |_, field| field.value == CardValue::Draw2,
    ..BASE
};

static WILD: CardEffect = CardEffect {
    on_begin_play: |ctx| ctx.state.waiting_for_color_choice = true,
    on_play: |ctx| ctx.state.waiting_for_color_choice = true,
    can_play: always,
    can_cut_in: wild_family_match,
    ..BASE
};

static DRAW4: CardEffect = CardEffect {
    on_reveal: |ctx| ctx.state.draw_stack = 4,
    on_begin_play: |ctx| ctx.state.waiting_for_color_choice = true,
    on_play: |ctx| {
        ctx.state.draw_stack += 4;
        ctx.state.waiting_for_color_choice = true;
    },
    can_play: always,
    can_play_on_draw_stack: |_, field| field.value.is_draw(),
    can_cut_in: wild_family_match,
    ..BASE
};

static FORCE_CHANGE: CardEffect = CardEffect {
    can_play: always,
    can_cut_in: |card, field| {
        card.value == CardValue::ForceChange && field.value == CardValue::ForceChange
    },
    ..BASE
};

pub fn effect_for(value: CardValue) -> &'static CardEffect {
    match value {
        CardValue::Number(_) => &NUMBER,
        CardValue::Skip => &SKIP,
        CardValue::Reverse => &REVERSE,
        CardValue::Draw2 => &DRAW2,
        CardValue::Wild => &WILD,
        CardValue::Draw4 => &DRAW4,
        CardValue::ForceChange => &FORCE_CHANGE,
    }
}

/// Legal as a normal play by the player whose turn it is.
pub fn can_play(card: &Card, field: &Card, current_color: Option<Color>) -> bool {
    (effect_for(card.value).can_play)(card, field, current_color)
}

/// Legal as a counter while a draw stack is pending.
pub fn can_play_on_draw_stack(card: &Card, field: &Card) -> bool {
    (effect_for(card.value).can_play_on_draw_stack)(card, field)
}

/// Legal as an out-of-turn cut-in.
pub fn can_cut_in(card: &Card, field: &Card) -> bool {
    (effect_for(card.value).can_cut_in)(card, field)
}

pub fn apply_on_reveal(state: &mut GameState, card: &Card) {
    (effect_for(card.value).on_reveal)(&mut EffectContext::new(state, card));
}

pub fn apply_on_begin_play(state: &mut GameState, card: &Card) {
    (effect_for(card.value).on_begin_play)(&mut EffectContext::new(state, card));
}

pub fn apply_on_play(state: &mut GameState, card: &Card) {
    (effect_for(card.value).on_play)(&mut EffectContext::new(state, card));
}

//! Error taxonomy for the game core.

use super::card::Color;
use super::state::Phase;

/// Why an intent was dropped. Never sent to clients; rejected intents simply
/// have no effect.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    #[error("not allowed during {0:?}")]
    WrongPhase(Phase),
    #[error("session is not seated in this room")]
    NotSeated,
    #[error("session has left the room")]
    Departed,
    #[error("only the room owner may do that")]
    NotOwner,
    #[error("need at least {needed} players, have {seated}")]
    NotEnoughPlayers { needed: usize, seated: usize },
    #[error("{0} is not available right now")]
    ActionUnavailable(&'static str),
    #[error("no cards given")]
    NoCards,
    #[error("card {0} listed twice")]
    DuplicateCard(String),
    #[error("card {0} is not in hand")]
    NotInHand(String),
    #[error("card {0} is not playable")]
    NotPlayable(String),
    #[error("cards played together must share a value")]
    MixedValues,
    #[error("{0} cannot be chosen as the field color")]
    InvalidColor(Color),
    #[error("test hooks are disabled")]
    TestHooksDisabled,
}

/// A structural bug: the card accounting or seating no longer adds up.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("card count drifted: expected {expected}, found {found}")]
    CardCount { expected: usize, found: usize },
    #[error("card id {0} appears more than once")]
    DuplicateId(String),
    #[error("expected exactly one owner, found {0}")]
    OwnerCount(usize),
    #[error("current turn does not name a seated player")]
    TurnHolderMissing,
    #[error("deckCount {mirror} does not match deck length {actual}")]
    DeckMirror { mirror: usize, actual: usize },
    #[error("handCount of {0} does not match its hand")]
    HandMirror(String),
}

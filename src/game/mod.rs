//! Game rules independent of rooms and transport.

pub mod card;
pub mod deck;
pub mod effects;
pub mod error;
pub mod legality;
pub mod state;

pub use card::{Card, CardValue, Color};
pub use deck::{build_deck, shuffle, DeckProvider, DECK_SIZE};
pub use error::{InvariantViolation, Rejected};
pub use state::{GameResult, GameState, Phase, Player, RoundOutcome, SessionId};

//! Inbound player intents as they arrive over the wire.

use serde::{Deserialize, Serialize};

use crate::game::{Card, Color};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Intent {
    StartGame,
    PlayCard {
        #[serde(rename = "cardIds")]
        card_ids: Vec<String>,
    },
    DrawCard,
    DrawStack,
    Pass,
    Dobon,
    DobonReturn,
    ChooseColor { color: Color },
    ToggleReady,
    LeaveRoom,
    /// Replaces the deck used by the next start. Only honored with test hooks on.
    #[serde(rename = "__setDeck")]
    SetDeck { cards: Vec<Card> },
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::StartGame => "startGame",
            Intent::PlayCard { .. } => "playCard",
            Intent::DrawCard => "drawCard",
            Intent::DrawStack => "drawStack",
            Intent::Pass => "pass",
            Intent::Dobon => "dobon",
            Intent::DobonReturn => "dobonReturn",
            Intent::ChooseColor { .. } => "chooseColor",
            Intent::ToggleReady => "toggleReady",
            Intent::LeaveRoom => "leaveRoom",
            Intent::SetDeck { .. } => "__setDeck",
        }
    }
}

//! Card model: colors, values and the fixed point table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Wild,
}

impl Color {
    /// The four colors a player can name; `Wild` is never a field color.
    pub const PLAYABLE: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];

    pub fn is_wild(&self) -> bool { matches!(self, Color::Wild) }

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Wild => "wild",
        }
    }

    /// First letter used in card ids (`r5-3`, `g-skip-80`).
    pub fn initial(&self) -> char {
        self.as_str().chars().next().unwrap_or('w')
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown card value: {0}")]
pub struct ParseCardError(pub String);

/// Face value of a card. Serialized with the wire names `"0".."9"`, `skip`,
/// `reverse`, `draw2`, `wild`, `draw4` and `force-change`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CardValue {
    Number(u8),
    Skip,
    Reverse,
    Draw2,
    Wild,
    Draw4,
    ForceChange,
}

impl CardValue {
    pub const ACTIONS: [CardValue; 3] = [CardValue::Skip, CardValue::Reverse, CardValue::Draw2];

    pub fn points(&self) -> u32 {
        match self {
            CardValue::Number(n) => u32::from(*n),
            CardValue::Skip | CardValue::Reverse | CardValue::Draw2 => 20,
            CardValue::Wild => 30,
            CardValue::Draw4 => 50,
            CardValue::ForceChange => 10,
        }
    }

    pub fn is_draw(&self) -> bool { matches!(self, CardValue::Draw2 | CardValue::Draw4) }
}

impl fmt::Display for CardValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardValue::Number(n) => write!(f, "{n}"),
            CardValue::Skip => f.write_str("skip"),
            CardValue::Reverse => f.write_str("reverse"),
            CardValue::Draw2 => f.write_str("draw2"),
            CardValue::Wild => f.write_str("wild"),
            CardValue::Draw4 => f.write_str("draw4"),
            CardValue::ForceChange => f.write_str("force-change"),
        }
    }
}

impl FromStr for CardValue {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(CardValue::Skip),
            "reverse" => Ok(CardValue::Reverse),
            "draw2" => Ok(CardValue::Draw2),
            "wild" => Ok(CardValue::Wild),
            "draw4" => Ok(CardValue::Draw4),
            "force-change" => Ok(CardValue::ForceChange),
            _ => match s.parse::<u8>() {
                Ok(n) if n <= 9 && s.len() == 1 => Ok(CardValue::Number(n)),
                _ => Err(ParseCardError(s.to_string())),
            },
        }
    }
}

impl From<CardValue> for String {
    fn from(v: CardValue) -> Self { v.to_string() }
}

impl TryFrom<String> for CardValue {
    type Error = ParseCardError;
    fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub color: Color,
    pub value: CardValue,
    pub points: u32,
}

impl Card {
    /// Builds a card with the points fixed by its value.
    pub fn new(id: impl Into<String>, color: Color, value: CardValue) -> Self {
        Card { id: id.into(), color, value, points: value.points() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_follow_value_class() {
        assert_eq!(CardValue::Number(0).points(), 0);
        assert_eq!(CardValue::Number(7).points(), 7);
        assert_eq!(CardValue::Skip.points(), 20);
        assert_eq!(CardValue::Reverse.points(), 20);
        assert_eq!(CardValue::Draw2.points(), 20);
        assert_eq!(CardValue::Wild.points(), 30);
        assert_eq!(CardValue::Draw4.points(), 50);
        assert_eq!(CardValue::ForceChange.points(), 10);
    }

    #[test]
    fn value_uses_wire_names() {
        let card = Card::new("force-red", Color::Red, CardValue::ForceChange);
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["value"], "force-change");
        assert_eq!(json["color"], "red");
        assert_eq!(json["points"], 10);

        let back: Card = serde_json::from_value(json).unwrap();
        assert_eq!(back, card);
    }

    #[test]
    fn rejects_unknown_values() {
        assert!("10".parse::<CardValue>().is_err());
        assert!("draw3".parse::<CardValue>().is_err());
        assert!("+1".parse::<CardValue>().is_err());
        assert_eq!("9".parse::<CardValue>(), Ok(CardValue::Number(9)));
    }
}

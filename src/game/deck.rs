//! Deck factory: the canonical 112-card multiset and the seeded shuffle.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::card::{Card, CardValue, Color};

pub const DECK_SIZE: usize = 112;

/// Builds the unshuffled deck: 76 numbers, 24 actions, 4 wild, 4 draw4 and one
/// force-change per color.
pub fn build_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    let mut index = 0usize;

    for color in Color::PLAYABLE {
        for n in 0..=9u8 {
            let copies = if n == 0 { 1 } else { 2 };
            for _ in 0..copies {
                index += 1;
                deck.push(Card::new(format!("{}{}-{}", color.initial(), n, index), color, CardValue::Number(n)));
            }
        }
    }

    for color in Color::PLAYABLE {
        for value in CardValue::ACTIONS {
            for _ in 0..2 {
                index += 1;
                deck.push(Card::new(format!("{}-{}-{}", color.initial(), value, index), color, value));
            }
        }
    }

    for i in 1..=4 { deck.push(Card::new(format!("wild-{i}"), Color::Wild, CardValue::Wild)); }
    for i in 1..=4 { deck.push(Card::new(format!("draw4-{i}"), Color::Wild, CardValue::Draw4)); }
    for color in Color::PLAYABLE {
        deck.push(Card::new(format!("force-{color}"), color, CardValue::ForceChange));
    }

    deck
}

/// Fisher-Yates over a copy of `deck`. A seed makes the order reproducible.
pub fn shuffle(deck: &[Card], seed: Option<u64>) -> Vec<Card> {
    let mut shuffled = deck.to_vec();
    match seed {
        Some(seed) => fisher_yates(&mut shuffled, &mut ChaCha8Rng::seed_from_u64(seed)),
        None => fisher_yates(&mut shuffled, &mut rand::thread_rng()),
    }
    shuffled
}

fn fisher_yates<R: Rng + ?Sized>(cards: &mut [Card], rng: &mut R) {
    for i in (1..cards.len()).rev() {
        let j = rng.gen_range(0..=i);
        cards.swap(i, j);
    }
}

/// Where a room gets its deck at every start.
#[derive(Debug, Clone)]
pub enum DeckProvider {
    Shuffled { seed: Option<u64> },
    /// Injected deck, dealt as given (tail first).
    Fixed(Vec<Card>),
}

impl Default for DeckProvider {
    fn default() -> Self { DeckProvider::Shuffled { seed: None } }
}

impl DeckProvider {
    pub fn provide(&self) -> Vec<Card> {
        match self {
            DeckProvider::Shuffled { seed } => shuffle(&build_deck(), *seed),
            DeckProvider::Fixed(cards) => cards.clone(),
        }
    }
}

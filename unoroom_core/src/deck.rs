use std::collections::VecDeque;

use log::info;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::card::Card;

/// The stock of unseen cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    cards: VecDeque<Card>,
}

impl Deck {
    /// All 108 cards in encoding order, unshuffled.
    pub fn build() -> Self {
        Deck {
            cards: Card::all().collect(),
        }
    }

    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Deck::build();
        deck.shuffle(rng);
        deck
    }

    /// Fisher-Yates over the whole stock.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.make_contiguous().shuffle(rng);
    }

    /// Takes the top card. An empty stock is rebuilt from all 108 cards and
    /// reshuffled first; cards already in hands or buried under the discard
    /// top are not accounted for.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Card {
        loop {
            if let Some(card) = self.cards.pop_front() {
                return card;
            }
            info!("deck exhausted, rebuilding a fresh shuffled deck");
            *self = Deck::shuffled(rng);
        }
    }

    /// Returns a card to the stock, e.g. a wild turned up as the opening card.
    pub fn put_back(&mut self, card: Card) {
        self.cards.push_back(card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}

impl FromIterator<Card> for Deck {
    fn from_iter<T: IntoIterator<Item = Card>>(iter: T) -> Self {
        Deck {
            cards: iter.into_iter().collect(),
        }
    }
}

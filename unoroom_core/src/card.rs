use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{EnumMessage, IntoEnumIterator};
use strum_macros::{Display, EnumIter, EnumMessage, EnumString};

/// Cards per group: ten numbers, three actions and one wild slot.
pub const GROUP_SIZE: u8 = 14;
/// Size of the encoding space before the duplicate zeros are removed.
pub const ENCODED_CARDS: u8 = 8 * GROUP_SIZE;
/// Second-copy zero slots (rank 0 of groups 4..7); they are never dealt.
pub const REMOVED_ZEROS: [u8; 4] = [56, 70, 84, 98];

#[derive(
    Debug,
    PartialEq,
    Eq,
    Hash,
    Copy,
    Clone,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Yellow,
    Green,
    Blue,
    Black,
}

impl Color {
    /// The four colors a wild card can be assigned.
    pub fn choosable() -> impl Iterator<Item = Color> {
        Color::iter().filter(|c| *c != Color::Black)
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, EnumMessage, Serialize, Deserialize)]
pub enum Rank {
    #[strum(message = "Match it by color or by number.")]
    Number(u8),
    #[strum(message = "The next player loses their turn.")]
    Skip,
    #[strum(message = "Play continues in the opposite direction.")]
    Reverse,
    #[strum(
        message = "The next player draws two cards and loses their turn. Several can be stacked in one turn."
    )]
    Draw2,
    #[strum(message = "Always playable. You choose the color that has to be matched next.")]
    Wild,
    #[strum(
        message = "Always playable. You choose the next color, the next player draws four cards and loses their turn."
    )]
    Draw4,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Number(n) => write!(f, "{n}"),
            Rank::Skip => write!(f, "Skip"),
            Rank::Reverse => write!(f, "Reverse"),
            Rank::Draw2 => write!(f, "+2"),
            Rank::Wild => write!(f, "Wild"),
            Rank::Draw4 => write!(f, "+4"),
        }
    }
}

impl Rank {
    pub fn rule(&self) -> String {
        format!("{}: {}", self, self.get_message().unwrap_or("No rule"))
    }

    pub fn is_wild(&self) -> bool {
        matches!(self, Rank::Wild | Rank::Draw4)
    }

    /// Cards this rank adds to the pending draw stack.
    pub fn draw_penalty(&self) -> u32 {
        match self {
            Rank::Draw2 => 2,
            Rank::Draw4 => 4,
            _ => 0,
        }
    }
}

/// A card identifier. Color and rank are derived from the id, never stored.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Card(u8);

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0} is not a card identifier")]
pub struct InvalidCard(pub u8);

impl Card {
    pub fn new(id: u8) -> Option<Card> {
        if id < ENCODED_CARDS && !REMOVED_ZEROS.contains(&id) {
            Some(Card(id))
        } else {
            None
        }
    }

    pub fn id(&self) -> u8 {
        self.0
    }

    fn group(&self) -> u8 {
        self.0 / GROUP_SIZE
    }

    pub fn color(&self) -> Color {
        if self.0 % GROUP_SIZE == 13 {
            return Color::Black;
        }
        match self.group() % 4 {
            0 => Color::Red,
            1 => Color::Yellow,
            2 => Color::Green,
            _ => Color::Blue,
        }
    }

    pub fn rank(&self) -> Rank {
        match self.0 % GROUP_SIZE {
            10 => Rank::Skip,
            11 => Rank::Reverse,
            12 => Rank::Draw2,
            13 if self.group() >= 4 => Rank::Draw4,
            13 => Rank::Wild,
            n => Rank::Number(n),
        }
    }

    pub fn is_wild(&self) -> bool {
        self.color() == Color::Black
    }

    /// Every card of the game in encoding order.
    pub fn all() -> impl Iterator<Item = Card> {
        (0..ENCODED_CARDS).filter_map(Card::new)
    }

    pub fn rules() -> String {
        [
            Rank::Number(0),
            Rank::Skip,
            Rank::Reverse,
            Rank::Draw2,
            Rank::Wild,
            Rank::Draw4,
        ]
        .iter()
        .map(|r| r.rule())
        .join("\n")
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_wild() {
            write!(f, "{}", self.rank())
        } else {
            write!(f, "{} {}", self.color(), self.rank())
        }
    }
}

impl TryFrom<u8> for Card {
    type Error = InvalidCard;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Card::new(id).ok_or(InvalidCard(id))
    }
}

impl From<Card> for u8 {
    fn from(card: Card) -> u8 {
        card.0
    }
}

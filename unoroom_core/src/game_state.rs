use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::{
    card::{Card, Color, Rank},
    deck::Deck,
    event::{GameInfo, PlayerSummary},
    player::{PeerId, Player},
    rules::effective_board_color,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    pub fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// What the turn holder has done so far in the current turn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    NotActed,
    /// Drew at least one card and has not played yet.
    Drew,
    /// Played one or more cards of `rank`; only that rank may follow.
    Played { rank: Rank },
    /// The discard top is a wild of `rank` whose color is still open.
    AwaitingColor { rank: Rank },
    /// The actor went out; the round is over.
    Done,
}

impl TurnPhase {
    pub fn has_played(&self) -> bool {
        matches!(
            self,
            TurnPhase::Played { .. } | TurnPhase::AwaitingColor { .. }
        )
    }

    pub fn played_rank(&self) -> Option<Rank> {
        match self {
            TurnPhase::Played { rank } | TurnPhase::AwaitingColor { rank } => Some(*rank),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    pub discard_top: Card,
    pub turn_index: usize,
    pub direction: Direction,
    pub pending_draw_stack: u32,
    pub active_color: Option<Color>,
    pub phase: TurnPhase,
    /// Cards covered on the discard pile; no discard history is kept.
    pub buried: usize,
}

impl RoundState {
    pub fn new(discard_top: Card) -> Self {
        RoundState {
            discard_top,
            turn_index: 0,
            direction: Direction::Forward,
            pending_draw_stack: 0,
            active_color: None,
            phase: TurnPhase::NotActed,
            buried: 0,
        }
    }

    pub fn board_color(&self) -> Color {
        effective_board_color(self.discard_top, self.active_color)
    }

    pub fn color_pending(&self) -> bool {
        self.discard_top.is_wild() && self.active_color.is_none()
    }
}

/// Everything the authority owns about the table: roster, stock and, once
/// started, the round.
#[derive(Debug, Clone)]
pub struct Table {
    pub players: Vec<Player>,
    pub deck: Deck,
    pub round: Option<RoundState>,
    pub(crate) rng: StdRng,
}

/// Comparable copy of the table without the random source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub players: Vec<Player>,
    pub deck: Deck,
    pub round: Option<RoundState>,
}

impl Table {
    pub fn new(rng: StdRng) -> Self {
        Table {
            players: vec![],
            deck: Deck::build(),
            round: None,
            rng,
        }
    }

    pub fn player_index(&self, id: PeerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn player(&self, id: PeerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn turn_player(&self) -> Option<&Player> {
        self.round
            .as_ref()
            .and_then(|round| self.players.get(round.turn_index))
    }

    pub fn connected_count(&self) -> usize {
        self.players.iter().filter(|p| p.connected).count()
    }

    pub fn card_count(&self) -> usize {
        self.deck.len()
            + self.players.iter().map(|p| p.hand.len()).sum::<usize>()
            + self.round.as_ref().map_or(0, |_| 1)
    }

    pub fn game_info(&self) -> GameInfo {
        GameInfo {
            players: self
                .players
                .iter()
                .map(|p| PlayerSummary {
                    name: p.name.clone(),
                    id: p.id,
                    hand_size: p.hand.len(),
                })
                .collect(),
            active_color: self.round.as_ref().and_then(|r| r.active_color),
        }
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            players: self.players.clone(),
            deck: self.deck.clone(),
            round: self.round.clone(),
        }
    }
}

use thiserror::Error;

use crate::{
    card::{Card, Color, Rank},
    player::PeerId,
};

/// Why the authority refused an action. A refused action never changes state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("no round is in progress")]
    NotInProgress,
    #[error("{0} is not seated in this room")]
    UnknownPlayer(PeerId),
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("{0} is not in your hand")]
    CardNotInHand(Card),
    #[error("{card} does not match {board_color} {board_rank}")]
    IllegalPlay {
        card: Card,
        board_color: Color,
        board_rank: Rank,
    },
    #[error("you can only add more {expected} cards this turn, not {card}")]
    RankMismatch { expected: Rank, card: Card },
    #[error("you already played, end your turn instead of drawing")]
    AlreadyPlayed,
    #[error("you have to play a card before ending your turn")]
    NothingPlayed,
    #[error("pick a color for the wild card first")]
    ColorUnresolved,
    #[error("there is no wild card waiting for a color")]
    NoColorPending,
    #[error("{0} cannot be chosen as a color")]
    NotAColor(Color),
    #[error("the room is full")]
    RoomFull,
    #[error("the room is not accepting players")]
    NotAccepting,
    #[error("{0} already joined")]
    DuplicatePlayer(PeerId),
}

impl ActionError {
    /// Text for the private `error` message, or `None` when the rejection
    /// stays silent.
    pub fn notice(&self) -> Option<String> {
        match self {
            ActionError::NotInProgress
            | ActionError::UnknownPlayer(_)
            | ActionError::NotYourTurn
            | ActionError::NothingPlayed
            | ActionError::RoomFull
            | ActionError::NotAccepting
            | ActionError::DuplicatePlayer(_) => None,
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_moves_produce_a_notice() {
        let card = Card::new(17).unwrap();
        let error = ActionError::IllegalPlay {
            card,
            board_color: Color::Red,
            board_rank: Rank::Number(7),
        };
        assert_eq!(
            error.notice().as_deref(),
            Some("yellow 3 does not match red 7")
        );
        assert!(ActionError::AlreadyPlayed.notice().is_some());
        assert!(ActionError::ColorUnresolved.notice().is_some());
    }

    #[test]
    fn turn_and_membership_faults_are_silent() {
        assert_eq!(ActionError::NotYourTurn.notice(), None);
        assert_eq!(ActionError::NothingPlayed.notice(), None);
        assert_eq!(ActionError::RoomFull.notice(), None);
        assert_eq!(ActionError::NotAccepting.notice(), None);
    }
}

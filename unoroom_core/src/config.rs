use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub max_players: usize,
    /// Players needed before the countdown starts, and to keep a round alive.
    pub min_players: usize,
    pub hand_size: usize,
    pub countdown_secs: u8,
    /// End the round as soon as someone finishes a turn with an empty hand.
    pub end_round_on_empty_hand: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_players: 4,
            min_players: 2,
            hand_size: 7,
            countdown_secs: 3,
            end_round_on_empty_hand: true,
        }
    }
}

impl SessionConfig {
    pub fn with_max_players(max_players: usize) -> Self {
        SessionConfig {
            max_players,
            ..Default::default()
        }
    }
}

use crate::{
    card::{Card, Color, Rank},
    event::{HostEvent, PlayerSummary},
    player::PeerId,
    rules::is_valid_play,
};

/// What one peer knows: its own hand plus the public board, rebuilt purely
/// from the messages the authority sent to it.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerView {
    pub me: PeerId,
    pub hand: Vec<Card>,
    pub discard_top: Option<Card>,
    pub active_color: Option<Color>,
    pub turn_player: Option<PeerId>,
    pub players: Vec<PlayerSummary>,
    pub countdown: Option<u8>,
    /// Rank this peer played during its current turn.
    pub played_rank: Option<Rank>,
    /// Latest rejection notice, dropped once something of mine succeeds.
    pub last_error: Option<String>,
    pub finished: bool,
    pub winner: Option<PeerId>,
}

impl PeerView {
    pub fn new(me: PeerId) -> Self {
        PeerView {
            me,
            hand: vec![],
            discard_top: None,
            active_color: None,
            turn_player: None,
            players: vec![],
            countdown: None,
            played_rank: None,
            last_error: None,
            finished: false,
            winner: None,
        }
    }

    pub fn apply(&mut self, event: &HostEvent) {
        match event {
            HostEvent::HaveCard(hand) => {
                self.hand = hand.clone();
                self.last_error = None;
            }
            HostEvent::SendCard(card) => {
                if self.is_my_turn() {
                    self.played_rank = Some(card.rank());
                }
                self.discard_top = Some(*card);
                self.active_color = None;
            }
            HostEvent::TurnPlayer(id) => {
                self.turn_player = Some(*id);
                self.played_rank = None;
                self.last_error = None;
            }
            HostEvent::WildColorSelected(color) => {
                self.active_color = Some(*color);
                self.last_error = None;
            }
            HostEvent::UpdateGameInfo(info) => {
                self.players = info.players.clone();
                self.active_color = info.active_color;
            }
            HostEvent::CountDown(n) => self.countdown = (*n > 0).then_some(*n),
            HostEvent::Error(message) => self.last_error = Some(message.clone()),
            HostEvent::RoundOver(winner) => {
                self.finished = true;
                self.winner = *winner;
            }
        }
    }

    pub fn is_my_turn(&self) -> bool {
        !self.finished && self.turn_player == Some(self.me)
    }

    /// True after this peer played a wild and has not picked its color yet.
    pub fn must_choose_color(&self) -> bool {
        self.is_my_turn()
            && self.played_rank.is_some()
            && self.active_color.is_none()
            && self.discard_top.is_some_and(|c| c.is_wild())
    }

    /// Cards the authority would accept right now.
    pub fn playable_cards(&self) -> Vec<Card> {
        let Some(top) = self.discard_top else {
            return vec![];
        };
        self.hand
            .iter()
            .copied()
            .filter(|card| match self.played_rank {
                Some(rank) => card.rank() == rank,
                None => is_valid_play(*card, top, self.active_color),
            })
            .collect()
    }

    pub fn player_name(&self, id: PeerId) -> Option<&str> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.as_str())
    }
}

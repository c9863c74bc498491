// Messages exchanged between the authority and its peers.
//
// On the wire every message is `{"type": "<name>", "data": <payload>}`, with
// `data` left out for payload-free messages.

use serde::{Deserialize, Serialize};

use crate::{
    card::{Card, Color},
    player::PeerId,
};

/// Intents a peer submits to the authority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum PeerAction {
    JoinRoom {
        #[serde(rename = "playerName")]
        player_name: String,
    },
    DrawCard,
    PlayCard(Card),
    EndTurn,
    SelectWildColor(Color),
}

/// Facts the authority pushes to peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum HostEvent {
    /// The recipient's full hand.
    HaveCard(Vec<Card>),
    /// New discard top.
    SendCard(Card),
    TurnPlayer(PeerId),
    WildColorSelected(Color),
    UpdateGameInfo(GameInfo),
    /// Seconds until the round starts; 0 clears or cancels.
    CountDown(u8),
    Error(String),
    /// The round is over; `None` when nobody is left to win it.
    RoundOver(Option<PeerId>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    pub players: Vec<PlayerSummary>,
    pub active_color: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub name: String,
    pub id: PeerId,
    pub hand_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventVisibility {
    Public,
    Private(PeerId),
}

/// A message together with who may see it.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEntry {
    pub visibility: EventVisibility,
    pub event: HostEvent,
}

impl EventEntry {
    pub fn public(event: HostEvent) -> Self {
        EventEntry {
            visibility: EventVisibility::Public,
            event,
        }
    }

    pub fn private(to: PeerId, event: HostEvent) -> Self {
        EventEntry {
            visibility: EventVisibility::Private(to),
            event,
        }
    }

    pub fn is_visible_to(&self, peer: PeerId) -> bool {
        match self.visibility {
            EventVisibility::Public => true,
            EventVisibility::Private(p) => p == peer,
        }
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{card::Card, event::PeerAction, view::PeerView};

/// Opaque, transport-assigned peer identity. Stable for the session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PeerId,
    pub name: String,
    pub hand: Vec<Card>,
    pub connected: bool,
}

impl Player {
    pub fn new(id: PeerId, name: String) -> Self {
        Player {
            id,
            name,
            hand: vec![],
            connected: true,
        }
    }
}

/// Something that decides what a seat does, based only on what that seat
/// has been told.
pub trait PlayerInterface {
    fn name(&self) -> &str;

    fn notify(&self, _view: &PeerView) {}

    /// Next intent for this seat; `None` leaves the room.
    fn obtain_action(&mut self, view: &PeerView) -> Option<PeerAction>;
}

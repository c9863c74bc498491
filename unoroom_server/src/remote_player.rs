use log::warn;
use renet::ClientId;
use tokio::sync::mpsc::UnboundedSender;
use unoroom_core::{event::HostEvent, relay::PeerSink};

/// Serialized message waiting for the renet send loop.
pub type Outgoing = (ClientId, String);

/// Sink for a peer connected over renet. Messages are encoded here and
/// queued, the main loop hands them to the transport.
pub struct RemotePlayer {
    client_id: ClientId,
    outbox: UnboundedSender<Outgoing>,
}

impl RemotePlayer {
    pub fn new(client_id: ClientId, outbox: UnboundedSender<Outgoing>) -> Self {
        RemotePlayer { client_id, outbox }
    }
}

impl PeerSink for RemotePlayer {
    fn deliver(&mut self, event: &HostEvent) -> bool {
        match serde_json::to_string(event) {
            Ok(text) => self.outbox.send((self.client_id, text)).is_ok(),
            Err(err) => {
                warn!("could not encode {:?}: {}", event, err);
                false
            }
        }
    }
}

use std::{cell::RefCell, collections::HashMap, rc::Rc, sync::mpsc::Sender};

use log::{trace, warn};

use crate::{
    event::{EventEntry, HostEvent},
    player::PeerId,
    view::PeerView,
};

/// Where the authority delivers messages for one peer.
pub trait PeerSink {
    /// Returns `false` once the peer can no longer be reached.
    fn deliver(&mut self, event: &HostEvent) -> bool;
}

impl PeerSink for Sender<HostEvent> {
    fn deliver(&mut self, event: &HostEvent) -> bool {
        self.send(event.clone()).is_ok()
    }
}

/// Sink for a seat living in the authority's own process. Messages are
/// applied to the shared view immediately, exactly as a remote peer would
/// apply them on receipt.
#[derive(Debug, Clone)]
pub struct Loopback {
    view: Rc<RefCell<PeerView>>,
}

impl Loopback {
    pub fn new(me: PeerId) -> Self {
        Loopback {
            view: Rc::new(RefCell::new(PeerView::new(me))),
        }
    }

    pub fn view(&self) -> Rc<RefCell<PeerView>> {
        Rc::clone(&self.view)
    }
}

impl PeerSink for Loopback {
    fn deliver(&mut self, event: &HostEvent) -> bool {
        self.view.borrow_mut().apply(event);
        true
    }
}

/// Fans event log entries out to connected peers.
#[derive(Default)]
pub struct Relay {
    sinks: HashMap<PeerId, Box<dyn PeerSink>>,
}

impl Relay {
    pub fn attach(&mut self, id: PeerId, sink: Box<dyn PeerSink>) {
        self.sinks.insert(id, sink);
    }

    pub fn detach(&mut self, id: PeerId) -> bool {
        self.sinks.remove(&id).is_some()
    }

    pub fn is_attached(&self, id: PeerId) -> bool {
        self.sinks.contains_key(&id)
    }

    pub fn send_to(&mut self, id: PeerId, event: &HostEvent) {
        if let Some(sink) = self.sinks.get_mut(&id) {
            if !sink.deliver(event) {
                warn!("could not deliver to {}", id);
            }
        }
    }

    /// Delivers each entry, in order, to every seated peer in `roster`
    /// allowed to see it. Private entries never reach anyone but their
    /// recipient; attached peers without a seat get nothing.
    pub fn dispatch(&mut self, roster: &[PeerId], log: &[EventEntry]) {
        for entry in log {
            trace!("relaying {:?}", entry);
            for (id, sink) in self.sinks.iter_mut() {
                if !roster.contains(id) || !entry.is_visible_to(*id) {
                    continue;
                }
                if !sink.deliver(&entry.event) {
                    warn!("could not deliver to {}", id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::channel;

    use super::*;
    use crate::card::Card;

    #[test]
    fn private_entries_reach_only_their_recipient() {
        let mut relay = Relay::default();
        let (tx1, rx1) = channel();
        let (tx2, rx2) = channel();
        relay.attach(PeerId(1), Box::new(tx1));
        relay.attach(PeerId(2), Box::new(tx2));

        let hand = vec![Card::new(5).unwrap()];
        relay.dispatch(&[PeerId(1), PeerId(2)], &[
            EventEntry::private(PeerId(1), HostEvent::HaveCard(hand.clone())),
            EventEntry::public(HostEvent::CountDown(3)),
        ]);

        let first: Vec<_> = rx1.try_iter().collect();
        let second: Vec<_> = rx2.try_iter().collect();
        assert_eq!(
            first,
            vec![HostEvent::HaveCard(hand), HostEvent::CountDown(3)]
        );
        assert_eq!(second, vec![HostEvent::CountDown(3)]);
    }

    #[test]
    fn loopback_applies_to_the_shared_view() {
        let mut relay = Relay::default();
        let local = Loopback::new(PeerId(7));
        let view = local.view();
        relay.attach(PeerId(7), Box::new(local));

        relay.send_to(PeerId(7), &HostEvent::CountDown(2));
        assert_eq!(view.borrow().countdown, Some(2));
    }

    #[test]
    fn detached_peers_get_nothing() {
        let mut relay = Relay::default();
        let (tx, rx) = channel();
        relay.attach(PeerId(1), Box::new(tx));
        assert!(relay.detach(PeerId(1)));
        assert!(!relay.is_attached(PeerId(1)));
        relay.dispatch(&[PeerId(1)], &[EventEntry::public(HostEvent::CountDown(1))]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unseated_peers_get_nothing() {
        let mut relay = Relay::default();
        let (tx1, rx1) = channel();
        let (tx2, rx2) = channel();
        relay.attach(PeerId(1), Box::new(tx1));
        relay.attach(PeerId(2), Box::new(tx2));
        relay.dispatch(&[PeerId(1)], &[EventEntry::public(HostEvent::CountDown(2))]);
        assert_eq!(rx1.try_recv().unwrap(), HostEvent::CountDown(2));
        assert!(rx2.try_recv().is_err());

        // direct notices still reach them
        relay.send_to(PeerId(2), &HostEvent::Error("the room is full".into()));
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn closed_channels_do_not_stop_the_others() {
        let mut relay = Relay::default();
        let (tx1, rx1) = channel::<HostEvent>();
        let (tx2, rx2) = channel();
        drop(rx1);
        relay.attach(PeerId(1), Box::new(tx1));
        relay.attach(PeerId(2), Box::new(tx2));
        relay.dispatch(
            &[PeerId(1), PeerId(2)],
            &[EventEntry::public(HostEvent::CountDown(1))],
        );
        assert_eq!(rx2.try_recv().unwrap(), HostEvent::CountDown(1));
    }
}

use log::{info, warn};

use crate::{
    error::ActionError,
    event::{EventEntry, HostEvent, PeerAction},
    game_lobby::{Lifecycle, Session},
    player::PeerId,
    relay::{PeerSink, Relay},
};

/// The authority: one session, its own seat and the sinks of every peer.
pub struct Host {
    session: Session,
    local_identity: PeerId,
    relay: Relay,
}

impl Host {
    /// Creates the host and seats its own player first.
    pub fn new(
        session: Session,
        local_identity: PeerId,
        local_name: String,
        local_sink: Box<dyn PeerSink>,
    ) -> Result<Self, ActionError> {
        let mut host = Host {
            session,
            local_identity,
            relay: Relay::default(),
        };
        host.connect(local_identity, local_sink);
        host.handle(
            local_identity,
            PeerAction::JoinRoom {
                player_name: local_name,
            },
        )?;
        Ok(host)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn local_identity(&self) -> PeerId {
        self.local_identity
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.session.lifecycle()
    }

    /// Makes a peer reachable. It still has to send `joinRoom` to get a seat.
    pub fn connect(&mut self, id: PeerId, sink: Box<dyn PeerSink>) {
        info!("{} connected", id);
        self.relay.attach(id, sink);
    }

    pub fn disconnect(&mut self, id: PeerId) {
        self.relay.detach(id);
        let mut log = vec![];
        if self.session.remove_player(id, &mut log) {
            self.flush(&log);
        }
    }

    /// Applies one action from `from`. A rejected action changes nothing and
    /// at most earns the submitter an `error` notice.
    pub fn handle(&mut self, from: PeerId, action: PeerAction) -> Result<(), ActionError> {
        let mut log = vec![];
        let result = self.session.handle_action(from, action, &mut log);
        match &result {
            Ok(()) => self.flush(&log),
            Err(err) => {
                warn!("rejected action from {}: {}", from, err);
                if let Some(notice) = err.notice() {
                    self.relay.send_to(from, &HostEvent::Error(notice));
                }
            }
        }
        result
    }

    /// Submits an action for the host's own seat.
    pub fn submit(&mut self, action: PeerAction) -> Result<(), ActionError> {
        self.handle(self.local_identity, action)
    }

    /// One second of wall clock for the lobby countdown.
    pub fn tick(&mut self) {
        let mut log = vec![];
        self.session.tick(&mut log);
        self.flush(&log);
    }

    /// Starts the round without waiting for the countdown.
    pub fn start_now(&mut self) -> Result<(), ActionError> {
        let mut log = vec![];
        self.session.start_game(&mut log)?;
        self.flush(&log);
        Ok(())
    }

    /// Relays `log` to seated peers only.
    fn flush(&mut self, log: &[EventEntry]) {
        let roster: Vec<PeerId> = self.session.roster().collect();
        self.relay.dispatch(&roster, log);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::{channel, Receiver};

    use super::*;
    use crate::{card::Card, config::SessionConfig, relay::Loopback};

    const HOST: PeerId = PeerId(0);
    const GUEST: PeerId = PeerId(1);

    fn host_with_guest() -> (Host, Loopback, Receiver<HostEvent>) {
        let local = Loopback::new(HOST);
        let mut host = Host::new(
            Session::seeded(SessionConfig::default(), 5),
            HOST,
            "Host".into(),
            Box::new(local.clone()),
        )
        .unwrap();
        let (tx, rx) = channel();
        host.connect(GUEST, Box::new(tx));
        host.handle(
            GUEST,
            PeerAction::JoinRoom {
                player_name: "Guest".into(),
            },
        )
        .unwrap();
        (host, local, rx)
    }

    #[test]
    fn host_seats_itself_first() {
        let (host, local, _) = host_with_guest();
        let roster: Vec<_> = host.session().roster().collect();
        assert_eq!(roster, vec![HOST, GUEST]);
        assert_eq!(local.view().borrow().players.len(), 2);
    }

    #[test]
    fn countdown_reaches_every_peer() {
        let (mut host, local, rx) = host_with_guest();
        rx.try_iter().count();
        host.tick();
        assert_eq!(rx.try_recv().unwrap(), HostEvent::CountDown(3));
        assert_eq!(local.view().borrow().countdown, Some(3));
    }

    #[test]
    fn dealt_hands_stay_private() {
        let (mut host, local, rx) = host_with_guest();
        host.start_now().unwrap();
        let guest_hands: Vec<_> = rx
            .try_iter()
            .filter_map(|e| match e {
                HostEvent::HaveCard(hand) => Some(hand),
                _ => None,
            })
            .collect();
        assert_eq!(guest_hands.len(), 1);
        let table = host.session().table();
        assert_eq!(guest_hands[0], table.players[1].hand);
        assert_eq!(local.view().borrow().hand, table.players[0].hand);
    }

    #[test]
    fn rejected_play_notifies_only_the_submitter() {
        let (mut host, local, rx) = host_with_guest();
        host.start_now().unwrap();
        rx.try_iter().count();

        let table = host.session().table();
        let holder = table.turn_player().unwrap().id;
        let hand = &table.player(holder).unwrap().hand;
        let missing = Card::all().find(|c| !hand.contains(c)).unwrap();

        let before = table.snapshot();
        assert_eq!(
            host.handle(holder, PeerAction::PlayCard(missing)),
            Err(ActionError::CardNotInHand(missing))
        );
        assert_eq!(host.session().table().snapshot(), before);

        let guest_notices: Vec<_> = rx.try_iter().collect();
        let host_notice = local.view().borrow().last_error.clone();
        if holder == HOST {
            assert!(host_notice.is_some());
            assert!(guest_notices.is_empty());
        } else {
            assert_eq!(host_notice, None);
            assert_eq!(guest_notices.len(), 1);
            assert!(matches!(guest_notices[0], HostEvent::Error(_)));
        }

        // out-of-turn actions are dropped without a notice
        let idle = if holder == HOST { GUEST } else { HOST };
        local.view().borrow_mut().last_error = None;
        assert_eq!(
            host.handle(idle, PeerAction::DrawCard),
            Err(ActionError::NotYourTurn)
        );
        assert!(rx.try_recv().is_err());
        assert_eq!(local.view().borrow().last_error, None);
    }

    #[test]
    fn refused_joiners_hear_nothing_from_the_table() {
        let (mut host, _, rx) = host_with_guest();
        host.start_now().unwrap();
        rx.try_iter().count();

        let late = PeerId(9);
        let (tx, late_rx) = channel();
        host.connect(late, Box::new(tx));
        assert_eq!(
            host.handle(
                late,
                PeerAction::JoinRoom {
                    player_name: "Late".into(),
                },
            ),
            Err(ActionError::NotAccepting)
        );

        let holder = host.session().table().turn_player().unwrap().id;
        host.handle(holder, PeerAction::DrawCard).unwrap();
        assert!(rx.try_iter().count() > 0);
        assert!(late_rx.try_recv().is_err());
    }

    #[test]
    fn disconnect_in_lobby_cancels_the_countdown() {
        let (mut host, local, _) = host_with_guest();
        host.tick();
        host.disconnect(GUEST);
        assert_eq!(host.lifecycle(), Lifecycle::Lobby);
        assert_eq!(local.view().borrow().countdown, None);
        assert_eq!(local.view().borrow().players.len(), 1);
    }

    #[test]
    fn local_seat_plays_through_submit() {
        let (mut host, local, _) = host_with_guest();
        host.start_now().unwrap();
        if host.session().table().turn_player().map(|p| p.id) == Some(HOST) {
            host.submit(PeerAction::DrawCard).unwrap();
            assert_eq!(local.view().borrow().hand.len(), 8);
        } else {
            assert_eq!(
                host.submit(PeerAction::DrawCard),
                Err(ActionError::NotYourTurn)
            );
        }
    }
}

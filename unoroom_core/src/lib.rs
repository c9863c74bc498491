use std::{cell::RefCell, rc::Rc, thread, time::Duration};

use log::{info, warn};

use config::SessionConfig;
use error::ActionError;
use event::PeerAction;
use game_lobby::{Lifecycle, Session};
use host::Host;
use player::{PeerId, PlayerInterface};
use random_playing_computer::RandomPlayingComputer;
use relay::Loopback;
use view::PeerView;

pub mod card;
pub mod config;
pub mod deck;
pub mod error;
pub mod event;
pub mod game_lobby;
mod game_logic;
pub mod game_state;
pub mod host;
pub mod player;
pub mod random_playing_computer;
pub mod relay;
pub mod room;
pub mod rules;
pub mod user_name;
pub mod view;

pub use game_logic::next_seat;

/// Upper bound on actions in one local round, in case no driver can make
/// progress.
const MAX_ACTIONS: usize = 100_000;

/// One in-process seat: who sits there and what it has been told.
pub struct Seat {
    pub id: PeerId,
    pub driver: Box<dyn PlayerInterface>,
    pub view: Rc<RefCell<PeerView>>,
}

/// Plays one round on this machine: the constructed player against
/// `computers` computer players. Returns the winner.
pub fn run_game<C, T>(
    player_constructor: C,
    computers: usize,
    seed: Option<u64>,
) -> Result<Option<PeerId>, ActionError>
where
    C: FnOnce() -> T,
    T: PlayerInterface + 'static,
{
    let config = SessionConfig::with_max_players(computers + 1);
    let session = match seed {
        Some(seed) => Session::seeded(config, seed),
        None => Session::new(config),
    };

    let player = player_constructor();
    let me = PeerId(0);
    let local = Loopback::new(me);
    let mut seats = vec![Seat {
        id: me,
        view: local.view(),
        driver: Box::new(player),
    }];
    let name = seats[0].driver.name().to_string();
    let mut host = Host::new(session, me, name, Box::new(local))?;

    for n in 1..=computers {
        let id = PeerId(n as u64);
        let name = format!("Computer {n}");
        let computer = match seed {
            Some(seed) => RandomPlayingComputer::seeded(name.clone(), seed.wrapping_add(n as u64)),
            None => RandomPlayingComputer::new(name.clone()),
        };
        let sink = Loopback::new(id);
        seats.push(Seat {
            id,
            view: sink.view(),
            driver: Box::new(computer),
        });
        host.connect(id, Box::new(sink));
        host.handle(id, PeerAction::JoinRoom { player_name: name })?;
    }

    Ok(run_local_game(&mut host, &mut seats, Duration::from_secs(1)))
}

/// Drives a host whose seats all live in this process: runs the countdown,
/// then asks the turn holder's driver for actions until the round ends.
pub fn run_local_game(host: &mut Host, seats: &mut [Seat], tick: Duration) -> Option<PeerId> {
    while let Lifecycle::Countdown { .. } = host.lifecycle() {
        thread::sleep(tick);
        host.tick();
        for seat in seats.iter() {
            seat.driver.notify(&seat.view.borrow());
        }
    }

    for _ in 0..MAX_ACTIONS {
        match host.lifecycle() {
            Lifecycle::InProgress => {}
            Lifecycle::Ended { winner } => {
                for seat in seats.iter() {
                    seat.driver.notify(&seat.view.borrow());
                }
                return winner;
            }
            Lifecycle::Lobby | Lifecycle::Countdown { .. } => {
                warn!("not enough players to start a round");
                return None;
            }
        }

        let turn = host.session().table().turn_player().map(|p| p.id)?;
        let seat = seats.iter_mut().find(|s| s.id == turn)?;
        // the host writes into this view while handling the action
        let view = seat.view.borrow().clone();
        seat.driver.notify(&view);
        match seat.driver.obtain_action(&view) {
            Some(action) => {
                // rejections already reached the seat as an error notice
                let _ = host.handle(turn, action);
            }
            None => {
                info!("{} left the table", turn);
                host.disconnect(turn);
            }
        }
    }
    warn!("round abandoned after {} actions", MAX_ACTIONS);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Quitter;

    impl PlayerInterface for Quitter {
        fn name(&self) -> &str {
            "Quitter"
        }

        fn obtain_action(&mut self, _view: &PeerView) -> Option<PeerAction> {
            None
        }
    }

    /// Seats `drivers` in order; the first one is the host's own seat.
    fn table_of(seed: u64, drivers: Vec<Box<dyn PlayerInterface>>) -> (Host, Vec<Seat>) {
        let mut seats: Vec<Seat> = vec![];
        let mut host = None;
        for (n, driver) in drivers.into_iter().enumerate() {
            let id = PeerId(n as u64);
            let sink = Loopback::new(id);
            let name = driver.name().to_string();
            seats.push(Seat {
                id,
                view: sink.view(),
                driver,
            });
            match host.as_mut() {
                None => {
                    let session = Session::seeded(SessionConfig::default(), seed);
                    host = Some(Host::new(session, id, name, Box::new(sink)).unwrap());
                }
                Some(host) => {
                    host.connect(id, Box::new(sink));
                    host.handle(id, PeerAction::JoinRoom { player_name: name })
                        .unwrap();
                }
            }
        }
        (host.unwrap(), seats)
    }

    fn computer(n: u64) -> Box<dyn PlayerInterface> {
        Box::new(RandomPlayingComputer::seeded(format!("C{n}"), n))
    }

    #[test]
    fn computers_finish_a_seeded_round() {
        let (mut host, mut seats) = table_of(11, vec![computer(0), computer(1), computer(2)]);

        let winner = run_local_game(&mut host, &mut seats, Duration::ZERO);
        let winner = winner.expect("someone goes out");
        assert_eq!(host.lifecycle(), Lifecycle::Ended { winner: Some(winner) });
        let table = host.session().table();
        assert!(table.player(winner).unwrap().hand.is_empty());
        for seat in &seats {
            assert_eq!(seat.view.borrow().winner, Some(winner));
            assert!(seat.view.borrow().finished);
        }
    }

    #[test]
    fn a_leaving_seat_hands_the_round_to_the_other() {
        let (mut host, mut seats) = table_of(2, vec![Box::new(Quitter), computer(1)]);

        let winner = run_local_game(&mut host, &mut seats, Duration::ZERO);
        assert_eq!(winner, Some(PeerId(1)));
        assert!(!host.session().table().players[0].connected);
    }

    #[test]
    fn a_lone_player_never_starts() {
        let (mut host, mut seats) = table_of(2, vec![computer(0)]);
        assert_eq!(run_local_game(&mut host, &mut seats, Duration::ZERO), None);
        assert_eq!(host.lifecycle(), Lifecycle::Lobby);
    }
}

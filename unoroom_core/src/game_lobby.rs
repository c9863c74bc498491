use log::{debug, info};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    config::SessionConfig,
    error::ActionError,
    event::{EventEntry, HostEvent, PeerAction},
    game_state::{Table, TurnPhase},
    player::{PeerId, Player},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Lobby,
    Countdown { remaining: u8 },
    InProgress,
    Ended { winner: Option<PeerId> },
}

/// Lobby membership, the start countdown and the round lifecycle of one room.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    lifecycle: Lifecycle,
    table: Table,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Session::with_rng(config, StdRng::from_entropy())
    }

    pub fn seeded(config: SessionConfig, seed: u64) -> Self {
        Session::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SessionConfig, rng: StdRng) -> Self {
        Session {
            config,
            lifecycle: Lifecycle::Lobby,
            table: Table::new(rng),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn roster(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.table.players.iter().map(|p| p.id)
    }

    pub fn add_player(
        &mut self,
        id: PeerId,
        name: String,
        log: &mut Vec<EventEntry>,
    ) -> Result<(), ActionError> {
        if !matches!(
            self.lifecycle,
            Lifecycle::Lobby | Lifecycle::Countdown { .. }
        ) {
            return Err(ActionError::NotAccepting);
        }
        if self.table.player(id).is_some() {
            return Err(ActionError::DuplicatePlayer(id));
        }
        if self.table.players.len() >= self.config.max_players {
            return Err(ActionError::RoomFull);
        }

        info!("{} joined as {:?}", id, name);
        self.table.players.push(Player::new(id, name));
        log.push(EventEntry::public(HostEvent::UpdateGameInfo(
            self.table.game_info(),
        )));

        if self.lifecycle == Lifecycle::Lobby
            && self.table.players.len() >= self.config.min_players
        {
            info!("countdown started");
            self.lifecycle = Lifecycle::Countdown {
                remaining: self.config.countdown_secs,
            };
        }
        Ok(())
    }

    /// Handles a peer leaving. Returns `false` if the peer was not seated.
    pub fn remove_player(&mut self, id: PeerId, log: &mut Vec<EventEntry>) -> bool {
        let Some(index) = self.table.player_index(id) else {
            return false;
        };

        match self.lifecycle {
            Lifecycle::Lobby | Lifecycle::Countdown { .. } => {
                self.table.players.remove(index);
                info!("{} left the lobby", id);
                if matches!(self.lifecycle, Lifecycle::Countdown { .. })
                    && self.table.players.len() < self.config.min_players
                {
                    info!("countdown cancelled");
                    self.lifecycle = Lifecycle::Lobby;
                    log.push(EventEntry::public(HostEvent::CountDown(0)));
                }
                log.push(EventEntry::public(HostEvent::UpdateGameInfo(
                    self.table.game_info(),
                )));
            }
            Lifecycle::InProgress => {
                self.table.players[index].connected = false;
                info!("{} disconnected mid-round", id);
                log.push(EventEntry::public(HostEvent::UpdateGameInfo(
                    self.table.game_info(),
                )));
                if self.table.connected_count() < self.config.min_players {
                    let winner = self.table.players.iter().find(|p| p.connected).map(|p| p.id);
                    self.finish(winner, log);
                } else if self.table.turn_player().map(|p| p.id) == Some(id) {
                    self.table.forfeit_turn(log);
                }
            }
            Lifecycle::Ended { .. } => {
                self.table.players[index].connected = false;
            }
        }
        true
    }

    /// One second of countdown. Broadcasts the remaining seconds and starts
    /// the round when they run out. Does nothing outside the countdown.
    pub fn tick(&mut self, log: &mut Vec<EventEntry>) {
        let Lifecycle::Countdown { remaining } = self.lifecycle else {
            return;
        };
        if remaining > 0 {
            log.push(EventEntry::public(HostEvent::CountDown(remaining)));
        }
        let remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            // the lifecycle is Countdown, so this cannot be refused
            let _ = self.start_game(log);
        } else {
            self.lifecycle = Lifecycle::Countdown { remaining };
        }
    }

    pub fn start_game(&mut self, log: &mut Vec<EventEntry>) -> Result<(), ActionError> {
        if matches!(
            self.lifecycle,
            Lifecycle::InProgress | Lifecycle::Ended { .. }
        ) || self.table.players.len() < self.config.min_players
        {
            return Err(ActionError::NotAccepting);
        }

        self.lifecycle = Lifecycle::InProgress;
        log.push(EventEntry::public(HostEvent::CountDown(0)));
        self.table.deal(self.config.hand_size, log);
        info!(
            "round started with {} players",
            self.table.players.len()
        );
        Ok(())
    }

    pub fn handle_action(
        &mut self,
        player: PeerId,
        action: PeerAction,
        log: &mut Vec<EventEntry>,
    ) -> Result<(), ActionError> {
        let joining = matches!(action, PeerAction::JoinRoom { .. });
        if !joining && self.lifecycle != Lifecycle::InProgress {
            return Err(ActionError::NotInProgress);
        }
        debug!("{} submitted {:?}", player, action);

        match action {
            PeerAction::JoinRoom { player_name } => self.add_player(player, player_name, log),
            PeerAction::DrawCard => self.table.draw_card(player, log),
            PeerAction::PlayCard(card) => self.table.play_card(player, card, log),
            PeerAction::SelectWildColor(color) => self.table.select_wild_color(player, color, log),
            PeerAction::EndTurn => {
                let finish = self.config.end_round_on_empty_hand;
                if let Some(winner) = self.table.end_turn(player, finish, log)? {
                    self.finish(Some(winner), log);
                }
                Ok(())
            }
        }
    }

    fn finish(&mut self, winner: Option<PeerId>, log: &mut Vec<EventEntry>) {
        if let Some(round) = self.table.round.as_mut() {
            round.phase = TurnPhase::Done;
        }
        self.lifecycle = Lifecycle::Ended { winner };
        match winner {
            Some(id) => info!("round over, {} wins", id),
            None => info!("round over without a winner"),
        }
        log.push(EventEntry::public(HostEvent::RoundOver(winner)));
        log.push(EventEntry::public(HostEvent::UpdateGameInfo(
            self.table.game_info(),
        )));
    }
}

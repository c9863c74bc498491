use log::debug;

use crate::{
    card::{Card, Color, Rank},
    deck::Deck,
    error::ActionError,
    event::{EventEntry, HostEvent},
    game_state::{Direction, RoundState, Table, TurnPhase},
    player::PeerId,
    rules::is_valid_play,
};

impl Table {
    /// Shuffles a fresh deck, deals `hand_size` cards to every player in
    /// roster order, turns up a non-wild opening card and applies its effect
    /// to pick the first player.
    pub fn deal(&mut self, hand_size: usize, log: &mut Vec<EventEntry>) {
        let Table {
            players,
            deck,
            round,
            rng,
        } = self;

        *deck = Deck::shuffled(rng);
        for player in players.iter_mut() {
            player.hand = (0..hand_size).map(|_| deck.draw(rng)).collect();
        }

        let top = loop {
            let card = deck.draw(rng);
            if !card.is_wild() {
                break card;
            }
            deck.put_back(card);
            deck.shuffle(rng);
        };

        let count = players.len();
        let mut state = RoundState::new(top);
        match top.rank() {
            Rank::Draw2 => {
                for _ in 0..2 {
                    let card = deck.draw(rng);
                    players[0].hand.push(card);
                }
                state.turn_index = 1 % count;
            }
            Rank::Reverse => {
                state.direction = Direction::Backward;
                state.turn_index = count - 1;
            }
            Rank::Skip => state.turn_index = 1 % count,
            _ => {}
        }
        debug!(
            "dealt {} cards to {} players, opening card {}",
            hand_size, count, top
        );

        for player in players.iter() {
            log.push(EventEntry::private(
                player.id,
                HostEvent::HaveCard(player.hand.clone()),
            ));
        }
        log.push(EventEntry::public(HostEvent::SendCard(top)));
        log.push(EventEntry::public(HostEvent::TurnPlayer(
            players[state.turn_index].id,
        )));
        *round = Some(state);
        log.push(EventEntry::public(HostEvent::UpdateGameInfo(
            self.game_info(),
        )));
    }

    /// Index of `player` if they hold the turn.
    fn turn_holder(&self, player: PeerId) -> Result<usize, ActionError> {
        let round = self.round.as_ref().ok_or(ActionError::NotInProgress)?;
        let index = self
            .player_index(player)
            .ok_or(ActionError::UnknownPlayer(player))?;
        if index != round.turn_index {
            return Err(ActionError::NotYourTurn);
        }
        if round.phase == TurnPhase::Done {
            return Err(ActionError::NotInProgress);
        }
        Ok(index)
    }

    pub fn play_card(
        &mut self,
        player: PeerId,
        card: Card,
        log: &mut Vec<EventEntry>,
    ) -> Result<(), ActionError> {
        let index = self.turn_holder(player)?;
        let Table { players, round, .. } = self;
        let round = round.as_mut().ok_or(ActionError::NotInProgress)?;
        let hand = &mut players[index].hand;

        let position = hand
            .iter()
            .position(|&c| c == card)
            .ok_or(ActionError::CardNotInHand(card))?;
        match round.phase.played_rank() {
            Some(expected) if card.rank() != expected => {
                return Err(ActionError::RankMismatch { expected, card });
            }
            Some(_) => {}
            None => {
                if !is_valid_play(card, round.discard_top, round.active_color) {
                    return Err(ActionError::IllegalPlay {
                        card,
                        board_color: round.board_color(),
                        board_rank: round.discard_top.rank(),
                    });
                }
            }
        }

        hand.remove(position);
        round.discard_top = card;
        round.buried += 1;
        round.active_color = None;
        round.pending_draw_stack += card.rank().draw_penalty();
        if card.rank() == Rank::Reverse {
            round.direction = round.direction.flipped();
        }
        round.phase = if card.is_wild() {
            TurnPhase::AwaitingColor { rank: card.rank() }
        } else {
            TurnPhase::Played { rank: card.rank() }
        };
        debug!("{} played {}", player, card);

        log.push(EventEntry::public(HostEvent::SendCard(card)));
        log.push(EventEntry::private(
            player,
            HostEvent::HaveCard(hand.clone()),
        ));
        log.push(EventEntry::public(HostEvent::UpdateGameInfo(
            self.game_info(),
        )));
        Ok(())
    }

    /// Draws one card for the turn holder. Drawing never ends the turn.
    pub fn draw_card(
        &mut self,
        player: PeerId,
        log: &mut Vec<EventEntry>,
    ) -> Result<(), ActionError> {
        let index = self.turn_holder(player)?;
        let Table {
            players,
            deck,
            round,
            rng,
        } = self;
        let round = round.as_mut().ok_or(ActionError::NotInProgress)?;
        if round.phase.has_played() {
            return Err(ActionError::AlreadyPlayed);
        }

        let card = deck.draw(rng);
        let hand = &mut players[index].hand;
        hand.push(card);
        round.phase = TurnPhase::Drew;
        debug!("{} drew a card, {} left in deck", player, deck.len());

        log.push(EventEntry::private(
            player,
            HostEvent::HaveCard(hand.clone()),
        ));
        log.push(EventEntry::public(HostEvent::UpdateGameInfo(
            self.game_info(),
        )));
        Ok(())
    }

    pub fn select_wild_color(
        &mut self,
        player: PeerId,
        color: Color,
        log: &mut Vec<EventEntry>,
    ) -> Result<(), ActionError> {
        self.turn_holder(player)?;
        if color == Color::Black {
            return Err(ActionError::NotAColor(color));
        }
        let round = self.round.as_mut().ok_or(ActionError::NotInProgress)?;
        let TurnPhase::AwaitingColor { rank } = round.phase else {
            return Err(ActionError::NoColorPending);
        };

        round.active_color = Some(color);
        round.phase = TurnPhase::Played { rank };
        debug!("{} chose {}", player, color);

        log.push(EventEntry::public(HostEvent::WildColorSelected(color)));
        log.push(EventEntry::public(HostEvent::UpdateGameInfo(
            self.game_info(),
        )));
        Ok(())
    }

    /// Closes the turn. When the actor has no cards left and
    /// `finish_when_out` is set, the round stops there and the actor is
    /// returned as the winner; otherwise the turn passes on.
    pub fn end_turn(
        &mut self,
        player: PeerId,
        finish_when_out: bool,
        log: &mut Vec<EventEntry>,
    ) -> Result<Option<PeerId>, ActionError> {
        let index = self.turn_holder(player)?;
        let round = self.round.as_mut().ok_or(ActionError::NotInProgress)?;
        match round.phase {
            TurnPhase::NotActed | TurnPhase::Drew => return Err(ActionError::NothingPlayed),
            TurnPhase::AwaitingColor { .. } => return Err(ActionError::ColorUnresolved),
            TurnPhase::Done => return Err(ActionError::NotInProgress),
            TurnPhase::Played { .. } => {}
        }

        if finish_when_out && self.players[index].hand.is_empty() {
            round.phase = TurnPhase::Done;
            return Ok(Some(player));
        }
        self.advance(log);
        Ok(None)
    }

    /// Passes the turn on without checking what the holder did, e.g. after
    /// they disconnected. Effects already played still apply.
    pub fn forfeit_turn(&mut self, log: &mut Vec<EventEntry>) {
        if self.round.is_some() {
            self.advance(log);
        }
    }

    fn advance(&mut self, log: &mut Vec<EventEntry>) {
        let Table {
            players,
            deck,
            round,
            rng,
        } = self;
        let Some(round) = round.as_mut() else {
            return;
        };

        let steps = if round.phase.has_played() && round.discard_top.rank() == Rank::Skip {
            2
        } else {
            1
        };
        let connected: Vec<bool> = players.iter().map(|p| p.connected).collect();
        let mut next = next_seat(&connected, round.turn_index, round.direction, steps);

        if round.pending_draw_stack > 0 {
            let victim = &mut players[next];
            for _ in 0..round.pending_draw_stack {
                victim.hand.push(deck.draw(rng));
            }
            debug!(
                "{} draws {} and loses the turn",
                victim.id, round.pending_draw_stack
            );
            log.push(EventEntry::private(
                victim.id,
                HostEvent::HaveCard(victim.hand.clone()),
            ));
            round.pending_draw_stack = 0;
            next = next_seat(&connected, next, round.direction, 1);
        }

        round.turn_index = next;
        round.phase = TurnPhase::NotActed;
        log.push(EventEntry::public(HostEvent::TurnPlayer(players[next].id)));
        log.push(EventEntry::public(HostEvent::UpdateGameInfo(
            self.game_info(),
        )));
    }
}

/// Moves `steps` connected seats from `from` in `direction`, wrapping around
/// the roster. Falls back to a plain modular step when no seat is connected.
pub fn next_seat(connected: &[bool], from: usize, direction: Direction, steps: usize) -> usize {
    let len = connected.len() as isize;
    let any_connected = connected.iter().any(|&c| c);
    let mut index = from as isize;
    for _ in 0..steps {
        for _ in 0..len {
            index = (index + direction.step()).rem_euclid(len);
            if !any_connected || connected[index as usize] {
                break;
            }
        }
    }
    index as usize
}

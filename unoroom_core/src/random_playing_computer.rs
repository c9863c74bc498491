use itertools::Itertools;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{
    card::Color,
    event::PeerAction,
    player::PlayerInterface,
    view::PeerView,
};

/// Plays any legal card, keeps going while it holds the same rank and draws
/// when stuck.
pub struct RandomPlayingComputer {
    name: String,
    rng: StdRng,
}

impl RandomPlayingComputer {
    pub fn new(name: String) -> Self {
        RandomPlayingComputer {
            name,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(name: String, seed: u64) -> Self {
        RandomPlayingComputer {
            name,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The color this hand holds most of, red when it holds none.
    fn favourite_color(view: &PeerView) -> Color {
        view.hand
            .iter()
            .map(|c| c.color())
            .filter(|c| *c != Color::Black)
            .counts()
            .into_iter()
            .sorted_by_key(|(color, _)| *color as u8)
            .max_by_key(|(_, n)| *n)
            .map_or(Color::Red, |(color, _)| color)
    }
}

impl PlayerInterface for RandomPlayingComputer {
    fn name(&self) -> &str {
        &self.name
    }

    fn obtain_action(&mut self, view: &PeerView) -> Option<PeerAction> {
        if view.must_choose_color() {
            return Some(PeerAction::SelectWildColor(Self::favourite_color(view)));
        }
        if let Some(card) = view.playable_cards().choose(&mut self.rng) {
            return Some(PeerAction::PlayCard(*card));
        }
        // a turn only ends after a play, so keep drawing until one fits
        if view.played_rank.is_some() {
            Some(PeerAction::EndTurn)
        } else {
            Some(PeerAction::DrawCard)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{card::Card, event::HostEvent, player::PeerId};

    fn card(id: u8) -> Card {
        Card::new(id).unwrap()
    }

    fn view_with(hand: Vec<Card>, top: Card) -> PeerView {
        let mut view = PeerView::new(PeerId(2));
        view.apply(&HostEvent::HaveCard(hand));
        view.apply(&HostEvent::SendCard(top));
        view.apply(&HostEvent::TurnPlayer(PeerId(2)));
        view
    }

    #[test]
    fn plays_a_legal_card() {
        let mut bot = RandomPlayingComputer::seeded("Bot".into(), 1);
        let view = view_with(vec![card(17), card(3)], card(7));
        assert_eq!(bot.obtain_action(&view), Some(PeerAction::PlayCard(card(3))));
    }

    #[test]
    fn draws_when_stuck_and_ends_after_playing() {
        let mut bot = RandomPlayingComputer::seeded("Bot".into(), 1);
        let mut view = view_with(vec![card(19)], card(7));
        assert_eq!(bot.obtain_action(&view), Some(PeerAction::DrawCard));

        view.apply(&HostEvent::SendCard(card(3)));
        assert_eq!(bot.obtain_action(&view), Some(PeerAction::EndTurn));
    }

    #[test]
    fn picks_the_color_it_holds_most() {
        let mut bot = RandomPlayingComputer::seeded("Bot".into(), 1);
        // two blues and a yellow
        let mut view = view_with(vec![card(43), card(44), card(15)], card(7));
        view.apply(&HostEvent::SendCard(card(13)));
        assert_eq!(
            bot.obtain_action(&view),
            Some(PeerAction::SelectWildColor(Color::Blue))
        );
    }
}

use std::{
    io::{self, BufRead, Write},
    str::FromStr,
};

use itertools::Itertools;

use unoroom_core::{
    card::{Card, Color},
    event::PeerAction,
    player::PlayerInterface,
    view::PeerView,
};

static RULES: &str = "
*** Uno ***
Get rid of all your cards. On your turn play a card that matches the color or the symbol of the
card on the pile, or any wild card. Once you played you may add more cards of the same symbol,
whatever their color, then end your turn. If you cannot play, draw until you can.
Penalties stack: every +2 and +4 played in a turn adds up and the next player draws them all
and loses their turn. After a wild you choose the color that has to be matched next.";

#[derive(Debug, PartialEq)]
enum CliAction {
    Quit,
    Rules,
    CardEffects,
    Draw,
    EndTurn,
    Color(Color),
    Card(usize),
}

#[derive(Debug, PartialEq, Eq)]
struct ParseActionError;

impl CliAction {
    fn info(&self, hand: &[Card]) -> String {
        match self {
            CliAction::Quit => "leave the room".to_string(),
            CliAction::Rules => "display rules".to_string(),
            CliAction::CardEffects => "display card effects".to_string(),
            CliAction::Draw => "draw a card".to_string(),
            CliAction::EndTurn => "end your turn".to_string(),
            CliAction::Color(c) => format!("continue with {c}"),
            CliAction::Card(i) => hand
                .get(*i)
                .map_or_else(|| "?".to_string(), |c| format!("play {c}")),
        }
    }

    fn cmd_str(&self) -> String {
        match self {
            CliAction::Quit => "q".to_string(),
            CliAction::Rules => "r".to_string(),
            CliAction::CardEffects => "c".to_string(),
            CliAction::Draw => "d".to_string(),
            CliAction::EndTurn => "e".to_string(),
            CliAction::Color(c) => c.to_string(),
            CliAction::Card(i) => i.to_string(),
        }
    }
}

impl FromStr for CliAction {
    type Err = ParseActionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "q" => Ok(CliAction::Quit),
            "r" => Ok(CliAction::Rules),
            "c" => Ok(CliAction::CardEffects),
            "d" => Ok(CliAction::Draw),
            "e" => Ok(CliAction::EndTurn),
            s => match (Color::from_str(s), usize::from_str(s)) {
                (Ok(color), _) => Ok(CliAction::Color(color)),
                (_, Ok(i)) => Ok(CliAction::Card(i)),
                _ => Err(ParseActionError),
            },
        }
    }
}

/// What a line of input amounts to.
#[derive(Debug, PartialEq)]
pub enum Reply {
    Send(PeerAction),
    Leave,
    Nothing,
}

pub struct CliPlayer {
    name: String,
}

impl CliPlayer {
    pub fn new() -> CliPlayer {
        print!("Please Enter Name: ");
        let _ = io::stdout().flush();

        let name = match io::stdin().lock().lines().next() {
            Some(Ok(line)) if !line.trim().is_empty() => line.trim().to_string(),
            _ => "You".to_string(),
        };
        CliPlayer::named(name)
    }

    pub fn named(name: String) -> CliPlayer {
        CliPlayer { name }
    }

    fn options(view: &PeerView) -> Vec<CliAction> {
        let mut options = vec![CliAction::Quit, CliAction::Rules, CliAction::CardEffects];
        if view.must_choose_color() {
            options.extend(Color::choosable().map(CliAction::Color));
            return options;
        }
        let playable = view.playable_cards();
        options.extend(
            view.hand
                .iter()
                .positions(|c| playable.contains(c))
                .map(CliAction::Card),
        );
        if view.played_rank.is_some() {
            options.push(CliAction::EndTurn);
        } else {
            options.push(CliAction::Draw);
        }
        options
    }

    pub fn print_view(&self, view: &PeerView) {
        if let Some(seconds) = view.countdown {
            println!("Starting in {seconds}...");
            return;
        }
        if view.finished {
            match view.winner.and_then(|id| view.player_name(id)) {
                Some(name) => println!("*** {name} wins! ***"),
                None => println!("*** Round over ***"),
            }
            return;
        }
        let Some(top) = view.discard_top else {
            let names = view.players.iter().map(|p| p.name.as_str()).join(", ");
            println!("Waiting for players: {names}");
            return;
        };

        println!("================================================");
        let players = view
            .players
            .iter()
            .map(|p| {
                let marker = if Some(p.id) == view.turn_player { "*" } else { " " };
                format!("{marker}{} ({})", p.name, p.hand_size)
            })
            .join("  ");
        println!("{players}");
        match view.active_color {
            Some(color) => println!("Pile: {top}, continue with {color}"),
            None => println!("Pile: {top}"),
        }
        let hand = view
            .hand
            .iter()
            .enumerate()
            .map(|(i, c)| format!("[{i}] {c}"))
            .join("  ");
        println!("Hand: {hand}");
        if let Some(error) = &view.last_error {
            println!("! {error}");
        }
    }

    pub fn prompt(&self, view: &PeerView) {
        let prompt = if view.must_choose_color() {
            "Choose the next color:"
        } else if view.played_rank.is_some() {
            "Play another card of the same symbol or end your turn:"
        } else {
            "Choose the card you want to play:"
        };
        println!("\n{prompt}");
        for cmd in CliPlayer::options(view) {
            println!("- [{}]: {}", cmd.cmd_str(), cmd.info(&view.hand));
        }
        print!(">");
        let _ = io::stdout().flush();
    }

    /// Maps one line of input to an action. Only the authority judges
    /// legality, so anything that names a card or color is sent.
    pub fn interpret(&self, line: &str, view: &PeerView) -> Reply {
        match CliAction::from_str(line) {
            Ok(CliAction::Quit) => Reply::Leave,
            Ok(CliAction::Rules) => {
                println!("{RULES}");
                Reply::Nothing
            }
            Ok(CliAction::CardEffects) => {
                println!("{}", Card::rules());
                Reply::Nothing
            }
            Ok(CliAction::Draw) => Reply::Send(PeerAction::DrawCard),
            Ok(CliAction::EndTurn) => Reply::Send(PeerAction::EndTurn),
            Ok(CliAction::Color(color)) => Reply::Send(PeerAction::SelectWildColor(color)),
            Ok(CliAction::Card(i)) => match view.hand.get(i) {
                Some(card) => Reply::Send(PeerAction::PlayCard(*card)),
                None => {
                    println!("You have no card [{i}].");
                    Reply::Nothing
                }
            },
            Err(ParseActionError) => Reply::Nothing,
        }
    }
}

impl PlayerInterface for CliPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&self, view: &PeerView) {
        self.print_view(view);
    }

    fn obtain_action(&mut self, view: &PeerView) -> Option<PeerAction> {
        loop {
            self.prompt(view);
            let line = match io::stdin().lock().lines().next() {
                Some(Ok(line)) => line,
                _ => return None,
            };
            match self.interpret(&line, view) {
                Reply::Send(action) => return Some(action),
                Reply::Leave => return None,
                Reply::Nothing => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use unoroom_core::{event::HostEvent, player::PeerId};

    use super::*;

    fn card(id: u8) -> Card {
        Card::new(id).unwrap()
    }

    fn view() -> PeerView {
        let mut view = PeerView::new(PeerId(1));
        view.apply(&HostEvent::HaveCard(vec![card(17), card(3)]));
        view.apply(&HostEvent::SendCard(card(7)));
        view.apply(&HostEvent::TurnPlayer(PeerId(1)));
        view
    }

    #[test]
    fn parses_commands() {
        assert_eq!(CliAction::from_str("q"), Ok(CliAction::Quit));
        assert_eq!(CliAction::from_str(" 2 "), Ok(CliAction::Card(2)));
        assert_eq!(CliAction::from_str("Green"), Ok(CliAction::Color(Color::Green)));
        assert_eq!(CliAction::from_str("x"), Err(ParseActionError));
    }

    #[test]
    fn card_indices_refer_to_the_hand() {
        let player = CliPlayer::named("Ada".into());
        assert_eq!(
            player.interpret("1", &view()),
            Reply::Send(PeerAction::PlayCard(card(3)))
        );
        assert_eq!(player.interpret("5", &view()), Reply::Nothing);
        assert_eq!(player.interpret("q", &view()), Reply::Leave);
    }

    #[test]
    fn options_offer_only_playable_cards() {
        let options = CliPlayer::options(&view());
        assert!(options.contains(&CliAction::Card(1)));
        assert!(!options.contains(&CliAction::Card(0)));
        assert!(options.contains(&CliAction::Draw));
        assert!(!options.contains(&CliAction::EndTurn));
    }

    #[test]
    fn a_pending_wild_asks_for_colors() {
        let mut view = view();
        view.apply(&HostEvent::SendCard(card(13)));
        let options = CliPlayer::options(&view);
        assert!(options.contains(&CliAction::Color(Color::Blue)));
        assert!(!options.contains(&CliAction::Color(Color::Black)));
        assert!(!options.contains(&CliAction::Draw));
    }
}

use crate::card::{Card, Color};

/// The color a play has to match: the chosen wild color if one is set,
/// otherwise the discard top's own color.
pub fn effective_board_color(discard_top: Card, active_color: Option<Color>) -> Color {
    active_color.unwrap_or_else(|| discard_top.color())
}

/// Legality of the first card played in a turn.
///
/// Wild-class cards are always legal. A black board color only arises when a
/// wild was left without a color by a forfeited turn; any card matches then.
pub fn is_valid_play(card: Card, discard_top: Card, active_color: Option<Color>) -> bool {
    let board_color = effective_board_color(discard_top, active_color);
    card.is_wild()
        || board_color == Color::Black
        || card.color() == board_color
        || card.rank() == discard_top.rank()
}

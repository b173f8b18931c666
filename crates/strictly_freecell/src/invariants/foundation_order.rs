//! Foundation order: each foundation is an A..K prefix of its own suit.

use super::Invariant;
use crate::board::BoardState;
use crate::card::Suit;

/// Invariant: foundation `i`, read bottom to top, is exactly
/// A, 2, 3, ... of suit `i` with no gaps.
pub struct FoundationOrderInvariant;

impl Invariant<BoardState> for FoundationOrderInvariant {
    fn holds(state: &BoardState) -> bool {
        state.foundations().iter().zip(Suit::ALL).all(|(pile, suit)| {
            pile.iter()
                .enumerate()
                .all(|(i, card)| card.suit == suit && card.rank.value() as usize == i + 1)
        })
    }

    fn description() -> &'static str {
        "Each foundation is an ascending A..K run of its own suit"
    }
}

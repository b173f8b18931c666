//! Card conservation: the 52 cards are all present, each exactly once.

use super::Invariant;
use crate::board::{BoardState, DECK_SIZE};

/// Invariant: free cells + foundations + tableau hold the full deck with
/// no duplicates and no losses.
pub struct CardConservationInvariant;

impl Invariant<BoardState> for CardConservationInvariant {
    fn holds(state: &BoardState) -> bool {
        let mut seen = [false; DECK_SIZE];
        let mut count = 0;
        for card in state.cards() {
            let slot = &mut seen[card.ordinal()];
            if *slot {
                return false;
            }
            *slot = true;
            count += 1;
        }
        count == DECK_SIZE
    }

    fn description() -> &'static str {
        "Board holds each of the 52 cards exactly once"
    }
}

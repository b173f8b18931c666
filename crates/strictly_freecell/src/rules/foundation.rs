//! Foundation placement rules.

use crate::board::FOUNDATION_COUNT;
use crate::card::{Card, Rank};
use tracing::instrument;

/// Whether `card` may be placed on `foundation`.
///
/// An empty foundation takes only an Ace; otherwise the card must match the
/// top card's suit and be exactly one rank above it.
#[instrument(skip(foundation), fields(height = foundation.len()))]
pub fn is_valid_foundation_move(card: &Card, foundation: &[Card]) -> bool {
    match foundation.last() {
        None => card.rank == Rank::Ace,
        Some(top) => card.suit == top.suit && card.rank.value() == top.rank.value() + 1,
    }
}

/// Whether `card` can be retired to its own suit's foundation right now.
///
/// This is the single "safe move" predicate shared by auto-complete
/// detection and stepping.
#[instrument(skip(foundations))]
pub fn is_foundation_ready(card: &Card, foundations: &[Vec<Card>; FOUNDATION_COUNT]) -> bool {
    is_valid_foundation_move(card, &foundations[card.suit.foundation_index()])
}

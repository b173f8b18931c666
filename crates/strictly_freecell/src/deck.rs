//! Deck creation and the initial deal.

use crate::board::{BoardState, COLUMN_COUNT, FOUNDATION_COUNT, FREE_CELL_COUNT};
use crate::card::{Card, Rank, Suit, all_cards};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};

/// Cards dealt to each column: the first four get seven, the rest six.
pub const COLUMN_DEPTHS: [usize; COLUMN_COUNT] = [7, 7, 7, 7, 6, 6, 6, 6];

/// Returns the 52 cards in uniformly random order.
#[instrument]
pub fn create_deck() -> Vec<Card> {
    create_deck_with_rng(&mut rand::rng())
}

/// Returns the 52 cards shuffled with `rng` (Fisher–Yates).
pub fn create_deck_with_rng<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut deck: Vec<Card> = all_cards().collect();
    deck.shuffle(rng);
    deck
}

/// Deals a fresh random game.
#[instrument]
pub fn initialize_game() -> BoardState {
    deal(create_deck())
}

/// Deals the game identified by `seed`. The same seed always yields the
/// same layout.
#[instrument]
pub fn initialize_game_with_seed(seed: u64) -> BoardState {
    let mut rng = StdRng::seed_from_u64(seed);
    deal(create_deck_with_rng(&mut rng))
}

/// Deals a shuffled deck column by column into the tableau.
fn deal(deck: Vec<Card>) -> BoardState {
    let mut cards = deck.into_iter();
    let tableau: [Vec<Card>; COLUMN_COUNT] =
        std::array::from_fn(|col| cards.by_ref().take(COLUMN_DEPTHS[col]).collect());

    debug!(
        depths = ?tableau.iter().map(Vec::len).collect::<Vec<_>>(),
        "Dealt tableau"
    );
    info!("New game dealt");

    BoardState::assemble([None; FREE_CELL_COUNT], Default::default(), tableau)
}

/// A near-won diagnostic layout for exercising auto-complete.
///
/// Foundations: hearts A–Q, diamonds A–J, clubs A–10, spades A–9.
/// Tableau: `[10♠, K♥]`, `[Q♦]`, `[J♣]`, `[K♣]`, `[Q♠]`, `[K♠]`, two empty
/// columns. Free cells: empty, K♦, Q♣, J♠.
#[instrument]
pub fn near_won_fixture() -> BoardState {
    let run = |suit: Suit, top: Rank| -> Vec<Card> {
        (1..=top.value())
            .filter_map(Rank::from_value)
            .map(|rank| Card::new(rank, suit))
            .collect()
    };

    let foundations: [Vec<Card>; FOUNDATION_COUNT] = [
        run(Suit::Hearts, Rank::Queen),
        run(Suit::Diamonds, Rank::Jack),
        run(Suit::Clubs, Rank::Ten),
        run(Suit::Spades, Rank::Nine),
    ];

    let mut tableau: [Vec<Card>; COLUMN_COUNT] = Default::default();
    tableau[0] = vec![
        Card::new(Rank::Ten, Suit::Spades),
        Card::new(Rank::King, Suit::Hearts),
    ];
    tableau[1] = vec![Card::new(Rank::Queen, Suit::Diamonds)];
    tableau[2] = vec![Card::new(Rank::Jack, Suit::Clubs)];
    tableau[3] = vec![Card::new(Rank::King, Suit::Clubs)];
    tableau[4] = vec![Card::new(Rank::Queen, Suit::Spades)];
    tableau[5] = vec![Card::new(Rank::King, Suit::Spades)];

    let free_cells = [
        None,
        Some(Card::new(Rank::King, Suit::Diamonds)),
        Some(Card::new(Rank::Queen, Suit::Clubs)),
        Some(Card::new(Rank::Jack, Suit::Spades)),
    ];

    BoardState::assemble(free_cells, foundations, tableau)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::DECK_SIZE;
    use std::collections::HashSet;

    #[test]
    fn test_deck_has_every_card_once() {
        let deck = create_deck();
        assert_eq!(deck.len(), DECK_SIZE);
        let unique: HashSet<Card> = deck.iter().copied().collect();
        assert_eq!(unique.len(), DECK_SIZE);
    }

    #[test]
    fn test_seeded_deck_is_reproducible() {
        let a = create_deck_with_rng(&mut StdRng::seed_from_u64(42));
        let b = create_deck_with_rng(&mut StdRng::seed_from_u64(42));
        let c = create_deck_with_rng(&mut StdRng::seed_from_u64(43));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_initial_deal_shape() {
        let state = initialize_game();
        assert_eq!(state.moves(), 0);
        assert!(!state.is_won());
        let depths: Vec<usize> = state.tableau().iter().map(Vec::len).collect();
        assert_eq!(depths, COLUMN_DEPTHS.to_vec());
        assert!(state.free_cells().iter().all(Option::is_none));
        assert!(state.foundations().iter().all(Vec::is_empty));
        assert_eq!(state.cards().count(), DECK_SIZE);
    }

    #[test]
    fn test_shuffle_moves_cards_around() {
        // Distinct seeds should essentially never give the canonical order.
        let canonical: Vec<Card> = all_cards().collect();
        let shuffled = create_deck_with_rng(&mut StdRng::seed_from_u64(9));
        assert_ne!(canonical, shuffled);
    }

    #[test]
    fn test_fixture_layout() {
        let state = near_won_fixture();
        assert_eq!(state.cards_remaining(), 10);
        assert_eq!(state.cards().count(), DECK_SIZE);
        assert_eq!(state.foundations()[0].len(), 12);
        assert_eq!(state.foundations()[1].len(), 11);
        assert_eq!(state.foundations()[2].len(), 10);
        assert_eq!(state.foundations()[3].len(), 9);
        assert_eq!(state.free_cell(0), None);
        assert_eq!(state.top_card(0), Some(Card::new(Rank::King, Suit::Hearts)));
        assert_eq!(state.empty_columns(), 2);
    }
}

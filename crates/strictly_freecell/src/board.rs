//! Board state: free cells, foundations, tableau, move counter.
//!
//! A [`BoardState`] is a snapshot. The public move API never mutates one in
//! place; it produces a new value, so a rejected move leaves the caller's
//! snapshot untouched by construction.

use crate::card::{Card, Suit};
use crate::rules::foundation::is_valid_foundation_move;
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::instrument;

/// Number of free cells.
pub const FREE_CELL_COUNT: usize = 4;
/// Number of foundations, one per suit.
pub const FOUNDATION_COUNT: usize = 4;
/// Number of tableau columns.
pub const COLUMN_COUNT: usize = 8;
/// Cards in a full deck.
pub const DECK_SIZE: usize = 52;
/// Cards in a complete foundation.
pub const FOUNDATION_SIZE: usize = 13;

/// Complete game snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub(crate) free_cells: [Option<Card>; FREE_CELL_COUNT],
    pub(crate) foundations: [Vec<Card>; FOUNDATION_COUNT],
    pub(crate) tableau: [Vec<Card>; COLUMN_COUNT],
    pub(crate) moves: u32,
    pub(crate) is_won: bool,
    pub(crate) started_at: DateTime<Utc>,
}

/// Reasons a hand-built layout is not a valid board.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum LayoutError {
    /// The layout does not hold exactly 52 cards.
    #[display("Layout holds {} cards, expected 52", _0)]
    WrongCardCount(usize),
    /// A card appears more than once.
    #[display("Card {} appears more than once", _0)]
    DuplicateCard(Card),
    /// A foundation is not an in-suit A..K prefix.
    #[display("Foundation {} is not an ascending run of its suit", _0)]
    FoundationOutOfOrder(usize),
}

impl std::error::Error for LayoutError {}

impl BoardState {
    /// Builds a board from explicit containers, checking card conservation
    /// and foundation order. The move counter starts at zero.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if the containers do not hold the 52 distinct
    /// cards or a foundation is out of order.
    #[instrument(skip_all)]
    pub fn from_parts(
        free_cells: [Option<Card>; FREE_CELL_COUNT],
        foundations: [Vec<Card>; FOUNDATION_COUNT],
        tableau: [Vec<Card>; COLUMN_COUNT],
    ) -> Result<Self, LayoutError> {
        let state = Self::assemble(free_cells, foundations, tableau);

        let mut seen = HashSet::with_capacity(DECK_SIZE);
        for card in state.cards() {
            if !seen.insert(card) {
                return Err(LayoutError::DuplicateCard(card));
            }
        }
        if seen.len() != DECK_SIZE {
            return Err(LayoutError::WrongCardCount(seen.len()));
        }

        for (index, foundation) in state.foundations.iter().enumerate() {
            if !is_ordered_foundation(index, foundation) {
                return Err(LayoutError::FoundationOutOfOrder(index));
            }
        }

        Ok(state)
    }

    pub(crate) fn assemble(
        free_cells: [Option<Card>; FREE_CELL_COUNT],
        foundations: [Vec<Card>; FOUNDATION_COUNT],
        tableau: [Vec<Card>; COLUMN_COUNT],
    ) -> Self {
        let mut state = Self {
            free_cells,
            foundations,
            tableau,
            moves: 0,
            is_won: false,
            started_at: Utc::now(),
        };
        state.is_won = crate::rules::check_win(&state);
        state
    }

    /// The free cells, in index order.
    pub fn free_cells(&self) -> &[Option<Card>; FREE_CELL_COUNT] {
        &self.free_cells
    }

    /// The foundations, indexed by [`Suit::foundation_index`].
    pub fn foundations(&self) -> &[Vec<Card>; FOUNDATION_COUNT] {
        &self.foundations
    }

    /// The tableau columns, bottom card first.
    pub fn tableau(&self) -> &[Vec<Card>; COLUMN_COUNT] {
        &self.tableau
    }

    /// Number of successfully executed moves.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// True once every foundation holds all thirteen ranks.
    pub fn is_won(&self) -> bool {
        self.is_won
    }

    /// When the game started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Whole seconds elapsed between the start and `now`, clamped at zero.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        (now - self.started_at).num_seconds().max(0) as u64
    }

    /// The card in free cell `index`, if any.
    pub fn free_cell(&self, index: usize) -> Option<Card> {
        self.free_cells.get(index).copied().flatten()
    }

    /// The exposed card of tableau column `index`, if any.
    pub fn top_card(&self, column: usize) -> Option<Card> {
        self.tableau.get(column).and_then(|c| c.last().copied())
    }

    /// The foundation pile for `suit`.
    pub fn foundation(&self, suit: Suit) -> &[Card] {
        &self.foundations[suit.foundation_index()]
    }

    /// The highest card on the foundation for `suit`.
    pub fn foundation_top(&self, suit: Suit) -> Option<Card> {
        self.foundation(suit).last().copied()
    }

    /// Count of empty free cells.
    pub fn empty_free_cells(&self) -> usize {
        self.free_cells.iter().filter(|c| c.is_none()).count()
    }

    /// Count of empty tableau columns.
    pub fn empty_columns(&self) -> usize {
        self.tableau.iter().filter(|c| c.is_empty()).count()
    }

    /// Cards not yet on a foundation.
    pub fn cards_remaining(&self) -> usize {
        self.free_cells.iter().flatten().count() + self.tableau.iter().map(Vec::len).sum::<usize>()
    }

    /// Every card on the board: free cells, then foundations, then tableau.
    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.free_cells
            .iter()
            .flatten()
            .copied()
            .chain(self.foundations.iter().flatten().copied())
            .chain(self.tableau.iter().flatten().copied())
    }

    /// Formats the board as a human-readable text layout.
    pub fn display(&self) -> String {
        let mut out = String::new();

        out.push_str("Cells: ");
        for cell in &self.free_cells {
            out.push_str(&slot(cell.as_ref()));
        }
        out.push_str("  Foundations: ");
        for foundation in &self.foundations {
            out.push_str(&slot(foundation.last()));
        }
        out.push('\n');

        let depth = self.tableau.iter().map(Vec::len).max().unwrap_or(0);
        out.push_str(&(0..COLUMN_COUNT).map(|i| format!("  t{i} ")).collect::<String>());
        out.push('\n');
        for row in 0..depth {
            for column in &self.tableau {
                out.push_str(&slot(column.get(row)));
            }
            out.push('\n');
        }

        out.push_str(&format!("Moves: {}", self.moves));
        if self.is_won {
            out.push_str("  (won)");
        }
        out
    }
}

fn slot(card: Option<&Card>) -> String {
    match card {
        Some(card) => format!("{:>4} ", card.to_string()),
        None => "  .. ".to_string(),
    }
}

fn is_ordered_foundation(index: usize, foundation: &[Card]) -> bool {
    let Some(suit) = Suit::from_foundation_index(index) else {
        return false;
    };
    let mut built: Vec<Card> = Vec::with_capacity(FOUNDATION_SIZE);
    for card in foundation {
        if card.suit != suit || !is_valid_foundation_move(card, &built) {
            return false;
        }
        built.push(*card);
    }
    true
}

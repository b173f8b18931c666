//! Tableau placement and sequence ("super-move") rules.

use crate::board::BoardState;
use crate::card::Card;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Whether `card` may be placed on a column whose exposed card is `target`.
///
/// An empty column accepts anything. Otherwise the target must be exactly
/// one rank higher and of the opposite color.
#[instrument]
pub fn is_valid_tableau_move(card: &Card, target: Option<&Card>) -> bool {
    match target {
        None => true,
        Some(target) => {
            card.rank.value() + 1 == target.rank.value() && card.color() != target.color()
        }
    }
}

/// Whether `column[start..]` is a descending, alternating-color run.
///
/// Returns false when `start` is past the end of the column.
#[instrument(skip(column), fields(len = column.len()))]
pub fn can_move_sequence(column: &[Card], start: usize) -> bool {
    let Some(run) = column.get(start..) else {
        return false;
    };
    if run.is_empty() {
        return false;
    }
    run.windows(2)
        .all(|pair| is_valid_tableau_move(&pair[1], Some(&pair[0])))
}

/// Largest run that could be relocated one card at a time through the
/// currently empty free cells and columns: `2^cells × (columns + 1)`.
#[instrument(skip(state))]
pub fn max_movable_sequence_length(state: &BoardState) -> usize {
    (1usize << state.empty_free_cells()) * (state.empty_columns() + 1)
}

/// How column-to-column sequence moves are bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceRule {
    /// Runs longer than [`max_movable_sequence_length`] are rejected.
    #[default]
    Capacity,
    /// Any valid run moves in one step regardless of free space.
    Unbounded,
}

impl SequenceRule {
    /// Longest run this rule permits on `state`.
    pub fn limit(self, state: &BoardState) -> usize {
        match self {
            SequenceRule::Capacity => max_movable_sequence_length(state),
            SequenceRule::Unbounded => usize::MAX,
        }
    }
}

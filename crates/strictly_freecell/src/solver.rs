//! Auto-complete solver.
//!
//! Detects when the remaining cards can be retired to the foundations by
//! safe frontier moves alone, and hands out those moves one at a time. The
//! detector is greedy and deterministic: it never rearranges the tableau
//! and never backtracks.

use crate::action::{Destination, Move, Source};
use crate::board::{BoardState, DECK_SIZE};
use crate::card::Card;
use crate::rules::is_foundation_ready;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Upper bound on simulated retirements; one per card in the deck.
pub const SIMULATION_LIMIT: usize = DECK_SIZE;

/// A single safe retirement of a frontier card to its foundation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AutoMove {
    /// Where the card currently sits.
    pub source: Source,
    /// The card being retired.
    pub card: Card,
    /// Index of the card's foundation.
    pub foundation: usize,
}

impl AutoMove {
    /// The destination locator.
    pub fn destination(&self) -> Destination {
        Destination::Foundation(self.foundation)
    }

    /// The move the executor should apply.
    pub fn as_move(&self) -> Move {
        Move::new(self.source, self.destination())
    }
}

/// Exposed cards: free-cell occupants in index order, then the top card of
/// each column in index order.
fn frontier(state: &BoardState) -> impl Iterator<Item = (Source, Card)> + '_ {
    let cells = state
        .free_cells()
        .iter()
        .enumerate()
        .filter_map(|(i, slot)| slot.map(|card| (Source::FreeCell(i), card)));
    let tops = state
        .tableau()
        .iter()
        .enumerate()
        .filter_map(|(i, column)| column.last().map(|card| (Source::column(i), *card)));
    cells.chain(tops)
}

/// The first frontier card that is safe to retire right now.
#[instrument(skip(state), fields(moves = state.moves()))]
pub fn next_auto_complete_move(state: &BoardState) -> Option<AutoMove> {
    let next = frontier(state)
        .find(|(_, card)| is_foundation_ready(card, state.foundations()))
        .map(|(source, card)| AutoMove {
            source,
            card,
            foundation: card.suit.foundation_index(),
        });
    debug!(next = ?next.map(|m| m.card.to_string()), "Next safe frontier card");
    next
}

/// Simulates greedy retirement on a private copy of `state`.
///
/// Returns the full sequence of retirements when it clears the board, or
/// `None` when the simulation stalls with cards left over. An already-won
/// board yields an empty plan.
#[instrument(skip(state), fields(remaining = state.cards_remaining()))]
pub fn auto_complete_plan(state: &BoardState) -> Option<Vec<AutoMove>> {
    let mut scratch = state.clone();
    let mut plan = Vec::new();

    for _ in 0..SIMULATION_LIMIT {
        let Some(step) = next_auto_complete_move(&scratch) else {
            break;
        };
        retire(&mut scratch, &step);
        plan.push(step);
    }

    let remaining = scratch.cards_remaining();
    debug!(steps = plan.len(), remaining, "Auto-complete simulation finished");
    (remaining == 0).then_some(plan)
}

/// Whether the game can be finished by safe foundation moves alone.
pub fn can_auto_complete(state: &BoardState) -> bool {
    auto_complete_plan(state).is_some()
}

fn retire(scratch: &mut BoardState, step: &AutoMove) {
    match step.source {
        Source::FreeCell(i) => scratch.free_cells[i] = None,
        Source::Tableau { column, .. } => {
            scratch.tableau[column].pop();
        }
        // Foundations are never part of the frontier.
        Source::Foundation(_) => return,
    }
    scratch.foundations[step.foundation].push(step.card);
}

//! Contract-based validation for moves.
//!
//! Contracts formalize Hoare-style reasoning: {P} move {Q}. Preconditions
//! are the legality rules and always run; postconditions re-check the board
//! invariants and run in debug builds.

use crate::action::{Move, MoveError};
use crate::board::BoardState;
use crate::executor::plan;
use crate::invariants::{BoardInvariants, InvariantSet};
use crate::rules::SequenceRule;
use tracing::{instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A, rule: SequenceRule) -> Result<(), MoveError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), MoveError>;
}

// ─────────────────────────────────────────────────────────────
//  Move Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for board moves.
///
/// Preconditions:
/// - Game not yet won
/// - Locators in range, source non-empty
/// - Placement legal at the destination
///
/// Postconditions:
/// - All 52 cards conserved
/// - Foundations remain ordered
/// - Won flag matches foundations
/// - Move counter advanced by exactly one
pub struct MoveContract;

impl Contract<BoardState, Move> for MoveContract {
    fn pre(state: &BoardState, action: &Move, rule: SequenceRule) -> Result<(), MoveError> {
        plan(state, action, rule).map(|_| ())
    }

    #[instrument(skip_all)]
    fn post(before: &BoardState, after: &BoardState) -> Result<(), MoveError> {
        if after.moves() != before.moves() + 1 {
            warn!(
                before = before.moves(),
                after = after.moves(),
                "Move counter did not advance by one"
            );
            return Err(MoveError::InvariantViolation(
                "Postcondition failed: move counter must advance by one".to_string(),
            ));
        }

        BoardInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            warn!(%descriptions, "Board invariants violated after move");
            MoveError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })
    }
}

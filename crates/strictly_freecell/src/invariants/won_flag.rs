//! Won flag consistency.

use super::Invariant;
use crate::board::BoardState;
use crate::rules::check_win;

/// Invariant: the stored won flag equals the derived win condition.
pub struct WonFlagInvariant;

impl Invariant<BoardState> for WonFlagInvariant {
    fn holds(state: &BoardState) -> bool {
        state.is_won() == check_win(state)
    }

    fn description() -> &'static str {
        "Won flag matches the foundations"
    }
}

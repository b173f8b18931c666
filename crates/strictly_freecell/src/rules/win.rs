//! Win detection.

use crate::board::{BoardState, FOUNDATION_SIZE};
use tracing::instrument;

/// True iff every foundation holds all thirteen ranks.
#[instrument(skip(state))]
pub fn check_win(state: &BoardState) -> bool {
    state
        .foundations()
        .iter()
        .all(|foundation| foundation.len() == FOUNDATION_SIZE)
}

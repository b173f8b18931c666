//! Move executor.
//!
//! Validates a requested move against the legality rules and, if it
//! passes, returns a new [`BoardState`]. The input snapshot is never
//! modified: rejection is simply an `Err` alongside the untouched original.

use crate::action::{Destination, Move, MoveError, Source};
use crate::board::{BoardState, COLUMN_COUNT, FOUNDATION_COUNT, FREE_CELL_COUNT};
use crate::card::Card;
use crate::contracts::{Contract, MoveContract};
use crate::rules::{
    SequenceRule, can_move_sequence, check_win, is_valid_foundation_move, is_valid_tableau_move,
};
use tracing::{debug, instrument};

/// A validated transfer of `count` cards from the end of a source to a
/// destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Transfer {
    from: Source,
    to: Destination,
    count: usize,
}

/// Applies a move under the default [`SequenceRule`].
///
/// # Errors
///
/// Returns [`MoveError`] describing why the move is illegal or malformed.
pub fn apply_move(
    state: &BoardState,
    from: Source,
    to: Destination,
) -> Result<BoardState, MoveError> {
    apply_move_with(state, Move::new(from, to), SequenceRule::default())
}

/// Applies a move, bounding sequence moves by `rule`.
///
/// On success the returned board has the cards relocated, the move counter
/// advanced by one, and the won flag recomputed.
///
/// # Errors
///
/// Returns [`MoveError`] describing why the move is illegal or malformed.
#[instrument(skip(state), fields(action = %action, moves = state.moves()))]
pub fn apply_move_with(
    state: &BoardState,
    action: Move,
    rule: SequenceRule,
) -> Result<BoardState, MoveError> {
    let transfer = plan(state, &action, rule).inspect_err(|e| {
        debug!(error = %e, "Move rejected");
    })?;

    let next = commit(state, transfer);

    #[cfg(debug_assertions)]
    MoveContract::post(state, &next)?;

    debug!(cards = transfer.count, won = next.is_won(), "Move applied");
    Ok(next)
}

/// Whether `action` would be accepted on `state`.
pub fn can_apply(state: &BoardState, action: &Move, rule: SequenceRule) -> bool {
    MoveContract::pre(state, action, rule).is_ok()
}

/// Every move the executor would accept on `state`.
///
/// Tableau runs are listed once per legal start index.
#[instrument(skip(state))]
pub fn legal_moves(state: &BoardState, rule: SequenceRule) -> Vec<Move> {
    let mut sources: Vec<Source> = Vec::new();
    sources.extend((0..FREE_CELL_COUNT).map(Source::FreeCell));
    sources.extend((0..FOUNDATION_COUNT).map(Source::Foundation));
    for (column, cards) in state.tableau().iter().enumerate() {
        sources.push(Source::column(column));
        sources.extend((0..cards.len().saturating_sub(1)).map(|start| Source::run(column, start)));
    }

    let destinations: Vec<Destination> = (0..FREE_CELL_COUNT)
        .map(Destination::FreeCell)
        .chain((0..FOUNDATION_COUNT).map(Destination::Foundation))
        .chain((0..COLUMN_COUNT).map(Destination::Tableau))
        .collect();

    let moves: Vec<Move> = sources
        .iter()
        .flat_map(|from| destinations.iter().map(move |to| Move::new(*from, *to)))
        .filter(|action| can_apply(state, action, rule))
        .collect();

    debug!(count = moves.len(), "Enumerated legal moves");
    moves
}

// ─────────────────────────────────────────────────────────────
//  Validation
// ─────────────────────────────────────────────────────────────

/// Checks legality and resolves the move into a concrete transfer.
pub(crate) fn plan(
    state: &BoardState,
    action: &Move,
    rule: SequenceRule,
) -> Result<Transfer, MoveError> {
    if state.is_won() {
        return Err(MoveError::GameOver);
    }

    match (action.from, action.to) {
        (Source::Tableau { column, start }, Destination::Tableau(dest)) => {
            plan_sequence(state, column, start, dest, rule)
        }
        (from, to) => plan_single(state, from, to),
    }
}

fn plan_single(state: &BoardState, from: Source, to: Destination) -> Result<Transfer, MoveError> {
    let card = source_card(state, from)?;

    match to {
        Destination::FreeCell(i) => {
            let slot = state.free_cells.get(i).ok_or(MoveError::NoSuchCell(i))?;
            if from == Source::FreeCell(i) {
                return Err(MoveError::SameLocation);
            }
            if slot.is_some() {
                return Err(MoveError::CellOccupied(i));
            }
        }
        Destination::Foundation(i) => {
            let pile = state
                .foundations
                .get(i)
                .ok_or(MoveError::NoSuchFoundation(i))?;
            if from == Source::Foundation(i) {
                return Err(MoveError::SameLocation);
            }
            let expected = card.suit.foundation_index();
            if i != expected {
                return Err(MoveError::WrongFoundation { expected, got: i });
            }
            if !is_valid_foundation_move(&card, pile) {
                return Err(MoveError::IllegalFoundationPlacement);
            }
        }
        Destination::Tableau(i) => {
            let column = state.tableau.get(i).ok_or(MoveError::NoSuchColumn(i))?;
            if !is_valid_tableau_move(&card, column.last()) {
                return Err(MoveError::IllegalTableauPlacement);
            }
        }
    }

    Ok(Transfer { from, to, count: 1 })
}

/// The single card a non-sequence move would take from `from`.
fn source_card(state: &BoardState, from: Source) -> Result<Card, MoveError> {
    match from {
        Source::FreeCell(i) => state
            .free_cells
            .get(i)
            .ok_or(MoveError::NoSuchCell(i))?
            .ok_or(MoveError::EmptySource),
        Source::Tableau { column, start } => {
            let cards = state
                .tableau
                .get(column)
                .ok_or(MoveError::NoSuchColumn(column))?;
            let top = cards.last().copied().ok_or(MoveError::EmptySource)?;
            match start {
                Some(index) if index >= cards.len() => {
                    Err(MoveError::NoSuchCard { column, index })
                }
                Some(index) if index + 1 != cards.len() => Err(MoveError::SequenceToNonTableau),
                _ => Ok(top),
            }
        }
        Source::Foundation(i) => state
            .foundations
            .get(i)
            .ok_or(MoveError::NoSuchFoundation(i))?
            .last()
            .copied()
            .ok_or(MoveError::EmptySource),
    }
}

fn plan_sequence(
    state: &BoardState,
    column: usize,
    start: Option<usize>,
    dest: usize,
    rule: SequenceRule,
) -> Result<Transfer, MoveError> {
    let cards = state
        .tableau
        .get(column)
        .ok_or(MoveError::NoSuchColumn(column))?;
    let target = state
        .tableau
        .get(dest)
        .ok_or(MoveError::NoSuchColumn(dest))?;
    if column == dest {
        return Err(MoveError::SameLocation);
    }
    if cards.is_empty() {
        return Err(MoveError::EmptySource);
    }

    let start = start.unwrap_or(cards.len() - 1);
    if start >= cards.len() {
        return Err(MoveError::NoSuchCard {
            column,
            index: start,
        });
    }
    if !can_move_sequence(cards, start) {
        return Err(MoveError::BrokenSequence);
    }

    let len = cards.len() - start;
    let max = rule.limit(state);
    if len > max {
        return Err(MoveError::SequenceTooLong { len, max });
    }

    if !is_valid_tableau_move(&cards[start], target.last()) {
        return Err(MoveError::IllegalTableauPlacement);
    }

    Ok(Transfer {
        from: Source::run(column, start),
        to: Destination::Tableau(dest),
        count: len,
    })
}

// ─────────────────────────────────────────────────────────────
//  Commit
// ─────────────────────────────────────────────────────────────

/// Builds the successor board for a validated transfer.
fn commit(state: &BoardState, transfer: Transfer) -> BoardState {
    let mut next = state.clone();

    let moving: Vec<Card> = match transfer.from {
        Source::FreeCell(i) => next.free_cells[i].take().into_iter().collect(),
        Source::Tableau { column, .. } => {
            let cards = &mut next.tableau[column];
            let at = cards.len() - transfer.count;
            cards.split_off(at)
        }
        Source::Foundation(i) => next.foundations[i].pop().into_iter().collect(),
    };

    match transfer.to {
        Destination::FreeCell(i) => next.free_cells[i] = moving.into_iter().next(),
        Destination::Tableau(i) => next.tableau[i].extend(moving),
        Destination::Foundation(i) => next.foundations[i].extend(moving),
    }

    next.moves += 1;
    next.is_won = check_win(&next);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::FOUNDATION_SIZE;
    use crate::card::{Rank, Suit, all_cards};
    use crate::deck::{initialize_game_with_seed, near_won_fixture};

    fn card(s: &str) -> Card {
        s.parse().expect("card notation")
    }

    /// Builds a board around the given cells and columns, putting every
    /// other card in the remaining columns.
    fn board_with(free_cells: [Option<Card>; 4], columns: &[(usize, Vec<Card>)]) -> BoardState {
        let mut tableau: [Vec<Card>; COLUMN_COUNT] = Default::default();
        let mut placed: Vec<Card> = free_cells.iter().flatten().copied().collect();
        for (index, cards) in columns {
            tableau[*index] = cards.clone();
            placed.extend(cards.iter().copied());
        }
        let spare: Vec<usize> = (0..COLUMN_COUNT)
            .filter(|i| !columns.iter().any(|(c, _)| c == i))
            .collect();
        for (n, c) in all_cards().filter(|c| !placed.contains(c)).enumerate() {
            tableau[spare[n % spare.len()]].push(c);
        }
        BoardState::from_parts(free_cells, Default::default(), tableau).expect("valid layout")
    }

    #[test]
    fn test_free_cell_ace_to_foundation() {
        let state = board_with([Some(card("Ah")), None, None, None], &[]);
        let next = apply_move(&state, Source::FreeCell(0), Destination::Foundation(0))
            .expect("legal move");
        assert_eq!(next.foundation(Suit::Hearts), &[card("Ah")]);
        assert_eq!(next.free_cell(0), None);
        assert_eq!(next.moves(), 1);
        // The input snapshot is untouched.
        assert_eq!(state.free_cell(0), Some(card("Ah")));
        assert_eq!(state.moves(), 0);
    }

    #[test]
    fn test_illegal_tableau_move_leaves_state_unchanged() {
        let state = board_with(
            [None; 4],
            &[(0, vec![card("Kh"), card("5c")]), (1, vec![card("9d")])],
        );
        let result = apply_move(&state, Source::column(1), Destination::Tableau(0));
        assert_eq!(result, Err(MoveError::IllegalTableauPlacement));
        assert_eq!(state.moves(), 0);
    }

    #[test]
    fn test_rejection_is_idempotent() {
        let state = initialize_game_with_seed(11);
        let bad = Move::new(Source::FreeCell(0), Destination::Tableau(0));
        let once = apply_move_with(&state, bad, SequenceRule::Capacity);
        let twice = apply_move_with(&state, bad, SequenceRule::Capacity);
        assert_eq!(once, Err(MoveError::EmptySource));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sequence_move_to_empty_column() {
        let state = board_with(
            [None; 4],
            &[
                (0, vec![card("2h"), card("8s"), card("7d"), card("6c")]),
                (1, vec![]),
            ],
        );
        let next = apply_move(&state, Source::run(0, 2), Destination::Tableau(1))
            .expect("legal sequence move");
        assert_eq!(next.tableau()[0], vec![card("2h"), card("8s")]);
        assert_eq!(next.tableau()[1], vec![card("7d"), card("6c")]);
        assert_eq!(next.moves(), 1);
    }

    #[test]
    fn test_sequence_start_defaults_to_top_card() {
        let state = board_with(
            [None; 4],
            &[(0, vec![card("8s"), card("7d")]), (1, vec![])],
        );
        let next = apply_move(&state, Source::column(0), Destination::Tableau(1))
            .expect("legal move");
        assert_eq!(next.tableau()[0], vec![card("8s")]);
        assert_eq!(next.tableau()[1], vec![card("7d")]);
    }

    #[test]
    fn test_broken_sequence_rejected() {
        let state = board_with(
            [None; 4],
            &[(0, vec![card("8s"), card("7c"), card("6h")]), (1, vec![])],
        );
        let result = apply_move(&state, Source::run(0, 0), Destination::Tableau(1));
        assert_eq!(result, Err(MoveError::BrokenSequence));
    }

    #[test]
    fn test_capacity_rule_limits_run_length() {
        let run = vec![card("Ks"), card("Qh"), card("Jc"), card("10d")];
        let cells = [Some(card("2s")), Some(card("3s")), Some(card("4s")), None];
        let state = board_with(cells, &[(0, run), (1, vec![])]);
        // One empty cell, one empty column: 2 * 2 = 4 cards fit.
        assert!(apply_move(&state, Source::run(0, 0), Destination::Tableau(1)).is_ok());

        let run = vec![card("Ks"), card("Qh"), card("Jc"), card("10d"), card("9s")];
        let state = board_with(cells, &[(0, run), (1, vec![])]);
        let action = Move::new(Source::run(0, 0), Destination::Tableau(1));
        assert_eq!(
            apply_move_with(&state, action, SequenceRule::Capacity),
            Err(MoveError::SequenceTooLong { len: 5, max: 4 })
        );
        assert!(apply_move_with(&state, action, SequenceRule::Unbounded).is_ok());
    }

    #[test]
    fn test_empty_target_column_counts_toward_capacity() {
        let run = vec![card("Ks"), card("Qh"), card("Jc"), card("10d")];
        let cells = [Some(card("2s")), Some(card("3s")), Some(card("4s")), None];
        let state = board_with(cells, &[(0, run.clone()), (1, vec![])]);
        assert_eq!(state.empty_columns(), 1);
        assert_eq!(crate::rules::max_movable_sequence_length(&state), 4);

        let next = apply_move_with(
            &state,
            Move::new(Source::run(0, 0), Destination::Tableau(1)),
            SequenceRule::Capacity,
        )
        .expect("target column is counted");
        assert!(next.tableau()[0].is_empty());
        assert_eq!(next.tableau()[1], run);
        assert_eq!(next.moves(), 1);
    }

    #[test]
    fn test_run_cannot_go_to_free_cell() {
        let state = board_with([None; 4], &[(0, vec![card("8s"), card("7d")])]);
        let result = apply_move(&state, Source::run(0, 0), Destination::FreeCell(0));
        assert_eq!(result, Err(MoveError::SequenceToNonTableau));
    }

    #[test]
    fn test_occupied_free_cell_rejected() {
        let state = board_with([Some(card("Ks")), None, None, None], &[]);
        let result = apply_move(&state, Source::column(0), Destination::FreeCell(0));
        assert_eq!(result, Err(MoveError::CellOccupied(0)));
    }

    #[test]
    fn test_free_cell_to_free_cell() {
        let state = board_with([Some(card("Ks")), None, None, None], &[]);
        let next = apply_move(&state, Source::FreeCell(0), Destination::FreeCell(3))
            .expect("legal move");
        assert_eq!(next.free_cell(3), Some(card("Ks")));
        assert_eq!(
            apply_move(&state, Source::FreeCell(0), Destination::FreeCell(0)),
            Err(MoveError::SameLocation)
        );
    }

    #[test]
    fn test_wrong_foundation_slot_rejected() {
        let state = board_with([Some(card("Ah")), None, None, None], &[]);
        let result = apply_move(&state, Source::FreeCell(0), Destination::Foundation(3));
        assert_eq!(
            result,
            Err(MoveError::WrongFoundation {
                expected: 0,
                got: 3
            })
        );
    }

    #[test]
    fn test_malformed_locators_rejected() {
        let state = initialize_game_with_seed(5);
        assert_eq!(
            apply_move(&state, Source::FreeCell(9), Destination::FreeCell(0)),
            Err(MoveError::NoSuchCell(9))
        );
        assert_eq!(
            apply_move(&state, Source::column(8), Destination::Tableau(0)),
            Err(MoveError::NoSuchColumn(8))
        );
        assert_eq!(
            apply_move(&state, Source::column(0), Destination::Tableau(42)),
            Err(MoveError::NoSuchColumn(42))
        );
        assert_eq!(
            apply_move(&state, Source::Foundation(4), Destination::FreeCell(0)),
            Err(MoveError::NoSuchFoundation(4))
        );
        assert_eq!(
            apply_move(&state, Source::run(0, 30), Destination::Tableau(1)),
            Err(MoveError::NoSuchCard {
                column: 0,
                index: 30
            })
        );
        assert_eq!(
            apply_move(&state, Source::column(0), Destination::Foundation(7)),
            Err(MoveError::NoSuchFoundation(7))
        );
    }

    #[test]
    fn test_foundation_card_can_come_back() {
        let state = near_won_fixture();
        let next = apply_move(&state, Source::Foundation(0), Destination::FreeCell(0))
            .expect("legal move");
        assert_eq!(next.free_cell(0), Some(Card::new(Rank::Queen, Suit::Hearts)));
        assert_eq!(next.foundation(Suit::Hearts).len(), 11);
    }

    #[test]
    fn test_win_flag_flips_on_last_card_and_blocks_moves() {
        let mut state = near_won_fixture();
        let plan = crate::solver::auto_complete_plan(&state).expect("fixture completes");
        for step in plan {
            assert!(!state.is_won());
            state = apply_move(&state, step.source, step.destination()).expect("safe move");
        }
        assert!(state.is_won());
        assert!(state.foundations().iter().all(|f| f.len() == FOUNDATION_SIZE));
        assert_eq!(
            apply_move(&state, Source::Foundation(0), Destination::FreeCell(0)),
            Err(MoveError::GameOver)
        );
        assert!(state.is_won());
    }

    #[test]
    fn test_legal_moves_are_all_applicable() {
        let state = initialize_game_with_seed(21);
        let moves = legal_moves(&state, SequenceRule::Capacity);
        assert!(!moves.is_empty());
        for action in moves {
            assert!(apply_move_with(&state, action, SequenceRule::Capacity).is_ok());
        }
    }
}

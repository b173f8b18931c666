//! Freecell game logic.
//!
//! A pure, synchronous rules engine: deck creation and dealing, move
//! legality, an immutable-snapshot move executor, and a greedy auto-complete
//! solver. Nothing here performs I/O; the session layer in the application
//! crate owns timing, persistence and presentation.
//!
//! # Example
//!
//! ```
//! use strictly_freecell::{Destination, Source, apply_move, near_won_fixture};
//!
//! let board = near_won_fixture();
//! // Q♦ sits alone in column 1 and diamonds are built to the Jack.
//! let next = apply_move(&board, Source::column(1), Destination::Foundation(1)).unwrap();
//! assert_eq!(next.moves(), 1);
//! assert_eq!(board.moves(), 0);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod board;
mod card;
mod contracts;
mod deck;
mod executor;
pub mod invariants;
pub mod rules;
mod solver;

// Crate-level exports - Cards
pub use card::{CardParseError, Card, Color, Rank, Suit, all_cards};

// Crate-level exports - Board
pub use board::{
    BoardState, COLUMN_COUNT, DECK_SIZE, FOUNDATION_COUNT, FOUNDATION_SIZE, FREE_CELL_COUNT,
    LayoutError,
};

// Crate-level exports - Moves
pub use action::{Destination, LocatorParseError, Move, MoveError, Source};

// Crate-level exports - Rules
pub use rules::{
    SequenceRule, can_move_sequence, check_win, is_foundation_ready, is_valid_foundation_move,
    is_valid_tableau_move, max_movable_sequence_length,
};

// Crate-level exports - Dealing
pub use deck::{
    COLUMN_DEPTHS, create_deck, create_deck_with_rng, initialize_game, initialize_game_with_seed,
    near_won_fixture,
};

// Crate-level exports - Execution
pub use contracts::{Contract, MoveContract};
pub use executor::{apply_move, apply_move_with, can_apply, legal_moves};

// Crate-level exports - Auto-complete
pub use solver::{
    AutoMove, SIMULATION_LIMIT, auto_complete_plan, can_auto_complete, next_auto_complete_move,
};

// Crate-level exports - Invariants
pub use invariants::{BoardInvariants, Invariant, InvariantSet, InvariantViolation};

//! Move legality rules for Freecell.
//!
//! Pure predicates over cards and board snapshots. The move executor and
//! the auto-complete solver are both built on these; neither carries its
//! own copy of a rule.

pub mod foundation;
pub mod tableau;
pub mod win;

pub use foundation::{is_foundation_ready, is_valid_foundation_move};
pub use tableau::{
    SequenceRule, can_move_sequence, is_valid_tableau_move, max_movable_sequence_length,
};
pub use win::check_win;

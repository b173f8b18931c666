//! First-class move types for Freecell.
//!
//! A move names where cards come from and where they go. Locators are
//! closed enums over the three kinds of container, so every dispatch on
//! them is an exhaustive `match`.

use crate::card::Suit;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// Where a move takes cards from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "at", rename_all = "lowercase")]
pub enum Source {
    /// The card held in a free cell.
    FreeCell(usize),
    /// A tableau column. `start` selects the first card of a run; `None`
    /// means the exposed card only.
    Tableau {
        /// Column index.
        column: usize,
        /// Index of the first card to move, bottom of the column being 0.
        start: Option<usize>,
    },
    /// The top card of a foundation.
    Foundation(usize),
}

impl Source {
    /// Exposed card of a tableau column.
    pub fn column(column: usize) -> Self {
        Source::Tableau {
            column,
            start: None,
        }
    }

    /// Run of a tableau column starting at `start`.
    pub fn run(column: usize, start: usize) -> Self {
        Source::Tableau {
            column,
            start: Some(start),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::FreeCell(i) => write!(f, "c{i}"),
            Source::Tableau {
                column,
                start: None,
            } => write!(f, "t{column}"),
            Source::Tableau {
                column,
                start: Some(start),
            } => write!(f, "t{column}:{start}"),
            Source::Foundation(i) => write!(f, "f{i}"),
        }
    }
}

/// Where a move puts cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(tag = "type", content = "index", rename_all = "lowercase")]
pub enum Destination {
    /// An empty free cell.
    #[display("c{}", _0)]
    FreeCell(usize),
    /// The end of a tableau column.
    #[display("t{}", _0)]
    Tableau(usize),
    /// A foundation.
    #[display("f{}", _0)]
    Foundation(usize),
}

impl Destination {
    /// The foundation for `suit`.
    pub fn foundation_for(suit: Suit) -> Self {
        Destination::Foundation(suit.foundation_index())
    }
}

/// A requested move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{} -> {}", from, to)]
pub struct Move {
    /// Source locator.
    pub from: Source,
    /// Destination locator.
    pub to: Destination,
}

impl Move {
    /// Creates a new move.
    #[instrument]
    pub fn new(from: Source, to: Destination) -> Self {
        Self { from, to }
    }
}

/// Reasons the executor rejects a move. A rejected move never changes the
/// board.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum MoveError {
    /// The source holds no card.
    #[display("Nothing to move from the source")]
    EmptySource,

    /// Free cell index out of range.
    #[display("No free cell {}", _0)]
    NoSuchCell(usize),

    /// Tableau column index out of range.
    #[display("No tableau column {}", _0)]
    NoSuchColumn(usize),

    /// Foundation index out of range.
    #[display("No foundation {}", _0)]
    NoSuchFoundation(usize),

    /// Start index past the end of the column.
    #[display("Column {column} has no card at index {index}")]
    NoSuchCard {
        /// Column index.
        column: usize,
        /// Requested start index.
        index: usize,
    },

    /// Source and destination are the same container.
    #[display("Source and destination are the same")]
    SameLocation,

    /// Destination free cell already holds a card.
    #[display("Free cell {} is occupied", _0)]
    CellOccupied(usize),

    /// Card does not descend in alternating color onto the target column.
    #[display("Card cannot be placed on that column")]
    IllegalTableauPlacement,

    /// Card is not the next rank of its foundation.
    #[display("Card cannot be placed on that foundation")]
    IllegalFoundationPlacement,

    /// Foundation slot belongs to another suit.
    #[display("Card belongs on foundation {expected}, not {got}")]
    WrongFoundation {
        /// The card's own foundation.
        expected: usize,
        /// The requested foundation.
        got: usize,
    },

    /// The selected cards are not a descending alternating run.
    #[display("Selected cards do not form a movable sequence")]
    BrokenSequence,

    /// The run is longer than the free cells and empty columns allow.
    #[display("Cannot move {len} cards at once (at most {max})")]
    SequenceTooLong {
        /// Cards in the run.
        len: usize,
        /// Capacity bound.
        max: usize,
    },

    /// Only a single card may go to a free cell or foundation.
    #[display("Only one card can move to a free cell or foundation")]
    SequenceToNonTableau,

    /// The game is already won.
    #[display("Game is already over")]
    GameOver,

    /// An invariant was violated (postcondition failure).
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for MoveError {}

/// Failure to parse a locator such as `t3:2` or `f0`.
#[derive(Debug, Clone, PartialEq, Eq, Display, derive_more::Error)]
#[display("Invalid locator '{}': expected c0-c3, t0-t7[:n] or f0-f3", input)]
pub struct LocatorParseError {
    /// The rejected input.
    pub input: String,
}

fn split_locator(s: &str) -> Result<(char, usize, Option<usize>), LocatorParseError> {
    let err = || LocatorParseError {
        input: s.to_string(),
    };
    let s = s.trim();
    let mut chars = s.chars();
    let kind = chars.next().ok_or_else(err)?.to_ascii_lowercase();
    let rest = chars.as_str();
    let (index, start) = match rest.split_once(':') {
        Some((index, start)) => (index, Some(start.parse().map_err(|_| err())?)),
        None => (rest, None),
    };
    let index = index.parse().map_err(|_| err())?;
    Ok((kind, index, start))
}

impl FromStr for Source {
    type Err = LocatorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_locator(s)? {
            ('c', i, None) => Ok(Source::FreeCell(i)),
            ('t', column, start) => Ok(Source::Tableau { column, start }),
            ('f', i, None) => Ok(Source::Foundation(i)),
            _ => Err(LocatorParseError {
                input: s.to_string(),
            }),
        }
    }
}

impl FromStr for Destination {
    type Err = LocatorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_locator(s)? {
            ('c', i, None) => Ok(Destination::FreeCell(i)),
            ('t', i, None) => Ok(Destination::Tableau(i)),
            ('f', i, None) => Ok(Destination::Foundation(i)),
            _ => Err(LocatorParseError {
                input: s.to_string(),
            }),
        }
    }
}

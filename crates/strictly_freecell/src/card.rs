//! Card values: suits, ranks, colors.
//!
//! Cards are plain `Copy` values. Moving a card relocates the value between
//! containers; nothing about a card ever changes after it is created.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator};
use tracing::instrument;

/// Card color, derived from the suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Hearts and diamonds.
    #[display("red")]
    Red,
    /// Clubs and spades.
    #[display("black")]
    Black,
}

/// Card suit.
///
/// Declaration order is foundation order: hearts occupy foundation 0,
/// diamonds 1, clubs 2, spades 3.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    /// ♥
    #[display("hearts")]
    Hearts,
    /// ♦
    #[display("diamonds")]
    Diamonds,
    /// ♣
    #[display("clubs")]
    Clubs,
    /// ♠
    #[display("spades")]
    Spades,
}

impl Suit {
    /// All suits in foundation order.
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    /// Color of the suit.
    pub fn color(self) -> Color {
        match self {
            Suit::Hearts | Suit::Diamonds => Color::Red,
            Suit::Clubs | Suit::Spades => Color::Black,
        }
    }

    /// Index of the foundation this suit is built on.
    pub fn foundation_index(self) -> usize {
        match self {
            Suit::Hearts => 0,
            Suit::Diamonds => 1,
            Suit::Clubs => 2,
            Suit::Spades => 3,
        }
    }

    /// Suit owning the foundation at `index`.
    pub fn from_foundation_index(index: usize) -> Option<Suit> {
        Self::ALL.get(index).copied()
    }

    /// Unicode suit symbol.
    pub fn symbol(self) -> char {
        match self {
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
            Suit::Spades => '♠',
        }
    }

    fn from_symbol(c: char) -> Option<Suit> {
        match c.to_ascii_lowercase() {
            'h' | '♥' => Some(Suit::Hearts),
            'd' | '♦' => Some(Suit::Diamonds),
            'c' | '♣' => Some(Suit::Clubs),
            's' | '♠' => Some(Suit::Spades),
            _ => None,
        }
    }
}

/// Card rank, Ace low (1) through King high (13). No wraparound.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter,
)]
pub enum Rank {
    /// A
    Ace = 1,
    /// 2
    Two,
    /// 3
    Three,
    /// 4
    Four,
    /// 5
    Five,
    /// 6
    Six,
    /// 7
    Seven,
    /// 8
    Eight,
    /// 9
    Nine,
    /// 10
    Ten,
    /// J
    Jack,
    /// Q
    Queen,
    /// K
    King,
}

impl Rank {
    /// Numeric value, 1 for Ace through 13 for King.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Rank with the given numeric value.
    pub fn from_value(value: u8) -> Option<Rank> {
        Rank::iter().find(|r| r.value() == value)
    }

    /// The rank one above this one, `None` for King.
    pub fn next(self) -> Option<Rank> {
        Self::from_value(self.value() + 1)
    }

    /// Short label: `A`, `2`..`10`, `J`, `Q`, `K`.
    pub fn label(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }

    fn from_label(label: &str) -> Option<Rank> {
        let upper = label.to_ascii_uppercase();
        match upper.as_str() {
            "T" => Some(Rank::Ten),
            other => Rank::iter().find(|r| r.label() == other),
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A playing card. Identity is the (suit, rank) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// The suit.
    pub suit: Suit,
    /// The rank.
    pub rank: Rank,
}

impl Card {
    /// Creates a card.
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { suit, rank }
    }

    /// Color derived from the suit.
    pub fn color(&self) -> Color {
        self.suit.color()
    }

    /// Stable identifier, e.g. `hearts-A`.
    pub fn id(&self) -> String {
        format!("{}-{}", self.suit, self.rank)
    }

    /// Position of this card in a canonical 52-card ordering (suit-major).
    pub fn ordinal(&self) -> usize {
        self.suit.foundation_index() * 13 + (self.rank.value() as usize - 1)
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank, self.suit.symbol())
    }
}

/// Failure to parse a card from short notation.
#[derive(Debug, Clone, PartialEq, Eq, Display, derive_more::Error)]
#[display("Invalid card notation: '{}'", input)]
pub struct CardParseError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for Card {
    type Err = CardParseError;

    /// Parses `Qh`, `10s`, `Ts`, `A♥` and similar.
    #[instrument]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CardParseError {
            input: s.to_string(),
        };
        let trimmed = s.trim();
        let suit_char = trimmed.chars().last().ok_or_else(err)?;
        let suit = Suit::from_symbol(suit_char).ok_or_else(err)?;
        let rank_part = &trimmed[..trimmed.len() - suit_char.len_utf8()];
        let rank = Rank::from_label(rank_part).ok_or_else(err)?;
        Ok(Card::new(rank, suit))
    }
}

/// Every card of the standard deck, in canonical suit-major order.
pub fn all_cards() -> impl Iterator<Item = Card> {
    Suit::iter().flat_map(|suit| Rank::iter().map(move |rank| Card::new(rank, suit)))
}

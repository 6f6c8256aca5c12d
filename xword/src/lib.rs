//! This crate is meant to be used as the foundation for a crossword construction app.
//! It provides no UI itself, but see `xwordtui` for an example of how you can use it
//! to produce a crossword construction app.
//!
//! The core pieces are:
//!
//! * [Grid]: the square grid of black squares and letters being built.
//! * [Slots]: the numbered across/down entries derived from the black squares.
//! * [Pattern]: the letters already placed in a slot, with wildcards for the blanks.
//! * [Corpus]: a word list that can be queried with a pattern, either in memory
//!   ([MemoryCorpus]) or backed by SQLite ([SqliteCorpus]).
//! * [Autofill]: fills the grid greedily, most constrained slot first.
//! * [Editor]: ties all of the above together with a [Cursor] for interactive use.

use Direction::{Across, Down};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::ops::Not;

mod autofill;
mod clues;
mod corpus;
mod cursor;
mod editor;
mod grid;
mod pattern;
mod record;
mod scorer;
mod slots;
mod sqlite;

pub use autofill::{Autofill, FillOptions, FillOutcome, FillReport, FillState, Placement, StallReason};
pub use clues::{ClueEntry, ClueMap};
pub use corpus::{Candidate, Corpus, MemoryCorpus, SUGGESTION_LIMIT};
pub use cursor::Cursor;
pub use editor::{Command, Editor, SquareStyle};
pub use grid::{Grid, GridPosIter, Pos, Square};
pub use pattern::{Pattern, WILDCARD};
pub use record::Crossword;
pub use scorer::{MatchScore, ScoredCandidate, rank, score};
pub use slots::{Crossing, Slot, SlotId, Slots};
pub use sqlite::SqliteCorpus;

/// The two crossword directions: `Across` and `Down`
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Across,
  Down,
}

impl Not for Direction {
  type Output = Self;
  fn not(self) -> Self {
    match self {
      Across => Down,
      Down => Across,
    }
  }
}

impl Display for Direction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Across => write!(f, "Across"),
      Down => write!(f, "Down"),
    }
  }
}

/// The errors that may be produced by functions in this crate.
///
/// Note that an autofill run getting stuck is not an error; see [FillOutcome::Stalled].
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// A position outside of the grid was used.
  #[error("position {pos:?} is outside of the {size}x{size} grid")]
  OutOfBounds { pos: Pos, size: usize },
  /// An operation needed a selected square, but nothing is selected.
  #[error("no square is selected")]
  NoSelection,
  /// The word list could not be opened or queried.
  #[error("word list unavailable: {0}")]
  CorpusUnavailable(String),
  /// Something went wrong while parsing a grid, pattern or word list.
  #[error("parse error: {0}")]
  Parse(String),
  /// An [I/O error](std::io::Error) occurred.
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self {
    Self::CorpusUnavailable(e.to_string())
  }
}

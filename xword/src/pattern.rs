use crate::{Error, Grid, Pos, Slot};
use std::fmt::Display;
use std::str::FromStr;

/// The character used for an unknown letter when a pattern is written out, e.g. `C*T`.
pub const WILDCARD: char = '*';

/// The contents of a slot: a fixed letter or a wildcard for every square.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern(Vec<Option<char>>);

impl Pattern {
  /// Reads the current contents of `slot` from the grid.
  pub fn extract(grid: &Grid, slot: &Slot) -> Self {
    Self(slot.cells().map(|pos| grid.get(pos).letter()).collect())
  }

  /// Reads the contents of an arbitrary run of squares.
  pub fn from_cells(grid: &Grid, cells: &[Pos]) -> Self {
    Self(cells.iter().map(|&pos| grid.get(pos).letter()).collect())
  }

  /// A pattern of `length` wildcards.
  pub fn blank(length: usize) -> Self {
    Self(vec![None; length])
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<char> {
    self.0.get(index).copied().flatten()
  }

  /// The number of wildcards.
  pub fn wildcards(&self) -> usize {
    self.0.iter().filter(|c| c.is_none()).count()
  }

  /// Whether every square has a letter.
  pub fn is_complete(&self) -> bool {
    self.wildcards() == 0
  }

  /// The fixed letters with their indices.
  pub fn fixed(&self) -> impl Iterator<Item = (usize, char)> + '_ {
    self
      .0
      .iter()
      .enumerate()
      .filter_map(|(i, c)| c.map(|c| (i, c)))
  }

  /// Whether `word` fits this pattern: same length, and every fixed letter equal to
  /// the letter at the same position of `word` (ignoring ASCII case).
  pub fn matches(&self, word: &str) -> bool {
    word.chars().count() == self.len()
      && word
        .chars()
        .zip(&self.0)
        .all(|(w, p)| p.is_none_or(|p| p == w.to_ascii_uppercase()))
  }

  /// This pattern with the square at `index` set to `letter`.
  pub fn with_letter(&self, index: usize, letter: char) -> Self {
    let mut pattern = self.clone();
    pattern.0[index] = Some(letter.to_ascii_uppercase());
    pattern
  }

  /// The word spelled out by this pattern, if it has no wildcards.
  pub fn as_word(&self) -> Option<String> {
    self.0.iter().copied().collect()
  }
}

impl Display for Pattern {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for c in &self.0 {
      write!(f, "{}", c.unwrap_or(WILDCARD))?;
    }
    Ok(())
  }
}

/// Parses `*`, `?`, `.`, `-` and `_` as wildcards; letters are upper-cased.
impl FromStr for Pattern {
  type Err = Error;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    s.chars()
      .map(|c| match c {
        '*' | '?' | '.' | '-' | '_' => Ok(None),
        c if c.is_ascii_alphabetic() => Ok(Some(c.to_ascii_uppercase())),
        c => Err(Error::Parse(format!("unexpected character {c:?} in pattern"))),
      })
      .collect::<Result<_, _>>()
      .map(Self)
  }
}

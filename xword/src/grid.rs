//! The square grid that a crossword is constructed on.

use crate::Direction::{self, Across, Down};
use crate::Error;
use std::fmt::Debug;
use std::fmt::Display;

/// A position in a grid: (row, column)
pub type Pos = (usize, usize);

/// A square in a crossword grid.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub enum Square {
  /// A black square where nothing can be entered.
  Black,
  /// A square where a letter could be entered, but that is currently empty.
  Empty,
  /// A square with a letter written in it.
  Letter(char),
}

impl Square {
  /// Whether this is [Square::Black].
  pub fn is_black(&self) -> bool {
    *self == Self::Black
  }

  /// Whether this is [Square::Empty].
  pub fn is_empty(&self) -> bool {
    *self == Self::Empty
  }

  /// Whether this is not a black square, i.e. either a [Square::Empty] or [Square::Letter].
  pub fn is_white(&self) -> bool {
    !self.is_black()
  }

  /// The letter in this square, if there is one.
  pub fn letter(&self) -> Option<char> {
    match self {
      Self::Letter(c) => Some(*c),
      _ => None,
    }
  }

  /// Parses one character of the grid text format.
  fn from_char(c: char) -> Result<Self, Error> {
    match c {
      '.' | '#' => Ok(Self::Black),
      '-' | '_' | '*' | ' ' => Ok(Self::Empty),
      c if c.is_ascii_alphabetic() => Ok(Self::Letter(c.to_ascii_uppercase())),
      c => Err(Error::Parse(format!("unexpected character {c:?} in grid"))),
    }
  }

  /// The character used for this square in the grid text format.
  fn to_char(self) -> char {
    match self {
      Self::Black => '.',
      Self::Empty => '-',
      Self::Letter(c) => c,
    }
  }
}

impl Debug for Square {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Black => write!(f, "■"),
      Self::Empty => write!(f, " "),
      Self::Letter(c) => write!(f, "{}", c),
    }?;
    Ok(())
  }
}

impl Display for Square {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:?}", self)
  }
}

/// An N×N grid of squares.
///
/// [Grid::get] and [Grid::set] panic when given a position outside of the grid,
/// since that is always a bug in the caller. Use [Grid::checked_get] and
/// [Grid::checked_set] for positions that come from outside, e.g. a mouse click.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Grid(Vec<Vec<Square>>);

impl Grid {
  /// Creates an empty `size`×`size` grid with no black squares.
  ///
  /// # Panics
  ///
  /// If `size` is zero.
  pub fn new(size: usize) -> Self {
    assert!(size >= 1, "a grid needs at least one square");
    Self(vec![vec![Square::Empty; size]; size])
  }

  /// Parses a grid from text, one row per line. `.` or `#` is a black square,
  /// `-`, `_`, `*` or a space is an empty square, and a letter is a letter.
  /// Leading and trailing blank lines are ignored.
  pub fn parse(text: &str) -> Result<Self, Error> {
    let rows = text
      .lines()
      .map(|line| line.trim_end_matches('\r'))
      .skip_while(|line| line.trim().is_empty())
      .collect::<Vec<_>>();
    let rows = match rows.iter().rposition(|line| !line.trim().is_empty()) {
      Some(last) => &rows[..=last],
      None => return Err(Error::Parse("grid is empty".to_string())),
    };

    let size = rows.len();
    let mut grid = Vec::with_capacity(size);
    for (r, line) in rows.iter().enumerate() {
      let row = line
        .chars()
        .map(Square::from_char)
        .collect::<Result<Vec<_>, _>>()?;
      if row.len() != size {
        return Err(Error::Parse(format!(
          "row {r} has {} squares but the grid has {size} rows",
          row.len()
        )));
      }
      grid.push(row);
    }

    Ok(Self(grid))
  }

  /// Builds a grid from rows in the text format, as stored in a [Crossword](crate::Crossword).
  pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, Error> {
    let text = rows.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("\n");
    Self::parse(&text)
  }

  /// The rows of this grid in the text format accepted by [Grid::parse].
  pub fn to_rows(&self) -> Vec<String> {
    self
      .0
      .iter()
      .map(|row| row.iter().map(|sq| sq.to_char()).collect())
      .collect()
  }

  /// This grid in the text format accepted by [Grid::parse].
  pub fn to_text(&self) -> String {
    let mut text = self.to_rows().join("\n");
    text.push('\n');
    text
  }

  /// The number of rows (and columns) of this grid.
  pub fn size(&self) -> usize {
    self.0.len()
  }

  /// An iterator over all the positions of this grid, from left to right and top to bottom.
  pub fn positions(&self) -> GridPosIter {
    GridPosIter::new(self.size())
  }

  /// Whether `pos` lies inside this grid.
  pub fn contains(&self, (r, c): Pos) -> bool {
    r < self.size() && c < self.size()
  }

  /// Whether this grid is fully filled in -- that is, has no `Square::Empty` in it.
  pub fn is_filled(&self) -> bool {
    !self.0.iter().flatten().any(|&sq| sq == Square::Empty)
  }

  /// Returns the [Square] at the given [Pos].
  ///
  /// # Panics
  ///
  /// If `pos` is outside of the grid.
  pub fn get(&self, pos: Pos) -> Square {
    self.assert_contains(pos);
    let (r, c) = pos;
    self.0[r][c]
  }

  /// Sets the [Square] at the given [Pos].
  ///
  /// # Panics
  ///
  /// If `pos` is outside of the grid.
  pub fn set(&mut self, pos: Pos, square: Square) {
    self.assert_contains(pos);
    let (r, c) = pos;
    self.0[r][c] = square;
  }

  /// Like [Grid::get], but returns [Error::OutOfBounds] instead of panicking.
  pub fn checked_get(&self, pos: Pos) -> Result<Square, Error> {
    self.check(pos)?;
    Ok(self.get(pos))
  }

  /// Like [Grid::set], but returns [Error::OutOfBounds] instead of panicking.
  pub fn checked_set(&mut self, pos: Pos, square: Square) -> Result<(), Error> {
    self.check(pos)?;
    self.set(pos, square);
    Ok(())
  }

  /// Whether the square at `pos` is black.
  pub fn is_black(&self, pos: Pos) -> bool {
    self.get(pos).is_black()
  }

  /// Turns a black square white (empty), or any other square black.
  pub fn toggle_black(&mut self, pos: Pos) {
    let square = if self.is_black(pos) {
      Square::Empty
    } else {
      Square::Black
    };
    self.set(pos, square);
  }

  fn check(&self, pos: Pos) -> Result<(), Error> {
    if self.contains(pos) {
      Ok(())
    } else {
      Err(Error::OutOfBounds {
        pos,
        size: self.size(),
      })
    }
  }

  fn assert_contains(&self, pos: Pos) {
    assert!(
      self.contains(pos),
      "position {pos:?} is outside of the {0}x{0} grid",
      self.size()
    );
  }

  /// Returns the square immediately above the given position, or
  /// `Square::Black` if the given position is on the top edge of the grid.
  fn up_neighbor(&self, (row, col): Pos) -> Square {
    if row == 0 {
      Square::Black
    } else {
      self.get((row - 1, col))
    }
  }

  /// Returns the square immediately below the given position, or
  /// `Square::Black` if the given position is on the bottom edge of the grid.
  fn down_neighbor(&self, (row, col): Pos) -> Square {
    if row + 1 == self.size() {
      Square::Black
    } else {
      self.get((row + 1, col))
    }
  }

  /// Returns the square immediately to the left of the given position, or
  /// `Square::Black` if the given position is on the left edge of the grid.
  fn left_neighbor(&self, (row, col): Pos) -> Square {
    if col == 0 {
      Square::Black
    } else {
      self.get((row, col - 1))
    }
  }

  /// Returns the square immediately to the right of the given position, or
  /// `Square::Black` if the given position is on the right edge of the grid.
  fn right_neighbor(&self, (row, col): Pos) -> Square {
    if col + 1 == self.size() {
      Square::Black
    } else {
      self.get((row, col + 1))
    }
  }

  /// The neighbor before `pos` in the given direction (left or up).
  fn before(&self, pos: Pos, direction: Direction) -> Square {
    match direction {
      Across => self.left_neighbor(pos),
      Down => self.up_neighbor(pos),
    }
  }

  /// The neighbor after `pos` in the given direction (right or down).
  fn after(&self, pos: Pos, direction: Direction) -> Square {
    match direction {
      Across => self.right_neighbor(pos),
      Down => self.down_neighbor(pos),
    }
  }

  /// Whether the given position is the start of an entry (of at least two squares)
  /// in the given direction.
  pub fn starts(&self, pos: Pos, direction: Direction) -> bool {
    if self.get(pos).is_black() {
      return false;
    }

    self.before(pos, direction).is_black() && self.after(pos, direction).is_white()
  }

  /// The first square of the run of white squares through `pos` in the given direction.
  /// For a black square this is `pos` itself.
  pub fn run_start(&self, pos: Pos, direction: Direction) -> Pos {
    let mut pos = pos;
    if self.get(pos).is_black() {
      return pos;
    }
    while self.before(pos, direction).is_white() {
      pos = match direction {
        Across => (pos.0, pos.1 - 1),
        Down => (pos.0 - 1, pos.1),
      };
    }
    pos
  }

  /// All positions of the maximal run of white squares through `pos` in the given
  /// direction, in reading order. Empty if `pos` is black.
  pub fn run(&self, pos: Pos, direction: Direction) -> Vec<Pos> {
    if self.get(pos).is_black() {
      return vec![];
    }
    let mut pos = self.run_start(pos, direction);
    let mut run = vec![pos];
    while self.after(pos, direction).is_white() {
      pos = match direction {
        Across => (pos.0, pos.1 + 1),
        Down => (pos.0 + 1, pos.1),
      };
      run.push(pos);
    }
    run
  }
}

/// Iterator over all the positions in the grid.
pub struct GridPosIter {
  pos: Pos,
  size: usize,
}

impl GridPosIter {
  fn new(size: usize) -> Self {
    Self { pos: (0, 0), size }
  }
}

impl Iterator for GridPosIter {
  type Item = Pos;
  fn next(&mut self) -> Option<Self::Item> {
    let (row, col) = self.pos;

    if row == self.size {
      return None;
    }

    if col == self.size - 1 {
      self.pos = (row + 1, 0);
    } else {
      self.pos = (row, col + 1);
    }

    Some((row, col))
  }
}

impl Debug for Grid {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for row in &self.0 {
      for sq in row {
        write!(f, "{}", sq)?;
      }
      writeln!(f)?;
    }
    Ok(())
  }
}

impl Display for Grid {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "\n{:?}", self)
  }
}

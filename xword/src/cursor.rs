use crate::Direction::{self, Across, Down};
use crate::{Grid, Pos, Slots};

/// The selected square and direction while editing a grid.
///
/// In block-edit mode nothing is selected: clicks toggle black squares instead of
/// moving the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
  /// The position of the currently-highlighted square, if any.
  pos: Option<Pos>,
  /// The current direction.
  direction: Direction,
  block_mode: bool,
}

impl Cursor {
  /// A cursor on the first white square of the grid, if there is one.
  pub fn from_grid(grid: &Grid) -> Self {
    let mut cursor = Self {
      pos: first_white(grid),
      direction: Across,
      block_mode: false,
    };
    cursor.adjust_direction(grid);
    cursor
  }

  pub fn pos(&self) -> Option<Pos> {
    self.pos
  }

  pub fn direction(&self) -> Direction {
    self.direction
  }

  pub fn is_block_mode(&self) -> bool {
    self.block_mode
  }

  /// Switches to the other direction if the selected square has no entry in the
  /// current one but does in the other.
  fn adjust_direction(&mut self, grid: &Grid) {
    let Some(pos) = self.pos else {
      return;
    };
    if grid.run(pos, self.direction).len() < 2 && grid.run(pos, !self.direction).len() >= 2 {
      self.direction = !self.direction;
    }
  }

  /// Selects the square at `pos`. Selecting the square that is already selected
  /// switches direction instead. Black squares can't be selected, and nothing can be
  /// in block-edit mode.
  ///
  /// Returns whether anything changed.
  pub fn select(&mut self, grid: &Grid, pos: Pos) -> bool {
    if self.block_mode || !grid.contains(pos) || grid.is_black(pos) {
      return false;
    }
    if self.pos == Some(pos) {
      self.toggle_direction();
    } else {
      self.pos = Some(pos);
      self.adjust_direction(grid);
    }
    true
  }

  /// Moves to the next white square in the current direction: rightwards then on to
  /// the next row for `Across`, downwards then on to the next column for `Down`.
  /// Wraps around from the last square to the first.
  ///
  /// Returns `false` if there is no other white square to move to.
  pub fn advance(&mut self, grid: &Grid) -> bool {
    self.walk(grid, true)
  }

  /// The reverse of [advance](Self::advance).
  pub fn retreat(&mut self, grid: &Grid) -> bool {
    self.walk(grid, false)
  }

  fn walk(&mut self, grid: &Grid, forward: bool) -> bool {
    let Some(start) = self.pos.filter(|_| !self.block_mode) else {
      return false;
    };

    let mut pos = start;
    // Every square is visited at most once, so an all-black grid can't loop forever.
    for _ in 0..grid.size() * grid.size() {
      pos = step(pos, grid.size(), self.direction, forward);
      if pos == start {
        return false;
      }
      if !grid.is_black(pos) {
        self.pos = Some(pos);
        return true;
      }
    }
    false
  }

  /// Moves one square along a row (`Across`) or column (`Down`), jumping over black
  /// squares. Unlike [advance](Self::advance) this never wraps; at the edge of the
  /// grid the cursor stays put.
  pub fn nudge(&mut self, grid: &Grid, direction: Direction, forward: bool) -> bool {
    let Some((row, col)) = self.pos.filter(|_| !self.block_mode) else {
      return false;
    };
    let line: Box<dyn Iterator<Item = Pos>> = match (direction, forward) {
      (Across, true) => Box::new((col + 1..grid.size()).map(|c| (row, c))),
      (Across, false) => Box::new((0..col).rev().map(|c| (row, c))),
      (Down, true) => Box::new((row + 1..grid.size()).map(|r| (r, col))),
      (Down, false) => Box::new((0..row).rev().map(|r| (r, col))),
    };
    let Some(pos) = line.into_iter().find(|&p| !grid.is_black(p)) else {
      return false;
    };
    self.pos = Some(pos);
    self.adjust_direction(grid);
    true
  }

  /// Moves to the start of the next slot in the current direction, wrapping from the
  /// last slot to the first.
  pub fn next_slot(&mut self, slots: &Slots) -> bool {
    self.jump(slots, true)
  }

  /// Moves to the start of the previous slot in the current direction, wrapping from
  /// the first slot to the last.
  pub fn previous_slot(&mut self, slots: &Slots) -> bool {
    self.jump(slots, false)
  }

  fn jump(&mut self, slots: &Slots, forward: bool) -> bool {
    let Some(pos) = self.pos.filter(|_| !self.block_mode) else {
      return false;
    };
    let current = slots
      .containing(pos, self.direction)
      .map_or(pos, |slot| slot.start);

    // Slots are in clue number order, which is row-major order of their starts.
    let starts = slots
      .in_direction(self.direction)
      .map(|slot| slot.start)
      .collect::<Vec<_>>();
    let target = if forward {
      starts.iter().find(|&&s| s > current).or(starts.first())
    } else {
      starts.iter().rev().find(|&&s| s < current).or(starts.last())
    };

    match target {
      Some(&target) => {
        self.pos = Some(target);
        true
      }
      None => false,
    }
  }

  pub fn toggle_direction(&mut self) {
    self.direction = !self.direction;
  }

  /// Enters or leaves block-edit mode. Entering clears the selection; leaving selects
  /// the first white square.
  pub fn toggle_block_mode(&mut self, grid: &Grid) {
    self.block_mode = !self.block_mode;
    if self.block_mode {
      self.pos = None;
    } else {
      self.pos = first_white(grid);
      self.adjust_direction(grid);
    }
  }

  /// The squares of the entry through the cursor in the current direction. Empty
  /// when nothing is selected.
  pub fn highlight(&self, grid: &Grid) -> Vec<Pos> {
    match self.pos {
      Some(pos) if !self.block_mode => grid.run(pos, self.direction),
      _ => vec![],
    }
  }
}

fn first_white(grid: &Grid) -> Option<Pos> {
  grid.positions().find(|&p| grid.get(p).is_white())
}

/// The position after (or before) `pos` in reading order for the given direction,
/// wrapping around the grid.
fn step((row, col): Pos, size: usize, direction: Direction, forward: bool) -> Pos {
  let last = size - 1;
  match (direction, forward) {
    (Across, true) if col < last => (row, col + 1),
    (Across, true) if row < last => (row + 1, 0),
    (Across, true) => (0, 0),
    (Across, false) if col > 0 => (row, col - 1),
    (Across, false) if row > 0 => (row - 1, last),
    (Across, false) => (last, last),
    (Down, true) if row < last => (row + 1, col),
    (Down, true) if col < last => (0, col + 1),
    (Down, true) => (0, 0),
    (Down, false) if row > 0 => (row - 1, col),
    (Down, false) if col > 0 => (last, col - 1),
    (Down, false) => (last, last),
  }
}

//! Derives the numbered across and down entries ("slots") from the black squares of a grid.

use crate::Direction::{self, Across, Down};
use crate::{Grid, Pos};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

/// Identifies a slot by where it starts and which way it goes.
///
/// Unlike clue numbers, which shift whenever a black square is added or removed
/// anywhere earlier in the grid, a `SlotId` only changes when the slot itself
/// moves, so it is used to key clue text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId {
  pub row: usize,
  pub col: usize,
  pub direction: Direction,
}

impl SlotId {
  pub fn new((row, col): Pos, direction: Direction) -> Self {
    Self {
      row,
      col,
      direction,
    }
  }

  pub fn start(&self) -> Pos {
    (self.row, self.col)
  }
}

/// A maximal run of at least two white squares in one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
  /// The clue number shown in the first square.
  pub number: u32,
  pub start: Pos,
  pub length: usize,
  pub direction: Direction,
}

impl Slot {
  pub fn id(&self) -> SlotId {
    SlotId::new(self.start, self.direction)
  }

  /// The position of the `index`th square of this slot.
  pub fn cell(&self, index: usize) -> Pos {
    let (row, col) = self.start;
    match self.direction {
      Across => (row, col + index),
      Down => (row + index, col),
    }
  }

  /// The positions of this slot's squares, in reading order.
  pub fn cells(&self) -> impl Iterator<Item = Pos> + '_ {
    (0..self.length).map(|i| self.cell(i))
  }

  /// Where `pos` falls within this slot, if it does.
  pub fn index_of(&self, (row, col): Pos) -> Option<usize> {
    let (start_row, start_col) = self.start;
    let index = match self.direction {
      Across if row == start_row && col >= start_col => col - start_col,
      Down if col == start_col && row >= start_row => row - start_row,
      _ => return None,
    };
    (index < self.length).then_some(index)
  }

  pub fn contains(&self, pos: Pos) -> bool {
    self.index_of(pos).is_some()
  }
}

impl Display for Slot {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} {}", self.number, self.direction)
  }
}

/// A square shared by a slot and a slot in the other direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing<'a> {
  /// The crossing slot.
  pub slot: &'a Slot,
  /// Index of the shared square within the original slot.
  pub at: usize,
  /// Index of the shared square within the crossing slot.
  pub other_at: usize,
}

/// All the slots of a grid, with their clue numbers.
///
/// A square starts an across slot if it is white, the square to its left is
/// black (or the edge of the grid), and the square to its right is white; down
/// slots work the same way vertically. Each square that starts a slot in either
/// direction takes the next clue number, scanning left to right and top to
/// bottom. Runs of a single square are not slots and get no number.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Slots {
  /// Ordered by clue number, with the across slot before the down slot when a
  /// square starts both.
  slots: Vec<Slot>,
  numbers: BTreeMap<Pos, u32>,
  /// Index into `slots` for every square that belongs to a slot.
  by_cell: HashMap<(Pos, Direction), usize>,
}

impl Slots {
  /// Scans the grid and numbers its slots.
  pub fn derive(grid: &Grid) -> Self {
    let mut slots = Self::default();
    let mut number = 0;

    for pos in grid.positions() {
      let across = grid.starts(pos, Across);
      let down = grid.starts(pos, Down);
      if !across && !down {
        continue;
      }

      number += 1;
      slots.numbers.insert(pos, number);
      for direction in [Across, Down] {
        if grid.starts(pos, direction) {
          let length = grid.run(pos, direction).len();
          slots.push(Slot {
            number,
            start: pos,
            length,
            direction,
          });
        }
      }
    }

    log::debug!(
      "derived {} slots with {} numbers from a {}x{} grid",
      slots.len(),
      number,
      grid.size(),
      grid.size()
    );

    slots
  }

  fn push(&mut self, slot: Slot) {
    let index = self.slots.len();
    for pos in slot.cells() {
      self.by_cell.insert((pos, slot.direction), index);
    }
    self.slots.push(slot);
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Slot> {
    self.slots.iter()
  }

  pub fn len(&self) -> usize {
    self.slots.len()
  }

  pub fn is_empty(&self) -> bool {
    self.slots.is_empty()
  }

  /// The slots going in the given direction, in clue number order.
  pub fn in_direction(&self, direction: Direction) -> impl Iterator<Item = &Slot> {
    self.slots.iter().filter(move |s| s.direction == direction)
  }

  pub fn get(&self, id: SlotId) -> Option<&Slot> {
    self
      .containing(id.start(), id.direction)
      .filter(|slot| slot.start == id.start())
  }

  /// The clue number shown in the square at `pos`, if any.
  pub fn number_at(&self, pos: Pos) -> Option<u32> {
    self.numbers.get(&pos).copied()
  }

  /// All numbered squares in number order.
  pub fn numbers(&self) -> impl Iterator<Item = (Pos, u32)> + '_ {
    self.numbers.iter().map(|(&pos, &n)| (pos, n))
  }

  /// The slot in the given direction that contains `pos`, if any.
  pub fn containing(&self, pos: Pos, direction: Direction) -> Option<&Slot> {
    self.by_cell.get(&(pos, direction)).map(|&i| &self.slots[i])
  }

  /// The slots crossing `slot`, one for each of its squares that is also part of a
  /// slot in the other direction.
  pub fn crossings<'a>(&'a self, slot: &Slot) -> Vec<Crossing<'a>> {
    slot
      .cells()
      .enumerate()
      .filter_map(|(at, pos)| {
        let other = self.containing(pos, !slot.direction)?;
        let other_at = other.index_of(pos)?;
        Some(Crossing {
          slot: other,
          at,
          other_at,
        })
      })
      .collect()
  }
}

impl<'a> IntoIterator for &'a Slots {
  type Item = &'a Slot;
  type IntoIter = std::slice::Iter<'a, Slot>;
  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

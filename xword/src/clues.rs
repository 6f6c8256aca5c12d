use crate::{Direction, Slot, SlotId, Slots};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Clue text for the slots of a grid, keyed by [SlotId].
///
/// Clues whose slot no longer exists (because a black square was added across it)
/// are kept, so that removing the black square again brings the clue back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ClueEntry>", into = "Vec<ClueEntry>")]
pub struct ClueMap(BTreeMap<SlotId, String>);

/// One clue as it is stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueEntry {
  pub direction: Direction,
  pub row: usize,
  pub col: usize,
  pub text: String,
}

impl ClueMap {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, id: SlotId) -> Option<&str> {
    self.0.get(&id).map(String::as_str)
  }

  /// Sets the clue for a slot. Blank text removes the clue.
  pub fn set(&mut self, id: SlotId, text: &str) {
    let text = text.trim();
    if text.is_empty() {
      self.0.remove(&id);
    } else {
      self.0.insert(id, text.to_string());
    }
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (SlotId, &str)> {
    self.0.iter().map(|(&id, text)| (id, text.as_str()))
  }

  /// Every slot in the given direction, in clue number order, with its clue if it has
  /// one.
  pub fn listing<'a>(
    &'a self,
    slots: &'a Slots,
    direction: Direction,
  ) -> impl Iterator<Item = (&'a Slot, Option<&'a str>)> {
    slots
      .in_direction(direction)
      .map(|slot| (slot, self.get(slot.id())))
  }

  /// The number of slots in `slots` that have no clue.
  pub fn missing(&self, slots: &Slots) -> usize {
    slots
      .iter()
      .filter(|slot| !self.0.contains_key(&slot.id()))
      .count()
  }
}

impl From<Vec<ClueEntry>> for ClueMap {
  fn from(entries: Vec<ClueEntry>) -> Self {
    let mut clues = Self::new();
    for entry in entries {
      clues.set(
        SlotId::new((entry.row, entry.col), entry.direction),
        &entry.text,
      );
    }
    clues
  }
}

impl From<ClueMap> for Vec<ClueEntry> {
  fn from(clues: ClueMap) -> Self {
    clues
      .0
      .into_iter()
      .map(|(id, text)| ClueEntry {
        direction: id.direction,
        row: id.row,
        col: id.col,
        text,
      })
      .collect()
  }
}

use crate::{
  Autofill, ClueMap, Corpus, Cursor, Direction, Error, FillOptions, FillReport, Grid, Pattern,
  Pos, ScoredCandidate, Slot, Slots, Square, rank,
};
use std::sync::atomic::AtomicBool;

/// An edit or cursor movement requested by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  /// Writes a letter in the selected square and moves on to the next one.
  Letter(char),
  /// Erases the selected square, first moving back if it is already empty.
  Backspace,
  /// Selects a square, or switches direction if it is already selected.
  Select(Pos),
  /// Turns a square black or white. Only has an effect in block-edit mode.
  ToggleBlock(Pos),
  NextCell,
  PreviousCell,
  NextSlot,
  PreviousSlot,
  /// Moves one square along a row or column without wrapping, e.g. for arrow keys.
  Nudge { direction: Direction, forward: bool },
  ToggleDirection,
  ToggleBlockMode,
}

/// Indicates how a particular square should look. For instance, [Standard](Self::Standard)
/// might map to white, [Cursor](Self::Cursor) to yellow, and [Word](Self::Word) to gray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareStyle {
  /// A black square.
  Black,
  /// Default styling
  Standard,
  /// The cursor is positioned on this square.
  Cursor,
  /// The cursor is not on this square, but the word indicated by the cursor includes this square.
  Word,
}

/// A grid being built, together with its slots, clues and a [Cursor]. When
/// implementing a construction app, this will be the main structure you will use.
///
/// The slots are re-derived whenever a black square is toggled, so they always
/// match the grid.
#[derive(Debug, Clone)]
pub struct Editor {
  grid: Grid,
  slots: Slots,
  cursor: Cursor,
  clues: ClueMap,
}

impl Editor {
  /// An empty grid of the given size.
  pub fn new(size: usize) -> Self {
    Self::from_grid(Grid::new(size))
  }

  pub fn from_grid(grid: Grid) -> Self {
    Self::with_clues(grid, ClueMap::new())
  }

  pub fn with_clues(grid: Grid, clues: ClueMap) -> Self {
    let slots = Slots::derive(&grid);
    let cursor = Cursor::from_grid(&grid);
    Self {
      grid,
      slots,
      cursor,
      clues,
    }
  }

  /// Returns a reference to the current grid.
  pub fn grid(&self) -> &Grid {
    &self.grid
  }

  pub fn slots(&self) -> &Slots {
    &self.slots
  }

  pub fn cursor(&self) -> &Cursor {
    &self.cursor
  }

  pub fn clues(&self) -> &ClueMap {
    &self.clues
  }

  /// Applies a command from the UI. Returns whether anything changed.
  ///
  /// Positions outside of the grid are reported as [Error::OutOfBounds].
  pub fn apply(&mut self, command: Command) -> Result<bool, Error> {
    let changed = match command {
      Command::Letter(letter) => self.add_letter(letter),
      Command::Backspace => self.erase_letter(),
      Command::Select(pos) => {
        self.grid.checked_get(pos)?;
        self.cursor.select(&self.grid, pos)
      }
      Command::ToggleBlock(pos) => self.toggle_block(pos)?,
      Command::NextCell => self.cursor.advance(&self.grid),
      Command::PreviousCell => self.cursor.retreat(&self.grid),
      Command::NextSlot => self.cursor.next_slot(&self.slots),
      Command::PreviousSlot => self.cursor.previous_slot(&self.slots),
      Command::Nudge { direction, forward } => self.cursor.nudge(&self.grid, direction, forward),
      Command::ToggleDirection => {
        self.cursor.toggle_direction();
        true
      }
      Command::ToggleBlockMode => {
        self.cursor.toggle_block_mode(&self.grid);
        true
      }
    };
    Ok(changed)
  }

  fn selected(&self) -> Option<Pos> {
    self.cursor.pos().filter(|_| !self.cursor.is_block_mode())
  }

  fn add_letter(&mut self, letter: char) -> bool {
    let Some(pos) = self.selected() else {
      return false;
    };
    if !letter.is_ascii_alphabetic() {
      return false;
    }
    self
      .grid
      .set(pos, Square::Letter(letter.to_ascii_uppercase()));
    self.cursor.advance(&self.grid);
    true
  }

  fn erase_letter(&mut self) -> bool {
    let Some(pos) = self.selected() else {
      return false;
    };
    let pos = if self.grid.get(pos).is_empty() && self.cursor.retreat(&self.grid) {
      self.cursor.pos().unwrap_or(pos)
    } else {
      pos
    };
    self.grid.set(pos, Square::Empty);
    true
  }

  fn toggle_block(&mut self, pos: Pos) -> Result<bool, Error> {
    self.grid.checked_get(pos)?;
    if !self.cursor.is_block_mode() {
      return Ok(false);
    }
    self.grid.toggle_black(pos);
    self.slots = Slots::derive(&self.grid);
    Ok(true)
  }

  /// The slot containing the cursor in the cursor's direction, if any.
  pub fn active_slot(&self) -> Option<&Slot> {
    let pos = self.selected()?;
    self.slots.containing(pos, self.cursor.direction())
  }

  /// The current contents of the [active slot](Self::active_slot).
  pub fn active_pattern(&self) -> Option<Pattern> {
    self
      .active_slot()
      .map(|slot| Pattern::extract(&self.grid, slot))
  }

  /// Words that fit the active slot, best first by word list score, each scored by
  /// how much room it leaves the crossing slots. Empty if there is no active slot.
  pub fn suggestions<C: Corpus + ?Sized>(
    &self,
    corpus: &C,
    limit: usize,
  ) -> Result<Vec<ScoredCandidate>, Error> {
    let Some(slot) = self.active_slot() else {
      return Ok(vec![]);
    };
    let pattern = Pattern::extract(&self.grid, slot);
    let candidates = corpus.query(&pattern, limit)?;
    rank(candidates, slot, &self.grid, &self.slots, corpus)
  }

  /// Writes `word` into the active slot, e.g. after picking a suggestion. Returns
  /// `false` if the word doesn't fit the slot's length or contains something other
  /// than letters.
  pub fn place_word(&mut self, word: &str) -> Result<bool, Error> {
    let slot = self.active_slot().ok_or(Error::NoSelection)?;
    if word.chars().count() != slot.length || !word.chars().all(|c| c.is_ascii_alphabetic()) {
      return Ok(false);
    }
    let cells = slot.cells().collect::<Vec<_>>();
    for (pos, letter) in cells.into_iter().zip(word.chars()) {
      self
        .grid
        .set(pos, Square::Letter(letter.to_ascii_uppercase()));
    }
    Ok(true)
  }

  /// Runs autofill on the grid. If `cancel` is given, the run stops once it is set.
  pub fn autofill<C: Corpus + ?Sized>(
    &mut self,
    corpus: &C,
    options: FillOptions,
    cancel: Option<&AtomicBool>,
  ) -> FillReport {
    let mut fill = Autofill::new(&mut self.grid, corpus).with_options(options);
    if let Some(cancel) = cancel {
      fill = fill.with_cancel_flag(cancel);
    }
    fill.run()
  }

  /// Erases every letter, keeping the black squares and clues.
  pub fn clear_letters(&mut self) {
    for pos in self.grid.positions() {
      if self.grid.get(pos).letter().is_some() {
        self.grid.set(pos, Square::Empty);
      }
    }
  }

  /// Returns the text of the clue for the active slot, if it has one.
  pub fn current_clue(&self) -> Option<&str> {
    let slot = self.active_slot()?;
    self.clues.get(slot.id())
  }

  /// Sets the clue for the active slot. Blank text removes it.
  pub fn set_clue(&mut self, text: &str) -> Result<(), Error> {
    let id = self.active_slot().ok_or(Error::NoSelection)?.id();
    self.clues.set(id, text);
    Ok(())
  }

  /// Determines how a particular square should be styled.
  /// See [SquareStyle].
  pub fn square_style(&self, pos: Pos) -> SquareStyle {
    if self.grid.is_black(pos) {
      return SquareStyle::Black;
    }
    if self.cursor.pos() == Some(pos) {
      return SquareStyle::Cursor;
    }
    if self.cursor.highlight(&self.grid).contains(&pos) {
      SquareStyle::Word
    } else {
      SquareStyle::Standard
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Direction::{Across, Down};
  use crate::{FillOutcome, MemoryCorpus, SlotId};

  fn typed(editor: &mut Editor, text: &str) {
    for c in text.chars() {
      editor.apply(Command::Letter(c)).unwrap();
    }
  }

  #[test]
  fn typing_advances() {
    let mut editor = Editor::new(3);
    typed(&mut editor, "cat");
    assert_eq!(editor.grid().to_rows()[0], "CAT");
    assert_eq!(editor.cursor().pos(), Some((1, 0)));

    assert!(!editor.apply(Command::Letter('1')).unwrap());
    assert_eq!(editor.grid().get((1, 0)), Square::Empty);
  }

  #[test]
  fn backspace() {
    let mut editor = Editor::new(3);
    typed(&mut editor, "ca");
    assert_eq!(editor.cursor().pos(), Some((0, 2)));

    // The current square is empty, so the previous one is erased.
    editor.apply(Command::Backspace).unwrap();
    assert_eq!(editor.cursor().pos(), Some((0, 1)));
    assert_eq!(editor.grid().to_rows()[0], "C--");

    // The current square has a letter, so it is erased in place.
    editor.apply(Command::Select((0, 0))).unwrap();
    editor.apply(Command::Backspace).unwrap();
    assert_eq!(editor.cursor().pos(), Some((0, 0)));
    assert_eq!(editor.grid().to_rows()[0], "---");
  }

  #[test]
  fn block_mode_edits_and_renumbers() {
    let mut editor = Editor::new(3);
    assert_eq!(editor.slots().len(), 6);

    // Nothing happens outside of block-edit mode.
    assert!(!editor.apply(Command::ToggleBlock((1, 1))).unwrap());
    assert!(!editor.grid().is_black((1, 1)));

    editor.apply(Command::ToggleBlockMode).unwrap();
    assert_eq!(editor.cursor().pos(), None);
    assert!(!editor.apply(Command::Letter('A')).unwrap());
    assert!(editor.apply(Command::ToggleBlock((1, 1))).unwrap());
    assert_eq!(editor.slots().len(), 4);
    assert_eq!(editor.slots().number_at((2, 0)), Some(3));
    assert!(matches!(
      editor.apply(Command::ToggleBlock((3, 0))),
      Err(Error::OutOfBounds { .. })
    ));

    editor.apply(Command::ToggleBlockMode).unwrap();
    assert_eq!(editor.cursor().pos(), Some((0, 0)));
  }

  #[test]
  fn select_out_of_bounds() {
    let mut editor = Editor::new(3);
    assert!(matches!(
      editor.apply(Command::Select((0, 3))),
      Err(Error::OutOfBounds { pos: (0, 3), size: 3 })
    ));
  }

  #[test]
  fn suggestions_for_active_slot() {
    let mut editor = Editor::from_grid(Grid::parse("---\n-.-\n---").unwrap());
    let corpus = MemoryCorpus::from_iter([("CAT", 90), ("CUB", 80), ("COD", 70), ("TOE", 60)]);
    typed(&mut editor, "c");
    editor.apply(Command::Select((0, 0))).unwrap();

    assert_eq!(editor.active_pattern().unwrap().to_string(), "C**");
    let suggestions = editor.suggestions(&corpus, 10).unwrap();
    let words = suggestions
      .iter()
      .map(|s| (s.candidate.word.as_str(), s.match_score.is_vetoed()))
      .collect::<Vec<_>>();
    // CUB and COD would leave nothing for the right column.
    assert_eq!(words, vec![("CAT", false), ("CUB", true), ("COD", true)]);

    editor.apply(Command::ToggleBlockMode).unwrap();
    assert!(editor.suggestions(&corpus, 10).unwrap().is_empty());
  }

  #[test]
  fn place_word() {
    let mut editor = Editor::new(3);
    editor.apply(Command::ToggleDirection).unwrap();
    assert!(editor.place_word("emu").unwrap());
    assert_eq!(editor.grid().to_rows(), vec!["E--", "M--", "U--"]);
    assert!(!editor.place_word("EMUS").unwrap());

    editor.apply(Command::ToggleBlockMode).unwrap();
    assert!(matches!(editor.place_word("EMU"), Err(Error::NoSelection)));
  }

  #[test]
  fn autofill_fills_grid() {
    let mut editor = Editor::new(2);
    let corpus = MemoryCorpus::from_iter([("AT", 90), ("TO", 80), ("AN", 70), ("NO", 60)]);
    let report = editor.autofill(&corpus, FillOptions::default(), None);
    assert_eq!(report.outcome, FillOutcome::Completed);
    assert!(editor.grid().is_filled());

    editor.clear_letters();
    assert_eq!(editor.grid().to_text(), "--\n--\n");
    let cancel = AtomicBool::new(true);
    let report = editor.autofill(&corpus, FillOptions::default(), Some(&cancel));
    assert_eq!(report.outcome, FillOutcome::Cancelled);
  }

  #[test]
  fn clues_follow_active_slot() {
    let mut editor = Editor::new(3);
    assert_eq!(editor.current_clue(), None);
    editor.set_clue("Feline").unwrap();
    editor.apply(Command::ToggleDirection).unwrap();
    editor.set_clue("Canine").unwrap();

    assert_eq!(editor.current_clue(), Some("Canine"));
    editor.apply(Command::ToggleDirection).unwrap();
    assert_eq!(editor.current_clue(), Some("Feline"));
    assert_eq!(editor.clues().get(SlotId::new((0, 0), Down)), Some("Canine"));

    // Moving to the second row gives a different across slot.
    editor.apply(Command::NextSlot).unwrap();
    assert_eq!(editor.current_clue(), None);
    assert_eq!(editor.active_slot().map(|s| s.start), Some((1, 0)));
    assert_eq!(editor.cursor().direction(), Across);
  }

  #[test]
  fn square_styles() {
    let editor = Editor::from_grid(Grid::parse("-.-\n---\n---").unwrap());
    assert_eq!(editor.cursor().pos(), Some((0, 0)));
    // (0, 0) has no across entry, so the cursor starts going down.
    assert_eq!(editor.square_style((0, 0)), SquareStyle::Cursor);
    assert_eq!(editor.square_style((0, 1)), SquareStyle::Black);
    assert_eq!(editor.square_style((2, 0)), SquareStyle::Word);
    assert_eq!(editor.square_style((0, 2)), SquareStyle::Standard);
  }
}
